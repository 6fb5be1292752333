//! Templates compiled into the library.

use once_cell::sync::Lazy;

/// Built-in templates by name.
///
/// `ipe` builds the composite render document, one template per
/// [`StyleKind`](crate::StyleKind) renders an item's page fragment, and
/// `documentation` renders the Markdown output.
pub static BUILTIN_TEMPLATES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("ipe", include_str!("../../templates/ipe.jinja2")),
        ("mark", include_str!("../../templates/mark.jinja2")),
        ("arrow", include_str!("../../templates/arrow.jinja2")),
        ("decoration", include_str!("../../templates/decoration.jinja2")),
        ("dashstyle", include_str!("../../templates/dashstyle.jinja2")),
        ("color", include_str!("../../templates/color.jinja2")),
        ("textstyle", include_str!("../../templates/textstyle.jinja2")),
        ("documentation", include_str!("../../templates/documentation.jinja2")),
    ]
});

/// Name of the composite document template.
pub const DOCUMENT_TEMPLATE: &str = "ipe";

/// Name of the Markdown documentation template.
pub const DOCUMENTATION_TEMPLATE: &str = "documentation";
