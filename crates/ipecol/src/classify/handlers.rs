//! Built-in handlers for the standard Ipe style definitions.

use std::sync::Arc;

use super::kind::StyleKind;
use super::registry::{ClassifierRegistry, FragmentRequest, Handler, TagMatcher};
use crate::options::OptionOverrides;
use crate::template::{TemplateEngine, TemplateError};

/// Pen forced on dash style examples so the dash pattern is legible.
pub const DASH_PEN: &str = "ultrafat";

/// Pen forced on arrow examples so the head is legible.
pub const ARROW_PEN: &str = "fat";

/// Builds the registry of built-in handlers.
///
/// Order matters: the catch-all symbol handler (marks) comes first so the
/// prefix-specific symbol handlers registered after it win for arrows and
/// decorations.
///
/// | Order | Tag | Kind | Forced |
/// |-------|-----|------|--------|
/// | 1 | any `symbol` | mark | |
/// | 2 | `symbol` named `arrow/...` | arrow | `pen = fat` |
/// | 3 | `symbol` named `decoration/...` | decoration | |
/// | 4 | `dashstyle` | dash-style | `pen = ultrafat` |
/// | 5 | `color` | color | |
/// | 6 | `textstyle` | text-style | |
pub fn standard_registry(engine: Arc<TemplateEngine>) -> ClassifierRegistry {
    let mut registry = ClassifierRegistry::new();
    registry
        .register(Handler::new(
            TagMatcher::symbol(""),
            StyleKind::Mark,
            template_fragment(&engine, StyleKind::Mark),
        ))
        .register(
            Handler::new(
                TagMatcher::symbol("arrow/"),
                StyleKind::Arrow,
                template_fragment(&engine, StyleKind::Arrow),
            )
            .forcing(OptionOverrides::new().pen(ARROW_PEN)),
        )
        .register(Handler::new(
            TagMatcher::symbol("decoration/"),
            StyleKind::Decoration,
            template_fragment(&engine, StyleKind::Decoration),
        ))
        .register(
            Handler::new(
                TagMatcher::tag("dashstyle"),
                StyleKind::DashStyle,
                template_fragment(&engine, StyleKind::DashStyle),
            )
            .forcing(OptionOverrides::new().pen(DASH_PEN)),
        )
        .register(Handler::new(
            TagMatcher::tag("color"),
            StyleKind::Color,
            template_fragment(&engine, StyleKind::Color),
        ))
        .register(Handler::new(
            TagMatcher::tag("textstyle"),
            StyleKind::TextStyle,
            template_fragment(&engine, StyleKind::TextStyle),
        ));
    registry
}

fn template_fragment(
    engine: &Arc<TemplateEngine>,
    kind: StyleKind,
) -> impl Fn(&FragmentRequest<'_>) -> Result<String, TemplateError> + Send + Sync + 'static {
    let engine = Arc::clone(engine);
    move |request: &FragmentRequest<'_>| engine.render_fragment(kind.template_name(), request)
}
