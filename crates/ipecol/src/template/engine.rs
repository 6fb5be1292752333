//! MiniJinja-backed template engine.

use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior, Value};
use serde::Serialize;

use super::builtin::DOCUMENT_TEMPLATE;
use super::registry::{RegistryError, TemplateRegistry};
use crate::classify::{Classification, FragmentRequest};
use crate::options::LineCap;
use crate::stylesheet::Stylesheet;

/// Error compiling or rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template error: {0}")]
    Render(#[from] Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Compiled templates for one run.
///
/// All templates of the registry are compiled up front, so a syntax error
/// in an override template is reported before anything is rendered.
/// Undefined variables are errors rather than empty strings.
///
/// # Example
///
/// ```rust
/// use ipecol::{FragmentRequest, IpeOptions, StyleKind, TemplateEngine};
///
/// let engine = TemplateEngine::new().unwrap();
/// let options = IpeOptions::default();
/// let fragment = engine
///     .render_fragment("dashstyle", &FragmentRequest::new(StyleKind::DashStyle, "dotted", &options))
///     .unwrap();
/// assert!(fragment.contains(r#"dash="dotted""#));
/// ```
#[derive(Debug)]
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Creates an engine with the built-in templates.
    pub fn new() -> Result<Self, TemplateError> {
        Self::from_registry(&TemplateRegistry::with_builtins())
    }

    /// Creates an engine with every template of `registry` compiled.
    pub fn from_registry(registry: &TemplateRegistry) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        register_filters(&mut env);

        for name in registry.names() {
            let content = registry.get_content(name)?;
            env.add_template_owned(name.to_string(), content)?;
        }

        Ok(Self { env })
    }

    /// Returns true if a template of that name is compiled.
    pub fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Renders a named template with arbitrary data.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, TemplateError> {
        let tmpl = self.env.get_template(name)?;
        Ok(tmpl.render(data)?)
    }

    /// Renders one item's page fragment.
    pub fn render_fragment(
        &self,
        template: &str,
        request: &FragmentRequest<'_>,
    ) -> Result<String, TemplateError> {
        self.render(template, request)
    }

    /// Builds the composite render document: the stylesheet container
    /// followed by one page per item, named after the item.
    pub fn build_document(
        &self,
        stylesheet: &Stylesheet,
        items: &[Classification],
    ) -> Result<String, TemplateError> {
        #[derive(Serialize)]
        struct Page<'a> {
            name: &'a str,
            kind: &'static str,
            fragment: &'a str,
        }

        #[derive(Serialize)]
        struct DocumentContext<'a> {
            stylesheet: &'a str,
            items: Vec<Page<'a>>,
        }

        let context = DocumentContext {
            stylesheet: stylesheet.container(),
            items: items
                .iter()
                .map(|item| Page {
                    name: item.name(),
                    kind: item.kind().as_str(),
                    fragment: item.fragment(),
                })
                .collect(),
        };
        self.render(DOCUMENT_TEMPLATE, &context)
    }
}

/// Strips the style prefix and the parenthesised variant suffix from a
/// symbol name: `arrow/normal(spx)` becomes `normal`.
pub fn symbol_base(name: &str) -> &str {
    let base = name.split_once('/').map(|(_, rest)| rest).unwrap_or(name);
    match base.find('(') {
        Some(idx) if base.ends_with(')') => &base[..idx],
        _ => base,
    }
}

/// Makes text safe inside one Markdown table cell: backslash-escapes the
/// characters that would end the cell or start inline markup, and folds line
/// breaks into spaces.
pub fn md_cell(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '|' | '`' | '*' | '_' | '[' | ']' | '<' | '>' => {
                out.push('\\');
                out.push(c);
            }
            '\r' | '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Registers the filters used by the built-in templates.
///
/// - `xml_attr`: escapes a value for an XML attribute or text node
/// - `ipe_cap`: line cap name to Ipe's numeric cap code
/// - `symbol_base`: see [`symbol_base`]
/// - `md_cell`: see [`md_cell`]
pub fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("xml_attr", |value: Value| -> String {
        quick_xml::escape::escape(value.to_string().as_str()).into_owned()
    });

    env.add_filter("ipe_cap", |value: String| -> Result<u8, Error> {
        LineCap::from_name(&value)
            .map(LineCap::ipe_code)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("unknown line cap \"{value}\""),
                )
            })
    });

    env.add_filter("symbol_base", |value: String| -> String {
        symbol_base(&value).to_string()
    });

    env.add_filter("md_cell", |value: Value| -> String { md_cell(&value.to_string()) });
}
