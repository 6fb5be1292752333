//! Template loading and rendering.
//!
//! - [`TemplateRegistry`]: where template sources come from (built-in or
//!   override directories)
//! - [`TemplateEngine`]: the minijinja environment that renders item
//!   fragments, the composite render document and the Markdown output

mod builtin;
mod engine;
mod registry;

pub use builtin::{BUILTIN_TEMPLATES, DOCUMENTATION_TEMPLATE, DOCUMENT_TEMPLATE};
pub use engine::{register_filters, symbol_base, TemplateEngine, TemplateError};
pub use registry::{
    walk_template_dir, RegistryError, TemplateFile, TemplateRegistry, TemplateSource,
    TEMPLATE_EXTENSIONS,
};
