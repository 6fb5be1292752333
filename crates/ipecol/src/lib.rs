//! # ipecol - Example rendering for Ipe stylesheets
//!
//! `ipecol` takes an Ipe stylesheet (`.isy`), renders one example image per
//! style definition and collects the results into Markdown documentation.
//!
//! ## Pipeline
//!
//! ```text
//! Stylesheet ─► ClassifierRegistry ─► hints ─► fragment ─► composite document
//!                                                               │
//!        ExampleRecord ◄─ set_background ◄─ PageRenderer (per item)
//! ```
//!
//! - [`Stylesheet`]: parsed `<ipestyle>` container and its definitions
//! - [`ClassifierRegistry`]: maps each definition to a [`StyleKind`]; the
//!   last matching handler wins
//! - [`HintsTable`]: per-kind and per-name option overrides
//! - [`TemplateEngine`]: minijinja templates for fragments, the composite
//!   document and the Markdown output
//! - [`ExampleGenerator`]: drives one stylesheet through the pipeline
//! - [`Documentation`]: the Markdown aggregate over many stylesheets
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use ipecol::{Documentation, ExampleGenerator, IpeRender, TemplateEngine};
//!
//! let engine = Arc::new(TemplateEngine::new()?);
//! let generator = ExampleGenerator::new(Arc::clone(&engine), IpeRender::new());
//!
//! let mut docs = Documentation::new();
//! let failures = docs.add_stylesheet(Path::new("basic.isy"), &generator, Path::new("images"))?;
//! assert!(failures.is_empty());
//! docs.save_markdown(&engine, Path::new("styles.md"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classify;
pub mod documentation;
pub mod example;
pub mod hints;
pub mod options;
pub mod render;
pub mod stylesheet;
pub mod svg;
pub mod template;

pub use classify::{
    standard_registry, Classification, ClassifierRegistry, ClassifyError, FragmentRequest,
    Handler, StyleKind, TagMatcher,
};
pub use documentation::{Documentation, DocumentationError, StyleDocument};
pub use example::{ExampleError, ExampleRecord};
pub use hints::{HintsError, HintsTable};
pub use options::{IpeOptions, LayoutHints, LayoutOverrides, LineCap, OptionOverrides};
pub use render::{
    ExampleGenerator, GenerateError, GenerationReport, ImageFormat, IpeRender, ItemError,
    ItemFailure, PageRenderer, RenderError, RendererConfig,
};
pub use stylesheet::{StyleTag, Stylesheet, StylesheetError};
pub use svg::PostProcessError;
pub use template::{TemplateEngine, TemplateError, TemplateRegistry};
