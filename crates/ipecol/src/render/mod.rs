//! Rendering of classified items into example images.
//!
//! - [`PageRenderer`] / [`IpeRender`]: one external process per page
//! - [`assign_output_names`]: collision-checked image file names
//! - [`ExampleGenerator`]: the per-stylesheet pipeline

mod generate;
mod naming;
mod renderer;

pub use generate::{
    ExampleGenerator, GenerateError, GenerationReport, ItemError, ItemFailure, RendererConfig,
    KEPT_DOCUMENT_NAME,
};
pub use naming::{assign_output_names, output_file_name, NameCollision};
pub use renderer::{ImageFormat, IpeRender, PageRenderer, RenderError, DEFAULT_RENDERER};
