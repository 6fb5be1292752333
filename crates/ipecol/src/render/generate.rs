//! Per-stylesheet example generation.
//!
//! [`ExampleGenerator::generate`] runs the whole pipeline for one parsed
//! stylesheet:
//!
//! 1. classify every tag (tags no handler matches are counted and dropped)
//! 2. assign output file names, failing on any collision
//! 3. build the composite document once and write it to a scoped temp file
//! 4. render, post-process and assemble each item in document order
//!
//! Steps 1 to 3 are fatal for the stylesheet. Failures in step 4 are
//! collected per item in the [`GenerationReport`] and never stop the
//! remaining items.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use super::naming::{assign_output_names, NameCollision};
use super::renderer::{IpeRender, PageRenderer, RenderError, DEFAULT_RENDERER};
use crate::classify::{standard_registry, Classification, ClassifierRegistry, ClassifyError};
use crate::example::ExampleRecord;
use crate::hints::HintsTable;
use crate::stylesheet::{Stylesheet, StylesheetError};
use crate::svg::{self, PostProcessError};
use crate::template::{TemplateEngine, TemplateError};

/// File name of a retained composite document inside the output directory.
pub const KEPT_DOCUMENT_NAME: &str = "examples.ipe";

/// Renderer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Program invoked once per page.
    pub program: PathBuf,
    /// Keep the composite document next to the images instead of deleting it.
    pub keep_document: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_RENDERER),
            keep_document: false,
        }
    }
}

impl RendererConfig {
    pub fn renderer(&self) -> IpeRender {
        IpeRender::with_program(&self.program)
    }
}

/// Fatal error for one stylesheet. No examples are produced.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Stylesheet(#[from] StylesheetError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("failed to build render document: {0}")]
    Template(#[from] TemplateError),

    #[error("output name collision: {0}")]
    NameCollision(#[from] NameCollision),

    #[error("failed to write render document in {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single item produced no example.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    PostProcess(#[from] PostProcessError),

    #[error("failed to remove previous image {}: {source}", path.display())]
    Stale {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failed item, reported after all items were attempted.
#[derive(Debug, thiserror::Error)]
#[error("{name}: {error}")]
pub struct ItemFailure {
    pub name: String,
    #[source]
    pub error: ItemError,
}

/// Outcome of generating one stylesheet.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Successfully rendered examples, in document order.
    pub examples: Vec<ExampleRecord>,
    pub failures: Vec<ItemFailure>,
    /// Total number of top-level tags in the stylesheet.
    pub tags: usize,
    /// Tags a handler matched.
    pub classified: usize,
    /// Tags no handler matched.
    pub unclassified: usize,
    /// The retained composite document, when requested and kept.
    pub document: Option<PathBuf>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives classification, rendering and assembly for stylesheets.
pub struct ExampleGenerator {
    engine: Arc<TemplateEngine>,
    registry: ClassifierRegistry,
    hints: Option<HintsTable>,
    renderer: Box<dyn PageRenderer>,
    keep_document: bool,
}

impl std::fmt::Debug for ExampleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExampleGenerator")
            .field("registry", &self.registry)
            .field("hints", &self.hints)
            .field("keep_document", &self.keep_document)
            .finish_non_exhaustive()
    }
}

impl ExampleGenerator {
    /// Creates a generator with the standard handlers and the given renderer.
    pub fn new(engine: Arc<TemplateEngine>, renderer: impl PageRenderer + 'static) -> Self {
        Self {
            registry: standard_registry(Arc::clone(&engine)),
            engine,
            hints: None,
            renderer: Box::new(renderer),
            keep_document: false,
        }
    }

    /// Creates a generator running the external renderer described by `config`.
    pub fn from_config(engine: Arc<TemplateEngine>, config: &RendererConfig) -> Self {
        Self::new(engine, config.renderer()).keep_document(config.keep_document)
    }

    pub fn with_hints(mut self, hints: HintsTable) -> Self {
        self.hints = Some(hints);
        self
    }

    /// Replaces the handler table.
    pub fn with_registry(mut self, registry: ClassifierRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn keep_document(mut self, keep: bool) -> Self {
        self.keep_document = keep;
        self
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    pub fn hints(&self) -> Option<&HintsTable> {
        self.hints.as_ref()
    }

    /// Classifies every tag of `stylesheet` in document order.
    ///
    /// Returns the classified items and the number of dropped tags.
    pub fn classify(
        &self,
        stylesheet: &Stylesheet,
    ) -> Result<(Vec<Classification>, usize), ClassifyError> {
        let mut items = Vec::with_capacity(stylesheet.tags().len());
        let mut dropped = 0;

        for tag in stylesheet.tags() {
            match self.registry.classify(tag, self.hints.as_ref())? {
                Some(item) => {
                    debug!("<{}> \"{}\" -> {}", tag.tag_type(), item.name(), item.kind());
                    items.push(item);
                }
                None => {
                    warn!(
                        "skipping <{}> \"{}\": no handler matches",
                        tag.tag_type(),
                        tag.name().unwrap_or_default()
                    );
                    dropped += 1;
                }
            }
        }

        Ok((items, dropped))
    }

    /// Generates the examples of one stylesheet into `output_dir`.
    ///
    /// `folder` is recorded on every example as its provenance.
    pub fn generate(
        &self,
        stylesheet: &Stylesheet,
        folder: &str,
        output_dir: &Path,
    ) -> Result<GenerationReport, GenerateError> {
        let (items, unclassified) = self.classify(stylesheet)?;
        let file_names = assign_output_names(&items, self.renderer.format())?;
        let document = self.engine.build_document(stylesheet, &items)?;

        let io_err = |source| GenerateError::Document {
            path: output_dir.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(output_dir).map_err(io_err)?;
        // Removed on drop, whichever way this function returns.
        let mut scoped = tempfile::Builder::new()
            .prefix("ipecol-")
            .suffix(".ipe")
            .tempfile_in(output_dir)
            .map_err(io_err)?;
        scoped.write_all(document.as_bytes()).map_err(io_err)?;
        scoped.flush().map_err(io_err)?;

        let mut report = GenerationReport {
            tags: stylesheet.tags().len(),
            classified: items.len(),
            unclassified,
            ..GenerationReport::default()
        };

        for (item, file_name) in items.iter().zip(&file_names) {
            let image = output_dir.join(file_name);
            match self.render_item(item, scoped.path(), &image) {
                Ok(()) => report.examples.push(ExampleRecord::assemble(
                    item,
                    image,
                    folder,
                    self.hints.as_ref(),
                )),
                Err(error) => {
                    warn!("{} \"{}\" failed: {}", item.kind(), item.name(), error);
                    report.failures.push(ItemFailure {
                        name: item.name().to_string(),
                        error,
                    });
                }
            }
        }

        if self.keep_document {
            let kept = output_dir.join(KEPT_DOCUMENT_NAME);
            match scoped.persist(&kept) {
                Ok(_) => {
                    info!("kept render document at {}", kept.display());
                    report.document = Some(kept);
                }
                Err(err) => warn!("could not keep render document: {}", err.error),
            }
        }

        info!(
            "{}: {} tags, {} classified, {} rendered, {} failed",
            folder,
            report.tags,
            report.classified,
            report.examples.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn render_item(
        &self,
        item: &Classification,
        document: &Path,
        image: &Path,
    ) -> Result<(), ItemError> {
        // An image left over from an earlier run must not pass for this one.
        match std::fs::remove_file(image) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ItemError::Stale {
                    path: image.to_path_buf(),
                    source,
                })
            }
        }

        self.renderer.render_page(item.name(), document, image)?;
        if !image.is_file() {
            return Err(RenderError::MissingOutput {
                path: image.to_path_buf(),
            }
            .into());
        }
        svg::post_process_file(image, &item.options().background_color)?;
        Ok(())
    }
}
