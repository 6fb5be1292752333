//! Markdown documentation for a set of stylesheets.
//!
//! Each stylesheet can describe itself in an XML comment:
//!
//! ```xml
//! <!--
//! TITLE: Presentation styles
//! DESC: Bold marks and arrows for slides.
//! -->
//! ```
//!
//! [`Documentation`] collects one [`StyleDocument`] per stylesheet (the
//! header plus its rendered examples) and renders the whole set through the
//! `documentation` template.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::classify::StyleKind;
use crate::example::{ExampleError, ExampleRecord};
use crate::options::LayoutHints;
use crate::render::{ExampleGenerator, GenerateError, GenerationReport, ItemFailure};
use crate::stylesheet::Stylesheet;
use crate::template::{TemplateEngine, TemplateError, DOCUMENTATION_TEMPLATE};

/// Error adding a stylesheet or writing the documentation.
#[derive(Debug, thiserror::Error)]
pub enum DocumentationError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Generate {
        path: PathBuf,
        #[source]
        source: GenerateError,
    },

    #[error(
        "{} and {} would share image directory \"{directory}\"",
        first.display(),
        second.display()
    )]
    ImageDirCollision {
        directory: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error(transparent)]
    Rebase(#[from] ExampleError),

    #[error("failed to render documentation: {0}")]
    Template(#[from] TemplateError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Header entries of a documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocItems {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl DocItems {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Decodes one comment. Lines are `TITLE: <text>` or `DESC: <text>`;
/// anything else is ignored. A repeated key keeps its last value.
pub fn parse_doc_comment(comment: &str) -> DocItems {
    let mut items = DocItems::default();
    for line in comment.lines().map(str::trim) {
        let Some((head, tail)) = line.split_once(' ') else {
            continue;
        };
        match head {
            "TITLE:" => items.title = Some(tail.trim().to_string()),
            "DESC:" => items.description = Some(tail.trim().to_string()),
            _ => {}
        }
    }
    items
}

/// Finds the header among a document's comments: the last one that has any
/// entries.
pub fn find_doc_items<S: AsRef<str>>(comments: &[S]) -> DocItems {
    comments
        .iter()
        .map(|c| parse_doc_comment(c.as_ref()))
        .filter(|items| !items.is_empty())
        .last()
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentCounts {
    /// Top-level definitions in the stylesheet.
    pub tags: usize,
    pub classified: usize,
    pub rendered: usize,
    pub failed: usize,
}

impl From<&GenerationReport> for DocumentCounts {
    fn from(report: &GenerationReport) -> Self {
        Self {
            tags: report.tags,
            classified: report.classified,
            rendered: report.examples.len(),
            failed: report.failures.len(),
        }
    }
}

/// Documentation of one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleDocument {
    pub title: String,
    /// File name of the stylesheet.
    pub name: String,
    /// Name of the directory holding the stylesheet.
    pub folder: String,
    pub description: String,
    pub examples: Vec<ExampleRecord>,
    pub counts: DocumentCounts,
}

impl StyleDocument {
    /// Builds the document for a stylesheet read from `path`.
    ///
    /// The title falls back to the file name when the stylesheet has no
    /// header comment.
    pub fn new(path: &Path, stylesheet: &Stylesheet, examples: Vec<ExampleRecord>) -> Self {
        let name = file_name(path);
        let items = find_doc_items(stylesheet.comments());
        let rendered = examples.len();
        Self {
            title: items.title.unwrap_or_else(|| name.clone()),
            name,
            folder: folder_name(path),
            description: items.description.unwrap_or_default(),
            examples,
            counts: DocumentCounts {
                tags: stylesheet.tags().len(),
                rendered,
                ..DocumentCounts::default()
            },
        }
    }

    pub fn with_counts(mut self, counts: DocumentCounts) -> Self {
        self.counts = counts;
        self
    }

    /// Directory name used for this stylesheet's images: the file stem.
    pub fn image_dir_name(&self) -> &str {
        image_dir_name(&self.name)
    }

    /// The stylesheet as `folder/name`.
    pub fn source(&self) -> PathBuf {
        Path::new(&self.folder).join(&self.name)
    }

    /// Rebases every example image into `directory`.
    pub fn rebase_images(&mut self, directory: &Path) -> Result<(), ExampleError> {
        self.examples
            .iter_mut()
            .try_for_each(|example| example.rebase(directory))
    }
}

/// Documentation for a list of stylesheets, in the order they were added.
#[derive(Debug, Default)]
pub struct Documentation {
    docs: Vec<StyleDocument>,
}

impl Documentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn docs(&self) -> &[StyleDocument] {
        &self.docs
    }

    pub fn push(&mut self, doc: StyleDocument) {
        self.docs.push(doc);
    }

    /// Reads, parses and renders the stylesheet at `path`, writing its
    /// images below `image_root/<stem>/`, and appends its document.
    ///
    /// Returns the items that failed to render; the document still lists
    /// every item that succeeded. A stylesheet whose stem is already used by
    /// an earlier one is rejected before anything is written.
    pub fn add_stylesheet(
        &mut self,
        path: &Path,
        generator: &ExampleGenerator,
        image_root: &Path,
    ) -> Result<Vec<ItemFailure>, DocumentationError> {
        let generate_err = |source: GenerateError| DocumentationError::Generate {
            path: path.to_path_buf(),
            source,
        };

        let file_name = file_name(path);
        let dir_name = image_dir_name(&file_name);
        if let Some(first) = self.docs.iter().find(|d| d.image_dir_name() == dir_name) {
            return Err(DocumentationError::ImageDirCollision {
                directory: dir_name.to_string(),
                first: first.source(),
                second: path.to_path_buf(),
            });
        }

        let source = std::fs::read_to_string(path).map_err(|source| DocumentationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let stylesheet = Stylesheet::parse(&source).map_err(|e| generate_err(e.into()))?;

        let output_dir = image_root.join(dir_name);
        let mut report = generator
            .generate(&stylesheet, &folder_name(path), &output_dir)
            .map_err(generate_err)?;

        let counts = DocumentCounts::from(&report);
        let failures = std::mem::take(&mut report.failures);
        let doc = StyleDocument::new(path, &stylesheet, report.examples).with_counts(counts);
        info!("{}: {} examples", doc.name, doc.examples.len());
        self.docs.push(doc);
        Ok(failures)
    }

    /// Rebases each document's images into `base/<stem>/`.
    ///
    /// Nothing is rebased if two documents share a stem.
    pub fn rebase_images(&mut self, base: &Path) -> Result<(), DocumentationError> {
        let mut seen: HashMap<&str, &StyleDocument> = HashMap::new();
        for doc in &self.docs {
            if let Some(first) = seen.insert(doc.image_dir_name(), doc) {
                return Err(DocumentationError::ImageDirCollision {
                    directory: doc.image_dir_name().to_string(),
                    first: first.source(),
                    second: doc.source(),
                });
            }
        }

        for doc in &mut self.docs {
            let directory = base.join(doc.image_dir_name());
            doc.rebase_images(&directory)?;
        }
        Ok(())
    }

    /// Renders the Markdown. Image paths under `relative_to` are written
    /// relative to it.
    pub fn render_markdown(
        &self,
        engine: &TemplateEngine,
        relative_to: Option<&Path>,
    ) -> Result<String, TemplateError> {
        #[derive(Serialize)]
        struct ExampleView<'a> {
            name: &'a str,
            kind: StyleKind,
            image_path: String,
            layout: LayoutHints,
        }

        #[derive(Serialize)]
        struct DocView<'a> {
            title: &'a str,
            name: &'a str,
            folder: &'a str,
            description: &'a str,
            examples: Vec<ExampleView<'a>>,
            counts: DocumentCounts,
        }

        #[derive(Serialize)]
        struct DocsView<'a> {
            docs: Vec<DocView<'a>>,
        }

        #[derive(Serialize)]
        struct Context<'a> {
            documentation: DocsView<'a>,
        }

        let docs = self
            .docs
            .iter()
            .map(|doc| DocView {
                title: &doc.title,
                name: &doc.name,
                folder: &doc.folder,
                description: &doc.description,
                examples: doc
                    .examples
                    .iter()
                    .map(|example| ExampleView {
                        name: example.name(),
                        kind: example.kind(),
                        image_path: example
                            .image_path()
                            .map(|p| display_path(p, relative_to))
                            .unwrap_or_default(),
                        layout: example.layout(),
                    })
                    .collect(),
                counts: doc.counts,
            })
            .collect();

        engine.render(
            DOCUMENTATION_TEMPLATE,
            &Context {
                documentation: DocsView { docs },
            },
        )
    }

    /// Renders the Markdown and writes it to `path`, with image paths
    /// relative to the file's directory.
    pub fn save_markdown(
        &self,
        engine: &TemplateEngine,
        path: &Path,
    ) -> Result<(), DocumentationError> {
        let markdown = self.render_markdown(engine, path.parent())?;
        std::fs::write(path, markdown).map_err(|source| DocumentationError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn image_dir_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

fn folder_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn display_path(path: &Path, relative_to: Option<&Path>) -> String {
    relative_to
        .and_then(|base| path.strip_prefix(base).ok())
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
