//! Example records: one rendered style item with its layout metadata.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::classify::{Classification, StyleKind};
use crate::hints::{resolve_layout, HintsTable};
use crate::options::LayoutHints;

/// Error changing an example's image path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExampleError {
    #[error("example \"{name}\" has no image to rebase")]
    NoImage { name: String },

    #[error("image path of \"{}\" has no file name", path.display())]
    NoFileName { path: PathBuf },

    #[error(
        "example \"{name}\" was already rebased to {}, refusing {}",
        previous.display(),
        requested.display()
    )]
    AlreadyRebased {
        name: String,
        previous: PathBuf,
        requested: PathBuf,
    },
}

/// One rendered example.
///
/// All fields are fixed at construction except the image path, which can be
/// moved to a different directory exactly once via [`ExampleRecord::rebase`]
/// (for example when the emitted documentation references images in a
/// location other than where they were rendered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleRecord {
    name: String,
    kind: StyleKind,
    image_path: Option<PathBuf>,
    folder: String,
    layout: LayoutHints,
    #[serde(skip)]
    rebased_to: Option<PathBuf>,
}

impl ExampleRecord {
    /// Creates a record without an image.
    pub fn new(
        name: impl Into<String>,
        kind: StyleKind,
        folder: impl Into<String>,
        layout: LayoutHints,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            image_path: None,
            folder: folder.into(),
            layout,
            rebased_to: None,
        }
    }

    /// Sets the rendered image path.
    pub fn with_image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Builds the record for a successfully rendered item, resolving its
    /// layout from `hints.layout[kind]`.
    pub fn assemble(
        classification: &Classification,
        image_path: impl Into<PathBuf>,
        folder: impl Into<String>,
        hints: Option<&HintsTable>,
    ) -> Self {
        Self::new(
            classification.name(),
            classification.kind(),
            folder,
            resolve_layout(hints, classification.kind()),
        )
        .with_image_path(image_path)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn layout(&self) -> LayoutHints {
        self.layout
    }

    /// Moves the image path into `directory`, keeping its file name.
    ///
    /// Repeating the call with the same directory is a no-op; a different
    /// directory after the first rebase is rejected.
    ///
    /// # Errors
    ///
    /// - [`ExampleError::NoImage`] if no image path was set
    /// - [`ExampleError::AlreadyRebased`] if already moved elsewhere
    pub fn rebase(&mut self, directory: impl AsRef<Path>) -> Result<(), ExampleError> {
        let directory = directory.as_ref();
        let current = self
            .image_path
            .as_ref()
            .ok_or_else(|| ExampleError::NoImage {
                name: self.name.clone(),
            })?;

        match &self.rebased_to {
            Some(previous) if previous == directory => return Ok(()),
            Some(previous) => {
                return Err(ExampleError::AlreadyRebased {
                    name: self.name.clone(),
                    previous: previous.clone(),
                    requested: directory.to_path_buf(),
                })
            }
            None => {}
        }

        let file_name = current
            .file_name()
            .ok_or_else(|| ExampleError::NoFileName {
                path: current.clone(),
            })?;
        self.image_path = Some(directory.join(file_name));
        self.rebased_to = Some(directory.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LayoutOverrides;

    fn record() -> ExampleRecord {
        ExampleRecord::new("mark/disk", StyleKind::Mark, "styles", LayoutHints::default())
            .with_image_path("/tmp/render/markdisk.svg")
    }

    #[test]
    fn test_rebase_keeps_file_name() {
        let mut example = record();
        example.rebase("docs/images").unwrap();
        assert_eq!(example.image_path(), Some(Path::new("docs/images/markdisk.svg")));
        assert_eq!(example.name(), "mark/disk");
        assert_eq!(example.folder(), "styles");
    }

    #[test]
    fn test_rebase_same_directory_is_noop() {
        let mut example = record();
        example.rebase("docs/images").unwrap();
        let after_first = example.clone();
        example.rebase("docs/images").unwrap();
        assert_eq!(example, after_first);
    }

    #[test]
    fn test_rebase_to_other_directory_rejected() {
        let mut example = record();
        example.rebase("docs/images").unwrap();
        let result = example.rebase("tests/fixtures");
        assert!(matches!(result, Err(ExampleError::AlreadyRebased { .. })));
        assert_eq!(example.image_path(), Some(Path::new("docs/images/markdisk.svg")));
    }

    #[test]
    fn test_rebase_without_image_rejected() {
        let mut example =
            ExampleRecord::new("dotted", StyleKind::DashStyle, "styles", LayoutHints::default());
        assert_eq!(
            example.rebase("docs"),
            Err(ExampleError::NoImage {
                name: "dotted".to_string()
            })
        );
    }

    #[test]
    fn test_layout_from_hints() {
        let registry = {
            let mut r = crate::classify::ClassifierRegistry::new();
            r.register(crate::classify::Handler::new(
                crate::classify::TagMatcher::tag("textstyle"),
                StyleKind::TextStyle,
                |_req| Ok(String::new()),
            ));
            r
        };
        let item = registry
            .classify(&crate::stylesheet::StyleTag::new("textstyle", Some("center")), None)
            .unwrap()
            .unwrap();

        let hints =
            HintsTable::new().with_layout(StyleKind::TextStyle, LayoutOverrides { width: Some(480) });
        let example = ExampleRecord::assemble(&item, "center.svg", "styles", Some(&hints));
        assert_eq!(example.layout().width, 480);
        assert_eq!(example.kind(), StyleKind::TextStyle);

        let example = ExampleRecord::assemble(&item, "center.svg", "styles", None);
        assert_eq!(example.layout().width, 200);
    }

    #[test]
    fn test_serialization() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["name"], "mark/disk");
        assert_eq!(value["kind"], "mark");
        assert_eq!(value["image_path"], "/tmp/render/markdisk.svg");
        assert_eq!(value["layout"]["width"], 200);
        assert!(value.get("rebased_to").is_none());
    }
}
