//! Template sources: built-in templates plus optional override directories.
//!
//! [`TemplateRegistry`] maps template names (`mark`, `ipe`, `documentation`,
//! ...) to their content. Built-in templates are embedded in the binary;
//! user directories can shadow them by providing a file of the same name.
//!
//! # Template Resolution
//!
//! 1. Templates from override directories shadow built-in templates
//! 2. Within one directory, names are relative paths without extension, so
//!    `arrows/fancy.jinja2` resolves as `arrows/fancy`
//! 3. Names can also be looked up with their extension
//!
//! # Supported Extensions
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.jinja2` |
//! | 2 | `.j2` |
//! | 3 (lowest) | `.tmpl` |
//!
//! # Collision Handling
//!
//! - Same directory, different extensions: higher priority extension wins
//! - Same name from two different directories: [`RegistryError::Collision`]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".jinja2", ".j2", ".tmpl"];

/// A template file discovered while walking an override directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Resolution name without extension (e.g. "mark" or "arrows/fancy")
    pub name: String,
    /// Resolution name with extension (e.g. "mark.jinja2")
    pub name_with_ext: String,
    pub absolute_path: PathBuf,
    /// The directory root this file was found under
    pub source_dir: PathBuf,
}

impl TemplateFile {
    pub fn new(
        name: impl Into<String>,
        name_with_ext: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            name_with_ext: name_with_ext.into(),
            absolute_path: absolute_path.into(),
            source_dir: source_dir.into(),
        }
    }

    /// Returns the extension priority (lower is higher priority).
    ///
    /// Returns `usize::MAX` if the extension is not recognized.
    pub fn extension_priority(&self) -> usize {
        TEMPLATE_EXTENSIONS
            .iter()
            .position(|ext| self.name_with_ext.ends_with(ext))
            .unwrap_or(usize::MAX)
    }
}

/// Where a template's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Compiled into the binary.
    Builtin(&'static str),
    /// Read from disk when the engine is built.
    File(PathBuf),
}

/// Error type for template registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error(
        "template collision for \"{name}\":\n  - {} (from {})\n  - {} (from {})",
        existing_path.display(),
        existing_dir.display(),
        conflicting_path.display(),
        conflicting_dir.display()
    )]
    Collision {
        name: String,
        existing_path: PathBuf,
        existing_dir: PathBuf,
        conflicting_path: PathBuf,
        conflicting_dir: PathBuf,
    },

    #[error("template not found: \"{name}\"")]
    NotFound { name: String },

    #[error("failed to read template \"{}\": {message}", path.display())]
    ReadError { path: PathBuf, message: String },
}

/// Registry of named templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    /// Canonical (extensionless) name to source.
    templates: BTreeMap<String, TemplateSource>,
    /// Extension-qualified name to canonical name, for file templates.
    aliases: BTreeMap<String, String>,
    /// Canonical name to (path, source_dir) for collision detection.
    file_sources: BTreeMap<String, (PathBuf, PathBuf)>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in templates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, content) in super::builtin::BUILTIN_TEMPLATES.iter() {
            registry.add_builtin(name, content);
        }
        registry
    }

    /// Adds (or replaces) a built-in template.
    pub fn add_builtin(&mut self, name: &str, content: &'static str) {
        self.templates
            .insert(name.to_string(), TemplateSource::Builtin(content));
    }

    /// Adds templates discovered by [`walk_template_dir`].
    ///
    /// File templates shadow built-in templates of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Collision`] if two different directories
    /// provide the same template name.
    pub fn add_from_files(&mut self, files: Vec<TemplateFile>) -> Result<(), RegistryError> {
        let mut sorted_files = files;
        sorted_files.sort_by_key(|f| f.extension_priority());

        for file in sorted_files {
            if let Some((existing_path, existing_dir)) = self.file_sources.get(&file.name) {
                if existing_dir != &file.source_dir {
                    return Err(RegistryError::Collision {
                        name: file.name.clone(),
                        existing_path: existing_path.clone(),
                        existing_dir: existing_dir.clone(),
                        conflicting_path: file.absolute_path.clone(),
                        conflicting_dir: file.source_dir.clone(),
                    });
                }
                // Same directory, lower-priority extension.
                continue;
            }

            self.templates.insert(
                file.name.clone(),
                TemplateSource::File(file.absolute_path.clone()),
            );
            self.file_sources.insert(
                file.name.clone(),
                (file.absolute_path.clone(), file.source_dir.clone()),
            );
            self.aliases.insert(file.name_with_ext, file.name);
        }

        Ok(())
    }

    /// Looks up a template by name, with or without extension.
    pub fn get(&self, name: &str) -> Result<&TemplateSource, RegistryError> {
        let canonical = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.templates
            .get(canonical)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Gets the content of a template, reading from disk if necessary.
    pub fn get_content(&self, name: &str) -> Result<String, RegistryError> {
        match self.get(name)? {
            TemplateSource::Builtin(content) => Ok((*content).to_string()),
            TemplateSource::File(path) => {
                std::fs::read_to_string(path).map_err(|e| RegistryError::ReadError {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Canonical template names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Walks a template directory recursively and collects template files.
pub fn walk_template_dir(root: impl AsRef<Path>) -> Result<Vec<TemplateFile>, std::io::Error> {
    let root = root.as_ref().canonicalize()?;
    let mut files = Vec::new();
    walk_dir_recursive(&root, &root, &mut files)?;
    Ok(files)
}

fn walk_dir_recursive(
    current: &Path,
    root: &Path,
    files: &mut Vec<TemplateFile>,
) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir_recursive(&path, root, files)?;
        } else if let Some(file) = try_parse_template_file(&path, root) {
            files.push(file);
        }
    }
    Ok(())
}

fn try_parse_template_file(path: &Path, root: &Path) -> Option<TemplateFile> {
    let relative = path.strip_prefix(root).ok()?;
    let name_with_ext = relative
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/");
    let extension = TEMPLATE_EXTENSIONS
        .iter()
        .find(|ext| name_with_ext.ends_with(*ext))?;
    let name = name_with_ext.strip_suffix(extension)?.to_string();

    Some(TemplateFile::new(name, name_with_ext, path, root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_priority() {
        let jinja2 = TemplateFile::new("mark", "mark.jinja2", "/a/mark.jinja2", "/a");
        let j2 = TemplateFile::new("mark", "mark.j2", "/a/mark.j2", "/a");
        let tmpl = TemplateFile::new("mark", "mark.tmpl", "/a/mark.tmpl", "/a");
        let unknown = TemplateFile::new("mark", "mark.txt", "/a/mark.txt", "/a");

        assert_eq!(jinja2.extension_priority(), 0);
        assert_eq!(j2.extension_priority(), 1);
        assert_eq!(tmpl.extension_priority(), 2);
        assert_eq!(unknown.extension_priority(), usize::MAX);
    }

    #[test]
    fn test_builtins_present() {
        let registry = TemplateRegistry::with_builtins();
        for name in ["ipe", "mark", "arrow", "decoration", "dashstyle", "color", "textstyle", "documentation"] {
            assert!(registry.get(name).is_ok(), "missing built-in {name}");
        }
    }

    #[test]
    fn test_file_shadows_builtin() {
        let mut registry = TemplateRegistry::with_builtins();
        registry
            .add_from_files(vec![TemplateFile::new(
                "mark",
                "mark.jinja2",
                "/templates/mark.jinja2",
                "/templates",
            )])
            .unwrap();

        assert_eq!(
            registry.get("mark").unwrap(),
            &TemplateSource::File(PathBuf::from("/templates/mark.jinja2"))
        );
        assert!(registry.get("mark.jinja2").is_ok());
    }

    #[test]
    fn test_extension_priority_within_directory() {
        let mut registry = TemplateRegistry::new();
        registry
            .add_from_files(vec![
                TemplateFile::new("color", "color.tmpl", "/t/color.tmpl", "/t"),
                TemplateFile::new("color", "color.jinja2", "/t/color.jinja2", "/t"),
            ])
            .unwrap();

        match registry.get("color").unwrap() {
            TemplateSource::File(path) => assert!(path.ends_with("color.jinja2")),
            other => panic!("Expected file template, got {other:?}"),
        }
    }

    #[test]
    fn test_collision_across_directories() {
        let mut registry = TemplateRegistry::new();
        let result = registry.add_from_files(vec![
            TemplateFile::new("mark", "mark.jinja2", "/a/mark.jinja2", "/a"),
            TemplateFile::new("mark", "mark.jinja2", "/b/mark.jinja2", "/b"),
        ]);

        match result {
            Err(RegistryError::Collision { name, .. }) => assert_eq!(name, "mark"),
            other => panic!("Expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found() {
        let registry = TemplateRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_walk_and_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("extra")).unwrap();
        std::fs::write(dir.path().join("mark.jinja2"), "custom {{ name }}").unwrap();
        std::fs::write(dir.path().join("extra/note.j2"), "note").unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let files = walk_template_dir(dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let mut registry = TemplateRegistry::with_builtins();
        registry.add_from_files(files).unwrap();
        assert_eq!(registry.get_content("mark").unwrap(), "custom {{ name }}");
        assert_eq!(registry.get_content("extra/note").unwrap(), "note");
    }

    #[test]
    fn test_collision_display() {
        let err = RegistryError::Collision {
            name: "mark".to_string(),
            existing_path: PathBuf::from("/a/mark.jinja2"),
            existing_dir: PathBuf::from("/a"),
            conflicting_path: PathBuf::from("/b/mark.jinja2"),
            conflicting_dir: PathBuf::from("/b"),
        };
        let display = err.to_string();
        assert!(display.contains("/a/mark.jinja2"));
        assert!(display.contains("/b/mark.jinja2"));
    }
}
