//! External page renderer.
//!
//! The renderer converts one page of the composite document into an image
//! file. [`IpeRender`] runs the `iperender` program once per page; other
//! implementations of [`PageRenderer`] can stand in for it (tests use a fake
//! that writes fixed SVG).

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use log::debug;

/// Image format produced by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Svg,
}

impl ImageFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
        }
    }

    /// The `iperender` flag selecting this format.
    pub fn flag(self) -> &'static str {
        match self {
            ImageFormat::Svg => "-svg",
        }
    }
}

/// Error rendering a single page. Always scoped to one item.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer exited with {status} for page \"{page}\"")]
    Failed { page: String, status: ExitStatus },

    #[error("renderer produced no output at {}", path.display())]
    MissingOutput { path: PathBuf },

    #[error("{0}")]
    Other(String),
}

/// Converts one page of a document into an image.
pub trait PageRenderer {
    fn format(&self) -> ImageFormat {
        ImageFormat::Svg
    }

    /// Renders the page identified by `page` from `document` into `output`.
    fn render_page(&self, page: &str, document: &Path, output: &Path) -> Result<(), RenderError>;
}

impl<R: PageRenderer + ?Sized> PageRenderer for Box<R> {
    fn format(&self) -> ImageFormat {
        (**self).format()
    }

    fn render_page(&self, page: &str, document: &Path, output: &Path) -> Result<(), RenderError> {
        (**self).render_page(page, document, output)
    }
}

/// Default program name of the Ipe renderer.
pub const DEFAULT_RENDERER: &str = "iperender";

/// Runs `iperender -svg -page <page> <document> <output>` per page.
///
/// The program's own output is discarded; only its exit status counts.
#[derive(Debug, Clone)]
pub struct IpeRender {
    program: PathBuf,
    format: ImageFormat,
}

impl IpeRender {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_RENDERER)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            format: ImageFormat::Svg,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, page: &str, document: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(self.format.flag())
            .arg("-page")
            .arg(page)
            .arg(document)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Default for IpeRender {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for IpeRender {
    fn format(&self) -> ImageFormat {
        self.format
    }

    fn render_page(&self, page: &str, document: &Path, output: &Path) -> Result<(), RenderError> {
        let status = self
            .command(page, document, output)
            .status()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        debug!(
            "{} page \"{}\" -> {}: {}",
            self.program.display(),
            page,
            output.display(),
            status
        );

        if !status.success() {
            return Err(RenderError::Failed {
                page: page.to_string(),
                status,
            });
        }
        // Some renderer failures only show on the console while still
        // exiting successfully.
        match std::fs::metadata(output) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
            _ => Err(RenderError::MissingOutput {
                path: output.to_path_buf(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(ImageFormat::Svg.extension(), "svg");
        assert_eq!(ImageFormat::Svg.flag(), "-svg");
        assert_eq!(IpeRender::new().format(), ImageFormat::Svg);
    }

    #[test]
    fn test_command_arguments() {
        let renderer = IpeRender::with_program("/opt/ipe/bin/iperender");
        let cmd = renderer.command("mark/disk", Path::new("doc.ipe"), Path::new("markdisk.svg"));

        assert_eq!(cmd.get_program(), "/opt/ipe/bin/iperender");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-svg", "-page", "mark/disk", "doc.ipe", "markdisk.svg"]);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = IpeRender::with_program(dir.path().join("no-such-renderer"));
        let result = renderer.render_page("p", &dir.path().join("d.ipe"), &dir.path().join("o.svg"));
        assert!(matches!(result, Err(RenderError::Spawn { .. })));
    }
}
