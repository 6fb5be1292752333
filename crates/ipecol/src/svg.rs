//! SVG post-processing.
//!
//! Renderer output has a transparent background, which is unreadable on
//! dark documentation themes. [`set_background`] sets a `background-color`
//! declaration in the root `<svg>` element's `style` attribute and
//! re-serializes the document with stable two-space indentation so image
//! diffs stay readable. Element content and every other attribute are
//! written back unchanged.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Error post-processing one image. Scoped to that image's item.
#[derive(Debug, thiserror::Error)]
pub enum PostProcessError {
    #[error("failed to access image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed SVG: {0}")]
    Malformed(String),

    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),

    #[error("document has no root element")]
    Empty,
}

fn malformed(err: impl std::fmt::Display) -> PostProcessError {
    PostProcessError::Malformed(err.to_string())
}

/// Returns `svg` with the root element's background forced to `color`.
pub fn set_background(svg: &str, color: &str) -> Result<String, PostProcessError> {
    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(malformed)?;
        match event {
            Event::Start(e) => {
                let e = if depth == 0 {
                    if seen_root {
                        return Err(malformed("more than one root element"));
                    }
                    seen_root = true;
                    with_background(&e, color)?
                } else {
                    e.into_owned()
                };
                depth += 1;
                writer.write_event(Event::Start(e)).map_err(malformed)?;
            }
            Event::Empty(e) => {
                let e = if depth == 0 {
                    if seen_root {
                        return Err(malformed("more than one root element"));
                    }
                    seen_root = true;
                    with_background(&e, color)?
                } else {
                    e.into_owned()
                };
                writer.write_event(Event::Empty(e)).map_err(malformed)?;
            }
            Event::End(e) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unexpected closing tag"))?;
                writer.write_event(Event::End(e)).map_err(malformed)?;
            }
            Event::Eof => break,
            other => writer.write_event(other).map_err(malformed)?,
        }
    }

    if !seen_root {
        return Err(PostProcessError::Empty);
    }
    if depth != 0 {
        return Err(malformed("root element is not closed"));
    }

    let mut out = String::from_utf8(writer.into_inner()).map_err(malformed)?;
    out.push('\n');
    Ok(out)
}

/// Rewrites the image at `path` in place.
pub fn post_process_file(path: &Path, color: &str) -> Result<(), PostProcessError> {
    let io_err = |source| PostProcessError::Io {
        path: path.to_path_buf(),
        source,
    };
    let content = std::fs::read_to_string(path).map_err(io_err)?;
    let processed = set_background(&content, color)?;
    std::fs::write(path, processed).map_err(io_err)
}

fn with_background(
    start: &BytesStart<'_>,
    color: &str,
) -> Result<BytesStart<'static>, PostProcessError> {
    if start.local_name().as_ref() != b"svg" {
        return Err(PostProcessError::NotSvg(
            String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        ));
    }

    let mut root = BytesStart::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    let mut declarations = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        if attr.key.as_ref() == b"style" {
            let value = attr.unescape_value().map_err(malformed)?;
            declarations.extend(
                value
                    .split(';')
                    .map(str::trim)
                    .filter(|decl| !decl.is_empty() && !is_background(decl))
                    .map(str::to_string),
            );
        } else {
            root.push_attribute(attr);
        }
    }

    declarations.push(format!("background-color:{color}"));
    root.push_attribute(("style", declarations.join(";").as_str()));
    Ok(root)
}

fn is_background(declaration: &str) -> bool {
    declaration
        .split_once(':')
        .map(|(property, _)| {
            let property = property.trim();
            property == "background" || property == "background-color"
        })
        .unwrap_or(false)
}
