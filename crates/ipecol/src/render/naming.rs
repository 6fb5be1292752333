//! Output file naming.

use std::collections::HashMap;

use super::renderer::ImageFormat;
use crate::classify::Classification;

/// Two distinct items would be written to the same image file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("items \"{first}\" and \"{second}\" both map to output file \"{file_name}\"")]
pub struct NameCollision {
    pub file_name: String,
    pub first: String,
    pub second: String,
}

/// Derives the image file name for an item name.
///
/// Path separators are removed and spaces become underscores:
/// `mark/disk(sx)` becomes `markdisk(sx).svg`.
pub fn output_file_name(name: &str, format: ImageFormat) -> String {
    let stem: String = name
        .chars()
        .filter(|c| *c != '/')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    format!("{}.{}", stem, format.extension())
}

/// Assigns output file names to all items, in order.
///
/// # Errors
///
/// Returns [`NameCollision`] for the first pair of items sharing a file name.
/// Nothing is rendered in that case.
pub fn assign_output_names(
    items: &[Classification],
    format: ImageFormat,
) -> Result<Vec<String>, NameCollision> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(items.len());
    let mut names = Vec::with_capacity(items.len());

    for item in items {
        let file_name = output_file_name(item.name(), format);
        if let Some(first) = seen.get(&file_name) {
            return Err(NameCollision {
                file_name,
                first: (*first).to_string(),
                second: item.name().to_string(),
            });
        }
        seen.insert(file_name.clone(), item.name());
        names.push(file_name);
    }

    Ok(names)
}
