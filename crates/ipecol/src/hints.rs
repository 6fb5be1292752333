//! Hints table and option resolution.
//!
//! A [`HintsTable`] is the optional, externally supplied configuration that
//! tunes how examples look. It has three sub-mappings:
//!
//! - `tags`: keyed by tag type (`symbol`, `dashstyle`, ...) or by kind
//!   (`mark`, `dash-style`, ...), partial [`IpeOptions`]
//! - `styles`: keyed by style name (`mark/disk(sx)`), partial [`IpeOptions`]
//! - `layout`: keyed by kind, partial [`LayoutHints`]; an unknown kind is
//!   an error
//!
//! # Resolution Order
//!
//! For one item, options are resolved field by field, later layers winning:
//!
//! 1. [`IpeOptions::default`]
//! 2. `tags[tag_type]`
//! 3. `tags[kind]`
//! 4. `styles[name]`
//!
//! Handler-forced values (for example the heavy pen of dash styles) are
//! applied by the classifier after this resolution and win over all of them.
//!
//! # Example
//!
//! ```rust
//! use ipecol::{HintsTable, StyleKind};
//!
//! let hints = HintsTable::from_yaml_str(r#"
//! tags:
//!   mark: { fill_color: red }
//! styles:
//!   "mark/disk": { fill_color: blue }
//! "#).unwrap();
//!
//! let options = hints.resolve_options(StyleKind::Mark, "mark/disk", "symbol");
//! assert_eq!(options.fill_color, "blue");
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::StyleKind;
use crate::options::{IpeOptions, LayoutHints, LayoutOverrides, OptionOverrides};

/// Error loading a hints table.
#[derive(Debug, thiserror::Error)]
pub enum HintsError {
    #[error("failed to read hints file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid hints (YAML): {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid hints (JSON): {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-type, per-name and per-kind overrides for example rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HintsTable {
    pub tags: BTreeMap<String, OptionOverrides>,
    pub styles: BTreeMap<String, OptionOverrides>,
    pub layout: BTreeMap<StyleKind, LayoutOverrides>,
}

impl HintsTable {
    /// Creates an empty table; resolving against it yields the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, HintsError> {
        // An empty YAML document deserializes as unit, not as an empty map.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, HintsError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads a hints file, choosing JSON for `.json` files and YAML otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HintsError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| HintsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Adds a tag-level override (keyed by tag type or kind name).
    pub fn with_tag(mut self, key: impl Into<String>, overrides: OptionOverrides) -> Self {
        self.tags.insert(key.into(), overrides);
        self
    }

    /// Adds a style-name-level override.
    pub fn with_style(mut self, name: impl Into<String>, overrides: OptionOverrides) -> Self {
        self.styles.insert(name.into(), overrides);
        self
    }

    /// Adds a layout override for a kind.
    pub fn with_layout(mut self, kind: StyleKind, overrides: LayoutOverrides) -> Self {
        self.layout.insert(kind, overrides);
        self
    }

    /// Resolves the effective options for one item.
    pub fn resolve_options(&self, kind: StyleKind, name: &str, tag_type: &str) -> IpeOptions {
        let mut options = IpeOptions::default();
        if let Some(overrides) = self.tags.get(tag_type) {
            options = overrides.apply(options);
        }
        if kind.as_str() != tag_type {
            if let Some(overrides) = self.tags.get(kind.as_str()) {
                options = overrides.apply(options);
            }
        }
        if let Some(overrides) = self.styles.get(name) {
            options = overrides.apply(options);
        }
        options
    }

    /// Resolves the layout hints for a kind.
    pub fn resolve_layout(&self, kind: StyleKind) -> LayoutHints {
        self.layout
            .get(&kind)
            .map(|overrides| overrides.apply(LayoutHints::default()))
            .unwrap_or_default()
    }
}

/// Resolves options against an optional table; `None` yields the defaults.
pub fn resolve_options(
    hints: Option<&HintsTable>,
    kind: StyleKind,
    name: &str,
    tag_type: &str,
) -> IpeOptions {
    match hints {
        Some(hints) => hints.resolve_options(kind, name, tag_type),
        None => IpeOptions::default(),
    }
}

/// Resolves layout hints against an optional table.
pub fn resolve_layout(hints: Option<&HintsTable>, kind: StyleKind) -> LayoutHints {
    hints
        .map(|hints| hints.resolve_layout(kind))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LineCap;
    use proptest::prelude::*;

    // =========================================================================
    // Resolution order
    // =========================================================================

    #[test]
    fn test_no_hints_yields_defaults() {
        let options = resolve_options(None, StyleKind::Mark, "mark/disk", "symbol");
        assert_eq!(options, IpeOptions::default());

        let options = HintsTable::new().resolve_options(StyleKind::Mark, "mark/disk", "symbol");
        assert_eq!(options, IpeOptions::default());
    }

    #[test]
    fn test_style_beats_tag() {
        let hints = HintsTable::new()
            .with_tag("mark", OptionOverrides::new().fill_color("red"))
            .with_style("mark/disk", OptionOverrides::new().fill_color("blue"));

        let options = hints.resolve_options(StyleKind::Mark, "mark/disk", "symbol");
        assert_eq!(options.fill_color, "blue");
    }

    #[test]
    fn test_kind_beats_tag_type() {
        let hints = HintsTable::new()
            .with_tag("symbol", OptionOverrides::new().pen("heavier").stroke_color("green"))
            .with_tag("mark", OptionOverrides::new().pen("fat"));

        let options = hints.resolve_options(StyleKind::Mark, "mark/box", "symbol");
        assert_eq!(options.pen, "fat");
        assert_eq!(options.stroke_color, "green");
    }

    #[test]
    fn test_override_is_per_field() {
        let hints = HintsTable::new()
            .with_tag("dashstyle", OptionOverrides::new().stroke_color("red").cap(LineCap::Round))
            .with_style("dotted", OptionOverrides::new().stroke_color("blue"));

        let options = hints.resolve_options(StyleKind::DashStyle, "dotted", "dashstyle");
        assert_eq!(options.stroke_color, "blue");
        assert_eq!(options.cap, LineCap::Round);
        assert_eq!(options.fill_color, "white");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let hints = HintsTable::new()
            .with_tag("color", OptionOverrides::new().stroke_color("gray"))
            .with_style("red", OptionOverrides::new().pen("fat"));

        let first = hints.resolve_options(StyleKind::Color, "red", "color");
        let second = hints.resolve_options(StyleKind::Color, "red", "color");
        assert_eq!(first, second);
    }

    #[test]
    fn test_other_names_unaffected() {
        let hints =
            HintsTable::new().with_style("mark/disk", OptionOverrides::new().fill_color("blue"));
        let options = hints.resolve_options(StyleKind::Mark, "mark/box", "symbol");
        assert_eq!(options.fill_color, "white");
    }

    // =========================================================================
    // Layout
    // =========================================================================

    #[test]
    fn test_layout_resolution() {
        let hints =
            HintsTable::new().with_layout(StyleKind::TextStyle, LayoutOverrides { width: Some(400) });

        assert_eq!(hints.resolve_layout(StyleKind::TextStyle).width, 400);
        assert_eq!(hints.resolve_layout(StyleKind::Mark).width, 200);
        assert_eq!(resolve_layout(None, StyleKind::TextStyle).width, 200);
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn test_from_yaml() {
        let hints = HintsTable::from_yaml_str(
            r#"
tags:
  mark:
    fill_color: red
    cap: round
styles:
  "mark/disk":
    fill_color: blue
layout:
  text-style:
    width: 320
"#,
        )
        .unwrap();

        assert_eq!(hints.tags["mark"].cap, Some(LineCap::Round));
        assert_eq!(hints.styles["mark/disk"].fill_color.as_deref(), Some("blue"));
        assert_eq!(hints.layout[&StyleKind::TextStyle].width, Some(320));
    }

    #[test]
    fn test_from_yaml_missing_sections() {
        let hints = HintsTable::from_yaml_str("styles: {}").unwrap();
        assert!(hints.tags.is_empty());
        assert!(hints.layout.is_empty());

        assert_eq!(HintsTable::from_yaml_str("").unwrap(), HintsTable::new());
    }

    #[test]
    fn test_unknown_option_key_rejected() {
        let result = HintsTable::from_yaml_str("tags:\n  mark:\n    fill_colour: red\n");
        assert!(matches!(result, Err(HintsError::Yaml(_))));

        let result = HintsTable::from_json_str(r#"{"styles": {"x": {"pen": "fat", "wdth": 3}}}"#);
        assert!(matches!(result, Err(HintsError::Json(_))));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = HintsTable::from_yaml_str("style:\n  dotted:\n    pen: fat\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_layout_kind_rejected() {
        let result = HintsTable::from_yaml_str("layout:\n  textstyle:\n    width: 400\n");
        assert!(matches!(result, Err(HintsError::Yaml(_))));

        let result = HintsTable::from_json_str(r#"{"layout": {"marks": {"width": 64}}}"#);
        assert!(matches!(result, Err(HintsError::Json(_))));

        let hints = HintsTable::from_json_str(r#"{"layout": {"dash-style": {"width": 64}}}"#).unwrap();
        assert_eq!(hints.resolve_layout(StyleKind::DashStyle).width, 64);
    }

    #[test]
    fn test_from_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("hints.json");
        std::fs::write(&json, r#"{"tags": {"color": {"pen": "fat"}}}"#).unwrap();
        let hints = HintsTable::from_path(&json).unwrap();
        assert_eq!(hints.tags["color"].pen.as_deref(), Some("fat"));

        let yaml = dir.path().join("hints.yaml");
        std::fs::write(&yaml, "tags:\n  color:\n    pen: heavier\n").unwrap();
        let hints = HintsTable::from_path(&yaml).unwrap();
        assert_eq!(hints.tags["color"].pen.as_deref(), Some("heavier"));

        let missing = HintsTable::from_path(dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(HintsError::Read { .. })));
    }

    // =========================================================================
    // Precedence property
    // =========================================================================

    fn maybe_color() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z]{1,8}")
    }

    proptest! {
        #[test]
        fn prop_precedence_per_field(
            tag_stroke in maybe_color(),
            tag_fill in maybe_color(),
            style_stroke in maybe_color(),
            style_fill in maybe_color(),
        ) {
            let mut tag = OptionOverrides::new();
            tag.stroke_color = tag_stroke.clone();
            tag.fill_color = tag_fill.clone();
            let mut style = OptionOverrides::new();
            style.stroke_color = style_stroke.clone();
            style.fill_color = style_fill.clone();

            let hints = HintsTable::new().with_tag("color", tag).with_style("c", style);
            let options = hints.resolve_options(StyleKind::Color, "c", "color");
            let defaults = IpeOptions::default();

            let expected_stroke = style_stroke.or(tag_stroke).unwrap_or(defaults.stroke_color);
            let expected_fill = style_fill.or(tag_fill).unwrap_or(defaults.fill_color);
            prop_assert_eq!(options.stroke_color, expected_stroke);
            prop_assert_eq!(options.fill_color, expected_fill);
            prop_assert_eq!(options.pen, defaults.pen);
        }
    }
}
