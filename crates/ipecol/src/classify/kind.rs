//! Semantic kinds a style tag can be classified into.

use serde::{Deserialize, Serialize};

/// The semantic category of a classified style item.
///
/// The kind decides which fragment template renders the item, which
/// `tags`/`layout` hint entries apply to it, and is reported in each
/// [`ExampleRecord`](crate::ExampleRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleKind {
    Mark,
    Arrow,
    Decoration,
    DashStyle,
    Color,
    TextStyle,
}

impl StyleKind {
    /// All kinds, in default registration order.
    pub const ALL: [StyleKind; 6] = [
        StyleKind::Mark,
        StyleKind::Arrow,
        StyleKind::Decoration,
        StyleKind::DashStyle,
        StyleKind::Color,
        StyleKind::TextStyle,
    ];

    /// The kind's name as used in hints files and templates.
    pub fn as_str(self) -> &'static str {
        match self {
            StyleKind::Mark => "mark",
            StyleKind::Arrow => "arrow",
            StyleKind::Decoration => "decoration",
            StyleKind::DashStyle => "dash-style",
            StyleKind::Color => "color",
            StyleKind::TextStyle => "text-style",
        }
    }

    /// Name of the built-in fragment template for this kind.
    pub fn template_name(self) -> &'static str {
        match self {
            StyleKind::Mark => "mark",
            StyleKind::Arrow => "arrow",
            StyleKind::Decoration => "decoration",
            StyleKind::DashStyle => "dashstyle",
            StyleKind::Color => "color",
            StyleKind::TextStyle => "textstyle",
        }
    }
}

impl std::fmt::Display for StyleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_serialization() {
        for kind in StyleKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_kind_parses_from_its_name() {
        for kind in StyleKind::ALL {
            let parsed: StyleKind = serde_json::from_str(&format!("\"{}\"", kind.as_str())).unwrap();
            assert_eq!(parsed, kind);
        }
        assert!(serde_json::from_str::<StyleKind>("\"textstyle\"").is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(StyleKind::DashStyle.to_string(), "dash-style");
        assert_eq!(StyleKind::TextStyle.to_string(), "text-style");
    }
}
