//! Appearance and layout options for rendered examples.
//!
//! [`IpeOptions`] carries the attributes written into an example's fragment
//! (stroke, fill, pen, mark size, line cap) plus the background the finished
//! image is shown against. [`LayoutHints`] carries how the image is laid out
//! in the generated documentation.
//!
//! Both are plain values: every resolution starts from a fresh
//! [`Default`] and applies [`OptionOverrides`] / [`LayoutOverrides`] layers on
//! top, so no option record is ever shared between two items.

use serde::{Deserialize, Serialize};

/// Line cap style used for stroked example paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// Numeric cap code used in Ipe documents.
    pub fn ipe_code(self) -> u8 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }

    /// Parses the serialized (lowercase) name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "butt" => Some(LineCap::Butt),
            "round" => Some(LineCap::Round),
            "square" => Some(LineCap::Square),
            _ => None,
        }
    }
}

/// Rendering appearance of one example item.
///
/// | Field | Default |
/// |-------|---------|
/// | `stroke_color` | `black` |
/// | `fill_color` | `white` |
/// | `pen` | `normal` |
/// | `mark_size` | `normal` |
/// | `cap` | `butt` |
/// | `background_color` | `white` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpeOptions {
    pub stroke_color: String,
    pub fill_color: String,
    pub pen: String,
    pub mark_size: String,
    pub cap: LineCap,
    pub background_color: String,
}

impl Default for IpeOptions {
    fn default() -> Self {
        Self {
            stroke_color: "black".to_string(),
            fill_color: "white".to_string(),
            pen: "normal".to_string(),
            mark_size: "normal".to_string(),
            cap: LineCap::Butt,
            background_color: "white".to_string(),
        }
    }
}

/// A partial [`IpeOptions`]: only the fields that are set replace the base.
///
/// Unknown keys are rejected when deserializing, so a misspelled field in a
/// hints file is reported instead of being silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<LineCap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl OptionOverrides {
    /// Creates an empty override set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stroke_color(mut self, value: impl Into<String>) -> Self {
        self.stroke_color = Some(value.into());
        self
    }

    pub fn fill_color(mut self, value: impl Into<String>) -> Self {
        self.fill_color = Some(value.into());
        self
    }

    pub fn pen(mut self, value: impl Into<String>) -> Self {
        self.pen = Some(value.into());
        self
    }

    pub fn mark_size(mut self, value: impl Into<String>) -> Self {
        self.mark_size = Some(value.into());
        self
    }

    pub fn cap(mut self, value: LineCap) -> Self {
        self.cap = Some(value);
        self
    }

    pub fn background_color(mut self, value: impl Into<String>) -> Self {
        self.background_color = Some(value.into());
        self
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the set fields on top of `base`, field by field.
    pub fn apply(&self, base: IpeOptions) -> IpeOptions {
        IpeOptions {
            stroke_color: self.stroke_color.clone().unwrap_or(base.stroke_color),
            fill_color: self.fill_color.clone().unwrap_or(base.fill_color),
            pen: self.pen.clone().unwrap_or(base.pen),
            mark_size: self.mark_size.clone().unwrap_or(base.mark_size),
            cap: self.cap.unwrap_or(base.cap),
            background_color: self
                .background_color
                .clone()
                .unwrap_or(base.background_color),
        }
    }
}

/// Default display width of an example image.
pub const DEFAULT_EXAMPLE_WIDTH: u32 = 200;

/// How an example image is laid out in the documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutHints {
    pub width: u32,
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            width: DEFAULT_EXAMPLE_WIDTH,
        }
    }
}

/// A partial [`LayoutHints`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl LayoutOverrides {
    pub fn apply(&self, base: LayoutHints) -> LayoutHints {
        LayoutHints {
            width: self.width.unwrap_or(base.width),
        }
    }
}
