use serde::{Deserialize, Serialize};

/// Horizontal text alignment inside a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

/// Per-cell visual style.
///
/// Every field is optional: `None` means "not set" (renderer default), which lets the same
/// type double as a partial patch when applying styles to existing cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<HorizontalAlign>,
}

impl CellStyle {
    pub fn background(color: impl Into<String>) -> Self {
        Self { background_color: Some(color.into()), ..Default::default() }
    }

    pub fn text(color: impl Into<String>) -> Self {
        Self { text_color: Some(color.into()), ..Default::default() }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn with_align(mut self, align: HorizontalAlign) -> Self {
        self.align = Some(align);
        self
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.background_color.is_none()
            && self.text_color.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.align.is_none()
    }

    /// Overlay the fields set in `patch`, leaving the rest unchanged
    pub fn merge(&mut self, patch: &CellStyle) {
        if let Some(ref c) = patch.background_color {
            self.background_color = Some(c.clone());
        }
        if let Some(ref c) = patch.text_color {
            self.text_color = Some(c.clone());
        }
        if let Some(b) = patch.bold {
            self.bold = Some(b);
        }
        if let Some(i) = patch.italic {
            self.italic = Some(i);
        }
        if let Some(u) = patch.underline {
            self.underline = Some(u);
        }
        if let Some(a) = patch.align {
            self.align = Some(a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let mut style = CellStyle::background("#ff0000").with_bold(true);
        style.merge(&CellStyle::text("#0000ff"));

        assert_eq!(style.background_color.as_deref(), Some("#ff0000"));
        assert_eq!(style.text_color.as_deref(), Some("#0000ff"));
        assert_eq!(style.bold, Some(true));
    }

    #[test]
    fn test_merge_overrides_set_fields() {
        let mut style = CellStyle::default().with_bold(true).with_align(HorizontalAlign::Left);
        style.merge(&CellStyle::default().with_bold(false).with_align(HorizontalAlign::Right));

        assert_eq!(style.bold, Some(false));
        assert_eq!(style.align, Some(HorizontalAlign::Right));
    }

    #[test]
    fn test_is_empty() {
        assert!(CellStyle::default().is_empty());
        assert!(!CellStyle::default().with_italic(false).is_empty());
    }

    #[test]
    fn test_serializes_only_set_fields() {
        let json = serde_json::to_string(&CellStyle::background("#eee").with_underline(true)).unwrap();
        assert_eq!(json, r##"{"backgroundColor":"#eee","underline":true}"##);
    }
}
