//! Per-field-type tuning shared by the recognizer and the extractor.
//!
//! Each [`FieldType`] owns one [`FieldProfile`]: what the OCR engine is
//! allowed to see (whitelist, page segmentation), how hard the crop is
//! conditioned, whether a low-confidence read is retried inverted, and which
//! correction table the extractor applies to the recognized text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Numeric,
    Date,
    Phone,
    Email,
    Text,
    Block,
}

impl FieldType {
    pub fn profile(self) -> &'static FieldProfile {
        match self {
            FieldType::Numeric => &NUMERIC,
            FieldType::Date => &DATE,
            FieldType::Phone => &PHONE,
            FieldType::Email => &EMAIL,
            FieldType::Text => &TEXT,
            FieldType::Block => &BLOCK,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Numeric => write!(f, "numeric"),
            FieldType::Date => write!(f, "date"),
            FieldType::Phone => write!(f, "phone"),
            FieldType::Email => write!(f, "email"),
            FieldType::Text => write!(f, "text"),
            FieldType::Block => write!(f, "block"),
        }
    }
}

/// How the engine should segment the crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    SingleLine,
    Block,
}

impl LayoutMode {
    /// Tesseract `tessedit_pageseg_mode` value.
    pub fn page_seg_mode(self) -> &'static str {
        match self {
            LayoutMode::SingleLine => "7",
            LayoutMode::Block => "6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecognitionProfile {
    pub whitelist: Option<&'static str>,
    pub layout: LayoutMode,
    pub preserve_interword_spaces: bool,
}

impl RecognitionProfile {
    /// Engine state between regions.
    pub const DEFAULT: RecognitionProfile = RecognitionProfile {
        whitelist: None,
        layout: LayoutMode::Block,
        preserve_interword_spaces: true,
    };
}

/// Which OCR substitution table the extractor applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    None,
    Numeric,
    Phone,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldProfile {
    pub recognition: RecognitionProfile,
    /// Contrast factor applied to the crop before recognition.
    pub contrast_factor: f32,
    /// Retry a low-confidence read on the inverted crop.
    pub retry_inverted: bool,
    pub correction: Correction,
}

const DIGIT_CONTRAST: f32 = 1.85;
const TEXT_CONTRAST: f32 = 1.5;

static NUMERIC: FieldProfile = FieldProfile {
    recognition: RecognitionProfile {
        whitelist: Some("0123456789CR-., "),
        layout: LayoutMode::SingleLine,
        preserve_interword_spaces: true,
    },
    contrast_factor: DIGIT_CONTRAST,
    retry_inverted: true,
    correction: Correction::Numeric,
};

static DATE: FieldProfile = FieldProfile {
    recognition: RecognitionProfile {
        whitelist: Some("0123456789/-TODAYtoday "),
        layout: LayoutMode::SingleLine,
        preserve_interword_spaces: true,
    },
    contrast_factor: DIGIT_CONTRAST,
    retry_inverted: true,
    correction: Correction::Date,
};

static PHONE: FieldProfile = FieldProfile {
    recognition: RecognitionProfile {
        whitelist: Some("0123456789()-. "),
        layout: LayoutMode::SingleLine,
        preserve_interword_spaces: true,
    },
    contrast_factor: DIGIT_CONTRAST,
    retry_inverted: true,
    correction: Correction::Phone,
};

static EMAIL: FieldProfile = FieldProfile {
    recognition: RecognitionProfile {
        whitelist: Some("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789@.-_+"),
        layout: LayoutMode::SingleLine,
        preserve_interword_spaces: false,
    },
    contrast_factor: TEXT_CONTRAST,
    retry_inverted: false,
    correction: Correction::None,
};

static TEXT: FieldProfile = FieldProfile {
    recognition: RecognitionProfile {
        whitelist: None,
        layout: LayoutMode::Block,
        preserve_interword_spaces: true,
    },
    contrast_factor: TEXT_CONTRAST,
    retry_inverted: false,
    correction: Correction::None,
};

static BLOCK: FieldProfile = FieldProfile {
    recognition: RecognitionProfile {
        whitelist: None,
        layout: LayoutMode::Block,
        preserve_interword_spaces: true,
    },
    contrast_factor: TEXT_CONTRAST,
    retry_inverted: false,
    correction: Correction::None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_types_retry_and_boost_harder() {
        for t in [FieldType::Numeric, FieldType::Date, FieldType::Phone] {
            let p = t.profile();
            assert!(p.retry_inverted, "{t} should retry");
            assert!(p.contrast_factor > FieldType::Text.profile().contrast_factor);
            assert_eq!(p.recognition.layout, LayoutMode::SingleLine);
        }
        for t in [FieldType::Email, FieldType::Text, FieldType::Block] {
            assert!(!t.profile().retry_inverted, "{t} should not retry");
        }
    }

    #[test]
    fn whitelists_restrict_alphabet() {
        let phone = FieldType::Phone.profile().recognition.whitelist.unwrap();
        assert!(!phone.contains('O'));
        assert!(phone.contains('('));
        assert!(FieldType::Text.profile().recognition.whitelist.is_none());
        assert!(!FieldType::Email.profile().recognition.preserve_interword_spaces);
    }

    #[test]
    fn correction_table_follows_type() {
        assert_eq!(FieldType::Numeric.profile().correction, Correction::Numeric);
        assert_eq!(FieldType::Phone.profile().correction, Correction::Phone);
        assert_eq!(FieldType::Date.profile().correction, Correction::Date);
        assert_eq!(FieldType::Email.profile().correction, Correction::None);
    }

    #[test]
    fn page_seg_modes() {
        assert_eq!(LayoutMode::SingleLine.page_seg_mode(), "7");
        assert_eq!(LayoutMode::Block.page_seg_mode(), "6");
        assert_eq!(RecognitionProfile::DEFAULT.layout, LayoutMode::Block);
    }
}
