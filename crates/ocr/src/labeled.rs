//! The labeled text block handed from recognition to extraction.

use std::fmt;

use tracing::warn;

use crate::recognizer::RegionResult;
use crate::regions::FormField;

re!(re_horizontal_ws, r"[^\S\n]+");
re!(re_blank_run, r"\n{3,}");

/// Marks the start of the informational footer; extraction ignores
/// everything from here on.
pub const METADATA_MARKER: &str = "[OCR_METADATA]";

/// Per-region results in canonical order plus confidence metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledBlock {
    entries: Vec<(FormField, RegionResult)>,
    confidence_bar: f32,
}

impl LabeledBlock {
    /// Region text is cleaned on the way in.
    pub fn new(entries: Vec<(FormField, RegionResult)>, confidence_bar: f32) -> Self {
        let entries = entries
            .into_iter()
            .map(|(field, r)| (field, RegionResult::new(clean_line(&r.text), r.confidence)))
            .collect();
        Self { entries, confidence_bar }
    }

    pub fn entries(&self) -> &[(FormField, RegionResult)] {
        &self.entries
    }

    pub fn average_confidence(&self) -> f32 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.entries.iter().map(|(_, r)| r.confidence).sum::<f32>() / self.entries.len() as f32
    }

    /// Fields read below the confidence bar, with their confidence.
    pub fn low_confidence_fields(&self) -> Vec<(FormField, f32)> {
        self.entries
            .iter()
            .filter(|(_, r)| r.confidence < self.confidence_bar)
            .map(|(f, r)| (*f, r.confidence))
            .collect()
    }

    pub fn warn_low_confidence(&self) {
        let low = self.low_confidence_summary();
        if low != "None" {
            warn!(fields = %low, "low confidence OCR fields");
        }
    }

    fn low_confidence_summary(&self) -> String {
        let low: Vec<String> = self
            .low_confidence_fields()
            .into_iter()
            .map(|(f, c)| format!("{}({}%)", f.key(), c.round()))
            .collect();
        if low.is_empty() {
            "None".to_string()
        } else {
            low.join(", ")
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LabeledBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, r) in &self.entries {
            match field {
                // Printed on the form as one token, no colon.
                FormField::InvoiceNumber => writeln!(f, "{} {}", field.label(), r.text)?,
                _ => writeln!(f, "{}: {}", field.label(), r.text)?,
            }
        }
        writeln!(f)?;
        writeln!(f, "{METADATA_MARKER}")?;
        writeln!(f, "Average Confidence: {}%", self.average_confidence().round())?;
        write!(f, "Low Confidence Fields: {}", self.low_confidence_summary())
    }
}

/// Normalize one region's raw text: CR becomes LF, horizontal whitespace
/// runs collapse to one space, at most one blank line in a row.
pub fn clean_line(text: &str) -> String {
    let text = text.replace('\r', "\n");
    let text = re_horizontal_ws().replace_all(&text, " ");
    re_blank_run().replace_all(&text, "\n\n").trim().to_string()
}
