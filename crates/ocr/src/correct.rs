//! Substitution tables for systematic OCR confusions.

use crate::profile::{Correction, FieldType};

re!(re_today, r"(?i)today");

/// Apply the correction table of `field_type` to recognized text.
pub fn correct_ocr_errors(text: &str, field_type: FieldType) -> String {
    match field_type.profile().correction {
        Correction::None => text.to_string(),
        Correction::Numeric => substitute(text)
            .chars()
            .filter(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | 'C' | 'R' | '-'))
            .collect(),
        Correction::Phone => substitute(text)
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '(' | ')' | '-' | '.' | ' '))
            .collect(),
        Correction::Date => correct_date(text),
    }
}

/// Glyphs that read as digits on a numeric field.
fn substitute(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'O' | 'o' => '0',
            'l' | 'I' | '|' => '1',
            'S' | 's' | '$' => '5',
            'Z' | 'z' => '2',
            'B' | 'b' => '8',
            'G' | 'g' => '9',
            other => other,
        })
        .collect()
}

// "today" is a legal value on the form; it must survive the O→0 substitution.
fn correct_date(text: &str) -> String {
    if !re_today().is_match(text) {
        return substitute(text)
            .chars()
            .filter(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '/' | '-'))
            .collect();
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in re_today().find_iter(text) {
        out.push_str(&substitute(&text[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&substitute(&text[last..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_maps_confusable_glyphs() {
        assert_eq!(correct_ocr_errors("O12S.3O", FieldType::Numeric), "0125.30");
        assert_eq!(correct_ocr_errors("l|I ZBG", FieldType::Numeric), "111 289");
    }

    #[test]
    fn numeric_keeps_cr_prefix_and_hyphen() {
        assert_eq!(correct_ocr_errors("CR 4O2-7x", FieldType::Numeric), "CR 402-7");
    }

    #[test]
    fn phone_keeps_punctuation() {
        assert_eq!(correct_ocr_errors("(S55) l23-4567", FieldType::Phone), "(555) 123-4567");
        assert_eq!(correct_ocr_errors("555.123.4567 ext", FieldType::Phone), "555.123.4567 ");
    }

    #[test]
    fn date_strips_letters() {
        assert_eq!(correct_ocr_errors("O3/OS/2O24", FieldType::Date), "03/05/2024");
        assert_eq!(correct_ocr_errors("3-5-24 x", FieldType::Date), "3-5-24 ");
    }

    #[test]
    fn date_preserves_today_token() {
        assert_eq!(correct_ocr_errors("TODAY", FieldType::Date), "TODAY");
        assert_eq!(correct_ocr_errors("O1 today", FieldType::Date), "01 today");
    }

    #[test]
    fn text_types_pass_through() {
        assert_eq!(correct_ocr_errors("Bob's Rugs", FieldType::Text), "Bob's Rugs");
        assert_eq!(correct_ocr_errors("Jo@Example.com", FieldType::Email), "Jo@Example.com");
    }
}
