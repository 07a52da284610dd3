use chrono::{Local, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use orderscan_core::{LineItem, Money, OrderRecord};

use crate::correct::correct_ocr_errors;
use crate::labeled::METADATA_MARKER;
use crate::profile::FieldType;

type Rule = fn() -> &'static Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

re!(re_trailing_ws, r"[ \t]+\n");
re!(re_blank_run, r"\n{3,}");
re!(re_colon, r":\s*");

// Lines that open a region of the labeled block.
re!(re_canonical_label,
    r"(?i)^(?:invoice\s*#\s*cr\b|(?:sold\s*to|directions|customer\s*email|date|home\s*phone|cell\s*phone|installation\s*date|installed\s*by|salesperson|manufacturer|size|style|color|pad|rug\s*pad|unit\s*/\s*amount\s*block|totals\s*block)\s*:)");

re!(re_inv_cr, r"(?i)INVOICE[^\S\n]*#[^\S\n]*CR[^\S\n]*([A-Z0-9\- ]{3,})");
re!(re_inv_cr_digits, r"(?i)\bCR[^\S\n]*#?[^\S\n]*([0-9]{4,})\b");
re!(re_inv_digits, r"(?i)INVOICE[^\S\n]*[#:]?[^\S\n]*([0-9]{4,})");
re!(re_cr_prefix, r"(?i)^CR\s*");

re!(re_sold_to, r"(?i)sold\s*to");
re!(re_customer_name, r"(?i)customer\s*name");
re!(re_bill_to, r"(?i)bill\s*to");
re!(re_directions, r"(?i)directions");
re!(re_address, r"(?i)address");
re!(re_location, r"(?i)location");
re!(re_customer_email, r"(?i)customer\s*email");
re!(re_e_mail, r"(?i)e[\s-]?mail");
re!(re_email_address, r"(?i)email\s*address");
re!(re_installed_by, r"(?i)installed\s*by");
re!(re_installer, r"(?i)installer");
re!(re_salesperson, r"(?i)salesperson");
re!(re_sales_rep, r"(?i)sales\s*rep");
re!(re_sold_by, r"(?i)sold\s*by");
re!(re_manufacturer, r"(?i)manufacturer");
re!(re_brand, r"(?i)brand");
re!(re_maker, r"(?i)maker");
re!(re_size, r"(?i)\bsize\b");
re!(re_dimensions, r"(?i)dimensions");
re!(re_style, r"(?i)\bstyle\b");
re!(re_type, r"(?i)type");
re!(re_pattern, r"(?i)pattern");
re!(re_color, r"(?i)\bcolor\b");
re!(re_colour, r"(?i)colour");
re!(re_pad, r"(?i)^pad\b");
re!(re_padding, r"(?i)padding");
re!(re_rug_pad, r"(?i)rug\s*pad");
re!(re_carpet_pad, r"(?i)carpet\s*pad");
re!(re_unit_amount, r"(?i)unit[\s/]*amount\s*block");

re!(re_home_phone, r"(?i)home\s*phone");
re!(re_cell_phone, r"(?i)cell\s*phone");
re!(re_phone_us, r"\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}");
re!(re_phone_local, r"\d{3}[\s.-]?\d{4}");
re!(re_phone_bare, r"\d{10}");

re!(re_order_date, r"(?i)\b(?:order\s*)?date\b");
re!(re_install_date, r"(?i)install(?:ation)?\s*date");
re!(re_today_word, r"(?i)\btoday\b");
re!(re_date_mdy, r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}");
re!(re_date_ymd, r"\b\d{4}[/-]\d{1,2}[/-]\d{1,2}");
re!(re_date_spaced, r"\b\d{1,2}\s+\d{1,2}\s+\d{2,4}");
re!(re_ws_run, r"\s+");
re!(re_not_available, r"(?i)^(?:n/a|na|none)$");
re!(re_today_only, r"(?i)^today$");
re!(re_iso_exact, r"^\d{4}-\d{2}-\d{2}$");
re!(re_mdy_exact, r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})$");
re!(re_ymd_exact, r"^(\d{4})[/-](\d{1,2})[/-](\d{1,2})$");

re!(re_thousands, r"(\d),(\d{3})\b");
re!(re_money_number, r"\d+(?:\.\d{1,2})?");

// ── Label tables (first non-empty wins) ──────────────────────────────────────

const INVOICE_RULES: &[Rule] = &[re_inv_cr, re_inv_cr_digits, re_inv_digits];

const SOLD_TO: &[Rule] = &[re_sold_to, re_customer_name, re_bill_to];
const DIRECTIONS: &[Rule] = &[re_directions, re_address, re_location];
const EMAIL: &[Rule] = &[re_customer_email, re_e_mail, re_email_address];
const INSTALLED_BY: &[Rule] = &[re_installed_by, re_installer];
const SALESPERSON: &[Rule] = &[re_salesperson, re_sales_rep, re_sold_by];
const MANUFACTURER: &[Rule] = &[re_manufacturer, re_brand, re_maker];
const SIZE: &[Rule] = &[re_size, re_dimensions];
const STYLE: &[Rule] = &[re_style, re_type, re_pattern];
const COLOR: &[Rule] = &[re_color, re_colour];
const PAD: &[Rule] = &[re_pad, re_padding];
const RUG_PAD: &[Rule] = &[re_rug_pad, re_carpet_pad];

const PHONE_PATTERNS: &[Rule] = &[re_phone_us, re_phone_local, re_phone_bare];
const DATE_PATTERNS: &[Rule] = &[re_date_mdy, re_date_ymd, re_date_spaced];

// Lines the lookahead scans past a label line with no inline value. Five, as
// the paper-form parser always read it; the label line itself is not counted.
const LOOKAHEAD: usize = 5;

// ── Public extraction API ─────────────────────────────────────────────────────

/// A parsed order plus the critical fields that came back empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub record: OrderRecord,
    pub missing_critical: Vec<&'static str>,
}

pub struct Extractor;

impl Extractor {
    /// Parse a labeled text block into an order record. Never fails: fields
    /// that cannot be found are left empty (or zero for money).
    pub fn extract(ocr_text: &str) -> Extraction {
        Self::extract_on(ocr_text, Local::now().date_naive())
    }

    /// As [`Extractor::extract`], resolving "today" against `today`.
    pub fn extract_on(ocr_text: &str, today: NaiveDate) -> Extraction {
        let text = cleanup_text(ocr_text);
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let (unit_price, amount) = pick_unit_and_amount(&block_after_label(&lines, re_unit_amount()));
        let item = LineItem {
            manufacturer: first_labeled(&lines, MANUFACTURER),
            size: first_labeled(&lines, SIZE),
            style: first_labeled(&lines, STYLE),
            color: first_labeled(&lines, COLOR),
            pad: first_labeled(&lines, PAD),
            rug_pad: first_labeled(&lines, RUG_PAD),
            unit_price,
            amount,
            ..LineItem::default()
        };

        let record = OrderRecord {
            invoice_number: extract_invoice_number(&text),
            sold_to: first_labeled(&lines, SOLD_TO),
            directions: first_labeled(&lines, DIRECTIONS),
            email: first_labeled(&lines, EMAIL).to_lowercase(),
            order_date: normalize_date_on(&pick_date_near(&text, &lines, re_order_date()), today),
            installation_date: normalize_date_on(&pick_date_near(&text, &lines, re_install_date()), today),
            home_phone: pick_phone_near(&text, &lines, re_home_phone()),
            cell_phone: pick_phone_near(&text, &lines, re_cell_phone()),
            installed_by: first_labeled(&lines, INSTALLED_BY),
            salesperson: first_labeled(&lines, SALESPERSON),
            items: vec![item],
        };

        let missing_critical = record.missing_critical_fields();
        if !missing_critical.is_empty() {
            warn!(fields = %missing_critical.join(", "), "missing critical fields");
        }
        Extraction { record, missing_critical }
    }
}

// ── Text layout helpers ───────────────────────────────────────────────────────

fn cleanup_text(raw: &str) -> String {
    // The metadata footer is informational only.
    let body = raw.split(METADATA_MARKER).next().unwrap_or_default();
    let text = body.replace('\r', "\n");
    let text = re_trailing_ws().replace_all(&text, "\n");
    re_blank_run().replace_all(&text, "\n\n").trim().to_string()
}

/// Whether `line` opens one of the form's own regions.
pub fn is_label_line(line: &str) -> bool {
    re_canonical_label().is_match(line.trim())
}

/// Value for the first line matching `label`: the text after its first colon,
/// otherwise the next non-blank line before another label.
fn line_after_label(lines: &[&str], label: &Regex) -> String {
    for (i, line) in lines.iter().enumerate() {
        if !label.is_match(line) {
            continue;
        }
        let inline = re_colon().split(line).skip(1).collect::<Vec<_>>().join(": ");
        let inline = inline.trim();
        if !inline.is_empty() {
            return inline.to_string();
        }
        let following = lines.iter().take((i + 1 + LOOKAHEAD).min(lines.len())).skip(i + 1);
        for next in following {
            if is_label_line(next) {
                break;
            }
            if !next.is_empty() {
                return next.to_string();
            }
        }
    }
    String::new()
}

fn first_labeled(lines: &[&str], labels: &[Rule]) -> String {
    labels
        .iter()
        .map(|label| line_after_label(lines, label()))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Inline value of the first line matching `label` joined with its
/// continuation lines, for regions read as a block.
fn block_after_label(lines: &[&str], label: &Regex) -> String {
    let Some(i) = lines.iter().position(|l| label.is_match(l)) else {
        return String::new();
    };
    let inline = re_colon().split(lines[i]).skip(1).collect::<Vec<_>>().join(": ");
    std::iter::once(inline.trim())
        .chain(lines[i + 1..].iter().copied().take_while(|l| !is_label_line(l)))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Each line matching `label` joined with the `extra` lines after it.
fn near_label(lines: &[&str], label: &Regex, extra: usize) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| label.is_match(line))
        .map(|(i, _)| lines[i..(i + 1 + extra).min(lines.len())].join(" "))
        .collect()
}

// ── Invoice number ────────────────────────────────────────────────────────────

fn extract_invoice_number(text: &str) -> String {
    for rule in INVOICE_RULES {
        let Some(c) = rule().captures(text) else { continue };
        let Some(m) = c.get(1) else { continue };
        let raw = re_cr_prefix().replace(m.as_str().trim(), "");
        let number = correct_ocr_errors(&raw, FieldType::Numeric);
        let number = number.trim();
        if !number.is_empty() {
            return format!("CR {number}");
        }
    }
    String::new()
}

// ── Phone ─────────────────────────────────────────────────────────────────────

// Falls back to the whole text when nothing near the label reads as a phone.
fn pick_phone_near(text: &str, lines: &[&str], label: &Regex) -> String {
    near_label(lines, label, 2)
        .iter()
        .find_map(|near| pick_phone(near))
        .or_else(|| pick_phone(text))
        .unwrap_or_default()
}

fn pick_phone(text: &str) -> Option<String> {
    let corrected = correct_ocr_errors(text, FieldType::Phone);
    PHONE_PATTERNS
        .iter()
        .find_map(|p| p().find(&corrected))
        .map(|m| format_phone(m.as_str()))
}

/// Canonical US layout for 10- and 7-digit numbers; anything else verbatim.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        7 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => phone.to_string(),
    }
}

// ── Date ─────────────────────────────────────────────────────────────────────

fn pick_date_near(text: &str, lines: &[&str], label: &Regex) -> String {
    near_label(lines, label, 1)
        .iter()
        .find_map(|near| pick_date(near))
        .or_else(|| pick_date(text))
        .unwrap_or_default()
}

fn pick_date(text: &str) -> Option<String> {
    let corrected = correct_ocr_errors(text, FieldType::Date);
    if re_today_word().is_match(&corrected) {
        return Some("TODAY".to_string());
    }
    DATE_PATTERNS
        .iter()
        .find_map(|p| p().find(&corrected))
        .map(|m| re_ws_run().replace_all(m.as_str(), "/").into_owned())
}

/// Normalize a picked date to ISO `YYYY-MM-DD`, or empty when unusable.
pub fn normalize_date_on(raw: &str, today: NaiveDate) -> String {
    let v = raw.trim();
    if v.is_empty() || re_not_available().is_match(v) {
        return String::new();
    }
    if re_today_only().is_match(v) {
        return today.format("%Y-%m-%d").to_string();
    }
    if re_iso_exact().is_match(v) {
        return v.to_string();
    }

    let (year, month, day) = if let Some(c) = re_ymd_exact().captures(v) {
        (parse_num(&c[1]), parse_num(&c[2]), parse_num(&c[3]))
    } else if let Some(c) = re_mdy_exact().captures(v) {
        let year = parse_num(&c[3]);
        (if year < 100 { year + 2000 } else { year }, parse_num(&c[1]), parse_num(&c[2]))
    } else {
        return String::new();
    };

    // Range check only; the form is reviewed by a person before storage.
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return String::new();
    }
    format!("{year:04}-{month:02}-{day:02}")
}

fn parse_num(s: &str) -> u32 {
    s.parse().unwrap_or(0)
}

// ── Money ─────────────────────────────────────────────────────────────────────

/// First amount in `s` after OCR correction, zero when there is none.
pub fn parse_money(s: &str) -> Money {
    let cleaned: String = s.chars().filter(|c| !matches!(c, ',' | '$')).collect();
    let corrected = correct_ocr_errors(&cleaned, FieldType::Numeric);
    re_money_number()
        .find(&corrected)
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
        .map(Money::from_decimal)
        .unwrap_or_default()
}

/// Unit price and line amount from the unit/amount region.
///
/// Values of 10 or more are taken as prices: one price fills both, two or
/// more give unit then amount. Without a plausible price the first number
/// fills both.
pub fn pick_unit_and_amount(block: &str) -> (Money, Money) {
    let mut text = block.replace('$', "");
    while re_thousands().is_match(&text) {
        text = re_thousands().replace_all(&text, "$1$2").into_owned();
    }
    let text = correct_ocr_errors(&text.replace(',', " "), FieldType::Numeric);

    let nums: Vec<Money> = re_money_number().find_iter(&text).map(|m| parse_money(m.as_str())).collect();
    let floor = Money::from_decimal(Decimal::TEN);
    let prices: Vec<Money> = nums.iter().copied().filter(|n| *n >= floor).collect();

    match (prices.as_slice(), nums.first()) {
        ([only], _) => (*only, *only),
        ([unit, amount, ..], _) => (*unit, *amount),
        ([], Some(first)) => (*first, *first),
        ([], None) => (Money::zero(), Money::zero()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    const FULL_BLOCK: &str = "INVOICE # CR 48213
Sold to: Jane Doe
Directions: 12 Elm St, Springfield
Customer Email: Jane.Doe@Example.COM
Date: 3/5/24
Home Phone: (555) 123-4567
Cell Phone: 555 987 6543
Installation Date: 3/l9/2O24
Installed By: Mike
Salesperson: Rita
Manufacturer: Shaw
Size: 12x15
Style: Berber
Color: Sand
Pad: 8lb
Rug Pad: none
Unit/Amount Block: 2 45.00
90.00
Totals Block: 90.00

[OCR_METADATA]
Average Confidence: 84%
Low Confidence Fields: None";

    // ── Full block ──────────────────────────────────────────────────────────

    #[test]
    fn extracts_full_labeled_block() {
        let e = Extractor::extract_on(FULL_BLOCK, day());
        let r = &e.record;
        assert_eq!(r.invoice_number, "CR 48213");
        assert_eq!(r.sold_to, "Jane Doe");
        assert_eq!(r.directions, "12 Elm St, Springfield");
        assert_eq!(r.email, "jane.doe@example.com");
        assert_eq!(r.order_date, "2024-03-05");
        assert_eq!(r.installation_date, "2024-03-19");
        assert_eq!(r.home_phone, "(555) 123-4567");
        assert_eq!(r.cell_phone, "(555) 987-6543");
        assert_eq!(r.installed_by, "Mike");
        assert_eq!(r.salesperson, "Rita");
        assert!(e.missing_critical.is_empty());

        assert_eq!(r.items.len(), 1);
        let item = &r.items[0];
        assert_eq!(item.line_no, 1);
        assert_eq!(item.description, "Carpet / Rug");
        assert_eq!(item.quantity, Decimal::ONE);
        assert_eq!(item.manufacturer, "Shaw");
        assert_eq!(item.size, "12x15");
        assert_eq!(item.style, "Berber");
        assert_eq!(item.color, "Sand");
        assert_eq!(item.pad, "8lb");
        assert_eq!(item.rug_pad, "none");
        assert_eq!(item.unit_price, money("45.00"));
        assert_eq!(item.amount, money("90.00"));
    }

    #[test]
    fn empty_input_yields_empty_record() {
        let e = Extractor::extract_on("", day());
        assert_eq!(e.record.invoice_number, "");
        assert_eq!(e.record.items.len(), 1);
        assert_eq!(e.record.items[0].unit_price, Money::zero());
        assert_eq!(e.missing_critical, vec!["invoice_number", "sold_to", "order_date"]);
    }

    // ── Labels ───────────────────────────────────────────────────────────────

    #[test]
    fn inline_value_after_colon() {
        let e = Extractor::extract_on("Sold to: Jane Doe", day());
        assert_eq!(e.record.sold_to, "Jane Doe");
    }

    #[test]
    fn inline_value_rejoins_extra_colons() {
        let lines = ["Directions: Gate code:4411"];
        assert_eq!(line_after_label(&lines, re_directions()), "Gate code: 4411");
    }

    #[test]
    fn empty_label_looks_ahead() {
        let e = Extractor::extract_on("Directions:\n\n123 Main St", day());
        assert_eq!(e.record.directions, "123 Main St");
    }

    #[test]
    fn lookahead_stops_at_next_label() {
        let e = Extractor::extract_on("Directions:\nCustomer Email: a@b.com", day());
        assert_eq!(e.record.directions, "");
        assert_eq!(e.record.email, "a@b.com");
    }

    #[test]
    fn lookahead_window_is_bounded() {
        let text = "Sold to:\n\n\n\n\n\nJane Doe";
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(line_after_label(&lines, re_sold_to()), "");
        let text = "Sold to:\n\n\n\nJane Doe";
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(line_after_label(&lines, re_sold_to()), "Jane Doe");
    }

    #[test]
    fn fuzzy_label_falls_back_in_order() {
        let e = Extractor::extract_on("Bill to: Acme Flooring\nSales Rep: Tom", day());
        assert_eq!(e.record.sold_to, "Acme Flooring");
        assert_eq!(e.record.salesperson, "Tom");
    }

    #[test]
    fn pad_does_not_capture_rug_pad() {
        let e = Extractor::extract_on("Rug Pad: felt\nPad: 6lb", day());
        assert_eq!(e.record.items[0].pad, "6lb");
        assert_eq!(e.record.items[0].rug_pad, "felt");
    }

    #[test]
    fn canonical_label_lines() {
        assert!(is_label_line("Home Phone: 555-1234"));
        assert!(is_label_line("INVOICE # CR 123"));
        assert!(!is_label_line("Jane Doe"));
        assert!(is_label_line("Unit/Amount Block: 2"));
        assert!(!is_label_line("Padding extra"));
    }

    #[test]
    fn metadata_footer_is_ignored() {
        let e = Extractor::extract_on("Salesperson:\n\n[OCR_METADATA]\nAverage Confidence: 12%", day());
        assert_eq!(e.record.salesperson, "");
    }

    // ── Invoice ──────────────────────────────────────────────────────────────

    #[test]
    fn invoice_with_cr_prefix() {
        let e = Extractor::extract_on("INVOICE # CR 4821O", day());
        assert_eq!(e.record.invoice_number, "CR 48210");
    }

    #[test]
    fn invoice_from_bare_cr_number() {
        let e = Extractor::extract_on("Order CR #90210 received", day());
        assert_eq!(e.record.invoice_number, "CR 90210");
    }

    #[test]
    fn invoice_from_plain_invoice_number() {
        let e = Extractor::extract_on("Invoice: 77123", day());
        assert_eq!(e.record.invoice_number, "CR 77123");
    }

    #[test]
    fn missing_invoice_is_reported() {
        let e = Extractor::extract_on("Sold to: Jane Doe\nDate: 3/5/24", day());
        assert_eq!(e.record.invoice_number, "");
        assert_eq!(e.missing_critical, vec!["invoice_number"]);
    }

    #[test]
    fn empty_invoice_region_does_not_read_next_line() {
        let e = Extractor::extract_on("INVOICE # CR \nSold to: Jane Doe", day());
        assert_eq!(e.record.invoice_number, "");
    }

    // ── Phone ────────────────────────────────────────────────────────────────

    #[test]
    fn phone_formats() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("5551234"), "555-1234");
        assert_eq!(format_phone("12345"), "12345");
    }

    #[test]
    fn phone_corrects_misreads() {
        let e = Extractor::extract_on("Home Phone: 555 l23 4S67", day());
        assert_eq!(e.record.home_phone, "(555) 123-4567");
    }

    #[test]
    fn phone_value_on_next_line() {
        let e = Extractor::extract_on("Cell Phone:\n555.987.6543", day());
        assert_eq!(e.record.cell_phone, "(555) 987-6543");
    }

    #[test]
    fn seven_digit_phone() {
        let e = Extractor::extract_on("Home Phone: 123-4567", day());
        assert_eq!(e.record.home_phone, "123-4567");
    }

    #[test]
    fn phone_without_label_reads_whole_text() {
        let e = Extractor::extract_on("call 5559876543 after 5", day());
        assert_eq!(e.record.home_phone, "(555) 987-6543");
    }

    #[test]
    fn empty_phone_reads_the_next_two_lines() {
        let e = Extractor::extract_on("Home Phone:\nCell Phone: 5559876543", day());
        assert_eq!(e.record.home_phone, "(555) 987-6543");
        assert_eq!(e.record.cell_phone, "(555) 987-6543");
    }

    #[test]
    fn phone_beyond_label_window_falls_back_to_whole_text() {
        let text = "Home Phone:\nPad: yarn\nManufacturer: Mark\nRef 555-123-4567";
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(near_label(&lines, re_home_phone(), 2), vec!["Home Phone: Pad: yarn Manufacturer: Mark"]);

        let e = Extractor::extract_on(text, day());
        assert_eq!(e.record.home_phone, "(555) 123-4567");
    }

    // ── Date ─────────────────────────────────────────────────────────────────

    #[test]
    fn date_normalization() {
        assert_eq!(normalize_date_on("TODAY", day()), "2026-10-19");
        assert_eq!(normalize_date_on("13/40/2024", day()), "");
        assert_eq!(normalize_date_on("3/5/24", day()), "2024-03-05");
        assert_eq!(normalize_date_on("12-31-2025", day()), "2025-12-31");
        assert_eq!(normalize_date_on("2024-03-05", day()), "2024-03-05");
        assert_eq!(normalize_date_on("2024/3/5", day()), "2024-03-05");
        assert_eq!(normalize_date_on("N/A", day()), "");
        assert_eq!(normalize_date_on("", day()), "");
        assert_eq!(normalize_date_on("March 5", day()), "");
    }

    #[test]
    fn today_on_form_resolves_to_current_date() {
        let e = Extractor::extract_on("Date: Today", day());
        assert_eq!(e.record.order_date, "2026-10-19");
    }

    #[test]
    fn spaced_date_becomes_slashed() {
        let e = Extractor::extract_on("Date: 3 5 2024", day());
        assert_eq!(e.record.order_date, "2024-03-05");
    }

    #[test]
    fn empty_order_date_takes_next_dated_line() {
        let e = Extractor::extract_on("Date: \nHome Phone: \nInstallation Date: 4/1/24", day());
        assert_eq!(e.record.order_date, "2024-04-01");
        assert_eq!(e.record.installation_date, "2024-04-01");
    }

    #[test]
    fn date_falls_back_to_whole_text() {
        let e = Extractor::extract_on("Date:\nPad: yarn\nRef 4/1/24", day());
        assert_eq!(e.record.order_date, "2024-04-01");
    }

    #[test]
    fn year_first_date_on_form() {
        assert_eq!(Extractor::extract_on("Date: 2024-03-05", day()).record.order_date, "2024-03-05");
        assert_eq!(Extractor::extract_on("Date: 2024/03/05", day()).record.order_date, "2024-03-05");
        assert_eq!(Extractor::extract_on("Date: 2024/3/5", day()).record.order_date, "2024-03-05");
    }

    #[test]
    fn order_date_label_variant() {
        let e = Extractor::extract_on("Order Date: 1O/2/25", day());
        assert_eq!(e.record.order_date, "2025-10-02");
    }

    // ── Money ────────────────────────────────────────────────────────────────

    #[test]
    fn unit_and_amount_rules() {
        assert_eq!(pick_unit_and_amount("2 45.00"), (money("45.00"), money("45.00")));
        assert_eq!(pick_unit_and_amount("150.00 300.00"), (money("150.00"), money("300.00")));
        assert_eq!(pick_unit_and_amount("2 3"), (money("2"), money("2")));
        assert_eq!(pick_unit_and_amount(""), (Money::zero(), Money::zero()));
    }

    #[test]
    fn unit_and_amount_handles_separators() {
        assert_eq!(pick_unit_and_amount("$1,250.00 $2,500.00"), (money("1250.00"), money("2500.00")));
        assert_eq!(pick_unit_and_amount("4S.OO"), (money("45.00"), money("45.00")));
    }

    #[test]
    fn unit_and_amount_come_out_as_cents() {
        let e = Extractor::extract_on("Unit/Amount Block: 2 $45.5\n$91", day());
        assert_eq!(e.record.items[0].unit_price.to_string(), "$45.50");
        assert_eq!(e.record.items[0].amount.to_string(), "$91.00");
    }

    #[test]
    fn money_parsing() {
        assert_eq!(parse_money("$1,234.5"), money("1234.50"));
        assert_eq!(parse_money("O12S.3O"), money("125.30"));
        assert_eq!(parse_money("n/a"), Money::zero());
    }
}
