//! CSV decoding for patient records.

use chrono::Utc;

use crate::models::{EyeMeasurement, PatientRecord};

/// Parse CSV text into import candidates, one per non-blank data row.
///
/// Row 0 is discarded as the header; its content is not checked against
/// [`super::CSV_HEADERS`], so a file with reordered columns silently shifts
/// every field. Known fragility, kept for compatibility with files this
/// dialect has always produced.
///
/// Each candidate gets a fresh `imported-<millis>-<row index>` id and a fresh
/// `createdAt`; identity fields in the text are never trusted. No validation
/// and no duplicate filtering happens here; the repository applies both
/// before acceptance.
pub fn decode(text: &str) -> Vec<PatientRecord> {
    let mut rows = text.split('\n');
    let _header = rows.next();

    rows.filter(|row| !row.trim().is_empty())
        .enumerate()
        .map(|(index, row)| candidate_from_row(row, index))
        .collect()
}

fn candidate_from_row(row: &str, index: usize) -> PatientRecord {
    let tokens = split_row(row);
    let fields: Vec<&str> = tokens.iter().map(|t| strip_outer_quotes(t)).collect();

    PatientRecord {
        id: format!("imported-{}-{}", Utc::now().timestamp_millis(), index),
        date: field_or(&fields, 0, &today()),
        name: field(&fields, 1).to_string(),
        mobile: field(&fields, 2).to_string(),
        right_eye: EyeMeasurement {
            sphere: field(&fields, 3).to_string(),
            cylinder: field(&fields, 4).to_string(),
            axis: field(&fields, 5).to_string(),
            add: field(&fields, 6).to_string(),
        },
        left_eye: EyeMeasurement {
            sphere: field(&fields, 7).to_string(),
            cylinder: field(&fields, 8).to_string(),
            axis: field(&fields, 9).to_string(),
            add: field(&fields, 10).to_string(),
        },
        frame_price: field_or(&fields, 11, "0"),
        glass_price: field_or(&fields, 12, "0"),
        remarks: field(&fields, 13).to_string(),
        created_at: Utc::now().to_rfc3339(),
    }
}

/// Field at `i`, or the empty string when the row is short.
fn field<'a>(fields: &[&'a str], i: usize) -> &'a str {
    fields.get(i).copied().unwrap_or("")
}

/// Field at `i`, with missing or empty values replaced by `default`.
fn field_or(fields: &[&str], i: usize, default: &str) -> String {
    let value = field(fields, i);
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Split one row on commas, honoring double-quoted fields.
///
/// A quote toggles the in-quote state and is consumed; a comma separates
/// fields only outside quotes. A doubled quote therefore toggles twice and
/// contributes nothing, so quote characters inside a field do not survive
/// decoding. That matches the files already in circulation, so the scanner
/// stays bug-compatible rather than growing a stricter escape rule.
fn split_row(row: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut in_quote = false;
    let mut current = String::new();

    for ch in row.chars() {
        if ch == '"' {
            in_quote = !in_quote;
        } else if ch == ',' && !in_quote {
            values.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    values.push(current);

    values
}

/// Strip at most one leading and one trailing quote character.
fn strip_outer_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
