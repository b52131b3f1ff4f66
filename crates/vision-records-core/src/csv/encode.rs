//! CSV encoding for patient records.

use crate::models::PatientRecord;

/// Column layout shared by export and import. Order is load-bearing: the
/// decoder maps fields back by position, not by header name.
pub const CSV_HEADERS: [&str; 14] = [
    "Date",
    "Name",
    "Mobile",
    "Right Eye Sphere",
    "Right Eye Cylinder",
    "Right Eye Axis",
    "Right Eye Add",
    "Left Eye Sphere",
    "Left Eye Cylinder",
    "Left Eye Axis",
    "Left Eye Add",
    "Frame Price",
    "Glass Price",
    "Remarks",
];

/// Serialize records to CSV text.
///
/// `id` and `createdAt` are not exported; they are regenerated when the file
/// is imported again.
pub fn encode(records: &[PatientRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for record in records {
        let fields = [
            record.date.as_str(),
            record.name.as_str(),
            record.mobile.as_str(),
            record.right_eye.sphere.as_str(),
            record.right_eye.cylinder.as_str(),
            record.right_eye.axis.as_str(),
            record.right_eye.add.as_str(),
            record.left_eye.sphere.as_str(),
            record.left_eye.cylinder.as_str(),
            record.left_eye.axis.as_str(),
            record.left_eye.add.as_str(),
            record.frame_price.as_str(),
            record.glass_price.as_str(),
            record.remarks.as_str(),
        ];

        let row: Vec<String> = fields.iter().map(|field| quote_field(field)).collect();
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Wrap a field in double quotes, doubling any quotes it contains.
fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
