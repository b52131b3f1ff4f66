//! Patient record models and creation-time validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures for a candidate record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required field is empty: {0}")]
    MissingField(&'static str),

    #[error("mobile number must be exactly 10 digits, got '{0}'")]
    InvalidMobile(String),
}

/// Prescription values for one eye.
///
/// All four values are free-form clinical notation; the empty string means
/// "not measured".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EyeMeasurement {
    pub sphere: String,
    pub cylinder: String,
    pub axis: String,
    pub add: String,
}

/// A stored patient record.
///
/// Serialized field names follow the persisted JSON layout (`rightEye`,
/// `framePrice`, `createdAt`, ...), which must stay stable across releases
/// because existing installations reload the snapshot verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Unique ID, assigned when the record enters the repository.
    pub id: String,
    /// Visit date, `YYYY-MM-DD`.
    pub date: String,
    pub name: String,
    /// 10-digit mobile number; the business-level uniqueness key.
    pub mobile: String,
    pub right_eye: EyeMeasurement,
    pub left_eye: EyeMeasurement,
    /// Numeric-as-string, `"0"` when not quoted.
    pub frame_price: String,
    /// Numeric-as-string, `"0"` when not quoted.
    pub glass_price: String,
    pub remarks: String,
    /// RFC 3339 creation timestamp, never modified afterwards.
    pub created_at: String,
}

/// An unvalidated record proposed for insertion, before identity is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientCandidate {
    pub date: String,
    pub name: String,
    pub mobile: String,
    pub right_eye: EyeMeasurement,
    pub left_eye: EyeMeasurement,
    pub frame_price: String,
    pub glass_price: String,
    pub remarks: String,
}

impl PatientCandidate {
    /// Validate the candidate for insertion.
    ///
    /// `name`, `mobile` and `remarks` must be non-empty and `mobile` must be
    /// exactly 10 ASCII digits. Blank prices are coerced to `"0"`. Identity
    /// (`id`, `createdAt`) is deliberately not assigned here; the repository
    /// does that on acceptance.
    pub fn validate_for_create(mut self) -> Result<PatientCandidate, ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.mobile.is_empty() {
            return Err(ValidationError::MissingField("mobile"));
        }
        if self.remarks.is_empty() {
            return Err(ValidationError::MissingField("remarks"));
        }
        if !is_valid_mobile(&self.mobile) {
            return Err(ValidationError::InvalidMobile(self.mobile));
        }

        if self.frame_price.is_empty() {
            self.frame_price = "0".into();
        }
        if self.glass_price.is_empty() {
            self.glass_price = "0".into();
        }

        Ok(self)
    }
}

impl PatientRecord {
    /// Turn a validated candidate into a stored record with fresh identity.
    pub fn from_candidate(candidate: PatientCandidate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: candidate.date,
            name: candidate.name,
            mobile: candidate.mobile,
            right_eye: candidate.right_eye,
            left_eye: candidate.left_eye,
            frame_price: candidate.frame_price,
            glass_price: candidate.glass_price,
            remarks: candidate.remarks,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Frame plus glass price; unparseable values count as zero.
    pub fn total_price(&self) -> f64 {
        parse_price(&self.frame_price) + parse_price(&self.glass_price)
    }
}

/// Check the 10-ASCII-digit mobile number format.
pub fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())
}

fn parse_price(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(0.0)
}
