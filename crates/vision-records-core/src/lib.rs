//! Vision-Records Core Library
//!
//! Offline patient record keeper for a single optical clinic. All state lives
//! in one local SQLite file; there is no server and no background work.
//!
//! # Architecture
//!
//! ```text
//! UI event ──► Session Gate check
//!                    │
//!                    ▼
//!            Patient Repository ◄──── CSV decode (import)
//!             add / import / search
//!                    │
//!                    ▼
//!            Persistence Store  ────► CSV encode (export)
//!          (whole-list JSON blob,
//!           rewritten on mutation)
//! ```
//!
//! # Core Principle
//!
//! **The mobile number is the business key.** No two stored records may share
//! one, whether they arrive through the form or through a CSV import.
//!
//! # Modules
//!
//! - [`db`]: SQLite-backed key-value store (record snapshot + login flag)
//! - [`models`]: Domain types (PatientRecord, EyeMeasurement) and validation
//! - [`csv`]: Quoted-CSV codec and the import/export file boundary
//! - [`repository`]: Record list operations (add, bulk import, search)
//! - [`session`]: Login gate over the persisted flag
//! - [`currency`]: Rupee display formatting

pub mod currency;
pub mod csv;
pub mod db;
pub mod models;
pub mod repository;
pub mod session;

// Re-export commonly used types
pub use db::Database;
pub use models::{EyeMeasurement, PatientCandidate, PatientRecord, ValidationError};
pub use repository::{ImportResult, PatientRepository, RepositoryError, SearchField};
pub use session::{AuthError, SessionGate};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::Utc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VisionRecordsError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Required field is empty: {0}")]
    MissingField(String),

    #[error("Invalid mobile number: {0}")]
    InvalidMobile(String),

    #[error("Duplicate mobile number: {0}")]
    DuplicateMobile(String),

    #[error("File read error: {0}")]
    FileReadError(String),

    #[error("File parse error: {0}")]
    FileParseError(String),

    #[error("File write error: {0}")]
    FileWriteError(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("There are no patient records to export")]
    NoRecords,
}

impl From<db::DbError> for VisionRecordsError {
    fn from(e: db::DbError) -> Self {
        VisionRecordsError::StorageError(e.to_string())
    }
}

impl From<ValidationError> for VisionRecordsError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::MissingField(field) => {
                VisionRecordsError::MissingField(field.to_string())
            }
            ValidationError::InvalidMobile(mobile) => VisionRecordsError::InvalidMobile(mobile),
        }
    }
}

impl From<RepositoryError> for VisionRecordsError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Validation(inner) => inner.into(),
            RepositoryError::DuplicateMobile(mobile) => {
                VisionRecordsError::DuplicateMobile(mobile)
            }
            RepositoryError::Store(inner) => inner.into(),
        }
    }
}

impl From<AuthError> for VisionRecordsError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => VisionRecordsError::InvalidCredentials,
            AuthError::Store(inner) => inner.into(),
        }
    }
}

impl From<csv::CsvFileError> for VisionRecordsError {
    fn from(e: csv::CsvFileError) -> Self {
        match e {
            csv::CsvFileError::Read(inner) => VisionRecordsError::FileReadError(inner.to_string()),
            csv::CsvFileError::Parse(inner) => {
                VisionRecordsError::FileParseError(inner.to_string())
            }
            csv::CsvFileError::Write(inner) => {
                VisionRecordsError::FileWriteError(inner.to_string())
            }
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for VisionRecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VisionRecordsError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store at the given path.
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<VisionRecords>, VisionRecordsError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(VisionRecords {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory store (for testing).
#[uniffi::export]
pub fn open_store_in_memory() -> Result<Arc<VisionRecords>, VisionRecordsError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(VisionRecords {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
///
/// All operations run under one mutex, which also serializes repository
/// mutations: the duplicate-mobile check and the append must not interleave.
#[derive(uniffi::Object)]
pub struct VisionRecords {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl VisionRecords {
    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Log in with the clinic credentials.
    pub fn login(&self, username: String, password: String) -> Result<(), VisionRecordsError> {
        let db = self.db.lock()?;
        SessionGate::new(&db).login(&username, &password)?;
        Ok(())
    }

    /// Log out, clearing the persisted flag.
    pub fn logout(&self) -> Result<(), VisionRecordsError> {
        let db = self.db.lock()?;
        SessionGate::new(&db).logout()?;
        Ok(())
    }

    /// Whether a login session is active.
    pub fn is_logged_in(&self) -> Result<bool, VisionRecordsError> {
        let db = self.db.lock()?;
        Ok(SessionGate::new(&db).is_logged_in()?)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Validate and store a new patient record from the entry form.
    pub fn submit_new_patient(
        &self,
        form: FfiPatientForm,
    ) -> Result<FfiPatientRecord, VisionRecordsError> {
        let db = self.db.lock()?;
        self.ensure_logged_in(&db)?;

        let mut candidate: PatientCandidate = form.into();
        if candidate.date.is_empty() {
            candidate.date = today();
        }

        let mut repo = PatientRepository::load(&db)?;
        let stored = repo.add(candidate)?;
        Ok(stored.into())
    }

    /// All records, insertion order.
    pub fn list_patients(&self) -> Result<Vec<FfiPatientRecord>, VisionRecordsError> {
        let db = self.db.lock()?;
        self.ensure_logged_in(&db)?;

        let repo = PatientRepository::load(&db)?;
        Ok(repo.records().iter().cloned().map(Into::into).collect())
    }

    /// All records, newest visit date first.
    pub fn list_patients_newest_first(
        &self,
    ) -> Result<Vec<FfiPatientRecord>, VisionRecordsError> {
        let db = self.db.lock()?;
        self.ensure_logged_in(&db)?;

        let repo = PatientRepository::load(&db)?;
        Ok(repo
            .records_newest_first()
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Filter records by name or mobile number.
    pub fn search_patients(
        &self,
        query: String,
        field: FfiSearchField,
    ) -> Result<Vec<FfiPatientRecord>, VisionRecordsError> {
        let db = self.db.lock()?;
        self.ensure_logged_in(&db)?;

        let repo = PatientRepository::load(&db)?;
        Ok(repo
            .search(&query, field.into())
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Sum of frame and glass prices over all records.
    pub fn total_billed(&self) -> Result<f64, VisionRecordsError> {
        let db = self.db.lock()?;
        self.ensure_logged_in(&db)?;

        let repo = PatientRepository::load(&db)?;
        Ok(repo.records().iter().map(PatientRecord::total_price).sum())
    }

    /// [`Self::total_billed`] formatted as rupees for display.
    pub fn total_billed_display(&self) -> Result<String, VisionRecordsError> {
        let total = self.total_billed()?;
        Ok(currency::format_inr(total))
    }

    // =========================================================================
    // Import / Export Operations
    // =========================================================================

    /// Render all records as CSV, with the dated export filename.
    pub fn export_patients_csv(&self) -> Result<FfiCsvExport, VisionRecordsError> {
        let db = self.db.lock()?;
        self.ensure_logged_in(&db)?;

        let repo = PatientRepository::load(&db)?;
        if repo.records().is_empty() {
            return Err(VisionRecordsError::NoRecords);
        }

        Ok(FfiCsvExport {
            filename: csv::export_filename(Utc::now().date_naive()),
            content: csv::encode(repo.records()),
            record_count: repo.records().len() as u32,
        })
    }

    /// Export all records to a CSV file under `dir`; returns the written path.
    pub fn export_patients_to_file(&self, dir: String) -> Result<String, VisionRecordsError> {
        let export = self.export_patients_csv()?;
        let path = csv::write_csv_file(&dir, &export.filename, &export.content)?;
        Ok(path.to_string_lossy().into_owned())
    }

    /// Decode CSV text and import the rows, reporting skip counts.
    pub fn import_patients_from_csv(
        &self,
        text: String,
    ) -> Result<FfiImportSummary, VisionRecordsError> {
        let db = self.db.lock()?;
        self.ensure_logged_in(&db)?;

        let candidates = csv::decode(&text);
        let mut repo = PatientRepository::load(&db)?;
        let result = repo.import_batch(candidates)?;
        Ok(result.into())
    }

    /// Read a CSV file and import its rows.
    ///
    /// A read or parse failure aborts the attempt; stored data is untouched.
    pub fn import_patients_from_file(
        &self,
        path: String,
    ) -> Result<FfiImportSummary, VisionRecordsError> {
        let text = csv::read_csv_file(&path)?;
        self.import_patients_from_csv(text)
    }
}

impl VisionRecords {
    fn ensure_logged_in(&self, db: &Database) -> Result<(), VisionRecordsError> {
        if !db.is_logged_in()? {
            return Err(VisionRecordsError::NotAuthenticated);
        }
        Ok(())
    }
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe eye measurement.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEyeMeasurement {
    pub sphere: String,
    pub cylinder: String,
    pub axis: String,
    pub add: String,
}

impl From<EyeMeasurement> for FfiEyeMeasurement {
    fn from(eye: EyeMeasurement) -> Self {
        Self {
            sphere: eye.sphere,
            cylinder: eye.cylinder,
            axis: eye.axis,
            add: eye.add,
        }
    }
}

impl From<FfiEyeMeasurement> for EyeMeasurement {
    fn from(eye: FfiEyeMeasurement) -> Self {
        EyeMeasurement {
            sphere: eye.sphere,
            cylinder: eye.cylinder,
            axis: eye.axis,
            add: eye.add,
        }
    }
}

/// FFI-safe stored record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub id: String,
    pub date: String,
    pub name: String,
    pub mobile: String,
    pub right_eye: FfiEyeMeasurement,
    pub left_eye: FfiEyeMeasurement,
    pub frame_price: String,
    pub glass_price: String,
    pub remarks: String,
    pub created_at: String,
}

impl From<PatientRecord> for FfiPatientRecord {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id,
            date: record.date,
            name: record.name,
            mobile: record.mobile,
            right_eye: record.right_eye.into(),
            left_eye: record.left_eye.into(),
            frame_price: record.frame_price,
            glass_price: record.glass_price,
            remarks: record.remarks,
            created_at: record.created_at,
        }
    }
}

/// FFI-safe form submission.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientForm {
    pub date: String,
    pub name: String,
    pub mobile: String,
    pub right_eye: FfiEyeMeasurement,
    pub left_eye: FfiEyeMeasurement,
    pub frame_price: String,
    pub glass_price: String,
    pub remarks: String,
}

impl From<FfiPatientForm> for PatientCandidate {
    fn from(form: FfiPatientForm) -> Self {
        PatientCandidate {
            date: form.date,
            name: form.name,
            mobile: form.mobile,
            right_eye: form.right_eye.into(),
            left_eye: form.left_eye.into(),
            frame_price: form.frame_price,
            glass_price: form.glass_price,
            remarks: form.remarks,
        }
    }
}

/// FFI-safe search field selector.
#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiSearchField {
    Name,
    Mobile,
}

impl From<FfiSearchField> for SearchField {
    fn from(field: FfiSearchField) -> Self {
        match field {
            FfiSearchField::Name => SearchField::Name,
            FfiSearchField::Mobile => SearchField::Mobile,
        }
    }
}

/// FFI-safe export payload.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCsvExport {
    pub filename: String,
    pub content: String,
    pub record_count: u32,
}

/// FFI-safe import outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportSummary {
    pub imported: u32,
    pub rejected_invalid: u32,
    pub rejected_duplicates: u32,
}

impl From<ImportResult> for FfiImportSummary {
    fn from(result: ImportResult) -> Self {
        Self {
            imported: result.accepted.len() as u32,
            rejected_invalid: result.rejected_invalid as u32,
            rejected_duplicates: result.rejected_duplicates as u32,
        }
    }
}
