//! In-memory patient repository with write-through persistence.

use std::collections::HashSet;

use thiserror::Error;

use crate::db::{Database, DbError, DbResult};
use crate::models::{is_valid_mobile, PatientCandidate, PatientRecord, ValidationError};

/// Repository operation errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a patient with mobile number {0} already exists")]
    DuplicateMobile(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Outcome of a bulk import.
///
/// Duplicates and invalid rows are dropped silently but counted, so the
/// caller can report how many were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    /// Candidates accepted and appended, in their original relative order.
    pub accepted: Vec<PatientRecord>,
    /// Rows dropped for failing field validation.
    pub rejected_invalid: usize,
    /// Rows dropped for a mobile number already present in the store or
    /// earlier in the same batch.
    pub rejected_duplicates: usize,
}

impl ImportResult {
    /// Total number of rows dropped.
    pub fn rejected_count(&self) -> usize {
        self.rejected_invalid + self.rejected_duplicates
    }
}

/// Which record field a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Mobile,
}

/// The record list plus its mutation and query operations.
///
/// Loads the stored snapshot on construction and writes the whole list back
/// through on every mutation. Records are append-only: there is no edit and
/// no delete operation.
pub struct PatientRepository<'a> {
    db: &'a Database,
    records: Vec<PatientRecord>,
}

impl<'a> PatientRepository<'a> {
    /// Load the repository from the store.
    pub fn load(db: &'a Database) -> DbResult<Self> {
        let records = db.load_patients()?;
        Ok(Self { db, records })
    }

    /// Current record sequence, insertion order.
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    /// Records sorted by visit date, newest first.
    pub fn records_newest_first(&self) -> Vec<PatientRecord> {
        let mut sorted = self.records.clone();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    /// Validate and append a single record.
    ///
    /// Fails with [`RepositoryError::DuplicateMobile`] when another record
    /// already holds the candidate's mobile number; the store is left
    /// unchanged on any failure.
    pub fn add(&mut self, candidate: PatientCandidate) -> Result<PatientRecord, RepositoryError> {
        let candidate = candidate.validate_for_create()?;

        if self.records.iter().any(|r| r.mobile == candidate.mobile) {
            return Err(RepositoryError::DuplicateMobile(candidate.mobile));
        }

        let record = PatientRecord::from_candidate(candidate);
        self.records.push(record.clone());
        self.db.save_patients(&self.records)?;
        Ok(record)
    }

    /// Append a batch of decoded candidates, skipping invalid rows and
    /// duplicate mobile numbers.
    ///
    /// First occurrence wins: a candidate is dropped when its mobile collides
    /// with an existing record or with an earlier accepted candidate from the
    /// same batch. The store is written through once for the whole batch.
    pub fn import_batch(&mut self, candidates: Vec<PatientRecord>) -> DbResult<ImportResult> {
        let mut seen: HashSet<String> = self.records.iter().map(|r| r.mobile.clone()).collect();

        let mut accepted = Vec::new();
        let mut rejected_invalid = 0;
        let mut rejected_duplicates = 0;

        for candidate in candidates {
            if !is_import_candidate_valid(&candidate) {
                rejected_invalid += 1;
                continue;
            }
            if !seen.insert(candidate.mobile.clone()) {
                rejected_duplicates += 1;
                continue;
            }
            accepted.push(candidate);
        }

        if rejected_invalid > 0 || rejected_duplicates > 0 {
            log::debug!(
                "import skipped {} invalid and {} duplicate rows",
                rejected_invalid,
                rejected_duplicates
            );
        }

        if !accepted.is_empty() {
            self.records.extend(accepted.iter().cloned());
            self.db.save_patients(&self.records)?;
        }

        Ok(ImportResult {
            accepted,
            rejected_invalid,
            rejected_duplicates,
        })
    }

    /// Filter records by name or mobile number.
    ///
    /// A blank query returns the full sequence. Matching is substring based,
    /// case-insensitive for names; result order follows insertion order.
    pub fn search(&self, query: &str, field: SearchField) -> Vec<&PatientRecord> {
        if query.trim().is_empty() {
            return self.records.iter().collect();
        }

        match field {
            SearchField::Name => {
                let needle = query.to_lowercase();
                self.records
                    .iter()
                    .filter(|r| r.name.to_lowercase().contains(&needle))
                    .collect()
            }
            SearchField::Mobile => self
                .records
                .iter()
                .filter(|r| r.mobile.contains(query))
                .collect(),
        }
    }
}

/// The acceptance rule for decoded rows: required fields present and a
/// well-formed mobile number. Mirrors the single-record validation but drops
/// rows instead of failing the batch.
fn is_import_candidate_valid(candidate: &PatientRecord) -> bool {
    !candidate.name.is_empty()
        && !candidate.remarks.is_empty()
        && is_valid_mobile(&candidate.mobile)
}
