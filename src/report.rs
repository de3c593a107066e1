//! CSV report and console status lines.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Column names of the report.
pub const HEADER: [&str; 3] = ["Name", "Success", "Elapsed Time"];

#[derive(Debug, Error)]
#[error("failed to write report {}: {source}", .path.display())]
pub struct ReportError {
    pub path: PathBuf,
    pub source: csv::Error,
}

/// One checked pair: the before-file stem, the verdict and the time the
/// check took in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub name: String,
    #[serde(serialize_with = "capitalized_bool")]
    pub success: bool,
    pub elapsed: f64,
}

fn capitalized_bool<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Report file that is written row by row.
///
/// The header is written on creation and every row is flushed as soon as it
/// is appended, so the file is complete up to the last finished pair however
/// the run ends.
pub struct ReportWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl ReportWriter {
    pub fn create(path: &Path) -> Result<Self, ReportError> {
        let err = |source| ReportError {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(err)?;
        writer.write_record(HEADER).map_err(err)?;
        writer.flush().map_err(|e| err(e.into()))?;
        Ok(ReportWriter {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &ComparisonRecord) -> Result<(), ReportError> {
        self.writer.serialize(record).map_err(|source| self.error(source))?;
        self.writer
            .flush()
            .map_err(|e| self.error(e.into()))
    }

    /// Flush and close the report.
    pub fn finish(mut self) -> Result<(), ReportError> {
        self.writer.flush().map_err(|e| self.error(e.into()))
    }

    fn error(&self, source: csv::Error) -> ReportError {
        ReportError {
            path: self.path.clone(),
            source,
        }
    }
}

impl Drop for ReportWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

// =============================================================================
// Console lines
// =============================================================================

pub fn mismatch_line(before: &Path, after: &Path, before_qubits: usize, after_qubits: usize) -> String {
    format!(
        "{} and {} have different qubit counts ({} vs {})",
        before.display(),
        after.display(),
        before_qubits,
        after_qubits
    )
}

pub fn checking_line(before: &Path, after: &Path, num_qubits: usize, before_gates: usize, after_gates: usize) -> String {
    format!(
        "Checking equivalence for {} and {} ({} qb, {} -> {} gates)",
        before.display(),
        after.display(),
        num_qubits,
        before_gates,
        after_gates
    )
}

pub fn verdict_line(record: &ComparisonRecord) -> String {
    let verdict = if record.success { "OK" } else { "FAIL" };
    format!("{}: {} ({:.2}s)", record.name, verdict, record.elapsed)
}

pub fn summary_line(success: usize, fail: usize, skipped: usize, total: Duration) -> String {
    format!(
        "Done. Success/Fail/Skipped ({}/{}/{}). Total time {:.2}s.",
        success,
        fail,
        skipped,
        total.as_secs_f64()
    )
}
