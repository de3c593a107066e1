//! Batch driver: pair every "before" circuit with its rewritten candidates
//! and check each pair.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::circuit::Circuit;
use crate::config::Config;
use crate::loader::{load_circuit, CircuitFormat, LoadError};
use crate::overlap::{check_equivalence, CheckError};
use crate::report::{checking_line, mismatch_line, summary_line, verdict_line, ComparisonRecord, ReportError, ReportWriter};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result of checking one before/after pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// Overlap within tolerance of 1.
    Equivalent { elapsed: Duration },
    /// Overlap outside tolerance, or the contraction failed.
    NotEquivalent { elapsed: Duration },
    /// The circuits act on different numbers of qubits.
    Mismatch { before: usize, after: usize },
    /// Wider than the configured qubit ceiling; not checked.
    Skipped { num_qubits: usize },
}

/// Aggregate of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    /// Report rows in discovery order.
    pub records: Vec<ComparisonRecord>,
    pub n_success: usize,
    pub n_fail: usize,
    pub n_skipped: usize,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn n_pairs(&self) -> usize {
        self.n_success + self.n_fail + self.n_skipped
    }
}

pub struct BatchDriver {
    config: Config,
}

impl BatchDriver {
    pub fn new(config: Config) -> Self {
        BatchDriver { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run over the configured directories, writing the configured report.
    pub fn run(&self) -> Result<BatchResult, BatchError> {
        let mut report = ReportWriter::create(&self.config.report_path)?;
        let result = self.run_into(&mut report)?;
        report.finish()?;
        Ok(result)
    }

    /// Run over the configured directories, appending rows to `report`.
    pub fn run_into(&self, report: &mut ReportWriter) -> Result<BatchResult, BatchError> {
        let start = Instant::now();
        let mut result = BatchResult::default();

        for before_path in before_files(&self.config.before_dir)? {
            let before = match load_circuit(&before_path) {
                Ok(c) => c,
                Err(LoadError::UnsupportedFormat { path }) => {
                    debug!(path = %path.display(), "skipping file of unsupported format");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let name = file_stem(&before_path);
            let candidates = candidate_files(&self.config.after_dir, &name)?;
            info!(before = %before_path.display(), candidates = candidates.len(), "discovered pairs");

            for after_path in candidates {
                let after = load_circuit(&after_path)?;
                let outcome = self.check_pair(&before_path, &before, &after_path, &after);
                let record = match outcome {
                    PairOutcome::Skipped { num_qubits } => {
                        debug!(num_qubits, max_qubits = self.config.max_qubits, "pair skipped");
                        println!("Skip");
                        result.n_skipped += 1;
                        continue;
                    }
                    PairOutcome::Mismatch {
                        before: before_qubits,
                        after: after_qubits,
                    } => {
                        println!(
                            "{}",
                            mismatch_line(&before_path, &after_path, before_qubits, after_qubits)
                        );
                        ComparisonRecord {
                            name: name.clone(),
                            success: false,
                            elapsed: 0.0,
                        }
                    }
                    PairOutcome::Equivalent { elapsed } => ComparisonRecord {
                        name: name.clone(),
                        success: true,
                        elapsed: elapsed.as_secs_f64(),
                    },
                    PairOutcome::NotEquivalent { elapsed } => ComparisonRecord {
                        name: name.clone(),
                        success: false,
                        elapsed: elapsed.as_secs_f64(),
                    },
                };
                println!("{}", verdict_line(&record));
                if record.success {
                    result.n_success += 1;
                } else {
                    result.n_fail += 1;
                }
                report.append(&record)?;
                result.records.push(record);
            }
        }

        result.elapsed = start.elapsed();
        println!(
            "{}",
            summary_line(result.n_success, result.n_fail, result.n_skipped, result.elapsed)
        );
        Ok(result)
    }

    /// Check one loaded pair. Prints the checking line for pairs of equal
    /// width; the caller reports the outcome.
    pub fn check_pair(&self, before_path: &Path, before: &Circuit, after_path: &Path, after: &Circuit) -> PairOutcome {
        if before.num_qubits() != after.num_qubits() {
            return PairOutcome::Mismatch {
                before: before.num_qubits(),
                after: after.num_qubits(),
            };
        }

        let n = after.num_qubits();
        println!(
            "{}",
            checking_line(before_path, after_path, n, before.num_gates(), after.num_gates())
        );
        if n > self.config.max_qubits {
            return PairOutcome::Skipped { num_qubits: n };
        }

        let start = Instant::now();
        let equivalent = match check_equivalence(after, before, &self.config.check_options()) {
            Ok(check) => {
                debug!(re = check.overlap.re, im = check.overlap.im, "overlap");
                check.equivalent
            }
            Err(CheckError::Contraction(e)) => {
                warn!(after = %after_path.display(), error = %e, "contraction failed");
                false
            }
            Err(CheckError::Mismatch(e)) => {
                warn!(error = %e, "qubit count mismatch");
                false
            }
        };
        let elapsed = start.elapsed();
        if equivalent {
            PairOutcome::Equivalent { elapsed }
        } else {
            PairOutcome::NotEquivalent { elapsed }
        }
    }
}

/// Regular files of `dir`, sorted by file name.
pub fn before_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = list_files(dir)?;
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Candidates for the before-file stem `stem`: files in `dir` whose name
/// starts with `stem`, the `.json` ones first and then the `.qasm` ones,
/// each group sorted by name.
pub fn candidate_files(dir: &Path, stem: &str) -> Result<Vec<PathBuf>, BatchError> {
    let files = list_files(dir)?;
    let mut candidates = Vec::new();
    for format in [CircuitFormat::Structured, CircuitFormat::Text] {
        let mut group: Vec<PathBuf> = files
            .iter()
            .filter(|p| CircuitFormat::from_path(p) == Some(format))
            .filter(|p| {
                p.file_name()
                    .and_then(|f| f.to_str())
                    .is_some_and(|f| f.starts_with(stem))
            })
            .cloned()
            .collect();
        group.sort();
        candidates.extend(group);
    }
    Ok(candidates)
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let io_err = |source| BatchError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
