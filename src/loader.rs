//! Load circuits from disk, dispatching on the file extension.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::circuit::Circuit;
use crate::json::{circuit_from_json_value, JsonError};
use crate::qasm::{circuit_from_qasm, QasmError};

#[derive(Debug, Error)]
pub enum LoadError {
    /// The extension is neither `.json` nor `.qasm`.
    #[error("unsupported circuit file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Json { path: PathBuf, source: JsonError },
    #[error("{}: {source}", .path.display())]
    Qasm { path: PathBuf, source: QasmError },
}

/// On-disk circuit formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitFormat {
    /// pytket JSON (`.json`).
    Structured,
    /// OpenQASM 2.0 (`.qasm`).
    Text,
}

impl CircuitFormat {
    /// Resolve the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<CircuitFormat> {
        match path.extension()?.to_str()? {
            "json" => Some(CircuitFormat::Structured),
            "qasm" => Some(CircuitFormat::Text),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            CircuitFormat::Structured => "json",
            CircuitFormat::Text => "qasm",
        }
    }
}

impl fmt::Display for CircuitFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Load a circuit file. Classical registers are dropped before parsing.
pub fn load_circuit(path: &Path) -> Result<Circuit, LoadError> {
    let format = CircuitFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let src = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let circuit = parse_circuit(&src, format).map_err(|err| match err {
        ParseError::Json(source) => LoadError::Json {
            path: path.to_path_buf(),
            source,
        },
        ParseError::Qasm(source) => LoadError::Qasm {
            path: path.to_path_buf(),
            source,
        },
    })?;
    debug!(
        path = %path.display(),
        %format,
        qubits = circuit.num_qubits(),
        gates = circuit.num_gates(),
        "loaded circuit"
    );
    Ok(circuit)
}

#[derive(Debug)]
enum ParseError {
    Json(JsonError),
    Qasm(QasmError),
}

fn parse_circuit(src: &str, format: CircuitFormat) -> Result<Circuit, ParseError> {
    match format {
        CircuitFormat::Structured => {
            let mut value: serde_json::Value =
                serde_json::from_str(src).map_err(|e| ParseError::Json(e.into()))?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("bits".to_string(), serde_json::Value::Array(Vec::new()));
            }
            circuit_from_json_value(value).map_err(ParseError::Json)
        }
        CircuitFormat::Text => circuit_from_qasm(&strip_classical(src)).map_err(ParseError::Qasm),
    }
}

/// Drop every line mentioning `creg`.
fn strip_classical(src: &str) -> String {
    src.lines()
        .filter(|line| !line.contains("creg"))
        .map(|line| format!("{}\n", line))
        .collect()
}
