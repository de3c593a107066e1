use std::path::Path;

use serde_json::json;

use qcheq::loader::{load_circuit, CircuitFormat, LoadError};
use qcheq::overlap::{check_equivalence, CheckOptions};

mod common;

use common::write_file;

#[test]
fn test_load_qasm_strips_classical_registers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "bell.qasm", common::BELL_QASM);
    let circ = load_circuit(&path).unwrap();
    assert_eq!(circ.num_qubits(), 2);
    assert_eq!(circ.num_gates(), 2);
}

#[test]
fn test_load_json_clears_bits() {
    let dir = tempfile::tempdir().unwrap();
    // A bits list that does not parse as unit ids must not matter
    let doc = json!({
        "bits": "garbage",
        "commands": [
            {"op": {"type": "H"}, "args": [["q", [0]]]},
            {"op": {"type": "CX"}, "args": [["q", [0]], ["q", [1]]]},
            {"op": {"type": "Measure"}, "args": [["q", [0]], ["c", [0]]]}
        ],
        "implicit_permutation": [[["q", [0]], ["q", [0]]], [["q", [1]], ["q", [1]]]],
        "phase": "0.0",
        "qubits": [["q", [0]], ["q", [1]]]
    });
    let path = write_file(dir.path(), "bell.json", &doc.to_string());
    let from_json = load_circuit(&path).unwrap();

    let qasm_path = write_file(dir.path(), "bell.qasm", common::BELL_QASM);
    let from_qasm = load_circuit(&qasm_path).unwrap();
    assert!(
        check_equivalence(&from_json, &from_qasm, &CheckOptions::default())
            .unwrap()
            .equivalent
    );
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "notes.txt", "hello");
    match load_circuit(&path) {
        Err(LoadError::UnsupportedFormat { path: p }) => assert_eq!(p, path),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn test_missing_file() {
    let err = load_circuit(Path::new("/definitely/not/here.qasm")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn test_parse_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "broken.qasm", "OPENQASM 2.0;\nqreg q[1];\nfrobnicate q[0];\n");
    let err = load_circuit(&path).unwrap_err();
    assert!(matches!(err, LoadError::Qasm { .. }));
    let message = err.to_string();
    assert!(message.contains("broken.qasm"), "{message}");
    assert!(message.contains("frobnicate"), "{message}");
}

#[test]
fn test_format_display() {
    assert_eq!(CircuitFormat::Structured.to_string(), "json");
    assert_eq!(CircuitFormat::Text.to_string(), "qasm");
}
