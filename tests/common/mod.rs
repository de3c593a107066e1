//! Shared test utilities for qcheq integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use num_complex::Complex64;

use qcheq::circuit::{Circuit, PositionedGate};

// ==================== Dense Reference ====================

/// Full 2^n x 2^n unitary of a circuit, built gate by gate on basis states.
///
/// Qubit 0 is the most significant bit of a basis index. The circuit's
/// global phase is not included.
pub fn dense_unitary(circuit: &Circuit) -> Array2<Complex64> {
    let dim = 1usize << circuit.num_qubits();
    let mut u = Array2::<Complex64>::eye(dim);
    for pg in &circuit.gates {
        u = gate_unitary(pg, circuit.num_qubits()).dot(&u);
    }
    u
}

fn gate_unitary(pg: &PositionedGate, n: usize) -> Array2<Complex64> {
    let dim = 1usize << n;
    let bit = |index: usize, q: usize| (index >> (n - 1 - q)) & 1;
    let m = pg.gate.matrix();
    let mut out = Array2::<Complex64>::zeros((dim, dim));

    for col in 0..dim {
        let active = pg
            .control_locs
            .iter()
            .zip(&pg.control_configs)
            .all(|(&q, &cfg)| bit(col, q) == cfg as usize);
        if !active {
            out[[col, col]] = Complex64::new(1.0, 0.0);
            continue;
        }
        let k = pg.target_locs.len();
        let input = pg
            .target_locs
            .iter()
            .fold(0, |acc, &q| (acc << 1) | bit(col, q));
        for output in 0..(1usize << k) {
            let mut row = col;
            for (i, &q) in pg.target_locs.iter().enumerate() {
                let b = (output >> (k - 1 - i)) & 1;
                let mask = 1usize << (n - 1 - q);
                row = if b == 1 { row | mask } else { row & !mask };
            }
            out[[row, col]] += m[[output, input]];
        }
    }
    out
}

/// `Tr(U_b† U_a) / 2^n` computed densely.
pub fn dense_overlap(a: &Circuit, b: &Circuit) -> Complex64 {
    let ua = dense_unitary(a);
    let ub = dense_unitary(b);
    let dim = ua.nrows() as f64;
    let prod = ub.t().mapv(|c| c.conj()).dot(&ua);
    prod.diag().sum() / dim
}

pub fn assert_complex_near(actual: Complex64, expected: Complex64, tol: f64) {
    assert!(
        (actual - expected).norm() < tol,
        "expected {expected}, got {actual}"
    );
}

// ==================== Fixtures ====================

pub const BELL_QASM: &str = "OPENQASM 2.0;
include \"qelib1.inc\";
qreg q[2];
creg c[2];
h q[0];
cx q[0],q[1];
measure q -> c;
";

/// Same unitary as `BELL_QASM`, written differently.
pub const BELL_OPT_QASM: &str = "OPENQASM 2.0;
include \"qelib1.inc\";
qreg q[2];
u2(0,pi) q[0];
h q[1];
cz q[0],q[1];
h q[1];
";

/// A Bell circuit with a stray X on the second qubit.
pub const BELL_BROKEN_QASM: &str = "OPENQASM 2.0;
include \"qelib1.inc\";
qreg q[2];
h q[0];
cx q[0],q[1];
x q[1];
";

/// `n`-qubit GHZ circuit in OpenQASM.
pub fn ghz_qasm(n: usize) -> String {
    let mut src = format!("OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[{n}];\nh q[0];\n");
    for i in 1..n {
        src.push_str(&format!("cx q[{}],q[{}];\n", i - 1, i));
    }
    src
}

/// Write `content` to `dir/name`, creating `dir` if needed.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
