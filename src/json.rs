//! Reader for pytket's JSON circuit serialization.
//!
//! Parameters are expression strings in half-turns (`"0.5"` is π/2).
//! Qubits are ordered by register name and then index, and the
//! `implicit_permutation` of the serialized circuit is realized as trailing
//! SWAP gates so that the loaded circuit has the same unitary.

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::circuit::{control, put, Circuit, CircuitError, PositionedGate};
use crate::gate::Gate;
use crate::qasm::{eval_expression, QasmError};

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("invalid circuit JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("unknown qubit {0}")]
    UnknownQubit(String),
    #[error("unsupported operation '{0}'")]
    UnsupportedOp(String),
    #[error("operation {op} expects {expected} parameters, got {actual}")]
    ParamCount {
        op: String,
        expected: usize,
        actual: usize,
    },
    #[error("operation {op} expects {expected} qubits, got {actual}")]
    ArgCount {
        op: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid parameter '{text}': {source}")]
    Param { text: String, source: QasmError },
    #[error("implicit permutation is not a permutation of the circuit qubits")]
    BadPermutation,
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

/// A unit identifier: register name plus index path, e.g. `["q", [0]]`.
type UnitId = (String, Vec<usize>);

#[derive(Deserialize)]
struct CircuitJson {
    #[serde(default)]
    phase: Option<ParamJson>,
    #[serde(default)]
    qubits: Vec<UnitId>,
    #[serde(default)]
    commands: Vec<CommandJson>,
    #[serde(default)]
    implicit_permutation: Vec<(UnitId, UnitId)>,
}

#[derive(Deserialize)]
struct CommandJson {
    op: OpJson,
    #[serde(default)]
    args: Vec<Value>,
}

#[derive(Deserialize)]
struct OpJson {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    params: Vec<ParamJson>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ParamJson {
    Number(f64),
    Text(String),
}

impl ParamJson {
    /// Value in radians.
    fn radians(&self) -> Result<f64, JsonError> {
        let half_turns = match self {
            ParamJson::Number(x) => *x,
            ParamJson::Text(text) => eval_expression(text).map_err(|source| JsonError::Param {
                text: text.clone(),
                source,
            })?,
        };
        Ok(half_turns * PI)
    }
}

/// Parse a pytket JSON document.
pub fn circuit_from_json(src: &str) -> Result<Circuit, JsonError> {
    circuit_from_json_value(serde_json::from_str(src)?)
}

/// Build a circuit from an already parsed pytket JSON document.
pub fn circuit_from_json_value(value: Value) -> Result<Circuit, JsonError> {
    let doc: CircuitJson = serde_json::from_value(value)?;

    let mut qubits = doc.qubits;
    qubits.sort();
    let index: HashMap<UnitId, usize> = qubits.iter().cloned().enumerate().map(|(i, q)| (q, i)).collect();
    let mut circuit = Circuit::empty(qubits.len());

    if let Some(phase) = &doc.phase {
        circuit.phase += phase.radians()?;
    }

    for command in &doc.commands {
        let kind = command.op.kind.as_str();
        match kind {
            "Barrier" | "Measure" | "noop" => {
                debug!(op = kind, "ignoring non-unitary operation");
                continue;
            }
            "Phase" => {
                let [a] = params::<1>(kind, &command.op.params)?;
                circuit.phase += a;
                continue;
            }
            _ => {}
        }

        let locs = command
            .args
            .iter()
            .map(|arg| {
                let unit: UnitId = serde_json::from_value(arg.clone())?;
                index
                    .get(&unit)
                    .copied()
                    .ok_or_else(|| JsonError::UnknownQubit(format!("{}{:?}", unit.0, unit.1)))
            })
            .collect::<Result<Vec<usize>, JsonError>>()?;

        for pg in command_gates(kind, &command.op.params, &locs)? {
            circuit.push(pg)?;
        }
    }

    for pg in permutation_swaps(&doc.implicit_permutation, &index)? {
        circuit.push(pg)?;
    }

    debug!(
        qubits = circuit.num_qubits(),
        gates = circuit.num_gates(),
        "parsed pytket json"
    );
    Ok(circuit)
}

/// Evaluate exactly `N` parameters of `op` in radians.
fn params<const N: usize>(op: &str, raw: &[ParamJson]) -> Result<[f64; N], JsonError> {
    if raw.len() != N {
        return Err(JsonError::ParamCount {
            op: op.to_string(),
            expected: N,
            actual: raw.len(),
        });
    }
    let mut out = [0.0; N];
    for (slot, p) in out.iter_mut().zip(raw) {
        *slot = p.radians()?;
    }
    Ok(out)
}

fn qubits<const N: usize>(op: &str, locs: &[usize]) -> Result<[usize; N], JsonError> {
    locs.try_into().map_err(|_| JsonError::ArgCount {
        op: op.to_string(),
        expected: N,
        actual: locs.len(),
    })
}

/// Gates implementing one pytket operation, in circuit order.
fn command_gates(kind: &str, raw: &[ParamJson], locs: &[usize]) -> Result<Vec<PositionedGate>, JsonError> {
    let one = |gate: Gate| -> Result<Vec<PositionedGate>, JsonError> {
        let [q] = qubits::<1>(kind, locs)?;
        Ok(vec![put(vec![q], gate)])
    };
    let controlled = |gate: Gate| -> Result<Vec<PositionedGate>, JsonError> {
        let [c, t] = qubits::<2>(kind, locs)?;
        Ok(vec![control(vec![c], vec![t], gate)])
    };
    let pair = |gate: Gate| -> Result<Vec<PositionedGate>, JsonError> {
        let [a, b] = qubits::<2>(kind, locs)?;
        Ok(vec![put(vec![a, b], gate)])
    };

    match kind {
        "H" => one(Gate::H),
        "X" => one(Gate::X),
        "Y" => one(Gate::Y),
        "Z" => one(Gate::Z),
        "S" => one(Gate::S),
        "Sdg" => one(Gate::S.dagger()),
        "T" => one(Gate::T),
        "Tdg" => one(Gate::T.dagger()),
        "V" => one(Gate::Rx(PI / 2.0)),
        "Vdg" => one(Gate::Rx(-PI / 2.0)),
        "SX" => one(Gate::SqrtX),
        "SXdg" => one(Gate::SqrtX.dagger()),
        "Rx" => {
            let [a] = params::<1>(kind, raw)?;
            one(Gate::Rx(a))
        }
        "Ry" => {
            let [a] = params::<1>(kind, raw)?;
            one(Gate::Ry(a))
        }
        "Rz" => {
            let [a] = params::<1>(kind, raw)?;
            one(Gate::Rz(a))
        }
        "U1" => {
            let [l] = params::<1>(kind, raw)?;
            one(Gate::Phase(l))
        }
        "U2" => {
            let [p, l] = params::<2>(kind, raw)?;
            one(Gate::U3(PI / 2.0, p, l))
        }
        "U3" => {
            let [t, p, l] = params::<3>(kind, raw)?;
            one(Gate::U3(t, p, l))
        }
        "TK1" => {
            // Rz(a) Rx(b) Rz(c) as a matrix product
            let [a, b, c] = params::<3>(kind, raw)?;
            let [q] = qubits::<1>(kind, locs)?;
            Ok(vec![
                put(vec![q], Gate::Rz(c)),
                put(vec![q], Gate::Rx(b)),
                put(vec![q], Gate::Rz(a)),
            ])
        }
        "PhasedX" => {
            // Rz(b) Rx(a) Rz(-b)
            let [a, b] = params::<2>(kind, raw)?;
            let [q] = qubits::<1>(kind, locs)?;
            Ok(vec![
                put(vec![q], Gate::Rz(-b)),
                put(vec![q], Gate::Rx(a)),
                put(vec![q], Gate::Rz(b)),
            ])
        }
        "CX" => controlled(Gate::X),
        "CY" => controlled(Gate::Y),
        "CZ" => controlled(Gate::Z),
        "CH" => controlled(Gate::H),
        "CSX" => controlled(Gate::SqrtX),
        "CRx" => {
            let [a] = params::<1>(kind, raw)?;
            controlled(Gate::Rx(a))
        }
        "CRy" => {
            let [a] = params::<1>(kind, raw)?;
            controlled(Gate::Ry(a))
        }
        "CRz" => {
            let [a] = params::<1>(kind, raw)?;
            controlled(Gate::Rz(a))
        }
        "CU1" => {
            let [l] = params::<1>(kind, raw)?;
            controlled(Gate::Phase(l))
        }
        "CU3" => {
            let [t, p, l] = params::<3>(kind, raw)?;
            controlled(Gate::U3(t, p, l))
        }
        "SWAP" => pair(Gate::SWAP),
        "ISWAPMax" => pair(Gate::ISWAP),
        "ZZMax" => pair(Gate::Rzz(PI / 2.0)),
        "ZZPhase" => {
            let [a] = params::<1>(kind, raw)?;
            pair(Gate::Rzz(a))
        }
        "XXPhase" => {
            let [a] = params::<1>(kind, raw)?;
            pair(Gate::Rxx(a))
        }
        "YYPhase" => {
            let [a] = params::<1>(kind, raw)?;
            pair(Gate::Ryy(a))
        }
        "CCX" => {
            let [c1, c2, t] = qubits::<3>(kind, locs)?;
            Ok(vec![control(vec![c1, c2], vec![t], Gate::X)])
        }
        "CSWAP" => {
            let [c, a, b] = qubits::<3>(kind, locs)?;
            Ok(vec![control(vec![c], vec![a, b], Gate::SWAP)])
        }
        other => {
            warn!(op = other, "unsupported pytket operation");
            Err(JsonError::UnsupportedOp(other.to_string()))
        }
    }
}

/// SWAP gates that move the state on input wire `a` to output wire `b` for
/// every pair `(a, b)` of the permutation.
fn permutation_swaps(
    pairs: &[(UnitId, UnitId)],
    index: &HashMap<UnitId, usize>,
) -> Result<Vec<PositionedGate>, JsonError> {
    let n = index.len();
    let mut dest: Vec<usize> = (0..n).collect();
    let mut seen = vec![false; n];
    for (from, to) in pairs {
        let a = *index.get(from).ok_or(JsonError::BadPermutation)?;
        let b = *index.get(to).ok_or(JsonError::BadPermutation)?;
        dest[a] = b;
    }
    for &b in &dest {
        if std::mem::replace(&mut seen[b], true) {
            return Err(JsonError::BadPermutation);
        }
    }

    // content[w] is the input wire whose state currently sits on wire w
    let mut content: Vec<usize> = (0..n).collect();
    let mut swaps = Vec::new();
    for j in 0..n {
        let k = (j..n)
            .find(|&k| dest[content[k]] == j)
            .ok_or(JsonError::BadPermutation)?;
        if k != j {
            swaps.push(put(vec![k, j], Gate::SWAP));
            content.swap(k, j);
        }
    }
    Ok(swaps)
}
