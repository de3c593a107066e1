use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::gate::Gate;

/// Error types for circuit validation and composition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CircuitError {
    /// control_configs length does not match control_locs length
    #[error("control_configs length ({control_configs_len}) does not match control_locs length ({control_locs_len})")]
    ControlConfigLengthMismatch {
        control_locs_len: usize,
        control_configs_len: usize,
    },
    /// A location index is out of range
    #[error("location {loc} is out of range (num_qubits = {num_qubits})")]
    LocOutOfRange { loc: usize, num_qubits: usize },
    /// Overlap between target_locs and control_locs, or a repeated location
    #[error("gate acts more than once on locations: {overlapping:?}")]
    OverlappingLocs { overlapping: Vec<usize> },
    /// Gate matrix size does not match the number of target qubits
    #[error("gate {gate} needs {expected} target qubits, got {actual}")]
    TargetCountMismatch {
        gate: String,
        expected: usize,
        actual: usize,
    },
    /// Custom gate matrix is not a square power-of-two matrix
    #[error("gate {gate} does not have a 2^k x 2^k matrix")]
    InvalidMatrix { gate: String },
    /// Qubit mapping passed to `add_circuit` has the wrong length
    #[error("qubit mapping has {actual} entries, circuit has {expected} qubits")]
    MappingLengthMismatch { expected: usize, actual: usize },
}

/// A gate placed at specific qubits in a circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedGate {
    pub gate: Gate,
    pub target_locs: Vec<usize>,
    pub control_locs: Vec<usize>,
    pub control_configs: Vec<bool>,
}

impl PositionedGate {
    /// Creates a new PositionedGate.
    pub fn new(
        gate: Gate,
        target_locs: Vec<usize>,
        control_locs: Vec<usize>,
        control_configs: Vec<bool>,
    ) -> Self {
        PositionedGate {
            gate,
            target_locs,
            control_locs,
            control_configs,
        }
    }

    /// Returns all locations (control locations followed by target locations).
    pub fn all_locs(&self) -> Vec<usize> {
        let mut locs = self.control_locs.clone();
        locs.extend(&self.target_locs);
        locs
    }

    /// Returns a copy with every location sent through `mapping`.
    fn remapped(&self, mapping: &[usize]) -> Self {
        PositionedGate {
            gate: self.gate.clone(),
            target_locs: self.target_locs.iter().map(|&l| mapping[l]).collect(),
            control_locs: self.control_locs.iter().map(|&l| mapping[l]).collect(),
            control_configs: self.control_configs.clone(),
        }
    }

    fn validate(&self, num_qubits: usize) -> Result<(), CircuitError> {
        if self.control_configs.len() != self.control_locs.len() {
            return Err(CircuitError::ControlConfigLengthMismatch {
                control_locs_len: self.control_locs.len(),
                control_configs_len: self.control_configs.len(),
            });
        }

        for &loc in self.target_locs.iter().chain(self.control_locs.iter()) {
            if loc >= num_qubits {
                return Err(CircuitError::LocOutOfRange { loc, num_qubits });
            }
        }

        let mut seen = HashSet::new();
        let mut overlapping: Vec<usize> = self
            .all_locs()
            .into_iter()
            .filter(|&loc| !seen.insert(loc))
            .collect();
        if !overlapping.is_empty() {
            overlapping.sort_unstable();
            overlapping.dedup();
            return Err(CircuitError::OverlappingLocs { overlapping });
        }

        let expected = self
            .gate
            .num_qubits()
            .ok_or_else(|| CircuitError::InvalidMatrix {
                gate: self.gate.to_string(),
            })?;
        if expected != self.target_locs.len() {
            return Err(CircuitError::TargetCountMismatch {
                gate: self.gate.to_string(),
                expected,
                actual: self.target_locs.len(),
            });
        }
        Ok(())
    }
}

/// A quantum circuit: a sequence of positioned gates on a register of qubits,
/// plus a global phase that is carried as metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    /// The sequence of gates in the circuit.
    pub gates: Vec<PositionedGate>,
    /// Global phase in radians. Never part of the tensor network.
    pub phase: f64,
}

impl Circuit {
    /// Creates a new Circuit with validation.
    ///
    /// # Errors
    /// Returns a `CircuitError` if any gate is malformed or out of range.
    pub fn new(num_qubits: usize, gates: Vec<PositionedGate>) -> Result<Self, CircuitError> {
        for pg in &gates {
            pg.validate(num_qubits)?;
        }
        Ok(Circuit {
            num_qubits,
            gates,
            phase: 0.0,
        })
    }

    /// An empty circuit on `num_qubits` qubits.
    pub fn empty(num_qubits: usize) -> Self {
        Circuit {
            num_qubits,
            gates: Vec::new(),
            phase: 0.0,
        }
    }

    /// Returns the number of qubits in the circuit.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Returns the number of gates in the circuit.
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Returns the same circuit with `theta` added to its global phase.
    pub fn with_global_phase(mut self, theta: f64) -> Self {
        self.phase += theta;
        self
    }

    /// Appends a validated gate.
    pub fn push(&mut self, pg: PositionedGate) -> Result<(), CircuitError> {
        pg.validate(self.num_qubits)?;
        self.gates.push(pg);
        Ok(())
    }

    /// Append all gates of `other` onto this circuit, sending qubit `i` of
    /// `other` to qubit `qubits[i]` of `self`. The global phases add.
    ///
    /// # Errors
    /// Fails if `qubits` has the wrong length, repeats a qubit, or points
    /// outside this circuit. `self` is left unchanged on failure.
    pub fn add_circuit(&mut self, other: &Circuit, qubits: &[usize]) -> Result<(), CircuitError> {
        if qubits.len() != other.num_qubits {
            return Err(CircuitError::MappingLengthMismatch {
                expected: other.num_qubits,
                actual: qubits.len(),
            });
        }
        let mut seen = HashSet::new();
        for &q in qubits {
            if q >= self.num_qubits {
                return Err(CircuitError::LocOutOfRange {
                    loc: q,
                    num_qubits: self.num_qubits,
                });
            }
            if !seen.insert(q) {
                return Err(CircuitError::OverlappingLocs {
                    overlapping: vec![q],
                });
            }
        }

        self.gates
            .extend(other.gates.iter().map(|pg| pg.remapped(qubits)));
        self.phase += other.phase;
        Ok(())
    }

    /// Return the adjoint circuit U†.
    ///
    /// Gates are reversed and each replaced with its adjoint; the global
    /// phase is negated. For a unitary circuit U, U† U = I.
    pub fn dagger(&self) -> Self {
        let gates = self
            .gates
            .iter()
            .rev()
            .map(|pg| PositionedGate {
                gate: pg.gate.dagger(),
                target_locs: pg.target_locs.clone(),
                control_locs: pg.control_locs.clone(),
                control_configs: pg.control_configs.clone(),
            })
            .collect();
        Circuit {
            num_qubits: self.num_qubits,
            gates,
            phase: -self.phase,
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nqubits: {}", self.num_qubits)?;
        if self.phase != 0.0 {
            writeln!(f, "phase: {:.4}", self.phase)?;
        }
        for pg in &self.gates {
            if pg.control_locs.is_empty() {
                writeln!(f, "  {} @ q[{}]", pg.gate, format_locs(&pg.target_locs))?;
            } else {
                writeln!(
                    f,
                    "  C(q[{}]) {} @ q[{}]",
                    format_locs(&pg.control_locs),
                    pg.gate,
                    format_locs(&pg.target_locs)
                )?;
            }
        }
        Ok(())
    }
}

fn format_locs(locs: &[usize]) -> String {
    locs.iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Place a gate on target locations (no controls).
///
/// # Example
/// ```
/// use qcheq::circuit::put;
/// use qcheq::gate::Gate;
/// let pg = put(vec![0], Gate::H);
/// assert_eq!(pg.target_locs, vec![0]);
/// assert!(pg.control_locs.is_empty());
/// ```
pub fn put(target_locs: Vec<usize>, gate: Gate) -> PositionedGate {
    PositionedGate::new(gate, target_locs, vec![], vec![])
}

/// Place a controlled gate with active-high control (all controls trigger on |1⟩).
///
/// # Example
/// ```
/// use qcheq::circuit::control;
/// use qcheq::gate::Gate;
/// let cnot = control(vec![0], vec![1], Gate::X);
/// assert_eq!(cnot.control_locs, vec![0]);
/// assert_eq!(cnot.target_locs, vec![1]);
/// assert_eq!(cnot.control_configs, vec![true]);
/// ```
pub fn control(ctrl_locs: Vec<usize>, target_locs: Vec<usize>, gate: Gate) -> PositionedGate {
    let configs = vec![true; ctrl_locs.len()];
    PositionedGate::new(gate, target_locs, ctrl_locs, configs)
}
