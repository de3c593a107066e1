//! Equivalence checking through the Bell-pair overlap construction.
//!
//! Preparing `n` Bell pairs and acting with a candidate circuit on one half
//! of each pair yields a state that determines the circuit's unitary. The
//! overlap of the states built from `U_A` and `U_B` is `Tr(U_B† U_A) / 2^n`,
//! which is 1 exactly when the two unitaries agree.

use num_complex::Complex64;
use thiserror::Error;
use tracing::debug;

use crate::circuit::Circuit;
use crate::contractor::{contract_scalar, ContractionError, ContractionLimits};
use crate::easybuild::bell_pairs;
use crate::einsum::circuit_to_einsum_with_boundary;

/// Tolerance used when none is configured.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// The two circuits being compared act on different numbers of qubits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circuits have different qubit counts ({left} vs {right})")]
pub struct InputMismatchError {
    pub left: usize,
    pub right: usize,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Mismatch(#[from] InputMismatchError),
    #[error(transparent)]
    Contraction(#[from] ContractionError),
}

/// Ket and bra circuits of the overlap ⟨bra|ket⟩, each on `2n` qubits.
#[derive(Debug, Clone)]
pub struct OverlapCircuits {
    pub ket: Circuit,
    pub bra: Circuit,
}

/// Options for a single equivalence check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckOptions {
    pub tolerance: f64,
    pub limits: ContractionLimits,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            tolerance: DEFAULT_TOLERANCE,
            limits: ContractionLimits::default(),
        }
    }
}

/// Outcome of a completed check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquivalenceCheck {
    pub overlap: Complex64,
    pub equivalent: bool,
}

/// Build the ket and bra circuits whose overlap compares `circ_a` with `circ_b`.
///
/// Both start from the same `n` Bell pairs (H on `i`, CX `i → i+n`).
/// `circ_a` is appended to the local half of the ket copy and `circ_b` to the
/// local half of the bra copy. The inputs are not modified.
///
/// # Errors
/// Returns `InputMismatchError` when the qubit counts differ.
pub fn build_overlap(circ_a: &Circuit, circ_b: &Circuit) -> Result<OverlapCircuits, InputMismatchError> {
    let n = circ_a.num_qubits();
    if n != circ_b.num_qubits() {
        return Err(InputMismatchError {
            left: n,
            right: circ_b.num_qubits(),
        });
    }

    let local: Vec<usize> = (0..n).collect();
    let mut ket = bell_pairs(n);
    let mut bra = ket.clone();
    ket.add_circuit(circ_a, &local)
        .expect("local half of a 2n-qubit register fits an n-qubit circuit");
    bra.add_circuit(circ_b, &local)
        .expect("local half of a 2n-qubit register fits an n-qubit circuit");

    Ok(OverlapCircuits { ket, bra })
}

/// Contract ⟨bra|ket⟩ to a scalar.
///
/// Each circuit becomes an output-state network with inputs pinned to |0⟩;
/// the bra network is conjugated and joined to the ket network on the open
/// legs. The global phase of either circuit does not contribute.
pub fn contract_overlap(
    ket: &Circuit,
    bra: &Circuit,
    limits: &ContractionLimits,
) -> Result<Complex64, ContractionError> {
    let ket_net = circuit_to_einsum_with_boundary(ket, &[])?;
    let bra_net = circuit_to_einsum_with_boundary(bra, &[])?;
    let overlap_net = ket_net.vdot(&bra_net)?;
    debug!(
        tensors = overlap_net.tensors.len(),
        labels = overlap_net.size_dict.len(),
        "overlap network built"
    );
    contract_scalar(&overlap_net, limits)
}

/// True iff `scalar` lies within `tol` of 1. `NaN` is never equivalent.
pub fn is_equivalent(scalar: Complex64, tol: f64) -> bool {
    (scalar - Complex64::new(1.0, 0.0)).norm() < tol
}

/// Decide whether `circ_a` and `circ_b` implement the same unitary.
pub fn check_equivalence(
    circ_a: &Circuit,
    circ_b: &Circuit,
    options: &CheckOptions,
) -> Result<EquivalenceCheck, CheckError> {
    let OverlapCircuits { ket, bra } = build_overlap(circ_a, circ_b)?;
    let overlap = contract_overlap(&ket, &bra, &options.limits)?;
    debug!(re = overlap.re, im = overlap.im, "overlap contracted");
    Ok(EquivalenceCheck {
        overlap,
        equivalent: is_equivalent(overlap, options.tolerance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_equivalent_threshold() {
        assert!(is_equivalent(Complex64::new(1.0, 0.0), 1e-8));
        assert!(is_equivalent(Complex64::new(1.0 - 1e-9, 1e-9), 1e-8));
        assert!(!is_equivalent(Complex64::new(0.0, 1.0), 1e-8));
        assert!(!is_equivalent(Complex64::new(-1.0, 0.0), 1e-8));
        assert!(!is_equivalent(Complex64::new(f64::NAN, 0.0), 1e-8));
    }

    #[test]
    fn test_overlap_register_layout() {
        let circ = Circuit::empty(3);
        let overlap = build_overlap(&circ, &circ).unwrap();
        assert_eq!(overlap.ket.num_qubits(), 6);
        assert_eq!(overlap.bra.num_qubits(), 6);
        // 3 Hadamards then 3 CNOTs
        assert_eq!(overlap.ket.num_gates(), 6);
        assert_eq!(overlap.ket.gates[4].control_locs, vec![1]);
        assert_eq!(overlap.ket.gates[4].target_locs, vec![4]);
    }
}
