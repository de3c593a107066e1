use ndarray::{Array1, Array2, ArrayD, IxDyn, ShapeError};
use num_complex::Complex64;

use crate::circuit::PositionedGate;

/// Leg descriptor for tensor network labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Output leg for the qubit at given index in all_locs.
    Out(usize),
    /// Input leg for the qubit at given index in all_locs.
    In(usize),
    /// Shared (diagonal) leg for the target at given index.
    Diag(usize),
}

/// Whether a positioned gate is stored as a diagonal tensor (one leg per
/// target, shared between input and output).
pub fn is_diagonal_tensor(pg: &PositionedGate) -> bool {
    pg.gate.is_diagonal() && pg.control_locs.is_empty()
}

/// Convert a PositionedGate to a tensor and its leg descriptors.
///
/// For non-diagonal gates (or any gate with controls):
///   Shape: (2, ..., 2 | 2, ..., 2) over all_locs, outputs first
///   Legs: [Out(0), ..., Out(n-1), In(0), ..., In(n-1)]
///
/// For diagonal gates without controls:
///   Shape: (2, ..., 2) over the targets
///   Legs: [Diag(0), Diag(1), ...]
pub fn gate_to_tensor(pg: &PositionedGate) -> Result<(ArrayD<Complex64>, Vec<Leg>), ShapeError> {
    if is_diagonal_tensor(pg) {
        let n_targets = pg.target_locs.len();
        let mat = pg.gate.matrix();
        let data: Vec<Complex64> = (0..mat.nrows()).map(|i| mat[[i, i]]).collect();
        let tensor = ArrayD::from_shape_vec(IxDyn(&vec![2; n_targets]), data)?;
        let legs = (0..n_targets).map(Leg::Diag).collect();
        Ok((tensor, legs))
    } else {
        let n_sites = pg.control_locs.len() + pg.target_locs.len();
        let full_matrix = build_controlled_matrix(pg);

        // Row-major matrix data maps directly onto (out..., in...) legs
        let data: Vec<Complex64> = full_matrix.iter().copied().collect();
        let tensor = ArrayD::from_shape_vec(IxDyn(&vec![2; 2 * n_sites]), data)?;
        let mut legs: Vec<Leg> = (0..n_sites).map(Leg::Out).collect();
        legs.extend((0..n_sites).map(Leg::In));
        Ok((tensor, legs))
    }
}

/// The single-qubit computational basis vector |0⟩ (or ⟨0| as a row).
pub fn zero_ket() -> ArrayD<Complex64> {
    Array1::from(vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)]).into_dyn()
}

/// Build the full controlled gate matrix for a PositionedGate.
///
/// all_locs = control_locs ++ target_locs; the control register is the
/// most significant part of the row index.
fn build_controlled_matrix(pg: &PositionedGate) -> Array2<Complex64> {
    let gate_matrix = pg.gate.matrix();
    if pg.control_locs.is_empty() {
        return gate_matrix;
    }

    let ctrl_dim = 1usize << pg.control_locs.len();
    let tgt_dim = gate_matrix.nrows();
    let trigger_index = compute_trigger_index(&pg.control_configs);
    let one = Complex64::new(1.0, 0.0);

    let mut mat = Array2::zeros((ctrl_dim * tgt_dim, ctrl_dim * tgt_dim));
    for ctrl_idx in 0..ctrl_dim {
        for tgt_row in 0..tgt_dim {
            let row = ctrl_idx * tgt_dim + tgt_row;
            if ctrl_idx == trigger_index {
                for tgt_col in 0..tgt_dim {
                    let col = ctrl_idx * tgt_dim + tgt_col;
                    mat[[row, col]] = gate_matrix[[tgt_row, tgt_col]];
                }
            } else {
                mat[[row, row]] = one;
            }
        }
    }
    mat
}

/// Row-major index of the control configuration that triggers the gate.
fn compute_trigger_index(control_configs: &[bool]) -> usize {
    control_configs
        .iter()
        .fold(0usize, |index, &cfg| (index << 1) | cfg as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{control, put, PositionedGate};
    use crate::gate::Gate;

    #[test]
    fn test_trigger_index() {
        assert_eq!(compute_trigger_index(&[true]), 1);
        assert_eq!(compute_trigger_index(&[true, false]), 2);
        assert_eq!(compute_trigger_index(&[false, true, true]), 3);
    }

    #[test]
    fn test_diagonal_gate_tensor() {
        let (tensor, legs) = gate_to_tensor(&put(vec![1], Gate::Z)).unwrap();
        assert_eq!(tensor.shape(), &[2]);
        assert_eq!(legs, vec![Leg::Diag(0)]);
        assert_eq!(tensor[[1]], Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn test_cnot_tensor() {
        let (tensor, legs) = gate_to_tensor(&control(vec![0], vec![1], Gate::X)).unwrap();
        assert_eq!(tensor.shape(), &[2, 2, 2, 2]);
        assert_eq!(legs.len(), 4);
        // |10⟩ -> |11⟩
        assert_eq!(tensor[[1, 1, 1, 0]], Complex64::new(1.0, 0.0));
        assert_eq!(tensor[[1, 0, 1, 0]], Complex64::new(0.0, 0.0));
        // control off: identity
        assert_eq!(tensor[[0, 1, 0, 1]], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_controlled_diagonal_is_full_tensor() {
        let cz = PositionedGate::new(Gate::Z, vec![1], vec![0], vec![false]);
        let (tensor, legs) = gate_to_tensor(&cz).unwrap();
        assert_eq!(tensor.ndim(), 4);
        assert_eq!(legs[0], Leg::Out(0));
        // active-low control: Z applies when control is |0⟩
        assert_eq!(tensor[[0, 1, 0, 1]], Complex64::new(-1.0, 0.0));
        assert_eq!(tensor[[1, 1, 1, 1]], Complex64::new(1.0, 0.0));
    }
}
