use std::collections::HashMap;

use ndarray::{ArrayD, ShapeError};
use num_complex::Complex64;
use omeco::EinCode;

use crate::circuit::Circuit;
use crate::contractor::ContractionError;
use crate::tensors::{gate_to_tensor, zero_ket, Leg};

/// A tensor network representation of a quantum circuit.
///
/// Contains the einsum contraction code, the tensor data, and
/// a size dictionary mapping labels to their dimensions.
#[derive(Debug, Clone)]
pub struct TensorNetwork {
    pub code: EinCode<usize>,
    pub tensors: Vec<ArrayD<Complex64>>,
    pub size_dict: HashMap<usize, usize>,
}

impl TensorNetwork {
    /// Number of open (output) legs.
    pub fn num_open_legs(&self) -> usize {
        self.code.iy.len()
    }

    /// One past the largest label used anywhere in the network.
    fn label_bound(&self) -> usize {
        self.code
            .ixs
            .iter()
            .flatten()
            .chain(self.code.iy.iter())
            .map(|&l| l + 1)
            .max()
            .unwrap_or(0)
    }

    /// Inner product network ⟨bra|self⟩.
    ///
    /// The bra tensors are conjugated and relabelled so that only their open
    /// legs meet this network's open legs, position by position. The result
    /// has no open legs and contracts to a scalar.
    ///
    /// # Errors
    /// Fails if the two networks have a different number of open legs.
    pub fn vdot(&self, bra: &TensorNetwork) -> Result<TensorNetwork, ContractionError> {
        if self.num_open_legs() != bra.num_open_legs() {
            return Err(ContractionError::OpenLegMismatch {
                ket: self.num_open_legs(),
                bra: bra.num_open_legs(),
            });
        }

        let offset = self.label_bound();
        let open: HashMap<usize, usize> = bra
            .code
            .iy
            .iter()
            .copied()
            .zip(self.code.iy.iter().copied())
            .collect();
        let relabel = |l: usize| open.get(&l).copied().unwrap_or(l + offset);

        let mut ixs = self.code.ixs.clone();
        ixs.extend(
            bra.code
                .ixs
                .iter()
                .map(|ix| ix.iter().map(|&l| relabel(l)).collect::<Vec<_>>()),
        );

        let mut tensors = self.tensors.clone();
        tensors.extend(bra.tensors.iter().map(|t| t.mapv(|c| c.conj())));

        let mut size_dict = self.size_dict.clone();
        for (&label, &dim) in &bra.size_dict {
            size_dict.insert(relabel(label), dim);
        }

        Ok(TensorNetwork {
            code: EinCode::new(ixs, Vec::new()),
            tensors,
            size_dict,
        })
    }
}

/// Convert a quantum circuit into a tensor network (einsum) representation.
///
/// The algorithm assigns integer labels to tensor legs:
/// - Labels 0..n-1 are initial state indices for each qubit
/// - Non-diagonal gates (or gates with controls) allocate new output labels
/// - Diagonal gates without controls reuse current labels (no new allocation)
///
/// The output labels `code.iy` are the final label of each qubit. The
/// initial labels 0..n-1 are left dangling as input legs.
pub fn circuit_to_einsum(circuit: &Circuit) -> Result<TensorNetwork, ShapeError> {
    let (tn, _) = build_network(circuit)?;
    Ok(tn)
}

/// Convert a circuit into a tensor network with boundary conditions.
///
/// Every input leg is pinned to |0⟩. The output leg of each qubit listed in
/// `final_pinned` is projected onto ⟨0|; the remaining output legs stay
/// open, in qubit order. With `final_pinned` empty the network is the
/// circuit's output state.
pub fn circuit_to_einsum_with_boundary(
    circuit: &Circuit,
    final_pinned: &[usize],
) -> Result<TensorNetwork, ShapeError> {
    let (mut tn, final_labels) = build_network(circuit)?;

    for label in 0..circuit.num_qubits() {
        tn.code.ixs.push(vec![label]);
        tn.tensors.push(zero_ket());
    }

    let mut open = Vec::new();
    for (qubit, &label) in final_labels.iter().enumerate() {
        if final_pinned.contains(&qubit) {
            tn.code.ixs.push(vec![label]);
            tn.tensors.push(zero_ket());
        } else {
            open.push(label);
        }
    }
    tn.code.iy = open;
    Ok(tn)
}

/// Shared label-assignment pass. Returns the network (open legs = final
/// labels) and the final label of each qubit.
fn build_network(circuit: &Circuit) -> Result<(TensorNetwork, Vec<usize>), ShapeError> {
    let n = circuit.num_qubits();

    let mut current_labels: Vec<usize> = (0..n).collect();
    let mut next_label: usize = n;
    let mut size_dict: HashMap<usize, usize> = (0..n).map(|i| (i, 2)).collect();

    let mut all_ixs: Vec<Vec<usize>> = Vec::with_capacity(circuit.num_gates());
    let mut all_tensors: Vec<ArrayD<Complex64>> = Vec::with_capacity(circuit.num_gates());

    for pg in &circuit.gates {
        let (tensor, legs) = gate_to_tensor(pg)?;

        // Output legs get fresh labels; diagonal and input legs keep the
        // qubit's label from before this gate.
        let all_locs = pg.all_locs();
        let inputs: Vec<usize> = all_locs.iter().map(|&loc| current_labels[loc]).collect();
        let mut tensor_ixs = Vec::with_capacity(legs.len());
        for leg in legs {
            let label = match leg {
                Leg::Diag(i) => current_labels[pg.target_locs[i]],
                Leg::In(i) => inputs[i],
                Leg::Out(i) => {
                    let label = next_label;
                    next_label += 1;
                    size_dict.insert(label, 2);
                    current_labels[all_locs[i]] = label;
                    label
                }
            };
            tensor_ixs.push(label);
        }
        all_ixs.push(tensor_ixs);

        all_tensors.push(tensor);
    }

    let tn = TensorNetwork {
        code: EinCode::new(all_ixs, current_labels.clone()),
        tensors: all_tensors,
        size_dict,
    };
    Ok((tn, current_labels))
}
