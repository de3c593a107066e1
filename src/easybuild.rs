use std::f64::consts::{FRAC_PI_2, PI};

use rand::Rng;

use crate::circuit::{control, put, Circuit, PositionedGate};
use crate::gate::Gate;

// =============================================================================
// Circuit Builders
// =============================================================================

/// Prepare `n` Bell pairs on a `2n`-qubit register.
///
/// Qubit `i` (local half) is paired with qubit `i + n` (remote half):
/// H on every local qubit, then CX from `i` to `i + n`.
///
/// # Example
/// ```
/// use qcheq::easybuild::bell_pairs;
/// let circuit = bell_pairs(2);
/// assert_eq!(circuit.num_qubits(), 4);
/// assert_eq!(circuit.num_gates(), 4);
/// ```
pub fn bell_pairs(n: usize) -> Circuit {
    let mut gates: Vec<PositionedGate> = (0..n).map(|q| put(vec![q], Gate::H)).collect();
    gates.extend((0..n).map(|q| control(vec![q], vec![q + n], Gate::X)));
    Circuit::new(2 * n, gates).expect("Bell pair locations are within 2n qubits")
}

/// Build an n-qubit QFT circuit.
///
/// For each qubit i (0-indexed): apply H, then for j in 1..(n-i):
/// controlled-Phase(2pi/2^(j+1)) with control=i+j, target=i.
/// Finally SWAP pairs to reverse bit order.
pub fn qft_circuit(n: usize) -> Circuit {
    let mut gates = Vec::new();

    for i in 0..n {
        gates.push(put(vec![i], Gate::H));
        for j in 1..(n - i) {
            let theta = 2.0 * PI / (1u64 << (j + 1)) as f64;
            gates.push(control(vec![i + j], vec![i], Gate::Phase(theta)));
        }
    }

    for i in 0..(n / 2) {
        gates.push(put(vec![i, n - 1 - i], Gate::SWAP));
    }

    Circuit::new(n, gates).expect("QFT locations are within n qubits")
}

/// Build a random Clifford circuit of `depth` gates on `n` qubits.
///
/// Gates are drawn uniformly from {H, S, S†, X, Z, CX, CZ, SWAP}; two-qubit
/// gates fall back to H when `n < 2`.
pub fn rand_clifford(n: usize, depth: usize, rng: &mut impl Rng) -> Circuit {
    let mut gates = Vec::with_capacity(depth);
    if n == 0 {
        return Circuit::empty(0);
    }

    for _ in 0..depth {
        let a = rng.gen_range(0..n);
        let pick = if n < 2 { rng.gen_range(0..5) } else { rng.gen_range(0..8) };
        let pg = match pick {
            0 => put(vec![a], Gate::H),
            1 => put(vec![a], Gate::S),
            2 => put(vec![a], Gate::Phase(-FRAC_PI_2)),
            3 => put(vec![a], Gate::X),
            4 => put(vec![a], Gate::Z),
            _ => {
                // Distinct second qubit
                let b = (a + rng.gen_range(1..n)) % n;
                match pick {
                    5 => control(vec![a], vec![b], Gate::X),
                    6 => control(vec![a], vec![b], Gate::Z),
                    _ => put(vec![a, b], Gate::SWAP),
                }
            }
        };
        gates.push(pg);
    }

    Circuit::new(n, gates).expect("random gate locations are within n qubits")
}
