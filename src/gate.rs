use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

/// Quantum gate enum covering the standard gate sets of the supported
/// circuit formats, plus custom matrices.
///
/// All gates act on qubits. Multi-qubit matrices use row-major ordering over
/// the target qubits, with the first target as the most significant bit.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    X,
    Y,
    Z,
    H,
    S,
    T,
    SWAP,
    /// Phase gate: diag(1, e^(iθ)). QASM `u1` / `p`.
    Phase(f64),
    Rx(f64),
    Ry(f64),
    Rz(f64),
    /// √X gate: SqrtX² = X
    SqrtX,
    /// Generic single-qubit rotation U3(θ, φ, λ) in the OpenQASM convention.
    U3(f64, f64, f64),
    /// iSWAP gate: two-qubit
    ISWAP,
    /// exp(-iθ/2 X⊗X)
    Rxx(f64),
    /// exp(-iθ/2 Y⊗Y)
    Ryy(f64),
    /// exp(-iθ/2 Z⊗Z)
    Rzz(f64),
    Custom {
        matrix: Array2<Complex64>,
        is_diagonal: bool,
        label: String,
    },
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::X => write!(f, "X"),
            Gate::Y => write!(f, "Y"),
            Gate::Z => write!(f, "Z"),
            Gate::H => write!(f, "H"),
            Gate::S => write!(f, "S"),
            Gate::T => write!(f, "T"),
            Gate::SWAP => write!(f, "SWAP"),
            Gate::SqrtX => write!(f, "SqrtX"),
            Gate::ISWAP => write!(f, "ISWAP"),
            Gate::Phase(theta) => write!(f, "Phase({:.4})", theta),
            Gate::Rx(theta) => write!(f, "Rx({:.4})", theta),
            Gate::Ry(theta) => write!(f, "Ry({:.4})", theta),
            Gate::Rz(theta) => write!(f, "Rz({:.4})", theta),
            Gate::Rxx(theta) => write!(f, "Rxx({:.4})", theta),
            Gate::Ryy(theta) => write!(f, "Ryy({:.4})", theta),
            Gate::Rzz(theta) => write!(f, "Rzz({:.4})", theta),
            Gate::U3(theta, phi, lambda) => {
                write!(f, "U3({:.4}, {:.4}, {:.4})", theta, phi, lambda)
            }
            Gate::Custom { label, .. } => write!(f, "{}", label),
        }
    }
}

impl Gate {
    /// Returns the matrix representation of the gate on its target qubits.
    pub fn matrix(&self) -> Array2<Complex64> {
        match self {
            Gate::Custom { matrix, .. } => matrix.clone(),
            _ => self.qubit_matrix(),
        }
    }

    /// Returns the number of target qubits the gate acts on, or `None` if a
    /// custom matrix is not a square power-of-two matrix.
    pub fn num_qubits(&self) -> Option<usize> {
        match self {
            Gate::SWAP | Gate::ISWAP | Gate::Rxx(_) | Gate::Ryy(_) | Gate::Rzz(_) => Some(2),
            Gate::Custom { matrix, .. } => {
                let dim = matrix.nrows();
                if dim != matrix.ncols() || !dim.is_power_of_two() {
                    return None;
                }
                Some(dim.trailing_zeros() as usize)
            }
            _ => Some(1),
        }
    }

    /// Returns whether the gate is diagonal.
    pub fn is_diagonal(&self) -> bool {
        match self {
            Gate::Z | Gate::S | Gate::T | Gate::Phase(_) | Gate::Rz(_) | Gate::Rzz(_) => true,
            Gate::Custom { is_diagonal, .. } => *is_diagonal,
            _ => false,
        }
    }

    /// Return the adjoint (conjugate transpose) of this gate.
    ///
    /// For unitary gates, the adjoint is also the inverse: U† U = I.
    pub fn dagger(&self) -> Self {
        match self {
            Gate::H | Gate::X | Gate::Y | Gate::Z | Gate::SWAP => self.clone(),

            Gate::S => Gate::Phase(-FRAC_PI_2),
            Gate::T => Gate::Phase(-FRAC_PI_4),

            Gate::Rx(theta) => Gate::Rx(-theta),
            Gate::Ry(theta) => Gate::Ry(-theta),
            Gate::Rz(theta) => Gate::Rz(-theta),
            Gate::Phase(theta) => Gate::Phase(-theta),
            Gate::Rxx(theta) => Gate::Rxx(-theta),
            Gate::Ryy(theta) => Gate::Ryy(-theta),
            Gate::Rzz(theta) => Gate::Rzz(-theta),

            // U3(θ, φ, λ)† = U3(-θ, -λ, -φ)
            Gate::U3(theta, phi, lambda) => Gate::U3(-theta, -lambda, -phi),

            Gate::SqrtX => Gate::Custom {
                matrix: conjugate_transpose(&self.qubit_matrix()),
                is_diagonal: false,
                label: "SqrtX†".to_string(),
            },
            Gate::ISWAP => Gate::Custom {
                matrix: conjugate_transpose(&self.qubit_matrix()),
                is_diagonal: false,
                label: "iSWAP†".to_string(),
            },

            Gate::Custom {
                matrix,
                is_diagonal,
                label,
            } => Gate::Custom {
                matrix: conjugate_transpose(matrix),
                is_diagonal: *is_diagonal,
                label: format!("{}†", label),
            },
        }
    }

    /// Internal: compute the 2x2 or 4x4 matrix for named qubit gates.
    fn qubit_matrix(&self) -> Array2<Complex64> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let neg_one = Complex64::new(-1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let neg_i = Complex64::new(0.0, -1.0);
        let mat2 = |a, b, c, d| ndarray::arr2(&[[a, b], [c, d]]);

        match self {
            Gate::X => mat2(zero, one, one, zero),
            Gate::Y => mat2(zero, neg_i, i, zero),
            Gate::Z => mat2(one, zero, zero, neg_one),
            Gate::H => {
                let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
                mat2(s, s, s, -s)
            }
            Gate::S => mat2(one, zero, zero, i),
            Gate::T => mat2(one, zero, zero, Complex64::from_polar(1.0, FRAC_PI_4)),
            Gate::Phase(theta) => mat2(one, zero, zero, Complex64::from_polar(1.0, *theta)),
            Gate::Rx(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let neg_i_sin = Complex64::new(0.0, -(theta / 2.0).sin());
                mat2(cos, neg_i_sin, neg_i_sin, cos)
            }
            Gate::Ry(theta) => {
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let sin = Complex64::new((theta / 2.0).sin(), 0.0);
                mat2(cos, -sin, sin, cos)
            }
            Gate::Rz(theta) => mat2(
                Complex64::from_polar(1.0, -theta / 2.0),
                zero,
                zero,
                Complex64::from_polar(1.0, theta / 2.0),
            ),
            Gate::SqrtX => {
                // (1+i)/2 * [[1, -i], [-i, 1]]
                let f = Complex64::new(0.5, 0.5);
                mat2(f, f * neg_i, f * neg_i, f)
            }
            Gate::U3(theta, phi, lambda) => {
                let (sin, cos) = (theta / 2.0).sin_cos();
                mat2(
                    Complex64::new(cos, 0.0),
                    -Complex64::from_polar(sin, *lambda),
                    Complex64::from_polar(sin, *phi),
                    Complex64::from_polar(cos, phi + lambda),
                )
            }
            Gate::SWAP => {
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = one;
                m[[1, 2]] = one;
                m[[2, 1]] = one;
                m[[3, 3]] = one;
                m
            }
            Gate::ISWAP => {
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = one;
                m[[1, 2]] = i;
                m[[2, 1]] = i;
                m[[3, 3]] = one;
                m
            }
            Gate::Rxx(theta) | Gate::Ryy(theta) => {
                // cos(θ/2) I - i sin(θ/2) P⊗P with P⊗P anti-diagonal
                let cos = Complex64::new((theta / 2.0).cos(), 0.0);
                let neg_i_sin = Complex64::new(0.0, -(theta / 2.0).sin());
                // Y⊗Y has -1 on the outer anti-diagonal corners
                let corner = if matches!(self, Gate::Ryy(_)) { -neg_i_sin } else { neg_i_sin };
                let mut m = Array2::zeros((4, 4));
                for k in 0..4 {
                    m[[k, k]] = cos;
                }
                m[[0, 3]] = corner;
                m[[3, 0]] = corner;
                m[[1, 2]] = neg_i_sin;
                m[[2, 1]] = neg_i_sin;
                m
            }
            Gate::Rzz(theta) => {
                let even = Complex64::from_polar(1.0, -theta / 2.0);
                let odd = Complex64::from_polar(1.0, theta / 2.0);
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = even;
                m[[1, 1]] = odd;
                m[[2, 2]] = odd;
                m[[3, 3]] = even;
                m
            }
            Gate::Custom { matrix, .. } => matrix.clone(),
        }
    }
}

/// Compute the conjugate transpose (adjoint) of a matrix.
fn conjugate_transpose(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|c| c.conj())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unitary(m: &Array2<Complex64>) -> bool {
        let product = conjugate_transpose(m).dot(m);
        let n = m.nrows();
        (0..n).all(|r| {
            (0..n).all(|c| {
                let expected = if r == c { 1.0 } else { 0.0 };
                (product[[r, c]] - Complex64::new(expected, 0.0)).norm() < 1e-12
            })
        })
    }

    #[test]
    fn test_named_gates_are_unitary() {
        let gates = [
            Gate::X,
            Gate::Y,
            Gate::Z,
            Gate::H,
            Gate::S,
            Gate::T,
            Gate::SWAP,
            Gate::SqrtX,
            Gate::ISWAP,
            Gate::Phase(0.3),
            Gate::Rx(0.7),
            Gate::Ry(-1.1),
            Gate::Rz(2.5),
            Gate::U3(0.4, 1.2, -0.6),
            Gate::Rxx(0.9),
            Gate::Ryy(0.9),
            Gate::Rzz(0.9),
        ];
        for gate in &gates {
            assert!(is_unitary(&gate.matrix()), "{} is not unitary", gate);
        }
    }

    #[test]
    fn test_custom_num_qubits() {
        let gate = Gate::Custom {
            matrix: Array2::eye(8),
            is_diagonal: true,
            label: "I3".to_string(),
        };
        assert_eq!(gate.num_qubits(), Some(3));

        let bad = Gate::Custom {
            matrix: Array2::eye(3),
            is_diagonal: true,
            label: "I3".to_string(),
        };
        assert_eq!(bad.num_qubits(), None);
    }
}
