//! Equivalence checking of quantum circuits by tensor network contraction.
//!
//! Two circuits on `n` qubits are compared by preparing `n` Bell pairs,
//! applying each circuit to one half of the pairs and contracting the
//! overlap of the two resulting states. The overlap is `Tr(U_B† U_A) / 2^n`,
//! which equals 1 exactly when the unitaries agree.

pub mod gate;
pub mod circuit;
pub mod tensors;
pub mod einsum;
pub mod contractor;
pub mod easybuild;
pub mod overlap;
pub mod qasm;
pub mod json;
pub mod loader;
pub mod config;
pub mod logging;
pub mod report;
pub mod batch;

pub use gate::Gate;
pub use circuit::{Circuit, CircuitError, PositionedGate, put, control};
pub use einsum::{circuit_to_einsum, circuit_to_einsum_with_boundary, TensorNetwork};
pub use contractor::{contract, contract_scalar, plan_contraction, ContractionError, ContractionLimits, ContractionPlan, OrderOptimizer};
pub use overlap::{build_overlap, check_equivalence, contract_overlap, is_equivalent, CheckOptions, EquivalenceCheck};
pub use loader::{load_circuit, CircuitFormat, LoadError};
pub use batch::{BatchDriver, BatchResult};
pub use config::Config;
