use std::f64::consts::PI;

use approx::assert_abs_diff_eq;

use qcheq::circuit::{control, put, Circuit, CircuitError, PositionedGate};
use qcheq::Gate;

mod common;

#[test]
fn test_new_validates_locations() {
    let err = Circuit::new(2, vec![put(vec![2], Gate::H)]).unwrap_err();
    assert_eq!(err, CircuitError::LocOutOfRange { loc: 2, num_qubits: 2 });
}

#[test]
fn test_new_rejects_overlapping_locations() {
    let err = Circuit::new(2, vec![control(vec![0], vec![0], Gate::X)]).unwrap_err();
    assert_eq!(err, CircuitError::OverlappingLocs { overlapping: vec![0] });
}

#[test]
fn test_new_rejects_wrong_target_count() {
    let err = Circuit::new(2, vec![put(vec![0], Gate::SWAP)]).unwrap_err();
    assert!(matches!(
        err,
        CircuitError::TargetCountMismatch { expected: 2, actual: 1, .. }
    ));
}

#[test]
fn test_new_rejects_control_config_mismatch() {
    let pg = PositionedGate::new(Gate::X, vec![1], vec![0], vec![]);
    assert!(matches!(
        Circuit::new(2, vec![pg]),
        Err(CircuitError::ControlConfigLengthMismatch { .. })
    ));
}

#[test]
fn test_add_circuit_remaps_qubits() {
    let small = Circuit::new(2, vec![control(vec![0], vec![1], Gate::X)]).unwrap();
    let mut big = Circuit::empty(4);
    big.add_circuit(&small, &[3, 1]).unwrap();
    assert_eq!(big.num_gates(), 1);
    assert_eq!(big.gates[0].control_locs, vec![3]);
    assert_eq!(big.gates[0].target_locs, vec![1]);
}

#[test]
fn test_add_circuit_leaves_input_untouched() {
    let small = Circuit::new(1, vec![put(vec![0], Gate::H)]).unwrap();
    let before = small.clone();
    let mut big = Circuit::empty(2);
    big.add_circuit(&small, &[1]).unwrap();
    assert_eq!(small, before);
}

#[test]
fn test_add_circuit_rejects_bad_mapping() {
    let small = Circuit::empty(2);
    let mut big = Circuit::empty(3);
    assert_eq!(
        big.add_circuit(&small, &[0]),
        Err(CircuitError::MappingLengthMismatch { expected: 2, actual: 1 })
    );
    assert!(matches!(
        big.add_circuit(&small, &[1, 1]),
        Err(CircuitError::OverlappingLocs { .. })
    ));
    assert!(matches!(
        big.add_circuit(&small, &[0, 3]),
        Err(CircuitError::LocOutOfRange { loc: 3, .. })
    ));
    assert_eq!(big.num_gates(), 0);
}

#[test]
fn test_global_phase_composes() {
    let a = Circuit::empty(1).with_global_phase(0.25);
    let mut b = Circuit::empty(1).with_global_phase(0.5);
    b.add_circuit(&a, &[0]).unwrap();
    assert_abs_diff_eq!(b.phase, 0.75, epsilon = 1e-15);
    assert_abs_diff_eq!(b.dagger().phase, -0.75, epsilon = 1e-15);
}

#[test]
fn test_dagger_inverts_unitary() {
    let circuit = Circuit::new(
        3,
        vec![
            put(vec![0], Gate::H),
            put(vec![1], Gate::T),
            control(vec![0], vec![2], Gate::SqrtX),
            put(vec![1, 2], Gate::Ryy(0.4)),
            put(vec![0], Gate::U3(0.3, PI / 3.0, 1.0)),
            control(vec![2], vec![0, 1], Gate::ISWAP),
        ],
    )
    .unwrap();
    let u = common::dense_unitary(&circuit);
    let ud = common::dense_unitary(&circuit.dagger());
    let prod = ud.dot(&u);
    for i in 0..8 {
        for j in 0..8 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(prod[[i, j]].re, expected, epsilon = 1e-12);
            assert_abs_diff_eq!(prod[[i, j]].im, 0.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_display() {
    let circuit = Circuit::new(2, vec![put(vec![0], Gate::H), control(vec![0], vec![1], Gate::X)]).unwrap();
    let text = circuit.to_string();
    assert!(text.contains("nqubits: 2"));
    assert!(text.contains("H @ q[0]"));
    assert!(text.contains("C(q[0]) X @ q[1]"));
}
