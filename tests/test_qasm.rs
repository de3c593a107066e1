use std::f64::consts::PI;

use approx::assert_abs_diff_eq;

use qcheq::circuit::{control, put, Circuit};
use qcheq::overlap::{check_equivalence, CheckOptions};
use qcheq::qasm::{circuit_from_qasm, QasmError};
use qcheq::Gate;

mod common;

const HEADER: &str = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\n";

fn parse(body: &str) -> Result<Circuit, QasmError> {
    circuit_from_qasm(&format!("{HEADER}{body}"))
}

fn equivalent(a: &Circuit, b: &Circuit) -> bool {
    check_equivalence(a, b, &CheckOptions::default()).unwrap().equivalent
}

#[test]
fn test_bell_circuit() {
    let circ = circuit_from_qasm(common::BELL_QASM).unwrap();
    assert_eq!(circ.num_qubits(), 2);
    assert_eq!(
        circ.gates,
        vec![put(vec![0], Gate::H), control(vec![0], vec![1], Gate::X)]
    );
}

#[test]
fn test_registers_are_concatenated() {
    let circ = parse("qreg a[2];\nqreg b[3];\nx b[1];\ncx a[1],b[0];\n").unwrap();
    assert_eq!(circ.num_qubits(), 5);
    assert_eq!(circ.gates[0].target_locs, vec![3]);
    assert_eq!(circ.gates[1].control_locs, vec![1]);
    assert_eq!(circ.gates[1].target_locs, vec![2]);
}

#[test]
fn test_broadcasting() {
    let circ = parse("qreg q[3];\nqreg r[3];\nh q;\ncx q,r;\ncz q[0],r;\n").unwrap();
    assert_eq!(circ.num_gates(), 9);
    assert!(circ.gates[..3].iter().all(|pg| pg.gate == Gate::H));
    assert_eq!(circ.gates[4].control_locs, vec![1]);
    assert_eq!(circ.gates[4].target_locs, vec![4]);
    assert_eq!(circ.gates[8].control_locs, vec![0]);
    assert_eq!(circ.gates[8].target_locs, vec![5]);
}

#[test]
fn test_broadcast_size_mismatch() {
    let err = parse("qreg q[2];\nqreg r[3];\ncx q,r;\n").unwrap_err();
    assert!(matches!(err, QasmError::BroadcastMismatch { line: 5 }));
}

#[test]
fn test_parameter_expressions() {
    let circ = parse("qreg q[1];\nrz(-pi/4) q[0];\nu3(pi/2, 0.5*2, -(1+1)) q[0];\np(2*pi^2) q[0];\n").unwrap();
    match circ.gates[0].gate {
        Gate::Rz(theta) => assert_abs_diff_eq!(theta, -PI / 4.0, epsilon = 1e-15),
        ref g => panic!("expected Rz, got {g}"),
    }
    match circ.gates[1].gate {
        Gate::U3(t, p, l) => {
            assert_abs_diff_eq!(t, PI / 2.0, epsilon = 1e-15);
            assert_abs_diff_eq!(p, 1.0, epsilon = 1e-15);
            assert_abs_diff_eq!(l, -2.0, epsilon = 1e-15);
        }
        ref g => panic!("expected U3, got {g}"),
    }
    match circ.gates[2].gate {
        Gate::Phase(theta) => assert_abs_diff_eq!(theta, 2.0 * PI * PI, epsilon = 1e-12),
        ref g => panic!("expected Phase, got {g}"),
    }
}

#[test]
fn test_gate_definition_is_expanded() {
    let src = "qreg q[2];
gate bell a, b { h a; cx a, b; }
gate rot(theta) a { rz(theta/2) a; rz(theta/2) a; }
bell q[1], q[0];
rot(pi) q[0];
";
    let circ = parse(src).unwrap();
    assert_eq!(circ.num_gates(), 4);
    assert_eq!(circ.gates[0], put(vec![1], Gate::H));
    assert_eq!(circ.gates[1], control(vec![1], vec![0], Gate::X));
    match circ.gates[3].gate {
        Gate::Rz(theta) => assert_abs_diff_eq!(theta, PI / 2.0, epsilon = 1e-15),
        ref g => panic!("expected Rz, got {g}"),
    }
}

#[test]
fn test_nested_gate_definitions() {
    let src = "qreg q[3];
gate inner a, b { cx a, b; }
gate outer a, b, c { inner a, b; inner b, c; }
outer q[0], q[1], q[2];
";
    let circ = parse(src).unwrap();
    assert_eq!(
        circ.gates,
        vec![control(vec![0], vec![1], Gate::X), control(vec![1], vec![2], Gate::X)]
    );
}

#[test]
fn test_standard_gates_match_their_definitions() {
    let cases = [
        ("sdg q[0];", "s q[0]; s q[0]; s q[0];"),
        ("tdg q[0];", "t q[0]; t q[0]; t q[0]; t q[0]; t q[0]; t q[0]; t q[0];"),
        ("sx q[0];", "h q[0]; s q[0]; h q[0];"),
        ("sxdg q[0]; sx q[0];", "id q[0];"),
        ("u2(0,pi) q[0];", "h q[0];"),
        ("u1(0.3) q[0];", "p(0.3) q[0];"),
        ("cu1(0.4) q[0],q[1];", "cp(0.4) q[0],q[1];"),
        ("ch q[0],q[1];", "ry(pi/4) q[1]; cx q[0],q[1]; ry(-pi/4) q[1];"),
        ("swap q[0],q[1];", "cx q[0],q[1]; cx q[1],q[0]; cx q[0],q[1];"),
        ("crz(0.6) q[0],q[1];", "rz(0.3) q[1]; cx q[0],q[1]; rz(-0.3) q[1]; cx q[0],q[1];"),
        ("rzz(0.8) q[0],q[1];", "cx q[0],q[1]; rz(0.8) q[1]; cx q[0],q[1];"),
        ("ccx q[0],q[1],q[2];", "h q[2]; cx q[1],q[2]; tdg q[2]; cx q[0],q[2]; t q[2]; cx q[1],q[2]; tdg q[2]; cx q[0],q[2]; t q[1]; t q[2]; h q[2]; cx q[0],q[1]; t q[0]; tdg q[1]; cx q[0],q[1];"),
        ("cswap q[0],q[1],q[2];", "cx q[2],q[1]; ccx q[0],q[1],q[2]; cx q[2],q[1];"),
    ];
    for (lhs, rhs) in cases {
        let a = parse(&format!("qreg q[3];\n{lhs}\n")).unwrap();
        let b = parse(&format!("qreg q[3];\n{rhs}\n")).unwrap();
        assert!(equivalent(&a, &b), "{lhs} vs {rhs}");
    }
}

#[test]
fn test_measure_and_barrier_are_ignored() {
    let circ = parse("qreg q[2];\ncreg c[2];\nh q[0];\nbarrier q;\nmeasure q[0] -> c[0];\n").unwrap();
    assert_eq!(circ.num_gates(), 1);
}

#[test]
fn test_comments_are_skipped() {
    let circ = parse("// a comment\nqreg q[1]; // trailing\nx q[0];\n").unwrap();
    assert_eq!(circ.num_gates(), 1);
}

#[test]
fn test_non_unitary_statements_rejected() {
    assert!(matches!(
        parse("qreg q[1];\nreset q[0];\n"),
        Err(QasmError::Unsupported { ref keyword, .. }) if keyword == "reset"
    ));
    assert!(matches!(
        parse("qreg q[1];\ncreg c[1];\nif(c==1) x q[0];\n"),
        Err(QasmError::Unsupported { ref keyword, .. }) if keyword == "if"
    ));
    assert!(matches!(
        parse("opaque magic a;\n"),
        Err(QasmError::Unsupported { ref keyword, .. }) if keyword == "opaque"
    ));
}

#[test]
fn test_errors_carry_line_numbers() {
    assert_eq!(
        parse("qreg q[2];\nfoo q[0];\n").unwrap_err(),
        QasmError::UnknownGate {
            line: 4,
            name: "foo".to_string()
        }
    );
    assert_eq!(
        parse("qreg q[2];\nx q[2];\n").unwrap_err(),
        QasmError::IndexOutOfRange {
            line: 4,
            name: "q".to_string(),
            index: 2,
            size: 2
        }
    );
    assert!(matches!(
        parse("qreg q[2];\nx r[0];\n"),
        Err(QasmError::UnknownRegister { line: 4, .. })
    ));
    assert!(matches!(
        parse("qreg q[2];\nrx q[0];\n"),
        Err(QasmError::ParamCount { line: 4, expected: 1, actual: 0, .. })
    ));
    assert!(matches!(
        parse("qreg q[2];\ncx q[0];\n"),
        Err(QasmError::ArgCount { line: 4, expected: 2, actual: 1, .. })
    ));
    assert!(matches!(
        parse("qreg q[2];\ncx q[0],q[0];\n"),
        Err(QasmError::Circuit { line: 4, .. })
    ));
    assert!(matches!(
        parse("qreg q[2];\nh q[0]\n"),
        Err(QasmError::Expected { .. })
    ));
}

#[test]
fn test_gate_redefinition_rejected() {
    // The second body calls the first definition of the same name
    let err = circuit_from_qasm(
        "OPENQASM 2.0;\nqreg q[1];\ngate g a { x a; }\ngate g a { g a; }\ng q[0];\n",
    )
    .unwrap_err();
    assert_eq!(
        err,
        QasmError::Redefinition {
            line: 4,
            name: "g".to_string()
        }
    );
}

#[test]
fn test_barrier_inside_gate_body() {
    let circ = parse("qreg q[2];\ngate bell a, b { h a; barrier a, b; cx a, b; }\nbell q[0], q[1];\n").unwrap();
    assert_eq!(circ.num_gates(), 2);
}

#[test]
fn test_openqasm_3_rejected() {
    assert!(matches!(
        circuit_from_qasm("OPENQASM 3.0;\nqubit[2] q;\n"),
        Err(QasmError::Unsupported { line: 1, .. })
    ));
}

#[test]
fn test_ghz_fixture() {
    let circ = circuit_from_qasm(&common::ghz_qasm(5)).unwrap();
    assert_eq!(circ.num_qubits(), 5);
    assert_eq!(circ.num_gates(), 5);
}
