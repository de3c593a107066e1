//! OpenQASM 2.0 reader.
//!
//! Supports the `qelib1.inc` gate set, multiple quantum registers (laid out
//! in declaration order), register broadcasting, parameter expressions and
//! user `gate` definitions, which are expanded inline. `barrier` and
//! `measure` carry no unitary content and are skipped; `reset`, `if` and
//! `opaque` are rejected.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use thiserror::Error;
use tracing::debug;

use crate::circuit::{control, put, Circuit, CircuitError, PositionedGate};
use crate::gate::Gate;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QasmError {
    #[error("line {line}: unexpected character '{ch}'")]
    UnexpectedChar { line: usize, ch: char },
    #[error("line {line}: expected {expected}, found {found}")]
    Expected {
        line: usize,
        expected: String,
        found: String,
    },
    #[error("line {line}: unknown register '{name}'")]
    UnknownRegister { line: usize, name: String },
    #[error("line {line}: index {index} out of range for register '{name}' of size {size}")]
    IndexOutOfRange {
        line: usize,
        name: String,
        index: usize,
        size: usize,
    },
    #[error("line {line}: unknown gate '{name}'")]
    UnknownGate { line: usize, name: String },
    #[error("line {line}: gate '{name}' is already defined")]
    Redefinition { line: usize, name: String },
    #[error("line {line}: gate '{name}' takes {expected} parameters, got {actual}")]
    ParamCount {
        line: usize,
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("line {line}: gate '{name}' acts on {expected} qubits, got {actual}")]
    ArgCount {
        line: usize,
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("line {line}: register arguments have different sizes")]
    BroadcastMismatch { line: usize },
    #[error("line {line}: unknown parameter '{name}'")]
    UnknownParameter { line: usize, name: String },
    #[error("line {line}: unsupported statement '{keyword}'")]
    Unsupported { line: usize, keyword: String },
    #[error("line {line}: {source}")]
    Circuit { line: usize, source: CircuitError },
}

/// Parse an OpenQASM 2.0 program into a circuit.
pub fn circuit_from_qasm(src: &str) -> Result<Circuit, QasmError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser::new(tokens);
    parser.program()?;

    let mut circuit = Circuit::empty(parser.num_qubits);
    for (pg, line) in parser.gates {
        circuit
            .push(pg)
            .map_err(|source| QasmError::Circuit { line, source })?;
    }
    debug!(
        qubits = circuit.num_qubits(),
        gates = circuit.num_gates(),
        "parsed qasm"
    );
    Ok(circuit)
}

/// Evaluate a constant parameter expression such as `-pi/4` or `0.25`.
pub fn eval_expression(src: &str) -> Result<f64, QasmError> {
    let mut parser = Parser::new(tokenize(src)?);
    let expr = parser.expr()?;
    parser.expect_end()?;
    expr.eval(&HashMap::new())
        .map_err(|name| QasmError::UnknownParameter { line: 1, name })
}

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Num(f64),
    Str(String),
    Sym(char),
    Arrow,
    Eq,
}

impl std::fmt::Display for Tok {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Ident(s) => write!(f, "'{}'", s),
            Tok::Num(x) => write!(f, "{}", x),
            Tok::Str(s) => write!(f, "\"{}\"", s),
            Tok::Sym(c) => write!(f, "'{}'", c),
            Tok::Arrow => write!(f, "'->'"),
            Tok::Eq => write!(f, "'=='"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    line: usize,
}

fn tokenize(src: &str) -> Result<Vec<Token>, QasmError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '-' if chars.get(i + 1) == Some(&'>') => {
                tokens.push(Token { tok: Tok::Arrow, line });
                i += 2;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token { tok: Tok::Eq, line });
                i += 2;
            }
            '"' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '"' {
                    end += 1;
                }
                if end == chars.len() {
                    return Err(QasmError::Expected {
                        line,
                        expected: "closing '\"'".to_string(),
                        found: "end of input".to_string(),
                    });
                }
                tokens.push(Token {
                    tok: Tok::Str(chars[start..end].iter().collect()),
                    line,
                });
                i = end + 1;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token {
                    tok: Tok::Ident(chars[start..i].iter().collect()),
                    line,
                });
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        i = j;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| QasmError::Expected {
                    line,
                    expected: "number".to_string(),
                    found: text.clone(),
                })?;
                tokens.push(Token {
                    tok: Tok::Num(value),
                    line,
                });
            }
            ';' | ',' | '(' | ')' | '[' | ']' | '{' | '}' | '+' | '-' | '*' | '/' | '^' => {
                tokens.push(Token {
                    tok: Tok::Sym(c),
                    line,
                });
                i += 1;
            }
            _ => return Err(QasmError::UnexpectedChar { line, ch: c }),
        }
    }
    Ok(tokens)
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl Func {
    fn from_name(name: &str) -> Option<Func> {
        match name {
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "exp" => Some(Func::Exp),
            "ln" => Some(Func::Ln),
            "sqrt" => Some(Func::Sqrt),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Exp => x.exp(),
            Func::Ln => x.ln(),
            Func::Sqrt => x.sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Param(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    /// Evaluate with gate parameters bound in `env`. Fails with the name of
    /// the first unbound parameter.
    fn eval(&self, env: &HashMap<String, f64>) -> Result<f64, String> {
        Ok(match self {
            Expr::Num(x) => *x,
            Expr::Param(name) => *env.get(name).ok_or_else(|| name.clone())?,
            Expr::Neg(e) => -e.eval(env)?,
            Expr::Call(func, e) => func.apply(e.eval(env)?),
            Expr::Binary(op, a, b) => {
                let (a, b) = (a.eval(env)?, b.eval(env)?);
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
        })
    }
}

// =============================================================================
// Parser
// =============================================================================

/// A gate application inside a `gate` body.
#[derive(Debug, Clone)]
struct GateCall {
    name: String,
    params: Vec<Expr>,
    args: Vec<String>,
    line: usize,
}

#[derive(Debug, Clone)]
struct GateDef {
    params: Vec<String>,
    qargs: Vec<String>,
    body: Vec<GateCall>,
}

/// A quantum register: name, first global qubit index, size.
#[derive(Debug, Clone)]
struct Register {
    name: String,
    start: usize,
    size: usize,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    registers: Vec<Register>,
    num_qubits: usize,
    defs: HashMap<String, GateDef>,
    gates: Vec<(PositionedGate, usize)>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            registers: Vec::new(),
            num_qubits: 0,
            defs: HashMap::new(),
            gates: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn error(&self, expected: &str) -> QasmError {
        QasmError::Expected {
            line: self.line(),
            expected: expected.to_string(),
            found: self
                .peek()
                .map_or_else(|| "end of input".to_string(), |t| t.to_string()),
        }
    }

    fn eat_sym(&mut self, c: char) -> bool {
        if self.peek() == Some(&Tok::Sym(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_sym(&mut self, c: char) -> Result<(), QasmError> {
        if self.eat_sym(c) {
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", c)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, QasmError> {
        match self.peek() {
            Some(Tok::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("identifier")),
        }
    }

    fn expect_index(&mut self) -> Result<usize, QasmError> {
        match self.peek() {
            Some(&Tok::Num(x)) if x >= 0.0 && x.fract() == 0.0 => {
                self.pos += 1;
                Ok(x as usize)
            }
            _ => Err(self.error("non-negative integer")),
        }
    }

    fn expect_end(&self) -> Result<(), QasmError> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error("end of input")),
        }
    }

    fn program(&mut self) -> Result<(), QasmError> {
        while let Some(tok) = self.peek().cloned() {
            let line = self.line();
            let Tok::Ident(keyword) = tok else {
                return Err(self.error("statement"));
            };
            match keyword.as_str() {
                "OPENQASM" => {
                    self.pos += 1;
                    match self.peek() {
                        Some(&Tok::Num(version)) if version < 3.0 => self.pos += 1,
                        Some(Tok::Num(_)) => {
                            return Err(QasmError::Unsupported {
                                line,
                                keyword: "OPENQASM 3".to_string(),
                            })
                        }
                        _ => return Err(self.error("version number")),
                    }
                    self.expect_sym(';')?;
                }
                "include" => {
                    self.pos += 1;
                    match self.peek() {
                        Some(Tok::Str(_)) => self.pos += 1,
                        _ => return Err(self.error("file name")),
                    }
                    self.expect_sym(';')?;
                }
                "qreg" | "creg" => {
                    self.pos += 1;
                    let name = self.expect_ident()?;
                    self.expect_sym('[')?;
                    let size = self.expect_index()?;
                    self.expect_sym(']')?;
                    self.expect_sym(';')?;
                    if keyword == "qreg" {
                        self.registers.push(Register {
                            name,
                            start: self.num_qubits,
                            size,
                        });
                        self.num_qubits += size;
                    }
                }
                "gate" => {
                    self.pos += 1;
                    self.gate_definition()?;
                }
                "barrier" | "measure" => {
                    debug!(line, statement = %keyword, "ignoring non-unitary statement");
                    self.pos += 1;
                    self.skip_statement();
                }
                "reset" | "if" | "opaque" => {
                    return Err(QasmError::Unsupported {
                        line,
                        keyword: keyword.clone(),
                    });
                }
                _ => self.gate_application()?,
            }
        }
        Ok(())
    }

    fn skip_statement(&mut self) {
        while let Some(tok) = self.peek() {
            let done = *tok == Tok::Sym(';');
            self.pos += 1;
            if done {
                break;
            }
        }
    }

    /// `name(params)? args;` at top level.
    fn gate_application(&mut self) -> Result<(), QasmError> {
        let line = self.line();
        let name = self.expect_ident()?;
        let params = self.param_list()?;
        let values = params
            .iter()
            .map(|e| e.eval(&HashMap::new()))
            .collect::<Result<Vec<f64>, String>>()
            .map_err(|name| QasmError::UnknownParameter { line, name })?;

        let mut args = vec![self.qubit_argument()?];
        while self.eat_sym(',') {
            args.push(self.qubit_argument()?);
        }
        self.expect_sym(';')?;

        let width = args.iter().map(Vec::len).max().unwrap_or(1);
        if args.iter().any(|a| a.len() != 1 && a.len() != width) {
            return Err(QasmError::BroadcastMismatch { line });
        }
        for k in 0..width {
            let qubits: Vec<usize> = args
                .iter()
                .map(|a| if a.len() == 1 { a[0] } else { a[k] })
                .collect();
            self.apply(&name, &values, &qubits, line)?;
        }
        Ok(())
    }

    /// Optional `( expr, ... )`.
    fn param_list(&mut self) -> Result<Vec<Expr>, QasmError> {
        let mut params = Vec::new();
        if self.eat_sym('(') {
            if !self.eat_sym(')') {
                params.push(self.expr()?);
                while self.eat_sym(',') {
                    params.push(self.expr()?);
                }
                self.expect_sym(')')?;
            }
        }
        Ok(params)
    }

    /// `reg` (whole register) or `reg[i]`, resolved to global qubit indices.
    fn qubit_argument(&mut self) -> Result<Vec<usize>, QasmError> {
        let line = self.line();
        let name = self.expect_ident()?;
        let register = self
            .registers
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| QasmError::UnknownRegister {
                line,
                name: name.clone(),
            })?;
        if self.eat_sym('[') {
            let index = self.expect_index()?;
            self.expect_sym(']')?;
            if index >= register.size {
                return Err(QasmError::IndexOutOfRange {
                    line,
                    name,
                    index,
                    size: register.size,
                });
            }
            Ok(vec![register.start + index])
        } else {
            Ok((register.start..register.start + register.size).collect())
        }
    }

    /// `gate name(params)? qargs { body }`
    fn gate_definition(&mut self) -> Result<(), QasmError> {
        let line = self.line();
        let name = self.expect_ident()?;
        if self.defs.contains_key(&name) {
            return Err(QasmError::Redefinition { line, name });
        }
        let mut params = Vec::new();
        if self.eat_sym('(') && !self.eat_sym(')') {
            params.push(self.expect_ident()?);
            while self.eat_sym(',') {
                params.push(self.expect_ident()?);
            }
            self.expect_sym(')')?;
        }
        let mut qargs = vec![self.expect_ident()?];
        while self.eat_sym(',') {
            qargs.push(self.expect_ident()?);
        }

        self.expect_sym('{')?;
        let mut body = Vec::new();
        while !self.eat_sym('}') {
            let line = self.line();
            let callee = self.expect_ident()?;
            if callee == "barrier" {
                self.skip_statement();
                continue;
            }
            if !self.defs.contains_key(&callee) && standard_arity(&callee).is_none() {
                return Err(QasmError::UnknownGate { line, name: callee });
            }
            let call_params = self.param_list()?;
            let mut args = vec![self.expect_ident()?];
            while self.eat_sym(',') {
                args.push(self.expect_ident()?);
            }
            self.expect_sym(';')?;
            if let Some(unknown) = args.iter().find(|a| !qargs.contains(a)) {
                return Err(QasmError::UnknownRegister {
                    line,
                    name: unknown.clone(),
                });
            }
            body.push(GateCall {
                name: callee,
                params: call_params,
                args,
                line,
            });
        }

        self.defs.insert(name, GateDef { params, qargs, body });
        Ok(())
    }

    /// Apply a gate by name to concrete qubits, expanding definitions.
    fn apply(&mut self, name: &str, params: &[f64], qubits: &[usize], line: usize) -> Result<(), QasmError> {
        if let Some((n_params, n_qubits)) = standard_arity(name) {
            check_counts(name, params.len(), n_params, qubits.len(), n_qubits, line)?;
            for pg in standard_gate(name, params, qubits) {
                self.gates.push((pg, line));
            }
            return Ok(());
        }

        let def = self
            .defs
            .get(name)
            .cloned()
            .ok_or_else(|| QasmError::UnknownGate {
                line,
                name: name.to_string(),
            })?;
        check_counts(name, params.len(), def.params.len(), qubits.len(), def.qargs.len(), line)?;

        let env: HashMap<String, f64> = def.params.iter().cloned().zip(params.iter().copied()).collect();
        for call in &def.body {
            let values = call
                .params
                .iter()
                .map(|e| e.eval(&env))
                .collect::<Result<Vec<f64>, String>>()
                .map_err(|name| QasmError::UnknownParameter {
                    line: call.line,
                    name,
                })?;
            let mapped: Vec<usize> = call
                .args
                .iter()
                .filter_map(|a| def.qargs.iter().position(|q| q == a))
                .map(|k| qubits[k])
                .collect();
            self.apply(&call.name, &values, &mapped, line)?;
        }
        Ok(())
    }

    // expr := term (('+'|'-') term)*
    fn expr(&mut self) -> Result<Expr, QasmError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat_sym('+') {
                BinOp::Add
            } else if self.eat_sym('-') {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(self.term()?));
        }
    }

    // term := unary (('*'|'/') unary)*
    fn term(&mut self) -> Result<Expr, QasmError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat_sym('*') {
                BinOp::Mul
            } else if self.eat_sym('/') {
                BinOp::Div
            } else {
                return Ok(lhs);
            };
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(self.unary()?));
        }
    }

    // unary := ('-'|'+') unary | primary ('^' unary)?
    fn unary(&mut self) -> Result<Expr, QasmError> {
        if self.eat_sym('-') {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat_sym('+') {
            return self.unary();
        }
        let base = self.primary()?;
        if self.eat_sym('^') {
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(self.unary()?)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, QasmError> {
        match self.peek().cloned() {
            Some(Tok::Num(x)) => {
                self.pos += 1;
                Ok(Expr::Num(x))
            }
            Some(Tok::Ident(name)) => {
                self.pos += 1;
                if name == "pi" {
                    return Ok(Expr::Num(PI));
                }
                match Func::from_name(&name) {
                    Some(func) if self.eat_sym('(') => {
                        let arg = self.expr()?;
                        self.expect_sym(')')?;
                        Ok(Expr::Call(func, Box::new(arg)))
                    }
                    _ => Ok(Expr::Param(name)),
                }
            }
            Some(Tok::Sym('(')) => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect_sym(')')?;
                Ok(inner)
            }
            _ => Err(self.error("expression")),
        }
    }
}

fn check_counts(
    name: &str,
    params: usize,
    expected_params: usize,
    qubits: usize,
    expected_qubits: usize,
    line: usize,
) -> Result<(), QasmError> {
    if params != expected_params {
        return Err(QasmError::ParamCount {
            line,
            name: name.to_string(),
            expected: expected_params,
            actual: params,
        });
    }
    if qubits != expected_qubits {
        return Err(QasmError::ArgCount {
            line,
            name: name.to_string(),
            expected: expected_qubits,
            actual: qubits,
        });
    }
    Ok(())
}

// =============================================================================
// Standard gates
// =============================================================================

/// (parameter count, qubit count) of a built-in gate.
fn standard_arity(name: &str) -> Option<(usize, usize)> {
    Some(match name {
        "id" | "x" | "y" | "z" | "h" | "s" | "sdg" | "t" | "tdg" | "sx" | "sxdg" => (0, 1),
        "u0" | "u1" | "p" | "rx" | "ry" | "rz" => (1, 1),
        "u2" => (2, 1),
        "U" | "u" | "u3" => (3, 1),
        "CX" | "cx" | "cy" | "cz" | "ch" | "swap" | "iswap" => (0, 2),
        "crx" | "cry" | "crz" | "cu1" | "cp" | "rxx" | "ryy" | "rzz" => (1, 2),
        "cu3" => (3, 2),
        "ccx" | "cswap" => (0, 3),
        _ => return None,
    })
}

/// Gates for a built-in with already-checked arity.
fn standard_gate(name: &str, p: &[f64], q: &[usize]) -> Vec<PositionedGate> {
    let single = |gate: Gate| vec![put(vec![q[0]], gate)];
    let controlled = |gate: Gate| vec![control(vec![q[0]], vec![q[1]], gate)];
    match name {
        "id" | "u0" => Vec::new(),
        "x" => single(Gate::X),
        "y" => single(Gate::Y),
        "z" => single(Gate::Z),
        "h" => single(Gate::H),
        "s" => single(Gate::S),
        "sdg" => single(Gate::Phase(-FRAC_PI_2)),
        "t" => single(Gate::T),
        "tdg" => single(Gate::Phase(-FRAC_PI_4)),
        "sx" => single(Gate::SqrtX),
        "sxdg" => single(Gate::SqrtX.dagger()),
        "u1" | "p" => single(Gate::Phase(p[0])),
        "rx" => single(Gate::Rx(p[0])),
        "ry" => single(Gate::Ry(p[0])),
        "rz" => single(Gate::Rz(p[0])),
        "u2" => single(Gate::U3(FRAC_PI_2, p[0], p[1])),
        "U" | "u" | "u3" => single(Gate::U3(p[0], p[1], p[2])),
        "CX" | "cx" => controlled(Gate::X),
        "cy" => controlled(Gate::Y),
        "cz" => controlled(Gate::Z),
        "ch" => controlled(Gate::H),
        "crx" => controlled(Gate::Rx(p[0])),
        "cry" => controlled(Gate::Ry(p[0])),
        "crz" => controlled(Gate::Rz(p[0])),
        "cu1" | "cp" => controlled(Gate::Phase(p[0])),
        "cu3" => controlled(Gate::U3(p[0], p[1], p[2])),
        "swap" => vec![put(vec![q[0], q[1]], Gate::SWAP)],
        "iswap" => vec![put(vec![q[0], q[1]], Gate::ISWAP)],
        "rxx" => vec![put(vec![q[0], q[1]], Gate::Rxx(p[0]))],
        "ryy" => vec![put(vec![q[0], q[1]], Gate::Ryy(p[0]))],
        "rzz" => vec![put(vec![q[0], q[1]], Gate::Rzz(p[0]))],
        "ccx" => vec![control(vec![q[0], q[1]], vec![q[2]], Gate::X)],
        "cswap" => vec![control(vec![q[0]], vec![q[1], q[2]], Gate::SWAP)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_expression() {
        assert!((eval_expression("-pi/4").unwrap() + FRAC_PI_4).abs() < 1e-15);
        assert!((eval_expression("2*(1+0.5)^2").unwrap() - 4.5).abs() < 1e-15);
        assert!((eval_expression("1.5e-1").unwrap() - 0.15).abs() < 1e-15);
        assert!((eval_expression("cos(0)").unwrap() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_eval_expression_rejects_free_names() {
        let err = eval_expression("theta").unwrap_err();
        assert!(matches!(err, QasmError::UnknownParameter { ref name, .. } if name == "theta"));
    }

    #[test]
    fn test_tokenize_skips_comments() {
        let tokens = tokenize("h q[0]; // comment\nx q[1];").unwrap();
        assert_eq!(tokens.len(), 12);
        assert_eq!(tokens.last().map(|t| t.line), Some(2));
    }

    #[test]
    fn test_power_is_right_associative() {
        assert!((eval_expression("2^3^2").unwrap() - 512.0).abs() < 1e-12);
        assert!((eval_expression("-2^2").unwrap() + 4.0).abs() < 1e-12);
    }
}
