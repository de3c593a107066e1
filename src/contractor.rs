//! Tensor network contractor on `ndarray` tensors.
//!
//! The contraction order comes from omeco, either its greedy pairing or its
//! TreeSA annealer. Each node of the resulting tree is executed as a
//! sequence of pairwise contractions, every one of which is a permute, a
//! reshape and a batched matrix product.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array3, ArrayD, Axis, IxDyn, ShapeError};
use num_complex::Complex64;
use omeco::{contraction_complexity, optimize_code, GreedyMethod, NestedEinsum, ScoreFunction, TreeSA};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::einsum::TensorNetwork;

/// Largest intermediate tensor accepted by default: 2^30 complex entries (16 GiB).
pub const DEFAULT_MAX_LOG2_SIZE: f64 = 30.0;

/// Under `Auto`, greedy orders cheaper than 2^20 operations are used as is.
const AUTO_REFINE_TC: f64 = 20.0;

/// How the contraction order is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderOptimizer {
    /// omeco's greedy pairing.
    Greedy,
    /// Simulated annealing over contraction trees, seeded by the greedy order.
    TreeSa,
    /// Greedy, refined by TreeSA when the greedy order is costly or too wide.
    #[default]
    Auto,
}

impl fmt::Display for OrderOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderOptimizer::Greedy => "greedy",
            OrderOptimizer::TreeSa => "treesa",
            OrderOptimizer::Auto => "auto",
        };
        f.write_str(name)
    }
}

impl FromStr for OrderOptimizer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(OrderOptimizer::Greedy),
            "treesa" => Ok(OrderOptimizer::TreeSa),
            "auto" => Ok(OrderOptimizer::Auto),
            other => Err(format!(
                "unknown contraction optimizer '{other}', expected greedy, treesa or auto"
            )),
        }
    }
}

/// Resource limits checked before any contraction work is done, and the
/// order search used to meet them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractionLimits {
    /// log2 of the largest number of elements any intermediate may hold.
    pub max_log2_size: f64,
    pub optimizer: OrderOptimizer,
}

impl Default for ContractionLimits {
    fn default() -> Self {
        ContractionLimits {
            max_log2_size: DEFAULT_MAX_LOG2_SIZE,
            optimizer: OrderOptimizer::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContractionError {
    #[error("no contraction order found for a network of {num_tensors} tensors")]
    OrderNotFound { num_tensors: usize },
    #[error("largest intermediate tensor needs 2^{space:.1} elements, limit is 2^{limit:.1}")]
    TooLarge { space: f64, limit: f64 },
    #[error("ket network has {ket} open legs but bra network has {bra}")]
    OpenLegMismatch { ket: usize, bra: usize },
    #[error("contraction left {rank} open legs, expected a scalar")]
    NotScalar { rank: usize },
    #[error("output label {label} does not appear in the network")]
    UnknownOutputLabel { label: usize },
    #[error("tensor reshape failed: {0}")]
    Shape(#[from] ShapeError),
}

/// A contraction tree with its cost.
#[derive(Debug, Clone)]
pub struct ContractionPlan {
    pub tree: NestedEinsum<usize>,
    /// log2 of the operation count.
    pub tc: f64,
    /// log2 of the element count of the largest intermediate.
    pub sc: f64,
    /// The search that produced `tree`, `Greedy` or `TreeSa`.
    pub optimizer: OrderOptimizer,
}

impl ContractionPlan {
    fn fits(&self, limit: f64) -> bool {
        self.sc <= limit
    }

    /// Orders that fit the limit beat those that don't; then lower time
    /// wins, or lower space when neither fits.
    fn better_than(&self, other: &ContractionPlan, limit: f64) -> bool {
        match (self.fits(limit), other.fits(limit)) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => self.tc < other.tc,
            (false, false) => self.sc < other.sc,
        }
    }
}

/// Search a contraction order for `tn` without executing it.
///
/// # Errors
/// Fails if the network is empty or omeco finds no order.
pub fn plan_contraction(
    tn: &TensorNetwork,
    limits: &ContractionLimits,
) -> Result<ContractionPlan, ContractionError> {
    let plan = match limits.optimizer {
        OrderOptimizer::Greedy => greedy_plan(tn)?,
        OrderOptimizer::TreeSa => treesa_plan(tn, limits)?,
        OrderOptimizer::Auto => {
            let greedy = greedy_plan(tn)?;
            if greedy.tc <= AUTO_REFINE_TC && greedy.fits(limits.max_log2_size) {
                greedy
            } else {
                match treesa_plan(tn, limits) {
                    Ok(annealed) if annealed.better_than(&greedy, limits.max_log2_size) => annealed,
                    _ => greedy,
                }
            }
        }
    };
    debug!(
        tensors = tn.tensors.len(),
        optimizer = %plan.optimizer,
        tc = plan.tc,
        sc = plan.sc,
        "contraction order found"
    );
    Ok(plan)
}

fn greedy_plan(tn: &TensorNetwork) -> Result<ContractionPlan, ContractionError> {
    let tree = optimize_code(&tn.code, &tn.size_dict, &GreedyMethod::default());
    to_plan(tn, tree, OrderOptimizer::Greedy)
}

fn treesa_plan(tn: &TensorNetwork, limits: &ContractionLimits) -> Result<ContractionPlan, ContractionError> {
    let sc_target = limits.max_log2_size.min(ScoreFunction::default().sc_target);
    let optimizer = TreeSA::default().with_sc_target(sc_target);
    let tree = optimize_code(&tn.code, &tn.size_dict, &optimizer);
    to_plan(tn, tree, OrderOptimizer::TreeSa)
}

fn to_plan(
    tn: &TensorNetwork,
    tree: Option<NestedEinsum<usize>>,
    optimizer: OrderOptimizer,
) -> Result<ContractionPlan, ContractionError> {
    let tree = tree.ok_or(ContractionError::OrderNotFound {
        num_tensors: tn.tensors.len(),
    })?;
    let complexity = contraction_complexity(&tree, &tn.size_dict, &tn.code.ixs);
    Ok(ContractionPlan {
        tree,
        tc: complexity.tc,
        sc: complexity.sc,
        optimizer,
    })
}

/// Contract a tensor network, returning a tensor whose axes follow `tn.code.iy`.
///
/// # Errors
/// Fails if omeco finds no order, or if the largest intermediate would
/// exceed `limits.max_log2_size`.
pub fn contract(
    tn: &TensorNetwork,
    limits: &ContractionLimits,
) -> Result<ArrayD<Complex64>, ContractionError> {
    if tn.tensors.is_empty() {
        // The empty product.
        return Ok(ArrayD::from_elem(IxDyn(&[]), Complex64::new(1.0, 0.0)));
    }

    let plan = plan_contraction(tn, limits)?;
    if !plan.fits(limits.max_log2_size) {
        return Err(ContractionError::TooLarge {
            space: plan.sc,
            limit: limits.max_log2_size,
        });
    }

    let (result, labels) = execute_tree(&plan.tree, tn)?;
    reduce_to(result, &labels, &tn.code.iy)
}

/// Contract a network with no open legs to a single complex number.
pub fn contract_scalar(
    tn: &TensorNetwork,
    limits: &ContractionLimits,
) -> Result<Complex64, ContractionError> {
    if !tn.code.iy.is_empty() {
        return Err(ContractionError::NotScalar {
            rank: tn.code.iy.len(),
        });
    }
    let result = contract(tn, limits)?;
    result
        .iter()
        .next()
        .copied()
        .ok_or(ContractionError::NotScalar { rank: result.ndim() })
}

/// Recursively execute a NestedEinsum contraction tree.
///
/// Returns the tensor together with the labels of its axes.
fn execute_tree(
    tree: &NestedEinsum<usize>,
    tn: &TensorNetwork,
) -> Result<(ArrayD<Complex64>, Vec<usize>), ContractionError> {
    match tree {
        NestedEinsum::Leaf { tensor_index } => Ok((
            tn.tensors[*tensor_index].clone(),
            tn.code.ixs[*tensor_index].clone(),
        )),
        NestedEinsum::Node { args, eins } => {
            let mut children = Vec::with_capacity(args.len());
            for child in args {
                children.push(execute_tree(child, tn)?);
            }
            contract_node(children, &eins.iy)
        }
    }
}

/// Contract the children of one tree node down to the labels in `iy`.
///
/// Children are folded left to right; after each step only labels needed by
/// a later child or by `iy` survive.
fn contract_node(
    children: Vec<(ArrayD<Complex64>, Vec<usize>)>,
    iy: &[usize],
) -> Result<(ArrayD<Complex64>, Vec<usize>), ContractionError> {
    let present: HashSet<usize> = children.iter().flat_map(|(_, ix)| ix.iter().copied()).collect();
    let target: Vec<usize> = iy.iter().copied().filter(|l| present.contains(l)).collect();

    let mut iter = children.into_iter().enumerate();
    let Some((_, (mut acc, mut acc_ix))) = iter.next() else {
        return Ok((ArrayD::from_elem(IxDyn(&[]), Complex64::new(1.0, 0.0)), Vec::new()));
    };
    let rest: Vec<(usize, (ArrayD<Complex64>, Vec<usize>))> = iter.collect();

    for (pos, (tensor, ix)) in rest.iter() {
        let later: HashSet<usize> = rest
            .iter()
            .filter(|(p, _)| p > pos)
            .flat_map(|(_, (_, lix))| lix.iter().copied())
            .chain(target.iter().copied())
            .collect();
        let mut out: Vec<usize> = Vec::new();
        for &l in acc_ix.iter().chain(ix.iter()) {
            if later.contains(&l) && !out.contains(&l) {
                out.push(l);
            }
        }
        acc = contract_pair(&acc, &acc_ix, tensor, ix, &out)?;
        acc_ix = out;
    }

    let acc = reduce_to(acc, &acc_ix, &target)?;
    Ok((acc, target))
}

/// Contract `a[ia]` with `b[ib]` into a tensor with axes `ic`.
///
/// Labels shared by both operands and kept in `ic` are batch (element-wise)
/// labels; shared labels missing from `ic` are summed over.
fn contract_pair(
    a: &ArrayD<Complex64>,
    ia: &[usize],
    b: &ArrayD<Complex64>,
    ib: &[usize],
    ic: &[usize],
) -> Result<ArrayD<Complex64>, ContractionError> {
    let (a, ia) = sum_out(a.clone(), ia, |l| ib.contains(&l) || ic.contains(&l));
    let (b, ib) = sum_out(b.clone(), ib, |l| ia.contains(&l) || ic.contains(&l));

    let batch: Vec<usize> = ia
        .iter()
        .copied()
        .filter(|l| ib.contains(l) && ic.contains(l))
        .collect();
    let inner: Vec<usize> = ia
        .iter()
        .copied()
        .filter(|l| ib.contains(l) && !ic.contains(l))
        .collect();
    let left: Vec<usize> = ia.iter().copied().filter(|l| !ib.contains(l)).collect();
    let right: Vec<usize> = ib.iter().copied().filter(|l| !ia.contains(l)).collect();

    let dim_of = |t: &ArrayD<Complex64>, ix: &[usize], l: usize| -> usize {
        ix.iter()
            .position(|&x| x == l)
            .map(|axis| t.shape()[axis])
            .unwrap_or(1)
    };
    let dims = |t: &ArrayD<Complex64>, ix: &[usize], ls: &[usize]| -> Vec<usize> {
        ls.iter().map(|&l| dim_of(t, ix, l)).collect()
    };
    let batch_dims = dims(&a, &ia, &batch);
    let left_dims = dims(&a, &ia, &left);
    let inner_dims = dims(&a, &ia, &inner);
    let right_dims = dims(&b, &ib, &right);
    let (nb, nl, nk, nr) = (
        batch_dims.iter().product::<usize>(),
        left_dims.iter().product::<usize>(),
        inner_dims.iter().product::<usize>(),
        right_dims.iter().product::<usize>(),
    );

    let a3 = to_matrix_batch(a, &ia, [batch.as_slice(), left.as_slice(), inner.as_slice()], (nb, nl, nk))?;
    let b3 = to_matrix_batch(b, &ib, [batch.as_slice(), inner.as_slice(), right.as_slice()], (nb, nk, nr))?;

    let mut c3 = Array3::<Complex64>::zeros((nb, nl, nr));
    for bi in 0..nb {
        let product = a3.slice(s![bi, .., ..]).dot(&b3.slice(s![bi, .., ..]));
        c3.slice_mut(s![bi, .., ..]).assign(&product);
    }

    let mut c_ix = batch;
    c_ix.extend(&left);
    c_ix.extend(&right);
    let mut c_shape = batch_dims;
    c_shape.extend(left_dims);
    c_shape.extend(right_dims);
    let c = c3.into_shape(IxDyn(&c_shape))?;

    permute_to(c, &c_ix, ic)
}

/// Permute `t` so its axes follow `groups` in order, then flatten each group.
fn to_matrix_batch(
    t: ArrayD<Complex64>,
    ix: &[usize],
    groups: [&[usize]; 3],
    shape: (usize, usize, usize),
) -> Result<Array3<Complex64>, ContractionError> {
    let order: Vec<usize> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let perm: Vec<usize> = order
        .iter()
        .map(|l| {
            ix.iter()
                .position(|x| x == l)
                .ok_or(ContractionError::UnknownOutputLabel { label: *l })
        })
        .collect::<Result<_, _>>()?;
    let permuted = t.permuted_axes(IxDyn(&perm)).as_standard_layout().into_owned();
    Ok(permuted.into_shape(shape)?)
}

/// Sum over every axis whose label fails `keep`.
fn sum_out(
    mut t: ArrayD<Complex64>,
    ix: &[usize],
    keep: impl Fn(usize) -> bool,
) -> (ArrayD<Complex64>, Vec<usize>) {
    let mut labels = ix.to_vec();
    for axis in (0..ix.len()).rev() {
        if !keep(ix[axis]) {
            t = t.sum_axis(Axis(axis));
            labels.remove(axis);
        }
    }
    (t, labels)
}

/// Sum out labels not in `iy`, then order the remaining axes as `iy`.
fn reduce_to(
    t: ArrayD<Complex64>,
    ix: &[usize],
    iy: &[usize],
) -> Result<ArrayD<Complex64>, ContractionError> {
    let (t, labels) = sum_out(t, ix, |l| iy.contains(&l));
    permute_to(t, &labels, iy)
}

fn permute_to(
    t: ArrayD<Complex64>,
    ix: &[usize],
    iy: &[usize],
) -> Result<ArrayD<Complex64>, ContractionError> {
    if ix == iy {
        return Ok(t);
    }
    let perm: Vec<usize> = iy
        .iter()
        .map(|l| {
            ix.iter()
                .position(|x| x == l)
                .ok_or(ContractionError::UnknownOutputLabel { label: *l })
        })
        .collect::<Result<_, _>>()?;
    Ok(t.permuted_axes(IxDyn(&perm)).as_standard_layout().into_owned())
}
