//! Dynamic-programming table solver.
//!
//! Computes, for every memory budget `0..=mmax` and every contiguous
//! stage range `i..=j`, the minimal total execution time and the
//! optimal decision: either persist the next activation and recurse
//! (a *chain* checkpoint) or pick a rematerialisation boundary `k`,
//! recompute forward to it, and split the problem there (a *leaf*
//! checkpoint).
//!
//! The fill is bottom-up over increasing range width `d = j - i`;
//! every sub-problem a cell references has strictly smaller width, so
//! one pass resolves the whole table. Within a width the memory axis
//! is independent, which the `parallel` feature exploits by mapping
//! over `m` with rayon and writing the gathered cells back serially.

use num_traits::Float;
use remat_core::Chain;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Optimal decision recorded for one table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decision {
    /// Persist the range's first activation and recurse on the rest.
    Chain,
    /// Leaf checkpoint: recompute forward to the boundary stage and
    /// split the range there.
    Leaf(usize),
}

/// The `opt`/`what` table pair for one `(Chain, mmax)` solve.
///
/// Dense flat storage of size `(mmax + 1) * (L + 1)^2`, indexed by
/// closed-form offsets. Built once by [`compute_tables`]; read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct DpTables<T> {
    mmax: usize,
    points: usize,
    opt: Vec<T>,
    what: Vec<Option<Decision>>,
}

impl<T: Float> DpTables<T> {
    /// Largest memory budget covered by the table.
    pub fn mmax(&self) -> usize {
        self.mmax
    }

    /// Number of chain points (`L + 1`).
    pub fn points(&self) -> usize {
        self.points
    }

    /// Minimal total time for stages `i..=j` with `m` memory units;
    /// infinity when infeasible.
    pub fn opt(&self, m: usize, i: usize, j: usize) -> T {
        self.opt[self.at(m, i, j)]
    }

    /// Decision recorded for stages `i..=j` with `m` memory units.
    ///
    /// `None` for base cells (`i == j`), for ranges below their
    /// feasibility floor, and for coordinates never filled.
    pub fn what(&self, m: usize, i: usize, j: usize) -> Option<Decision> {
        self.what[self.at(m, i, j)]
    }

    /// Whether the cell holds a finite schedule time.
    pub fn is_feasible(&self, m: usize, i: usize, j: usize) -> bool {
        self.opt(m, i, j).is_finite()
    }

    fn at(&self, m: usize, i: usize, j: usize) -> usize {
        (m * self.points + i) * self.points + j
    }
}

/// Compute the optimal table pair for a chain and a memory budget.
///
/// Pure function of its inputs: the same `(chain, mmax)` always
/// produces the same tables, so independent chains may be solved
/// concurrently without coordination.
pub fn compute_tables<T>(chain: &Chain<T>, mmax: usize) -> DpTables<T>
where
    T: Float + Send + Sync,
{
    let len = chain.length();
    let points = len + 1;
    let cells = (mmax + 1) * points * points;
    let mut tables = DpTables {
        mmax,
        points,
        opt: vec![T::infinity(); cells],
        what: vec![None; cells],
    };

    // Base cells (i == j): one forward plus one backward, feasible iff
    // the held activation and either transient fit.
    for m in 0..=mmax {
        for i in 0..=len {
            let hold = chain.x_size(i + 1) + chain.xbar_size(i + 1);
            let limit = (hold + chain.tmp_fwd(i)).max(hold + chain.tmp_bwd(i));
            if m >= limit {
                let idx = tables.at(m, i, i);
                tables.opt[idx] = chain.fwd_time(i) + chain.bwd_time(i);
            }
        }
    }

    // Widen ranges; all references inside a width-d cell hit strictly
    // smaller widths, so cells of one width can fill in any order.
    for d in 1..=len {
        for (m, row) in solve_width(chain, &tables, d) {
            for (i, value, decision) in row {
                let idx = tables.at(m, i, i + d);
                tables.opt[idx] = value;
                tables.what[idx] = decision;
            }
        }
    }

    tables
}

type WidthRow<T> = Vec<(usize, T, Option<Decision>)>;

/// Solve every cell of one range width, one row per memory budget.
fn solve_width<T>(chain: &Chain<T>, tables: &DpTables<T>, d: usize) -> Vec<(usize, WidthRow<T>)>
where
    T: Float + Send + Sync,
{
    let row = |m: usize| -> WidthRow<T> {
        (0..=(chain.length() - d))
            .map(|i| {
                let (value, decision) = solve_cell(chain, tables, m, i, d);
                (i, value, decision)
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    {
        (0..=tables.mmax)
            .into_par_iter()
            .map(|m| (m, row(m)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..=tables.mmax).map(|m| (m, row(m))).collect()
    }
}

/// Solve a single `(m, i, j = i + d)` cell from smaller-width cells.
fn solve_cell<T>(
    chain: &Chain<T>,
    tables: &DpTables<T>,
    m: usize,
    i: usize,
    d: usize,
) -> (T, Option<Decision>)
where
    T: Float,
{
    let j = i + d;

    // Feasibility floor: both endpoints live while forward-sweeping
    // the range, raised by the hungriest interior stage when d > 1.
    let mut mmin = chain.x_size(j + 1) + chain.x_size(i + 1) + chain.tmp_fwd(i);
    if d > 1 {
        let interior = (i + 1..j)
            .map(|k| chain.x_size(k) + chain.x_size(k + 1) + chain.tmp_fwd(k))
            .max()
            .unwrap_or(0);
        mmin = mmin.max(chain.x_size(j + 1) + interior);
    }
    if m < mmin {
        return (T::infinity(), None);
    }

    // Leaf option: recompute forward through i..k-1, persist stage k's
    // checkpoint, solve the suffix at reduced memory and the prefix at
    // full memory. First minimum wins, so equal-cost boundaries
    // resolve to the smallest k.
    let mut recompute = T::zero();
    let mut best_leaf: Option<(usize, T)> = None;
    for k in (i + 1)..=j {
        recompute = recompute + chain.fwd_time(k - 1);
        if m < chain.x_size(k) {
            continue;
        }
        let total = recompute
            + tables.opt(m - chain.x_size(k), k, j)
            + tables.opt(m, i, k - 1);
        match best_leaf {
            Some((_, best)) if total >= best => {}
            _ => best_leaf = Some((k, total)),
        }
    }

    // Chain option: persist stage i+1's activation for the whole
    // sub-solve and recurse at reduced memory.
    let hold = chain.xbar_size(i + 1);
    let chain_ckpt = if m >= hold {
        tables.opt(m, i, i) + tables.opt(m - hold, i + 1, j)
    } else {
        T::infinity()
    };

    // Ties favour the leaf option.
    match best_leaf {
        Some((k, total)) if total <= chain_ckpt => (total, Some(Decision::Leaf(k))),
        _ => (chain_ckpt, Some(Decision::Chain)),
    }
}
