//! Balanced partition solver.
//!
//! Minimizes the maximum deviation of any fold's per-class total from the
//! evenly-split target `total / (2K)`. Deviations are kept in integer form
//! by scaling everything by `2K`: for a fold class total `v` the scaled
//! deviation is `|v * 2K - total|`, so comparisons are exact.
//!
//! Strategy: a greedy incumbent, improved by seeded local search, then an
//! exact depth-first branch and bound with symmetry breaking. The whole run
//! is bounded by a wall-clock budget; on exhaustion the best incumbent is
//! returned and the assignment is marked as not proved optimal.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Outcome of one solver run, over documents in their original order.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Fold index per document.
    pub assignment: Vec<usize>,
    /// Max scaled deviation, see module docs.
    pub objective: i64,
    /// False when the time budget expired before the search space was
    /// exhausted.
    pub proved_optimal: bool,
}

struct Search<'a> {
    counts: &'a [(u64, u64)],
    /// Document indices ordered by descending total count (index ascending
    /// as secondary key); larger items first tightens bounds early.
    order: Vec<usize>,
    num_folds: usize,
    scale: i64,
    total: i64,
    /// Remaining per-class sums after each position of `order` (suffix sums).
    remaining_pos: Vec<i64>,
    remaining_neg: Vec<i64>,
    deadline: Instant,
    nodes: u64,
    timed_out: bool,
    best_objective: i64,
    best_assignment: Vec<usize>,
}

/// Solve the balanced partition problem.
///
/// `counts[i]` is `(positive, negative)` for document `i`. The caller
/// guarantees `num_folds >= 1`.
pub fn solve(
    counts: &[(u64, u64)],
    num_folds: usize,
    budget: Duration,
    seed: u64,
) -> Solution {
    assert!(num_folds >= 1);

    let start = Instant::now();
    let scale = 2 * num_folds as i64;
    let total: i64 = counts.iter().map(|&(p, n)| (p + n) as i64).sum();

    if counts.is_empty() {
        return Solution {
            assignment: Vec::new(),
            objective: 0,
            proved_optimal: true,
        };
    }

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by_key(|&i| (std::cmp::Reverse(counts[i].0 + counts[i].1), i));

    let mut remaining_pos = vec![0i64; counts.len() + 1];
    let mut remaining_neg = vec![0i64; counts.len() + 1];
    for pos in (0..counts.len()).rev() {
        let (p, n) = counts[order[pos]];
        remaining_pos[pos] = remaining_pos[pos + 1] + p as i64;
        remaining_neg[pos] = remaining_neg[pos + 1] + n as i64;
    }

    // Greedy incumbent, then seeded local-search refinement.
    let mut assignment = greedy(counts, &order, num_folds, scale, total);
    let mut objective = evaluate(counts, &assignment, num_folds, scale, total);
    let deadline = start + budget;
    local_search(
        counts,
        num_folds,
        scale,
        total,
        &mut assignment,
        &mut objective,
        seed,
        deadline,
    );

    let global_lb = global_lower_bound(counts, num_folds, scale, total);
    if objective <= global_lb {
        // The incumbent already meets the packing bound; no search needed.
        return Solution {
            assignment,
            objective,
            proved_optimal: true,
        };
    }

    let mut search = Search {
        counts,
        order,
        num_folds,
        scale,
        total,
        remaining_pos,
        remaining_neg,
        deadline,
        nodes: 0,
        timed_out: false,
        best_objective: objective,
        best_assignment: assignment,
    };

    let mut totals = vec![(0i64, 0i64); num_folds];
    let mut partial = vec![0usize; counts.len()];
    search.descend(0, 0, &mut totals, &mut partial, global_lb);

    if search.timed_out {
        log::warn!(
            "Fold solver budget exhausted after {} nodes; returning best incumbent (scaled deviation {})",
            search.nodes,
            search.best_objective
        );
    }

    Solution {
        assignment: search.best_assignment,
        objective: search.best_objective,
        proved_optimal: !search.timed_out,
    }
}

impl Search<'_> {
    fn descend(
        &mut self,
        position: usize,
        used_folds: usize,
        totals: &mut Vec<(i64, i64)>,
        partial: &mut Vec<usize>,
        global_lb: i64,
    ) {
        self.nodes += 1;
        if self.timed_out || (self.nodes % 4096 == 0 && Instant::now() >= self.deadline) {
            self.timed_out = true;
            return;
        }

        if position == self.order.len() {
            let objective = totals
                .iter()
                .map(|&(p, n)| {
                    let dp = (p * self.scale - self.total).abs();
                    let dn = (n * self.scale - self.total).abs();
                    dp.max(dn)
                })
                .max()
                .unwrap_or(0);
            if objective < self.best_objective {
                self.best_objective = objective;
                self.best_assignment = partial.clone();
                log::debug!("New incumbent: scaled deviation {}", objective);
            }
            return;
        }

        if self.lower_bound(position, totals).max(global_lb) >= self.best_objective {
            return;
        }

        let document = self.order[position];
        let (p, n) = self.counts[document];

        // Symmetry breaking: opening a new fold is only allowed for the
        // lowest-indexed empty one.
        let fold_limit = (used_folds + 1).min(self.num_folds);
        for fold in 0..fold_limit {
            totals[fold].0 += p as i64;
            totals[fold].1 += n as i64;
            partial[document] = fold;

            let next_used = used_folds.max(fold + 1);
            self.descend(position + 1, next_used, totals, partial, global_lb);

            totals[fold].0 -= p as i64;
            totals[fold].1 -= n as i64;

            if self.timed_out || self.best_objective <= global_lb {
                return;
            }
        }
    }

    /// Admissible bound for a partial assignment: totals only grow, so an
    /// overshoot is final, and a fold that cannot reach the target even with
    /// every remaining instance keeps at least the leftover shortfall.
    fn lower_bound(&self, position: usize, totals: &[(i64, i64)]) -> i64 {
        let rem_pos = self.remaining_pos[position] * self.scale;
        let rem_neg = self.remaining_neg[position] * self.scale;

        let mut bound = 0i64;
        for &(p, n) in totals {
            let sp = p * self.scale;
            let sn = n * self.scale;
            let dev_pos = if sp > self.total {
                sp - self.total
            } else {
                (self.total - sp - rem_pos).max(0)
            };
            let dev_neg = if sn > self.total {
                sn - self.total
            } else {
                (self.total - sn - rem_neg).max(0)
            };
            bound = bound.max(dev_pos).max(dev_neg);
        }
        bound
    }
}

/// Packing bound independent of any assignment: the largest per-class fold
/// total is at least the ceiling of the class average, the smallest at most
/// the floor.
fn global_lower_bound(counts: &[(u64, u64)], num_folds: usize, scale: i64, total: i64) -> i64 {
    let k = num_folds as i64;
    let pos: i64 = counts.iter().map(|&(p, _)| p as i64).sum();
    let neg: i64 = counts.iter().map(|&(_, n)| n as i64).sum();

    let mut bound = 0i64;
    for class_total in [pos, neg] {
        let ceil = (class_total + k - 1) / k;
        let floor = class_total / k;
        bound = bound.max(ceil * scale - total).max(total - floor * scale);
    }
    bound.max(0)
}

fn evaluate(
    counts: &[(u64, u64)],
    assignment: &[usize],
    num_folds: usize,
    scale: i64,
    total: i64,
) -> i64 {
    let mut totals = vec![(0i64, 0i64); num_folds];
    for (document, &fold) in assignment.iter().enumerate() {
        totals[fold].0 += counts[document].0 as i64;
        totals[fold].1 += counts[document].1 as i64;
    }
    totals
        .iter()
        .map(|&(p, n)| {
            (p * scale - total)
                .abs()
                .max((n * scale - total).abs())
        })
        .max()
        .unwrap_or(0)
}

/// Assign each document (largest first) to the fold where the resulting
/// class overshoot is smallest; ties go to the lowest fold index.
fn greedy(
    counts: &[(u64, u64)],
    order: &[usize],
    num_folds: usize,
    scale: i64,
    total: i64,
) -> Vec<usize> {
    let mut totals = vec![(0i64, 0i64); num_folds];
    let mut assignment = vec![0usize; counts.len()];

    for &document in order {
        let (p, n) = counts[document];
        let mut best_fold = 0;
        let mut best_cost = i64::MAX;
        for fold in 0..num_folds {
            let sp = (totals[fold].0 + p as i64) * scale;
            let sn = (totals[fold].1 + n as i64) * scale;
            let cost = (sp - total).max(sn - total).max(0)
                + (totals[fold].0 + totals[fold].1);
            if cost < best_cost {
                best_cost = cost;
                best_fold = fold;
            }
        }
        assignment[document] = best_fold;
        totals[best_fold].0 += p as i64;
        totals[best_fold].1 += n as i64;
    }

    assignment
}

/// Seeded hill climbing over single-document moves and pairwise swaps.
/// Only strict improvements are accepted, so the pass terminates on its
/// own; the deadline cuts it short on large inputs.
#[allow(clippy::too_many_arguments)]
fn local_search(
    counts: &[(u64, u64)],
    num_folds: usize,
    scale: i64,
    total: i64,
    assignment: &mut Vec<usize>,
    objective: &mut i64,
    seed: u64,
    deadline: Instant,
) {
    let n = counts.len();
    if n == 0 || num_folds == 1 {
        return;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let iterations = 5_000 + 200 * n;

    for iteration in 0..iterations {
        if *objective == 0 {
            break;
        }
        if iteration % 512 == 0 && Instant::now() >= deadline {
            break;
        }

        let document = rng.gen_range(0..n);
        if rng.gen_bool(0.5) {
            let fold = rng.gen_range(0..num_folds);
            let previous = assignment[document];
            if fold == previous {
                continue;
            }
            assignment[document] = fold;
            let candidate = evaluate(counts, assignment, num_folds, scale, total);
            if candidate < *objective {
                *objective = candidate;
            } else {
                assignment[document] = previous;
            }
        } else {
            let other = rng.gen_range(0..n);
            if assignment[document] == assignment[other] {
                continue;
            }
            assignment.swap(document, other);
            let candidate = evaluate(counts, assignment, num_folds, scale, total);
            if candidate < *objective {
                *objective = candidate;
            } else {
                assignment.swap(document, other);
            }
        }
    }
}
