//! Balanced cross-validation folds at document level, lifted to row level.

pub mod solver;

use std::time::Duration;

use serde::Serialize;

use crate::config::FoldConfig;
use crate::error::{LexfoldError, Result};

/// Document-level fold assignment: `K` disjoint boolean masks whose union
/// covers every document exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct FoldAssignment {
    pub masks: Vec<Vec<bool>>,
    /// Achieved max deviation of any fold's class total from the target
    /// `total / (2K)`, in instances.
    pub objective: f64,
    /// False when the solver hit its time budget before proving optimality.
    pub proved_optimal: bool,
}

impl FoldAssignment {
    pub fn num_folds(&self) -> usize {
        self.masks.len()
    }

    pub fn num_documents(&self) -> usize {
        self.masks.first().map(Vec::len).unwrap_or(0)
    }

    /// The fold holding the given document.
    pub fn fold_of(&self, document: usize) -> Option<usize> {
        self.masks.iter().position(|mask| mask[document])
    }
}

/// Partition documents into `num_folds` balanced folds.
///
/// `counts[i]` is the (positive, negative) instance count of document `i`.
/// The partition constraint is always satisfiable; malformed arguments are
/// rejected up front instead of being handed to the optimizer. Budget
/// exhaustion is not an error: the best feasible incumbent comes back with
/// `proved_optimal = false`.
pub fn compute_folds(counts: &[(u64, u64)], config: &FoldConfig) -> Result<FoldAssignment> {
    if config.num_folds == 0 {
        return Err(LexfoldError::InvalidInput(
            "num_folds must be at least 1".to_string(),
        ));
    }

    let solution = solver::solve(
        counts,
        config.num_folds,
        Duration::from_secs(config.time_budget_secs),
        config.seed,
    );

    let mut masks = vec![vec![false; counts.len()]; config.num_folds];
    for (document, &fold) in solution.assignment.iter().enumerate() {
        masks[fold][document] = true;
    }

    // Scaled deviation back to instance units.
    let objective = solution.objective as f64 / (2 * config.num_folds) as f64;
    log::info!(
        "Fold partition: {} folds over {} documents, max deviation {:.3}{}",
        config.num_folds,
        counts.len(),
        objective,
        if solution.proved_optimal {
            ""
        } else {
            " (not proved optimal)"
        }
    );

    Ok(FoldAssignment {
        masks,
        objective,
        proved_optimal: solution.proved_optimal,
    })
}

/// Lift document-level fold masks to row-level masks: a row belongs to the
/// fold of its owning document.
pub fn expand_to_rows(masks: &[Vec<bool>], row_documents: &[usize]) -> Vec<Vec<bool>> {
    masks
        .iter()
        .map(|mask| {
            row_documents
                .iter()
                .map(|&document| mask[document])
                .collect()
        })
        .collect()
}

/// Train/test index pairs, one per fold: test = the fold's rows, train =
/// every other fold's rows. Each pair is disjoint and together covers the
/// full row range.
pub fn splits(row_masks: &[Vec<bool>]) -> Vec<(Vec<usize>, Vec<usize>)> {
    row_masks
        .iter()
        .map(|test_mask| {
            let mut train = Vec::new();
            let mut test = Vec::new();
            for (row, &in_fold) in test_mask.iter().enumerate() {
                if in_fold {
                    test.push(row);
                } else {
                    train.push(row);
                }
            }
            (train, test)
        })
        .collect()
}
