use rust_decimal::Decimal;
use tracing::trace;

use crate::config::SearchConfig;
use crate::error::MatchError;
use crate::model::Record;
use crate::normalize::{self, equal_after_rounding};

/// A group whose rounded weight sum hits the target.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundGroup {
    /// Matched records in selection order.
    pub members: Vec<Record>,
    /// Pool positions of `members`, strictly increasing.
    pub indices: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Find the first `group_size` combination of `pool` (lexicographic over
/// positions) whose weights round to the target.
///
/// `Ok(None)` when no combination matches, including an empty pool, a zero
/// group size, or a pool shorter than the group size.
pub fn find_group(pool: &[Record], config: &SearchConfig) -> Result<Option<FoundGroup>, MatchError> {
    config.validate()?;
    let target = config.rounded_target()?;
    let weights = decimal_weights(pool)?;

    let outcome = search(pool, &weights, config.group_size, target, config.precision)?;
    Ok(match outcome.search {
        Search::Found(indices) => Some(FoundGroup {
            members: indices.iter().map(|&i| pool[i].clone()).collect(),
            indices,
        }),
        Search::Exhausted => None,
    })
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Search {
    Found(Vec<usize>),
    Exhausted,
}

#[derive(Debug)]
pub(crate) struct SearchOutcome {
    pub search: Search,
    /// Complete tuples whose sum was compared against the target.
    pub combinations: u64,
}

/// Convert every weight up front so the first bad record fails the call
/// regardless of where the search would have stopped.
pub(crate) fn decimal_weights(pool: &[Record]) -> Result<Vec<Decimal>, MatchError> {
    pool.iter()
        .map(|r| {
            normalize::to_decimal(r.weight).ok_or_else(|| {
                MatchError::computation(r.id, format!("weight {} is not a finite decimal", r.weight))
            })
        })
        .collect()
}

pub(crate) fn search(
    pool: &[Record],
    weights: &[Decimal],
    group_size: usize,
    target: Decimal,
    precision: u32,
) -> Result<SearchOutcome, MatchError> {
    debug_assert_eq!(pool.len(), weights.len());

    if group_size == 0 || weights.len() < group_size {
        return Ok(SearchOutcome {
            search: Search::Exhausted,
            combinations: 0,
        });
    }

    let mut walk = Walk {
        pool,
        weights,
        group_size,
        target,
        precision,
        selection: Vec::with_capacity(group_size),
        combinations: 0,
    };
    let search = walk.descend(0, 0, Decimal::ZERO)?;

    trace!(
        pool = weights.len(),
        group_size,
        combinations = walk.combinations,
        found = matches!(search, Search::Found(_)),
        "combination search finished"
    );

    Ok(SearchOutcome {
        search,
        combinations: walk.combinations,
    })
}

/// Backtracking state for one search. Depth is `selection.len()`.
struct Walk<'a> {
    pool: &'a [Record],
    weights: &'a [Decimal],
    group_size: usize,
    target: Decimal,
    precision: u32,
    selection: Vec<usize>,
    combinations: u64,
}

impl Walk<'_> {
    /// Try every position in `[start, len - slots_after)` at `depth`, where
    /// `slots_after` positions must remain for the deeper levels.
    fn descend(&mut self, depth: usize, start: usize, partial: Decimal) -> Result<Search, MatchError> {
        let slots_after = self.group_size - 1 - depth;
        let end = self.weights.len() - slots_after;

        for i in start..end {
            let sum = partial.checked_add(self.weights[i]).ok_or_else(|| {
                MatchError::computation(self.pool[i].id, "weight sum overflows decimal range")
            })?;
            self.selection.push(i);

            if slots_after == 0 {
                self.combinations += 1;
                if equal_after_rounding(sum, self.target, self.precision) {
                    return Ok(Search::Found(self.selection.clone()));
                }
            } else if let Search::Found(indices) = self.descend(depth + 1, i + 1, sum)? {
                return Ok(Search::Found(indices));
            }

            self.selection.pop();
        }

        Ok(Search::Exhausted)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
