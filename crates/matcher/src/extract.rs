use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::error::MatchError;
use crate::finder::{self, Search};
use crate::model::{ExtractionReport, MatchResult, Record};
use crate::normalize;

/// Extract groups until the search comes up empty. Results are in round order.
///
/// Any error discards the groups found in earlier rounds.
pub fn extract_groups(records: &[Record], config: &SearchConfig) -> Result<Vec<MatchResult>, MatchError> {
    extract_report(records, config).map(|report| report.groups)
}

/// Same as [`extract_groups`], also returning the leftover pool and search counters.
pub fn extract_report(records: &[Record], config: &SearchConfig) -> Result<ExtractionReport, MatchError> {
    config.validate()?;
    let target = config.rounded_target()?;
    let weights = finder::decimal_weights(records)?;

    let (mut pool, mut pool_weights) = deviation_prefilter(records, weights, config)?;
    let filtered_out = records.len() - pool.len();
    if filtered_out > 0 {
        debug!(filtered_out, kept = pool.len(), "deviation pre-filter applied");
    }

    let mut groups: Vec<MatchResult> = Vec::new();
    let mut combinations_examined: u64 = 0;

    loop {
        let outcome = finder::search(&pool, &pool_weights, config.group_size, target, config.precision)?;
        combinations_examined += outcome.combinations;

        let indices = match outcome.search {
            Search::Found(indices) => indices,
            Search::Exhausted => break,
        };

        let members: Vec<Record> = indices.iter().map(|&i| pool[i].clone()).collect();
        let result = MatchResult::from_members(&members);
        debug!(
            round = groups.len() + 1,
            ids = ?result.member_ids,
            remaining = pool.len() - indices.len(),
            "group extracted"
        );
        groups.push(result);

        (pool, pool_weights) = without_positions(&pool, &pool_weights, &indices);
    }

    info!(
        groups = groups.len(),
        unmatched = pool.len(),
        filtered_out,
        combinations_examined,
        "extraction finished"
    );

    Ok(ExtractionReport {
        groups,
        unmatched: pool,
        filtered_out,
        combinations_examined,
    })
}

// ---------------------------------------------------------------------------
// Deviation pre-filter
// ---------------------------------------------------------------------------

/// Keep records within `bound` of `round(target / group_size)`.
/// Returns the input unchanged when no bound is active or the group size is zero.
fn deviation_prefilter(
    records: &[Record],
    weights: Vec<Decimal>,
    config: &SearchConfig,
) -> Result<(Vec<Record>, Vec<Decimal>), MatchError> {
    let bound = match config.active_deviation_bound() {
        Some(b) if config.group_size > 0 => b,
        _ => return Ok((records.to_vec(), weights)),
    };

    let (lower, upper) = deviation_window(config, bound)?;

    Ok(records
        .iter()
        .zip(weights)
        .filter(|(_, w)| lower <= *w && *w <= upper)
        .map(|(r, w)| (r.clone(), w))
        .unzip())
}

/// Inclusive weight window `[average - bound, average + bound]`.
pub(crate) fn deviation_window(config: &SearchConfig, bound: f64) -> Result<(Decimal, Decimal), MatchError> {
    let out_of_range = || MatchError::invalid("deviation window is out of decimal range");

    let target = normalize::to_decimal(config.target_sum)
        .ok_or_else(|| MatchError::invalid(format!("target_sum {} has no decimal form", config.target_sum)))?;
    let bound = normalize::to_decimal(bound).ok_or_else(out_of_range)?;
    let average = target
        .checked_div(Decimal::from(config.group_size))
        .map(|avg| normalize::round(avg, config.precision))
        .ok_or_else(out_of_range)?;

    let lower = average.checked_sub(bound).ok_or_else(out_of_range)?;
    let upper = average.checked_add(bound).ok_or_else(out_of_range)?;
    Ok((lower, upper))
}

// ---------------------------------------------------------------------------
// Pool shrinking
// ---------------------------------------------------------------------------

/// Next round's pool: everything except `indices`, relative order kept.
fn without_positions(pool: &[Record], weights: &[Decimal], indices: &[usize]) -> (Vec<Record>, Vec<Decimal>) {
    pool.iter()
        .zip(weights)
        .enumerate()
        .filter(|(i, _)| indices.binary_search(i).is_err())
        .map(|(_, (r, w))| (r.clone(), *w))
        .unzip()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(weights: &[f64]) -> Vec<Record> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Record::new(i as i64 + 1, w))
            .collect()
    }

    #[test]
    fn single_group_leaves_rest_unmatched() {
        let records = pool(&[5.0, 5.0, 5.0, 5.0, 10.0, 10.0]);
        let report = extract_report(&records, &SearchConfig::new(4, 20.0)).unwrap();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].member_ids, vec![1, 2, 3, 4]);
        assert_eq!(report.groups[0].member_weights, vec![5.0, 5.0, 5.0, 5.0]);
        let left: Vec<i64> = report.unmatched.iter().map(|r| r.id).collect();
        assert_eq!(left, vec![5, 6]);
    }

    #[test]
    fn repeated_rounds_shrink_the_pool() {
        let records = pool(&[4.0, 6.0, 16.0, 14.0, 10.0, 10.0, 3.0]);
        let groups = extract_groups(&records, &SearchConfig::new(2, 20.0)).unwrap();
        let ids: Vec<Vec<i64>> = groups.iter().map(|g| g.member_ids.clone()).collect();
        assert_eq!(ids, vec![vec![1, 3], vec![2, 4], vec![5, 6]]);
    }

    #[test]
    fn two_disjoint_quadruples() {
        let records = pool(&[5.0, 5.0, 5.0, 5.0, 2.0, 8.0, 4.0, 6.0]);
        let groups = extract_groups(&records, &SearchConfig::new(4, 20.0)).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].member_ids, vec![1, 2, 3, 4]);
        assert_eq!(groups[1].member_ids, vec![5, 6, 7, 8]);
    }

    #[test]
    fn greedy_rounds_take_first_match() {
        // (12, 8) is taken first, then (7, 13); the second 8 is left over.
        let records = pool(&[12.0, 8.0, 7.0, 13.0, 8.0]);
        let report = extract_report(&records, &SearchConfig::new(2, 20.0)).unwrap();
        let ids: Vec<Vec<i64>> = report.groups.iter().map(|g| g.member_ids.clone()).collect();
        assert_eq!(ids, vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(report.unmatched, vec![Record::new(5, 8.0)]);
    }

    #[test]
    fn empty_and_zero_size_yield_nothing() {
        assert!(extract_groups(&[], &SearchConfig::new(4, 20.0)).unwrap().is_empty());
        let records = pool(&[5.0, 5.0, 5.0, 5.0]);
        assert!(extract_groups(&records, &SearchConfig::new(0, 20.0)).unwrap().is_empty());
        let records = pool(&[5.0, 5.0, 10.0]);
        assert!(extract_groups(&records, &SearchConfig::new(4, 20.0)).unwrap().is_empty());
    }

    #[test]
    fn deviation_filter_drops_outliers_before_search() {
        // average = 5; bound 1 keeps [4, 6]
        let records = pool(&[2.0, 8.0, 5.0, 5.0, 4.0, 6.0, 5.0, 5.0]);
        let config = SearchConfig::new(4, 20.0).with_deviation_bound(1.0);
        let report = extract_report(&records, &config).unwrap();
        assert_eq!(report.filtered_out, 2);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].member_ids, vec![3, 4, 5, 6]);
        for g in &report.groups {
            assert!(!g.member_ids.contains(&1));
            assert!(!g.member_ids.contains(&2));
        }
    }

    #[test]
    fn deviation_window_bounds_are_inclusive() {
        let records = pool(&[4.0, 6.0, 3.99, 6.01]);
        let config = SearchConfig::new(2, 10.0).with_deviation_bound(1.0);
        let report = extract_report(&records, &config).unwrap();
        assert_eq!(report.filtered_out, 2);
        assert_eq!(report.groups[0].member_ids, vec![1, 2]);
    }

    #[test]
    fn deviation_average_is_rounded() {
        // 20 / 3 = 6.666.. -> 6.67 at two digits; window [6.66, 6.68]
        let config = SearchConfig::new(3, 20.0).with_deviation_bound(0.01);
        let (lower, upper) = deviation_window(&config, 0.01).unwrap();
        assert_eq!(lower.to_string(), "6.66");
        assert_eq!(upper.to_string(), "6.68");
    }

    #[test]
    fn zero_deviation_means_no_filter() {
        let records = pool(&[2.0, 8.0, 5.0, 5.0]);
        let config = SearchConfig::new(4, 20.0).with_deviation_bound(0.0);
        let report = extract_report(&records, &config).unwrap();
        assert_eq!(report.filtered_out, 0);
        assert_eq!(report.groups.len(), 1);
    }

    #[test]
    fn unconvertible_weight_fails_up_front() {
        let mut records = pool(&[10.0, 10.0, 10.0, 10.0]);
        records.push(Record::new(50, f64::INFINITY));
        let err = extract_groups(&records, &SearchConfig::new(2, 20.0)).unwrap_err();
        assert_eq!(
            err,
            MatchError::Computation {
                record_id: 50,
                reason: "weight inf is not a finite decimal".into()
            }
        );
    }

    #[test]
    fn failure_in_later_round_discards_earlier_groups() {
        // Round 1 matches (10, 10); round 2 overflows summing the two huge weights.
        let records = pool(&[10.0, 10.0, 5e28, 5e28]);
        let err = extract_report(&records, &SearchConfig::new(2, 20.0)).unwrap_err();
        assert!(matches!(err, MatchError::Computation { record_id: 4, .. }));
    }

    #[test]
    fn invalid_config_is_reported_without_search() {
        let records = pool(&[10.0, 10.0]);
        let config = SearchConfig::new(2, 20.0).with_deviation_bound(-0.5);
        assert!(matches!(
            extract_groups(&records, &config),
            Err(MatchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn caller_pool_is_untouched() {
        let records = pool(&[10.0, 10.0, 10.0, 10.0]);
        let before = records.clone();
        let _ = extract_groups(&records, &SearchConfig::new(2, 20.0)).unwrap();
        assert_eq!(records, before);
    }

    #[test]
    fn counters_accumulate_across_rounds() {
        let records = pool(&[10.0, 10.0, 10.0, 10.0, 1.0]);
        let report = extract_report(&records, &SearchConfig::new(2, 20.0)).unwrap();
        assert_eq!(report.groups.len(), 2);
        // round 1: (0,1) hit after 1; round 2: (0,1) hit after 1; round 3: [1.0] alone -> 0 tuples
        assert_eq!(report.combinations_examined, 2);
        assert_eq!(report.unmatched, vec![Record::new(5, 1.0)]);
    }
}
