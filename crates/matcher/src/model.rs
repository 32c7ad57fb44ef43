use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single weighted item from the input table.
///
/// `id` is assigned by the caller and must be unique within a pool.
/// `label` is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub weight: f64,
}

impl Record {
    pub fn new(id: i64, weight: f64) -> Self {
        Self {
            id,
            label: None,
            weight,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One extracted group. `member_ids` and `member_weights` are parallel and
/// follow selection order (ascending pool position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub member_ids: Vec<i64>,
    pub member_weights: Vec<f64>,
}

impl MatchResult {
    pub(crate) fn from_members(members: &[Record]) -> Self {
        Self {
            member_ids: members.iter().map(|r| r.id).collect(),
            member_weights: members.iter().map(|r| r.weight).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

/// Everything one extraction call produced, including what was left over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    /// Groups in round order.
    pub groups: Vec<MatchResult>,
    /// Records still in the pool when the search stopped, in pool order.
    pub unmatched: Vec<Record>,
    /// Records dropped by the deviation pre-filter before the first round.
    pub filtered_out: usize,
    /// Combinations whose sum was evaluated, across all rounds.
    pub combinations_examined: u64,
}

impl ExtractionReport {
    pub fn summary(&self) -> ExtractionSummary {
        let records_matched: usize = self.groups.iter().map(MatchResult::len).sum();
        ExtractionSummary {
            groups: self.groups.len(),
            records_in: records_matched + self.unmatched.len() + self.filtered_out,
            records_matched,
            records_unmatched: self.unmatched.len(),
            filtered_out: self.filtered_out,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub groups: usize,
    pub records_in: usize,
    pub records_matched: usize,
    pub records_unmatched: usize,
    pub filtered_out: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts() {
        let report = ExtractionReport {
            groups: vec![
                MatchResult {
                    member_ids: vec![1, 2],
                    member_weights: vec![10.0, 10.0],
                },
                MatchResult {
                    member_ids: vec![3, 4],
                    member_weights: vec![12.5, 7.5],
                },
            ],
            unmatched: vec![Record::new(5, 3.0)],
            filtered_out: 2,
            combinations_examined: 9,
        };
        let s = report.summary();
        assert_eq!(s.groups, 2);
        assert_eq!(s.records_matched, 4);
        assert_eq!(s.records_unmatched, 1);
        assert_eq!(s.filtered_out, 2);
        assert_eq!(s.records_in, 7);
    }

    #[test]
    fn label_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&Record::new(7, 1.5)).unwrap();
        assert_eq!(json, r#"{"id":7,"weight":1.5}"#);
        let json = serde_json::to_string(&Record::new(7, 1.5).with_label("crate A")).unwrap();
        assert_eq!(json, r#"{"id":7,"label":"crate A","weight":1.5}"#);
    }
}
