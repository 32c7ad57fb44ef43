use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::normalize::{self, MAX_PRECISION};

pub const DEFAULT_GROUP_SIZE: usize = 4;
pub const DEFAULT_TARGET_SUM: f64 = 20.0;
pub const DEFAULT_PRECISION: u32 = 2;

// ---------------------------------------------------------------------------
// Validated search parameters
// ---------------------------------------------------------------------------

/// Parameters for one extraction call.
///
/// A `group_size` of zero is accepted and simply finds nothing.
/// `deviation_bound` of `None` or `Some(0.0)` disables the pre-filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchConfig {
    pub group_size: usize,
    pub target_sum: f64,
    pub precision: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation_bound: Option<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            target_sum: DEFAULT_TARGET_SUM,
            precision: DEFAULT_PRECISION,
            deviation_bound: None,
        }
    }
}

impl SearchConfig {
    pub fn new(group_size: usize, target_sum: f64) -> Self {
        Self {
            group_size,
            target_sum,
            ..Self::default()
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_deviation_bound(mut self, bound: f64) -> Self {
        self.deviation_bound = Some(bound);
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.precision > MAX_PRECISION {
            return Err(MatchError::invalid(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }

        if !self.target_sum.is_finite() {
            return Err(MatchError::invalid(format!(
                "target_sum must be finite, got {}",
                self.target_sum
            )));
        }
        if normalize::to_decimal(self.target_sum).is_none() {
            return Err(MatchError::invalid(format!(
                "target_sum {} is out of decimal range",
                self.target_sum
            )));
        }

        if let Some(bound) = self.deviation_bound {
            if !bound.is_finite() {
                return Err(MatchError::invalid(format!(
                    "deviation_bound must be finite, got {bound}"
                )));
            }
            if bound < 0.0 {
                return Err(MatchError::invalid(format!(
                    "deviation_bound must be non-negative, got {bound}"
                )));
            }
            if normalize::to_decimal(bound).is_none() {
                return Err(MatchError::invalid(format!(
                    "deviation_bound {bound} is out of decimal range"
                )));
            }
        }

        Ok(())
    }

    /// Target rounded to the configured precision.
    pub fn rounded_target(&self) -> Result<Decimal, MatchError> {
        normalize::round_f64(self.target_sum, self.precision).ok_or_else(|| {
            MatchError::invalid(format!("target_sum {} has no decimal form", self.target_sum))
        })
    }

    /// The active deviation bound, if the pre-filter applies.
    pub fn active_deviation_bound(&self) -> Option<f64> {
        self.deviation_bound.filter(|&d| d != 0.0)
    }
}

// ---------------------------------------------------------------------------
// Raw settings (as written in a job file)
// ---------------------------------------------------------------------------

/// Search parameters as they appear in TOML. Signed fields so that negative
/// input is reported as a configuration error instead of a parse error.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSettings {
    #[serde(default = "default_group_size")]
    pub group_size: i64,
    #[serde(default = "default_target_sum")]
    pub target_sum: f64,
    #[serde(default = "default_precision")]
    pub precision: i64,
    #[serde(default)]
    pub deviation_bound: Option<f64>,
}

fn default_group_size() -> i64 {
    DEFAULT_GROUP_SIZE as i64
}

fn default_target_sum() -> f64 {
    DEFAULT_TARGET_SUM
}

fn default_precision() -> i64 {
    DEFAULT_PRECISION as i64
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            target_sum: default_target_sum(),
            precision: default_precision(),
            deviation_bound: None,
        }
    }
}

impl TryFrom<&SearchSettings> for SearchConfig {
    type Error = MatchError;

    fn try_from(s: &SearchSettings) -> Result<Self, Self::Error> {
        let group_size = usize::try_from(s.group_size).map_err(|_| {
            MatchError::invalid(format!("group_size must be non-negative, got {}", s.group_size))
        })?;
        let precision = u32::try_from(s.precision).map_err(|_| {
            MatchError::invalid(format!("precision must be non-negative, got {}", s.precision))
        })?;

        let config = SearchConfig {
            group_size,
            target_sum: s.target_sum,
            precision,
            deviation_bound: s.deviation_bound,
        };
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<SearchSettings> for SearchConfig {
    type Error = MatchError;

    fn try_from(s: SearchSettings) -> Result<Self, Self::Error> {
        SearchConfig::try_from(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn default_search_is_four_to_twenty() {
        let c = SearchConfig::default();
        assert_eq!(c.group_size, 4);
        assert_eq!(c.target_sum, 20.0);
        assert_eq!(c.precision, 2);
        assert!(c.deviation_bound.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_non_finite_target() {
        let err = SearchConfig::new(4, f64::NAN).validate().unwrap_err();
        assert!(matches!(err, MatchError::InvalidConfiguration(_)));
        let err = SearchConfig::new(4, f64::INFINITY).validate().unwrap_err();
        assert!(err.to_string().contains("target_sum"));
    }

    #[test]
    fn rejects_bad_deviation_bound() {
        let c = SearchConfig::default().with_deviation_bound(-1.0);
        assert!(c.validate().unwrap_err().to_string().contains("non-negative"));
        let c = SearchConfig::default().with_deviation_bound(f64::NAN);
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_precision_beyond_decimal_scale() {
        let c = SearchConfig::default().with_precision(29);
        assert!(c.validate().is_err());
        let c = SearchConfig::default().with_precision(28);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_group_size_is_valid() {
        assert!(SearchConfig::new(0, 20.0).validate().is_ok());
    }

    #[test]
    fn zero_deviation_disables_filter() {
        let c = SearchConfig::default().with_deviation_bound(0.0);
        assert_eq!(c.active_deviation_bound(), None);
        let c = SearchConfig::default().with_deviation_bound(0.5);
        assert_eq!(c.active_deviation_bound(), Some(0.5));
    }

    #[test]
    fn rounded_target_uses_precision() {
        let c = SearchConfig::new(3, 19.996);
        assert_eq!(c.rounded_target().unwrap(), Decimal::from_str("20.00").unwrap());
    }

    #[test]
    fn settings_from_toml() {
        let s: SearchSettings = toml::from_str(
            r#"
group_size = 3
target_sum = 15
deviation_bound = 1.25
"#,
        )
        .unwrap();
        assert_eq!(s.precision, 2);
        let c = SearchConfig::try_from(&s).unwrap();
        assert_eq!(c.group_size, 3);
        assert_eq!(c.target_sum, 15.0);
        assert_eq!(c.deviation_bound, Some(1.25));
    }

    #[test]
    fn settings_reject_negative_values() {
        let s = SearchSettings {
            group_size: -1,
            ..SearchSettings::default()
        };
        let err = SearchConfig::try_from(&s).unwrap_err();
        assert!(err.to_string().contains("group_size"));

        let s = SearchSettings {
            precision: -2,
            ..SearchSettings::default()
        };
        let err = SearchConfig::try_from(&s).unwrap_err();
        assert!(err.to_string().contains("precision"));
    }

    #[test]
    fn settings_reject_unknown_keys() {
        let parsed: Result<SearchSettings, _> = toml::from_str("group_sise = 3\n");
        assert!(parsed.is_err());
    }
}
