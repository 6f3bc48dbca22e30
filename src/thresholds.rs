use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("adapter sequence must not be empty")]
    EmptyPrimer,
}

/// Acceptance thresholds for every candidate overlap length, precomputed
/// from the configured fractions.
///
/// Built once at startup and only read afterwards. Lookups for lengths
/// beyond the table bound clamp to the last entry.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    min_match: Vec<u16>,
    max_mismatch: Vec<u16>,
}

impl ThresholdTable {
    pub fn new(
        min_match_frac: f64,
        max_mismatch_frac: f64,
        max_len: usize,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&min_match_frac) {
            return Err(ConfigError::FractionOutOfRange {
                name: "minimum match fraction",
                value: min_match_frac,
            });
        }
        if !(0.0..=1.0).contains(&max_mismatch_frac) {
            return Err(ConfigError::FractionOutOfRange {
                name: "maximum mismatch fraction",
                value: max_mismatch_frac,
            });
        }
        let min_match = (0..=max_len)
            .map(|len| (len as f64 * min_match_frac).ceil() as u16)
            .collect();
        let max_mismatch = (0..=max_len)
            .map(|len| (len as f64 * max_mismatch_frac).floor() as u16)
            .collect();
        Ok(ThresholdTable {
            min_match,
            max_mismatch,
        })
    }

    pub fn min_match(&self, len: usize) -> u16 {
        self.min_match[len.min(self.min_match.len() - 1)]
    }

    pub fn max_mismatch(&self, len: usize) -> u16 {
        self.max_mismatch[len.min(self.max_mismatch.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_are_bounded_by_length() {
        let table = ThresholdTable::new(0.75, 0.125, 200).unwrap();
        for len in 0..=200 {
            assert!(table.min_match(len) <= len as u16);
            assert!(table.max_mismatch(len) <= len as u16);
        }
    }

    #[test]
    fn test_rounding() {
        let table = ThresholdTable::new(0.5, 0.1, 64).unwrap();
        // ceil for the match minimum, floor for the mismatch maximum
        assert_eq!(table.min_match(9), 5);
        assert_eq!(table.max_mismatch(9), 0);
        assert_eq!(table.min_match(10), 5);
        assert_eq!(table.max_mismatch(10), 1);
        assert_eq!(table.min_match(0), 0);
        assert_eq!(table.max_mismatch(0), 0);
    }

    #[test]
    fn test_lookup_clamps_to_table_bound() {
        let table = ThresholdTable::new(0.5, 0.1, 16).unwrap();
        assert_eq!(table.min_match(1000), table.min_match(16));
        assert_eq!(table.max_mismatch(1000), table.max_mismatch(16));
    }

    #[test]
    fn test_invalid_fractions_are_rejected() {
        assert!(ThresholdTable::new(1.5, 0.1, 16).is_err());
        assert!(ThresholdTable::new(0.5, -0.1, 16).is_err());
    }
}
