//! Configuration types and defaults
//!
//! Every threshold the engine uses lives here. The defaults are the values
//! tuned against real chat input; none of them is a contract, so hosts may
//! pass a partial JSON object and override individual fields.

use serde::{Deserialize, Serialize};

use crate::error::PiiError;

// =============================================================================
// Change Detection
// =============================================================================

/// Size gates and context-window parameters for incremental detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// With no baseline, the whole text is sent only below this size. Default: 5000
    pub initial_max_chars: usize,
    /// Floor of the incremental region limit. Default: 2000
    pub incremental_floor_chars: usize,
    /// Ceiling of the incremental region limit. Default: 10000
    pub incremental_ceiling_chars: usize,
    /// Fraction of the document an incremental region may cover. Default: 0.3
    pub incremental_ratio: f64,
    /// Hard cap on the context snippet. Default: 1500
    pub context_max_chars: usize,
    /// Adjacent paragraphs are included only below this size. Default: 500
    pub adjacent_paragraph_max_chars: usize,
    /// Minimum token length for the word heuristic. Default: 3
    pub min_word_len: usize,
    /// Base debounce delay before a smart adjustment. Default: 500.
    /// At most `MAX_BASE_DEBOUNCE_MS`.
    pub base_debounce_ms: u64,
}

/// Upper bound for `DetectionConfig::base_debounce_ms`
pub const MAX_BASE_DEBOUNCE_MS: u64 = 60_000;

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            initial_max_chars: 5000,
            incremental_floor_chars: 2000,
            incremental_ceiling_chars: 10000,
            incremental_ratio: 0.3,
            context_max_chars: 1500,
            adjacent_paragraph_max_chars: 500,
            min_word_len: 3,
            base_debounce_ms: 500,
        }
    }
}

impl DetectionConfig {
    /// Largest changed region still handled incrementally for a document of `len` chars
    pub fn max_incremental_chars(&self, len: usize) -> usize {
        let scaled = (len as f64 * self.incremental_ratio) as usize;
        self.incremental_floor_chars
            .max(self.incremental_ceiling_chars.min(scaled))
    }
}

// =============================================================================
// Typing Activity
// =============================================================================

/// Timing parameters for the typing activity monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Silence after the last edit before a pause fires. Default: 1000
    pub pause_threshold_ms: u64,
    /// A keystroke keeps the user "active" for this long. Default: 5000
    pub keystroke_window_ms: u64,
    /// Rolling window for burst detection. Default: 100
    pub burst_window_ms: u64,
    /// More than this many transactions inside the window is a burst. Default: 2
    pub burst_max_transactions: usize,
    /// Transaction timestamps older than this are dropped. Default: 500
    pub transaction_retention_ms: u64,
    /// Length delta (chars) that alone makes a pause significant. Default: 5
    pub significant_length_delta: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            pause_threshold_ms: 1000,
            keystroke_window_ms: 5000,
            burst_window_ms: 100,
            burst_max_transactions: 2,
            transaction_retention_ms: 500,
            significant_length_delta: 5,
        }
    }
}

// =============================================================================
// Cache
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries per bounded container. Default: 10
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

// =============================================================================
// Labels
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Characters stripped from both ends of a label before comparison
    pub trim_chars: String,
    /// Compare labels case-insensitively. Default: true
    pub case_insensitive: bool,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            trim_chars: " \t\r\n.,;:!?\"'`()[]{}<>-_*#".to_string(),
            case_insensitive: true,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PiiConfig {
    pub detection: DetectionConfig,
    pub activity: ActivityConfig,
    pub cache: CacheConfig,
    pub labels: LabelConfig,
}

impl PiiConfig {
    /// Production configuration
    pub fn production() -> Self {
        Self::default()
    }

    /// Faster pauses and debounces for short chat inputs
    pub fn responsive() -> Self {
        Self {
            detection: DetectionConfig {
                base_debounce_ms: 300,
                ..DetectionConfig::default()
            },
            activity: ActivityConfig {
                pause_threshold_ms: 600,
                ..ActivityConfig::default()
            },
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, PiiError> {
        let config: PiiConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PiiError> {
        if self.cache.capacity == 0 {
            return Err(PiiError::InvalidConfig("cache.capacity must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.detection.incremental_ratio) {
            return Err(PiiError::InvalidConfig(
                "detection.incremental_ratio must be within [0, 1]".into(),
            ));
        }
        if self.detection.incremental_floor_chars > self.detection.incremental_ceiling_chars {
            return Err(PiiError::InvalidConfig(
                "detection.incremental_floor_chars exceeds incremental_ceiling_chars".into(),
            ));
        }
        if self.detection.context_max_chars == 0 {
            return Err(PiiError::InvalidConfig("detection.context_max_chars must be > 0".into()));
        }
        if self.detection.base_debounce_ms > MAX_BASE_DEBOUNCE_MS {
            return Err(PiiError::InvalidConfig(format!(
                "detection.base_debounce_ms must be <= {}",
                MAX_BASE_DEBOUNCE_MS
            )));
        }
        if self.activity.burst_window_ms > self.activity.transaction_retention_ms {
            return Err(PiiError::InvalidConfig(
                "activity.burst_window_ms exceeds transaction_retention_ms".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(PiiConfig::default().validate().is_ok());
        assert!(PiiConfig::responsive().validate().is_ok());
    }

    #[test]
    fn test_max_incremental_chars_bounds() {
        let config = DetectionConfig::default();
        // Small docs use the floor
        assert_eq!(config.max_incremental_chars(100), 2000);
        // 30% of 20k = 6000
        assert_eq!(config.max_incremental_chars(20_000), 6000);
        // Capped at 10k
        assert_eq!(config.max_incremental_chars(1_000_000), 10_000);
    }

    #[test]
    fn test_partial_json_config() {
        let config = PiiConfig::from_json(r#"{ "activity": { "pause_threshold_ms": 750 } }"#).unwrap();
        assert_eq!(config.activity.pause_threshold_ms, 750);
        assert_eq!(config.activity.keystroke_window_ms, 5000);
        assert_eq!(config.cache.capacity, 10);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = PiiConfig::from_json(r#"{ "cache": { "capacity": 0 } }"#).unwrap_err();
        assert!(matches!(err, PiiError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_huge_base_debounce() {
        let err = PiiConfig::from_json(r#"{ "detection": { "base_debounce_ms": 18446744073709551615 } }"#)
            .unwrap_err();
        assert!(matches!(err, PiiError::InvalidConfig(_)));

        let at_bound = format!(r#"{{ "detection": {{ "base_debounce_ms": {} }} }}"#, MAX_BASE_DEBOUNCE_MS);
        assert!(PiiConfig::from_json(&at_bound).is_ok());
    }
}
