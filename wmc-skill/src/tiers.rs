//! Confidence tier assignment

use wmc_common::config::TierConfig;
use wmc_common::ConfidenceTier;

/// Maps a resolver score to the tier reported to the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierPolicy {
    multi_key_threshold: f64,
    multi_key_threshold_client_named: f64,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::from_config(&TierConfig::default())
    }
}

impl TierPolicy {
    pub fn from_config(config: &TierConfig) -> Self {
        Self {
            multi_key_threshold: config.multi_key_threshold,
            multi_key_threshold_client_named: config.multi_key_threshold_client_named,
        }
    }

    /// Tier of a resolved request
    ///
    /// Naming the client explicitly always makes the match EXACT.
    pub fn assign(&self, score: f64, client_specified: bool) -> ConfidenceTier {
        if client_specified {
            return ConfidenceTier::Exact;
        }
        self.score_tier(score, client_specified)
    }

    /// Tier from the score alone
    pub fn score_tier(&self, score: f64, client_specified: bool) -> ConfidenceTier {
        let threshold = if client_specified {
            self.multi_key_threshold_client_named
        } else {
            self.multi_key_threshold
        };

        if score >= 1.0 {
            ConfidenceTier::Exact
        } else if score > threshold {
            ConfidenceTier::MultiKey
        } else {
            ConfidenceTier::Title
        }
    }
}
