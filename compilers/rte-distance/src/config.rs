use core::fmt;
use core::str::FromStr;

use rte_protocol::TransformationKinds;
use serde::{Deserialize, Serialize};

use crate::DistanceError;

/// Costs of the elementary edits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub match_weight: f64,
    pub delete_weight: f64,
    pub insert_weight: f64,
    pub substitute_weight: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            match_weight: 0.0,
            delete_weight: 1.0,
            insert_weight: 1.0,
            substitute_weight: 1.0,
        }
    }
}

/// How alignment judgments take part in the distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    /// A replace judged as local entailment costs the match weight, so the
    /// aligner can lower the distance itself.
    #[default]
    Cost,
    /// Only lexically identical tokens (same relation, same lemma) cost the
    /// match weight. Alignment merely relabels the operations afterwards.
    Labels,
}

impl AlignmentMode {
    pub const ALL: [AlignmentMode; 2] = [AlignmentMode::Cost, AlignmentMode::Labels];

    pub fn key(self) -> &'static str {
        match self {
            AlignmentMode::Cost => "cost",
            AlignmentMode::Labels => "labels",
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AlignmentMode {
    type Err = DistanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DistanceError::UnknownMode(s.to_string()))
    }
}

/// Everything that parameterises one distance component. Read-only once the
/// component is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    pub weights: Weights,
    pub alignment_mode: AlignmentMode,
    /// Pairs with a larger tree on either side are refused.
    pub max_nodes: Option<usize>,
    /// Transformation categories that become features.
    pub enabled: TransformationKinds,
    /// Strip punctuation leaves from both sentences while they are read.
    /// Applied by the CoNLL-X front end (`rte_conllx::remove_punctuation`);
    /// `FixedWeightEditDistance::calculate` measures the fragments it is
    /// given as they are.
    pub remove_punctuation: bool,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            alignment_mode: AlignmentMode::default(),
            max_nodes: None,
            enabled: TransformationKinds::all(),
            remove_punctuation: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_registry() {
        assert_eq!("cost".parse::<AlignmentMode>(), Ok(AlignmentMode::Cost));
        assert_eq!(" Labels ".parse::<AlignmentMode>(), Ok(AlignmentMode::Labels));
        assert_eq!(
            "reflection".parse::<AlignmentMode>(),
            Err(DistanceError::UnknownMode("reflection".to_string()))
        );
        for mode in AlignmentMode::ALL {
            assert_eq!(mode.to_string().parse::<AlignmentMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: DistanceConfig = serde_json::from_str(
            r#"{ "alignment_mode": "labels", "weights": { "substitute_weight": 2.0 }, "max_nodes": 200 }"#,
        )
        .unwrap();

        assert_eq!(config.alignment_mode, AlignmentMode::Labels);
        assert_eq!(config.weights.substitute_weight, 2.0);
        assert_eq!(config.weights.insert_weight, 1.0);
        assert_eq!(config.max_nodes, Some(200));
        assert_eq!(config.enabled, TransformationKinds::all());
        assert!(!config.remove_punctuation);
    }

    #[test]
    fn test_enabled_kinds_from_json() {
        let config: DistanceConfig =
            serde_json::from_str(r#"{ "enabled": "MATCH | INSERTION" }"#).unwrap();
        assert_eq!(
            config.enabled,
            TransformationKinds::MATCH | TransformationKinds::INSERTION
        );
    }
}
