use std::collections::{BTreeSet, HashMap};

use rte_protocol::TransformationKinds;
use serde::{Deserialize, Serialize};

use crate::calculator::DistanceResult;

/// Placeholder feature set on examples with no known feature, so that no
/// instance is empty.
pub const FAKE_ATTRIBUTE: &str = "fake_attribute";

/// Dense numbering of rendered transformations.
///
/// Id 0 is always [`FAKE_ATTRIBUTE`]. New names get the next free id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureIndex {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl FeatureIndex {
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    pub fn id(&self, name: &str) -> Option<usize> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of ids, the placeholder included.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }

    /// Adds a name if it is new and returns its id.
    pub fn insert(&mut self, name: &str) -> usize {
        if let Some(id) = self.id(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Registers every enabled feature of a training pair. Returns how many
    /// were new.
    pub fn observe(&mut self, result: &DistanceResult, enabled: TransformationKinds) -> usize {
        let before = self.len();
        for feature in result.features(enabled) {
            self.insert(&feature);
        }
        self.len() - before
    }

    /// Sorted ids of the known features of a pair; unknown ones are dropped.
    /// A pair with none maps to the placeholder alone.
    pub fn encode(&self, result: &DistanceResult, enabled: TransformationKinds) -> Vec<usize> {
        let ids: BTreeSet<usize> = result
            .features(enabled)
            .iter()
            .filter_map(|feature| self.id(feature))
            .collect();
        if ids.is_empty() {
            return vec![0];
        }
        ids.into_iter().collect()
    }
}

impl Default for FeatureIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<String>> for FeatureIndex {
    /// The placeholder is put first if the list does not start with it;
    /// later duplicates are ignored.
    fn from(names: Vec<String>) -> Self {
        let mut index = Self {
            names: vec![FAKE_ATTRIBUTE.to_string()],
            ids: HashMap::from([(FAKE_ATTRIBUTE.to_string(), 0)]),
        };
        for name in &names {
            index.insert(name);
        }
        index
    }
}

impl From<FeatureIndex> for Vec<String> {
    fn from(index: FeatureIndex) -> Self {
        index.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transformation;
    use pretty_assertions::assert_eq;
    use rte_protocol::Token;

    fn result(transformations: Vec<Transformation>) -> DistanceResult {
        DistanceResult {
            raw: 0.0,
            normalized: 0.0,
            transformations,
        }
    }

    fn deletion(path: &str) -> Transformation {
        Transformation::Deletion {
            t: Token::new(0, "x", "x", "NN", None, "dep").with_deprel_path(path),
        }
    }

    #[test]
    fn test_placeholder_is_zero() {
        let index = FeatureIndex::new();
        assert_eq!(index.len(), 1);
        assert_eq!(index.id(FAKE_ATTRIBUTE), Some(0));
        assert_eq!(index.name(0), Some(FAKE_ATTRIBUTE));
    }

    #[test]
    fn test_observe_then_encode() {
        let mut index = FeatureIndex::new();
        let train = result(vec![deletion("punct#ROOT"), deletion("det#ROOT"), deletion("punct#ROOT")]);

        assert_eq!(index.observe(&train, TransformationKinds::all()), 2);
        assert_eq!(index.observe(&train, TransformationKinds::all()), 0);
        assert_eq!(index.id("Type:del#T_DPrelR:punct#ROOT"), Some(1));
        assert_eq!(index.id("Type:del#T_DPrelR:det#ROOT"), Some(2));

        let test = result(vec![deletion("det#ROOT"), deletion("amod#ROOT"), deletion("punct#ROOT")]);
        assert_eq!(index.encode(&test, TransformationKinds::all()), vec![1, 2]);
        assert_eq!(index.encode(&test, TransformationKinds::MATCH), vec![0]);
    }

    #[test]
    fn test_persisted_as_name_list() {
        let mut index = FeatureIndex::new();
        index.insert("Type:ins#H_DPrelR:neg#ROOT");

        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"["fake_attribute","Type:ins#H_DPrelR:neg#ROOT"]"#);

        let back: FeatureIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);
    }
}
