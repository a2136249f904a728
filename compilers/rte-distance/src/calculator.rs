use rte_protocol::{AlignmentMap, Fragment, ManualAlignments, TransformationKinds};
use rte_tree::{LabeledTree, Mapping, Operation, TreeEditDistance};
use serde::Serialize;

use crate::classifier::{AlignmentClassifier, Judgment, LocalAlignment};
use crate::config::{DistanceConfig, Weights};
use crate::score::AlignmentScore;
use crate::transformation::Transformation;
use crate::{DistanceError, Side};

/// Outcome of one T/H comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceResult {
    pub raw: f64,
    pub normalized: f64,
    /// One per edit operation, bottom-up and left to right.
    pub transformations: Vec<Transformation>,
}

impl DistanceResult {
    /// `[normalized, raw]`
    pub fn scores(&self) -> [f64; 2] {
        [self.normalized, self.raw]
    }

    /// Rendered feature strings of the enabled transformations.
    pub fn features(&self, enabled: TransformationKinds) -> Vec<String> {
        self.transformations
            .iter()
            .filter_map(|transformation| transformation.render(enabled))
            .collect()
    }
}

/// `raw` over the cost of deleting all of T and inserting all of H; zero
/// when that cost is zero.
pub fn normalized_distance(raw: f64, t_nodes: usize, h_nodes: usize, weights: &Weights) -> f64 {
    let norm = t_nodes as f64 * weights.delete_weight + h_nodes as f64 * weights.insert_weight;
    if norm == 0.0 {
        0.0
    } else {
        raw / norm
    }
}

/// The distance component: fixed edit weights, alignment-aware replace.
///
/// Holds only read-only state, so one instance can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct FixedWeightEditDistance {
    config: DistanceConfig,
    manual: ManualAlignments,
}

impl FixedWeightEditDistance {
    pub fn new(config: DistanceConfig) -> Self {
        Self {
            config,
            manual: ManualAlignments::new(),
        }
    }

    pub fn with_manual_alignments(mut self, manual: ManualAlignments) -> Self {
        self.manual = manual;
        self
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    pub fn manual_alignments(&self) -> &ManualAlignments {
        &self.manual
    }

    pub fn calculate(
        &self,
        t: &Fragment,
        h: &Fragment,
        alignments: &AlignmentMap,
    ) -> Result<DistanceResult, DistanceError> {
        let span = tracing::debug_span!("calculate", t_nodes = t.len(), h_nodes = h.len());
        let _enter = span.enter();

        let t_tree = self.tree(Side::Text, t)?;
        let h_tree = self.tree(Side::Hypothesis, h)?;

        let classifier = AlignmentClassifier::new(alignments, &self.manual);
        let score = AlignmentScore::new(
            &t_tree,
            &h_tree,
            classifier,
            self.config.weights,
            self.config.alignment_mode,
        );
        let (raw, mapping) = TreeEditDistance::new(score).calc_with_mapping(&t_tree, &h_tree);

        let transformations = extract_transformations(&t_tree, &h_tree, &classifier, &mapping);
        let normalized = normalized_distance(raw, t_tree.size(), h_tree.size(), &self.config.weights);

        tracing::debug!(raw, normalized, operations = transformations.len(), "distance computed");
        Ok(DistanceResult {
            raw,
            normalized,
            transformations,
        })
    }

    fn tree(&self, side: Side, fragment: &Fragment) -> Result<LabeledTree, DistanceError> {
        if let Some(limit) = self.config.max_nodes {
            if fragment.len() > limit {
                return Err(DistanceError::TreeTooLarge {
                    side,
                    nodes: fragment.len(),
                    limit,
                });
            }
        }
        LabeledTree::from_fragment(fragment).map_err(|source| DistanceError::MalformedTree { side, source })
    }
}

/// Reads every operation of `mapping` as a transformation, in order.
pub fn extract_transformations(
    t_tree: &LabeledTree,
    h_tree: &LabeledTree,
    classifier: &AlignmentClassifier<'_>,
    mapping: &Mapping,
) -> Vec<Transformation> {
    mapping
        .iter()
        .map(|operation| {
            let transformation = match *operation {
                Operation::Replace(node1, node2) => {
                    let t = t_tree.token(t_tree.label(node1));
                    let h = h_tree.token(h_tree.label(node2));
                    match classifier.classify(t, h) {
                        Some(LocalAlignment {
                            judgment: Judgment::LocalEntailment,
                            info,
                        }) => Transformation::Match {
                            info,
                            t: t.clone(),
                            h: h.clone(),
                        },
                        alignment => {
                            let (judgment, info) = match alignment {
                                Some(LocalAlignment { judgment, info }) => (Some(judgment), info),
                                None => (None, None),
                            };
                            Transformation::Replace {
                                judgment,
                                info,
                                t: t.clone(),
                                h: h.clone(),
                            }
                        }
                    }
                }
                Operation::Insert(node2) => Transformation::Insertion {
                    h: h_tree.token(h_tree.label(node2)).clone(),
                },
                Operation::Delete(node1) => Transformation::Deletion {
                    t: t_tree.token(t_tree.label(node1)).clone(),
                },
            };
            tracing::trace!(%transformation, "transformation");
            transformation
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlignmentMode;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rte_protocol::{AlignmentEntry, Direction, Token};
    use rte_tree::TreeError;

    /// `(form, lemma, head, deprel)` per token.
    fn sentence(words: &[(&str, &str, Option<usize>, &str)]) -> Fragment {
        words
            .iter()
            .enumerate()
            .map(|(id, (form, lemma, head, deprel))| Token::new(id, *form, *lemma, "NN", *head, *deprel))
            .collect()
    }

    fn assassin(subject: &str) -> Fragment {
        sentence(&[
            ("The", "the", Some(3), "det"),
            (subject, subject, Some(3), "nsubjpass"),
            ("was", "be", Some(3), "auxpass"),
            ("convicted", "convict", None, "ROOT"),
            (".", ".", Some(3), "punct"),
        ])
    }

    fn synonyms() -> AlignmentMap {
        vec![(
            "assassin",
            "killer",
            AlignmentEntry::new("WORDNET__3.0__SYNONYM", 1.0, Direction::TtoH),
        )]
        .into_iter()
        .collect()
    }

    fn types(result: &DistanceResult) -> Vec<&'static str> {
        result.transformations.iter().map(Transformation::type_name).collect()
    }

    fn with_mode(mode: AlignmentMode) -> FixedWeightEditDistance {
        FixedWeightEditDistance::new(DistanceConfig {
            alignment_mode: mode,
            ..DistanceConfig::default()
        })
    }

    #[test]
    fn test_aligned_substitution_costs_nothing() {
        let result = FixedWeightEditDistance::default()
            .calculate(&assassin("assassin"), &assassin("killer"), &synonyms())
            .unwrap();

        assert_eq!(result.raw, 0.0);
        assert_eq!(result.normalized, 0.0);
        assert_eq!(types(&result), vec!["match"; 5]);

        let subject = &result.transformations[1];
        assert_eq!(subject.t_token().map(Token::form), Some("assassin"));
        assert_eq!(subject.h_token().map(Token::form), Some("killer"));
        assert_eq!(subject.info(), Some("WORDNET__3.0__SYNONYM:TtoH"));
        assert_eq!(
            subject.render(TransformationKinds::all()).as_deref(),
            Some("Type:match#Info:WORDNET__3.0__SYNONYM:TtoH#T_DPrelR:nsubjpass#ROOT#H_DPrelR:nsubjpass#ROOT")
        );
    }

    #[test]
    fn test_punctuation_flag_leaves_fragments_alone() {
        let component = FixedWeightEditDistance::new(DistanceConfig {
            remove_punctuation: true,
            ..DistanceConfig::default()
        });
        let t = assassin("assassin");
        let h = sentence(&[
            ("The", "the", Some(3), "det"),
            ("assassin", "assassin", Some(3), "nsubjpass"),
            ("was", "be", Some(3), "auxpass"),
            ("convicted", "convict", None, "ROOT"),
        ]);

        let result = component.calculate(&t, &h, &AlignmentMap::new()).unwrap();
        assert_eq!(result.raw, 1.0);
        assert_eq!(types(&result), vec!["match", "match", "match", "del", "match"]);
        assert_eq!(result.transformations[3].t_token().map(Token::form), Some("."));
    }

    #[test]
    fn test_labels_mode_keeps_the_cost() {
        let result = with_mode(AlignmentMode::Labels)
            .calculate(&assassin("assassin"), &assassin("killer"), &synonyms())
            .unwrap();

        assert_eq!(result.raw, 1.0);
        assert_eq!(result.normalized, 0.1);
        assert_eq!(types(&result), vec!["match"; 5]);
    }

    #[test]
    fn test_unaligned_substitution_is_a_replace() {
        let result = FixedWeightEditDistance::default()
            .calculate(&assassin("assassin"), &assassin("killer"), &AlignmentMap::new())
            .unwrap();

        assert_eq!(result.raw, 1.0);
        assert_eq!(types(&result), vec!["match", "rep", "match", "match", "match"]);
        assert_eq!(
            result.transformations[1],
            Transformation::Replace {
                judgment: None,
                info: None,
                t: assassin("assassin").token(2).cloned().unwrap().with_deprel_path("nsubjpass#ROOT"),
                h: assassin("killer").token(2).cloned().unwrap().with_deprel_path("nsubjpass#ROOT"),
            }
        );
    }

    #[test]
    fn test_antonym_keeps_judgment() {
        let alignments: AlignmentMap = vec![(
            "assassin",
            "victim",
            AlignmentEntry::new("WORDNET__3.0__ANTONYM", 1.0, Direction::TtoH),
        )]
        .into_iter()
        .collect();
        let result = FixedWeightEditDistance::default()
            .calculate(&assassin("assassin"), &assassin("victim"), &alignments)
            .unwrap();

        assert_eq!(result.raw, 1.0);
        match &result.transformations[1] {
            Transformation::Replace { judgment, info, .. } => {
                assert_eq!(*judgment, Some(Judgment::LocalContradiction));
                assert_eq!(info.as_deref(), Some("WORDNET__3.0__ANTONYM:TtoH"));
            }
            other => panic!("expected a replace, got {}", other),
        }
    }

    #[test]
    fn test_manual_alignment_forces_match() {
        let t = sentence(&[("bought", "buy", None, "ROOT")]);
        let h = sentence(&[("acquired", "acquire", None, "ROOT")]);
        let mut manual = ManualAlignments::new();
        manual.insert("bought_NN", "acquired_NN");

        let plain = FixedWeightEditDistance::default();
        assert_eq!(plain.calculate(&t, &h, &AlignmentMap::new()).unwrap().raw, 1.0);

        let result = FixedWeightEditDistance::default()
            .with_manual_alignments(manual)
            .calculate(&t, &h, &AlignmentMap::new())
            .unwrap();
        assert_eq!(result.raw, 0.0);
        assert_eq!(types(&result), vec!["match"]);
        assert_eq!(result.transformations[0].info(), None);
    }

    #[test]
    fn test_single_node_against_three() {
        let single = sentence(&[("x", "x", None, "ROOT")]);
        let three = sentence(&[
            ("p", "p", Some(1), "amod"),
            ("q", "q", Some(2), "nsubj"),
            ("r", "r", None, "ROOT"),
        ]);
        let component = FixedWeightEditDistance::default();

        let inserted = component.calculate(&single, &three, &AlignmentMap::new()).unwrap();
        assert_eq!(inserted.raw, 3.0);
        assert_eq!(inserted.normalized, 0.75);
        assert_eq!(types(&inserted), vec!["rep", "ins", "ins"]);

        let deleted = component.calculate(&three, &single, &AlignmentMap::new()).unwrap();
        assert_eq!(deleted.raw, 3.0);
        assert_eq!(types(&deleted), vec!["rep", "del", "del"]);
    }

    #[test]
    fn test_empty_pair() {
        let result = FixedWeightEditDistance::default()
            .calculate(&Fragment::new(), &Fragment::new(), &AlignmentMap::new())
            .unwrap();
        assert_eq!(result.scores(), [0.0, 0.0]);
        assert!(result.transformations.is_empty());
    }

    #[test]
    fn test_scores_and_features() {
        let mut t = assassin("assassin");
        t.push(Token::new(5, "yesterday", "yesterday", "NN", Some(3), "tmod"));
        let result = FixedWeightEditDistance::new(DistanceConfig {
            enabled: TransformationKinds::DELETION,
            ..DistanceConfig::default()
        })
        .calculate(&t, &assassin("assassin"), &AlignmentMap::new())
        .unwrap();

        assert_eq!(result.scores(), [1.0 / 11.0, 1.0]);
        assert_eq!(result.features(TransformationKinds::DELETION), vec!["Type:del#T_DPrelR:tmod#ROOT"]);
        assert_eq!(result.features(TransformationKinds::MATCH).len(), 5);
    }

    #[test]
    fn test_structural_errors() {
        let component = FixedWeightEditDistance::new(DistanceConfig {
            max_nodes: Some(3),
            ..DistanceConfig::default()
        });
        assert_eq!(
            component.calculate(&assassin("assassin"), &Fragment::new(), &AlignmentMap::new()),
            Err(DistanceError::TreeTooLarge {
                side: Side::Text,
                nodes: 5,
                limit: 3
            })
        );

        let cyclic = sentence(&[("a", "a", Some(1), "dep"), ("b", "b", Some(0), "dep")]);
        let err = FixedWeightEditDistance::default()
            .calculate(&Fragment::new(), &cyclic, &AlignmentMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            DistanceError::MalformedTree {
                side: Side::Hypothesis,
                source: TreeError::Cycle { .. }
            }
        ));
    }

    const FORMS: [&str; 4] = ["cat", "dog", "run", "no"];
    const RELATIONS: [&str; 3] = ["nsubj", "dobj", "amod"];

    fn arb_sentence() -> impl Strategy<Value = Fragment> {
        (0usize..7).prop_flat_map(|n| {
            let words = proptest::collection::vec((0..FORMS.len(), 0..RELATIONS.len()), n);
            let heads = (0..n)
                .map(|i| if i == 0 { Just(None).boxed() } else { (0..i).prop_map(Some).boxed() })
                .collect::<Vec<_>>();
            (words, heads).prop_map(|(words, heads)| {
                words
                    .into_iter()
                    .zip(heads)
                    .enumerate()
                    .map(|(id, ((form, relation), head))| {
                        Token::new(id, FORMS[form], FORMS[form], "NN", head, RELATIONS[relation])
                    })
                    .collect::<Fragment>()
            })
        })
    }

    proptest! {
        #[test]
        fn test_result_properties(t in arb_sentence(), h in arb_sentence(), labels in any::<bool>()) {
            let mode = if labels { AlignmentMode::Labels } else { AlignmentMode::Cost };
            let component = with_mode(mode);
            let alignments = synonyms();

            let first = component.calculate(&t, &h, &alignments).unwrap();
            let second = component.calculate(&t, &h, &alignments).unwrap();
            prop_assert_eq!(&first, &second);

            prop_assert!((0.0..=1.0).contains(&first.normalized));

            let count = |kind: TransformationKinds| {
                first.transformations.iter().filter(|tr| tr.kind() == kind).count()
            };
            let pairs = count(TransformationKinds::MATCH) + count(TransformationKinds::REPLACE);
            prop_assert_eq!(pairs + count(TransformationKinds::DELETION), t.len());
            prop_assert_eq!(pairs + count(TransformationKinds::INSERTION), h.len());
        }

        #[test]
        fn test_identity_costs_nothing(f in arb_sentence()) {
            let result = FixedWeightEditDistance::default()
                .calculate(&f, &f, &AlignmentMap::new())
                .unwrap();
            prop_assert_eq!(result.raw, 0.0);
            prop_assert!(result.transformations.iter().all(|tr| tr.type_name() == "match"));
        }
    }
}
