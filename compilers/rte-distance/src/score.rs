use rte_tree::{EditScore, LabeledTree};

use crate::classifier::{lexically_identical, AlignmentClassifier};
use crate::config::{AlignmentMode, Weights};

/// Edit costs for one T/H pair, with replace priced by alignment.
pub struct AlignmentScore<'a> {
    t_tree: &'a LabeledTree,
    h_tree: &'a LabeledTree,
    classifier: AlignmentClassifier<'a>,
    weights: Weights,
    mode: AlignmentMode,
}

impl<'a> AlignmentScore<'a> {
    pub fn new(
        t_tree: &'a LabeledTree,
        h_tree: &'a LabeledTree,
        classifier: AlignmentClassifier<'a>,
        weights: Weights,
        mode: AlignmentMode,
    ) -> Self {
        Self {
            t_tree,
            h_tree,
            classifier,
            weights,
            mode,
        }
    }
}

impl EditScore for AlignmentScore<'_> {
    fn replace(&self, node1: usize, node2: usize) -> f64 {
        let t = self.t_tree.token(self.t_tree.label(node1));
        let h = self.h_tree.token(self.h_tree.label(node2));

        let matched = match self.mode {
            AlignmentMode::Cost => self.classifier.entails(t, h),
            AlignmentMode::Labels => lexically_identical(t, h),
        };
        if matched {
            self.weights.match_weight
        } else {
            self.weights.substitute_weight
        }
    }

    fn insert(&self, _node2: usize) -> f64 {
        self.weights.insert_weight
    }

    fn delete(&self, _node1: usize) -> f64 {
        self.weights.delete_weight
    }
}
