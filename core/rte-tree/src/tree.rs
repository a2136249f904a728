use core::fmt;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rte_protocol::{Fragment, Token};

use crate::TreeError;

/// Separator between the relations of a root path.
pub const PATH_SEPARATOR: &str = "#";

/// A dependency tree in array form. Node `i` is the `i`-th token of the
/// fragment it was built from; its label is the token id.
///
/// Never mutated after construction.
#[derive(Debug, Clone)]
pub struct LabeledTree {
    parents: Vec<Option<usize>>,
    labels: Vec<usize>,
    tokens: Vec<Token>,
    children: Vec<Vec<usize>>,
}

impl LabeledTree {
    pub fn from_fragment(fragment: &Fragment) -> Result<Self, TreeError> {
        let parents = fragment.iter().map(Token::head).collect();
        let labels = fragment.iter().map(Token::id).collect();
        Self::new(parents, labels, fragment.tokens().to_vec())
    }

    pub fn new(
        parents: Vec<Option<usize>>,
        labels: Vec<usize>,
        tokens: Vec<Token>,
    ) -> Result<Self, TreeError> {
        if parents.len() != labels.len() || parents.len() != tokens.len() {
            return Err(TreeError::LengthMismatch {
                parents: parents.len(),
                labels: labels.len(),
                tokens: tokens.len(),
            });
        }

        let size = parents.len();
        for (node, label) in labels.iter().enumerate() {
            if *label != node {
                return Err(TreeError::LabelMismatch { node, label: *label });
            }
        }

        let mut graph = DiGraph::<usize, ()>::with_capacity(size, size);
        let indices: Vec<NodeIndex> = (0..size).map(|node| graph.add_node(node)).collect();
        let mut children = vec![Vec::new(); size];

        for (node, parent) in parents.iter().enumerate() {
            if let Some(head) = *parent {
                if head >= size {
                    return Err(TreeError::DanglingHead { node, head, size });
                }
                if head == node {
                    return Err(TreeError::Cycle { node });
                }
                graph.add_edge(indices[head], indices[node], ());
                children[head].push(node);
            }
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Err(TreeError::Cycle {
                node: graph[cycle.node_id()],
            });
        }

        let paths = (0..size)
            .map(|node| root_path(&parents, &tokens, node))
            .collect::<Result<Vec<_>, _>>()?;
        let tokens = tokens
            .into_iter()
            .zip(paths)
            .map(|(token, path)| token.with_deprel_path(path))
            .collect();

        let tree = Self {
            parents,
            labels,
            tokens,
            children,
        };

        tracing::trace!(nodes = tree.size(), tree = %tree, "built labeled tree");
        Ok(tree)
    }

    pub fn size(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(node).copied().flatten()
    }

    pub fn label(&self, node: usize) -> usize {
        self.labels[node]
    }

    /// The token behind a label (equivalently, a node index).
    pub fn token(&self, label: usize) -> &Token {
        &self.tokens[label]
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Children in sentence order.
    pub fn children(&self, node: usize) -> &[usize] {
        &self.children[node]
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(node, _)| node)
    }

    /// Post-order over the forest: roots left to right, children before
    /// their parent.
    pub fn postorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.size());
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in self.roots() {
            stack.push((root, 0));
            while let Some((node, next_child)) = stack.pop() {
                if let Some(&child) = self.children[node].get(next_child) {
                    stack.push((node, next_child + 1));
                    stack.push((child, 0));
                } else {
                    order.push(node);
                }
            }
        }

        order
    }
}

/// Walks `node -> parent -> ... -> root`, giving up after `parents.len()`
/// steps.
fn root_path(parents: &[Option<usize>], tokens: &[Token], node: usize) -> Result<String, TreeError> {
    let mut relations = Vec::new();
    let mut current = Some(node);

    while let Some(n) = current {
        if relations.len() == parents.len() {
            return Err(TreeError::Cycle { node });
        }
        relations.push(tokens[n].deprel());
        current = parents[n];
    }

    Ok(relations.join(PATH_SEPARATOR))
}

impl fmt::Display for LabeledTree {
    /// Bracketed form, e.g. `(convicted (assassin (The)) (was))`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(tree: &LabeledTree, node: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}", tree.tokens.get(node).map(Token::form).unwrap_or("?"))?;
            for &child in tree.children(node) {
                f.write_str(" ")?;
                write_node(tree, child, f)?;
            }
            f.write_str(")")
        }

        for (i, root) in self.roots().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_node(self, root, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: usize, form: &str, head: Option<usize>, deprel: &str) -> Token {
        Token::new(id, form, form.to_lowercase(), "_", head, deprel)
    }

    // The assassin was convicted .
    fn sentence() -> Fragment {
        Fragment::from_tokens(vec![
            t(0, "The", Some(1), "det"),
            t(1, "assassin", Some(3), "nsubjpass"),
            t(2, "was", Some(3), "auxpass"),
            t(3, "convicted", None, "ROOT"),
            t(4, ".", Some(3), "punct"),
        ])
    }

    #[test]
    fn test_root_paths() {
        let tree = LabeledTree::from_fragment(&sentence()).unwrap();

        assert_eq!(tree.size(), 5);
        assert_eq!(tree.token(0).deprel_path(), Some("det#nsubjpass#ROOT"));
        assert_eq!(tree.token(1).deprel_path(), Some("nsubjpass#ROOT"));
        assert_eq!(tree.token(3).deprel_path(), Some("ROOT"));
        assert_eq!(tree.token(4).deprel_path(), Some("punct#ROOT"));
    }

    #[test]
    fn test_structure_accessors() {
        let tree = LabeledTree::from_fragment(&sentence()).unwrap();

        assert_eq!(tree.parent(0), Some(1));
        assert_eq!(tree.parent(3), None);
        assert_eq!(tree.label(2), 2);
        assert_eq!(tree.children(3), &[1, 2, 4]);
        assert_eq!(tree.roots().collect::<Vec<_>>(), vec![3]);
        assert_eq!(tree.postorder(), vec![0, 1, 2, 4, 3]);
        assert_eq!(tree.to_string(), "(convicted (assassin (The)) (was) (.))");
    }

    #[test]
    fn test_forest_postorder() {
        let fragment = Fragment::from_tokens(vec![
            t(0, "a", None, "ROOT"),
            t(1, "b", Some(2), "dep"),
            t(2, "c", None, "ROOT"),
        ]);
        let tree = LabeledTree::from_fragment(&fragment).unwrap();
        assert_eq!(tree.postorder(), vec![0, 1, 2]);
        assert_eq!(tree.to_string(), "(a) (c (b))");
    }

    #[test]
    fn test_empty_tree() {
        let tree = LabeledTree::from_fragment(&Fragment::new()).unwrap();
        assert!(tree.is_empty());
        assert!(tree.postorder().is_empty());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let fragment = Fragment::from_tokens(vec![
            t(0, "a", Some(1), "dep"),
            t(1, "b", Some(0), "dep"),
            t(2, "c", None, "ROOT"),
        ]);
        assert!(matches!(
            LabeledTree::from_fragment(&fragment),
            Err(TreeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let fragment = Fragment::from_tokens(vec![t(0, "a", Some(0), "dep")]);
        assert_eq!(
            LabeledTree::from_fragment(&fragment).unwrap_err(),
            TreeError::Cycle { node: 0 }
        );
    }

    #[test]
    fn test_root_path_walk_is_bounded() {
        let tokens = vec![t(0, "a", Some(1), "x"), t(1, "b", Some(0), "y")];
        let parents = vec![Some(1), Some(0)];
        assert_eq!(
            root_path(&parents, &tokens, 0),
            Err(TreeError::Cycle { node: 0 })
        );
    }

    #[test]
    fn test_dangling_head() {
        let fragment = Fragment::from_tokens(vec![t(0, "a", Some(7), "dep")]);
        assert_eq!(
            LabeledTree::from_fragment(&fragment).unwrap_err(),
            TreeError::DanglingHead { node: 0, head: 7, size: 1 }
        );
    }

    #[test]
    fn test_length_and_label_checks() {
        let tokens = vec![t(0, "a", None, "ROOT")];
        assert!(matches!(
            LabeledTree::new(vec![None, Some(0)], vec![0], tokens.clone()),
            Err(TreeError::LengthMismatch { .. })
        ));
        assert_eq!(
            LabeledTree::new(vec![None], vec![3], tokens).unwrap_err(),
            TreeError::LabelMismatch { node: 0, label: 3 }
        );
    }
}
