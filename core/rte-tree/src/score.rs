use crate::tree::LabeledTree;

/// Cost model for the three elementary edits. Node arguments are 0-based
/// positions in the first (`node1`) or second (`node2`) tree.
pub trait EditScore {
    fn replace(&self, node1: usize, node2: usize) -> f64;
    fn insert(&self, node2: usize) -> f64;
    fn delete(&self, node1: usize) -> f64;
}

impl<S: EditScore + ?Sized> EditScore for &S {
    fn replace(&self, node1: usize, node2: usize) -> f64 {
        (**self).replace(node1, node2)
    }

    fn insert(&self, node2: usize) -> f64 {
        (**self).insert(node2)
    }

    fn delete(&self, node1: usize) -> f64 {
        (**self).delete(node1)
    }
}

/// Unit costs, with a free replace between tokens of identical form.
pub struct FormScore<'a> {
    tree1: &'a LabeledTree,
    tree2: &'a LabeledTree,
}

impl<'a> FormScore<'a> {
    pub fn new(tree1: &'a LabeledTree, tree2: &'a LabeledTree) -> Self {
        Self { tree1, tree2 }
    }
}

impl EditScore for FormScore<'_> {
    fn replace(&self, node1: usize, node2: usize) -> f64 {
        let form1 = self.tree1.token(self.tree1.label(node1)).form();
        let form2 = self.tree2.token(self.tree2.label(node2)).form();
        if form1 == form2 {
            0.0
        } else {
            1.0
        }
    }

    fn insert(&self, _node2: usize) -> f64 {
        1.0
    }

    fn delete(&self, _node1: usize) -> f64 {
        1.0
    }
}
