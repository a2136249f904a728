use core::fmt;

/// One elementary edit. Node indices are 0-based positions in the T tree
/// (first field of `Replace`, `Delete`) or the H tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Replace(usize, usize),
    Insert(usize),
    Delete(usize),
}

impl fmt::Display for Operation {
    /// `rep:2,3`, `ins:2`, `del:1`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Replace(node1, node2) => write!(f, "rep:{},{}", node1, node2),
            Operation::Insert(node2) => write!(f, "ins:{}", node2),
            Operation::Delete(node1) => write!(f, "del:{}", node1),
        }
    }
}

/// The edit script of a minimum-cost alignment, bottom-up and left to right.
///
/// Every node of the first tree appears in exactly one `Replace` or
/// `Delete`, every node of the second in exactly one `Replace` or `Insert`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    operations: Vec<Operation>,
}

impl Mapping {
    pub(crate) fn from_operations(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// The textual sequence, e.g. `["rep:0,0", "ins:2", "rep:1,1"]`.
    pub fn sequence(&self) -> Vec<String> {
        self.operations.iter().map(Operation::to_string).collect()
    }

    pub fn replacements(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.operations.iter().filter_map(|op| match *op {
            Operation::Replace(node1, node2) => Some((node1, node2)),
            _ => None,
        })
    }

    pub fn insertions(&self) -> impl Iterator<Item = usize> + '_ {
        self.operations.iter().filter_map(|op| match *op {
            Operation::Insert(node2) => Some(node2),
            _ => None,
        })
    }

    pub fn deletions(&self) -> impl Iterator<Item = usize> + '_ {
        self.operations.iter().filter_map(|op| match *op {
            Operation::Delete(node1) => Some(node1),
            _ => None,
        })
    }

    /// What happened to `node1` of the first tree: the H node it was replaced
    /// with, or `None` if it was deleted.
    pub fn tree1_operation(&self, node1: usize) -> Option<usize> {
        self.replacements()
            .find(|(n1, _)| *n1 == node1)
            .map(|(_, n2)| n2)
    }

    /// The T node `node2` came from, or `None` if it was inserted.
    pub fn tree2_operation(&self, node2: usize) -> Option<usize> {
        self.replacements()
            .find(|(_, n2)| *n2 == node2)
            .map(|(n1, _)| n1)
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = &'a Operation;
    type IntoIter = core::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
