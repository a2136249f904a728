//! Zhang-Shasha ordered tree edit distance.
//!
//! Nodes are renumbered 1..=n in post-order. `lld[i]` is the post-order
//! number of the leftmost leaf below `i`, and the keyroots are the highest
//! nodes sharing each leftmost leaf. Every forest-distance table is indexed
//! from `lld - 1` so that row/column 0 is the empty forest.

use crate::mapping::{Mapping, Operation};
use crate::score::EditScore;
use crate::tree::LabeledTree;

const EPSILON: f64 = 1e-9;

/// Edit distance calculator bound to one cost model.
pub struct TreeEditDistance<S> {
    score: S,
}

impl<S: EditScore> TreeEditDistance<S> {
    pub fn new(score: S) -> Self {
        Self { score }
    }

    pub fn score(&self) -> &S {
        &self.score
    }

    /// Minimum total cost of turning `tree1` into `tree2`.
    pub fn calc(&self, tree1: &LabeledTree, tree2: &LabeledTree) -> f64 {
        let mut tables = Tables::new(&self.score, tree1, tree2);
        tables.compute_subtrees();
        tables.whole_forest_distance()
    }

    /// Distance plus the edit script that realises it.
    pub fn calc_with_mapping(&self, tree1: &LabeledTree, tree2: &LabeledTree) -> (f64, Mapping) {
        let mut tables = Tables::new(&self.score, tree1, tree2);
        tables.compute_subtrees();
        let distance = tables.whole_forest_distance();

        let mut operations = Vec::with_capacity(tree1.size() + tree2.size());
        let (n1, n2) = (tables.d1.len(), tables.d2.len());
        tables.backtrack(n1, 1, n2, 1, &mut operations);
        // Backtracking walks right to left.
        operations.reverse();

        (distance, Mapping::from_operations(operations))
    }
}

/// Post-order view of one tree, 1-based.
struct Decomposition {
    /// `nodes[i]` is the tree node at post-order position `i`; slot 0 unused.
    nodes: Vec<usize>,
    lld: Vec<usize>,
    keyroots: Vec<usize>,
}

impl Decomposition {
    fn new(tree: &LabeledTree) -> Self {
        let order = tree.postorder();
        let n = order.len();

        let mut position = vec![0; n];
        let mut nodes = Vec::with_capacity(n + 1);
        nodes.push(usize::MAX);
        for (i, &node) in order.iter().enumerate() {
            position[node] = i + 1;
            nodes.push(node);
        }

        let mut lld = vec![0; n + 1];
        for i in 1..=n {
            lld[i] = match tree.children(nodes[i]).first() {
                Some(&leftmost) => lld[position[leftmost]],
                None => i,
            };
        }

        let mut seen = vec![false; n + 1];
        let mut keyroots = Vec::new();
        for i in (1..=n).rev() {
            if !seen[lld[i]] {
                seen[lld[i]] = true;
                keyroots.push(i);
            }
        }
        keyroots.reverse();

        Self { nodes, lld, keyroots }
    }

    fn len(&self) -> usize {
        self.nodes.len() - 1
    }
}

struct Tables {
    d1: Decomposition,
    d2: Decomposition,
    delete: Vec<f64>,
    insert: Vec<f64>,
    replace: Vec<Vec<f64>>,
    treedist: Vec<Vec<f64>>,
}

impl Tables {
    fn new<S: EditScore>(score: &S, tree1: &LabeledTree, tree2: &LabeledTree) -> Self {
        let d1 = Decomposition::new(tree1);
        let d2 = Decomposition::new(tree2);
        let (n1, n2) = (d1.len(), d2.len());

        let mut delete = vec![0.0; n1 + 1];
        for i in 1..=n1 {
            delete[i] = score.delete(d1.nodes[i]);
        }
        let mut insert = vec![0.0; n2 + 1];
        for j in 1..=n2 {
            insert[j] = score.insert(d2.nodes[j]);
        }
        let mut replace = vec![vec![0.0; n2 + 1]; n1 + 1];
        for i in 1..=n1 {
            for j in 1..=n2 {
                replace[i][j] = score.replace(d1.nodes[i], d2.nodes[j]);
            }
        }

        Self {
            d1,
            d2,
            delete,
            insert,
            replace,
            treedist: vec![vec![0.0; n2 + 1]; n1 + 1],
        }
    }

    fn compute_subtrees(&mut self) {
        let keyroots1 = self.d1.keyroots.clone();
        let keyroots2 = self.d2.keyroots.clone();
        for &i in &keyroots1 {
            for &j in &keyroots2 {
                self.forest_dist(i, self.d1.lld[i], j, self.d2.lld[j]);
            }
        }
    }

    /// The whole post-order sequences as forests; handles multi-root and
    /// empty trees alike.
    fn whole_forest_distance(&mut self) -> f64 {
        let (n1, n2) = (self.d1.len(), self.d2.len());
        let fd = self.forest_dist(n1, 1, n2, 1);
        fd[n1][n2]
    }

    /// Forest distances between post-order ranges `l1..=i` and `l2..=j`.
    /// Records tree distances for every pair of prefixes that are whole
    /// subtrees.
    fn forest_dist(&mut self, i: usize, l1: usize, j: usize, l2: usize) -> Vec<Vec<f64>> {
        let rows = i + 2 - l1;
        let cols = j + 2 - l2;
        let mut fd = vec![vec![0.0; cols]; rows];

        for a in 1..rows {
            fd[a][0] = fd[a - 1][0] + self.delete[l1 - 1 + a];
        }
        for b in 1..cols {
            fd[0][b] = fd[0][b - 1] + self.insert[l2 - 1 + b];
        }

        for a in 1..rows {
            let di = l1 - 1 + a;
            for b in 1..cols {
                let dj = l2 - 1 + b;
                let delete = fd[a - 1][b] + self.delete[di];
                let insert = fd[a][b - 1] + self.insert[dj];

                if self.d1.lld[di] == l1 && self.d2.lld[dj] == l2 {
                    let replace = fd[a - 1][b - 1] + self.replace[di][dj];
                    let best = delete.min(insert).min(replace);
                    fd[a][b] = best;
                    self.treedist[di][dj] = best;
                } else {
                    let pa = self.d1.lld[di] - l1;
                    let pb = self.d2.lld[dj] - l2;
                    let subtree = fd[pa][pb] + self.treedist[di][dj];
                    fd[a][b] = delete.min(insert).min(subtree);
                }
            }
        }

        fd
    }

    /// Replays the choices of `forest_dist(i, l1, j, l2)` from its last cell,
    /// descending into nested subtree pairs as they are met.
    fn backtrack(&mut self, i: usize, l1: usize, j: usize, l2: usize, out: &mut Vec<Operation>) {
        let fd = self.forest_dist(i, l1, j, l2);
        let (mut di, mut dj) = (i, j);

        while di + 1 > l1 || dj + 1 > l2 {
            let a = di + 1 - l1;
            let b = dj + 1 - l2;
            let current = fd[a][b];

            if b == 0 || (a > 0 && approx_eq(fd[a - 1][b] + self.delete[di], current)) {
                out.push(Operation::Delete(self.d1.nodes[di]));
                di -= 1;
            } else if a == 0 || approx_eq(fd[a][b - 1] + self.insert[dj], current) {
                out.push(Operation::Insert(self.d2.nodes[dj]));
                dj -= 1;
            } else if self.d1.lld[di] == l1 && self.d2.lld[dj] == l2 {
                out.push(Operation::Replace(self.d1.nodes[di], self.d2.nodes[dj]));
                di -= 1;
                dj -= 1;
            } else {
                let (sub1, sub2) = (self.d1.lld[di], self.d2.lld[dj]);
                self.backtrack(di, sub1, dj, sub2, out);
                di = sub1 - 1;
                dj = sub2 - 1;
            }
        }
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * (1.0 + a.abs().max(b.abs()))
}
