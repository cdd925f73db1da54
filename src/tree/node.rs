//! A node struct used in the decision tree algorithm.
use serde::{Serialize, Deserialize};

use std::fmt;

use crate::{Predictor, Vector};
use super::split::{LeftRight, Split};


/// The prediction of a node and its empirical probability.
/// `prob` is `0` for regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Predict {
    pub predict: f64,
    pub prob: f64,
}


impl Predict {
    #[inline]
    pub fn new(predict: f64, prob: f64) -> Self {
        Self { predict, prob }
    }
}


impl fmt::Display for Predict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (prob = {:?})", self.predict, self.prob)
    }
}


/// Statistics of the split chosen at a branch node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InformationGainStats {
    /// Impurity decrease weighted by the child sizes.
    pub gain: f64,
    /// Impurity of the node before the split.
    pub impurity: f64,
    pub left_impurity: f64,
    pub right_impurity: f64,
    pub left_predict: Predict,
    pub right_predict: Predict,
}


impl fmt::Display for InformationGainStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gain = {:.4}, impurity = {:.4}, \
             left impurity = {:.4}, right impurity = {:.4}",
            self.gain,
            self.impurity,
            self.left_impurity,
            self.right_impurity,
        )
    }
}


/// A node of a trained tree.
/// Node ids follow the heap order:
/// the root is `1` and the children of `i` are `2i` and `2i + 1`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Branch {
        id:       usize,
        split:    Split,
        left:     Box<Node>,
        right:    Box<Node>,
        predict:  Predict,
        impurity: f64,
        stats:    InformationGainStats,
    },
    Leaf {
        id:       usize,
        predict:  Predict,
        impurity: f64,
    },
}


impl Node {
    pub fn branch(
        id:       usize,
        split:    Split,
        left:     Node,
        right:    Node,
        predict:  Predict,
        impurity: f64,
        stats:    InformationGainStats,
    ) -> Self
    {
        Self::Branch {
            id,
            split,
            left: Box::new(left),
            right: Box::new(right),
            predict,
            impurity,
            stats,
        }
    }


    pub fn leaf(id: usize, predict: Predict, impurity: f64) -> Self {
        Self::Leaf { id, predict, impurity }
    }


    /// Returns the id of the left child of node `id`.
    #[inline]
    pub fn left_child_index(id: usize) -> usize {
        id << 1
    }


    /// Returns the id of the right child of node `id`.
    #[inline]
    pub fn right_child_index(id: usize) -> usize {
        (id << 1) + 1
    }


    /// Returns the depth of node `id`. The root has depth `0`.
    #[inline]
    pub fn index_to_level(id: usize) -> usize {
        assert!(id > 0, "Node ids start from 1");
        (usize::BITS - 1 - id.leading_zeros()) as usize
    }


    /// Returns the prediction made if this node were a leaf.
    pub fn node_predict(&self) -> &Predict {
        match self {
            Self::Branch { predict, .. } | Self::Leaf { predict, .. } => predict,
        }
    }


    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }


    /// Returns the depth of the subtree rooted at this node.
    /// A leaf has depth `0`.
    pub fn depth(&self) -> usize {
        match self {
            Self::Branch { left, right, .. } => {
                1 + left.depth().max(right.depth())
            },
            Self::Leaf { .. } => 0,
        }
    }


    /// Returns the number of nodes of the subtree rooted at this node.
    pub fn num_nodes(&self) -> usize {
        match self {
            Self::Branch { left, right, .. } => {
                1 + left.num_nodes() + right.num_nodes()
            },
            Self::Leaf { .. } => 1,
        }
    }


    /// Returns the leaf reached by `features`.
    pub fn leaf_of(&self, features: &Vector) -> &Node {
        let mut node = self;
        while let Self::Branch { split, left, right, .. } = node {
            node = match split.split(features) {
                LeftRight::Left  => &**left,
                LeftRight::Right => &**right,
            };
        }
        node
    }


    /// Write the subtree as indented `If`/`Else` lines.
    pub(crate) fn subtree_to_string(&self, indent: usize, out: &mut String) {
        let prefix = " ".repeat(indent);
        match self {
            Self::Branch { split, left, right, .. } => {
                out.push_str(&format!(
                    "{prefix}If {}\n", split.describe(LeftRight::Left)
                ));
                left.subtree_to_string(indent + 1, out);
                out.push_str(&format!(
                    "{prefix}Else {}\n", split.describe(LeftRight::Right)
                ));
                right.subtree_to_string(indent + 1, out);
            },
            Self::Leaf { predict, .. } => {
                out.push_str(&format!("{prefix}Predict: {:?}\n", predict.predict));
            },
        }
    }


    pub(crate) fn to_dot_info(&self, id: usize) -> (Vec<String>, usize) {
        match self {
            Node::Branch { split, left, right, .. } => {
                let splitter = format!(
                    "\tnode_{id} [ label = \"{}\" ];\n",
                    split.describe(LeftRight::Left),
                );

                let left_id = id + 1;
                let (     left,  right_id) = left.to_dot_info(left_id);
                let (mut right, return_id) = right.to_dot_info(right_id);

                let mut info = left;
                info.push(splitter);
                info.append(&mut right);

                let left_edge = format!(
                    "\tnode_{id} -- node_{left_id} [ label = \"Yes\" ];\n",
                );
                info.push(left_edge);
                let right_edge = format!(
                    "\tnode_{id} -- node_{right_id} [ label = \"No\" ];\n",
                );
                info.push(right_edge);

                (info, return_id)
            },
            Node::Leaf { predict, .. } => {
                let info = format!(
                    "\tnode_{id} [ label = \"{:?}\", shape = box ];\n",
                    predict.predict,
                );

                (vec![info], id + 1)
            }
        }
    }
}


impl Predictor for Node {
    fn predict(&self, features: &Vector) -> f64 {
        self.leaf_of(features)
            .node_predict()
            .predict
    }
}


impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch {
                id,
                split,
                left,
                right,
                predict,
                impurity,
                stats,
            } => {
                f.debug_struct("Branch")
                    .field("id", &id)
                    .field("split", &split)
                    .field("predict", &predict)
                    .field("impurity", &impurity)
                    .field("gain", &stats.gain)
                    .field("left", &left)
                    .field("right", &right)
                    .finish()
            },
            Self::Leaf {
                id,
                predict,
                impurity,
            } => {
                f.debug_struct("Leaf")
                    .field("id", &id)
                    .field("predict", &predict)
                    .field("impurity", &impurity)
                    .finish()
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn stub_stats() -> InformationGainStats {
        InformationGainStats {
            gain: 0.5,
            impurity: 0.5,
            left_impurity: 0.0,
            right_impurity: 0.0,
            left_predict: Predict::new(0.0, 1.0),
            right_predict: Predict::new(1.0, 1.0),
        }
    }

    fn stump() -> Node {
        Node::branch(
            1,
            Split::continuous(0, 0.5),
            Node::leaf(2, Predict::new(0.0, 1.0), 0.0),
            Node::leaf(3, Predict::new(1.0, 1.0), 0.0),
            Predict::new(0.0, 0.5),
            0.5,
            stub_stats(),
        )
    }

    #[test]
    fn test_child_indices() {
        assert_eq!(2, Node::left_child_index(1));
        assert_eq!(3, Node::right_child_index(1));
        assert_eq!(11, Node::right_child_index(5));
    }

    #[test]
    fn test_index_to_level() {
        let result = [1, 2, 3, 4, 7, 8].map(Node::index_to_level);
        let expect = [0, 1, 1, 2, 2, 3];
        assert_eq!(expect, result, "expected {expect:?}, got {result:?}.");
    }

    #[test]
    fn test_predict_and_shape() {
        let node = stump();
        assert_eq!(0.0, node.predict(&Vector::dense(vec![0.2])));
        assert_eq!(1.0, node.predict(&Vector::dense(vec![0.7])));
        assert_eq!(1, node.depth());
        assert_eq!(3, node.num_nodes());
    }

    #[test]
    fn test_subtree_to_string() {
        let mut out = String::new();
        stump().subtree_to_string(1, &mut out);
        let expect = " If (feature 0 <= 0.5)\n  Predict: 0.0\n \
                      Else (feature 0 > 0.5)\n  Predict: 1.0\n";
        assert_eq!(expect, out, "expected {expect}, got {out}.");
    }
}
