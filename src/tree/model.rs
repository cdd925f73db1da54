//! Defines the trained decision tree.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::Result;
use crate::{Predictor, Vector};
use super::configuration::Algo;
use super::node::Node;


/// A trained decision tree.
/// This struct is just a wrapper of the root [`Node`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeModel {
    algo: Algo,
    root: Node,
}


impl DecisionTreeModel {
    #[inline]
    pub fn new(algo: Algo, root: Node) -> Self {
        Self { algo, root }
    }


    #[inline]
    pub fn algo(&self) -> Algo {
        self.algo
    }


    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }


    /// Returns the depth of the tree.
    /// A tree with a single leaf has depth `0`.
    #[inline]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }


    /// Returns the number of nodes, leaves included.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.root.num_nodes()
    }


    /// Returns the summary line followed by the whole tree, e.g.,
    ///
    /// ```text
    /// DecisionTreeModel classifier of depth 1 with 3 nodes
    ///   If (feature 0 <= 0.5)
    ///    Predict: 1.0
    ///   Else (feature 0 > 0.5)
    ///    Predict: 0.0
    /// ```
    pub fn to_debug_string(&self) -> String {
        let mut out = format!("{self}\n");
        self.root.subtree_to_string(2, &mut out);
        out
    }


    /// Write the model to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }


    /// Read a model written by [`DecisionTreeModel::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let model = serde_json::from_reader(BufReader::new(file))?;
        Ok(model)
    }


    /// Write the current decision tree to dot file.
    pub fn to_dot_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut f = BufWriter::new(File::create(path)?);
        f.write_all(b"graph DecisionTree {\n")?;

        let info = self.root.to_dot_info(0).0;
        for row in info {
            f.write_all(row.as_bytes())?;
        }

        f.write_all(b"}\n")?;
        f.flush()?;
        Ok(())
    }
}


impl Predictor for DecisionTreeModel {
    #[inline]
    fn predict(&self, features: &Vector) -> f64 {
        self.root.predict(features)
    }
}


impl fmt::Display for DecisionTreeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DecisionTreeModel {} of depth {} with {} nodes",
            self.algo, self.depth(), self.num_nodes(),
        )
    }
}
