//! Directed graph read from a tab-separated edge list.
//!
//! Node names are enumerated densely from 0 in first-seen order; the
//! enumeration doubles as the node's row in the embedding table. Per-node
//! counts and out-neighbour lists are updated as each edge is read.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{EmbedError, Result};

const SEPARATOR: char = '\t';

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub enumeration: usize,
    pub count_as_source: u64,
    pub count_as_target: u64,
    /// Enumerations this node points to, one entry per edge (parallel edges repeat).
    pub target_enums: Vec<usize>,
}

impl Node {
    fn new(name: String, enumeration: usize) -> Self {
        Self {
            name,
            enumeration,
            count_as_source: 0,
            count_as_target: 0,
            target_enums: Vec::new(),
        }
    }
}

/// An edge references its endpoints by enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Default)]
pub struct Digraph {
    nodes: Vec<Node>,
    name_to_enum: HashMap<String, usize>,
    /// In input order.
    edges: Vec<Edge>,
}

impl Digraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a graph file; see [`Digraph::from_reader`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| EmbedError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path)
    }

    /// Parse `source<TAB>target` lines.
    ///
    /// Fails on the first line that does not split into exactly two fields,
    /// reporting its 1-based line number. `origin` only labels I/O errors.
    pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Self> {
        let mut graph = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| EmbedError::io(origin, e))?;
            let fields: Vec<&str> = line.split(SEPARATOR).collect();
            if fields.len() != 2 {
                return Err(EmbedError::Format {
                    line: idx + 1,
                    message: format!(
                        "expected exactly two tab-separated columns, found {}",
                        fields.len()
                    ),
                });
            }
            graph.add_edge(fields[0], fields[1]);
        }
        tracing::info!(edges = graph.edge_count(), nodes = graph.node_count(), "Graph loaded");
        Ok(graph)
    }

    /// Record one edge, creating its endpoints on first sight.
    pub fn add_edge(&mut self, source_name: &str, target_name: &str) -> Edge {
        let source = self.find_or_create_node(source_name);
        let target = self.find_or_create_node(target_name);

        let src = &mut self.nodes[source];
        src.count_as_source += 1;
        src.target_enums.push(target);
        self.nodes[target].count_as_target += 1;

        let edge = Edge { source, target };
        self.edges.push(edge);
        edge
    }

    fn find_or_create_node(&mut self, name: &str) -> usize {
        if let Some(&enumeration) = self.name_to_enum.get(name) {
            return enumeration;
        }
        let enumeration = self.nodes.len();
        self.nodes.push(Node::new(name.to_string(), enumeration));
        self.name_to_enum.insert(name.to_string(), enumeration);
        enumeration
    }

    // ── Queries ────────────────────────────────────────

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Panics if `enumeration >= node_count()`.
    #[inline]
    pub fn node(&self, enumeration: usize) -> &Node {
        &self.nodes[enumeration]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn enumeration_of(&self, name: &str) -> Option<usize> {
        self.name_to_enum.get(name).copied()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// `count_as_target` of every node, indexed by enumeration.
    pub fn target_counts(&self) -> Vec<u64> {
        self.nodes.iter().map(|n| n.count_as_target).collect()
    }
}
