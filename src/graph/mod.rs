//! Directed relation graph over element ids, with undirected components.

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use crate::extract::Triple;

/// Per-document relation graph: one directed edge per triple, edge weight =
/// relation name. Rebuilt fresh for every document and discarded after row
/// expansion.
#[derive(Debug)]
pub struct RelationGraph {
    graph: DiGraph<String, String>,
    nodes: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    /// Build the graph from a document's triple set. The set is already
    /// deduplicated and iterates in sorted order, so node and edge insertion
    /// order is deterministic.
    pub fn from_triples(triples: &BTreeSet<Triple>) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

        for triple in triples {
            let source = intern(&mut graph, &mut nodes, &triple.source);
            let target = intern(&mut graph, &mut nodes, &triple.target);
            graph.add_edge(source, target, triple.relation.clone());
        }

        RelationGraph { graph, nodes }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterate edges as `(source_id, target_id, relation)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].as_str(),
                self.graph[edge.target()].as_str(),
                edge.weight().as_str(),
            )
        })
    }

    /// Connected components of the undirected projection: every directed
    /// edge is treated as bidirectional purely for grouping. Components and
    /// their members come out in node insertion order.
    pub fn components(&self) -> Vec<Vec<&str>> {
        let mut union = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            union.union(edge.source().index(), edge.target().index());
        }

        let mut slots: HashMap<usize, usize> = HashMap::new();
        let mut components: Vec<Vec<&str>> = Vec::new();
        for index in self.graph.node_indices() {
            let representative = union.find(index.index());
            let slot = *slots.entry(representative).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(self.graph[index].as_str());
        }
        components
    }
}

fn intern(
    graph: &mut DiGraph<String, String>,
    nodes: &mut HashMap<String, NodeIndex>,
    id: &str,
) -> NodeIndex {
    if let Some(&index) = nodes.get(id) {
        return index;
    }
    let index = graph.add_node(id.to_string());
    nodes.insert(id.to_string(), index);
    index
}
