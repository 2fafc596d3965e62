//! # Membership Graph
//!
//! An in-memory directed graph of principals and resources, built fresh for a
//! single resolution and discarded afterwards.
//!
//! Nodes live in an arena of slots and edges refer to their endpoints by id,
//! so cycles (a group that transitively contains itself) are just data. Every
//! traversal keeps a visited set keyed by node id and therefore terminates on
//! any graph.
//!
//! ```text
//! u:cam:nico ──member──▶ g:cam:team ──manager──▶ c:cam:doc
//!                            ▲   │
//!                            │   member
//!                         member ▼
//!                        g:cam:inner
//! ```

use std::collections::{HashMap, HashSet};

/// A graph node: an id and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<N> {
    /// Node id
    pub id: String,
    /// Attributes recorded when the node was first added
    pub attrs: N,
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<E> {
    /// Source node id
    pub from: String,
    /// Target node id
    pub to: String,
    /// Attributes recorded when the edge was first added
    pub attrs: E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outbound,
    Inbound,
}

/// Directed graph with idempotent mutation and cycle-safe traversal.
///
/// All operations are total: unknown ids are treated as absent.
///
/// # Example
///
/// ```
/// use platform_rbac::graph::MembershipGraph;
///
/// let mut graph: MembershipGraph<(), &str> = MembershipGraph::new();
/// graph.add_edge("a", "b", "member");
/// graph.add_edge("b", "a", "member");
///
/// // The second write is a no-op and keeps the original attributes
/// assert!(graph.add_edge("a", "b", "manager").is_none());
/// assert_eq!(graph.get_edge("a", "b").unwrap().attrs, "member");
///
/// let ids: Vec<&str> = graph.traverse_out("a").iter().map(|n| n.id.as_str()).collect();
/// assert_eq!(ids, vec!["a", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct MembershipGraph<N = (), E = ()> {
    /// Node arena; removed nodes leave an empty slot so insertion order holds
    nodes: Vec<Option<Node<N>>>,
    node_slots: HashMap<String, usize>,
    /// Edge arena, same layout as the node arena
    edges: Vec<Option<Edge<E>>>,
    edge_slots: HashMap<(String, String), usize>,
    /// Edge slots leaving each node, in insertion order
    outbound: HashMap<String, Vec<usize>>,
    /// Edge slots entering each node, in insertion order
    inbound: HashMap<String, Vec<usize>>,
}

impl<N, E> Default for MembershipGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> MembershipGraph<N, E> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_slots: HashMap::new(),
            edges: Vec::new(),
            edge_slots: HashMap::new(),
            outbound: HashMap::new(),
            inbound: HashMap::new(),
        }
    }

    /// Insert a node if it is absent.
    ///
    /// Returns the new node, or `None` if a node with this id already existed.
    /// An existing node's attributes are never overwritten.
    pub fn add_node(&mut self, id: impl Into<String>, attrs: N) -> Option<&Node<N>> {
        let id = id.into();
        if self.node_slots.contains_key(&id) {
            return None;
        }

        let slot = self.nodes.len();
        self.node_slots.insert(id.clone(), slot);
        self.nodes.push(Some(Node { id, attrs }));
        self.nodes[slot].as_ref()
    }

    /// Insert a directed edge if it is absent.
    ///
    /// Missing endpoints are created with default attributes. Returns the new
    /// edge, or `None` if the edge already existed (its attributes are kept).
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        attrs: E,
    ) -> Option<&Edge<E>>
    where
        N: Default,
    {
        let from = from.into();
        let to = to.into();
        let key = (from.clone(), to.clone());
        if self.edge_slots.contains_key(&key) {
            return None;
        }

        self.add_node(from.clone(), N::default());
        self.add_node(to.clone(), N::default());

        let slot = self.edges.len();
        self.edge_slots.insert(key, slot);
        self.outbound.entry(from.clone()).or_default().push(slot);
        self.inbound.entry(to.clone()).or_default().push(slot);
        self.edges.push(Some(Edge { from, to, attrs }));
        self.edges[slot].as_ref()
    }

    /// Delete a node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node<N>> {
        let slot = self.node_slots.remove(id)?;

        let mut touching = self.outbound.remove(id).unwrap_or_default();
        touching.extend(self.inbound.remove(id).unwrap_or_default());
        for edge_slot in touching {
            self.detach_edge(edge_slot);
        }

        self.nodes[slot].take()
    }

    /// Delete exactly one edge; both endpoints stay in the graph.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> Option<Edge<E>> {
        let slot = *self.edge_slots.get(&(from.to_string(), to.to_string()))?;
        self.detach_edge(slot)
    }

    fn detach_edge(&mut self, slot: usize) -> Option<Edge<E>> {
        let edge = self.edges.get_mut(slot)?.take()?;
        self.edge_slots.remove(&(edge.from.clone(), edge.to.clone()));
        if let Some(slots) = self.outbound.get_mut(&edge.from) {
            slots.retain(|s| *s != slot);
        }
        if let Some(slots) = self.inbound.get_mut(&edge.to) {
            slots.retain(|s| *s != slot);
        }
        Some(edge)
    }

    /// Look up a node by id.
    pub fn get_node(&self, id: &str) -> Option<&Node<N>> {
        self.node_slots
            .get(id)
            .and_then(|slot| self.nodes[*slot].as_ref())
    }

    /// Look up the edge between two nodes.
    pub fn get_edge(&self, from: &str, to: &str) -> Option<&Edge<E>> {
        self.edge_slots
            .get(&(from.to_string(), to.to_string()))
            .and_then(|slot| self.edges[*slot].as_ref())
    }

    /// Check whether a node exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_slots.contains_key(id)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<N>> + '_ {
        self.nodes.iter().flatten()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<E>> + '_ {
        self.edges.iter().flatten()
    }

    /// Edges leaving a node, in insertion order.
    pub fn outbound_edges<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge<E>> + 'a {
        self.adjacent(id, Direction::Outbound)
            .iter()
            .filter_map(move |slot| self.edges[*slot].as_ref())
    }

    /// Edges entering a node, in insertion order.
    pub fn inbound_edges<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge<E>> + 'a {
        self.adjacent(id, Direction::Inbound)
            .iter()
            .filter_map(move |slot| self.edges[*slot].as_ref())
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_slots.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edge_slots.len()
    }

    /// Check whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_slots.is_empty()
    }

    /// Depth-first traversal along outbound edges, start node first.
    ///
    /// Each reachable node is emitted once. Edges are followed in the order
    /// they were added and each child subtree is finished before the next
    /// sibling is visited.
    pub fn traverse_out(&self, start: &str) -> Vec<&Node<N>> {
        self.traverse(start, Direction::Outbound)
    }

    /// Depth-first traversal along inbound edges, start node first.
    pub fn traverse_in(&self, start: &str) -> Vec<&Node<N>> {
        self.traverse(start, Direction::Inbound)
    }

    fn adjacent(&self, id: &str, direction: Direction) -> &[usize] {
        let adjacency = match direction {
            Direction::Outbound => &self.outbound,
            Direction::Inbound => &self.inbound,
        };
        adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn traverse(&self, start: &str, direction: Direction) -> Vec<&Node<N>> {
        let Some(start) = self.get_node(start) else {
            return Vec::new();
        };

        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(start.id.as_str());
        let mut order = vec![start];

        // Explicit stack of (node, next edge index) frames, equivalent to a
        // recursive pre-order walk without the recursion depth.
        let mut stack: Vec<(&str, usize)> = vec![(start.id.as_str(), 0)];
        while let Some(frame) = stack.last_mut() {
            let (id, cursor) = *frame;
            let Some(&slot) = self.adjacent(id, direction).get(cursor) else {
                stack.pop();
                continue;
            };
            frame.1 += 1;

            let Some(edge) = self.edges[slot].as_ref() else {
                continue;
            };
            let next = match direction {
                Direction::Outbound => edge.to.as_str(),
                Direction::Inbound => edge.from.as_str(),
            };
            if visited.insert(next) {
                if let Some(node) = self.get_node(next) {
                    order.push(node);
                    stack.push((next, 0));
                }
            }
        }

        order
    }
}
