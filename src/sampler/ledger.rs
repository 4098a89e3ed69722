//! Degree ledger enforcing the edge budget and per-node cap while sampling.

use petgraph::graphmap::UnGraphMap;

use crate::graph::Edge;

/// What happened to a proposed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Added,
    /// The budget is spent; nothing more will be accepted.
    BudgetExhausted,
    /// One endpoint already has `per_node_cap` edges.
    CapReached,
    /// The undirected pair was already linked.
    Duplicate,
    /// Self-pair, id outside `1..=N`, or non-positive weight.
    Invalid,
}

/// Accumulates sampled edges for one `sample` call and is then discarded.
///
/// Incidence is tracked in an undirected petgraph map, which also rejects
/// a second edge between the same pair in either direction.
pub struct EdgeLedger {
    degrees: UnGraphMap<u32, ()>,
    edges: Vec<Edge>,
    node_count: usize,
    budget: usize,
    per_node_cap: usize,
    rejected: usize,
}

impl EdgeLedger {
    /// Create an empty ledger.
    pub fn new(node_count: usize, budget: usize, per_node_cap: usize) -> Self {
        Self {
            degrees: UnGraphMap::with_capacity(budget.min(node_count), budget),
            edges: Vec::with_capacity(budget),
            node_count,
            budget,
            per_node_cap,
            rejected: 0,
        }
    }

    /// Whether `id` can appear in an edge at all.
    #[inline]
    pub fn accepts(&self, id: u32) -> bool {
        id >= 1 && id as usize <= self.node_count
    }

    /// True once the budget is spent.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.edges.len() >= self.budget
    }

    /// Sampled edges incident to `id` so far.
    pub fn degree(&self, id: u32) -> usize {
        if self.degrees.contains_node(id) {
            self.degrees.neighbors(id).count()
        } else {
            0
        }
    }

    /// Most edges any node may take.
    #[inline]
    pub fn per_node_cap(&self) -> usize {
        self.per_node_cap
    }

    /// Whether `id` can take one more edge.
    #[inline]
    pub fn has_capacity(&self, id: u32) -> bool {
        self.degree(id) < self.per_node_cap
    }

    /// Propose the edge `source - target`.
    pub fn link(&mut self, source: u32, target: u32, weight: f32) -> LinkOutcome {
        let outcome = self.check(source, target, weight);
        if outcome == LinkOutcome::Added {
            self.degrees.add_edge(source, target, ());
            self.edges.push(Edge::new(source, target, weight));
        } else {
            self.rejected += 1;
        }
        outcome
    }

    fn check(&self, source: u32, target: u32, weight: f32) -> LinkOutcome {
        if self.is_full() {
            return LinkOutcome::BudgetExhausted;
        }
        if source == target
            || !self.accepts(source)
            || !self.accepts(target)
            || !(weight.is_finite() && weight > 0.0)
        {
            return LinkOutcome::Invalid;
        }
        if self.degrees.contains_edge(source, target) {
            return LinkOutcome::Duplicate;
        }
        if !self.has_capacity(source) || !self.has_capacity(target) {
            return LinkOutcome::CapReached;
        }
        LinkOutcome::Added
    }

    /// Link each id to the next one in `ids`. Returns false once the budget
    /// is spent.
    pub fn link_consecutive(&mut self, ids: &[u32], weight: f32) -> bool {
        for pair in ids.windows(2) {
            if self.link(pair[0], pair[1], weight) == LinkOutcome::BudgetExhausted {
                return false;
            }
        }
        !self.is_full()
    }

    /// Number of accepted edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if no edge was accepted.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of proposals turned down.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Accepted edges in the order they were proposed.
    pub fn into_edges(self) -> Vec<Edge> {
        self.edges
    }
}
