//! Compatibility Graph
//!
//! A pre-fetched adjacency structure of "discount declares type compatible"
//! facts. Discount nodes point at the type nodes they accept.

use petgraph::{Direction, graphmap::DiGraphMap};
use smallvec::SmallVec;

use crate::{
    compatibility::{CompatibilityLookup, error::CompatibilityGraphError},
    discounts::{DiscountId, DiscountType},
};

/// Node weight in a compatibility graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum CompatibilityNode {
    Discount(DiscountId),
    Type(DiscountType),
}

/// Declared compatibility between discounts and discount types.
///
/// A discount that was registered without edges accepts no other type. A
/// discount that was never registered has no compatibility record at all.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityGraph {
    graph: DiGraphMap<CompatibilityNode, ()>,
}

impl CompatibilityGraph {
    /// Build a graph from `(discount, compatible type)` pairs.
    pub fn from_edges(edges: impl IntoIterator<Item = (DiscountId, DiscountType)>) -> Self {
        let mut graph = DiGraphMap::new();

        for (discount, kind) in edges {
            graph.add_edge(
                CompatibilityNode::Discount(discount),
                CompatibilityNode::Type(kind),
                (),
            );
        }

        Self { graph }
    }

    /// Whether the graph holds a compatibility record for `discount`.
    #[must_use]
    pub fn contains(&self, discount: DiscountId) -> bool {
        self.graph.contains_node(CompatibilityNode::Discount(discount))
    }

    /// Types `discount` declares itself compatible with, or `None` when unrecorded.
    #[must_use]
    pub fn declared_types(&self, discount: DiscountId) -> Option<SmallVec<[DiscountType; 5]>> {
        let node = CompatibilityNode::Discount(discount);

        if !self.graph.contains_node(node) {
            return None;
        }

        let mut types: SmallVec<[DiscountType; 5]> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .filter_map(|neighbour| match neighbour {
                CompatibilityNode::Type(kind) => Some(kind),
                CompatibilityNode::Discount(_) => None,
            })
            .collect();

        types.sort_unstable();

        Some(types)
    }

    /// Number of discounts with a compatibility record.
    #[must_use]
    pub fn discount_count(&self) -> usize {
        self.graph
            .nodes()
            .filter(|node| matches!(node, CompatibilityNode::Discount(_)))
            .count()
    }
}

impl CompatibilityLookup for CompatibilityGraph {
    fn is_declared_compatible(&self, discount: DiscountId, target: DiscountType) -> Option<bool> {
        let node = CompatibilityNode::Discount(discount);

        self.graph
            .contains_node(node)
            .then(|| self.graph.contains_edge(node, CompatibilityNode::Type(target)))
    }
}

/// Builder for a [`CompatibilityGraph`].
///
/// Each discount's declarations are supplied exactly once.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityGraphBuilder {
    graph: DiGraphMap<CompatibilityNode, ()>,
}

impl CompatibilityGraphBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `discount` has compatibility data, without accepting any type.
    ///
    /// # Errors
    ///
    /// Returns [`CompatibilityGraphError::AlreadyDeclared`] if the discount was
    /// already registered.
    pub fn register(
        &mut self,
        discount: DiscountId,
    ) -> Result<&mut Self, CompatibilityGraphError> {
        let node = CompatibilityNode::Discount(discount);

        if self.graph.contains_node(node) {
            return Err(CompatibilityGraphError::AlreadyDeclared(discount));
        }

        self.graph.add_node(node);

        Ok(self)
    }

    /// Declare the full set of types `discount` accepts.
    ///
    /// # Errors
    ///
    /// Returns [`CompatibilityGraphError::AlreadyDeclared`] if the discount was
    /// already registered.
    pub fn declare(
        &mut self,
        discount: DiscountId,
        compatible_with: impl IntoIterator<Item = DiscountType>,
    ) -> Result<&mut Self, CompatibilityGraphError> {
        self.register(discount)?;

        let node = CompatibilityNode::Discount(discount);

        for kind in compatible_with {
            self.graph.add_edge(node, CompatibilityNode::Type(kind), ());
        }

        Ok(self)
    }

    /// Finish building the graph.
    #[must_use]
    pub fn build(self) -> CompatibilityGraph {
        CompatibilityGraph { graph: self.graph }
    }
}
