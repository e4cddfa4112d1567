// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deterministic grid placement.

use crate::geometry::{Extent, Point};
use crate::graph::Graph;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Fixed-column grid, filled row-major in node order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Nodes per row
    pub columns: usize,
    /// Distance between neighbouring cells
    pub cell: Extent,
    /// Position of the first cell
    pub origin: Point,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            cell: Extent::new(280.0, 160.0),
            origin: Point::new(60.0, 60.0),
        }
    }
}

impl GridLayout {
    /// Position of the `index`-th cell
    pub fn position_for(&self, index: usize) -> Point {
        let columns = self.columns.max(1);
        let (row, col) = (index / columns, index % columns);
        Point::new(
            self.origin.x + col as f32 * self.cell.width,
            self.origin.y + row as f32 * self.cell.height,
        )
    }

    /// Re-place every node. The result depends only on node count and order.
    pub fn apply(&self, graph: &mut Graph) -> Vec<(NodeId, Point)> {
        let placed: Vec<_> = graph
            .nodes_mut()
            .enumerate()
            .map(|(index, node)| {
                node.position = self.position_for(index);
                (node.id.clone(), node.position)
            })
            .collect();
        tracing::debug!("Grid layout placed {} node(s)", placed.len());
        placed
    }
}

/// Apply the default grid layout
pub fn apply_grid_layout(graph: &mut Graph) -> Vec<(NodeId, Point)> {
    GridLayout::default().apply(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NodeCatalog;

    #[test]
    fn test_grid_positions() {
        let layout = GridLayout::default();
        assert_eq!(layout.position_for(0), Point::new(60.0, 60.0));
        assert_eq!(layout.position_for(3), Point::new(900.0, 60.0));
        assert_eq!(layout.position_for(4), Point::new(60.0, 220.0));
        assert_eq!(layout.position_for(9), Point::new(340.0, 380.0));
    }

    #[test]
    fn test_layout_ignores_prior_positions() {
        let catalog = NodeCatalog::builtin();
        let mut a = Graph::default();
        let mut b = Graph::default();
        for i in 0..6 {
            a.add_node(&catalog, "Extrude", Some(Point::new(i as f32 * 7.0, -3.0)));
            b.add_node(&catalog, "Extrude", None);
        }

        let placed_a: Vec<_> = apply_grid_layout(&mut a).into_iter().map(|(_, p)| p).collect();
        let placed_b: Vec<_> = apply_grid_layout(&mut b).into_iter().map(|(_, p)| p).collect();
        assert_eq!(placed_a, placed_b);

        let again: Vec<_> = apply_grid_layout(&mut a).into_iter().map(|(_, p)| p).collect();
        assert_eq!(placed_a, again);
    }

    #[test]
    fn test_zero_columns_is_single_column() {
        let layout = GridLayout { columns: 0, ..GridLayout::default() };
        assert_eq!(layout.position_for(2), Point::new(60.0, 380.0));
    }
}
