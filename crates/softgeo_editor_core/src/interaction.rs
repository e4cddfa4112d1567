// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer interaction state machine.
//!
//! Translates canvas-space pointer events into selection changes, multi-node
//! drags, single-node resizes and marquee selection. Nothing here knows about
//! pixels or widgets; the host feeds canvas coordinates and renders the
//! resulting [`PointerOutcome`]s.
//!
//! Features:
//! - Click to select, toggle-click to extend/shrink the selection
//! - Uniform-delta dragging of the whole selection with grid snap on release
//! - Resize from a grip in the node's bottom-right corner
//! - Marquee selection on empty canvas
//! - Cancellation on pointer-capture loss

use crate::selection::Selection;
use softgeo_editor_graph::{Extent, Graph, NodeId, Point, Rect};

/// Modifier keys relevant to pointer handling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Toggle membership instead of replacing the selection (Ctrl-click)
    pub toggle: bool,
}

impl Modifiers {
    /// No modifier held
    pub const NONE: Self = Self { toggle: false };
    /// Toggle modifier held
    pub const TOGGLE: Self = Self { toggle: true };
}

/// Marquee selection state
#[derive(Debug, Clone, PartialEq)]
pub struct Marquee {
    /// Where the gesture started
    pub start: Point,
    /// Current normalized rectangle
    pub rect: Rect,
}

/// Interaction mode
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionMode {
    /// No gesture in progress
    #[default]
    Idle,
    /// Marquee in progress
    RectSelecting(Marquee),
    /// Selected nodes following the pointer
    Dragging {
        /// Pointer position at drag start
        anchor: Point,
        /// Latest pointer position
        last: Point,
        /// Position of every dragged node at drag start
        start_positions: Vec<(NodeId, Point)>,
    },
    /// A single node being resized
    Resizing {
        /// Node being resized
        node: NodeId,
        /// Node size at resize start
        start_size: Extent,
        /// Pointer position at resize start
        start_pointer: Point,
        /// Latest pointer position
        last: Point,
    },
}

/// What a hit test found under the pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    /// Node body
    Node(NodeId),
    /// Resize grip of a node
    ResizeGrip(NodeId),
}

/// Result of feeding one pointer event to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Event had no effect
    None,
    /// A drag was armed on a node
    DragStarted {
        /// Whether the press changed the selection
        selection_changed: bool,
    },
    /// A resize was armed
    ResizeStarted {
        /// Node being resized
        node: NodeId,
        /// Whether the press changed the selection
        selection_changed: bool,
    },
    /// A marquee was started on empty canvas
    MarqueeStarted,
    /// Dragged nodes moved (uncommitted)
    Dragged(Vec<(NodeId, Point)>),
    /// Node was resized (uncommitted)
    Resized(NodeId, Extent),
    /// Marquee rectangle changed
    MarqueeChanged(Rect),
    /// Drag ended
    DragFinished {
        /// Final positions
        positions: Vec<(NodeId, Point)>,
        /// Whether any node ended somewhere other than its start position
        moved: bool,
    },
    /// Resize ended
    ResizeFinished {
        /// Resized node
        node: NodeId,
        /// Final size
        size: Extent,
        /// Whether the size differs from the start size
        changed: bool,
    },
    /// Marquee ended
    MarqueeFinished {
        /// Whether the selection differs from before
        selection_changed: bool,
    },
}

/// Pointer interaction controller
#[derive(Debug, Clone)]
pub struct InteractionController {
    mode: InteractionMode,
    snap_size: f32,
    resize_grip: f32,
}

impl InteractionController {
    /// Create a controller
    pub fn new(snap_size: f32, resize_grip: f32) -> Self {
        Self {
            mode: InteractionMode::Idle,
            snap_size,
            resize_grip,
        }
    }

    /// Current mode
    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    /// Whether a gesture is in progress
    pub fn is_idle(&self) -> bool {
        self.mode == InteractionMode::Idle
    }

    /// Drop any gesture without touching the graph
    pub fn reset(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    /// Topmost node under `point`
    pub fn hit_test(&self, graph: &Graph, point: Point) -> Option<Hit> {
        let node = graph.nodes().rev().find(|n| n.bounds().contains(point))?;
        let max = node.bounds().max();
        if point.x >= max.x - self.resize_grip && point.y >= max.y - self.resize_grip {
            Some(Hit::ResizeGrip(node.id.clone()))
        } else {
            Some(Hit::Node(node.id.clone()))
        }
    }

    /// Pointer pressed. Ignored while another gesture is in progress.
    pub fn pointer_down(
        &mut self,
        graph: &Graph,
        selection: &mut Selection,
        point: Point,
        modifiers: Modifiers,
    ) -> PointerOutcome {
        if !self.is_idle() {
            tracing::debug!("Pointer down ignored during {:?}", self.mode);
            return PointerOutcome::None;
        }

        let before = selection.clone();
        match self.hit_test(graph, point) {
            Some(Hit::ResizeGrip(id)) => {
                let Some(node) = graph.node(&id) else {
                    return PointerOutcome::None;
                };
                selection.select_only(id.clone());
                self.mode = InteractionMode::Resizing {
                    node: id.clone(),
                    start_size: node.size,
                    start_pointer: point,
                    last: point,
                };
                PointerOutcome::ResizeStarted {
                    node: id,
                    selection_changed: *selection != before,
                }
            }
            Some(Hit::Node(id)) => {
                if modifiers.toggle {
                    selection.toggle(id);
                } else {
                    selection.select_only(id);
                }
                let start_positions = selection
                    .iter()
                    .filter_map(|id| graph.node(id).map(|n| (id.clone(), n.position)))
                    .collect();
                self.mode = InteractionMode::Dragging {
                    anchor: point,
                    last: point,
                    start_positions,
                };
                PointerOutcome::DragStarted {
                    selection_changed: *selection != before,
                }
            }
            None => {
                self.mode = InteractionMode::RectSelecting(Marquee {
                    start: point,
                    rect: Rect::from_corners(point, point),
                });
                PointerOutcome::MarqueeStarted
            }
        }
    }

    /// Pointer moved
    pub fn pointer_move(&mut self, graph: &mut Graph, point: Point) -> PointerOutcome {
        match &mut self.mode {
            InteractionMode::Idle => PointerOutcome::None,
            InteractionMode::RectSelecting(marquee) => {
                marquee.rect = Rect::from_corners(marquee.start, point);
                PointerOutcome::MarqueeChanged(marquee.rect)
            }
            InteractionMode::Dragging {
                anchor,
                last,
                start_positions,
            } => {
                *last = point;
                let positions = translate(graph, start_positions, point - *anchor, None);
                PointerOutcome::Dragged(positions)
            }
            InteractionMode::Resizing {
                node,
                start_size,
                start_pointer,
                last,
            } => {
                *last = point;
                let delta = point - *start_pointer;
                let requested = Extent::new(start_size.width + delta.x, start_size.height + delta.y);
                match graph.resize_node(node, requested) {
                    Ok(size) => PointerOutcome::Resized(node.clone(), size),
                    Err(_) => PointerOutcome::None,
                }
            }
        }
    }

    /// Pointer released: snaps dragged nodes, commits marquee selection
    pub fn pointer_up(&mut self, graph: &mut Graph, selection: &mut Selection, point: Point) -> PointerOutcome {
        match std::mem::take(&mut self.mode) {
            InteractionMode::Idle => PointerOutcome::None,
            InteractionMode::RectSelecting(marquee) => {
                let hits = marquee_hits(graph, &Rect::from_corners(marquee.start, point));
                let before = selection.clone();
                selection.replace(hits);
                PointerOutcome::MarqueeFinished {
                    selection_changed: *selection != before,
                }
            }
            InteractionMode::Dragging {
                anchor,
                start_positions,
                ..
            } => {
                let delta = point - anchor;
                let snap = (delta != Point::ZERO).then_some(self.snap_size);
                let positions = translate(graph, &start_positions, delta, snap);
                let moved = any_moved(&start_positions, &positions);
                PointerOutcome::DragFinished { positions, moved }
            }
            InteractionMode::Resizing {
                node,
                start_size,
                start_pointer,
                ..
            } => {
                let delta = point - start_pointer;
                let requested = Extent::new(start_size.width + delta.x, start_size.height + delta.y);
                match graph.resize_node(&node, requested) {
                    Ok(size) => PointerOutcome::ResizeFinished {
                        changed: size != start_size,
                        node,
                        size,
                    },
                    Err(_) => PointerOutcome::None,
                }
            }
        }
    }

    /// Pointer capture lost. Ends the gesture where it is, without snapping.
    ///
    /// A marquee is dropped without changing the selection.
    pub fn cancel(&mut self, graph: &Graph) -> PointerOutcome {
        match std::mem::take(&mut self.mode) {
            InteractionMode::Idle => PointerOutcome::None,
            InteractionMode::RectSelecting(_) => PointerOutcome::MarqueeFinished {
                selection_changed: false,
            },
            InteractionMode::Dragging { start_positions, .. } => {
                let positions: Vec<_> = start_positions
                    .iter()
                    .filter_map(|(id, _)| graph.node(id).map(|n| (id.clone(), n.position)))
                    .collect();
                let moved = any_moved(&start_positions, &positions);
                PointerOutcome::DragFinished { positions, moved }
            }
            InteractionMode::Resizing { node, start_size, .. } => match graph.node(&node) {
                Some(n) => PointerOutcome::ResizeFinished {
                    changed: n.size != start_size,
                    size: n.size,
                    node,
                },
                None => PointerOutcome::None,
            },
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(10.0, 12.0)
    }
}

/// Nodes whose bounds overlap `rect`, in z-order
pub fn marquee_hits(graph: &Graph, rect: &Rect) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| rect.intersects(&n.bounds()))
        .map(|n| n.id.clone())
        .collect()
}

/// Whether any node ended up away from where the gesture started
fn any_moved(start_positions: &[(NodeId, Point)], positions: &[(NodeId, Point)]) -> bool {
    positions.iter().any(|(id, position)| {
        start_positions
            .iter()
            .any(|(start_id, start)| start_id == id && start != position)
    })
}

/// Move every node to `start + delta`, optionally snapped. Skips nodes that vanished.
fn translate(
    graph: &mut Graph,
    start_positions: &[(NodeId, Point)],
    delta: Point,
    snap: Option<f32>,
) -> Vec<(NodeId, Point)> {
    start_positions
        .iter()
        .filter_map(|(id, start)| {
            let mut position = *start + delta;
            if let Some(step) = snap {
                position = position.snapped(step);
            }
            graph.move_node(id, position).ok().map(|()| (id.clone(), position))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use softgeo_editor_graph::{Node, NodeCatalog};

    fn setup(positions: &[Point]) -> (Graph, Vec<NodeId>) {
        let catalog = NodeCatalog::builtin();
        let mut graph = Graph::default();
        let ids = positions
            .iter()
            .map(|p| graph.add_node(&catalog, "Extrude", Some(*p)).id.clone())
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_drag_snaps_on_release() {
        let (mut graph, ids) = setup(&[Point::new(103.0, 57.0)]);
        let mut selection = Selection::new();
        let mut controller = InteractionController::default();

        let grab = Point::new(110.0, 60.0);
        let outcome = controller.pointer_down(&graph, &mut selection, grab, Modifiers::NONE);
        assert_eq!(outcome, PointerOutcome::DragStarted { selection_changed: true });

        controller.pointer_move(&mut graph, grab + Point::new(6.0, 2.0));
        assert_eq!(graph.node(&ids[0]).unwrap().position, Point::new(109.0, 59.0));

        let outcome = controller.pointer_up(&mut graph, &mut selection, grab + Point::new(12.0, 4.0));
        assert_eq!(
            outcome,
            PointerOutcome::DragFinished {
                positions: vec![(ids[0].clone(), Point::new(120.0, 60.0))],
                moved: true,
            }
        );
        assert_eq!(graph.node(&ids[0]).unwrap().position, Point::new(120.0, 60.0));
        assert!(controller.is_idle());
    }

    #[test]
    fn test_multi_drag_uses_uniform_delta() {
        let (mut graph, ids) = setup(&[Point::new(0.0, 0.0), Point::new(400.0, 300.0)]);
        let mut selection = Selection::with_nodes([ids[1].clone()]);
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(10.0, 10.0), Modifiers::TOGGLE);
        assert_eq!(selection.len(), 2);

        controller.pointer_move(&mut graph, Point::new(45.0, 30.0));
        controller.pointer_move(&mut graph, Point::new(40.0, 50.0));
        controller.pointer_up(&mut graph, &mut selection, Point::new(40.0, 50.0));

        assert_eq!(graph.node(&ids[0]).unwrap().position, Point::new(30.0, 40.0));
        assert_eq!(graph.node(&ids[1]).unwrap().position, Point::new(430.0, 340.0));
    }

    #[test]
    fn test_zero_delta_drag_is_not_a_move() {
        let (mut graph, ids) = setup(&[Point::new(103.0, 57.0)]);
        let mut selection = Selection::new();
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(110.0, 60.0), Modifiers::NONE);
        controller.pointer_move(&mut graph, Point::new(150.0, 90.0));
        let outcome = controller.pointer_up(&mut graph, &mut selection, Point::new(110.0, 60.0));

        assert!(matches!(outcome, PointerOutcome::DragFinished { moved: false, .. }));
        assert_eq!(graph.node(&ids[0]).unwrap().position, Point::new(103.0, 57.0));
    }

    #[test]
    fn test_toggle_click_deselects() {
        let (graph, ids) = setup(&[Point::ZERO, Point::new(300.0, 0.0)]);
        let mut selection = Selection::with_nodes(ids.clone());
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(10.0, 10.0), Modifiers::TOGGLE);
        assert_eq!(selection.to_vec(), [ids[1].clone()]);
        match controller.mode() {
            InteractionMode::Dragging { start_positions, .. } => {
                assert_eq!(start_positions, &vec![(ids[1].clone(), Point::new(300.0, 0.0))]);
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_click_without_modifier_replaces_selection() {
        let (graph, ids) = setup(&[Point::ZERO, Point::new(300.0, 0.0)]);
        let mut selection = Selection::with_nodes(ids.clone());
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(310.0, 10.0), Modifiers::NONE);
        assert_eq!(selection.to_vec(), [ids[1].clone()]);
    }

    #[test]
    fn test_topmost_node_wins() {
        let (graph, ids) = setup(&[Point::ZERO, Point::new(50.0, 50.0)]);
        let controller = InteractionController::default();
        assert_eq!(controller.hit_test(&graph, Point::new(60.0, 60.0)), Some(Hit::Node(ids[1].clone())));
        assert_eq!(controller.hit_test(&graph, Point::new(10.0, 10.0)), Some(Hit::Node(ids[0].clone())));
        assert_eq!(controller.hit_test(&graph, Point::new(-1.0, 10.0)), None);
    }

    fn insert_exact(graph: &mut Graph, min: Point, size: Extent) -> NodeId {
        let node = Node {
            size,
            ..Node::new("Extrude").with_position(min)
        };
        graph.insert_node(node).unwrap().id.clone()
    }

    #[test]
    fn test_marquee_hits_intersecting_bounds() {
        let mut graph = Graph::default();
        let near = insert_exact(&mut graph, Point::ZERO, Extent::new(100.0, 50.0));
        insert_exact(&mut graph, Point::new(200.0, 200.0), Extent::new(100.0, 50.0));

        let rect = Rect::from_corners(Point::ZERO, Point::new(150.0, 100.0));
        assert_eq!(marquee_hits(&graph, &rect), [near]);
    }

    #[test]
    fn test_marquee_selection() {
        let mut graph = Graph::default();
        let near = insert_exact(&mut graph, Point::new(10.0, 10.0), Extent::new(100.0, 50.0));
        insert_exact(&mut graph, Point::new(200.0, 200.0), Extent::new(100.0, 50.0));

        let mut selection = Selection::new();
        let mut controller = InteractionController::default();
        let outcome = controller.pointer_down(&graph, &mut selection, Point::ZERO, Modifiers::NONE);
        assert_eq!(outcome, PointerOutcome::MarqueeStarted);

        let outcome = controller.pointer_move(&mut graph, Point::new(150.0, 100.0));
        assert_eq!(
            outcome,
            PointerOutcome::MarqueeChanged(Rect::from_corners(Point::ZERO, Point::new(150.0, 100.0)))
        );

        let outcome = controller.pointer_up(&mut graph, &mut selection, Point::new(150.0, 100.0));
        assert_eq!(outcome, PointerOutcome::MarqueeFinished { selection_changed: true });
        assert_eq!(selection.to_vec(), [near]);
    }

    #[test]
    fn test_marquee_drawn_backwards() {
        let (mut graph, ids) = setup(&[Point::new(200.0, 200.0)]);
        let mut selection = Selection::new();
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(500.0, 500.0), Modifiers::NONE);
        controller.pointer_up(&mut graph, &mut selection, Point::new(250.0, 250.0));
        assert_eq!(selection.to_vec(), [ids[0].clone()]);
    }

    #[test]
    fn test_empty_click_clears_selection_on_release() {
        let (mut graph, ids) = setup(&[Point::ZERO]);
        let mut selection = Selection::with_nodes([ids[0].clone()]);
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(900.0, 900.0), Modifiers::NONE);
        assert_eq!(selection.len(), 1);
        controller.pointer_up(&mut graph, &mut selection, Point::new(900.0, 900.0));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_resize_from_grip() {
        let (mut graph, ids) = setup(&[Point::ZERO]);
        let mut selection = Selection::new();
        let mut controller = InteractionController::default();

        // Extrude default size is 240x140; grip covers the last 12 units
        let grip = Point::new(235.0, 135.0);
        let outcome = controller.pointer_down(&graph, &mut selection, grip, Modifiers::NONE);
        assert_eq!(
            outcome,
            PointerOutcome::ResizeStarted { node: ids[0].clone(), selection_changed: true }
        );

        let outcome = controller.pointer_move(&mut graph, grip + Point::new(-200.0, 40.0));
        assert_eq!(outcome, PointerOutcome::Resized(ids[0].clone(), Extent::new(160.0, 180.0)));

        let outcome = controller.pointer_up(&mut graph, &mut selection, grip + Point::new(60.0, 10.0));
        assert_eq!(
            outcome,
            PointerOutcome::ResizeFinished { node: ids[0].clone(), size: Extent::new(300.0, 150.0), changed: true }
        );
    }

    #[test]
    fn test_drag_snapping_back_to_start_is_not_a_move() {
        let (mut graph, ids) = setup(&[Point::new(100.0, 100.0)]);
        let mut selection = Selection::new();
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(110.0, 110.0), Modifiers::NONE);
        controller.pointer_move(&mut graph, Point::new(112.0, 112.0));
        let outcome = controller.pointer_up(&mut graph, &mut selection, Point::new(112.0, 112.0));

        assert_eq!(
            outcome,
            PointerOutcome::DragFinished {
                positions: vec![(ids[0].clone(), Point::new(100.0, 100.0))],
                moved: false,
            }
        );
    }

    #[test]
    fn test_drag_with_empty_selection_is_not_a_move() {
        let (mut graph, ids) = setup(&[Point::new(100.0, 100.0)]);
        let mut selection = Selection::with_nodes([ids[0].clone()]);
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(110.0, 110.0), Modifiers::TOGGLE);
        assert!(selection.is_empty());
        controller.pointer_move(&mut graph, Point::new(180.0, 150.0));
        let outcome = controller.pointer_up(&mut graph, &mut selection, Point::new(180.0, 150.0));

        assert_eq!(
            outcome,
            PointerOutcome::DragFinished {
                positions: Vec::new(),
                moved: false,
            }
        );
    }

    #[test]
    fn test_cancel_keeps_positions_unsnapped() {
        let (mut graph, ids) = setup(&[Point::new(103.0, 57.0)]);
        let mut selection = Selection::new();
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(110.0, 60.0), Modifiers::NONE);
        controller.pointer_move(&mut graph, Point::new(113.0, 61.0));
        let outcome = controller.cancel(&graph);

        assert_eq!(
            outcome,
            PointerOutcome::DragFinished {
                positions: vec![(ids[0].clone(), Point::new(106.0, 58.0))],
                moved: true,
            }
        );
        assert!(controller.is_idle());
    }

    #[test]
    fn test_cancel_without_movement() {
        let (graph, _) = setup(&[Point::ZERO]);
        let mut selection = Selection::new();
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(10.0, 10.0), Modifiers::NONE);
        assert!(matches!(controller.cancel(&graph), PointerOutcome::DragFinished { moved: false, .. }));
        assert_eq!(controller.cancel(&graph), PointerOutcome::None);
    }

    #[test]
    fn test_press_during_gesture_is_ignored() {
        let (graph, _) = setup(&[Point::ZERO]);
        let mut selection = Selection::new();
        let mut controller = InteractionController::default();

        controller.pointer_down(&graph, &mut selection, Point::new(900.0, 0.0), Modifiers::NONE);
        let outcome = controller.pointer_down(&graph, &mut selection, Point::new(10.0, 10.0), Modifiers::NONE);
        assert_eq!(outcome, PointerOutcome::None);
        assert!(selection.is_empty());
    }
}
