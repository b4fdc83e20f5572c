//! One drag gesture at a time: idle → active → resolved.
//!
//! Nothing touches the board before `drop`, so cancelling is simply
//! forgetting the active payload.

use tracing::debug;

use super::payload::{Payload, PayloadRecord, classify};
use super::resolver::{Resolution, resolve_drop};
use crate::types::Board;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GesturePhase {
    Idle,
    Active,
    Resolved,
}

/// Presentational highlight for a column while something is dragged.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ColumnHover {
    Idle,
    Dragging,
    CardOver { over_child_card: bool },
    ColumnOver,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CardHover {
    Idle,
    Dragging,
    Over,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Active {
        source: PayloadRecord,
        dragging: Payload,
        hovered: Vec<PayloadRecord>,
    },
    Resolved,
}

#[derive(Debug, Clone)]
pub struct DragSession {
    state: State,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn phase(&self) -> GesturePhase {
        match self.state {
            State::Idle => GesturePhase::Idle,
            State::Active { .. } => GesturePhase::Active,
            State::Resolved => GesturePhase::Resolved,
        }
    }

    /// Begins a gesture. Only cards and column headers are draggable; any
    /// other payload is ignored and the session stays where it was.
    pub fn start(&mut self, source: PayloadRecord) -> bool {
        if matches!(self.state, State::Active { .. }) {
            debug!("drag start ignored: a gesture is already active");
            return false;
        }
        let Some(dragging @ (Payload::Card(_) | Payload::Column(_))) = classify(&source) else {
            debug!("drag start ignored: source is not a card or column");
            return false;
        };
        self.state = State::Active {
            source,
            dragging,
            hovered: Vec::new(),
        };
        true
    }

    /// Drag enter/leave: records the hovered target stack, innermost first.
    pub fn update(&mut self, drop_targets: Vec<PayloadRecord>) {
        if let State::Active { hovered, .. } = &mut self.state {
            *hovered = drop_targets;
        }
    }

    /// Resolves the gesture once. A second drop, or a drop without an
    /// active gesture, yields `None`.
    pub fn drop(&mut self, board: &Board, drop_targets: &[PayloadRecord]) -> Option<Resolution> {
        if !matches!(self.state, State::Active { .. }) {
            debug!("drop ignored: no active gesture");
            return None;
        }
        let State::Active { source, .. } = std::mem::replace(&mut self.state, State::Resolved)
        else {
            return None;
        };
        resolve_drop(board, &source, drop_targets)
    }

    /// Released outside any drop target or aborted by the host.
    pub fn cancel(&mut self) {
        if matches!(self.state, State::Active { .. }) {
            debug!("drag gesture cancelled");
        }
        self.state = State::Idle;
    }

    pub fn column_hover(&self, column_id: &str) -> ColumnHover {
        let State::Active {
            dragging, hovered, ..
        } = &self.state
        else {
            return ColumnHover::Idle;
        };

        let hovering_this_column = hovered
            .iter()
            .filter_map(classify)
            .any(|target| target.column_target_id() == Some(column_id));

        match dragging {
            Payload::Column(data) if data.column.id == column_id => ColumnHover::Dragging,
            Payload::Column(_) if hovering_this_column => ColumnHover::ColumnOver,
            Payload::Card(_) if hovering_this_column => {
                let over_child_card = hovered
                    .first()
                    .and_then(classify)
                    .is_some_and(|target| matches!(target, Payload::CardDropTarget(_)));
                ColumnHover::CardOver { over_child_card }
            }
            _ => ColumnHover::Idle,
        }
    }

    pub fn card_hover(&self, card_id: &str) -> CardHover {
        let State::Active {
            dragging, hovered, ..
        } = &self.state
        else {
            return CardHover::Idle;
        };
        let Payload::Card(dragging) = dragging else {
            return CardHover::Idle;
        };
        if dragging.card.id == card_id {
            return CardHover::Dragging;
        }

        match hovered.first().and_then(classify) {
            Some(Payload::CardDropTarget(target)) if target.card.id == card_id => CardHover::Over,
            _ => CardHover::Idle,
        }
    }
}
