//! Drag-and-drop core: payload classification, reorder primitives, and the
//! drop resolver that turns a finished gesture into a new board.

pub mod gesture;
pub mod payload;
pub mod reorder;
pub mod resolver;

pub use gesture::{CardHover, ColumnHover, DragSession, GesturePhase};
pub use payload::{Edge, Payload, PayloadKind, PayloadRecord, Rect, classify};
pub use resolver::{DropOutcome, Resolution, resolve_drop};
