//! Drag and drop-target payloads.
//!
//! Payloads travel through the gesture source as opaque JSON object records.
//! Every record produced here carries a discriminant under [`PAYLOAD_KEY`];
//! records without it (other drag sources on the page, foreign libraries)
//! classify as `None` and are ignored by the resolver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::types::{Card, Column};

const PAYLOAD_KEY: &str = "__todo_board:payload:4f1c9e";
const CLOSEST_EDGE_KEY: &str = "__todo_board:closest-edge:4f1c9e";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadRecord(Map<String, Value>);

impl PayloadRecord {
    /// Wraps an arbitrary JSON object. Non-objects become an empty record,
    /// which never classifies.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn tagged(kind: PayloadKind, body: Value) -> Self {
        let mut record = Self::from_value(body);
        record
            .0
            .insert(PAYLOAD_KEY.to_string(), Value::from(kind.as_str()));
        record
    }

    fn kind(&self) -> Option<PayloadKind> {
        self.0
            .get(PAYLOAD_KEY)
            .and_then(Value::as_str)
            .and_then(|raw| PayloadKind::from_str(raw).ok())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PayloadKind {
    Card,
    CardDropTarget,
    Column,
    ColumnDropTarget,
}

impl PayloadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadKind::Card => "card",
            PayloadKind::CardDropTarget => "card-drop-target",
            PayloadKind::Column => "column",
            PayloadKind::ColumnDropTarget => "column-drop-target",
        }
    }
}

impl FromStr for PayloadKind {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "card" => Ok(PayloadKind::Card),
            "card-drop-target" => Ok(PayloadKind::CardDropTarget),
            "column" => Ok(PayloadKind::Column),
            "column-drop-target" => Ok(PayloadKind::ColumnDropTarget),
            _ => Err(()),
        }
    }
}

/// Which half of the target the pointer was closest to on release.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
}

impl Edge {
    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

impl FromStr for Edge {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "top" => Ok(Edge::Top),
            "bottom" => Ok(Edge::Bottom),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounding box of the dragged element at drag start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraggingCard {
    pub card: Card,
    pub column_id: String,
    #[serde(default)]
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDropTarget {
    pub card: Card,
    pub column_id: String,
    #[serde(skip)]
    pub closest_edge: Option<Edge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnData {
    pub column: Column,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Card(DraggingCard),
    CardDropTarget(CardDropTarget),
    Column(ColumnData),
    ColumnDropTarget(ColumnData),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Card(_) => PayloadKind::Card,
            Payload::CardDropTarget(_) => PayloadKind::CardDropTarget,
            Payload::Column(_) => PayloadKind::Column,
            Payload::ColumnDropTarget(_) => PayloadKind::ColumnDropTarget,
        }
    }

    /// Column id for either column payload kind.
    pub fn column_target_id(&self) -> Option<&str> {
        match self {
            Payload::Column(data) | Payload::ColumnDropTarget(data) => Some(&data.column.id),
            _ => None,
        }
    }
}

pub fn card_data(card: &Card, column_id: &str, rect: Rect) -> PayloadRecord {
    PayloadRecord::tagged(
        PayloadKind::Card,
        json!({ "card": card, "columnId": column_id, "rect": rect }),
    )
}

pub fn card_drop_target_data(card: &Card, column_id: &str) -> PayloadRecord {
    PayloadRecord::tagged(
        PayloadKind::CardDropTarget,
        json!({ "card": card, "columnId": column_id }),
    )
}

pub fn column_data(column: &Column) -> PayloadRecord {
    PayloadRecord::tagged(PayloadKind::Column, json!({ "column": column }))
}

pub fn column_drop_target_data(column: &Column) -> PayloadRecord {
    PayloadRecord::tagged(PayloadKind::ColumnDropTarget, json!({ "column": column }))
}

/// Records the closest edge on a drop-target record. Called by the hitbox
/// layer each time the pointer moves over a card.
pub fn attach_closest_edge(mut record: PayloadRecord, edge: Option<Edge>) -> PayloadRecord {
    match edge {
        Some(edge) => {
            record
                .0
                .insert(CLOSEST_EDGE_KEY.to_string(), Value::from(edge.as_str()));
        }
        None => {
            record.0.remove(CLOSEST_EDGE_KEY);
        }
    }
    record
}

/// Unknown edge values read as absent.
pub fn extract_closest_edge(record: &PayloadRecord) -> Option<Edge> {
    record
        .0
        .get(CLOSEST_EDGE_KEY)
        .and_then(Value::as_str)
        .and_then(|raw| Edge::from_str(raw).ok())
}

pub fn classify(record: &PayloadRecord) -> Option<Payload> {
    let kind = record.kind()?;
    let body = Value::Object(record.0.clone());
    let parsed = match kind {
        PayloadKind::Card => serde_json::from_value(body).map(Payload::Card),
        PayloadKind::CardDropTarget => {
            serde_json::from_value::<CardDropTarget>(body).map(|mut target| {
                target.closest_edge = extract_closest_edge(record);
                Payload::CardDropTarget(target)
            })
        }
        PayloadKind::Column => serde_json::from_value(body).map(Payload::Column),
        PayloadKind::ColumnDropTarget => serde_json::from_value(body).map(Payload::ColumnDropTarget),
    };

    match parsed {
        Ok(payload) => Some(payload),
        Err(error) => {
            debug!(kind = kind.as_str(), %error, "ignoring malformed payload");
            None
        }
    }
}

pub fn is_card_data(record: &PayloadRecord) -> bool {
    matches!(classify(record), Some(Payload::Card(_)))
}

pub fn is_card_drop_target_data(record: &PayloadRecord) -> bool {
    matches!(classify(record), Some(Payload::CardDropTarget(_)))
}

/// True for both the draggable column header and the column body target.
pub fn is_column_data(record: &PayloadRecord) -> bool {
    matches!(
        classify(record),
        Some(Payload::Column(_) | Payload::ColumnDropTarget(_))
    )
}

pub fn is_column_drop_target_data(record: &PayloadRecord) -> bool {
    matches!(classify(record), Some(Payload::ColumnDropTarget(_)))
}

pub fn is_dragging_a_card(source: &PayloadRecord) -> bool {
    is_card_data(source)
}

pub fn is_dragging_a_column(source: &PayloadRecord) -> bool {
    matches!(classify(source), Some(Payload::Column(_)))
}
