use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Card {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub selected: bool,
}

impl Card {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            completed: false,
            selected: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            cards: Vec::new(),
        }
    }

    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id == card_id)
    }
}

/// Root aggregate. Always replaced as a whole snapshot, never edited in place
/// once published by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Board {
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BoardIntegrityError {
    DuplicateColumnId(String),
    DuplicateCardId(String),
}

impl fmt::Display for BoardIntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumnId(id) => write!(f, "duplicate column id '{id}'"),
            Self::DuplicateCardId(id) => write!(f, "duplicate card id '{id}'"),
        }
    }
}

impl std::error::Error for BoardIntegrityError {}

impl Board {
    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.id == column_id)
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    /// Locates a card as `(column index, card index)`.
    pub fn find_card(&self, card_id: &str) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(column_idx, column)| {
                column
                    .card_index(card_id)
                    .map(|card_idx| (column_idx, card_idx))
            })
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        let (column_idx, card_idx) = self.find_card(card_id)?;
        self.columns[column_idx].cards.get(card_idx)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.columns.iter().flat_map(|column| column.cards.iter())
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|column| column.cards.len()).sum()
    }

    pub fn selected_count(&self) -> usize {
        self.cards().filter(|card| card.selected).count()
    }

    /// Checks the identity invariants: column ids unique, card ids unique
    /// across the whole board (which also rules out a card living in two
    /// columns).
    pub fn validate(&self) -> Result<(), BoardIntegrityError> {
        let mut column_ids = HashSet::new();
        let mut card_ids = HashSet::new();
        for column in &self.columns {
            if !column_ids.insert(column.id.as_str()) {
                return Err(BoardIntegrityError::DuplicateColumnId(column.id.clone()));
            }
            for card in &column.cards {
                if !card_ids.insert(card.id.as_str()) {
                    return Err(BoardIntegrityError::DuplicateCardId(card.id.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Completion filter applied on top of the search term.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl Filter {
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Completed => "completed",
            Filter::Incomplete => "incomplete",
        }
    }

    pub fn allows(self, card: &Card) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => card.completed,
            Filter::Incomplete => !card.completed,
        }
    }
}

impl FromStr for Filter {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "completed" | "done" => Ok(Filter::Completed),
            "incomplete" | "uncompleted" | "open" => Ok(Filter::Incomplete),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
