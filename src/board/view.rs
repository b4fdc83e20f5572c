use regex::RegexBuilder;
use serde::Serialize;

use crate::types::{Board, Card, Column, Filter};

/// Visibility settings. Changing them never touches board data.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ViewState {
    pub search_term: String,
    pub filter: Filter,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ColumnCount {
    pub column_id: String,
    pub visible: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

pub fn matches_search(card: &Card, term: &str) -> bool {
    term.is_empty()
        || card
            .description
            .to_lowercase()
            .contains(&term.to_lowercase())
}

impl ViewState {
    pub fn new(search_term: impl Into<String>, filter: Filter) -> Self {
        Self {
            search_term: search_term.into(),
            filter,
        }
    }

    /// A card shows iff it passes the completion filter and the search.
    pub fn is_visible(&self, card: &Card) -> bool {
        self.filter.allows(card) && matches_search(card, &self.search_term)
    }

    pub fn visible_cards<'a>(&self, column: &'a Column) -> Vec<&'a Card> {
        column
            .cards
            .iter()
            .filter(|card| self.is_visible(card))
            .collect()
    }

    pub fn visible_counts(&self, board: &Board) -> Vec<ColumnCount> {
        board
            .columns
            .iter()
            .map(|column| ColumnCount {
                column_id: column.id.clone(),
                visible: column
                    .cards
                    .iter()
                    .filter(|card| self.is_visible(card))
                    .count(),
                total: column.cards.len(),
            })
            .collect()
    }
}

/// Splits `text` into runs that do and do not match `term`, ignoring case.
/// The term is matched literally.
pub fn highlight_segments<'a>(text: &'a str, term: &str) -> Vec<Segment<'a>> {
    let unmatched = vec![Segment {
        text,
        matched: false,
    }];
    if term.is_empty() || text.is_empty() {
        return unmatched;
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    else {
        return unmatched;
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push(Segment {
                text: &text[cursor..found.start()],
                matched: false,
            });
        }
        segments.push(Segment {
            text: found.as_str(),
            matched: true,
        });
        cursor = found.end();
    }
    if cursor < text.len() {
        segments.push(Segment {
            text: &text[cursor..],
            matched: false,
        });
    }
    segments
}
