use crate::types::{Board, Card, Column};

fn seed_cards(next_id: &mut usize, amount: usize) -> Vec<Card> {
    (0..amount)
        .map(|_| {
            let id = *next_id;
            *next_id += 1;
            Card::new(format!("card:{id}"), format!("Card {id}"))
        })
        .collect()
}

/// Board shown when nothing has been persisted yet. Ids are deterministic.
pub fn seed_board() -> Board {
    let mut next_id = 0;
    let mut monday = Column::new("column:a", "Monday");
    monday.cards = seed_cards(&mut next_id, 4);
    let mut tuesday = Column::new("column:b", "Tuesday");
    tuesday.cards = seed_cards(&mut next_id, 8);

    Board {
        columns: vec![monday, tuesday],
    }
}
