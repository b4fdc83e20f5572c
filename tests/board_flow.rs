use std::fs;
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;

use todo_board::board::{Action, BoardStore, ViewState, highlight_segments, seed::seed_board};
use todo_board::dnd::payload::{
    attach_closest_edge, card_data, card_drop_target_data, column_data, column_drop_target_data,
};
use todo_board::dnd::{
    CardHover, ColumnHover, DragSession, DropOutcome, Edge, GesturePhase, Rect,
};
use todo_board::storage::{BoardStorage, JsonFileStorage};
use todo_board::types::{Board, Filter};

fn card_ids(board: &Board, column_idx: usize) -> Vec<&str> {
    board.columns[column_idx]
        .cards
        .iter()
        .map(|card| card.id.as_str())
        .collect()
}

#[test]
fn edits_survive_reopening_the_board_file() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("nested").join("todo-app-data.json");

    let mut store = BoardStore::open(JsonFileStorage::new(&path));
    assert_eq!(store.board(), &seed_board());
    assert!(!path.exists());

    let column_id = store.add_column().expect("column should be added");
    store.edit_column(&column_id, "Wednesday");
    let card_id = store
        .add_card(&column_id, "  Call the plumber  ")
        .expect("card should be added");
    store.toggle_complete(&card_id);
    store.delete_card("card:3");

    let reopened = BoardStore::open(JsonFileStorage::new(&path));
    assert_eq!(reopened.board(), store.board());
    let card = reopened.board().card(&card_id).expect("card should persist");
    assert_eq!(card.description, "Call the plumber");
    assert!(card.completed);
    assert_eq!(reopened.board().columns[2].title, "Wednesday");
    assert!(reopened.board().card("card:3").is_none());
    Ok(())
}

#[test]
fn corrupt_board_file_falls_back_to_seed() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("todo-app-data.json");
    fs::write(&path, r#"{"columns":[{"id":"column:a","title":"x","cards":[]},{"id":"column:a","title":"y","cards":[]}]}"#)?;

    assert!(JsonFileStorage::new(&path).load().is_err());
    let store = BoardStore::open(JsonFileStorage::new(&path));
    assert_eq!(store.board(), &seed_board());
    Ok(())
}

#[test]
fn dragging_a_card_across_columns() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("board.json");
    let mut store = BoardStore::open(JsonFileStorage::new(&path));
    let mut session = DragSession::new();

    let board = store.snapshot();
    let monday = &board.columns[0];
    let tuesday = &board.columns[1];
    assert!(session.start(card_data(&monday.cards[1], &monday.id, Rect::default())));
    assert_eq!(session.phase(), GesturePhase::Active);
    assert_eq!(session.card_hover("card:1"), CardHover::Dragging);

    let targets = vec![
        attach_closest_edge(
            card_drop_target_data(&tuesday.cards[2], &tuesday.id),
            Some(Edge::Top),
        ),
        column_drop_target_data(tuesday),
    ];
    session.update(targets.clone());
    assert_eq!(session.card_hover("card:6"), CardHover::Over);
    assert_eq!(
        session.column_hover("column:b"),
        ColumnHover::CardOver {
            over_child_card: true
        }
    );
    assert_eq!(session.column_hover("column:a"), ColumnHover::Idle);

    let resolution = session
        .drop(store.board(), &targets)
        .expect("drop should resolve");
    assert_eq!(session.phase(), GesturePhase::Resolved);
    assert!(session.drop(store.board(), &targets).is_none());
    assert_eq!(
        resolution.outcome,
        DropOutcome::CardMoved {
            card_id: "card:1".to_string(),
            from_column: "column:a".to_string(),
            to_column: "column:b".to_string(),
            index: 2,
        }
    );
    assert!(store.replace(resolution.board));

    assert_eq!(card_ids(store.board(), 0), ["card:0", "card:2", "card:3"]);
    assert_eq!(
        card_ids(store.board(), 1),
        ["card:4", "card:5", "card:1", "card:6", "card:7", "card:8", "card:9", "card:10", "card:11"]
    );
    let stored = JsonFileStorage::new(&path)
        .load()?
        .expect("board should be stored");
    assert_eq!(&stored, store.board());
    Ok(())
}

#[test]
fn drop_uses_the_latest_card_state() {
    let mut store = BoardStore::new(seed_board());
    let board = store.snapshot();
    let monday = &board.columns[0];
    let source = card_data(&monday.cards[0], &monday.id, Rect::default());

    // card edited while the drag is in flight
    assert!(store.edit_card("card:0", "Renamed mid-drag"));
    assert!(store.toggle_complete("card:0"));

    let tuesday = store.board().columns[1].clone();
    let outcome = store
        .apply_drop(&source, &[column_drop_target_data(&tuesday)])
        .expect("drop should apply");
    assert!(matches!(outcome, DropOutcome::CardAppended { .. }));

    let moved = store
        .board()
        .columns[1]
        .cards
        .last()
        .expect("column should have cards");
    assert_eq!(moved.id, "card:0");
    assert_eq!(moved.description, "Renamed mid-drag");
    assert!(moved.completed);
    assert_eq!(store.board().card_count(), 12);
}

#[test]
fn drop_of_deleted_card_changes_nothing() {
    let mut store = BoardStore::new(seed_board());
    let board = store.snapshot();
    let monday = &board.columns[0];
    let tuesday = &board.columns[1];
    let source = card_data(&monday.cards[0], &monday.id, Rect::default());
    let target = attach_closest_edge(
        card_drop_target_data(&tuesday.cards[0], &tuesday.id),
        Some(Edge::Bottom),
    );

    assert!(store.delete_card("card:0"));
    let before = store.snapshot();
    assert!(store.apply_drop(&source, &[target]).is_none());
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn reordering_columns_by_header_drag() {
    let mut store = BoardStore::new(seed_board());
    let wednesday = store.add_column().expect("column should be added");
    store.edit_column(&wednesday, "Wednesday");

    let board = store.snapshot();
    let mut session = DragSession::new();
    assert!(session.start(column_data(&board.columns[2])));
    let targets = vec![column_drop_target_data(&board.columns[0])];
    session.update(targets.clone());
    assert_eq!(session.column_hover(&wednesday), ColumnHover::Dragging);
    assert_eq!(session.column_hover("column:a"), ColumnHover::ColumnOver);

    let resolution = session
        .drop(store.board(), &targets)
        .expect("drop should resolve");
    assert!(store.replace(resolution.board));

    let titles = store
        .board()
        .columns
        .iter()
        .map(|column| column.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, ["Wednesday", "Monday", "Tuesday"]);
}

#[test]
fn cancelled_gesture_leaves_board_alone() {
    let store = BoardStore::new(seed_board());
    let board = store.snapshot();
    let mut session = DragSession::new();
    assert!(session.start(card_data(&board.columns[0].cards[0], "column:a", Rect::default())));
    session.cancel();

    assert_eq!(session.phase(), GesturePhase::Idle);
    assert!(session.drop(store.board(), &[]).is_none());
    assert_eq!(store.board(), &seed_board());
}

#[test]
fn bulk_actions_and_view_through_dispatch() {
    let mut store = BoardStore::new(seed_board());
    for action in [
        Action::SelectAll("column:a".to_string()),
        Action::ToggleSelect("card:4".to_string()),
        Action::MarkSelectedComplete,
        Action::ClearSelection,
        Action::ToggleSelect("card:11".to_string()),
        Action::DeleteSelected,
    ] {
        assert!(store.dispatch(action));
    }

    assert_eq!(store.board().card_count(), 11);
    assert_eq!(store.board().selected_count(), 0);
    assert!(store.dispatch(Action::SetFilter(Filter::Completed)));

    let counts = store.visible_counts();
    assert_eq!(counts[0].visible, 4);
    assert_eq!(counts[1].visible, 1);
    assert_eq!(counts[1].total, 7);

    let view = ViewState::new("card 1", Filter::Incomplete);
    let visible = view
        .visible_cards(&store.board().columns[1])
        .into_iter()
        .map(|card| card.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(visible, ["card:10"]);

    let segments = highlight_segments("Card 10", "card 1");
    assert_eq!(segments[0].text, "Card 1");
    assert!(segments[0].matched);
    assert_eq!(segments[1].text, "0");
}
