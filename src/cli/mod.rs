use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Args, Subcommand};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{
    board::{BoardStore, seed::seed_board},
    dnd::{
        Edge, PayloadRecord, Rect,
        payload::{
            attach_closest_edge, card_data, card_drop_target_data, column_data,
            column_drop_target_data,
        },
    },
    settings::Settings,
    storage::{BoardStorage, JsonFileStorage},
    types::{Board, Card, Column, Filter},
};

const SCHEMA_VERSION: &str = "cli.v1";

#[derive(Debug, Clone, Subcommand)]
pub enum RootCommand {
    Board {
        #[command(subcommand)]
        command: BoardCommand,
    },
    Column {
        #[command(subcommand)]
        command: ColumnCommand,
    },
    Card {
        #[command(subcommand)]
        command: CardCommand,
    },
    Selection {
        #[command(subcommand)]
        command: SelectionCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BoardCommand {
    Show(BoardShowArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum ColumnCommand {
    Add(ColumnAddArgs),
    Rename(ColumnRenameArgs),
    Delete(ColumnIdArgs),
    SelectAll(ColumnIdArgs),
    Move(ColumnMoveArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum CardCommand {
    Add(CardAddArgs),
    Edit(CardEditArgs),
    Delete(CardIdArgs),
    ToggleComplete(CardIdArgs),
    ToggleSelect(CardIdArgs),
    Move(CardMoveArgs),
}

#[derive(Debug, Clone, Subcommand)]
pub enum SelectionCommand {
    Delete,
    Complete,
    Incomplete,
    Clear,
}

#[derive(Debug, Clone, Default, Args)]
pub struct BoardShowArgs {
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    #[arg(long, value_name = "all|completed|incomplete")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnAddArgs {
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnRenameArgs {
    #[arg(long, value_name = "COLUMN_ID")]
    pub id: String,

    #[arg(long, value_name = "TEXT")]
    pub title: String,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnIdArgs {
    #[arg(long, value_name = "COLUMN_ID")]
    pub id: String,
}

#[derive(Debug, Clone, Args)]
pub struct ColumnMoveArgs {
    #[arg(long, value_name = "COLUMN_ID")]
    pub id: String,

    #[arg(long, value_name = "COLUMN_ID")]
    pub onto: String,
}

#[derive(Debug, Clone, Args)]
pub struct CardAddArgs {
    #[arg(long, value_name = "COLUMN_ID")]
    pub column: String,

    #[arg(long, value_name = "TEXT")]
    pub text: String,
}

#[derive(Debug, Clone, Args)]
pub struct CardEditArgs {
    #[arg(long, value_name = "CARD_ID")]
    pub id: String,

    #[arg(long, value_name = "TEXT")]
    pub text: String,
}

#[derive(Debug, Clone, Args)]
pub struct CardIdArgs {
    #[arg(long, value_name = "CARD_ID")]
    pub id: String,
}

#[derive(Debug, Clone, Args)]
#[group(id = "card_destination", required = true, multiple = false)]
pub struct CardDestinationArgs {
    /// Drop onto this card
    #[arg(long, value_name = "CARD_ID", group = "card_destination")]
    pub onto: Option<String>,

    /// Drop onto the empty area of this column
    #[arg(long, value_name = "COLUMN_ID", group = "card_destination")]
    pub column: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CardMoveArgs {
    #[arg(long, value_name = "CARD_ID")]
    pub id: String,

    #[command(flatten)]
    pub destination: CardDestinationArgs,

    #[arg(long, value_name = "top|bottom")]
    pub edge: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub json: bool,
    pub quiet: bool,
    pub data_file: Option<PathBuf>,
}

pub fn run(options: &CliOptions, command: RootCommand) -> i32 {
    let settings = Settings::load();
    match execute(&settings, options, command) {
        Ok(output) => {
            print_success(output, options.json, options.quiet);
            0
        }
        Err(err) => {
            print_error(&err, options.json);
            err.exit_code
        }
    }
}

struct CommandOutput {
    command: &'static str,
    data: Value,
    text: String,
}

#[derive(Debug)]
struct CliError {
    exit_code: i32,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

type CliResult<T> = Result<T, CliError>;

fn execute(
    settings: &Settings,
    options: &CliOptions,
    command: RootCommand,
) -> CliResult<CommandOutput> {
    let path = options
        .data_file
        .clone()
        .unwrap_or_else(|| settings.data_path());
    let storage = JsonFileStorage::new(path);

    // an unreadable file is reported rather than silently replaced
    let board = match storage.load() {
        Ok(Some(board)) => board,
        Ok(None) => seed_board(),
        Err(err) => {
            return Err(CliError {
                exit_code: 5,
                code: "BOARD_UNREADABLE",
                message: format!("{err:#}"),
                details: Some(json!({ "path": storage.path().display().to_string() })),
            });
        }
    };

    let mut store = BoardStore::new(board)
        .with_new_column_title(settings.new_column_title.as_str())
        .with_filter(settings.filter());
    let before = store.snapshot();

    let output = match command {
        RootCommand::Board { command } => execute_board_command(&mut store, command),
        RootCommand::Column { command } => execute_column_command(&mut store, command),
        RootCommand::Card { command } => execute_card_command(&mut store, command),
        RootCommand::Selection { command } => execute_selection_command(&mut store, command),
    }?;

    let changed = !Arc::ptr_eq(&before, &store.snapshot());
    if changed {
        storage.save(store.board()).map_err(runtime_error)?;
    }
    info!(command = output.command, changed, "cli command applied");

    Ok(output)
}

fn execute_board_command(store: &mut BoardStore, command: BoardCommand) -> CliResult<CommandOutput> {
    match command {
        BoardCommand::Show(args) => board_show(store, args),
    }
}

fn execute_column_command(
    store: &mut BoardStore,
    command: ColumnCommand,
) -> CliResult<CommandOutput> {
    match command {
        ColumnCommand::Add(args) => column_add(store, args),
        ColumnCommand::Rename(args) => column_rename(store, args),
        ColumnCommand::Delete(args) => column_delete(store, args),
        ColumnCommand::SelectAll(args) => column_select_all(store, args),
        ColumnCommand::Move(args) => column_move(store, args),
    }
}

fn execute_card_command(store: &mut BoardStore, command: CardCommand) -> CliResult<CommandOutput> {
    match command {
        CardCommand::Add(args) => card_add(store, args),
        CardCommand::Edit(args) => card_edit(store, args),
        CardCommand::Delete(args) => card_delete(store, args),
        CardCommand::ToggleComplete(args) => card_toggle(store, args, Toggle::Complete),
        CardCommand::ToggleSelect(args) => card_toggle(store, args, Toggle::Select),
        CardCommand::Move(args) => card_move(store, args),
    }
}

fn execute_selection_command(
    store: &mut BoardStore,
    command: SelectionCommand,
) -> CliResult<CommandOutput> {
    let before = store.board().selected_count();
    let (name, changed) = match command {
        SelectionCommand::Delete => ("selection delete", store.delete_selected()),
        SelectionCommand::Complete => ("selection complete", store.mark_selected_complete()),
        SelectionCommand::Incomplete => ("selection incomplete", store.mark_selected_incomplete()),
        SelectionCommand::Clear => ("selection clear", store.clear_selection()),
    };

    Ok(CommandOutput {
        command: name,
        data: json!({ "changed": changed, "selected_before": before }),
        text: if changed {
            format!("{name}: applied to {before} selected card(s)")
        } else {
            "no change".to_string()
        },
    })
}

fn board_show(store: &mut BoardStore, args: BoardShowArgs) -> CliResult<CommandOutput> {
    if let Some(raw) = args.filter.as_deref() {
        let filter = Filter::from_str(raw).map_err(|()| {
            usage_error(
                "INVALID_FILTER",
                format!("unknown filter '{raw}' (expected all, completed, or incomplete)"),
            )
        })?;
        store.set_filter(filter);
    }
    if let Some(term) = args.search {
        store.set_search_term(term);
    }

    let view = store.view();
    let columns = store
        .board()
        .columns
        .iter()
        .map(|column| {
            let visible = view.visible_cards(column);
            json!({
                "id": column.id,
                "title": column.title,
                "visible": visible.len(),
                "total": column.cards.len(),
                "cards": visible.iter().map(|card| card_json(card)).collect::<Vec<_>>(),
            })
        })
        .collect::<Vec<_>>();

    Ok(CommandOutput {
        command: "board show",
        data: json!({
            "filter": view.filter.as_str(),
            "search": view.search_term,
            "columns": columns,
        }),
        text: render_board_text(store),
    })
}

fn render_board_text(store: &BoardStore) -> String {
    let board = store.board();
    if board.columns.is_empty() {
        return "No columns found.".to_string();
    }

    let view = store.view();
    let headers = ["ID", "Done", "Sel", "Description"];
    board
        .columns
        .iter()
        .map(|column| {
            let visible = view.visible_cards(column);
            let heading = format!(
                "{} ({}) [{}/{}]",
                column.title,
                column.id,
                visible.len(),
                column.cards.len()
            );
            if visible.is_empty() {
                return format!("{heading}\n  No cards.");
            }
            let rows = visible
                .iter()
                .map(|card| {
                    vec![
                        card.id.clone(),
                        if card.completed { "x" } else { " " }.to_string(),
                        if card.selected { "*" } else { " " }.to_string(),
                        card.description.replace('\n', " "),
                    ]
                })
                .collect::<Vec<_>>();
            format!("{heading}\n{}", render_text_table(&headers, &rows))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|width| "-".repeat(*width + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let render_row = |cells: Vec<&str>| {
        format!(
            "| {} |",
            cells
                .iter()
                .enumerate()
                .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
                .collect::<Vec<_>>()
                .join(" | ")
        )
    };

    let mut lines = vec![border.clone(), render_row(headers.to_vec()), border.clone()];
    for row in rows {
        lines.push(render_row(row.iter().map(String::as_str).collect()));
    }
    lines.push(border);
    lines.join("\n")
}

fn column_add(store: &mut BoardStore, args: ColumnAddArgs) -> CliResult<CommandOutput> {
    let title = args
        .title
        .as_deref()
        .map(|raw| require_text(raw, "title"))
        .transpose()?;
    let id = store
        .add_column()
        .ok_or_else(|| runtime_error("failed to add column"))?;
    if let Some(title) = title {
        store.edit_column(&id, title);
    }

    let column = require_column(store.board(), &id)?;
    Ok(CommandOutput {
        command: "column add",
        data: json!({ "column": column_json(column) }),
        text: format!("added column {} ({})", column.title, column.id),
    })
}

fn column_rename(store: &mut BoardStore, args: ColumnRenameArgs) -> CliResult<CommandOutput> {
    require_column(store.board(), &args.id)?;
    let title = require_text(&args.title, "title")?;
    let changed = store.edit_column(&args.id, title);

    let column = require_column(store.board(), &args.id)?;
    Ok(CommandOutput {
        command: "column rename",
        data: json!({ "changed": changed, "column": column_json(column) }),
        text: change_text(changed, format!("renamed column {} to {}", column.id, column.title)),
    })
}

fn column_delete(store: &mut BoardStore, args: ColumnIdArgs) -> CliResult<CommandOutput> {
    let removed_cards = require_column(store.board(), &args.id)?.cards.len();
    store.delete_column(&args.id);

    Ok(CommandOutput {
        command: "column delete",
        data: json!({ "id": args.id, "removed_cards": removed_cards }),
        text: format!("deleted column {} and {removed_cards} card(s)", args.id),
    })
}

fn column_select_all(store: &mut BoardStore, args: ColumnIdArgs) -> CliResult<CommandOutput> {
    require_column(store.board(), &args.id)?;
    let changed = store.select_all(&args.id);

    Ok(CommandOutput {
        command: "column select-all",
        data: json!({ "changed": changed, "id": args.id }),
        text: change_text(changed, format!("selected every card in {}", args.id)),
    })
}

fn column_move(store: &mut BoardStore, args: ColumnMoveArgs) -> CliResult<CommandOutput> {
    let board = store.snapshot();
    let source = column_data(require_column(&board, &args.id)?);
    let target = column_drop_target_data(require_column(&board, &args.onto)?);

    let outcome = store.apply_drop(&source, &[target]);
    let order = store
        .board()
        .columns
        .iter()
        .map(|column| column.id.clone())
        .collect::<Vec<_>>();

    Ok(CommandOutput {
        command: "column move",
        data: json!({ "changed": outcome.is_some(), "order": order }),
        text: change_text(outcome.is_some(), format!("column order: {}", order.join(", "))),
    })
}

fn card_add(store: &mut BoardStore, args: CardAddArgs) -> CliResult<CommandOutput> {
    require_column(store.board(), &args.column)?;
    let text = require_text(&args.text, "text")?;
    let id = store
        .add_card(&args.column, text)
        .ok_or_else(|| runtime_error("failed to add card"))?;

    let card = require_card(store.board(), &id)?;
    Ok(CommandOutput {
        command: "card add",
        data: json!({ "column_id": args.column, "card": card_json(card) }),
        text: format!("added card {} to {}", card.id, args.column),
    })
}

fn card_edit(store: &mut BoardStore, args: CardEditArgs) -> CliResult<CommandOutput> {
    require_card(store.board(), &args.id)?;
    let text = require_text(&args.text, "text")?;
    let changed = store.edit_card(&args.id, text);

    let card = require_card(store.board(), &args.id)?;
    Ok(CommandOutput {
        command: "card edit",
        data: json!({ "changed": changed, "card": card_json(card) }),
        text: change_text(changed, format!("updated card {}", card.id)),
    })
}

fn card_delete(store: &mut BoardStore, args: CardIdArgs) -> CliResult<CommandOutput> {
    require_card(store.board(), &args.id)?;
    store.delete_card(&args.id);

    Ok(CommandOutput {
        command: "card delete",
        data: json!({ "id": args.id }),
        text: format!("deleted card {}", args.id),
    })
}

enum Toggle {
    Complete,
    Select,
}

fn card_toggle(store: &mut BoardStore, args: CardIdArgs, toggle: Toggle) -> CliResult<CommandOutput> {
    require_card(store.board(), &args.id)?;
    let command = match toggle {
        Toggle::Complete => {
            store.toggle_complete(&args.id);
            "card toggle-complete"
        }
        Toggle::Select => {
            store.toggle_select(&args.id);
            "card toggle-select"
        }
    };

    let card = require_card(store.board(), &args.id)?;
    Ok(CommandOutput {
        command,
        data: json!({ "card": card_json(card) }),
        text: format!(
            "card {}: completed={} selected={}",
            card.id, card.completed, card.selected
        ),
    })
}

/// Replays the move as a drag gesture so it goes through the same drop
/// resolution the board uses.
fn card_move(store: &mut BoardStore, args: CardMoveArgs) -> CliResult<CommandOutput> {
    let edge = args
        .edge
        .as_deref()
        .map(|raw| {
            Edge::from_str(raw).map_err(|()| {
                usage_error(
                    "INVALID_EDGE",
                    format!("unknown edge '{raw}' (expected top or bottom)"),
                )
            })
        })
        .transpose()?;

    let board = store.snapshot();
    let source = card_source(&board, &args.id)?;
    let targets = match (&args.destination.onto, &args.destination.column) {
        (Some(target_id), _) => card_target_stack(&board, target_id, edge)?,
        (None, Some(column_id)) => vec![column_drop_target_data(require_column(
            &board, column_id,
        )?)],
        (None, None) => {
            return Err(usage_error(
                "CARD_DESTINATION_REQUIRED",
                "provide --onto or --column",
            ));
        }
    };

    let outcome = store.apply_drop(&source, &targets);
    let location = store.board().find_card(&args.id).map(|(column_idx, card_idx)| {
        json!({
            "column_id": store.board().columns[column_idx].id,
            "index": card_idx,
        })
    });

    Ok(CommandOutput {
        command: "card move",
        data: json!({
            "changed": outcome.is_some(),
            "outcome": outcome.as_ref().map(|outcome| format!("{outcome:?}")),
            "location": location,
        }),
        text: change_text(outcome.is_some(), format!("moved card {}", args.id)),
    })
}

fn card_source(board: &Board, card_id: &str) -> CliResult<PayloadRecord> {
    let (column_idx, card_idx) = board
        .find_card(card_id)
        .ok_or_else(|| card_not_found(card_id))?;
    let column = &board.columns[column_idx];
    Ok(card_data(&column.cards[card_idx], &column.id, Rect::default()))
}

/// Innermost card target first, then the column it sits in.
fn card_target_stack(
    board: &Board,
    card_id: &str,
    edge: Option<Edge>,
) -> CliResult<Vec<PayloadRecord>> {
    let (column_idx, card_idx) = board
        .find_card(card_id)
        .ok_or_else(|| card_not_found(card_id))?;
    let column = &board.columns[column_idx];
    Ok(vec![
        attach_closest_edge(
            card_drop_target_data(&column.cards[card_idx], &column.id),
            edge,
        ),
        column_drop_target_data(column),
    ])
}

fn require_text<'a>(raw: &'a str, field: &str) -> CliResult<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(usage_error(
            "INVALID_INPUT",
            format!("{field} cannot be empty"),
        ));
    }
    Ok(trimmed)
}

fn require_column<'a>(board: &'a Board, column_id: &str) -> CliResult<&'a Column> {
    board.column(column_id).ok_or_else(|| {
        not_found_error(
            "COLUMN_NOT_FOUND",
            format!("column '{column_id}' not found"),
        )
    })
}

fn require_card<'a>(board: &'a Board, card_id: &str) -> CliResult<&'a Card> {
    board.card(card_id).ok_or_else(|| card_not_found(card_id))
}

fn card_not_found(card_id: &str) -> CliError {
    not_found_error("CARD_NOT_FOUND", format!("card '{card_id}' not found"))
}

fn change_text(changed: bool, text: String) -> String {
    if changed { text } else { "no change".to_string() }
}

fn card_json(card: &Card) -> Value {
    json!({
        "id": card.id,
        "description": card.description,
        "completed": card.completed,
        "selected": card.selected,
    })
}

fn column_json(column: &Column) -> Value {
    json!({
        "id": column.id,
        "title": column.title,
        "cards": column.cards.iter().map(card_json).collect::<Vec<_>>(),
    })
}

fn usage_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 2,
        code,
        message: message.into(),
        details: None,
    }
}

fn not_found_error(code: &'static str, message: impl Into<String>) -> CliError {
    CliError {
        exit_code: 3,
        code,
        message: message.into(),
        details: None,
    }
}

fn runtime_error(err: impl std::fmt::Display) -> CliError {
    CliError {
        exit_code: 5,
        code: "RUNTIME_ERROR",
        message: err.to_string(),
        details: None,
    }
}

fn print_success(output: CommandOutput, json_output: bool, quiet: bool) {
    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "command": output.command,
            "data": output.data
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => println!("{value}"),
            Err(_) => println!("{}", payload),
        }
        return;
    }

    if quiet {
        return;
    }

    if output.text.is_empty() {
        println!("ok");
    } else {
        println!("{}", output.text);
    }
}

fn print_error(err: &CliError, json_output: bool) {
    error!(
        code = err.code,
        message = %err.message,
        details = ?err.details,
        "cli command failed"
    );

    if json_output {
        let payload = json!({
            "schema_version": SCHEMA_VERSION,
            "error": {
                "code": err.code,
                "message": err.message,
                "details": err.details
            }
        });
        match serde_json::to_string_pretty(&payload) {
            Ok(value) => eprintln!("{value}"),
            Err(_) => eprintln!("{}", payload),
        }
        return;
    }

    eprintln!("error[{}]: {}", err.code, err.message);
}
