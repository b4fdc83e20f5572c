use std::path::PathBuf;

use clap::Parser;

use todo_board::{
    cli::{self, BoardCommand, BoardShowArgs, CliOptions, RootCommand},
    logging::init_logging,
};

#[derive(Parser, Debug)]
#[command(
    name = "todo-board",
    about = "Kanban-style to-do board",
    long_about = "Manage a board of columns and cards. Moves are resolved the same way a drag-and-drop gesture is.",
    version = env!("TODO_BOARD_BUILD_VERSION"),
    author
)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    quiet: bool,

    /// Board file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<RootCommand>,
}

fn main() {
    if let Err(err) = init_logging() {
        eprintln!("warning: failed to initialize logging: {err}");
    }

    let cli = Cli::parse();
    let options = CliOptions {
        json: cli.json,
        quiet: cli.quiet,
        data_file: cli.data_file,
    };
    let command = cli.command.unwrap_or(RootCommand::Board {
        command: BoardCommand::Show(BoardShowArgs::default()),
    });

    std::process::exit(cli::run(&options, command));
}
