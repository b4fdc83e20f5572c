pub mod board;
pub mod cli;
pub mod dnd;
pub mod logging;
pub mod settings;
pub mod storage;
pub mod types;
