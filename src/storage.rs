//! Board persistence. The store talks to a [`BoardStorage`]; the binary uses
//! a JSON file, tests use [`MemoryStorage`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};

use crate::types::Board;

pub const STORAGE_KEY: &str = "todo-app-data";

pub trait BoardStorage {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Board>>;
    fn save(&self, board: &Board) -> Result<()>;
}

pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todo-board")
}

pub fn default_data_path() -> PathBuf {
    get_data_dir().join(format!("{STORAGE_KEY}.json"))
}

fn parse_board(contents: &str) -> Result<Board> {
    let board: Board =
        serde_json::from_str(contents).context("failed to parse stored board JSON")?;
    board
        .validate()
        .context("stored board violates id invariants")?;
    Ok(board)
}

#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BoardStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Board>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read board file '{}'", self.path.display()))?;
        parse_board(&contents)
            .with_context(|| format!("board file '{}' is corrupt", self.path.display()))
            .map(Some)
    }

    fn save(&self, board: &Board) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| anyhow!("invalid board file path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory '{}'", parent.display()))?;

        let contents =
            serde_json::to_string_pretty(board).context("failed to serialize board to JSON")?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| anyhow!("invalid board file name"))?
            .to_string_lossy()
            .to_string();
        let tmp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents).with_context(|| {
            format!(
                "failed to write temporary board file '{}'",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "failed to atomically rename board file '{}' to '{}'",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

/// In-memory storage holding the raw JSON text. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
    saves: Rc<RefCell<usize>>,
}

impl MemoryStorage {
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let storage = Self::default();
        *storage.slot.borrow_mut() = Some(raw.into());
        storage
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl BoardStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Board>> {
        self.slot.borrow().as_deref().map(parse_board).transpose()
    }

    fn save(&self, board: &Board) -> Result<()> {
        let contents = serde_json::to_string(board).context("failed to serialize board")?;
        *self.slot.borrow_mut() = Some(contents);
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
