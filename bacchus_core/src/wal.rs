//! Write-Ahead Log (WAL) for drink persistence.
//!
//! Drinks are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{DrinkEvent, Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Drink sink trait for persisting logged drinks
pub trait DrinkSink {
    fn append(&mut self, drink: &DrinkEvent) -> Result<()>;
}

/// JSONL-based drink sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl DrinkSink for JsonlSink {
    fn append(&mut self, drink: &DrinkEvent) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write drink as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(drink)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        // Lock is automatically released when file is dropped
        file.unlock()?;

        tracing::debug!("Appended drink {} to WAL", drink.id);
        Ok(())
    }
}

/// Read all drinks from a WAL file
pub fn read_drinks(path: &Path) -> Result<Vec<DrinkEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut drinks = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<DrinkEvent>(&line) {
            Ok(drink) => drinks.push(drink),
            Err(e) => {
                tracing::warn!("Failed to parse drink at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} drinks from WAL", drinks.len());
    Ok(drinks)
}

/// Remove one drink from a WAL file by id.
///
/// The surviving entries are written to a temporary file in the same
/// directory, which then atomically replaces the original. Returns `false`
/// when no entry carried the id (including a missing WAL).
pub fn remove_drink(path: &Path, id: Uuid) -> Result<bool> {
    let drinks = read_drinks(path)?;
    let survivors: Vec<&DrinkEvent> = drinks.iter().filter(|d| d.id != id).collect();
    if survivors.len() == drinks.len() {
        return Ok(false);
    }

    let parent = path
        .parent()
        .ok_or_else(|| Error::Other(format!("WAL path {:?} has no parent directory", path)))?;

    let temp_file = tempfile::NamedTempFile::new_in(parent)?;

    temp_file.as_file().lock_exclusive()?;
    {
        let mut writer = std::io::BufWriter::new(temp_file.as_file());
        for drink in &survivors {
            let line = serde_json::to_string(drink)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;
    temp_file.as_file().unlock()?;

    temp_file
        .persist(path)
        .map_err(|e| Error::Io(e.error))?;

    tracing::info!("Removed drink {} from WAL", id);
    Ok(true)
}
