use std::fs;
use std::path::{Path, PathBuf};

use colloquy_core::Message;

use crate::error::{Result, StoreError};
use crate::record::{
    catalog_entry, created_at, decode, new_record_id, newest_first, record_id, record_path,
    CatalogEntry,
};

/// Blocking record store rooted at one directory.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    root: PathBuf,
}

impl ConversationStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `messages` under `id`, or under a fresh id when none (or an
    /// empty one) is given.
    /// An existing record with the same id is overwritten.
    pub fn save(&self, messages: &[Message], id: Option<&str>) -> Result<String> {
        let id = id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(new_record_id);
        let path = record_path(&self.root, &id)?;

        fs::create_dir_all(&self.root)?;
        let contents = serde_json::to_string_pretty(messages)?;
        fs::write(&path, contents)?;

        log::info!("Saved {} messages to record {}", messages.len(), id);
        Ok(id)
    }

    pub fn load(&self, id: &str) -> Result<Vec<Message>> {
        let path = record_path(&self.root, id)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&path)?;
        let messages = decode(id, &contents)?;
        log::debug!("Loaded {} messages from record {}", messages.len(), id);
        Ok(messages)
    }

    pub fn list_records(&self) -> Result<Vec<PathBuf>> {
        list_records_in(&self.root)
    }

    /// Title and id of every record, newest first. Records that cannot be
    /// read are skipped with a warning.
    pub fn catalog(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        for path in self.list_records()? {
            let Some(id) = record_id(&path) else { continue };
            let messages = match fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|contents| decode(&id, &contents))
            {
                Ok(messages) => messages,
                Err(err) => {
                    log::warn!("Skipping record {} in catalog: {}", path.display(), err);
                    continue;
                }
            };
            entries.push(catalog_entry(id, &messages));
        }
        Ok(entries)
    }

    /// Returns whether a record was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let path = record_path(&self.root, id)?;
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        log::info!("Deleted record {}", id);
        Ok(true)
    }
}

/// `*.json` records under `root`, most recently created first.
pub fn list_records_in(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(StoreError::InvalidRoot(root.to_path_buf()));
    }

    let mut records = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if record_id(&path).is_none() {
            continue;
        }
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            records.push((path, created_at(&metadata)));
        }
    }
    Ok(newest_first(records))
}
