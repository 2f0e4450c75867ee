use std::path::{Path, PathBuf};

use colloquy_core::Message;
use tokio::fs;

use crate::error::{Result, StoreError};
use crate::record::{
    catalog_entry, created_at, decode, new_record_id, newest_first, record_id, record_path,
    CatalogEntry,
};

/// Non-blocking twin of [`ConversationStore`](crate::ConversationStore);
/// same file layout, same semantics.
#[derive(Debug, Clone)]
pub struct AsyncConversationStore {
    root: PathBuf,
}

impl AsyncConversationStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(&self, messages: &[Message], id: Option<&str>) -> Result<String> {
        let id = id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(new_record_id);
        let path = record_path(&self.root, &id)?;

        fs::create_dir_all(&self.root).await?;
        let contents = serde_json::to_string_pretty(messages)?;
        fs::write(&path, contents).await?;

        log::info!("Saved {} messages to record {}", messages.len(), id);
        Ok(id)
    }

    pub async fn load(&self, id: &str) -> Result<Vec<Message>> {
        let path = record_path(&self.root, id)?;
        if !is_file(&path).await {
            return Err(StoreError::NotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&path).await?;
        let messages = decode(id, &contents)?;
        log::debug!("Loaded {} messages from record {}", messages.len(), id);
        Ok(messages)
    }

    pub async fn list_records(&self) -> Result<Vec<PathBuf>> {
        list_records_in(&self.root).await
    }

    pub async fn catalog(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        for path in self.list_records().await? {
            let Some(id) = record_id(&path) else { continue };
            let contents = match fs::read_to_string(&path).await {
                Ok(contents) => contents,
                Err(err) => {
                    log::warn!("Skipping record {} in catalog: {}", path.display(), err);
                    continue;
                }
            };
            match decode(&id, &contents) {
                Ok(messages) => entries.push(catalog_entry(id, &messages)),
                Err(err) => log::warn!("Skipping record {} in catalog: {}", path.display(), err),
            }
        }
        Ok(entries)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let path = record_path(&self.root, id)?;
        if !is_file(&path).await {
            return Ok(false);
        }
        fs::remove_file(&path).await?;
        log::info!("Deleted record {}", id);
        Ok(true)
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

pub async fn list_records_in(root: &Path) -> Result<Vec<PathBuf>> {
    let is_dir = fs::metadata(root)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(StoreError::InvalidRoot(root.to_path_buf()));
    }

    let mut records = Vec::new();
    let mut entries = fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if record_id(&path).is_none() {
            continue;
        }
        let metadata = entry.metadata().await?;
        if metadata.is_file() {
            records.push((path, created_at(&metadata)));
        }
    }
    Ok(newest_first(records))
}
