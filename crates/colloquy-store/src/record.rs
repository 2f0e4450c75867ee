use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use colloquy_core::{Message, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Number of characters of the first user message used as a record title.
pub const TITLE_CHARS: usize = 10;

const RECORD_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: Option<String>,
    pub id: String,
}

pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Leading characters of the first user message, or `None` when the record
/// has no user turn.
pub fn derive_title(messages: &[Message]) -> Option<String> {
    let first_user = messages.iter().find(|m| m.role == Role::User)?;
    let text = first_user.text().unwrap_or_default();
    Some(text.chars().take(TITLE_CHARS).collect())
}

pub(crate) fn catalog_entry(id: String, messages: &[Message]) -> CatalogEntry {
    CatalogEntry {
        title: derive_title(messages),
        id,
    }
}

/// Ids become file names, so anything that could escape the root is refused.
pub(crate) fn record_path(root: &Path, id: &str) -> Result<PathBuf> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.contains('\0');
    if !valid {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(root.join(format!("{}.{}", id, RECORD_EXTENSION)))
}

pub(crate) fn record_id(path: &Path) -> Option<String> {
    if path.extension()? != RECORD_EXTENSION {
        return None;
    }
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Birth time where the platform records one, modification time otherwise.
pub(crate) fn created_at(metadata: &Metadata) -> SystemTime {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

pub(crate) fn newest_first(mut records: Vec<(PathBuf, SystemTime)>) -> Vec<PathBuf> {
    records.sort_by(|(a_path, a_time), (b_path, b_time)| {
        b_time.cmp(a_time).then_with(|| a_path.cmp(b_path))
    });
    records.into_iter().map(|(path, _)| path).collect()
}

pub(crate) fn decode(id: &str, contents: &str) -> Result<Vec<Message>> {
    serde_json::from_str(contents).map_err(|err| {
        log::warn!("Record {} is not a message list: {}", id, err);
        StoreError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn title_is_the_first_ten_characters_of_the_first_user_turn() {
        let messages = vec![
            Message::system("You are helpful"),
            Message::user("Hello, how are you today?"),
            Message::user("second"),
        ];
        assert_eq!(derive_title(&messages).as_deref(), Some("Hello, how"));
    }

    #[test]
    fn title_counts_characters_not_bytes() {
        let messages = vec![Message::user("你好，今天天气怎么样？适合出门吗")];
        assert_eq!(derive_title(&messages).as_deref(), Some("你好，今天天气怎么样"));
    }

    #[test]
    fn record_without_user_turn_has_no_title() {
        let messages = vec![Message::system("sys"), Message::assistant("hi", None)];
        assert_eq!(derive_title(&messages), None);
        assert_eq!(catalog_entry("abc".into(), &messages).title, None);
    }

    #[test]
    fn ids_cannot_escape_the_root() {
        let root = Path::new("/records");
        assert_eq!(record_path(root, "abc").unwrap(), PathBuf::from("/records/abc.json"));
        assert!(record_path(root, "../etc/passwd").is_err());
        assert!(record_path(root, "").is_err());
        assert!(record_path(root, "..").is_err());
    }

    #[test]
    fn only_json_files_are_records() {
        assert_eq!(record_id(Path::new("/r/abc.json")).as_deref(), Some("abc"));
        assert_eq!(record_id(Path::new("/r/abc.txt")), None);
        assert_eq!(record_id(Path::new("/r/abc")), None);
    }

    #[test]
    fn ordering_is_newest_first() {
        let t0 = SystemTime::UNIX_EPOCH;
        let ordered = newest_first(vec![
            (PathBuf::from("old.json"), t0),
            (PathBuf::from("new.json"), t0 + Duration::from_secs(20)),
            (PathBuf::from("mid.json"), t0 + Duration::from_secs(10)),
        ]);
        assert_eq!(
            ordered,
            vec![
                PathBuf::from("new.json"),
                PathBuf::from("mid.json"),
                PathBuf::from("old.json")
            ]
        );
    }
}
