//! Conversation persistence.
//!
//! Each conversation is one `<id>.json` file holding the full store history.
//! The catalog is derived from record contents at read time; there is no
//! separate index file.

pub mod error;
pub mod fs_store;
pub mod record;
pub mod tokio_store;

pub use error::{Result, StoreError};
pub use fs_store::{list_records_in, ConversationStore};
pub use record::{derive_title, new_record_id, CatalogEntry, TITLE_CHARS};
pub use tokio_store::AsyncConversationStore;
