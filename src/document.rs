//! Document text and word goal
//!
//! The text buffer and goal are plain preference records next to the
//! stats. Import and export move raw UTF-8 text in and out; there is no
//! format encoding.

use std::path::Path;

use anyhow::{Context, Result};

use crate::store::{self, KeyValueStore, StoreError, keys};

/// Saved document text (empty if none)
pub async fn load_text(store: &dyn KeyValueStore) -> Result<String, StoreError> {
    Ok(store::load::<String>(store, keys::DOCUMENT).await?.unwrap_or_default())
}

pub async fn save_text(store: &dyn KeyValueStore, text: &str) -> Result<(), StoreError> {
    store::save(store, keys::DOCUMENT, &text).await
}

/// Saved goal, or `default_words` if none was set
pub async fn load_goal(store: &dyn KeyValueStore, default_words: u64) -> Result<u64, StoreError> {
    Ok(store::load::<u64>(store, keys::GOAL).await?.unwrap_or(default_words))
}

pub async fn save_goal(store: &dyn KeyValueStore, goal: u64) -> Result<(), StoreError> {
    store::save(store, keys::GOAL, &goal).await
}

/// Progress toward `goal` in percent, capped at 100. A zero goal counts as met.
pub fn goal_percent(words: u64, goal: u64) -> u8 {
    if goal == 0 {
        return 100;
    }
    ((words.min(goal) * 100) / goal) as u8
}

/// Read a plain text file, normalizing CRLF line endings
pub fn import_text(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    Ok(text.replace("\r\n", "\n"))
}

/// Write the document as plain text, creating parent directories
pub fn export_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("Failed to write document: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::tempdir;

    #[test]
    fn test_goal_percent() {
        assert_eq!(goal_percent(0, 500), 0);
        assert_eq!(goal_percent(250, 500), 50);
        assert_eq!(goal_percent(499, 500), 99);
        assert_eq!(goal_percent(900, 500), 100);
        assert_eq!(goal_percent(3, 0), 100);
    }

    #[tokio::test]
    async fn test_text_and_goal_defaults() {
        let store = MemoryStore::new();
        assert_eq!(load_text(&store).await.unwrap(), "");
        assert_eq!(load_goal(&store, 750).await.unwrap(), 750);

        save_text(&store, "Call me Ishmael.").await.unwrap();
        save_goal(&store, 1_000).await.unwrap();
        assert_eq!(load_text(&store).await.unwrap(), "Call me Ishmael.");
        assert_eq!(load_goal(&store, 750).await.unwrap(), 1_000);
    }

    #[test]
    fn test_import_export_plain_text() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("draft.txt");
        std::fs::write(&source, "line one\r\nline two\r\n").unwrap();

        let text = import_text(&source).unwrap();
        assert_eq!(text, "line one\nline two\n");

        let target = dir.path().join("out").join("draft.txt");
        export_text(&target, &text).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), text);
    }
}
