//! Document command implementations

use std::path::Path;

use anyhow::Result;
use tracing::info;

use wordsprint::{Config, count_words, document};

use super::open_store;

/// Count the words in a file
pub fn count_command(file: &Path) -> Result<()> {
    let text = document::import_text(file)?;
    println!("{}", count_words(&text));
    Ok(())
}

pub async fn goal_command(config: &Config, words: u64) -> Result<()> {
    let store = open_store(config)?;
    document::save_goal(&*store, words).await?;
    println!("Goal set to {} words.", words);
    Ok(())
}

/// Replace the stored document. Imported words are not credited as written.
pub async fn import_command(config: &Config, file: &Path) -> Result<()> {
    let text = document::import_text(file)?;
    let store = open_store(config)?;
    document::save_text(&*store, &text).await?;
    info!(path = %file.display(), words = count_words(&text), "Imported document");
    println!("Imported {} words from {}.", count_words(&text), file.display());
    Ok(())
}

pub async fn export_command(config: &Config, file: &Path) -> Result<()> {
    let store = open_store(config)?;
    let text = document::load_text(&*store).await?;
    document::export_text(file, &text)?;
    println!("Exported {} words to {}.", count_words(&text), file.display());
    Ok(())
}
