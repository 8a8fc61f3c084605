//! Init command implementation

use anyhow::Result;
use tracing::info;

use wordsprint::Config;

/// Write the default global configuration file
pub fn init_command(force: bool) -> Result<()> {
    let path = Config::init_global(force)?;
    info!(path = %path.display(), "Wrote default configuration");
    println!("Created {}", path.display());
    Ok(())
}
