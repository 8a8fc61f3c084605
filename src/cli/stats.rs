//! Stats and reset command implementations

use anyhow::{Result, bail};

use wordsprint::Config;
use wordsprint::document;

use super::open_ledger;

/// Show today's totals and the streak
pub async fn stats_command(config: &Config) -> Result<()> {
    let (store, ledger) = open_ledger(config)?;
    let stats = ledger.display_stats().await;
    let goal = document::load_goal(&*store, config.settings.goal.default_words).await?;
    let text = document::load_text(&*store).await?;
    let words = wordsprint::count_words(&text);

    println!("Today ({}):\n", stats.session.date);
    println!("  Words written:  {}", stats.session.words);
    println!("  Typing minutes: {}", stats.session.minutes);
    println!("  Sprints:        {}", stats.session.sprints);
    println!("  Best sprint:    {} words", stats.session.best_sprint);
    println!();
    println!(
        "  Document:       {} / {} words ({}%)",
        words,
        goal,
        document::goal_percent(words, goal)
    );

    let streak_label = if stats.streak_active { "" } else { " (broken, write today to restart)" };
    println!("  Streak:         {} days{}", stats.streak.count, streak_label);
    println!("  Longest streak: {} days", stats.streak.record);

    Ok(())
}

/// Delete the stats records (document and goal are kept)
pub async fn reset_command(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete stats without --yes");
    }

    let (_store, ledger) = open_ledger(config)?;
    ledger.reset().await?;
    println!("Stats reset.");
    Ok(())
}
