//! Writing session wiring: debounced commits, goal progress and failures

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FlakyStore, RecordingSink, day};
use tokio::time::sleep;
use wordsprint::config::Settings;
use wordsprint::stats::FixedClock;
use wordsprint::store::{self, keys};
use wordsprint::{Severity, SprintStatus, TypingTime, WritingSession};

const SETTLE: Duration = Duration::from_millis(100);

async fn open_session() -> (Arc<FlakyStore>, Arc<RecordingSink>, WritingSession) {
    let store = Arc::new(FlakyStore::new());
    let clock = Arc::new(FixedClock::new(day(2024, 6, 3)));
    let sink = Arc::new(RecordingSink::default());
    let session = WritingSession::open(store.clone(), clock, &Settings::default(), sink.clone()).await;
    (store, sink, session)
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_burst_commits_once() {
    let (store, sink, session) = open_session().await;

    session.input("The").await;
    session.input("The quick").await;
    session.input("The quick brown fox").await;
    sleep(SETTLE).await;

    assert_eq!(store.transaction_count(), 1);
    assert_eq!(session.ledger().display_stats().await.session.words, 4);

    let shown = sink.last_render().unwrap();
    assert_eq!(shown.words, 4);
    assert_eq!(shown.remaining_words, 496);
}

#[tokio::test(start_paused = true)]
async fn test_deleting_words_is_not_negative() {
    let (_store, _sink, session) = open_session().await;

    session.input("one two three four").await;
    sleep(SETTLE).await;
    session.input("one two").await;
    sleep(SETTLE).await;
    session.input("one two five").await;
    sleep(SETTLE).await;

    assert_eq!(session.ledger().display_stats().await.session.words, 5);
}

#[tokio::test(start_paused = true)]
async fn test_loaded_document_is_not_credited() {
    let (store, sink, session) = open_session().await;
    session.set_goal(10).await;
    session.load_document("one two three four five").await;

    let shown = sink.last_render().unwrap();
    assert_eq!(shown.words, 5);
    assert_eq!(shown.goal, 10);
    assert_eq!(shown.percent, 50);
    assert_eq!(shown.stats.session.words, 0);

    session.input("one two three four five six").await;
    session.flush().await;
    assert_eq!(session.ledger().display_stats().await.session.words, 1);

    let saved: Option<String> = store::load(&*store, keys::DOCUMENT).await.unwrap();
    assert_eq!(saved.as_deref(), Some("one two three four five six"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_commit_notifies_and_retries() {
    let (store, sink, session) = open_session().await;
    store.fail_transactions(true);

    session.input("alpha beta gamma").await;
    sleep(SETTLE).await;

    let notes = sink.notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].0, Severity::Critical);
    assert_eq!(session.ledger().display_stats().await.session.words, 0);

    store.fail_transactions(false);
    session.input("alpha beta gamma delta").await;
    sleep(SETTLE).await;

    let stats = session.ledger().display_stats().await;
    assert_eq!(stats.session.words, 4);
    assert_eq!(stats.streak.count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_typing_time_feeds_session_minutes() {
    let (store, _sink, session) = open_session().await;

    // Two minutes of steady typing, one key every second
    let mut text = String::new();
    for _ in 0..120 {
        text.push_str("word ");
        session.input(text.clone()).await;
        sleep(Duration::from_secs(1)).await;
    }
    // Idle timeout closes the burst
    sleep(Duration::from_secs(5)).await;

    let typing: TypingTime = store::load(&*store, keys::TYPING_TIME)
        .await
        .unwrap()
        .unwrap();
    assert!(typing.time >= 120_000);

    session.input(format!("{text}more")).await;
    session.flush().await;
    let stats = session.ledger().display_stats().await;
    assert_eq!(stats.session.minutes, 2);
    assert_eq!(stats.session.words, 121);
}

#[tokio::test(start_paused = true)]
async fn test_sprint_completion_reaches_sink() {
    let (_store, sink, session) = open_session().await;
    session.start_sprint(Some(1));

    session.input("a b c d e f g").await;
    sleep(Duration::from_secs(61)).await;

    assert_eq!(*sink.completions.lock().unwrap(), vec![7]);
    assert_eq!(session.sprint().status(), SprintStatus::Finished);

    sleep(SETTLE).await;
    let stats = session.ledger().display_stats().await;
    assert_eq!(stats.session.sprints, 1);
    assert_eq!(stats.session.best_sprint, 7);
    assert_eq!(sink.last_render().unwrap().stats.session.sprints, 1);
}
