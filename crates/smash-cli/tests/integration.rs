//! Integration tests for smash
//!
//! These tests drive the engine end to end over a real SQLite store.

use chrono::NaiveDate;
use smash_api::{
    BugState, Difficulty, InfestationLevel, IntervalType, PoisonSize, TaskStatus,
    MAX_INFESTATION,
};
use smash_config::{parse_config, RewardPolicy, Rules};
use smash_core::{CoreEvent, Engine, HabitOptions, TaskOptions};
use smash_store::{AuditEventType, SqliteStore, Store};
use smash_util::ManualClock;
use std::sync::Arc;
use std::time::Duration;

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, n).unwrap()
}

fn open(store: Arc<SqliteStore>, clock: Arc<ManualClock>, rules: Rules) -> Engine {
    Engine::load(rules, store, clock).unwrap()
}

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smash.db");
    let clock = Arc::new(ManualClock::at_date(day(1)));

    {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let mut engine = open(store, clock.clone(), Rules::default());
        engine.add_task("Write report", Difficulty::Hard, TaskOptions::default());
        let id = engine.document().tasks[0].id;
        engine.unlock_task(&id);
        engine.smash_task(&id);
        engine.add_habit("Floss", Difficulty::Easy, IntervalType::Daily, HabitOptions::default());
    }

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let engine = open(store, clock, Rules::default());
    let doc = engine.document();

    assert_eq!(doc.coins, 3);
    assert_eq!(doc.tasks[0].status, TaskStatus::Smashed);
    assert_eq!(doc.habits[0].title, "Floss");
    assert_eq!(engine.month_summary("2025-03").smashed_count, 1);

    // Undo is session state only
    assert!(engine.pending_undo().is_none());
}

#[test]
fn test_legacy_blob_is_migrated_and_clamped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smash.db");

    // Create the schema, then write the blob as an early version did: no
    // version, no settings, per-month smash counts and a meter past its
    // maximum
    drop(SqliteStore::open(&path).unwrap());
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute(
            "INSERT INTO kv (key, value) VALUES ('document', ?1)",
            [r#"{"tasks":[],"habits":[],"coins":8,"infestation":14,"monthlyProgress":{"2025-02":5}}"#],
        )
        .unwrap();

    let clock = Arc::new(ManualClock::at_date(day(1)));
    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let engine = open(store, clock, Rules::default());

    assert_eq!(engine.document().coins, 8);
    assert_eq!(engine.document().infestation, MAX_INFESTATION);
    assert!(engine.document().settings.sound_on);
    assert_eq!(engine.infestation_level(), InfestationLevel::Overrun);
    assert_eq!(engine.month_summary("2025-02").smashed_count, 5);
}

#[test]
fn test_poison_rescues_from_overrun() {
    let clock = Arc::new(ManualClock::at_date(day(1)));
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let mut engine = open(store.clone(), clock, Rules::default());

    // Earn 20 coins, then let three boss bugs escape
    for _ in 0..4 {
        engine.add_task("Boss fight", Difficulty::Boss, TaskOptions::default());
        let id = engine.document().tasks[0].id;
        engine.unlock_task(&id);
        engine.smash_task(&id);
    }
    for _ in 0..3 {
        engine.add_task("Escaped", Difficulty::Boss, TaskOptions::default());
        let id = engine.document().tasks[0].id;
        engine.fail_task(&id);
    }
    assert_eq!(engine.document().coins, 20);
    assert_eq!(engine.document().infestation, MAX_INFESTATION);
    assert!(engine.is_overrun());

    let events = engine.buy_poison(PoisonSize::Large);
    assert_eq!(engine.document().infestation, 5);
    assert_eq!(engine.document().coins, 2);
    assert!(!engine.is_overrun());
    assert!(events.contains(&CoreEvent::InfestationLevelChanged {
        from: InfestationLevel::Overrun,
        to: InfestationLevel::Clear,
    }));

    // Two coins left: every size is refused
    for size in PoisonSize::ALL {
        assert!(engine.buy_poison(size).is_empty());
    }
    assert_eq!(engine.document().coins, 2);

    let audits = store.get_recent_audits(1).unwrap();
    assert!(matches!(audits[0].event, AuditEventType::PoisonBought { .. }));
}

#[test]
fn test_habit_week() {
    let clock = Arc::new(ManualClock::at_date(day(3)));
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let mut engine = open(store, clock.clone(), Rules::default());

    engine.add_habit(
        "Water plants",
        Difficulty::Medium,
        IntervalType::Daily,
        HabitOptions {
            times_per_day: 2,
            ..Default::default()
        },
    );
    let id = engine.document().habits[0].id;

    // Day 3: done properly
    engine.spawn_due_habits_today();
    engine.complete_habit_occurrence(&id);
    engine.complete_habit_occurrence(&id);
    engine.smash_habit(&id);

    // Day 4: spawned but forgotten
    clock.advance_days(1);
    engine.spawn_due_habits_today();
    assert_eq!(
        engine.document().habit(&id).unwrap().active_bug_state,
        Some(BugState::Locked)
    );

    // Day 5: yesterday's occurrence counts as missed
    clock.advance_days(1);
    let events = engine.spawn_due_habits_today();
    assert!(matches!(
        &events[0],
        CoreEvent::HabitsSpawned { missed, .. } if missed == &vec![id]
    ));

    let month = engine.month_summary(&engine.current_month());
    assert_eq!(month.smashed_count, 1);
    assert_eq!(month.missed_count, 1);
    assert_eq!(engine.document().coins, 2);
    assert_eq!(engine.document().infestation, 2);
}

#[test]
fn test_configured_rules_drive_engine() {
    let config = parse_config(
        r#"
        config_version = 1

        [rules]
        undo_window_seconds = 30
        reward_policy = "dampened"
        history_limit = 3
        "#,
    )
    .unwrap();
    assert_eq!(config.rules.reward_policy, RewardPolicy::Dampened);

    let clock = Arc::new(ManualClock::at_date(day(1)));
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let mut engine = open(store, clock.clone(), config.rules);

    // Push infestation to 10, then smash a boss: 5 * 0.5 rounds to 3
    for _ in 0..3 {
        engine.add_task("Escaped", Difficulty::Boss, TaskOptions::default());
        let id = engine.document().tasks[0].id;
        engine.fail_task(&id);
    }
    engine.add_task("Boss", Difficulty::Boss, TaskOptions::default());
    let id = engine.document().tasks[0].id;
    engine.unlock_task(&id);
    let events = engine.smash_task(&id);
    assert_eq!(
        events[0],
        CoreEvent::TaskSmashed {
            task_id: id,
            coins_awarded: 3
        }
    );

    // Longer undo window
    clock.advance(Duration::from_secs(25));
    assert_eq!(engine.undo_last_action().len(), 1);
    assert_eq!(engine.document().coins, 0);

    // History is bounded by configuration
    assert_eq!(engine.month_summary("2025-03").missed_items.len(), 3);
    for _ in 0..5 {
        engine.add_task("More", Difficulty::Easy, TaskOptions::default());
        let id = engine.document().tasks[0].id;
        engine.fail_task(&id);
    }
    let month = engine.month_summary("2025-03");
    assert_eq!(month.missed_count, 8);
    assert_eq!(month.missed_items.len(), 3);
}

#[test]
fn test_delete_restore_window() {
    let clock = Arc::new(ManualClock::at_date(day(1)));
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let mut engine = open(store, clock.clone(), Rules::default());

    engine.add_task("Keep me", Difficulty::Easy, TaskOptions::default());
    engine.add_task("Other", Difficulty::Easy, TaskOptions::default());
    let keep = engine.document().tasks[1].id;

    engine.delete_task(&keep);
    clock.advance(Duration::from_secs(9));
    engine.undo_delete();
    assert_eq!(engine.document().tasks[0].id, keep);

    engine.delete_task(&keep);
    clock.advance(Duration::from_secs(10));
    assert_eq!(engine.tick(), vec![]);
    clock.advance(Duration::from_secs(1));
    assert_eq!(engine.tick(), vec![CoreEvent::RestoreExpired]);
    assert!(engine.undo_delete().is_empty());
    assert_eq!(engine.document().tasks.len(), 1);
}
