//! Recurrence scheduler: spawning due habits and closing out occurrences

use chrono::NaiveDate;
use smash_api::{BugState, Entity, EntityKind, Habit};
use smash_store::AuditEventType;
use smash_util::HabitId;
use tracing::{debug, info};

use crate::{credit_smash, penalize_fail, CoreEvent, Engine};

/// Due date after the current occurrence: the interval applied to the
/// due date, repeated until it lands after the occurrence's spawn date.
fn next_due_after(habit: &Habit) -> NaiveDate {
    let mut next = habit.interval_type.advance(habit.next_due_date);
    if let Some(spawned) = habit.last_spawn_date {
        while next <= spawned {
            let later = habit.interval_type.advance(next);
            if later == next {
                break;
            }
            next = later;
        }
    }
    next
}

/// An active occurrence whose period has run out by `today`
fn lapsed(habit: &Habit, today: NaiveDate) -> bool {
    habit.is_active() && habit.interval_type.advance(habit.next_due_date) <= today
}

/// Start of the period containing `today`, on the habit's schedule
fn current_period_start(habit: &Habit, today: NaiveDate) -> NaiveDate {
    let mut start = habit.next_due_date;
    loop {
        let next = habit.interval_type.advance(start);
        // `advance` saturates at the calendar limit
        if next > today || next == start {
            return start;
        }
        start = next;
    }
}

impl Engine {
    /// Activate every habit due on `today`. Calling it again on the same
    /// date changes nothing.
    pub fn spawn_due_habits(&mut self, today: NaiveDate) -> Vec<CoreEvent> {
        if !self.document.habits.iter().any(|h| h.is_due(today)) {
            debug!(today = %today, "No habits due");
            return Vec::new();
        }

        let month = smash_util::month_key(today);
        let mut next = self.document.clone();
        let mut habit_ids = Vec::new();
        let mut missed = Vec::new();

        for index in 0..next.habits.len() {
            let habit = &next.habits[index];
            if !habit.is_due(today) {
                continue;
            }

            if lapsed(habit, today) {
                let item = self.stat_item(&habit.title, habit.difficulty, EntityKind::Habit);
                let (id, difficulty) = (habit.id, habit.difficulty);
                let infestation_added = penalize_fail(&mut next, item, &self.rules, &month);

                info!(habit_id = %id, infestation_added, "Habit occurrence missed");
                self.audit(AuditEventType::HabitFailed {
                    habit_id: id,
                    difficulty,
                    infestation_added,
                });
                missed.push(id);

                let habit = &mut next.habits[index];
                habit.next_due_date = current_period_start(habit, today);
            }

            let habit = &mut next.habits[index];
            habit.remaining_today = habit.times_per_day;
            habit.last_spawn_date = Some(today);
            habit.active_bug_state = Some(BugState::Locked);
            habit_ids.push(habit.id);
        }

        self.undo.clear_action();

        info!(
            today = %today,
            count = habit_ids.len(),
            missed = missed.len(),
            "Habits spawned"
        );
        self.audit(AuditEventType::HabitsSpawned {
            count: habit_ids.len(),
            missed: missed.len(),
        });

        let mut events = vec![CoreEvent::HabitsSpawned { habit_ids, missed }];
        events.extend(self.commit(next));
        events
    }

    /// Spawn against the engine clock's date
    pub fn spawn_due_habits_today(&mut self) -> Vec<CoreEvent> {
        let today = self.clock.today();
        self.spawn_due_habits(today)
    }

    /// Log one completion of an active occurrence. The last one unlocks
    /// the reward. Undoable.
    pub fn complete_habit_occurrence(&mut self, id: &HabitId) -> Vec<CoreEvent> {
        let Some(index) = self.document.habit_index(id) else {
            return Vec::new();
        };
        let habit = &self.document.habits[index];
        if habit.active_bug_state != Some(BugState::Locked) || habit.remaining_today == 0 {
            debug!(habit_id = %id, state = ?habit.active_bug_state, "Completion ignored");
            return Vec::new();
        }

        let snapshot = self.snapshot(Entity::Habit(habit.clone()), index);
        let mut next = self.document.clone();
        let habit = &mut next.habits[index];
        habit.remaining_today -= 1;
        let unlocked = habit.remaining_today == 0;
        if unlocked {
            habit.active_bug_state = Some(BugState::Unlocked);
        }
        let remaining_today = habit.remaining_today;
        self.undo.record_action(snapshot);

        info!(habit_id = %id, remaining_today, unlocked, "Habit occurrence completed");

        let mut events = vec![CoreEvent::HabitOccurrenceCompleted {
            habit_id: *id,
            remaining_today,
            unlocked,
        }];
        events.extend(self.commit(next));
        events
    }

    /// Claim the reward of an unlocked occurrence and schedule the next
    /// one. Undoable.
    pub fn smash_habit(&mut self, id: &HabitId) -> Vec<CoreEvent> {
        let Some(index) = self.document.habit_index(id) else {
            return Vec::new();
        };
        let habit = &self.document.habits[index];
        if habit.active_bug_state != Some(BugState::Unlocked) {
            debug!(habit_id = %id, state = ?habit.active_bug_state, "Habit smash ignored");
            return Vec::new();
        }

        let difficulty = habit.difficulty;
        let item = self.stat_item(&habit.title, difficulty, EntityKind::Habit);
        let snapshot = self.snapshot(Entity::Habit(habit.clone()), index);
        let next_due_date = next_due_after(habit);
        let month = self.current_month();

        let mut next = self.document.clone();
        let coins_awarded = credit_smash(&mut next, item, &self.rules, &month);
        let habit = &mut next.habits[index];
        habit.remaining_today = 0;
        habit.active_bug_state = None;
        habit.next_due_date = next_due_date;
        self.undo.record_action(snapshot);

        info!(
            habit_id = %id,
            difficulty = %difficulty,
            coins_awarded,
            next_due_date = %next_due_date,
            "Habit smashed"
        );
        self.audit(AuditEventType::HabitSmashed {
            habit_id: *id,
            difficulty,
            coins_awarded,
        });

        let mut events = vec![CoreEvent::HabitSmashed {
            habit_id: *id,
            coins_awarded,
            next_due_date,
        }];
        events.extend(self.commit(next));
        self.notify_smash(EntityKind::Habit, difficulty);
        events
    }

    /// Give up on the active occurrence: penalise and schedule the next
    /// one. Undoable.
    pub fn fail_habit(&mut self, id: &HabitId) -> Vec<CoreEvent> {
        let Some(index) = self.document.habit_index(id) else {
            return Vec::new();
        };
        let habit = &self.document.habits[index];
        if !habit.is_active() {
            debug!(habit_id = %id, "Fail of inactive habit ignored");
            return Vec::new();
        }

        let difficulty = habit.difficulty;
        let item = self.stat_item(&habit.title, difficulty, EntityKind::Habit);
        let snapshot = self.snapshot(Entity::Habit(habit.clone()), index);
        let next_due_date = next_due_after(habit);
        let month = self.current_month();

        let mut next = self.document.clone();
        let infestation_added = penalize_fail(&mut next, item, &self.rules, &month);
        let habit = &mut next.habits[index];
        habit.remaining_today = 0;
        habit.active_bug_state = None;
        habit.next_due_date = next_due_date;
        self.undo.record_action(snapshot);

        info!(
            habit_id = %id,
            difficulty = %difficulty,
            infestation_added,
            next_due_date = %next_due_date,
            "Habit failed"
        );
        self.audit(AuditEventType::HabitFailed {
            habit_id: *id,
            difficulty,
            infestation_added,
        });

        let mut events = vec![CoreEvent::HabitFailed {
            habit_id: *id,
            infestation_added,
            next_due_date,
        }];
        events.extend(self.commit(next));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{day, engine_at};
    use crate::HabitOptions;
    use smash_api::{Difficulty, IntervalType};

    fn add_habit(engine: &mut Engine, interval: IntervalType, times_per_day: u32) -> HabitId {
        engine.add_habit(
            "Floss",
            Difficulty::Medium,
            interval,
            HabitOptions {
                times_per_day,
                ..Default::default()
            },
        );
        engine.document().habits[0].id
    }

    fn habit(engine: &Engine, id: &HabitId) -> Habit {
        engine.document().habit(id).unwrap().clone()
    }

    #[test]
    fn test_floss_scenario() {
        let (mut engine, _clock) = engine_at(day(1));
        let id = add_habit(&mut engine, IntervalType::Daily, 1);

        engine.spawn_due_habits(day(1));
        assert_eq!(habit(&engine, &id).active_bug_state, Some(BugState::Locked));

        let events = engine.complete_habit_occurrence(&id);
        assert_eq!(
            events[0],
            CoreEvent::HabitOccurrenceCompleted {
                habit_id: id,
                remaining_today: 0,
                unlocked: true
            }
        );
        assert_eq!(habit(&engine, &id).active_bug_state, Some(BugState::Unlocked));

        engine.smash_habit(&id);
        let h = habit(&engine, &id);
        assert_eq!(engine.document().coins, Difficulty::Medium.coin_reward());
        assert_eq!(h.next_due_date, day(2));
        assert_eq!(h.active_bug_state, None);
        assert_eq!(h.remaining_today, 0);

        // Nothing left to smash
        assert!(engine.smash_habit(&id).is_empty());
        assert_eq!(engine.document().coins, Difficulty::Medium.coin_reward());
    }

    #[test]
    fn test_spawn_is_idempotent_per_day() {
        let (mut engine, _clock) = engine_at(day(1));
        let id = add_habit(&mut engine, IntervalType::Daily, 3);

        engine.spawn_due_habits(day(1));
        engine.complete_habit_occurrence(&id);
        let after_first = engine.document().clone();

        assert!(engine.spawn_due_habits(day(1)).is_empty());
        assert_eq!(engine.document(), &after_first);
        assert_eq!(habit(&engine, &id).remaining_today, 2);
    }

    #[test]
    fn test_not_yet_due_does_not_spawn() {
        let (mut engine, _clock) = engine_at(day(1));
        engine.add_habit(
            "Later",
            Difficulty::Easy,
            IntervalType::Weekly,
            HabitOptions {
                start_date: Some(day(5)),
                ..Default::default()
            },
        );

        assert!(engine.spawn_due_habits(day(4)).is_empty());
        assert_eq!(engine.spawn_due_habits(day(5)).len(), 1);
    }

    #[test]
    fn test_multiple_completions_required() {
        let (mut engine, _clock) = engine_at(day(1));
        let id = add_habit(&mut engine, IntervalType::Daily, 2);
        engine.spawn_due_habits(day(1));

        // Cannot smash while locked
        assert!(engine.smash_habit(&id).is_empty());

        engine.complete_habit_occurrence(&id);
        assert_eq!(habit(&engine, &id).active_bug_state, Some(BugState::Locked));
        engine.complete_habit_occurrence(&id);
        assert_eq!(habit(&engine, &id).active_bug_state, Some(BugState::Unlocked));

        // Already unlocked, nothing left to complete
        assert!(engine.complete_habit_occurrence(&id).is_empty());
    }

    #[test]
    fn test_complete_undo() {
        let (mut engine, _clock) = engine_at(day(1));
        let id = add_habit(&mut engine, IntervalType::Daily, 1);
        engine.spawn_due_habits(day(1));

        engine.complete_habit_occurrence(&id);
        engine.undo_last_action();

        let h = habit(&engine, &id);
        assert_eq!(h.active_bug_state, Some(BugState::Locked));
        assert_eq!(h.remaining_today, 1);
    }

    #[test]
    fn test_monthly_advance_clamps() {
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let (mut engine, _clock) = engine_at(jan31);
        let id = add_habit(&mut engine, IntervalType::Monthly, 1);

        engine.spawn_due_habits(jan31);
        engine.complete_habit_occurrence(&id);
        engine.smash_habit(&id);

        assert_eq!(
            habit(&engine, &id).next_due_date,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_weekly_advance() {
        let (mut engine, _clock) = engine_at(day(2));
        let id = add_habit(&mut engine, IntervalType::Weekly, 1);

        engine.spawn_due_habits(day(2));
        engine.complete_habit_occurrence(&id);
        let events = engine.smash_habit(&id);
        assert!(matches!(
            events[0],
            CoreEvent::HabitSmashed { next_due_date, .. } if next_due_date == day(9)
        ));
    }

    #[test]
    fn test_late_smash_skips_missed_periods() {
        let (mut engine, clock) = engine_at(day(1));
        let id = add_habit(&mut engine, IntervalType::Daily, 1);
        engine.spawn_due_habits(day(1));

        // Away for three days
        clock.advance_days(3);
        engine.spawn_due_habits_today();
        engine.complete_habit_occurrence(&id);
        engine.smash_habit(&id);

        assert_eq!(habit(&engine, &id).next_due_date, day(5));
    }

    #[test]
    fn test_lapsed_occurrence_is_penalised_on_respawn() {
        let (mut engine, _clock) = engine_at(day(1));
        let id = add_habit(&mut engine, IntervalType::Daily, 1);
        engine.spawn_due_habits(day(1));

        let events = engine.spawn_due_habits(day(2));
        assert_eq!(
            events[0],
            CoreEvent::HabitsSpawned {
                habit_ids: vec![id],
                missed: vec![id]
            }
        );
        assert_eq!(engine.document().infestation, Difficulty::Medium.infestation_weight());
        assert_eq!(engine.month_summary("2025-06").missed_count, 1);

        let h = habit(&engine, &id);
        assert_eq!(h.last_spawn_date, Some(day(2)));
        assert_eq!(h.active_bug_state, Some(BugState::Locked));
    }

    #[test]
    fn test_weekly_respawn_within_period_is_not_missed() {
        let (mut engine, _clock) = engine_at(day(2));
        add_habit(&mut engine, IntervalType::Weekly, 1);
        engine.spawn_due_habits(day(2));

        let events = engine.spawn_due_habits(day(3));
        let CoreEvent::HabitsSpawned { missed, .. } = &events[0] else {
            panic!("expected HabitsSpawned, got {:?}", events);
        };
        assert!(missed.is_empty());
        assert_eq!(engine.document().infestation, 0);
    }

    #[test]
    fn test_weekly_schedule_holds_when_respawned_daily() {
        let (mut engine, _clock) = engine_at(day(2));
        let id = add_habit(&mut engine, IntervalType::Weekly, 1);

        // The app is opened every day before the habit gets done
        for n in 2..=6 {
            engine.spawn_due_habits(day(n));
        }
        engine.complete_habit_occurrence(&id);
        engine.smash_habit(&id);

        assert_eq!(habit(&engine, &id).next_due_date, day(9));
    }

    #[test]
    fn test_ignored_weekly_habit_is_missed_each_period() {
        let (mut engine, _clock) = engine_at(day(2));
        engine.add_habit(
            "Vacuum",
            Difficulty::Hard,
            IntervalType::Weekly,
            HabitOptions::default(),
        );
        let id = engine.document().habits[0].id;

        let mut missed_on = Vec::new();
        for n in 2..=22 {
            let events = engine.spawn_due_habits(day(n));
            if let Some(CoreEvent::HabitsSpawned { missed, .. }) = events.first() {
                if !missed.is_empty() {
                    missed_on.push(n);
                }
            }
        }

        assert_eq!(missed_on, vec![9, 16]);
        assert_eq!(engine.month_summary("2025-06").missed_count, 2);
        assert_eq!(engine.document().infestation, 2 * Difficulty::Hard.infestation_weight());

        // The live occurrence belongs to the period starting on the 16th
        let h = habit(&engine, &id);
        assert_eq!(h.next_due_date, day(16));
        assert_eq!(h.active_bug_state, Some(BugState::Locked));
    }

    #[test]
    fn test_backdated_spawn_files_misses_under_its_month() {
        let may30 = NaiveDate::from_ymd_opt(2025, 5, 30).unwrap();
        let may31 = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        let (mut engine, _clock) = engine_at(day(10));
        engine.add_habit(
            "Floss",
            Difficulty::Easy,
            IntervalType::Daily,
            HabitOptions {
                start_date: Some(may30),
                ..Default::default()
            },
        );

        engine.spawn_due_habits(may30);
        engine.spawn_due_habits(may31);

        assert_eq!(engine.month_summary("2025-05").missed_count, 1);
        assert_eq!(engine.month_summary("2025-06").missed_count, 0);
    }

    #[test]
    fn test_fail_habit() {
        let (mut engine, _clock) = engine_at(day(1));
        let id = add_habit(&mut engine, IntervalType::Daily, 2);

        // Not active yet
        assert!(engine.fail_habit(&id).is_empty());

        engine.spawn_due_habits(day(1));
        let events = engine.fail_habit(&id);
        assert_eq!(
            events[0],
            CoreEvent::HabitFailed {
                habit_id: id,
                infestation_added: 2,
                next_due_date: day(2)
            }
        );

        let h = habit(&engine, &id);
        assert_eq!(h.active_bug_state, None);
        assert_eq!(engine.month_summary("2025-06").missed_items[0].kind, EntityKind::Habit);

        engine.undo_last_action();
        assert_eq!(habit(&engine, &id).active_bug_state, Some(BugState::Locked));
        assert_eq!(engine.document().infestation, 0);
    }
}
