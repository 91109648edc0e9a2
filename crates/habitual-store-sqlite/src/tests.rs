//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, TimeDelta, Utc};
use habitual_core::{
  confirmation::Confirmation,
  habit::{Habit, HabitPatch, NewHabit},
  schedule::ScheduleRule,
  store::{AppendOutcome, HabitStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn daily(user_id: Uuid, name: &str) -> NewHabit {
  NewHabit::new(user_id, name, ScheduleRule::interval(1).unwrap(), "UTC")
}

fn confirmation_for(habit: &Habit, period: DateTime<Utc>) -> Confirmation {
  Confirmation {
    id:                   Uuid::new_v4(),
    habit_id:             habit.id,
    user_id:              habit.user_id,
    confirmed_at:         period + TimeDelta::minutes(5),
    confirmed_for_period: period,
    notes:                Some("done".into()),
  }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_habit() {
  let s = store().await;
  let user = Uuid::new_v4();

  let mut input = daily(user, "Floss");
  input.description = Some("every evening".into());
  input.color = Some("#00aa00".into());
  let habit = s.create_habit(input).await.unwrap();
  assert!(habit.is_active);
  assert_eq!(habit.created_at, habit.updated_at);

  let fetched = s.get_habit(user, habit.id).await.unwrap().unwrap();
  assert_eq!(fetched, habit);
}

#[tokio::test]
async fn weekly_schedule_roundtrips() {
  let s = store().await;
  let user = Uuid::new_v4();
  let input = NewHabit::new(
    user,
    "Gym",
    ScheduleRule::weekly([1, 3, 5]).unwrap(),
    "America/Chicago",
  );
  let habit = s.create_habit(input).await.unwrap();

  let fetched = s.get_habit(user, habit.id).await.unwrap().unwrap();
  assert_eq!(fetched.schedule, ScheduleRule::weekly([1, 3, 5]).unwrap());
  assert_eq!(fetched.timezone, "America/Chicago");
}

#[tokio::test]
async fn habits_are_scoped_to_their_owner() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let habit = s.create_habit(daily(owner, "Read")).await.unwrap();

  let stranger = Uuid::new_v4();
  assert!(s.get_habit(stranger, habit.id).await.unwrap().is_none());
  assert!(s.list_habits(stranger, false).await.unwrap().is_empty());
  assert!(s.deactivate_habit(stranger, habit.id).await.unwrap().is_none());
  assert!(
    s.update_habit(stranger, habit.id, HabitPatch::default())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn get_missing_habit_returns_none() {
  let s = store().await;
  let result = s.get_habit(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn list_filters_inactive_habits() {
  let s = store().await;
  let user = Uuid::new_v4();
  let a = s.create_habit(daily(user, "A")).await.unwrap();
  s.create_habit(daily(user, "B")).await.unwrap();

  s.deactivate_habit(user, a.id).await.unwrap().unwrap();

  let active = s.list_habits(user, true).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].name, "B");

  let all = s.list_habits(user, false).await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn update_applies_only_present_fields() {
  let s = store().await;
  let user = Uuid::new_v4();
  let mut input = daily(user, "Walk");
  input.description = Some("around the block".into());
  let habit = s.create_habit(input).await.unwrap();

  let patch = HabitPatch {
    name: Some("Long walk".into()),
    schedule: Some(ScheduleRule::interval(2).unwrap()),
    ..Default::default()
  };
  let updated = s.update_habit(user, habit.id, patch).await.unwrap().unwrap();
  assert_eq!(updated.name, "Long walk");
  assert_eq!(updated.schedule, ScheduleRule::interval(2).unwrap());
  assert_eq!(updated.description.as_deref(), Some("around the block"));
  assert_eq!(updated.timezone, "UTC");
  assert!(updated.updated_at >= habit.updated_at);
  assert_eq!(updated.created_at, habit.created_at);
}

#[tokio::test]
async fn update_with_empty_description_clears_it() {
  let s = store().await;
  let user = Uuid::new_v4();
  let mut input = daily(user, "Walk");
  input.description = Some("around the block".into());
  let habit = s.create_habit(input).await.unwrap();

  let patch = HabitPatch { description: Some(String::new()), ..Default::default() };
  let updated = s.update_habit(user, habit.id, patch).await.unwrap().unwrap();
  assert_eq!(updated.description, None);
}

#[tokio::test]
async fn deactivate_keeps_history() {
  let s = store().await;
  let user = Uuid::new_v4();
  let habit = s.create_habit(daily(user, "Stretch")).await.unwrap();
  s.append_confirmation(confirmation_for(&habit, habit.created_at))
    .await
    .unwrap();

  let gone = s.deactivate_habit(user, habit.id).await.unwrap().unwrap();
  assert!(!gone.is_active);
  assert_eq!(s.confirmations(habit.id).await.unwrap().len(), 1);
}

// ─── Confirmations ───────────────────────────────────────────────────────────

#[tokio::test]
async fn append_and_read_confirmations_in_period_order() {
  let s = store().await;
  let habit = s.create_habit(daily(Uuid::new_v4(), "Water")).await.unwrap();
  let p1 = habit.created_at;
  let p2 = p1 + TimeDelta::days(1);
  let p3 = p1 + TimeDelta::days(2);

  for period in [p3, p1, p2] {
    let outcome = s.append_confirmation(confirmation_for(&habit, period)).await.unwrap();
    assert_eq!(outcome, AppendOutcome::Appended);
  }

  let periods: Vec<_> = s
    .confirmations(habit.id)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.confirmed_for_period)
    .collect();
  assert_eq!(periods, vec![p1, p2, p3]);
}

#[tokio::test]
async fn duplicate_period_is_not_written() {
  let s = store().await;
  let habit = s.create_habit(daily(Uuid::new_v4(), "Water")).await.unwrap();

  let first = confirmation_for(&habit, habit.created_at);
  let second = confirmation_for(&habit, habit.created_at);
  assert_eq!(s.append_confirmation(first.clone()).await.unwrap(), AppendOutcome::Appended);
  assert_eq!(s.append_confirmation(second).await.unwrap(), AppendOutcome::Duplicate);

  let stored = s.confirmations(habit.id).await.unwrap();
  assert_eq!(stored, vec![first]);
}

#[tokio::test]
async fn concurrent_appends_for_one_period_admit_exactly_one() {
  let s = store().await;
  let habit = s.create_habit(daily(Uuid::new_v4(), "Water")).await.unwrap();

  let mut handles = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    let c = confirmation_for(&habit, habit.created_at);
    handles.push(tokio::spawn(async move { s.append_confirmation(c).await }));
  }

  let mut appended = 0;
  for handle in handles {
    if handle.await.unwrap().unwrap() == AppendOutcome::Appended {
      appended += 1;
    }
  }
  assert_eq!(appended, 1);
  assert_eq!(s.confirmations(habit.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn append_bumps_updated_at() {
  let s = store().await;
  let user = Uuid::new_v4();
  let habit = s.create_habit(daily(user, "Water")).await.unwrap();

  let mut c = confirmation_for(&habit, habit.created_at);
  c.confirmed_at = habit.created_at + TimeDelta::hours(3);
  s.append_confirmation(c).await.unwrap();

  let fetched = s.get_habit(user, habit.id).await.unwrap().unwrap();
  assert_eq!(fetched.updated_at, habit.created_at + TimeDelta::hours(3));
}

#[tokio::test]
async fn history_pages_newest_first() {
  let s = store().await;
  let habit = s.create_habit(daily(Uuid::new_v4(), "Water")).await.unwrap();
  let periods: Vec<_> = (0..5).map(|d| habit.created_at + TimeDelta::days(d)).collect();
  for &p in &periods {
    s.append_confirmation(confirmation_for(&habit, p)).await.unwrap();
  }

  let page = s.history(habit.id, 2, 0).await.unwrap();
  assert_eq!(page.total_count, 5);
  assert_eq!(
    page.confirmations.iter().map(|c| c.confirmed_for_period).collect::<Vec<_>>(),
    vec![periods[4], periods[3]]
  );

  let tail = s.history(habit.id, 10, 4).await.unwrap();
  assert_eq!(tail.confirmations.len(), 1);
  assert_eq!(tail.confirmations[0].confirmed_for_period, periods[0]);
}

#[tokio::test]
async fn history_offsets_past_i64_saturate() {
  let s = store().await;
  let habit = s.create_habit(daily(Uuid::new_v4(), "Water")).await.unwrap();
  for d in 0..3 {
    let period = habit.created_at + TimeDelta::days(d);
    s.append_confirmation(confirmation_for(&habit, period)).await.unwrap();
  }

  let page = s.history(habit.id, 10, usize::MAX).await.unwrap();
  assert!(page.confirmations.is_empty());
  assert_eq!(page.total_count, 3);

  let all = s.history(habit.id, usize::MAX, 0).await.unwrap();
  assert_eq!(all.confirmations.len(), 3);
}
