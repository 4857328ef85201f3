use chrono::{Datelike, NaiveDate};
use habitflow_core::db::{open_db, open_db_in_memory};
use habitflow_core::{
    Completion, CompletionLedger, CompletionRepository, EngineError, Frequency, Habit, HabitRepository,
    SqliteCompletionRepository, SqliteHabitRepository,
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;
use uuid::Uuid;

type SqliteLedger<'conn> =
    CompletionLedger<SqliteHabitRepository<'conn>, SqliteCompletionRepository<'conn>>;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ledger(conn: &Connection) -> SqliteLedger<'_> {
    CompletionLedger::new(
        SqliteHabitRepository::try_new(conn).unwrap(),
        SqliteCompletionRepository::try_new(conn).unwrap(),
    )
}

fn insert_daily_habit(conn: &Connection) -> Habit {
    let habit = Habit::new("user-1", "Meditate", Frequency::Daily);
    SqliteHabitRepository::try_new(conn)
        .unwrap()
        .create_habit(&habit)
        .unwrap();
    habit
}

fn count_rows(conn: &Connection, habit: &Habit) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM habit_completions WHERE habit_uuid = ?1;",
        [habit.id.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn mark_returns_persisted_completion() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let ledger = ledger(&conn);

    let completion = ledger.mark_completed(habit.id, date(2024, 1, 1)).unwrap();
    assert_eq!(completion.habit_id, habit.id);
    assert_eq!(completion.completion_date, date(2024, 1, 1));

    let stored = SqliteCompletionRepository::try_new(&conn)
        .unwrap()
        .find_completion(habit.id, date(2024, 1, 1))
        .unwrap()
        .unwrap();
    assert_eq!(stored, completion);
    assert!(ledger.is_completed_on(habit.id, date(2024, 1, 1)).unwrap());
    assert!(!ledger.is_completed_on(habit.id, date(2024, 1, 2)).unwrap());
}

#[test]
fn second_mark_on_same_date_conflicts_and_keeps_one_record() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let ledger = ledger(&conn);

    ledger.mark_completed(habit.id, date(2024, 1, 1)).unwrap();
    let err = ledger
        .mark_completed(habit.id, date(2024, 1, 1))
        .unwrap_err();

    assert!(
        matches!(err, EngineError::Conflict { habit_id, date: d } if habit_id == habit.id && d == date(2024, 1, 1))
    );
    assert_eq!(count_rows(&conn, &habit), 1);
}

#[test]
fn store_insert_reports_duplicate_without_ledger_precheck() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let store = SqliteCompletionRepository::try_new(&conn).unwrap();

    store
        .insert_completion(&Completion::new(habit.id, date(2024, 5, 1)))
        .unwrap();
    let err = store
        .insert_completion(&Completion::new(habit.id, date(2024, 5, 1)))
        .unwrap_err();
    assert!(EngineError::from(err).is_conflict());
    assert_eq!(count_rows(&conn, &habit), 1);
}

#[test]
fn unmark_without_record_is_not_found_and_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let ledger = ledger(&conn);
    ledger.mark_completed(habit.id, date(2024, 1, 1)).unwrap();

    let err = ledger
        .unmark_completed(habit.id, date(2024, 1, 2))
        .unwrap_err();
    assert!(matches!(err, EngineError::CompletionNotFound { .. }));
    assert_eq!(ledger.list_completions(habit.id).unwrap().len(), 1);
}

#[test]
fn mark_unmark_mark_round_trip_leaves_one_record() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let ledger = ledger(&conn);
    let day = date(2024, 2, 29);

    let first = ledger.mark_completed(habit.id, day).unwrap();
    ledger.unmark_completed(habit.id, day).unwrap();
    assert!(!ledger.is_completed_on(habit.id, day).unwrap());
    let second = ledger.mark_completed(habit.id, day).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(count_rows(&conn, &habit), 1);
}

#[test]
fn operations_on_missing_habit_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let ledger = ledger(&conn);
    let missing = Uuid::new_v4();

    for err in [
        ledger.mark_completed(missing, date(2024, 1, 1)).unwrap_err(),
        ledger
            .unmark_completed(missing, date(2024, 1, 1))
            .unwrap_err(),
        ledger.list_completions(missing).unwrap_err(),
        ledger.is_completed_on(missing, date(2024, 1, 1)).unwrap_err(),
    ] {
        assert!(matches!(err, EngineError::HabitNotFound(id) if id == missing));
    }
}

#[test]
fn list_completions_is_sorted_by_date() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let ledger = ledger(&conn);
    for day in [date(2024, 1, 9), date(2023, 12, 31), date(2024, 1, 2)] {
        ledger.mark_completed(habit.id, day).unwrap();
    }

    let dates: Vec<NaiveDate> = ledger
        .list_completions(habit.id)
        .unwrap()
        .into_iter()
        .map(|completion| completion.completion_date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2023, 12, 31), date(2024, 1, 2), date(2024, 1, 9)]
    );
}

#[test]
fn list_between_includes_both_bounds() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let ledger = ledger(&conn);
    for day in 1..=10 {
        ledger.mark_completed(habit.id, date(2024, 1, day)).unwrap();
    }

    let window = ledger
        .list_completions_between(habit.id, date(2024, 1, 3), date(2024, 1, 6))
        .unwrap();
    let days: Vec<u32> = window
        .iter()
        .map(|completion| completion.completion_date.day())
        .collect();
    assert_eq!(days, vec![3, 4, 5, 6]);

    let single = ledger
        .list_completions_between(habit.id, date(2024, 1, 10), date(2024, 1, 10))
        .unwrap();
    assert_eq!(single.len(), 1);
}

#[test]
fn list_between_orders_dates_across_five_digit_years() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let ledger = ledger(&conn);
    let last_four_digit = date(9999, 12, 31);
    let first_five_digit = date(10000, 1, 1);
    ledger.mark_completed(habit.id, first_five_digit).unwrap();
    ledger.mark_completed(habit.id, last_four_digit).unwrap();
    ledger.mark_completed(habit.id, date(2024, 1, 1)).unwrap();

    let window = ledger
        .list_completions_between(habit.id, last_four_digit, first_five_digit)
        .unwrap();
    let dates: Vec<NaiveDate> = window
        .into_iter()
        .map(|completion| completion.completion_date)
        .collect();
    assert_eq!(dates, vec![last_four_digit, first_five_digit]);

    let all = ledger.list_completions(habit.id).unwrap();
    assert_eq!(all.first().unwrap().completion_date, date(2024, 1, 1));
    assert_eq!(all.last().unwrap().completion_date, first_five_digit);
}

#[test]
fn list_between_rejects_inverted_range() {
    let conn = open_db_in_memory().unwrap();
    let habit = insert_daily_habit(&conn);
    let ledger = ledger(&conn);

    let err = ledger
        .list_completions_between(habit.id, date(2024, 1, 6), date(2024, 1, 3))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[test]
fn list_for_habits_between_merges_histories() {
    let conn = open_db_in_memory().unwrap();
    let first = insert_daily_habit(&conn);
    let second = insert_daily_habit(&conn);
    let unrelated = insert_daily_habit(&conn);
    let ledger = ledger(&conn);

    ledger.mark_completed(first.id, date(2024, 1, 2)).unwrap();
    ledger.mark_completed(second.id, date(2024, 1, 1)).unwrap();
    ledger.mark_completed(second.id, date(2024, 1, 5)).unwrap();
    ledger.mark_completed(unrelated.id, date(2024, 1, 2)).unwrap();

    let merged = ledger
        .list_completions_for_habits_between(
            &[first.id, second.id],
            date(2024, 1, 1),
            date(2024, 1, 4),
        )
        .unwrap();
    let keys: Vec<(Uuid, NaiveDate)> = merged
        .into_iter()
        .map(|completion| (completion.habit_id, completion.completion_date))
        .collect();
    assert_eq!(
        keys,
        vec![(second.id, date(2024, 1, 1)), (first.id, date(2024, 1, 2))]
    );

    assert!(ledger
        .list_completions_for_habits_between(&[], date(2024, 1, 1), date(2024, 1, 4))
        .unwrap()
        .is_empty());
}

#[test]
fn concurrent_marks_on_same_key_yield_exactly_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    let habit = {
        let conn = open_db(&path).unwrap();
        insert_daily_habit(&conn)
    };
    let habit_id = habit.id;

    const CONTENDERS: usize = 4;
    let barrier = Arc::new(Barrier::new(CONTENDERS));
    let handles: Vec<_> = (0..CONTENDERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || mark_once(&path, habit_id, &barrier))
        })
        .collect();

    let results: Vec<Result<(), EngineError>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    for result in results.iter().filter(|result| result.is_err()) {
        assert!(result.as_ref().unwrap_err().is_conflict());
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(count_rows(&conn, &habit), 1);
}

fn mark_once(path: &Path, habit_id: Uuid, barrier: &Barrier) -> Result<(), EngineError> {
    let conn = open_db(path).unwrap();
    let ledger = ledger(&conn);
    barrier.wait();
    ledger
        .mark_completed(habit_id, date(2024, 3, 1))
        .map(|_| ())
}
