//! End-to-end behaviour of the tracker against on-disk storage: collections
//! survive a restart, the newest set is the one deleted, the day rotation
//! follows the log, and both CSV exports read back unchanged.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;

use serde::Deserialize;
use tempfile::TempDir;

use heavy_duty::form::{NewSet, SetForm};
use heavy_duty::models::{Checklist, DayTag, Units};
use heavy_duty::routines::Plan;
use heavy_duty::storage::FileStore;
use heavy_duty::Tracker;

fn open(dir: &TempDir) -> Tracker<FileStore> {
    Tracker::open(FileStore::open(dir.path()).unwrap(), Plan::default())
}

fn set(day: DayTag, exercise: &str, weight: &str, units: Units, reps: u32, clean: bool) -> NewSet {
    NewSet {
        date: "2026-07-14".to_string(),
        day,
        exercise: exercise.to_string(),
        weight: weight.to_string(),
        units,
        reps,
        clean,
        notes: String::new(),
    }
}

#[test]
fn collections_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut tracker = open(&dir);
        tracker
            .add_set(set(DayTag::A, "Dumbbell Pullover", "70", Units::Pounds, 8, true), 1_000)
            .unwrap();
        tracker
            .save_daily("2026-07-14", Checklist { shake1: true, ..Checklist::default() }, 2_000)
            .unwrap();
        tracker.add_weigh_in("2026-07-14", "182.2", "", "2026-07-14", 3_000).unwrap();
    }

    let tracker = open(&dir);
    assert_eq!(tracker.log().len(), 1);
    assert_eq!(tracker.target_for(DayTag::A, "Dumbbell Pullover").unwrap().weight, "75");
    assert_eq!(tracker.nutrition_summary("2026-07-14"), "Nutrition: 1/2 shakes");
    assert_eq!(tracker.weigh_ins()[0].weight, "182.2");
    assert_eq!(tracker.next_day(), DayTag::B);
}

#[test]
fn corrupt_blob_starts_empty_without_touching_others() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut tracker = open(&dir);
        tracker.add_weigh_in("", "180", "", "2026-07-14", 5).unwrap();
    }
    fs::write(dir.path().join("HD_LOG_V3.json"), "{ definitely not a list").unwrap();

    let tracker = open(&dir);
    assert!(tracker.log().is_empty());
    assert_eq!(tracker.weigh_ins().len(), 1);
    assert_eq!(tracker.next_day(), DayTag::A);
}

#[test]
fn log_with_text_reps_loads_and_keeps_growing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("HD_LOG_V3.json"),
        r#"[
            {"ts":1,"date":"2026-01-05","day":"A","exercise":"Dumbbell Pullover","weight":"60","units":"lb","reps":"8","clean":true,"notes":""},
            {"ts":2,"date":"2026-01-07","day":"B","exercise":"Spanish Squat (cable)","weight":"90","units":"lb","reps":"15","clean":false,"notes":"deep"}
        ]"#,
    )
    .unwrap();

    {
        let mut tracker = open(&dir);
        let reps: Vec<u32> = tracker.log().iter().map(|e| e.reps).collect();
        assert_eq!(reps, vec![8, 15]);
        assert_eq!(tracker.next_day(), DayTag::C);
        assert_eq!(tracker.last_for(DayTag::A, "Dumbbell Pullover").unwrap().weight, "60");
        tracker
            .add_set(set(DayTag::C, "Triceps Pressdown", "50", Units::Pounds, 10, true), 3)
            .unwrap();
    }

    let reopened = open(&dir);
    assert_eq!(reopened.log().len(), 3);
    assert_eq!(reopened.log()[1].notes, "deep");
    assert_eq!(reopened.next_day(), DayTag::A);
}

#[test]
fn cleared_collections_stay_cleared_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut tracker = open(&dir);
        tracker
            .add_set(set(DayTag::A, "Dumbbell Pullover", "60", Units::Pounds, 8, true), 1)
            .unwrap();
        tracker.add_set(set(DayTag::B, "Spanish Squat (cable)", "90", Units::Pounds, 12, false), 2).unwrap();
        tracker.add_weigh_in("2026-07-14", "182", "", "2026-07-14", 3).unwrap();
        tracker.add_weigh_in("2026-07-15", "181.5", "", "2026-07-15", 4).unwrap();
        tracker.clear_log().unwrap();
        tracker.clear_weigh_ins().unwrap();
        assert!(tracker.log().is_empty());
        assert!(tracker.weigh_ins().is_empty());
    }

    let mut tracker = open(&dir);
    assert!(tracker.log().is_empty());
    assert!(tracker.weigh_ins().is_empty());
    assert_eq!(tracker.next_day(), DayTag::A);
    // Progression targets are kept when the log is cleared.
    assert_eq!(tracker.target_for(DayTag::A, "Dumbbell Pullover").unwrap().weight, "65");
    assert!(tracker.delete_last().is_err());
}

#[test]
fn delete_last_removes_only_the_newest_entry() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = open(&dir);
    tracker.add_set(set(DayTag::A, "Cable Flye (pre-exhaust)", "30", Units::Pounds, 10, false), 300).unwrap();
    tracker.add_set(set(DayTag::B, "Spanish Squat (cable)", "90", Units::Pounds, 15, false), 500).unwrap();
    tracker.add_set(set(DayTag::C, "Triceps Pressdown", "50", Units::Pounds, 8, false), 400).unwrap();

    // The third set was logged with an older clock reading, so its ts was
    // bumped past the newest one.
    let removed = tracker.delete_last().unwrap();
    assert_eq!(removed.exercise, "Triceps Pressdown");
    assert_eq!(removed.ts, 501);

    let removed = tracker.delete_last().unwrap();
    assert_eq!(removed.ts, 500);
    assert_eq!(tracker.next_day(), DayTag::B);

    let reopened = open(&dir);
    assert_eq!(reopened.log().len(), 1);
    assert_eq!(reopened.log()[0].ts, 300);
}

#[test]
fn day_rotation_cycles_through_three_days() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = open(&dir);
    let mut expected = DayTag::A;
    for i in 0..6 {
        assert_eq!(tracker.next_day(), expected);
        let day = tracker.next_day();
        let exercise = tracker.plan().first_exercise(day);
        tracker.add_set(set(day, &exercise, "10", Units::Pounds, 5, false), i).unwrap();
        expected = expected.next();
    }
}

#[test]
fn form_round_trip_through_tracker() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = open(&dir);
    let mut form = SetForm::new(&tracker, "2026-07-14");
    form.select_day(&tracker, DayTag::A);
    form.select_exercise(&tracker, "Weighted Pull-Ups (palms up)");
    assert_eq!(form.units, Units::BodyweightPlus);

    form.weight = "25".to_string();
    form.reps = "4".to_string();
    form.clean = true;
    form.notes = "  strict  ".to_string();
    let logged = tracker.add_set(form.validate("2026-07-14").unwrap(), 10).unwrap();
    assert_eq!(logged.entry.notes, "strict");
    assert_eq!(logged.suggested.unwrap().load_label(), "bw+27.5");

    form.reset_after_submit();
    form.auto_fill(&tracker);
    assert_eq!(form.weight, "27.5");
    assert!(form.reps.is_empty());
    assert_eq!(form.comparison, "Last: bw+25 × 4");

    form.quick_fill_last(&tracker).unwrap();
    assert_eq!(form.weight, "25");
    assert_eq!(form.reps, "4");
    assert!(form.clean);

    form.apply_suggested(&tracker).unwrap();
    assert_eq!(form.weight, "27.5");
}

#[derive(Debug, Deserialize, PartialEq)]
struct LiftRecord {
    date: String,
    day: String,
    exercise: String,
    weight: String,
    units: String,
    reps: String,
    clean: String,
    notes: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct WeighRecord {
    date: String,
    weight: String,
    note: String,
}

#[test]
fn lift_csv_reads_back_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = open(&dir);
    let mut with_notes = set(DayTag::C, "Dips (bodyweight)", "", Units::Bodyweight, 12, true);
    with_notes.notes = "paused, \"deep\" reps".to_string();
    tracker.add_set(with_notes, 2).unwrap();
    tracker.add_set(set(DayTag::B, "Dip-Belt Calf Raise", "45.5", Units::Kilograms, 15, false), 1).unwrap();

    let text = tracker.export_lift_csv().unwrap();
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows: Vec<LiftRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();

    let stored = tracker.log();
    assert_eq!(rows.len(), stored.len());
    for (row, entry) in rows.iter().zip(stored) {
        assert_eq!(row.date, entry.date);
        assert_eq!(row.day, entry.day.as_str());
        assert_eq!(row.exercise, entry.exercise);
        assert_eq!(row.weight, entry.weight);
        assert_eq!(row.units, entry.units.as_str());
        assert_eq!(row.reps, entry.reps.to_string());
        assert_eq!(row.clean, if entry.clean { "1" } else { "0" });
        assert_eq!(row.notes, entry.notes);
    }
}

#[test]
fn weigh_csv_reads_back_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut tracker = open(&dir);
    tracker.add_weigh_in("2026-07-01", "184", "pre, \"fasted\"", "2026-07-14", 10).unwrap();
    tracker.add_weigh_in("2026-07-08", "183.1", "", "2026-07-14", 20).unwrap();

    let text = tracker.export_weigh_csv().unwrap();
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows: Vec<WeighRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(
        rows,
        vec![
            WeighRecord {
                date: "2026-07-01".to_string(),
                weight: "184".to_string(),
                note: "pre, \"fasted\"".to_string(),
            },
            WeighRecord {
                date: "2026-07-08".to_string(),
                weight: "183.1".to_string(),
                note: String::new(),
            },
        ]
    );
}
