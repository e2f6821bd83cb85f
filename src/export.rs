//export.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Result, TrackerError};
use crate::models::{DayTag, LiftEntry, Units, WeighIn};

pub const LIFT_LOG_FILE: &str = "heavy-duty-lift-log.csv";
pub const WEIGH_IN_FILE: &str = "heavy-duty-weighins.csv";

pub const LIFT_LOG_HEADER: [&str; 8] =
    ["date", "day", "exercise", "weight", "units", "reps", "clean", "notes"];
pub const WEIGH_IN_HEADER: [&str; 3] = ["date", "weight", "note"];

#[derive(Serialize)]
struct LiftRow<'a> {
    date: &'a str,
    day: DayTag,
    exercise: &'a str,
    weight: &'a str,
    units: Units,
    reps: u32,
    clean: &'static str,
    notes: &'a str,
}

#[derive(Serialize)]
struct WeighRow<'a> {
    date: &'a str,
    weight: &'a str,
    note: &'a str,
}

fn write_rows<R: Serialize>(header: &[&str], rows: impl Iterator<Item = R>) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let body = writer.into_inner().map_err(|e| TrackerError::Csv(e.into_error().into()))?;

    let mut out = header.join(",");
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&body));
    Ok(out)
}

pub fn lift_log_csv(log: &[LiftEntry]) -> Result<String> {
    let mut sorted: Vec<&LiftEntry> = log.iter().collect();
    sorted.sort_by_key(|e| e.ts);
    write_rows(
        &LIFT_LOG_HEADER,
        sorted.into_iter().map(|e| LiftRow {
            date: &e.date,
            day: e.day,
            exercise: &e.exercise,
            weight: &e.weight,
            units: e.units,
            reps: e.reps,
            clean: if e.clean { "1" } else { "0" },
            notes: &e.notes,
        }),
    )
}

pub fn weigh_in_csv(weigh: &[WeighIn]) -> Result<String> {
    let mut sorted: Vec<&WeighIn> = weigh.iter().collect();
    sorted.sort_by_key(|w| w.ts);
    write_rows(
        &WEIGH_IN_HEADER,
        sorted.into_iter().map(|w| WeighRow { date: &w.date, weight: &w.weight, note: &w.note }),
    )
}

pub fn write_export(dir: &Path, filename: &str, text: &str) -> Result<PathBuf> {
    let path = dir.join(filename);
    fs::create_dir_all(dir)
        .and_then(|()| fs::write(&path, text))
        .map_err(|source| TrackerError::Export { path: path.clone(), source })?;
    info!(path = %path.display(), bytes = text.len(), "exported csv");
    Ok(path)
}
