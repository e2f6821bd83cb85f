use std::collections::BTreeMap;

use tracing::info;

use crate::error::{Result, TrackerError};
use crate::export;
use crate::form::{parse_number, resolve_date, NewSet};
use crate::models::{Checklist, DailyRecord, DayTag, LiftEntry, ProgressionTarget, WeighIn};
use crate::progression::{
    best_guess_next_day, compare_to_last, compute_suggested_next, find_last_for_exercise,
    newest_first, Comparison,
};
use crate::routines::{Plan, Rule};
use crate::storage::{load_json, save_json, BlobStore, KEY_DAILY, KEY_LOG, KEY_TARGETS, KEY_WEIGH};

pub fn target_key(day: DayTag, exercise: &str) -> String {
    format!("{day}||{exercise}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct Logged {
    pub entry: LiftEntry,
    pub comparison: Comparison,
    pub suggested: Option<ProgressionTarget>,
}

/// Owns the four persisted collections and applies every mutation to them.
/// Each mutation persists the whole collection it touched before returning,
/// and is undone in memory if that write fails.
pub struct Tracker<S: BlobStore> {
    store: S,
    plan: Plan,
    log: Vec<LiftEntry>,
    targets: BTreeMap<String, ProgressionTarget>,
    daily: BTreeMap<String, DailyRecord>,
    weigh: Vec<WeighIn>,
}

impl<S: BlobStore> Tracker<S> {
    pub fn open(store: S, plan: Plan) -> Self {
        let log: Vec<LiftEntry> = load_json(&store, KEY_LOG);
        let targets: BTreeMap<String, ProgressionTarget> = load_json(&store, KEY_TARGETS);
        let daily: BTreeMap<String, DailyRecord> = load_json(&store, KEY_DAILY);
        let weigh: Vec<WeighIn> = load_json(&store, KEY_WEIGH);
        info!(
            sets = log.len(),
            targets = targets.len(),
            days = daily.len(),
            weigh_ins = weigh.len(),
            "opened tracker"
        );
        Self { store, plan, log, targets, daily, weigh }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn rule_for(&self, exercise: &str) -> Option<&Rule> {
        self.plan.rule_for(exercise)
    }

    // ---- lift log ----

    pub fn log(&self) -> &[LiftEntry] {
        &self.log
    }

    pub fn next_day(&self) -> DayTag {
        best_guess_next_day(&self.log)
    }

    pub fn last_for(&self, day: DayTag, exercise: &str) -> Option<&LiftEntry> {
        find_last_for_exercise(&self.log, day, exercise)
    }

    pub fn target_for(&self, day: DayTag, exercise: &str) -> Option<&ProgressionTarget> {
        self.targets.get(&target_key(day, exercise))
    }

    /// Newest-first entries matching a free-text query.
    pub fn search(&self, query: &str) -> Vec<&LiftEntry> {
        let query = query.trim().to_lowercase();
        newest_first(&self.log)
            .into_iter()
            .filter(|e| {
                if query.is_empty() {
                    return true;
                }
                let blob = format!(
                    "{} {} {} {} {}{}x{}",
                    e.date, e.day, e.exercise, e.notes, e.weight, e.units, e.reps
                )
                .to_lowercase();
                blob.contains(&query)
            })
            .collect()
    }

    pub fn add_set(&mut self, set: NewSet, now_ms: i64) -> Result<Logged> {
        let ts = next_ts(self.log.iter().map(|e| e.ts), now_ms)?;
        let entry = LiftEntry {
            ts,
            date: set.date,
            day: set.day,
            exercise: set.exercise,
            weight: set.weight,
            units: set.units,
            reps: set.reps,
            clean: set.clean,
            notes: set.notes,
        };

        let comparison = compare_to_last(&entry, self.last_for(entry.day, &entry.exercise));

        self.log.push(entry.clone());
        if let Err(err) = save_json(&mut self.store, KEY_LOG, &self.log) {
            self.log.pop();
            return Err(err);
        }
        info!(ts, day = %entry.day, exercise = %entry.exercise, reps = entry.reps, "logged set");

        let suggested = compute_suggested_next(
            self.plan.rule_for(&entry.exercise),
            entry.units,
            &entry.weight,
            entry.reps,
            entry.clean,
        );
        if let Some(target) = &suggested {
            let key = target_key(entry.day, &entry.exercise);
            let previous = self.targets.insert(key.clone(), target.clone());
            if let Err(err) = save_json(&mut self.store, KEY_TARGETS, &self.targets) {
                match previous {
                    Some(previous) => self.targets.insert(key, previous),
                    None => self.targets.remove(&key),
                };
                return Err(err);
            }
            info!(exercise = %entry.exercise, next = %target.load_label(), "stored progression target");
        }

        Ok(Logged { entry, comparison, suggested })
    }

    /// Removes the entry with the greatest timestamp.
    pub fn delete_last(&mut self) -> Result<LiftEntry> {
        let idx = self
            .log
            .iter()
            .enumerate()
            .fold(None::<(usize, i64)>, |best, (i, e)| match best {
                Some((_, ts)) if ts >= e.ts => best,
                _ => Some((i, e.ts)),
            })
            .map(|(i, _)| i)
            .ok_or(TrackerError::EmptyLog)?;
        let removed = self.log.remove(idx);
        if let Err(err) = save_json(&mut self.store, KEY_LOG, &self.log) {
            self.log.insert(idx, removed);
            return Err(err);
        }
        info!(ts = removed.ts, exercise = %removed.exercise, "deleted last set");
        Ok(removed)
    }

    pub fn clear_log(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.log);
        if let Err(err) = save_json(&mut self.store, KEY_LOG, &self.log) {
            self.log = previous;
            return Err(err);
        }
        info!("cleared lift log");
        Ok(())
    }

    pub fn export_lift_csv(&self) -> Result<String> {
        export::lift_log_csv(&self.log)
    }

    // ---- nutrition ----

    pub fn daily_for(&self, date: &str) -> DailyRecord {
        self.daily.get(date).copied().unwrap_or_default()
    }

    pub fn save_daily(&mut self, date: &str, checklist: Checklist, now_ms: i64) -> Result<DailyRecord> {
        let record = DailyRecord { checklist, saved_at: Some(now_ms) };
        let previous = self.daily.insert(date.to_string(), record);
        if let Err(err) = save_json(&mut self.store, KEY_DAILY, &self.daily) {
            self.restore_daily(date, previous);
            return Err(err);
        }
        info!(date, shakes = checklist.shakes_taken(), "saved nutrition checklist");
        Ok(record)
    }

    pub fn reset_daily(&mut self, date: &str) -> Result<()> {
        let previous = self.daily.remove(date);
        if let Err(err) = save_json(&mut self.store, KEY_DAILY, &self.daily) {
            self.restore_daily(date, previous);
            return Err(err);
        }
        info!(date, "reset nutrition checklist");
        Ok(())
    }

    fn restore_daily(&mut self, date: &str, previous: Option<DailyRecord>) {
        match previous {
            Some(record) => self.daily.insert(date.to_string(), record),
            None => self.daily.remove(date),
        };
    }

    pub fn nutrition_summary(&self, date: &str) -> String {
        format!("Nutrition: {}/2 shakes", self.daily_for(date).checklist.shakes_taken())
    }

    // ---- weigh-ins ----

    pub fn weigh_ins(&self) -> Vec<&WeighIn> {
        let mut sorted: Vec<&WeighIn> = self.weigh.iter().collect();
        sorted.sort_by(|a, b| b.ts.cmp(&a.ts));
        sorted
    }

    pub fn add_weigh_in(
        &mut self,
        date: &str,
        weight: &str,
        note: &str,
        today: &str,
        now_ms: i64,
    ) -> Result<WeighIn> {
        let value = parse_number(weight)
            .filter(|w| *w > 0.0)
            .ok_or(TrackerError::InvalidBodyweight)?;
        let entry = WeighIn {
            ts: next_ts(self.weigh.iter().map(|w| w.ts), now_ms)?,
            date: resolve_date(date, today)?,
            weight: value.to_string(),
            note: note.trim().to_string(),
        };
        self.weigh.push(entry.clone());
        if let Err(err) = save_json(&mut self.store, KEY_WEIGH, &self.weigh) {
            self.weigh.pop();
            return Err(err);
        }
        info!(ts = entry.ts, weight = %entry.weight, "added weigh-in");
        Ok(entry)
    }

    /// Returns whether an entry with `ts` existed.
    pub fn delete_weigh_in(&mut self, ts: i64) -> Result<bool> {
        let Some(idx) = self.weigh.iter().position(|w| w.ts == ts) else {
            return Ok(false);
        };
        let removed = self.weigh.remove(idx);
        if let Err(err) = save_json(&mut self.store, KEY_WEIGH, &self.weigh) {
            self.weigh.insert(idx, removed);
            return Err(err);
        }
        info!(ts, "deleted weigh-in");
        Ok(true)
    }

    pub fn clear_weigh_ins(&mut self) -> Result<()> {
        let previous = std::mem::take(&mut self.weigh);
        if let Err(err) = save_json(&mut self.store, KEY_WEIGH, &self.weigh) {
            self.weigh = previous;
            return Err(err);
        }
        info!("cleared weigh-ins");
        Ok(())
    }

    pub fn export_weigh_csv(&self) -> Result<String> {
        export::weigh_in_csv(&self.weigh)
    }
}

/// `now_ms`, bumped past every existing timestamp so `ts` stays unique.
fn next_ts(existing: impl Iterator<Item = i64>, now_ms: i64) -> Result<i64> {
    match existing.max() {
        None => Ok(now_ms),
        Some(max) => {
            let bumped = max.checked_add(1).ok_or(TrackerError::TimestampOverflow(max))?;
            Ok(now_ms.max(bumped))
        }
    }
}
