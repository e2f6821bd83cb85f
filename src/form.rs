//! Entry-tab and nutrition-tab form state. Set fields are kept as the raw
//! text the user typed; nothing is parsed until a set is submitted.

use chrono::{DateTime, Duration, Local, NaiveDate};
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::models::{format_result, Checklist, DailyRecord, DayTag, Units};
use crate::storage::BlobStore;
use crate::tracker::Tracker;

/// Blank counts as zero; anything else must be a finite number.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Blank means today; otherwise the text must be an ISO calendar date.
pub fn resolve_date(text: &str, today: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(today.to_string());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| TrackerError::InvalidDate)
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewSet {
    pub date: String,
    pub day: DayTag,
    pub exercise: String,
    pub weight: String,
    pub units: Units,
    pub reps: u32,
    pub clean: bool,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetForm {
    pub day: DayTag,
    pub exercise: String,
    pub date: String,
    pub units: Units,
    pub weight: String,
    pub reps: String,
    pub clean: bool,
    pub notes: String,
    /// Line under the form: last result, or the verdict after a submit.
    pub comparison: String,
}

impl SetForm {
    pub fn new<S: BlobStore>(tracker: &Tracker<S>, today: &str) -> Self {
        let day = tracker.next_day();
        let mut form = SetForm {
            day,
            exercise: tracker.plan().first_exercise(day),
            date: today.to_string(),
            units: Units::default(),
            weight: String::new(),
            reps: String::new(),
            clean: false,
            notes: String::new(),
            comparison: String::new(),
        };
        form.auto_fill(tracker);
        form
    }

    pub fn select_day<S: BlobStore>(&mut self, tracker: &Tracker<S>, day: DayTag) {
        self.day = day;
        self.exercise = tracker.plan().first_exercise(day);
        self.auto_fill(tracker);
    }

    pub fn select_exercise<S: BlobStore>(&mut self, tracker: &Tracker<S>, exercise: &str) {
        self.exercise = exercise.to_string();
        self.auto_fill(tracker);
    }

    /// Prefill units and weight for the current day/exercise: the stored
    /// target wins, then the last logged set, then the rule's default units.
    pub fn auto_fill<S: BlobStore>(&mut self, tracker: &Tracker<S>) {
        let last = tracker.last_for(self.day, &self.exercise);
        if let Some(target) = tracker.target_for(self.day, &self.exercise) {
            self.units = target.units;
            self.weight = target.weight.clone();
            self.reps.clear();
        } else if let Some(last) = last {
            self.units = last.units;
            self.weight = last.weight.clone();
            self.reps.clear();
        } else if let Some(rule) = tracker.plan().rule_for(&self.exercise) {
            self.units = rule.units;
            self.weight.clear();
            self.reps.clear();
        }
        self.clean = false;
        self.comparison = last.map(|l| format!("Last: {}", format_result(l))).unwrap_or_default();
    }

    pub fn use_last_weight<S: BlobStore>(&mut self, tracker: &Tracker<S>) -> Result<()> {
        let last = tracker
            .last_for(self.day, &self.exercise)
            .ok_or(TrackerError::NothingToLoad("No last entry found."))?;
        self.units = last.units;
        self.weight = last.weight.clone();
        self.reps.clear();
        Ok(())
    }

    pub fn apply_suggested<S: BlobStore>(&mut self, tracker: &Tracker<S>) -> Result<()> {
        let target = tracker
            .target_for(self.day, &self.exercise)
            .ok_or(TrackerError::NothingToLoad("No suggested target yet."))?;
        self.units = target.units;
        self.weight = target.weight.clone();
        self.reps.clear();
        Ok(())
    }

    /// Copies every field of the last same-day set, reps and notes included.
    pub fn quick_fill_last<S: BlobStore>(&mut self, tracker: &Tracker<S>) -> Result<()> {
        let last = tracker
            .last_for(self.day, &self.exercise)
            .ok_or(TrackerError::NothingToLoad("No previous entry for this exercise/day."))?;
        self.units = last.units;
        self.weight = last.weight.clone();
        self.reps = last.reps.to_string();
        self.notes = last.notes.clone();
        self.clean = last.clean;
        Ok(())
    }

    pub fn set_today(&mut self, today: &str) {
        self.date = today.to_string();
    }

    pub fn validate(&self, today: &str) -> Result<NewSet> {
        let reps = self
            .reps
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|r| *r > 0)
            .ok_or(TrackerError::InvalidReps)?;

        let weight = if self.units == Units::Bodyweight {
            String::new()
        } else {
            parse_number(&self.weight)
                .filter(|w| *w >= 0.0)
                .ok_or(TrackerError::InvalidWeight)?
                .to_string()
        };

        Ok(NewSet {
            date: resolve_date(&self.date, today)?,
            day: self.day,
            exercise: self.exercise.clone(),
            weight,
            units: self.units,
            reps,
            clean: self.clean,
            notes: self.notes.trim().to_string(),
        })
    }

    pub fn reset_after_submit(&mut self) {
        self.reps.clear();
        self.notes.clear();
        self.clean = false;
    }
}

/// The nutrition checklist being edited, with ticks not yet saved.
#[derive(Clone, Debug, PartialEq)]
pub struct ChecklistForm {
    pub date: String,
    pub checklist: Checklist,
    last_refresh: Option<DateTime<Local>>,
}

impl ChecklistForm {
    pub fn new<S: BlobStore>(tracker: &Tracker<S>, today: &str) -> Self {
        ChecklistForm {
            date: today.to_string(),
            checklist: tracker.daily_for(today).checklist,
            last_refresh: None,
        }
    }

    /// Once a minute at most: on a new `today`, load that day's checklist.
    pub fn refresh<S: BlobStore>(
        &mut self,
        tracker: &Tracker<S>,
        now: DateTime<Local>,
        today: &str,
    ) -> bool {
        let due = self.last_refresh.map_or(true, |last| now - last >= Duration::minutes(1));
        if !due {
            return false;
        }
        self.last_refresh = Some(now);
        if today == self.date {
            return false;
        }
        debug!(date = today, "nutrition day rolled over");
        self.date = today.to_string();
        self.checklist = tracker.daily_for(today).checklist;
        true
    }

    pub fn save<S: BlobStore>(&self, tracker: &mut Tracker<S>, now_ms: i64) -> Result<DailyRecord> {
        tracker.save_daily(&self.date, self.checklist, now_ms)
    }

    pub fn reset<S: BlobStore>(&mut self, tracker: &mut Tracker<S>) -> Result<()> {
        tracker.reset_daily(&self.date)?;
        self.checklist = tracker.daily_for(&self.date).checklist;
        Ok(())
    }
}
