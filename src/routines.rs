use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TrackerError};
use crate::models::{DayTag, Units};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub title: String,
    pub exercises: Vec<String>,
}

/// Rep range and load step for one exercise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "repMin")]
    pub rep_min: u32,
    #[serde(rename = "repMax")]
    pub rep_max: u32,
    #[serde(rename = "inc")]
    pub increment: f64,
    pub units: Units,
}

impl Rule {
    pub fn rep_range_label(&self) -> String {
        format!("{}–{} reps", self.rep_min, self.rep_max)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub days: BTreeMap<DayTag, DayPlan>,
    #[serde(default)]
    pub rules: HashMap<String, Rule>,
}

impl Plan {
    pub fn from_json(text: &str) -> Result<Plan> {
        let plan: Plan = serde_json::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<()> {
        for day in DayTag::ALL {
            match self.days.get(&day) {
                None => return Err(TrackerError::InvalidPlan(format!("day {day} is missing"))),
                Some(plan) if plan.exercises.is_empty() => {
                    return Err(TrackerError::InvalidPlan(format!("day {day} has no exercises")))
                }
                Some(_) => {}
            }
        }
        for (exercise, rule) in &self.rules {
            if rule.rep_min > rule.rep_max {
                return Err(TrackerError::InvalidPlan(format!(
                    "{exercise}: repMin is above repMax"
                )));
            }
            if !rule.increment.is_finite() || rule.increment < 0.0 {
                return Err(TrackerError::InvalidPlan(format!(
                    "{exercise}: inc must be zero or more"
                )));
            }
        }
        Ok(())
    }

    /// Validated plans always carry every day; the fallback only covers
    /// hand-built values.
    pub fn day(&self, day: DayTag) -> &DayPlan {
        static EMPTY: DayPlan = DayPlan { title: String::new(), exercises: Vec::new() };
        self.days.get(&day).unwrap_or(&EMPTY)
    }

    pub fn exercises(&self, day: DayTag) -> &[String] {
        &self.day(day).exercises
    }

    pub fn first_exercise(&self, day: DayTag) -> String {
        self.exercises(day).first().cloned().unwrap_or_default()
    }

    pub fn rule_for(&self, exercise: &str) -> Option<&Rule> {
        self.rules.get(exercise)
    }
}

impl Default for Plan {
    fn default() -> Self {
        let lb = Units::Pounds;
        let day = |title: &str, exercises: &[&str]| DayPlan {
            title: title.to_string(),
            exercises: exercises.iter().map(|e| e.to_string()).collect(),
        };
        let rule = |rep_min, rep_max, increment, units| Rule { rep_min, rep_max, increment, units };

        let days = BTreeMap::from([
            (
                DayTag::A,
                day(
                    "Day A - Chest & Back",
                    &[
                        "Cable Flye (pre-exhaust)",
                        "Incline Barbell Press (close grip)",
                        "Dumbbell Pullover",
                        "Weighted Pull-Ups (palms up)",
                        "Seated Cable Row (or Landmine Row)",
                    ],
                ),
            ),
            (
                DayTag::B,
                day(
                    "Day B - Legs",
                    &[
                        "Spanish Squat (cable)",
                        "Cable Leg Extension (bench)",
                        "Seated Cable Hamstring Curl (bench)",
                        "Dip-Belt Calf Raise",
                    ],
                ),
            ),
            (
                DayTag::C,
                day(
                    "Day C - Delts & Arms",
                    &[
                        "Cable Lateral Raise",
                        "Barbell Curl (via cable) + Rest-Pause",
                        "Triceps Pressdown",
                        "Dips (bodyweight)",
                    ],
                ),
            ),
        ]);

        let rules = [
            ("Cable Flye (pre-exhaust)", rule(8, 12, 2.5, lb)),
            ("Incline Barbell Press (close grip)", rule(1, 3, 5.0, lb)),
            ("Dumbbell Pullover", rule(6, 8, 5.0, lb)),
            ("Weighted Pull-Ups (palms up)", rule(1, 4, 2.5, Units::BodyweightPlus)),
            ("Seated Cable Row (or Landmine Row)", rule(6, 10, 5.0, lb)),
            ("Spanish Squat (cable)", rule(10, 20, 5.0, lb)),
            ("Cable Leg Extension (bench)", rule(8, 15, 5.0, lb)),
            ("Seated Cable Hamstring Curl (bench)", rule(8, 12, 5.0, lb)),
            ("Dip-Belt Calf Raise", rule(10, 15, 5.0, lb)),
            ("Cable Lateral Raise", rule(10, 15, 2.5, lb)),
            ("Barbell Curl (via cable) + Rest-Pause", rule(1, 3, 2.5, lb)),
            ("Triceps Pressdown", rule(6, 10, 5.0, lb)),
            ("Dips (bodyweight)", rule(6, 12, 0.0, Units::Bodyweight)),
        ]
        .into_iter()
        .map(|(name, rule)| (name.to_string(), rule))
        .collect();

        Plan { days, rules }
    }
}

/// Reads the plan override at `path`, falling back to the built-in plan when
/// the file is absent or unusable.
pub fn load_plan(path: &Path) -> Plan {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Plan::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read plan override");
            return Plan::default();
        }
    };
    match Plan::from_json(&text) {
        Ok(plan) => {
            info!(path = %path.display(), "loaded plan override");
            plan
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring invalid plan override");
            Plan::default()
        }
    }
}
