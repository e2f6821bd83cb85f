//progression.rs

use std::fmt;

use crate::models::{format_result, DayTag, LiftEntry, ProgressionTarget, Units};
use crate::routines::Rule;

/// Newest first. Stable, so entries sharing a timestamp keep insertion order.
pub fn newest_first(log: &[LiftEntry]) -> Vec<&LiftEntry> {
    let mut sorted: Vec<&LiftEntry> = log.iter().collect();
    sorted.sort_by(|a, b| b.ts.cmp(&a.ts));
    sorted
}

pub fn best_guess_next_day(log: &[LiftEntry]) -> DayTag {
    newest_first(log)
        .first()
        .map_or(DayTag::A, |last| last.day.next())
}

pub fn find_last_for_exercise<'a>(
    log: &'a [LiftEntry],
    day: DayTag,
    exercise: &str,
) -> Option<&'a LiftEntry> {
    newest_first(log)
        .into_iter()
        .find(|e| e.day == day && e.exercise == exercise)
}

pub fn compute_suggested_next(
    rule: Option<&Rule>,
    units: Units,
    weight: &str,
    reps: u32,
    clean: bool,
) -> Option<ProgressionTarget> {
    let rule = rule?;
    if !clean || reps < rule.rep_max || rule.increment <= 0.0 || !units.is_weight_bearing() {
        return None;
    }

    let trimmed = weight.trim();
    let current = if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse::<f64>().ok().filter(|w| w.is_finite())?
    };

    let next = ((current + rule.increment) * 2.0).round() / 2.0;
    Some(ProgressionTarget {
        units,
        weight: next.to_string(),
        reps_target: rule.rep_min,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    MoreReps,
    MoreWeight,
    WeightAndReps,
    BelowLast,
    Matched,
}

impl Verdict {
    pub fn classify(weight: f64, reps: u32, last_weight: f64, last_reps: u32) -> Verdict {
        if weight == last_weight && reps > last_reps {
            Verdict::MoreReps
        } else if reps == last_reps && weight > last_weight {
            Verdict::MoreWeight
        } else if weight > last_weight && reps > last_reps {
            Verdict::WeightAndReps
        } else if weight < last_weight && reps < last_reps {
            Verdict::BelowLast
        } else {
            Verdict::Matched
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::MoreReps => "PR: more reps",
            Verdict::MoreWeight => "PR: more weight",
            Verdict::WeightAndReps => "PR: weight + reps",
            Verdict::BelowLast => "Below last (fine on comeback)",
            Verdict::Matched => "Matched last",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Comparison {
    NoPrevious,
    /// Units changed since last time, so loads are not comparable.
    UnitsChanged { last: String },
    Verdict { verdict: Verdict, last: String },
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::NoPrevious => f.write_str("No previous entry"),
            Comparison::UnitsChanged { last } => write!(f, "Last: {last}"),
            Comparison::Verdict { verdict, last } => {
                write!(f, "{} (Last: {last})", verdict.label())
            }
        }
    }
}

pub fn compare_to_last(current: &LiftEntry, last: Option<&LiftEntry>) -> Comparison {
    let Some(last) = last else {
        return Comparison::NoPrevious;
    };
    let last_label = format_result(last);
    if current.units != last.units {
        return Comparison::UnitsChanged { last: last_label };
    }
    Comparison::Verdict {
        verdict: Verdict::classify(current.load(), current.reps, last.load(), last.reps),
        last: last_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(rep_min: u32, rep_max: u32, increment: f64) -> Rule {
        Rule { rep_min, rep_max, increment, units: Units::Pounds }
    }

    fn set(ts: i64, day: DayTag, exercise: &str, weight: &str, reps: u32) -> LiftEntry {
        LiftEntry {
            ts,
            date: "2026-03-02".to_string(),
            day,
            exercise: exercise.to_string(),
            weight: weight.to_string(),
            units: Units::Pounds,
            reps,
            clean: true,
            notes: String::new(),
        }
    }

    #[test]
    fn empty_log_starts_on_day_a() {
        assert_eq!(best_guess_next_day(&[]), DayTag::A);
    }

    #[test]
    fn next_day_follows_newest_entry_not_position() {
        let log = vec![
            set(300, DayTag::B, "Squat", "200", 10),
            set(500, DayTag::C, "Curl", "40", 8),
            set(100, DayTag::A, "Row", "150", 8),
        ];
        assert_eq!(best_guess_next_day(&log), DayTag::A);
    }

    #[test]
    fn last_for_exercise_is_day_specific() {
        let log = vec![
            set(1, DayTag::A, "Row", "150", 8),
            set(2, DayTag::A, "Row", "155", 7),
            set(3, DayTag::B, "Row", "100", 12),
        ];
        let last = find_last_for_exercise(&log, DayTag::A, "Row").unwrap();
        assert_eq!(last.ts, 2);
        assert!(find_last_for_exercise(&log, DayTag::C, "Row").is_none());
    }

    #[test]
    fn clean_top_set_earns_increment() {
        let target = compute_suggested_next(Some(&rule(6, 8, 5.0)), Units::Pounds, "60", 8, true)
            .unwrap();
        assert_eq!(target.weight, "65");
        assert_eq!(target.reps_target, 6);
        assert_eq!(target.units, Units::Pounds);
    }

    #[test]
    fn next_weight_rounds_to_half_units() {
        let target =
            compute_suggested_next(Some(&rule(8, 12, 2.5)), Units::Pounds, "17.3", 12, true)
                .unwrap();
        assert_eq!(target.weight, "20");
        let target =
            compute_suggested_next(Some(&rule(1, 4, 2.5)), Units::BodyweightPlus, "", 4, true)
                .unwrap();
        assert_eq!(target.weight, "2.5");
    }

    #[test]
    fn no_suggestion_unless_every_condition_holds() {
        let r = rule(6, 10, 5.0);
        assert!(compute_suggested_next(None, Units::Pounds, "100", 10, true).is_none());
        assert!(compute_suggested_next(Some(&r), Units::Pounds, "100", 10, false).is_none());
        assert!(compute_suggested_next(Some(&r), Units::Pounds, "100", 9, true).is_none());
        assert!(compute_suggested_next(Some(&r), Units::Bodyweight, "", 12, true).is_none());
        assert!(compute_suggested_next(Some(&rule(6, 12, 0.0)), Units::Pounds, "0", 12, true)
            .is_none());
        assert!(compute_suggested_next(Some(&r), Units::Pounds, "heavy", 10, true).is_none());
        assert!(compute_suggested_next(Some(&r), Units::Pounds, "100", 11, true).is_some());
    }

    #[test]
    fn verdicts_cover_each_label() {
        assert_eq!(Verdict::classify(100.0, 9, 100.0, 8), Verdict::MoreReps);
        assert_eq!(Verdict::classify(105.0, 8, 100.0, 8), Verdict::MoreWeight);
        assert_eq!(Verdict::classify(105.0, 9, 100.0, 8), Verdict::WeightAndReps);
        assert_eq!(Verdict::classify(95.0, 7, 100.0, 8), Verdict::BelowLast);
        assert_eq!(Verdict::classify(100.0, 8, 100.0, 8), Verdict::Matched);
        assert_eq!(Verdict::classify(105.0, 6, 100.0, 8), Verdict::Matched);
    }

    #[test]
    fn comparison_text() {
        let last = set(1, DayTag::A, "Row", "150", 8);
        let current = set(2, DayTag::A, "Row", "150", 9);
        assert_eq!(compare_to_last(&current, None).to_string(), "No previous entry");
        assert_eq!(
            compare_to_last(&current, Some(&last)).to_string(),
            "PR: more reps (Last: 150lb × 8)"
        );

        let mut switched = current.clone();
        switched.units = Units::Kilograms;
        assert_eq!(
            compare_to_last(&switched, Some(&last)).to_string(),
            "Last: 150lb × 8"
        );
    }
}
