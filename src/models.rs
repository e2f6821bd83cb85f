//models.rs
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayTag {
    A,
    B,
    C,
}

impl DayTag {
    pub const ALL: [DayTag; 3] = [DayTag::A, DayTag::B, DayTag::C];

    pub fn next(self) -> DayTag {
        match self {
            DayTag::A => DayTag::B,
            DayTag::B => DayTag::C,
            DayTag::C => DayTag::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayTag::A => "A",
            DayTag::B => "B",
            DayTag::C => "C",
        }
    }
}

impl fmt::Display for DayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    #[default]
    #[serde(rename = "lb")]
    Pounds,
    #[serde(rename = "kg")]
    Kilograms,
    /// Bodyweight plus added load (dip belt, vest)
    #[serde(rename = "bw+")]
    BodyweightPlus,
    /// Bodyweight only; the weight field stays empty
    #[serde(rename = "bw")]
    Bodyweight,
}

impl Units {
    pub const ALL: [Units; 4] = [
        Units::Pounds,
        Units::Kilograms,
        Units::BodyweightPlus,
        Units::Bodyweight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Units::Pounds => "lb",
            Units::Kilograms => "kg",
            Units::BodyweightPlus => "bw+",
            Units::Bodyweight => "bw",
        }
    }

    pub fn is_weight_bearing(self) -> bool {
        self != Units::Bodyweight
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiftEntry {
    pub ts: i64,
    pub date: String,
    pub day: DayTag,
    pub exercise: String,
    #[serde(default)]
    pub weight: String,
    pub units: Units,
    #[serde(deserialize_with = "reps_from_number_or_text")]
    pub reps: u32,
    #[serde(default)]
    pub clean: bool,
    #[serde(default)]
    pub notes: String,
}

/// Older logs store reps as text ("8"), newer ones as a number.
fn reps_from_number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reps {
        Whole(u32),
        Fractional(f64),
        Text(String),
    }

    let value = match Reps::deserialize(deserializer)? {
        Reps::Whole(n) => return Ok(n),
        Reps::Fractional(n) => n,
        Reps::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid reps {text:?}")))?,
    };
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(de::Error::custom(format!("reps out of range: {value}")));
    }
    Ok(value.round() as u32)
}

impl LiftEntry {
    /// Load used for comparisons: zero for bodyweight-only and blank weights.
    pub fn load(&self) -> f64 {
        if self.units == Units::Bodyweight {
            return 0.0;
        }
        self.weight.trim().parse::<f64>().ok().filter(|w| w.is_finite()).unwrap_or(0.0)
    }
}

/// Short "what was lifted" rendering used in the log table and badges.
pub fn format_result(entry: &LiftEntry) -> String {
    match entry.units {
        Units::Bodyweight => format!("bw × {}", entry.reps),
        Units::BodyweightPlus => format!("bw+{} × {}", entry.weight, entry.reps),
        units => format!("{}{} × {}", entry.weight, units, entry.reps),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionTarget {
    pub units: Units,
    pub weight: String,
    #[serde(rename = "repsTarget")]
    pub reps_target: u32,
}

impl ProgressionTarget {
    pub fn load_label(&self) -> String {
        match self.units {
            Units::BodyweightPlus => format!("bw+{}", self.weight),
            units => format!("{}{}", self.weight, units),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(default)]
    pub meal1: bool,
    #[serde(default)]
    pub meal2: bool,
    #[serde(default)]
    pub shake1: bool,
    #[serde(default)]
    pub shake2: bool,
    #[serde(default)]
    pub creatine: bool,
    #[serde(default)]
    pub water: bool,
}

impl Checklist {
    pub fn shakes_taken(&self) -> u8 {
        u8::from(self.shake1) + u8::from(self.shake2)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(flatten)]
    pub checklist: Checklist,
    #[serde(rename = "savedAt", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeighIn {
    pub ts: i64,
    pub date: String,
    pub weight: String,
    #[serde(default)]
    pub note: String,
}
