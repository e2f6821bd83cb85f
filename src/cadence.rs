//! Rep-cadence coach driven by wall-clock polling.

use std::fmt;

use chrono::{DateTime, Duration, Local};
use tracing::debug;

use crate::error::{Result, TrackerError};

pub const DEFAULT_DOWN_SECS: u32 = 4;
pub const DEFAULT_UP_SECS: u32 = 2;
pub const DEFAULT_REPS: u32 = 8;

const START_HZ: f32 = 880.0;
const COUNT_HZ: f32 = 660.0;
const UP_HZ: f32 = 990.0;
const DONE_HZ: f32 = 520.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Cue {
    pub text: String,
    pub freq_hz: f32,
}

impl Cue {
    fn new(text: impl Into<String>, freq_hz: f32) -> Self {
        Self { text: text.into(), freq_hz }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Down,
    Up,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Down => "down",
            Phase::Up => "up",
        })
    }
}

/// Parses the three cadence fields; each must be a positive whole number.
pub fn parse_cadence(down: &str, up: &str, reps: &str) -> Result<(u32, u32, u32)> {
    let positive = |text: &str| text.trim().parse::<u32>().ok().filter(|n| *n > 0);
    match (positive(down), positive(up), positive(reps)) {
        (Some(d), Some(u), Some(r)) => Ok((d, u, r)),
        _ => Err(TrackerError::InvalidCadence),
    }
}

#[derive(Debug, Clone)]
pub struct CadenceCoach {
    phase: Phase,
    rep: u32,
    secs_left: u32,
    down: u32,
    up: u32,
    reps: u32,
    last_tick: Option<DateTime<Local>>,
}

impl Default for CadenceCoach {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            rep: 0,
            secs_left: 0,
            down: DEFAULT_DOWN_SECS,
            up: DEFAULT_UP_SECS,
            reps: DEFAULT_REPS,
            last_tick: None,
        }
    }
}

impl CadenceCoach {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rep(&self) -> u32 {
        self.rep
    }

    /// Restarts the coach from rep one and returns the opening cue.
    pub fn start(&mut self, down: u32, up: u32, reps: u32, now: DateTime<Local>) -> Cue {
        self.stop();
        self.down = down;
        self.up = up;
        self.reps = reps;
        self.phase = Phase::Down;
        self.secs_left = down;
        self.last_tick = Some(now);
        debug!(down, up, reps, "cadence started");
        Cue::new("Start. Rep one. Down.", START_HZ)
    }

    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
        self.rep = 0;
        self.secs_left = 0;
        self.last_tick = None;
    }

    /// Runs one tick per whole second elapsed since the previous tick.
    pub fn poll(&mut self, now: DateTime<Local>) -> Vec<Cue> {
        let mut cues = Vec::new();
        let second = Duration::seconds(1);
        while let Some(last) = self.last_tick {
            if now - last < second {
                break;
            }
            self.last_tick = Some(last + second);
            if let Some(cue) = self.tick() {
                cues.push(cue);
            }
        }
        cues
    }

    fn tick(&mut self) -> Option<Cue> {
        if self.phase == Phase::Idle {
            return None;
        }
        self.secs_left = self.secs_left.saturating_sub(1);
        if self.secs_left > 0 {
            return (self.secs_left <= 3).then(|| Cue::new(self.secs_left.to_string(), COUNT_HZ));
        }

        match self.phase {
            Phase::Down => {
                self.phase = Phase::Up;
                self.secs_left = self.up;
                Some(Cue::new("Up.", UP_HZ))
            }
            Phase::Up => {
                self.rep += 1;
                if self.rep >= self.reps {
                    self.stop();
                    debug!("cadence set complete");
                    return Some(Cue::new("Set complete.", DONE_HZ));
                }
                self.phase = Phase::Down;
                self.secs_left = self.down;
                Some(Cue::new(format!("Rep {}. Down.", self.rep + 1), START_HZ))
            }
            Phase::Idle => None,
        }
    }

    pub fn status(&self) -> String {
        match self.phase {
            Phase::Idle => "Idle".to_string(),
            phase => format!("Rep {}/{} - {} ({}s)", self.rep, self.reps, phase, self.secs_left),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn texts(cues: &[Cue]) -> Vec<&str> {
        cues.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn cadence_fields_must_be_positive_integers() {
        assert_eq!(parse_cadence("4", "2", "8").unwrap(), (4, 2, 8));
        assert!(parse_cadence("0", "2", "8").is_err());
        assert!(parse_cadence("4", "", "8").is_err());
        assert!(parse_cadence("4", "2", "x").is_err());
    }

    #[test]
    fn full_two_rep_set() {
        let mut coach = CadenceCoach::new();
        let first = coach.start(4, 2, 2, at(0));
        assert_eq!(first.text, "Start. Rep one. Down.");
        assert_eq!(coach.status(), "Rep 0/2 - down (4s)");

        assert!(coach.poll(at(0)).is_empty());
        let cues = coach.poll(at(4));
        assert_eq!(texts(&cues), ["3", "2", "1", "Up."]);
        let cues = coach.poll(at(6));
        assert_eq!(texts(&cues), ["1", "Rep 2. Down."]);
        assert_eq!(coach.rep(), 1);

        let cues = coach.poll(at(12));
        assert_eq!(texts(&cues), ["3", "2", "1", "Up.", "1", "Set complete."]);
        assert!(!coach.is_running());
        assert_eq!(coach.status(), "Idle");
        assert!(coach.poll(at(20)).is_empty());
    }

    #[test]
    fn long_phase_stays_quiet_until_last_three_seconds() {
        let mut coach = CadenceCoach::new();
        coach.start(6, 1, 1, at(0));
        assert!(coach.poll(at(2)).is_empty());
        assert_eq!(coach.status(), "Rep 0/1 - down (4s)");
        let cues = coach.poll(at(3));
        assert_eq!(texts(&cues), ["3"]);
        assert_eq!(cues[0].freq_hz, COUNT_HZ);
    }

    #[test]
    fn stop_resets_state() {
        let mut coach = CadenceCoach::new();
        coach.start(4, 2, 8, at(0));
        coach.poll(at(5));
        coach.stop();
        assert_eq!(coach.phase(), Phase::Idle);
        assert_eq!(coach.rep(), 0);
        assert!(coach.poll(at(30)).is_empty());
    }
}
