use std::io::{self, ErrorKind, Write};
use std::process::{Child, Command, Stdio};

use chrono::{DateTime, Duration, Local};
use tracing::{debug, warn};

use crate::cadence::Cue;

const BEEP_MS: i64 = 120;
const VIBRATE_MS: i64 = 30;

/// Speech commands tried in order; the first one that spawns is kept.
const SPEECH_COMMANDS: [&str; 3] = ["spd-say", "say", "espeak"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CueOptions {
    pub voice: bool,
    pub beep: bool,
    pub vibrate: bool,
}

impl Default for CueOptions {
    fn default() -> Self {
        Self { voice: true, beep: true, vibrate: true }
    }
}

pub trait CueSink {
    fn beep(&mut self, freq_hz: f32, ms: i64);
    fn vibrate(&mut self, ms: i64);
    fn speak(&mut self, text: &str);
    /// Drops any speech still queued or playing.
    fn cancel(&mut self);
}

pub fn deliver(sink: &mut dyn CueSink, cue: &Cue, options: CueOptions) {
    if options.beep {
        sink.beep(cue.freq_hz, BEEP_MS);
    }
    if options.vibrate {
        sink.vibrate(VIBRATE_MS);
    }
    if options.voice {
        sink.speak(&cue.text);
    }
}

#[derive(Debug, Default)]
pub struct DesktopCues {
    speaker: Option<Child>,
    /// `None` until first used, then the working command (if any).
    speech_command: Option<Option<&'static str>>,
    pulse_until: Option<DateTime<Local>>,
}

impl DesktopCues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulsing(&self, now: DateTime<Local>) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }

    fn spawn_speech(command: &str, text: &str) -> io::Result<Child> {
        Command::new(command)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
    }
}

impl CueSink for DesktopCues {
    /// The terminal bell has a single pitch, so `freq_hz` only shows in logs.
    fn beep(&mut self, freq_hz: f32, ms: i64) {
        let mut err = io::stderr();
        if let Err(e) = err.write_all(b"\x07").and_then(|()| err.flush()) {
            debug!(error = %e, "bell unavailable");
        }
        debug!(freq_hz, ms, "beep");
    }

    fn vibrate(&mut self, ms: i64) {
        self.pulse_until = Some(Local::now() + Duration::milliseconds(ms.max(150)));
    }

    fn speak(&mut self, text: &str) {
        self.cancel();
        let candidates: Vec<&'static str> = match self.speech_command {
            Some(Some(found)) => vec![found],
            Some(None) => return,
            None => SPEECH_COMMANDS.to_vec(),
        };
        for command in candidates {
            match Self::spawn_speech(command, text) {
                Ok(child) => {
                    self.speaker = Some(child);
                    self.speech_command = Some(Some(command));
                    return;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(command, error = %e, "speech command failed");
                    return;
                }
            }
        }
        warn!("no speech command found, voice cues disabled");
        self.speech_command = Some(None);
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.speaker.take() {
            // Already-finished children report an error here; nothing to do.
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for DesktopCues {
    fn drop(&mut self) {
        self.cancel();
    }
}
