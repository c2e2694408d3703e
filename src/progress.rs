//! Watch-progress bookkeeping for course videos. The host polls its player
//! (about once a second) and hands the raw readings to [`ProgressTracker::tick`].

/// Seconds of playback between two progress reports.
pub const REPORT_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerReading {
    pub current_secs: f64,
    pub duration_secs: f64,
    pub playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub is_loaded: bool,
    pub position_millis: u64,
    pub duration_millis: u64,
    pub is_playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub status: PlaybackStatus,
    /// Whole seconds to report to the backend, when due.
    pub progress: Option<u64>,
    /// Set on the first tick that reaches the end.
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct ProgressTracker {
    last_reported: u64,
    completed: bool,
    initial_position: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::resume_from(0.0)
    }

    /// Tracker for a video resumed at `seconds`; see [`ProgressTracker::initial_position`].
    pub fn resume_from(seconds: f64) -> Self {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        Self {
            last_reported: 0,
            completed: false,
            initial_position: seconds,
        }
    }

    /// Position the host should seek to before playback, if any.
    pub fn initial_position(&self) -> Option<f64> {
        (self.initial_position > 0.0).then_some(self.initial_position)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn tick(&mut self, reading: PlayerReading) -> TickOutcome {
        let current = sanitize(reading.current_secs);
        let duration = sanitize(reading.duration_secs);
        let status = PlaybackStatus {
            is_loaded: duration > 0.0 || current > 0.0,
            position_millis: (current * 1000.0).floor() as u64,
            duration_millis: (duration * 1000.0).floor() as u64,
            is_playing: reading.playing,
        };

        let current_sec = current.floor() as u64;
        let progress = if current_sec.abs_diff(self.last_reported) > REPORT_INTERVAL_SECS {
            self.last_reported = current_sec;
            log::debug!("video progress {current_sec}s");
            Some(current_sec)
        } else {
            None
        };

        let reached_end = duration > 0.0 && current >= duration;
        let completed = reached_end && !self.completed;
        if completed {
            self.completed = true;
            log::debug!("video completed at {current:.1}s");
        }

        TickOutcome {
            status,
            progress,
            completed,
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a tap on the progress bar to a playback position in seconds.
/// Returns `None` while the duration is still unknown.
pub fn seek_target(location_x: f32, bar_width: f32, duration_millis: u64) -> Option<f64> {
    if duration_millis == 0 {
        return None;
    }
    let width = if bar_width > 0.0 { bar_width } else { 1.0 };
    let fraction = (location_x / width).clamp(0.0, 1.0) as f64;
    Some(fraction * duration_millis as f64 / 1000.0)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}
