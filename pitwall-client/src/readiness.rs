//! Readiness aggregation
//!
//! Blends CRS score, task completion and profile completion into one 0-100
//! score plus a note naming the main limiting factor.
//!
//! # Algorithm
//! 1. No API key, or no driver profile: reset view (`--`, 0%)
//! 2. `task_ratio = completed / total`, 0 when there are no tasks
//! 3. `raw = crs × 0.5 + task_ratio × 100 × 0.3 + profile × 0.2`
//! 4. `score = round(clamp(raw, 0, 100))`
//!
//! CRS is not bounded upstream, so the clamp is load-bearing.

use pitwall_common::{ReadinessInputs, Session};
use std::fmt;

/// Weight of the CRS score
pub const CRS_WEIGHT: f64 = 0.5;
/// Weight of the task completion percentage
pub const TASK_WEIGHT: f64 = 0.3;
/// Weight of the profile completion percentage
pub const PROFILE_WEIGHT: f64 = 0.2;

/// Profile completion below this is flagged first
pub const PROFILE_THRESHOLD: f64 = 60.0;
/// Task ratio below this is flagged second
pub const TASK_RATIO_THRESHOLD: f64 = 0.4;
/// CRS below this is flagged third
pub const CRS_THRESHOLD: f64 = 70.0;
/// Score at or above this counts as strong
pub const STRONG_SCORE: u8 = 80;

/// Advisory note shown under the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessNote {
    LoggedOut,
    NoDriver,
    ProfileIncomplete,
    TasksIncomplete,
    LowCrs,
    Strong,
    KeepRacing,
}

impl ReadinessNote {
    pub fn message(&self) -> &'static str {
        match self {
            ReadinessNote::LoggedOut => "Log in to see readiness.",
            ReadinessNote::NoDriver => "Create a driver profile to unlock readiness.",
            ReadinessNote::ProfileIncomplete => {
                "Profile incomplete. Finish core fields to boost readiness."
            }
            ReadinessNote::TasksIncomplete => "Complete more tasks to unlock higher readiness.",
            ReadinessNote::LowCrs => "Raise CRS with clean, consistent races.",
            ReadinessNote::Strong => "Strong readiness. Target higher-tier events.",
            ReadinessNote::KeepRacing => "Keep racing to improve readiness.",
        }
    }
}

impl fmt::Display for ReadinessNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// What the UI renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessView {
    /// `None` renders as `--`
    pub score: Option<u8>,
    /// Progress bar fill, equal to the score (0 when reset)
    pub fill_percent: u8,
    pub note: ReadinessNote,
}

impl ReadinessView {
    fn reset(note: ReadinessNote) -> Self {
        Self {
            score: None,
            fill_percent: 0,
            note,
        }
    }

    /// Score text: the number, or `--` when there is nothing to show
    pub fn score_display(&self) -> String {
        match self.score {
            Some(score) => score.to_string(),
            None => "--".to_string(),
        }
    }
}

/// Compute the readiness view for a session snapshot
///
/// Never fails; out-of-range inputs are clamped.
pub fn compute_readiness(session: &Session) -> ReadinessView {
    if !session.is_authenticated() {
        return ReadinessView::reset(ReadinessNote::LoggedOut);
    }

    let inputs = &session.readiness;
    if !inputs.has_driver {
        return ReadinessView::reset(ReadinessNote::NoDriver);
    }

    let task_ratio = task_ratio(inputs);
    let score = score(inputs, task_ratio);

    let note = if inputs.profile_completion < PROFILE_THRESHOLD {
        ReadinessNote::ProfileIncomplete
    } else if task_ratio < TASK_RATIO_THRESHOLD {
        ReadinessNote::TasksIncomplete
    } else if inputs.crs_score < CRS_THRESHOLD {
        ReadinessNote::LowCrs
    } else if score >= STRONG_SCORE {
        ReadinessNote::Strong
    } else {
        ReadinessNote::KeepRacing
    };

    ReadinessView {
        score: Some(score),
        fill_percent: score,
        note,
    }
}

/// Completed / total in [0, 1]; zero tasks is 0, not 100%
pub fn task_ratio(inputs: &ReadinessInputs) -> f64 {
    if inputs.tasks_total == 0 {
        return 0.0;
    }
    (f64::from(inputs.tasks_completed) / f64::from(inputs.tasks_total)).clamp(0.0, 1.0)
}

fn score(inputs: &ReadinessInputs, task_ratio: f64) -> u8 {
    let raw = inputs.crs_score * CRS_WEIGHT
        + task_ratio * 100.0 * TASK_WEIGHT
        + inputs.profile_completion * PROFILE_WEIGHT;

    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u8
}
