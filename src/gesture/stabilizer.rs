//! Temporal confirmation filter.
//!
//! A gesture fires once it has been seen continuously for the confirmation
//! window. Any other label in between, including a low-confidence frame,
//! restarts the window from that frame.

use std::time::Duration;

use log::{debug, info};

use crate::config::GestureSettings;
use crate::playback::Action;

use super::types::{GestureKind, GestureObservation, UNKNOWN_LABEL};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizerConfig {
    pub confidence_threshold: f32,
    pub confirmation: Duration,
    pub volume_step: f32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self::from(&GestureSettings::default())
    }
}

impl From<&GestureSettings> for StabilizerConfig {
    fn from(s: &GestureSettings) -> Self {
        Self {
            confidence_threshold: s.confidence_threshold,
            confirmation: Duration::from_millis(s.confirmation_ms),
            volume_step: s.volume_step,
        }
    }
}

/// How a frame got past the confidence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Accepted,
    /// Treated as "Unknown" whatever its label said.
    LowConfidence,
}

/// The gesture currently accumulating confirmation time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationCandidate {
    pub label: String,
    pub first_observed_at: Duration,
    pub last_observed_at: Duration,
    /// Already fired; held until a different label shows up.
    pub fired: bool,
}

impl ConfirmationCandidate {
    fn start(label: &str, at: Duration) -> Self {
        Self {
            label: label.to_string(),
            first_observed_at: at,
            last_observed_at: at,
            fired: false,
        }
    }

    fn held_for(&self) -> Duration {
        self.last_observed_at.saturating_sub(self.first_observed_at)
    }
}

#[derive(Debug, Default)]
pub struct Stabilizer {
    config: StabilizerConfig,
    candidate: Option<ConfirmationCandidate>,
}

pub fn gate(observation: &GestureObservation, threshold: f32) -> (&str, Gate) {
    // NaN confidence fails this comparison too.
    if observation.confidence >= threshold {
        (observation.label.trim(), Gate::Accepted)
    } else {
        (UNKNOWN_LABEL, Gate::LowConfidence)
    }
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            candidate: None,
        }
    }

    pub fn candidate(&self) -> Option<&ConfirmationCandidate> {
        self.candidate.as_ref()
    }

    /// Confirmation progress of the current candidate in `0.0..=1.0`. Zero for
    /// labels that map to no action.
    pub fn progress(&self) -> f32 {
        let Some(c) = self.candidate.as_ref() else {
            return 0.0;
        };
        if GestureKind::from_label(&c.label).is_none() {
            return 0.0;
        }
        if c.fired || self.config.confirmation.is_zero() {
            return 1.0;
        }
        (c.held_for().as_secs_f32() / self.config.confirmation.as_secs_f32()).min(1.0)
    }

    /// Feed one frame. Returns the action to submit when a gesture is confirmed.
    pub fn observe(&mut self, observation: &GestureObservation) -> Option<Action> {
        let (label, gate) = gate(observation, self.config.confidence_threshold);
        if gate == Gate::LowConfidence {
            debug!(
                "gesture: {} at {:.2} below threshold",
                observation.label, observation.confidence
            );
        }

        let candidate = match self.candidate.as_mut() {
            Some(c) if c.label.eq_ignore_ascii_case(label) => c,
            _ => {
                self.candidate = Some(ConfirmationCandidate::start(label, observation.timestamp));
                return None;
            }
        };

        candidate.last_observed_at = candidate.last_observed_at.max(observation.timestamp);
        if candidate.fired || candidate.held_for() < self.config.confirmation {
            return None;
        }
        candidate.fired = true;

        let kind = GestureKind::from_label(label)?;
        info!("gesture: {label} confirmed");
        Some(kind.action(self.config.volume_step))
    }
}
