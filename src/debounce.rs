use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::types::{ActionEvent, GestureLabel};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Minimum interval between two outbound action events. While the
    /// window is open no transition is evaluated at all, whatever the
    /// gesture stream does.
    pub cooldown_secs: f32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { cooldown_secs: 1.0 }
    }
}

impl DebounceConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.cooldown_secs)
    }
}

/// Two-state machine, on purpose not a symmetric grab/release toggle.
/// `Armed -> AwaitingGrab` is a local-only transition with no external
/// effect: the remote sink alone decides when a release is final, so an
/// opened hand merely re-arms the next grab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArmState {
    AwaitingGrab,
    Armed,
}

pub struct ActionDebouncer {
    state: ArmState,
    last_emit: Option<Instant>,
    cooldown: Duration,
}

impl ActionDebouncer {
    pub fn new(cfg: &DebounceConfig) -> Self {
        Self {
            state: ArmState::AwaitingGrab,
            last_emit: None,
            cooldown: cfg.cooldown(),
        }
    }

    /// Feed one frame's net gesture. Returns the action to send out, if any.
    /// An Ambiguous label (which also stands for "no hand detected") never
    /// transitions and never touches the timer.
    pub fn observe(&mut self, gesture: GestureLabel, now: Instant) -> Option<ActionEvent> {
        let cooled_down = self
            .last_emit
            .is_none_or(|at| now.duration_since(at) > self.cooldown);
        if !cooled_down {
            return None;
        }

        match (gesture, self.state) {
            (GestureLabel::Closed, ArmState::AwaitingGrab) => {
                self.state = ArmState::Armed;
                self.last_emit = Some(now);
                Some(ActionEvent::Grab)
            }
            // Silent local re-arm; the emit timestamp stays where it was so
            // the cooldown keeps counting from the last real event.
            (GestureLabel::Open, ArmState::Armed) => {
                self.state = ArmState::AwaitingGrab;
                None
            }
            _ => None,
        }
    }
}
