//! Learn mode: bind a physical strip or knob to a target by moving it
//!
//! Flow:
//! 1. `toggle()` activates the session in the strip-select step.
//! 2. The host UI arms a target with `arm()`; the surface picks a strip via
//!    `select_strip()` (fed from `Command::LearnSelect`). Either may come first.
//! 3. Once both are known the binding is handed out and the session ends.
//!    A new capture needs a new `toggle()`.

use crate::routing::{RoutingEntry, TargetKind, SLOT_COUNT};
use serde::Serialize;

/// Step of an active learn session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnStep {
    /// Waiting for the user to touch a fader/knob to pick the strip
    AwaitingTrackSelect,
    /// Strip picked, waiting for the target to be armed
    AwaitingControlMove,
}

/// Target waiting to be bound
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnTarget {
    pub kind: TargetKind,
    pub id: i32,
    pub label: String,
    pub min: f32,
    pub max: f32,
}

impl LearnTarget {
    pub fn new(kind: TargetKind, id: i32, label: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            label: label.into(),
            min: 0.0,
            max: 1.0,
        }
    }

    fn into_entry(self) -> RoutingEntry {
        RoutingEntry::new(self.kind, self.id, self.label).with_range(self.min, self.max)
    }
}

/// Binding produced by a completed session
#[derive(Debug, Clone, PartialEq)]
pub struct LearnBinding {
    pub slot: usize,
    pub entry: RoutingEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LearnSession {
    active: bool,
    step: Option<LearnStep>,
    selected_strip: Option<usize>,
    pending: Option<LearnTarget>,
}

impl LearnSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn step(&self) -> Option<LearnStep> {
        self.step
    }

    pub fn pending_target(&self) -> Option<&LearnTarget> {
        self.pending.as_ref()
    }

    pub fn selected_strip(&self) -> Option<usize> {
        self.selected_strip
    }

    /// True while fader/knob movements should also emit `LearnSelect`
    pub fn is_selecting_strip(&self) -> bool {
        self.active && self.step == Some(LearnStep::AwaitingTrackSelect)
    }

    /// Flip learn mode on/off. Turning off discards any partial capture.
    pub fn toggle(&mut self) {
        if self.active {
            self.reset();
        } else {
            self.active = true;
            self.step = Some(LearnStep::AwaitingTrackSelect);
        }
    }

    /// Arm the target to bind. Ignored while inactive.
    pub fn arm(&mut self, target: LearnTarget) -> Option<LearnBinding> {
        if !self.active {
            return None;
        }
        self.pending = Some(target);
        self.try_complete()
    }

    /// Pick the strip to bind. Only accepted during the strip-select step.
    pub fn select_strip(&mut self, strip: usize) -> Option<LearnBinding> {
        if !self.is_selecting_strip() || strip >= SLOT_COUNT {
            return None;
        }
        self.selected_strip = Some(strip);
        self.step = Some(LearnStep::AwaitingControlMove);
        self.try_complete()
    }

    fn try_complete(&mut self) -> Option<LearnBinding> {
        let slot = self.selected_strip?;
        let target = self.pending.take()?;
        self.reset();
        Some(LearnBinding {
            slot,
            entry: target.into_entry(),
        })
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
