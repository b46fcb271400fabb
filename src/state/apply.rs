//! Reference host: applies router commands to the session
//!
//! Out-of-range indices are logged and ignored; nothing here panics.

use super::RoutingState;
use crate::command::{Command, TransportAction};
use crate::learn::{LearnBinding, LearnTarget};
use crate::routing::{ui_sync_slot, RoutingLayer};
use tracing::{debug, info, warn};

impl RoutingState {
    /// Apply commands in emission order
    pub fn apply_all<'a>(&mut self, commands: impl IntoIterator<Item = &'a Command>) {
        for command in commands {
            self.apply(command);
        }
    }

    /// Apply one command
    pub fn apply(&mut self, command: &Command) {
        match *command {
            Command::BankChange { bank } => {
                debug!("Bank → {}", bank);
                self.bank = bank;
            }
            Command::TrackVolume { track, volume } => match self.tracks.get_mut(track) {
                Some(t) => t.volume = volume,
                None => warn!("TrackVolume for unknown track {}", track),
            },
            Command::ParameterChange { track, parameter, value } => {
                if let Some(slot) = ui_sync_slot(parameter) {
                    self.strip_values[slot] = value;
                } else {
                    match self.tracks.get_mut(track) {
                        Some(t) => {
                            t.parameters.insert(parameter, value);
                        }
                        None => warn!("ParameterChange for unknown track {}", track),
                    }
                }
            }
            Command::Transport { action } => {
                match action {
                    TransportAction::Play => self.transport.playing = true,
                    TransportAction::Stop => {
                        self.transport.playing = false;
                        self.transport.recording = false;
                    }
                    TransportAction::Record => self.transport.recording = !self.transport.recording,
                }
                debug!("Transport {:?} → {:?}", action, self.transport);
            }
            Command::NextTrack => {
                if !self.tracks.is_empty() {
                    self.selected_track = (self.selected_track + 1) % self.tracks.len();
                    debug!("Selected track → {}", self.selected_track);
                }
            }
            Command::ToggleLearnMode => {
                self.learn.toggle();
                info!("Learn mode {}", if self.learn.is_active() { "on" } else { "off" });
            }
            Command::LearnSelect { strip } => {
                if let Some(binding) = self.learn.select_strip(strip) {
                    self.bind_learned(binding);
                }
            }
            Command::MacroValue { index, value } => match self.macros.get_mut(index) {
                Some(m) => *m = value,
                None => warn!("MacroValue for unknown macro {}", index),
            },
            Command::NoteTriggered { note, velocity } => {
                if velocity > 0 {
                    self.held_notes.insert(note);
                    self.last_note = Some((note, velocity));
                } else {
                    self.held_notes.remove(&note);
                }
            }
            Command::StepToggle { step } => {
                let Some(track) = self.selected_mut() else {
                    warn!("StepToggle without a selected track");
                    return;
                };
                match track.steps.get_mut(step) {
                    Some(active) => *active = !*active,
                    None => warn!("StepToggle for unknown step {}", step),
                }
            }
        }
    }

    /// Arm a learn target from the UI; completes the binding if a strip is
    /// already picked.
    pub fn arm_learn(&mut self, target: LearnTarget) {
        if let Some(binding) = self.learn.arm(target) {
            self.bind_learned(binding);
        }
    }

    fn bind_learned(&mut self, binding: LearnBinding) {
        let Some(family) = self.selected().map(|t| t.engine) else {
            warn!("Learn binding dropped: no selected track");
            return;
        };

        let label = binding.entry.label.clone();
        match self.routing.bind_learned(RoutingLayer::Family(family), binding.slot, binding.entry) {
            Ok(_) => info!("Learned slot {} → '{}' ({})", binding.slot, label, family),
            Err(_) => warn!("Learn binding dropped: slot {} out of range", binding.slot),
        }
    }
}
