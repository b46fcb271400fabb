//! Control-change path: the fixed CC table of the surface

use super::RouteOutcome;
use crate::command::{Command, EngineCall, TransportAction};
use crate::midi::RawMessage;
use crate::routing::{ui_sync_parameter, KNOB_SLOT_OFFSET};
use crate::state::RoutingState;
use tracing::{debug, trace};

/// What a control number does, independent of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Legacy volume CCs 10-11
    LegacyTrackVolume(usize),
    /// Fader 0-3 (routing slot = fader)
    Fader(usize),
    /// Bank buttons A-D, pressed only
    BankSelect(u8),
    /// Step-sequencer pad 0-31, pressed only
    StepToggle(usize),
    Transport(TransportAction),
    NextTrack,
    ToggleLearnMode,
    /// Knob 0-3 (routing slot = 4 + knob)
    Knob(usize),
    /// Track volume 0-7
    TrackVolume(usize),
}

/// Look up a control number in the surface table
pub fn control_action(cc: u8) -> Option<ControlAction> {
    let action = match cc {
        10..=11 => ControlAction::LegacyTrackVolume(usize::from(cc - 10)),
        12..=15 => ControlAction::Fader(usize::from(cc - 12)),
        20..=23 => ControlAction::BankSelect(cc - 20),
        24..=55 => ControlAction::StepToggle(usize::from(cc - 24)),
        59 => ControlAction::Transport(TransportAction::Play),
        60 => ControlAction::Transport(TransportAction::Record),
        61 => ControlAction::Transport(TransportAction::Stop),
        62 => ControlAction::NextTrack,
        63 => ControlAction::ToggleLearnMode,
        70..=73 => ControlAction::Knob(usize::from(cc - 70)),
        74..=81 => ControlAction::TrackVolume(usize::from(cc - 74)),
        _ => return None,
    };
    Some(action)
}

impl super::Router {
    pub(super) fn route_control(&self, msg: &RawMessage, state: &RoutingState, out: &mut RouteOutcome) {
        let Some(action) = control_action(msg.data1) else {
            trace!("Unmapped CC {} (value {})", msg.data1, msg.data2);
            return;
        };

        let pressed = msg.data2 > 0;
        let value = msg.normalized_value();

        match action {
            ControlAction::StepToggle(step) if pressed => out.push(Command::StepToggle { step }),
            ControlAction::BankSelect(bank) if pressed => out.push(Command::BankChange { bank }),
            ControlAction::StepToggle(_) | ControlAction::BankSelect(_) => {
                trace!("CC {} released, ignored", msg.data1);
            }
            ControlAction::Fader(fader) => self.route_strip(fader, value, state, out),
            ControlAction::Knob(knob) => self.route_strip(KNOB_SLOT_OFFSET + knob, value, state, out),
            ControlAction::TrackVolume(track) | ControlAction::LegacyTrackVolume(track) => {
                out.push(Command::TrackVolume { track, volume: value });
                out.call(EngineCall::SetTrackVolume { track, volume: value });
            }
            ControlAction::Transport(action) => out.push(Command::Transport { action }),
            ControlAction::NextTrack => out.push(Command::NextTrack),
            ControlAction::ToggleLearnMode => out.push(Command::ToggleLearnMode),
        }

        debug!("CC {} → {:?}", msg.data1, action);
    }

    /// Fader/knob movement on routing slot `slot`.
    ///
    /// Always emits the UI-sync parameter. While learn mode is picking a
    /// strip the movement also selects it and is not routed; otherwise it goes
    /// through the routing table for the selected track's family.
    fn route_strip(&self, slot: usize, value: f32, state: &RoutingState, out: &mut RouteOutcome) {
        if let Some(parameter) = ui_sync_parameter(slot) {
            out.push(Command::ParameterChange {
                track: state.selected_track,
                parameter,
                value,
            });
        }

        if state.learn.is_selecting_strip() {
            debug!("Learn: strip {} selected", slot);
            out.push(Command::LearnSelect { strip: slot });
            return;
        }

        let Some(track) = state.selected() else {
            trace!("Slot {} not routed: no selected track", slot);
            return;
        };

        match state.routing.apply(slot, value, track.engine, state.selected_track, state.macros.len()) {
            Some(effect) => {
                out.call(effect.call);
                if let Some(command) = effect.command {
                    out.push(command);
                }
            }
            None => trace!("Slot {} unbound for {}", slot, track.engine),
        }
    }
}
