//! Note path: pads and keys to the selected track

use super::RouteOutcome;
use crate::command::{Command, EngineCall};
use crate::midi::RawMessage;
use crate::remap::{is_reserved_outside_pad_bank, resolve_note};
use crate::state::RoutingState;
use tracing::{debug, trace};

impl super::Router {
    /// Handle a Note On / Note Off.
    ///
    /// Notes never fall through to the CC path, whatever happens here.
    pub(super) fn route_note(&self, msg: &RawMessage, state: &RoutingState, out: &mut RouteOutcome) {
        let track_index = state.selected_track;
        let Some(track) = state.selected() else {
            trace!("Note dropped: no selected track ({})", track_index);
            return;
        };

        if !track.midi_in.accepts(msg.channel) {
            trace!(
                "Note dropped: ch {} filtered by track {} (midi_in {})",
                msg.channel,
                track_index,
                track.midi_in.as_raw()
            );
            return;
        }

        if is_reserved_outside_pad_bank(state.bank, msg.data1) {
            trace!("Note {} dropped: reserved pad range in bank {}", msg.data1, state.bank);
            return;
        }

        let note = resolve_note(msg.data1, state.bank, track.engine, state.pad_scale());

        if msg.is_note_on() {
            let velocity = msg.data2;
            debug!("Track {} trigger n:{} (pad n:{}) v:{}", track_index, note, msg.data1, velocity);
            out.push(Command::NoteTriggered { note, velocity });
            out.call(EngineCall::TriggerNote { track: track_index, note, velocity });
        } else if msg.is_note_release() {
            debug!("Track {} release n:{} (pad n:{})", track_index, note, msg.data1);
            out.push(Command::NoteTriggered { note, velocity: 0 });
            out.call(EngineCall::ReleaseNote { track: track_index, note });
        }
    }
}
