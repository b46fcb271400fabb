//! Hardware self-test: pad presses are echoed straight back to the surface

use super::RouteOutcome;
use crate::midi::{encode_note_on, RawMessage, MAX_DATA};
use crate::remap::resolve_note;
use crate::state::RoutingState;
use tracing::debug;

impl super::Router {
    /// Echo a Note On at full velocity on the same channel.
    ///
    /// The note is resolved for the selected track's family; without a
    /// selected track the physical note is echoed.
    pub(super) fn echo_pad(&self, msg: &RawMessage, state: &RoutingState, out: &mut RouteOutcome) {
        let note = state
            .selected()
            .map(|track| resolve_note(msg.data1, state.bank, track.engine, state.pad_scale()))
            .unwrap_or(msg.data1);

        let bytes = encode_note_on(msg.channel, note, MAX_DATA);
        debug!("Echo ch:{} n:{} → {:02X?}", msg.channel, note, bytes);
        out.echo.push(bytes);
    }
}
