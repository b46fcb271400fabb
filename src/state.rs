//! Session state read by the router
//!
//! The host owns `RoutingState`. The router only reads it; the host applies
//! emitted commands (see `RoutingState::apply`) between routing calls.

mod apply;
mod types;

pub use types::{
    ChannelFilter, RoutingState, TrackState, TransportState, DEFAULT_MACRO_COUNT,
    DEFAULT_ROOT_NOTE, DEFAULT_TRACK_COUNT, STEP_COUNT,
};
