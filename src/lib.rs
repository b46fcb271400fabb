//! Groovebox router
//!
//! Translates raw control-surface MIDI (pads, faders, knobs, transport
//! buttons) into typed commands for the groovebox session and calls for its
//! sound engine. One synchronous, infallible pass per message:
//!
//! ```
//! use groovebox_router::router::Router;
//! use groovebox_router::state::RoutingState;
//!
//! let router = Router::new();
//! let state = RoutingState::new();
//! let outcome = router.route(&[0x90, 60, 100], &state);
//! assert_eq!(outcome.commands.len(), 1);
//! ```

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod learn;
pub mod midi;
pub mod remap;
pub mod router;
pub mod routing;
pub mod scale;
pub mod state;
