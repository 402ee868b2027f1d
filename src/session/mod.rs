//! Agent event-stream session manager.
//!
//! [`state::SessionState`] is the projection a renderer draws,
//! [`reducer`] folds protocol events into it, and
//! [`controller::SessionController`] owns the live run that feeds the reducer.

pub mod controller;
pub mod reducer;
pub mod state;

pub use controller::{RunId, SessionController};
pub use reducer::reduce;
pub use state::SessionState;
