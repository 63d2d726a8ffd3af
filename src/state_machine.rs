//! Editorial state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::{DraftEdit, Event};
pub use state::EditorialState;
pub use transition::{transition, EditorialContext, TransitionError};
