//! Review session workflow.
//!
//! One image at a time: fetch it, run extraction, let the reviewer correct
//! the text, record the label, move on. The rules live in a pure transition
//! core (`transition`); `controller` performs the collaborator calls.

mod controller;
mod state;
mod transition;

pub use controller::WorkflowController;
pub use state::{
    BusyFlags, BusyKind, ItemStatus, Notice, ReviewItem, SessionState, SessionSummary, Tally,
};
pub use transition::{Completion, Effect, Op, Rejection, Session};
