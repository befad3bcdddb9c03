//! Input polling for the sample.
//!
//! The front-end feeds raw key and mouse events into an [`InputState`] and
//! clears per-frame state once the frame's hooks have run. Consumers read
//! through the [`InputSource`] trait and never see window-system types.
//!
//! # Invariants
//! - A key press is reported once per physical press, never while held.
//! - Mouse motion accumulates until the next `end_frame`.

pub mod action;
pub mod state;

pub use action::{Action, KeyBindings};
pub use state::{InputSource, InputState, Key};
