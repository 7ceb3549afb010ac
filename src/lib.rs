//! Paginated reading with a hand-drawn suspense curve.
//!
//! The library holds everything that does not touch the terminal: text
//! layout, the drawing and navigation state machine, result aggregation and
//! export. The binary in `main.rs` adds the event loop and rendering.

pub mod config;
pub mod engine;
pub mod error;
pub mod keymap;
pub mod session;
pub mod store;
pub mod text;
