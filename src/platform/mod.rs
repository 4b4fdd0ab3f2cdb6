//! Platform frontends
//!
//! `session` and `input` are shared; `terminal` is the native frontend and
//! `web` the browser one.

pub mod input;
pub mod session;

#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{Command, command_for_key};
pub use session::Session;
