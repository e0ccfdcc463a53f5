//! Server Command Wrappers
//!
//! Frontend bindings to server endpoints, organized by domain.

mod session;

pub use session::*;
