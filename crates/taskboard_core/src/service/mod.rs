//! Core use-case services.
//!
//! # Responsibility
//! - Turn UI commands into registry mutations followed by a snapshot save.
//! - Keep UI/FFI layers free of persistence details.

pub mod board_session;
