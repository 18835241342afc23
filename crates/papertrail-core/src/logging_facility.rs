//! Structured logging facility
//!
//! - Single initialization via `init(profile)`
//! - Structured macros (`log_op_start!`, `log_op_end!`, `log_op_error!`,
//!   `log_op_absorbed!`)
//! - Test capture mode for deterministic assertions
//!
//! ```rust
//! use papertrail_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
