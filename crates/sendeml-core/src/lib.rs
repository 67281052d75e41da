//! # sendeml-core
//!
//! Batch logic for `SendEML`.
//!
//! This crate provides:
//! - **Settings** - JSON settings with an explicit validator that reports
//!   every problem in one pass
//! - **Batch driver** - sends a list of `.eml` files over one SMTP session,
//!   or one session per file in parallel mode

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod batch;
mod error;
pub mod settings;

pub use batch::{
    BatchReport, Envelope, prepare_message, run_session, send_batch, send_messages,
};
pub use error::{Error, Result};
pub use settings::{ConfigError, Settings, Violation, make_json_sample};
