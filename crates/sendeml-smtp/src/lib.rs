//! # sendeml-smtp
//!
//! A minimal SMTP client for relaying prepared messages to a cooperative
//! server: EHLO, MAIL FROM, RCPT TO, DATA, RSET and QUIT over plain TCP.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sendeml_smtp::{Address, Client, SessionConfig};
//!
//! # async fn run() -> sendeml_smtp::Result<()> {
//! let client = Client::connect("localhost", 25, SessionConfig::default()).await?;
//! let client = client.ehlo().await?;
//!
//! let from = Address::new("a001@ah62.example.jp")?;
//! let to = [Address::new("a002@ah62.example.jp")?];
//! let client = client
//!     .send_mail(&from, &to, b"Subject: Test\r\n\r\nHello\r\n")
//!     .await?;
//!
//! client.quit().await
//! # }
//! ```
//!
//! ## Connection States
//!
//! The client uses the type-state pattern to enforce valid SMTP operations:
//!
//! ```text
//! Connected ── ehlo() ──→ Ready ── mail_from() ──→ MailTransaction
//!                           ↑                           │ rcpt_to()
//!                           │                           ↓
//!                           └── send_message() ── Data ←── RecipientAdded
//! ```
//!
//! `reset()` returns to `Ready` and `quit()` is available in every state.
//! Message bytes are sent verbatim; callers own dot-stuffing.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use command::Command;
pub use connection::{
    Client, CommandSender, Connected, Data, MailTransaction, RecipientAdded, Ready, SessionConfig,
};
pub use error::{Error, Result};
pub use types::{Address, Reply, ReplyCode};
