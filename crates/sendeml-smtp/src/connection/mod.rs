//! SMTP connection management with type-state pattern.

mod client;
mod config;
mod stream;

pub use client::{
    Client, CommandSender, Connected, Data, MailTransaction, RecipientAdded, Ready,
};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use stream::{SmtpStream, Transport, connect};
