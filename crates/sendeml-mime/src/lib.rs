//! # sendeml-mime
//!
//! Raw-byte handling of `.eml` messages before they are sent.
//!
//! ## Features
//!
//! - **No decoding**: messages are scanned as bytes, so any charset or
//!   8-bit body passes through untouched
//! - **Header/body split**: on the first `CRLF CRLF`, reversible byte for byte
//! - **Folding aware**: continuation lines of a replaced field are removed
//! - **Field rewriting**: fresh `Date` and random `Message-ID` values
//!
//! ## Quick Start
//!
//! ```
//! use sendeml_mime::{replace_mail, split_mail};
//!
//! let mail = b"Subject: test\r\nDate: Sun, 26 Jul 2020 22:01:37 +0900\r\n\r\nbody";
//!
//! let (header, body) = split_mail(mail).ok_or("no blank line")?;
//! assert_eq!(body, b"body");
//! assert!(header.ends_with(b"+0900"));
//!
//! let rewritten = replace_mail(mail, true, false)?;
//! assert!(rewritten.starts_with(b"Subject: test\r\nDate: "));
//! assert!(rewritten.ends_with(b"\r\n\r\nbody"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`scan`]: byte search primitives
//! - [`line`]: physical header lines and folding
//! - [`mail`]: header/body split and combine
//! - [`rewrite`]: `Date` / `Message-ID` replacement

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
#[cfg(test)]
mod fixtures;

pub mod line;
pub mod mail;
pub mod rewrite;
pub mod scan;

pub use error::{Error, Result};
pub use line::{is_date_line, is_message_id_line, match_field, split_lines};
pub use mail::{combine_mail, find_blank_line, split_mail};
pub use rewrite::{
    make_now_date_line, make_random_message_id_line, replace_header, replace_mail,
};
