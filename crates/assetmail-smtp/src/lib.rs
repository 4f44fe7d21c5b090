//! # assetmail-smtp
//!
//! A small SMTP submission client for sending one HTML message per session
//! over implicit TLS, authenticating with `AUTH LOGIN`.
//!
//! ## Layers
//!
//! - [`connection`]: splits inbound bytes into reply lines and wraps the
//!   TLS stream in a [`Transport`]
//! - [`protocol`]: a sans-I/O state machine mapping each reply line to the
//!   next command
//! - [`session`]: connects, drives the machine to completion and enforces
//!   the deadline
//!
//! ## Quick Start
//!
//! ```ignore
//! use assetmail_mime::EmailRequest;
//! use assetmail_smtp::{Credentials, SessionOptions, deliver};
//!
//! #[tokio::main]
//! async fn main() -> assetmail_smtp::Result<()> {
//!     let request = EmailRequest::new("assets@example.com", "Weekly report", "<p>Hi</p>")
//!         .to("ops@example.com");
//!     let creds = Credentials::new("smtp.example.com", 465, "relay-user", "s3cret");
//!
//!     let delivered = deliver(&request, &creds, &SessionOptions::default()).await?;
//!     println!("sent to {:?}", delivered.recipients);
//!     Ok(())
//! }
//! ```
//!
//! ## Conversation
//!
//! ```text
//! greeting ─ EHLO ─ capabilities ─ AUTH LOGIN ─ username ─ password
//!     ─ MAIL FROM ─ RCPT TO ─ DATA ─ message ─ QUIT ─ closed
//! ```
//!
//! Each step waits for one exact reply line; anything else is ignored and
//! the session keeps waiting until the relay answers as expected, closes
//! the connection, or the deadline passes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod protocol;
pub mod session;
pub mod types;

pub use connection::{ServerInfo, StreamTransport, Transport};
pub use error::{Error, Result};
pub use protocol::{
    CapabilityPolicy, Conversation, Emission, Machine, ProtocolState, RecipientPolicy,
};
pub use session::{
    Credentials, DEFAULT_DEADLINE, DEFAULT_PORT, Delivered, SessionOptions, deliver, run,
};
pub use types::{AuthMechanism, Extension, ReplyCode};
