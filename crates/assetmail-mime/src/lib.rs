//! # assetmail-mime
//!
//! Composition of `multipart/alternative` email bodies for SMTP submission.
//!
//! ## Features
//!
//! - **Structured requests**: [`EmailRequest`] with sender, ordered recipients,
//!   subject, HTML body and optional reply-to
//! - **Multipart/alternative**: static plain-text fallback plus the caller's HTML
//! - **Fresh boundaries**: timestamp and sequence derived, unique per message
//! - **Transfer-safe bodies**: CRLF normalization and dot-stuffing
//!
//! ## Quick Start
//!
//! ```ignore
//! use assetmail_mime::{EmailRequest, compose};
//!
//! let request = EmailRequest::new("noreply@example.com", "Hello", "<p>Hi</p>")
//!     .to("someone@example.com");
//! request.validate()?;
//!
//! let message = compose(&request);
//! println!("{}", message.to_wire());
//! ```
//!
//! Header values are written verbatim. Callers must supply text without
//! embedded line breaks and HTML that does not contain the boundary token.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod boundary;
mod compose;
mod content_type;
mod error;
mod header;
mod message;
mod request;

pub mod encoding;

pub use compose::{PLAIN_TEXT_FALLBACK, compose, compose_with_boundary};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{END_OF_DATA, MimeMessage, Part, TransferEncoding};
pub use request::EmailRequest;
