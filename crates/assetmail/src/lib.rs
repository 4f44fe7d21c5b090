//! # assetmail
//!
//! Email notifications for an asset-management app: a submission gate that
//! validates `POST /api/send-email` bodies, relay configuration, and an
//! SMTP-backed [`Mailer`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use assetmail::{RelayConfig, SmtpMailer, handle_submission};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RelayConfig::from_env();
//!     let mailer = SmtpMailer::new(&config);
//!
//!     let body = r#"{"to": "ops@example.com", "subject": "Audit due", "html": "<p>Today</p>"}"#;
//!     let response = handle_submission("POST", body, &config, &mailer).await;
//!     println!("{} {}", response.status, response.body);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
mod mailer;
pub mod submission;

pub use config::RelayConfig;
pub use error::{Result, SubmissionError};
pub use mailer::{Mailer, SmtpMailer};
pub use submission::{
    Recipients, SubmissionRequest, SubmissionResponse, handle_submission, prepare_submission,
};
