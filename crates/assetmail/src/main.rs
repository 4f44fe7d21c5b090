//! `assetmail-send`: delivers one JSON submission read from stdin.
//!
//! Relay settings come from `SMTP_*` environment variables, or from a JSON
//! file given as the only argument. The gate's JSON response is printed to
//! stdout; the exit status is non-zero unless the relay accepted the message.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assetmail::{RelayConfig, SmtpMailer, handle_submission};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assetmail=info,assetmail_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RelayConfig::from_file(&path)
            .with_context(|| format!("loading relay configuration from {path}"))?,
        None => RelayConfig::from_env(),
    };

    let mut body = String::new();
    tokio::io::stdin()
        .read_to_string(&mut body)
        .await
        .context("reading submission from stdin")?;

    let mailer = SmtpMailer::new(&config);
    info!("Submitting via {}", mailer.relay());

    let response = handle_submission("POST", &body, &config, &mailer).await;
    println!("{}", response.body);

    if !response.is_success() {
        anyhow::bail!("submission failed with status {}", response.status);
    }
    Ok(())
}
