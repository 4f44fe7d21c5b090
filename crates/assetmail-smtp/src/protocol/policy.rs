//! Knobs that change how strictly the conversation follows the relay.

/// When the capability phase is considered finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum CapabilityPolicy {
    /// Start authentication only when the final `250 ` line advertises SIZE.
    ///
    /// A relay whose last capability line is anything else leaves the
    /// conversation waiting.
    #[default]
    RequireSize,
    /// Start authentication on the final `250 ` line, whatever it advertises.
    FinalLine,
}

/// How many recipients are declared with `RCPT TO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum RecipientPolicy {
    /// Declare only the first recipient. The rest still appear in `To:` but
    /// are never handed to the relay.
    #[default]
    FirstOnly,
    /// Declare every recipient, one `RCPT TO` per acknowledgement, before `DATA`.
    All,
}
