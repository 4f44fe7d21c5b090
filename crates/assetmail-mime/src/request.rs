//! Structured email request.

use crate::error::{Error, Result};

/// A single email to compose and deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRequest {
    /// Sender address (envelope and `From:` header).
    pub from: String,
    /// Recipient addresses, in order.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Optional `Reply-To:` address.
    pub reply_to: Option<String>,
}

impl EmailRequest {
    /// Creates a request with no recipients and no reply-to.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: Vec::new(),
            subject: subject.into(),
            html: html.into(),
            reply_to: None,
        }
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    /// Sets the reply-to address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Checks that sender, recipients, subject and HTML body are all present.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(Error::EmptyField("from"));
        }
        if self.to.is_empty() {
            return Err(Error::NoRecipients);
        }
        if self.to.iter().any(|r| r.trim().is_empty()) {
            return Err(Error::EmptyField("to"));
        }
        if self.subject.is_empty() {
            return Err(Error::EmptyField("subject"));
        }
        if self.html.is_empty() {
            return Err(Error::EmptyField("html"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EmailRequest {
        EmailRequest::new("noreply@assets.example", "Checkout", "<p>hi</p>").to("a@x.com")
    }

    #[test]
    fn valid_request_passes() {
        assert_eq!(request().validate(), Ok(()));
    }

    #[test]
    fn missing_sender() {
        let mut req = request();
        req.from = String::new();
        assert_eq!(req.validate(), Err(Error::EmptyField("from")));
    }

    #[test]
    fn missing_recipients() {
        let mut req = request();
        req.to.clear();
        assert_eq!(req.validate(), Err(Error::NoRecipients));
    }

    #[test]
    fn blank_recipient() {
        let req = request().to("  ");
        assert_eq!(req.validate(), Err(Error::EmptyField("to")));
    }

    #[test]
    fn missing_subject() {
        let mut req = request();
        req.subject = String::new();
        assert_eq!(req.validate(), Err(Error::EmptyField("subject")));
    }

    #[test]
    fn missing_html() {
        let mut req = request();
        req.html = String::new();
        assert_eq!(req.validate(), Err(Error::EmptyField("html")));
    }
}
