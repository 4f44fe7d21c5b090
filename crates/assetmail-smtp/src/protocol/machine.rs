//! Sans-I/O submission state machine.
//!
//! [`transition`] is a pure function from the current state and one
//! assembled reply line to the next state and what, if anything, to write.
//! [`Machine`] wraps it with the state and the capability record for one
//! session.
//!
//! Lines that do not match what the current state waits for are ignored:
//! no transition, no emission, no error. Error replies from the relay are
//! treated the same way, so a rejected conversation simply stops advancing.

use std::fmt;

use assetmail_mime::{EmailRequest, MimeMessage};

use super::emission::Emission;
use super::policy::{CapabilityPolicy, RecipientPolicy};
use super::state::ProtocolState;
use crate::command::Command;
use crate::connection::ServerInfo;
use crate::error::Result;
use crate::parser::parse_line;
use crate::types::{AuthMechanism, Extension, ReplyCode};

/// Base64 of `Username:`, the first AUTH LOGIN challenge.
pub const USERNAME_CHALLENGE: &str = "334 VXNlcm5hbWU6";
/// Base64 of `Password:`, the second AUTH LOGIN challenge.
pub const PASSWORD_CHALLENGE: &str = "334 UGFzc3dvcmQ6";
/// Reply accepting `MAIL FROM`.
pub const SENDER_ACCEPTED: &str = "250 2.1.0 Ok";
/// Reply accepting `RCPT TO`.
pub const RECIPIENT_ACCEPTED: &str = "250 2.1.5 Ok";
/// Reply accepting the message body.
pub const MESSAGE_ACCEPTED: &str = "250 2.0.0 Ok";

/// Client name sent with `EHLO` unless overridden.
pub const DEFAULT_CLIENT_ID: &str = "localhost";

/// Everything one conversation needs to answer the relay.
#[derive(Clone)]
pub struct Conversation {
    client_id: String,
    username: String,
    password: String,
    sender: String,
    recipients: Vec<String>,
    message: String,
    capability_policy: CapabilityPolicy,
    recipient_policy: RecipientPolicy,
}

impl Conversation {
    /// Prepares a conversation for a validated request and its composed message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is missing a sender, recipients,
    /// subject or HTML body.
    pub fn new(
        request: &EmailRequest,
        message: &MimeMessage,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        request.validate()?;

        Ok(Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            username: username.into(),
            password: password.into(),
            sender: request.from.clone(),
            recipients: request.to.clone(),
            message: message.to_wire(),
            capability_policy: CapabilityPolicy::default(),
            recipient_policy: RecipientPolicy::default(),
        })
    }

    /// Sets the name sent with `EHLO`.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Sets when authentication starts.
    #[must_use]
    pub const fn capability_policy(mut self, policy: CapabilityPolicy) -> Self {
        self.capability_policy = policy;
        self
    }

    /// Sets how many recipients are declared.
    #[must_use]
    pub const fn recipient_policy(mut self, policy: RecipientPolicy) -> Self {
        self.recipient_policy = policy;
        self
    }

    /// Recipients that will be declared with `RCPT TO`.
    #[must_use]
    pub fn declared_recipients(&self) -> &[String] {
        match self.recipient_policy {
            RecipientPolicy::FirstOnly => &self.recipients[..self.recipients.len().min(1)],
            RecipientPolicy::All => &self.recipients,
        }
    }

    /// The composed message written after `354`.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("recipients", &self.recipients)
            .field("message_len", &self.message.len())
            .field("capability_policy", &self.capability_policy)
            .field("recipient_policy", &self.recipient_policy)
            .finish()
    }
}

fn has_code(line: &str, code: ReplyCode) -> bool {
    parse_line(line).is_some_and(|reply| reply.code == code)
}

/// Computes the next state and emission for one reply line.
///
/// Returns `None` when the line does not advance the conversation.
#[must_use]
pub fn transition(
    state: ProtocolState,
    line: &str,
    conversation: &Conversation,
) -> Option<(ProtocolState, Option<Emission>)> {
    use ProtocolState as S;

    let step = |next: S, cmd: Command| Some((next, Some(Emission::Command(cmd))));

    match state {
        S::GreetingWait if has_code(line, ReplyCode::SERVICE_READY) => step(
            S::CapabilitiesWait,
            Command::Ehlo {
                hostname: conversation.client_id.clone(),
            },
        ),
        S::CapabilitiesWait => {
            let reply = parse_line(line)?;
            if !reply.is_final(ReplyCode::OK) {
                return None;
            }
            let ready = match conversation.capability_policy {
                CapabilityPolicy::RequireSize => Extension::parse(&reply.text).is_size(),
                CapabilityPolicy::FinalLine => true,
            };
            if !ready {
                return None;
            }
            step(
                S::AuthUsernameWait,
                Command::Auth {
                    mechanism: AuthMechanism::Login,
                },
            )
        }
        S::AuthUsernameWait if line == USERNAME_CHALLENGE => step(
            S::AuthPasswordWait,
            Command::auth_response(&conversation.username),
        ),
        S::AuthPasswordWait if line == PASSWORD_CHALLENGE => step(
            S::AuthenticatedWait,
            Command::auth_response(&conversation.password),
        ),
        S::AuthenticatedWait if has_code(line, ReplyCode::AUTH_SUCCEEDED) => step(
            S::SenderAckWait,
            Command::MailFrom {
                from: conversation.sender.clone(),
            },
        ),
        S::SenderAckWait if line == SENDER_ACCEPTED => {
            let first = conversation.recipients.first()?;
            step(
                S::RecipientAckWait { declared: 1 },
                Command::RcptTo { to: first.clone() },
            )
        }
        S::RecipientAckWait { declared } if line == RECIPIENT_ACCEPTED => {
            match conversation.declared_recipients().get(declared) {
                Some(next) => step(
                    S::RecipientAckWait {
                        declared: declared + 1,
                    },
                    Command::RcptTo { to: next.clone() },
                ),
                None => step(S::DataPromptWait, Command::Data),
            }
        }
        S::DataPromptWait if has_code(line, ReplyCode::START_DATA) => Some((
            S::MessageAckWait,
            Some(Emission::Message(conversation.message.clone())),
        )),
        S::MessageAckWait if line == MESSAGE_ACCEPTED => step(S::ClosingWait, Command::Quit),
        S::ClosingWait if has_code(line, ReplyCode::CLOSING) => Some((S::Closed, None)),
        _ => None,
    }
}

/// One session's live protocol state.
#[derive(Debug)]
pub struct Machine {
    state: ProtocolState,
    conversation: Conversation,
    server_info: ServerInfo,
}

impl Machine {
    /// Creates a machine waiting for the relay greeting.
    #[must_use]
    pub fn new(conversation: Conversation) -> Self {
        Self {
            state: ProtocolState::default(),
            conversation,
            server_info: ServerInfo::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ProtocolState {
        self.state
    }

    /// Returns `true` once the relay has acknowledged `QUIT`.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.state.is_terminal()
    }

    /// Capabilities seen during the EHLO exchange.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// The conversation this machine is driving.
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Feeds one assembled line and returns what to write back, if anything.
    pub fn feed(&mut self, line: &str) -> Option<Emission> {
        if self.state == ProtocolState::CapabilitiesWait
            && let Some(reply) = parse_line(line)
            && reply.code == ReplyCode::OK
        {
            self.server_info.record(&reply.text);
        }

        let Some((next, emission)) = transition(self.state, line, &self.conversation) else {
            match parse_line(line) {
                Some(reply) if reply.code.is_transient() || reply.code.is_permanent() => {
                    tracing::warn!("Relay refused in {}: {}", self.state, line);
                }
                _ => tracing::trace!("Ignoring line in {}: {}", self.state, line),
            }
            return None;
        };

        tracing::debug!("SMTP state {} -> {}", self.state, next);
        if self.state == ProtocolState::CapabilitiesWait {
            self.review_capabilities();
        }
        self.state = next;
        emission
    }

    /// Logs advertised limits the message is about to run into.
    fn review_capabilities(&self) {
        let info = &self.server_info;
        let size = self.conversation.message.len();

        if let Some(max) = info.max_message_size()
            && max > 0
            && size > max
        {
            tracing::warn!("Message is {} bytes but relay advertises SIZE {}", size, max);
        }
        if !info.supports(&Extension::EightBitMime) {
            tracing::debug!("Relay does not advertise 8BITMIME; HTML part is sent as 8bit");
        }
        let mechanisms = info.auth_mechanisms();
        if !mechanisms.is_empty() && !mechanisms.contains(&AuthMechanism::Login) {
            tracing::warn!(
                "Relay advertises AUTH {:?} without LOGIN",
                mechanisms.iter().map(|m| m.as_str()).collect::<Vec<_>>()
            );
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use assetmail_mime::compose_with_boundary;

    /// The canonical relay transcript for one successful submission.
    const TRANSCRIPT: [&str; 11] = [
        "220 ready",
        "250-SIZE 100",
        "250 SIZE 100",
        USERNAME_CHALLENGE,
        PASSWORD_CHALLENGE,
        "235 auth ok",
        SENDER_ACCEPTED,
        RECIPIENT_ACCEPTED,
        "354 start input",
        MESSAGE_ACCEPTED,
        "221 bye",
    ];

    fn request() -> EmailRequest {
        EmailRequest::new("noreply@assets.example", "Audit due", "<p>Audit due</p>")
            .to("a@x.com")
            .to("b@x.com")
    }

    fn conversation() -> Conversation {
        let req = request();
        let msg = compose_with_boundary(&req, "B0UNDARY");
        Conversation::new(&req, &msg, "relay-user", "s3cret").unwrap()
    }

    fn run_transcript(machine: &mut Machine, lines: &[&str]) -> Vec<Emission> {
        lines.iter().filter_map(|l| machine.feed(l)).collect()
    }

    fn wire(e: &Emission) -> String {
        String::from_utf8(e.to_bytes()).unwrap()
    }

    #[test]
    fn canonical_transcript_reaches_closed_with_nine_emissions() {
        let conv = conversation();
        let body = conv.message().to_string();
        let mut machine = Machine::new(conv);

        let out = run_transcript(&mut machine, &TRANSCRIPT);

        assert!(machine.is_closed());
        assert_eq!(out.len(), 9);
        assert_eq!(wire(&out[0]), "EHLO localhost\r\n");
        assert_eq!(wire(&out[1]), "AUTH LOGIN\r\n");
        assert_eq!(wire(&out[2]), "cmVsYXktdXNlcg==\r\n");
        assert_eq!(wire(&out[3]), "czNjcmV0\r\n");
        assert_eq!(wire(&out[4]), "MAIL FROM:<noreply@assets.example>\r\n");
        assert_eq!(wire(&out[5]), "RCPT TO:<a@x.com>\r\n");
        assert_eq!(wire(&out[6]), "DATA\r\n");
        assert_eq!(out[7], Emission::Message(body));
        assert_eq!(wire(&out[8]), "QUIT\r\n");
    }

    #[test]
    fn states_follow_documented_order() {
        let mut machine = Machine::new(conversation());
        let mut states = vec![machine.state()];
        for line in TRANSCRIPT {
            machine.feed(line);
            if states.last() != Some(&machine.state()) {
                states.push(machine.state());
            }
        }

        assert_eq!(
            states,
            vec![
                ProtocolState::GreetingWait,
                ProtocolState::CapabilitiesWait,
                ProtocolState::AuthUsernameWait,
                ProtocolState::AuthPasswordWait,
                ProtocolState::AuthenticatedWait,
                ProtocolState::SenderAckWait,
                ProtocolState::RecipientAckWait { declared: 1 },
                ProtocolState::DataPromptWait,
                ProtocolState::MessageAckWait,
                ProtocolState::ClosingWait,
                ProtocolState::Closed,
            ]
        );
    }

    #[test]
    fn unexpected_lines_cause_no_transition() {
        let conv = conversation();
        let cases: &[(ProtocolState, &str)] = &[
            (ProtocolState::GreetingWait, "554 no service"),
            (ProtocolState::GreetingWait, "250 hello"),
            (ProtocolState::CapabilitiesWait, "500 unrecognized"),
            (ProtocolState::AuthUsernameWait, "334 UGFzc3dvcmQ6"),
            (ProtocolState::AuthUsernameWait, "535 denied"),
            (ProtocolState::AuthPasswordWait, USERNAME_CHALLENGE),
            (ProtocolState::AuthenticatedWait, "535 5.7.8 auth failed"),
            (ProtocolState::SenderAckWait, "250 2.1.0 OK"),
            (ProtocolState::SenderAckWait, "550 rejected"),
            (ProtocolState::RecipientAckWait { declared: 1 }, "550 5.1.1 no such user"),
            (ProtocolState::DataPromptWait, "250 ok"),
            (ProtocolState::MessageAckWait, "552 too big"),
            (ProtocolState::ClosingWait, "250 ok"),
            (ProtocolState::Closed, "221 bye"),
        ];

        for (state, line) in cases {
            assert_eq!(transition(*state, line, &conv), None, "{state} / {line}");
        }
    }

    #[test]
    fn machine_stays_put_on_error_reply() {
        let mut machine = Machine::new(conversation());
        assert!(machine.feed("220 ready").is_some());
        assert!(machine.feed("421 try later").is_none());
        assert!(machine.feed("garbage").is_none());
        assert_eq!(machine.state(), ProtocolState::CapabilitiesWait);
    }

    #[test]
    fn final_capability_line_without_size_stalls_by_default() {
        let mut machine = Machine::new(conversation());
        machine.feed("220 ready");
        let out = run_transcript(&mut machine, &["250-SIZE 100", "250 8BITMIME"]);
        assert!(out.is_empty());
        assert_eq!(machine.state(), ProtocolState::CapabilitiesWait);
    }

    #[test]
    fn size_on_intermediate_line_only_is_not_enough() {
        let mut machine = Machine::new(conversation());
        machine.feed("220 ready");
        machine.feed("250-SIZE 100");
        assert_eq!(machine.state(), ProtocolState::CapabilitiesWait);
    }

    #[test]
    fn final_line_policy_proceeds_without_size() {
        let conv = conversation().capability_policy(CapabilityPolicy::FinalLine);
        let mut machine = Machine::new(conv);
        machine.feed("220 ready");
        assert!(machine.feed("250-mail.example.com").is_none());
        let emission = machine.feed("250 8BITMIME").unwrap();
        assert_eq!(wire(&emission), "AUTH LOGIN\r\n");
        assert_eq!(machine.state(), ProtocolState::AuthUsernameWait);
    }

    #[test]
    fn capabilities_are_recorded() {
        let mut machine = Machine::new(conversation());
        run_transcript(
            &mut machine,
            &["220 ready", "250-relay.example", "250-AUTH LOGIN", "250 SIZE 100"],
        );
        let info = machine.server_info();
        assert_eq!(info.hostname, "relay.example");
        assert_eq!(info.auth_mechanisms(), vec![AuthMechanism::Login]);
        assert_eq!(info.max_message_size(), Some(100));
    }

    #[test]
    fn only_first_recipient_declared_by_default() {
        let conv = conversation();
        assert!(conv.message().contains("To: a@x.com, b@x.com\r\n"));

        let mut machine = Machine::new(conv);
        let out = run_transcript(&mut machine, &TRANSCRIPT);

        let rcpts: Vec<String> = out
            .iter()
            .filter(|e| matches!(e.as_command(), Some(Command::RcptTo { .. })))
            .map(wire)
            .collect();
        assert_eq!(rcpts, vec!["RCPT TO:<a@x.com>\r\n"]);
        assert!(machine.is_closed());
    }

    #[test]
    fn all_recipients_policy_loops_before_data() {
        let conv = conversation().recipient_policy(RecipientPolicy::All);
        assert_eq!(conv.declared_recipients().len(), 2);
        let mut machine = Machine::new(conv);

        let mut lines = TRANSCRIPT.to_vec();
        // A second acknowledgement for the second recipient.
        lines.insert(8, RECIPIENT_ACCEPTED);
        let out = run_transcript(&mut machine, &lines);

        assert!(machine.is_closed());
        assert_eq!(out.len(), 10);
        assert_eq!(wire(&out[5]), "RCPT TO:<a@x.com>\r\n");
        assert_eq!(wire(&out[6]), "RCPT TO:<b@x.com>\r\n");
        assert_eq!(wire(&out[7]), "DATA\r\n");
    }

    #[test]
    fn custom_client_id() {
        let conv = conversation().client_id("assets.example.org");
        let (next, emission) = transition(ProtocolState::GreetingWait, "220", &conv).unwrap();
        assert_eq!(next, ProtocolState::CapabilitiesWait);
        assert_eq!(wire(&emission.unwrap()), "EHLO assets.example.org\r\n");
    }

    #[test]
    fn closing_reply_emits_nothing() {
        let conv = conversation();
        assert_eq!(
            transition(ProtocolState::ClosingWait, "221 2.0.0 Bye", &conv),
            Some((ProtocolState::Closed, None))
        );
    }

    #[test]
    fn invalid_request_is_rejected() {
        let mut req = request();
        req.html.clear();
        let msg = compose_with_boundary(&req, "B");
        assert!(Conversation::new(&req, &msg, "u", "p").is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let dbg = format!("{:?}", conversation());
        assert!(!dbg.contains("s3cret"));
        assert!(dbg.contains("<redacted>"));
    }
}
