//! Sans-I/O protocol layer.
//!
//! The machine consumes assembled reply lines and produces [`Emission`]s;
//! it never reads from or writes to a connection. The session layer owns
//! the I/O.

mod emission;
mod machine;
mod policy;
mod state;

pub use emission::Emission;
pub use machine::{
    Conversation, DEFAULT_CLIENT_ID, MESSAGE_ACCEPTED, Machine, PASSWORD_CHALLENGE,
    RECIPIENT_ACCEPTED, SENDER_ACCEPTED, USERNAME_CHALLENGE, transition,
};
pub use policy::{CapabilityPolicy, RecipientPolicy};
pub use state::ProtocolState;
