//! IMAP mail retrieval library
//!
//! Connects to an IMAP server (implicit TLS or STARTTLS), lists
//! mailboxes and fetches messages, turning each FETCH response into an
//! immutable [`Email`]: decoded headers, plain-text and HTML content,
//! attachments, flags, server-reported size and a normalized internal
//! date.
//!
//! Connection and login failures are errors. Everything after that
//! degrades: a folder that cannot be selected yields no messages, and
//! a message that cannot be fetched or parsed is skipped.

mod client;
mod config;
mod connection;
mod email;
mod error;
mod fetch;
mod flag;
mod mailbox;
mod parser;

pub use client::MailClient;
pub use config::{DEFAULT_FETCH_COUNT, MailConfig};
pub use connection::LOGOUT_ATTEMPTS;
pub use email::{
    Attachment, AttachmentSummary, DecodeFailure, Email, EmailSummary, clean_subject,
};
pub use error::{Error, ParseError, Result};
pub use fetch::FETCH_ITEMS;
pub use flag::Flag;
pub use mailbox::{MailboxEntry, Provider};
pub use parser::{Fragment, InternalDate, parse_fragments, parse_fragments_in};
