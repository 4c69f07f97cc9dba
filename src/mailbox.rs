//! Mailbox listing
//!
//! Each provider quotes and nests its mailbox names differently
//! (`"[Gmail]/Sent Mail"`, `Folders/Work`, ...). [`Provider`] selects
//! the rule that turns the server-reported name into a short display
//! name.

use crate::connection::ImapSession;
use crate::error::Error;
use futures::StreamExt;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// The mail provider flavour a configuration talks to.
///
/// # Examples
///
/// ```
/// use mail_retrieval::Provider;
///
/// let gmail: Provider = "gmail".parse().unwrap();
/// assert_eq!(gmail.clean_name("\"[Gmail]/Sent Mail\"", None), "Sent Mail");
/// assert!("hotmail".parse::<Provider>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    /// Google Mail: names live under `[Gmail]/`.
    Gmail,
    /// Proton Mail through Proton Bridge: `Folders/...`, `Labels/...`.
    Proton,
    /// Any other server. Hierarchy is kept.
    #[default]
    Generic,
}

impl Provider {
    /// Turn a server-reported mailbox name into a display name.
    ///
    /// `delimiter` is the hierarchy separator the server reported for
    /// the entry, if any.
    #[must_use]
    pub fn clean_name(self, raw: &str, delimiter: Option<&str>) -> String {
        let unquoted = raw.replace('"', "");
        match self {
            Self::Gmail => last_segment(&unquoted, "/"),
            Self::Proton => last_segment(&unquoted, delimiter.unwrap_or("/")),
            Self::Generic => unquoted.trim().to_string(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gmail => "gmail",
            Self::Proton => "proton",
            Self::Generic => "generic",
        }
    }
}

fn last_segment(name: &str, delimiter: &str) -> String {
    name.rsplit(delimiter).next().unwrap_or(name).trim().to_string()
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gmail" => Ok(Self::Gmail),
            "proton" | "protonmail" => Ok(Self::Proton),
            "generic" => Ok(Self::Generic),
            other => Err(Error::Config(format!("Unknown mail provider: {other:?}"))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One LIST result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailboxEntry {
    /// Name as the server reported it; pass this to SELECT.
    pub original_name: String,
    pub clean_name: String,
}

/// `LIST "" "*"` on an open session.
///
/// A failed LIST is logged and yields an empty list.
pub async fn list(session: &mut ImapSession, provider: Provider) -> Vec<MailboxEntry> {
    let mut stream = match session.list(Some(""), Some("*")).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("List mailboxes failed: {e}");
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(name) => entries.push(MailboxEntry {
                original_name: name.name().to_string(),
                clean_name: provider.clean_name(name.name(), name.delimiter()),
            }),
            Err(e) => {
                warn!("List mailboxes failed: {e}");
                return Vec::new();
            }
        }
    }
    drop(stream);

    debug!("Listed {} mailboxes", entries.len());
    entries
}
