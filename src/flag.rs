//! IMAP message flags
//!
//! Flags arrive as a parenthesised token list inside a FETCH
//! response (`FLAGS (\Seen $Important)`). System flags map to
//! dedicated variants; anything else is kept verbatim as a keyword.

use std::fmt;

/// An IMAP message flag.
///
/// # Examples
///
/// ```
/// use mail_retrieval::Flag;
///
/// assert_eq!(Flag::from_imap_str("\\Seen"), Flag::Seen);
/// assert_eq!(Flag::from_imap_str("$Important").as_imap_str(), "$Important");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message has been read (`\Seen`).
    Seen,
    /// Message has been answered (`\Answered`).
    Answered,
    /// Message is flagged for attention (`\Flagged`).
    Flagged,
    /// Message is marked for deletion (`\Deleted`).
    Deleted,
    /// Message is a draft (`\Draft`).
    Draft,
    /// Message arrived in this session (`\Recent`).
    Recent,
    /// Any other token, including unknown `\`-prefixed extensions.
    Keyword(String),
}

impl Flag {
    /// Parse a single wire token. System flag names are matched
    /// case-insensitively as IMAP requires.
    #[must_use]
    pub fn from_imap_str(token: &str) -> Self {
        let Some(name) = token.strip_prefix('\\') else {
            return Self::Keyword(token.to_string());
        };
        match name.to_ascii_lowercase().as_str() {
            "seen" => Self::Seen,
            "answered" => Self::Answered,
            "flagged" => Self::Flagged,
            "deleted" => Self::Deleted,
            "draft" => Self::Draft,
            "recent" => Self::Recent,
            _ => Self::Keyword(token.to_string()),
        }
    }

    /// Parse the inside of a `FLAGS (...)` list, keeping server order.
    #[must_use]
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split_ascii_whitespace().map(Self::from_imap_str).collect()
    }

    /// The IMAP wire representation of this flag.
    #[must_use]
    pub fn as_imap_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::Keyword(kw) => kw,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_imap_str())
    }
}
