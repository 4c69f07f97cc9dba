//! Retrieved message types
//!
//! [`Email`] and [`Attachment`] are built once by the parser and are
//! read-only afterwards. [`EmailSummary`] is the serializable view
//! handed to external consumers; it leaves out `body` and `text`.

use crate::error::ParseError;
use crate::flag::Flag;
use chrono::NaiveDateTime;
use serde::Serialize;

/// One retrieved message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    uid: u32,
    message_id: Option<String>,
    from: String,
    to: String,
    subject: String,
    date: NaiveDateTime,
    size: u32,
    flags: Vec<Flag>,
    references: Option<String>,
    body: Option<String>,
    text: Option<String>,
    attachments: Vec<Attachment>,
    decode_failures: Vec<DecodeFailure>,
}

impl Email {
    /// Identifier the message was fetched with.
    #[must_use]
    pub const fn uid(&self) -> u32 {
        self.uid
    }

    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The subject with every character outside `[A-Za-z0-9]`
    /// replaced by `_`, suitable as a file or folder name.
    #[must_use]
    pub fn clean_subject(&self) -> String {
        clean_subject(&self.subject)
    }

    /// Internal date, normalized to standard time of the reference
    /// zone.
    #[must_use]
    pub const fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// Size reported by the server (`RFC822.SIZE`), not the length of
    /// the decoded content.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Raw `References` header, unparsed.
    #[must_use]
    pub fn references(&self) -> Option<&str> {
        self.references.as_deref()
    }

    /// HTML content.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Plain-text content.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Parts whose content could not be decoded as text.
    #[must_use]
    pub fn decode_failures(&self) -> &[DecodeFailure] {
        &self.decode_failures
    }

    /// The serializable view of this message, without `body`/`text`.
    #[must_use]
    pub fn as_summary(&self) -> EmailSummary {
        EmailSummary {
            uid: self.uid,
            message_id: self.message_id.clone(),
            date: self.date,
            subject: self.subject.clone(),
            clean_subject: self.clean_subject(),
            from: self.from.clone(),
            to: self.to.clone(),
            flags: self.flags.iter().map(ToString::to_string).collect(),
            size: self.size,
            references: self.references.clone(),
            attachments: self
                .attachments
                .iter()
                .map(|a| AttachmentSummary {
                    filename: a.filename.clone(),
                    content_type: a.content_type.clone(),
                    size: a.payload.len(),
                })
                .collect(),
        }
    }
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
#[must_use]
pub fn clean_subject(subject: &str) -> String {
    subject
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// A MIME part with `Content-Disposition: attachment` and a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content_type: String,
    payload: Vec<u8>,
}

impl Attachment {
    /// Returns `None` for an empty filename: such parts are not
    /// attachments.
    pub(crate) fn new(filename: String, content_type: String, payload: Vec<u8>) -> Option<Self> {
        if filename.is_empty() {
            return None;
        }
        Some(Self {
            filename,
            content_type,
            payload,
        })
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Transfer-decoded bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// A part whose payload could not be decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub content_type: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailSummary {
    pub uid: u32,
    pub message_id: Option<String>,
    pub date: NaiveDateTime,
    pub subject: String,
    pub clean_subject: String,
    pub from: String,
    pub to: String,
    pub flags: Vec<String>,
    pub size: u32,
    pub references: Option<String>,
    pub attachments: Vec<AttachmentSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentSummary {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

/// Field accumulator the parser fills from the two halves of a FETCH
/// response. Each half writes a disjoint set of fields.
#[derive(Debug, Default)]
pub struct EmailFields {
    pub uid: Option<u32>,
    pub message_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub size: Option<u32>,
    pub flags: Option<Vec<Flag>>,
    pub references: Option<String>,
    pub body: Option<String>,
    pub text: Option<String>,
    pub attachments: Vec<Attachment>,
    pub decode_failures: Vec<DecodeFailure>,
}

impl EmailFields {
    pub fn build(self) -> Result<Email, ParseError> {
        Ok(Email {
            uid: self.uid.ok_or(ParseError::MissingField("uid"))?,
            message_id: self.message_id,
            from: self.from.ok_or(ParseError::MissingField("from"))?,
            to: self.to.ok_or(ParseError::MissingField("to"))?,
            subject: self.subject.ok_or(ParseError::MissingField("subject"))?,
            date: self.date.ok_or(ParseError::MissingField("date"))?,
            size: self.size.ok_or(ParseError::MissingField("size"))?,
            flags: self.flags.ok_or(ParseError::MissingField("flags"))?,
            references: self.references,
            body: self.body,
            text: self.text,
            attachments: self.attachments,
            decode_failures: self.decode_failures,
        })
    }
}
