//! Test data model for the fake IMAP server
//!
//! Provides a builder-style API for constructing mailbox state:
//!
//! ```ignore
//! let mailbox = MailboxBuilder::new()
//!     .folder("INBOX")
//!         .email(raw_rfc2822_bytes)
//!         .email(raw_rfc2822_bytes).flags(&["\\Seen"])
//!     .folder("Sent")
//!         .email(raw_rfc2822_bytes).internal_date("02-Jun-2023 08:30:00 +0000")
//!     .build();
//! ```
//!
//! Messages are addressed by their 1-based position in the folder
//! (the IMAP sequence number), which is what the client fetches by.

pub const DEFAULT_INTERNAL_DATE: &str = "01-Jun-2023 10:00:00 +0000";

/// A complete mailbox: a collection of named folders, each holding
/// zero or more test emails, plus switches for failure scenarios.
#[derive(Debug, Clone)]
pub struct Mailbox {
    pub folders: Vec<Folder>,
    /// Answer LOGIN with `NO`.
    pub reject_login: bool,
    /// Answer LIST with `NO`.
    pub fail_list: bool,
    /// Answer this many LOGOUTs per connection with `NO` before
    /// confirming one.
    pub refused_logouts: usize,
}

impl Mailbox {
    /// Look up a folder by name (case-sensitive, matching real IMAP).
    pub fn get_folder(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }
}

/// A single IMAP folder (e.g. "INBOX", "Sent", "Trash").
#[derive(Debug, Clone)]
pub struct Folder {
    pub name: String,
    pub emails: Vec<TestEmail>,
}

/// A test email stored in a folder.
///
/// - `flags`: wire tokens returned in `FLAGS (...)`.
/// - `internal_date`: the `INTERNALDATE` string, e.g.
///   `01-Jun-2023 10:00:00 +0000`.
/// - `reported_size`: the `RFC822.SIZE` value; defaults to the raw
///   length but can be set to anything to mimic servers whose count
///   differs from what the client receives.
/// - `raw`: the complete RFC 2822 message (headers + body) as bytes.
#[derive(Debug, Clone)]
pub struct TestEmail {
    pub flags: Vec<String>,
    pub internal_date: String,
    pub reported_size: usize,
    pub raw: Vec<u8>,
}

/// Builder for constructing a `Mailbox` step by step.
///
/// Call `.folder(name)` to start a new folder, then chain
/// `.email(raw)` calls to add messages to it; `.flags()`,
/// `.internal_date()` and `.reported_size()` adjust the most recent
/// email. Finish with `.build()` to get the final `Mailbox`.
pub struct MailboxBuilder {
    folders: Vec<Folder>,
    reject_login: bool,
    fail_list: bool,
    refused_logouts: usize,
}

impl MailboxBuilder {
    pub fn new() -> Self {
        Self {
            folders: Vec::new(),
            reject_login: false,
            fail_list: false,
            refused_logouts: 0,
        }
    }

    /// Add a new folder. Subsequent `.email()` calls add to this folder.
    pub fn folder(mut self, name: &str) -> Self {
        self.folders.push(Folder {
            name: name.to_string(),
            emails: Vec::new(),
        });
        self
    }

    /// Add an email to the most recently added folder.
    ///
    /// # Panics
    ///
    /// Panics if called before any `.folder()` call.
    pub fn email(mut self, raw: &[u8]) -> Self {
        self.folders
            .last_mut()
            .expect("call .folder() before .email()")
            .emails
            .push(TestEmail {
                flags: Vec::new(),
                internal_date: DEFAULT_INTERNAL_DATE.to_string(),
                reported_size: raw.len(),
                raw: raw.to_vec(),
            });
        self
    }

    /// Set the flags of the most recently added email.
    pub fn flags(mut self, flags: &[&str]) -> Self {
        self.last_email().flags = flags.iter().map(ToString::to_string).collect();
        self
    }

    /// Set the internal date of the most recently added email.
    pub fn internal_date(mut self, date: &str) -> Self {
        self.last_email().internal_date = date.to_string();
        self
    }

    /// Override the `RFC822.SIZE` of the most recently added email.
    pub fn reported_size(mut self, size: usize) -> Self {
        self.last_email().reported_size = size;
        self
    }

    /// Refuse every LOGIN.
    pub fn reject_login(mut self) -> Self {
        self.reject_login = true;
        self
    }

    /// Fail every LIST.
    pub fn fail_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Refuse the first `times` LOGOUTs on every connection.
    pub fn refuse_logout(mut self, times: usize) -> Self {
        self.refused_logouts = times;
        self
    }

    /// Consume the builder and return the finished `Mailbox`.
    pub fn build(self) -> Mailbox {
        Mailbox {
            folders: self.folders,
            reject_login: self.reject_login,
            fail_list: self.fail_list,
            refused_logouts: self.refused_logouts,
        }
    }

    fn last_email(&mut self) -> &mut TestEmail {
        self.folders
            .last_mut()
            .and_then(|folder| folder.emails.last_mut())
            .expect("call .email() first")
    }
}
