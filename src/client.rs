//! Mail retrieval client

use crate::config::MailConfig;
use crate::connection::{self, ImapSession};
use crate::email::Email;
use crate::error::Result;
use crate::fetch;
use crate::mailbox::{self, MailboxEntry};

/// Read-only IMAP client.
///
/// Every method opens its own session, runs one sequential
/// conversation and logs out before returning, whatever the outcome.
/// Only failures to reach or log in to the server are returned as
/// errors; missing folders and unreadable messages produce empty
/// results.
pub struct MailClient {
    config: MailConfig,
}

impl MailClient {
    #[must_use]
    pub const fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// List all mailboxes with their display names
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or login fails.
    pub async fn list_mailboxes(&self) -> Result<Vec<MailboxEntry>> {
        let mut session = self.connect().await?;
        let entries = mailbox::list(&mut session, self.config.provider).await;
        connection::close(session).await;
        Ok(entries)
    }

    /// Fetch up to `count` messages from `folder`, highest identifier
    /// first
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or login fails.
    pub async fn fetch_recent(&self, folder: &str, count: u32) -> Result<Vec<Email>> {
        let mut session = self.connect().await?;
        let emails = fetch::fetch_recent(&mut session, folder, count).await;
        connection::close(session).await;
        Ok(emails)
    }

    /// [`fetch_recent`](Self::fetch_recent) with the configured
    /// default count
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or login fails.
    pub async fn fetch_latest(&self, folder: &str) -> Result<Vec<Email>> {
        self.fetch_recent(folder, self.config.default_fetch_count)
            .await
    }

    /// Fetch a single message by identifier
    ///
    /// The identifier is the one carried by [`Email::uid`] on
    /// messages returned from [`fetch_recent`](Self::fetch_recent).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or login fails. A missing
    /// folder or message yields `Ok(None)`.
    pub async fn fetch_by_uid(&self, folder: &str, uid: u32) -> Result<Option<Email>> {
        let mut session = self.connect().await?;
        let email = fetch::fetch_one(&mut session, folder, uid).await;
        connection::close(session).await;
        Ok(email)
    }

    async fn connect(&self) -> Result<ImapSession> {
        connection::connect(&self.config).await
    }
}
