//! Message retrieval
//!
//! SELECT a folder, FETCH messages one identifier at a time and hand
//! each response to the parser. Everything below the session itself
//! degrades: an unselectable folder yields nothing, and a message that
//! cannot be fetched or parsed is skipped with a warning.

use crate::connection::ImapSession;
use crate::email::Email;
use crate::error::{Error, Result};
use crate::parser::{Fragment, parse_fragments};
use async_imap::types::{Fetch, Flag};
use futures::StreamExt;
use tracing::{debug, info, warn};

/// Items requested for every message, in one round trip.
pub const FETCH_ITEMS: &str = "(INTERNALDATE FLAGS RFC822.SIZE RFC822)";

/// SELECT `folder` and return its message count.
async fn select(session: &mut ImapSession, folder: &str) -> Result<u32> {
    let mailbox = session.select(folder).await.map_err(|e| Error::Select {
        folder: folder.to_string(),
        reason: e.to_string(),
    })?;
    Ok(mailbox.exists)
}

/// Fetch up to `count` messages from `folder`, highest identifier
/// first.
///
/// Identifiers run from the folder's message count downwards; those
/// that fail to fetch or parse are skipped.
pub async fn fetch_recent(session: &mut ImapSession, folder: &str, count: u32) -> Vec<Email> {
    let exists = match select(session, folder).await {
        Ok(exists) => exists,
        Err(e) => {
            warn!("{e}");
            return Vec::new();
        }
    };

    let ids = recent_ids(exists, count);
    info!("Fetching {} most recent messages from {}", ids.len(), folder);

    let mut emails = Vec::with_capacity(ids.len());
    for id in ids {
        match fetch_single(session, id).await {
            Ok(email) => emails.push(email),
            Err(e) => warn!("Skipping message {}: {}", id, e),
        }
    }
    emails
}

/// Fetch one message from `folder`, or `None` if the folder cannot be
/// selected or the message cannot be fetched or parsed.
pub async fn fetch_one(session: &mut ImapSession, folder: &str, id: u32) -> Option<Email> {
    if let Err(e) = select(session, folder).await {
        warn!("{e}");
        return None;
    }

    fetch_single(session, id)
        .await
        .inspect_err(|e| warn!("Could not retrieve message {} from {}: {}", id, folder, e))
        .ok()
}

/// `exists`, `exists - 1`, ... down to `exists - count + 1`, stopping
/// at 1 since lower identifiers cannot exist.
fn recent_ids(exists: u32, count: u32) -> Vec<u32> {
    let lowest = exists.saturating_sub(count).saturating_add(1).max(1);
    (lowest..=exists).rev().collect()
}

async fn fetch_single(session: &mut ImapSession, id: u32) -> Result<Email> {
    debug!("Fetching message {}", id);

    let mut messages = session
        .fetch(id.to_string(), FETCH_ITEMS)
        .await
        .map_err(|e| Error::Fetch {
            id,
            reason: e.to_string(),
        })?;

    let mut fragments = None;
    while let Some(item) = messages.next().await {
        let fetch = item.map_err(|e| Error::Fetch {
            id,
            reason: e.to_string(),
        })?;
        if fragments.is_none() && fetch.message == id {
            fragments = Some(fragments_from_fetch(&fetch));
        }
    }
    drop(messages);

    let fragments = fragments.ok_or_else(|| Error::Fetch {
        id,
        reason: "no data returned".to_string(),
    })?;
    Ok(parse_fragments(id, &fragments)?)
}

/// Split a decoded FETCH back into its literal-bearing and metadata
/// halves, in the wire form the parser reads.
fn fragments_from_fetch(fetch: &Fetch) -> Vec<Fragment> {
    let mut fragments = Vec::with_capacity(2);

    if let Some(raw) = fetch.body() {
        let size = fetch
            .size
            .map(|size| format!("RFC822.SIZE {size} "))
            .unwrap_or_default();
        fragments.push(Fragment::Content {
            annotation: format!("{} ({size}RFC822 {{{}}}", fetch.message, raw.len()),
            raw: raw.to_vec(),
        });
    }

    let mut metadata = String::new();
    if let Some(date) = fetch.internal_date() {
        metadata.push_str(&format!(
            " INTERNALDATE \"{}\"",
            date.format("%d-%b-%Y %H:%M:%S %z")
        ));
    }
    let flags: Vec<String> = fetch.flags().map(|flag| wire_flag(&flag)).collect();
    metadata.push_str(&format!(" FLAGS ({}))", flags.join(" ")));
    fragments.push(Fragment::Metadata(metadata));

    fragments
}

fn wire_flag(flag: &Flag<'_>) -> String {
    match flag {
        Flag::Seen => "\\Seen".to_string(),
        Flag::Answered => "\\Answered".to_string(),
        Flag::Flagged => "\\Flagged".to_string(),
        Flag::Deleted => "\\Deleted".to_string(),
        Flag::Draft => "\\Draft".to_string(),
        Flag::Recent => "\\Recent".to_string(),
        Flag::MayCreate => "\\*".to_string(),
        Flag::Custom(name) => name.to_string(),
    }
}
