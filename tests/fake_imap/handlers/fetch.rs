//! FETCH command handler.
//!
//! Messages are addressed by sequence number (1-based position in the
//! folder). The response carries the body as a **counted literal** and
//! puts the metadata after it, the way Gmail orders its items:
//!
//! ```text
//! * <seq> FETCH (RFC822.SIZE <size> RFC822 {<length>}
//! <exactly length bytes of raw RFC 2822 message>
//!  INTERNALDATE "<date>" FLAGS (<flags>))
//! ```
//!
//! Sequence numbers with no message produce no untagged data, only
//! the tagged OK.

use crate::fake_imap::io::{write_bytes, write_line};
use crate::fake_imap::mailbox::Mailbox;
use imap_codec::imap_types::sequence::{SeqOrUid, Sequence, SequenceSet};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Extract sequence numbers from a `SequenceSet`. Only single values
/// are supported since the client fetches one message at a time.
fn extract_ids(seq_set: &SequenceSet) -> Vec<u32> {
    seq_set
        .0
        .as_ref()
        .iter()
        .filter_map(|seq| match seq {
            Sequence::Single(SeqOrUid::Value(v)) => Some(v.get()),
            _ => None,
        })
        .collect()
}

/// Handle the FETCH command.
pub async fn handle_fetch<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    sequence_set: &SequenceSet,
    mailbox: &Mailbox,
    selected_folder: Option<&str>,
    stream: &mut BufReader<S>,
) {
    let Some(folder_name) = selected_folder else {
        let resp = format!("{tag} BAD No folder selected\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    let Some(folder) = mailbox.get_folder(folder_name) else {
        let resp = format!("{tag} BAD Folder not found\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    for seq in extract_ids(sequence_set) {
        let Some(email) = folder.emails.get(seq as usize - 1) else {
            continue;
        };

        let header = format!(
            "* {seq} FETCH (RFC822.SIZE {} RFC822 {{{}}}\r\n",
            email.reported_size,
            email.raw.len()
        );
        if write_line(stream, &header).await.is_err() {
            return;
        }

        if write_bytes(stream, &email.raw).await.is_err() {
            return;
        }

        let trailer = format!(
            " INTERNALDATE \"{}\" FLAGS ({}))\r\n",
            email.internal_date,
            email.flags.join(" ")
        );
        if write_line(stream, &trailer).await.is_err() {
            return;
        }
    }

    let resp = format!("{tag} OK FETCH completed\r\n");
    let _ = write_line(stream, &resp).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::io::capture;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use std::num::NonZeroU32;

    fn make_raw_email() -> Vec<u8> {
        b"From: a@b.com\r\nSubject: Test\r\n\r\nBody".to_vec()
    }

    fn seq_set(seq: u32) -> SequenceSet {
        SequenceSet(
            vec![Sequence::Single(SeqOrUid::Value(
                NonZeroU32::new(seq).unwrap(),
            ))]
            .try_into()
            .unwrap(),
        )
    }

    async fn run(
        tag: &str,
        sequence_set: &SequenceSet,
        mailbox: &Mailbox,
        selected: Option<&str>,
    ) -> String {
        capture(|mut stream| async move {
            handle_fetch(tag, sequence_set, mailbox, selected, &mut stream).await;
        })
        .await
    }

    #[tokio::test]
    async fn fetches_email_by_sequence_number() {
        let raw = make_raw_email();
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .email(&raw)
            .email(&raw)
            .flags(&["\\Seen", "\\Flagged"])
            .build();

        let output = run("A1", &seq_set(2), &mailbox, Some("INBOX")).await;

        assert!(output.contains("* 2 FETCH (RFC822.SIZE"));
        assert!(output.contains("From: a@b.com"));
        assert!(output.contains("FLAGS (\\Seen \\Flagged))"));
        assert!(output.contains("A1 OK FETCH completed"));
    }

    #[tokio::test]
    async fn literal_length_matches_body_and_size_can_differ() {
        let raw = make_raw_email();
        let expected_len = raw.len();
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .email(&raw)
            .reported_size(4821)
            .build();

        let output = run("A1", &seq_set(1), &mailbox, Some("INBOX")).await;

        assert!(output.contains(&format!("{{{expected_len}}}")));
        assert!(output.contains("RFC822.SIZE 4821"));
    }

    #[tokio::test]
    async fn sends_internal_date_after_literal() {
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .email(&make_raw_email())
            .internal_date("02-Jun-2023 08:30:00 +0200")
            .build();

        let output = run("A1", &seq_set(1), &mailbox, Some("INBOX")).await;

        let body_pos = output.find("Body").unwrap();
        let date_pos = output.find("INTERNALDATE \"02-Jun-2023 08:30:00 +0200\"").unwrap();
        assert!(body_pos < date_pos);
    }

    #[tokio::test]
    async fn missing_message_returns_only_ok() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let output = run("A1", &seq_set(99), &mailbox, Some("INBOX")).await;

        assert!(!output.contains("FETCH ("));
        assert!(output.contains("A1 OK FETCH completed"));
    }

    #[tokio::test]
    async fn no_folder_selected_returns_bad() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let output = run("A1", &seq_set(1), &mailbox, None).await;

        assert!(output.contains("A1 BAD No folder selected"));
    }
}
