//! FETCH response parsing
//!
//! A `FETCH n (INTERNALDATE FLAGS RFC822.SIZE RFC822)` response comes
//! back as two pieces whose order depends on the server:
//!
//! ```text
//! * 3 FETCH (RFC822.SIZE 4821 RFC822 {4821}      <- Content annotation
//! <4821 bytes of RFC 822 message>                <- Content raw
//!  INTERNALDATE "01-Jun-2023 10:00:00 +0000" FLAGS (\Seen))  <- Metadata
//! ```
//!
//! Each piece writes a disjoint set of fields into one accumulator, so
//! they can be absorbed in any order. The size is taken from the
//! server's `RFC822.SIZE` annotation and never recomputed from the
//! literal.

use crate::email::{Attachment, DecodeFailure, Email, EmailFields};
use crate::error::ParseError;
use crate::flag::Flag;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone};
use mailparse::{DispositionType, MailHeaderMap, ParsedContentDisposition, ParsedMail};
use tracing::debug;

/// One piece of a FETCH response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// The literal-bearing piece: the attribute text in front of the
    /// literal and the literal's raw message bytes.
    Content { annotation: String, raw: Vec<u8> },
    /// Attribute text carrying `INTERNALDATE` and `FLAGS`.
    Metadata(String),
}

/// A server-reported internal date, converted to a reference zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalDate {
    /// Wall-clock time in the reference zone.
    pub local: NaiveDateTime,
    /// Hours of daylight saving in effect at that instant.
    pub dst_offset_hours: i64,
}

impl InternalDate {
    /// Parse an IMAP `date-time` (`01-Jun-2023 10:00:00 +0000`) and
    /// express it in `tz`.
    pub fn parse<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<Self, ParseError> {
        let reported = DateTime::parse_from_str(value.trim(), "%d-%b-%Y %H:%M:%S %z").map_err(
            |e| ParseError::InternalDate {
                value: value.to_string(),
                reason: e.to_string(),
            },
        )?;

        let utc = reported.naive_utc();
        let offset = tz.offset_from_utc_datetime(&utc).fix().local_minus_utc();
        let standard = standard_offset(tz, utc.year()).unwrap_or(offset);

        Ok(Self {
            local: utc + TimeDelta::seconds(i64::from(offset)),
            dst_offset_hours: i64::from(offset - standard) / 3600,
        })
    }

    /// The local time with the DST hours taken off.
    #[must_use]
    pub fn normalized(&self) -> NaiveDateTime {
        self.local - TimeDelta::hours(self.dst_offset_hours)
    }
}

/// The smaller of the January and July offsets is the zone's
/// standard offset, whichever hemisphere it is in.
fn standard_offset<Tz: TimeZone>(tz: &Tz, year: i32) -> Option<i32> {
    [1, 7]
        .into_iter()
        .filter_map(|month| NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0))
        .map(|instant| tz.offset_from_utc_datetime(&instant).fix().local_minus_utc())
        .min()
}

/// Parse one FETCH response into an [`Email`], using the process's
/// local time zone as the date reference.
///
/// # Errors
///
/// Fails when the message bytes are not MIME, when the internal date
/// is malformed, or when a required field (size, date, flags) is
/// missing from every fragment.
pub fn parse_fragments(uid: u32, fragments: &[Fragment]) -> Result<Email, ParseError> {
    parse_fragments_in(uid, fragments, &Local)
}

/// [`parse_fragments`] with an explicit reference time zone.
///
/// # Errors
///
/// See [`parse_fragments`].
pub fn parse_fragments_in<Tz: TimeZone>(
    uid: u32,
    fragments: &[Fragment],
    tz: &Tz,
) -> Result<Email, ParseError> {
    let mut fields = EmailFields {
        uid: Some(uid),
        ..EmailFields::default()
    };

    for fragment in fragments {
        match fragment {
            Fragment::Content { annotation, raw } => {
                // Some servers put INTERNALDATE/FLAGS before the literal.
                absorb_metadata(&mut fields, annotation, tz)?;
                absorb_content(&mut fields, annotation, raw)?;
            }
            Fragment::Metadata(text) => absorb_metadata(&mut fields, text, tz)?,
        }
    }

    fields.build()
}

fn absorb_metadata<Tz: TimeZone>(
    fields: &mut EmailFields,
    text: &str,
    tz: &Tz,
) -> Result<(), ParseError> {
    if let Some(value) = attribute(text, "INTERNALDATE").and_then(|rest| delimited(rest, '"', '"'))
    {
        fields.date = Some(InternalDate::parse(value, tz)?.normalized());
    }
    if let Some(list) = attribute(text, "FLAGS").and_then(|rest| delimited(rest, '(', ')')) {
        fields.flags = Some(Flag::parse_list(list));
    }
    Ok(())
}

fn absorb_content(fields: &mut EmailFields, annotation: &str, raw: &[u8]) -> Result<(), ParseError> {
    if let Some(size) = size_from_annotation(annotation) {
        fields.size = Some(size);
    }

    let message = mailparse::parse_mail(raw).map_err(|e| ParseError::Mime(e.to_string()))?;

    if message.subparts.is_empty() {
        route_text(fields, &message);
    } else {
        absorb_part(fields, &message);
    }

    fields.subject = Some(message.headers.get_first_value("Subject").unwrap_or_default());
    fields.from = Some(message.headers.get_first_value("From").unwrap_or_default());
    fields.to = Some(message.headers.get_first_value("To").unwrap_or_default());
    fields.message_id = raw_header(&message, "Message-ID");
    fields.references = raw_header(&message, "References");
    Ok(())
}

/// Depth-first over the leaves of a multipart tree.
fn absorb_part(fields: &mut EmailFields, part: &ParsedMail<'_>) {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            absorb_part(fields, sub);
        }
        return;
    }

    let disposition = part.get_content_disposition();
    if disposition.disposition == DispositionType::Attachment {
        if let Some(filename) = attachment_filename(part, &disposition) {
            match part.get_body_raw() {
                Ok(payload) => fields.attachments.extend(Attachment::new(
                    filename,
                    part.ctype.mimetype.to_ascii_lowercase(),
                    payload,
                )),
                Err(e) => record_failure(fields, part, &e),
            }
            return;
        }
    }

    route_text(fields, part);
}

/// Decode `text/plain` into `text` and `text/html` into `body`. A part
/// that fails to decode leaves the field as it was.
fn route_text(fields: &mut EmailFields, part: &ParsedMail<'_>) {
    let is_html = match part.ctype.mimetype.to_ascii_lowercase().as_str() {
        "text/plain" => false,
        "text/html" => true,
        _ => return,
    };
    match part.get_body() {
        Ok(decoded) if is_html => fields.body = Some(decoded),
        Ok(decoded) => fields.text = Some(decoded),
        Err(e) => record_failure(fields, part, &e),
    }
}

fn record_failure(fields: &mut EmailFields, part: &ParsedMail<'_>, error: &mailparse::MailParseError) {
    debug!("Could not decode {} part: {}", part.ctype.mimetype, error);
    fields.decode_failures.push(DecodeFailure {
        content_type: part.ctype.mimetype.clone(),
        reason: error.to_string(),
    });
}

fn attachment_filename(part: &ParsedMail<'_>, disposition: &ParsedContentDisposition) -> Option<String> {
    disposition
        .params
        .get("filename")
        .or_else(|| part.ctype.params.get("name"))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

fn raw_header(message: &ParsedMail<'_>, name: &str) -> Option<String> {
    message
        .headers
        .get_first_header(name)
        .map(|header| String::from_utf8_lossy(header.get_value_raw()).trim().to_string())
}

/// The digits following `RFC822.SIZE` in the annotation.
fn size_from_annotation(annotation: &str) -> Option<u32> {
    let rest = attribute(annotation, "RFC822.SIZE")?;
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Text following the attribute `name` and its separating space. The
/// name must start a token.
fn attribute<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some(pos) = text[from..].find(name) {
        let start = from + pos;
        let end = start + name.len();
        let starts_token = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| c == '(' || c.is_ascii_whitespace());
        if starts_token && text[end..].starts_with(' ') {
            return Some(text[end..].trim_start());
        }
        from = end;
    }
    None
}

fn delimited(text: &str, open: char, close: char) -> Option<&str> {
    let inner = text.strip_prefix(open)?;
    inner.find(close).map(|end| &inner[..end])
}
