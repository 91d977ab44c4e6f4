use mailparse::{DispositionType, MailHeaderMap, ParsedMail};

use crate::domain::email::{NormalizedEmail, RawMessage};

/// Longest body (in chars) kept before truncation.
pub const BODY_CAP: usize = 500;
pub const TRUNCATION_MARKER: &str = "...";

/// Flatten one raw message into sender, subject and a capped plain-text body.
///
/// Never fails: a message that cannot be parsed, or that carries no plain text,
/// comes back with empty fields rather than poisoning the whole batch.
pub fn normalize(raw: &RawMessage) -> NormalizedEmail {
    let parsed = match mailparse::parse_mail(&raw.bytes) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("message {}: unparseable ({e}); using empty record", raw.id);
            return NormalizedEmail::default();
        }
    };

    let sender = parsed.headers.get_first_value("From").unwrap_or_default();
    let subject = parsed.headers.get_first_value("Subject").unwrap_or_default();

    let body = if is_multipart(&parsed) {
        let mut acc = String::new();
        collect_plain_text(&parsed, &mut acc);
        acc
    } else {
        single_part_text(&parsed)
    };

    if body.is_empty() {
        log::debug!("message {}: no plain-text content", raw.id);
    }

    NormalizedEmail {
        sender,
        subject,
        body: truncate_body(&body, BODY_CAP),
    }
}

fn is_multipart(p: &ParsedMail) -> bool {
    p.ctype.mimetype.to_ascii_lowercase().starts_with("multipart/")
}

/// Depth-first walk in document order, appending every inline text/plain part.
fn collect_plain_text(p: &ParsedMail, acc: &mut String) {
    let mime = p.ctype.mimetype.to_ascii_lowercase();
    if mime == "text/plain" && !is_attachment(p) {
        match p.get_body() {
            Ok(text) => acc.push_str(&text),
            Err(e) => log::warn!("skipping undecodable text part: {e}"),
        }
    }

    for sp in &p.subparts {
        collect_plain_text(sp, acc);
    }

    // mailparse leaves an embedded message unparsed; walk into it as well
    if mime == "message/rfc822" {
        let inner = match p.get_body_raw() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("skipping undecodable embedded message: {e}");
                return;
            }
        };
        match mailparse::parse_mail(&inner) {
            Ok(msg) if is_multipart(&msg) => collect_plain_text(&msg, acc),
            Ok(msg) => acc.push_str(&single_part_text(&msg)),
            Err(e) => log::warn!("skipping unparseable embedded message: {e}"),
        }
    }
}

fn is_attachment(p: &ParsedMail) -> bool {
    p.get_content_disposition().disposition == DispositionType::Attachment
}

fn single_part_text(p: &ParsedMail) -> String {
    // a lone image or PDF has no text to offer
    if !p.ctype.mimetype.to_ascii_lowercase().starts_with("text/") {
        return String::new();
    }
    p.get_body().unwrap_or_else(|e| {
        log::warn!("undecodable single-part body: {e}");
        String::new()
    })
}

/// Keep the first `cap` chars and mark the cut; shorter bodies pass through.
pub fn truncate_body(body: &str, cap: usize) -> String {
    match body.char_indices().nth(cap) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
            out.push_str(&body[..cut]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => body.to_string(),
    }
}
