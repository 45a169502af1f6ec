//! Timed-text transcript flattening.
//!
//! The timed-text endpoint returns a document shaped like:
//!
//! ```text
//! <transcript>
//!   <text start="0.0" dur="2.1">Good morning</text>
//!   <text start="2.1" dur="3.4">and welcome</text>
//! </transcript>
//! ```
//!
//! Only `text` elements directly under the root contribute. Each one's own
//! text content (up to its first child element) is taken as-is.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Joins the root's `text` children with single spaces, in document order.
///
/// Returns `Ok(None)` when the document has no non-empty `text` element.
///
/// # Errors
///
/// Returns [`quick_xml::Error`] if the document is not well-formed.
pub fn parse_timedtext(xml: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut depth: usize = 0;
    // Text of the `text` element currently open at depth 2; `None` once it
    // has seen a child element or when no such element is open.
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut segments: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 && e.name().as_ref() == b"text" {
                    in_text = true;
                    current = Some(String::new());
                } else if in_text && depth > 2 {
                    // A child element ends the element's own text run.
                    if let Some(text) = current.take() {
                        segments.push(text);
                    }
                }
            }
            Event::Empty(e) => {
                if depth == 1 && e.name().as_ref() == b"text" {
                    segments.push(String::new());
                } else if in_text {
                    if let Some(text) = current.take() {
                        segments.push(text);
                    }
                }
            }
            Event::Text(e) => {
                if let Some(text) = current.as_mut() {
                    if depth == 2 {
                        text.push_str(&e.unescape()?);
                    }
                }
            }
            Event::CData(e) => {
                if let Some(text) = current.as_mut() {
                    if depth == 2 {
                        text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
            }
            Event::End(_) => {
                if depth == 2 && in_text {
                    if let Some(text) = current.take() {
                        segments.push(text);
                    }
                    in_text = false;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let joined = segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(if joined.is_empty() { None } else { Some(joined) })
}
