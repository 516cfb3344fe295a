//! Forward-only anchor scanning for link-following mode.

use crate::span::{find_marker, ByteSpan};

const HREF_START: &[u8] = b"<a href=\"";
const HREF_END: &[u8] = b"\"";
const TITLE_START: &[u8] = b">";
const TITLE_END: &[u8] = b"</a>";

/// Longest URL kept after resolution.
pub const URL_CAPACITY: usize = 1023;
/// Titles longer than this are truncated.
pub const TITLE_CAPACITY: usize = 127;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub url: String,
    /// Empty when no `</a>` follows before the end of the span.
    pub title: String,
    /// Offset of the anchor in the index page, saved as the resume position.
    pub anchor_offset: usize,
}

/// Collects the anchors inside `span`, in document order.
pub fn extract_links(base_url: &str, buffer: &[u8], span: ByteSpan) -> Vec<LinkEntry> {
    let end = span.end.min(buffer.len());
    let scope = &buffer[..end];
    let mut links = Vec::new();
    let mut cursor = span.start;

    while let Some(anchor) = find_marker(scope, HREF_START, cursor) {
        let href_start = anchor + HREF_START.len();
        let Some(href_end) = find_marker(scope, HREF_END, href_start) else {
            break;
        };
        cursor = href_end;

        let href = String::from_utf8_lossy(&scope[href_start..href_end]);
        let Some(url) = resolve_link(base_url, &href) else {
            continue;
        };

        let (title, resume) = read_title(scope, href_end);
        cursor = resume;
        links.push(LinkEntry {
            url,
            title,
            anchor_offset: anchor,
        });
    }
    links
}

/// Returns the anchor text following `from` and the offset to continue from.
fn read_title(scope: &[u8], from: usize) -> (String, usize) {
    let Some(open) = find_marker(scope, TITLE_START, from) else {
        return (String::new(), scope.len());
    };
    let text_start = open + TITLE_START.len();
    let Some(close) = find_marker(scope, TITLE_END, text_start) else {
        return (String::new(), scope.len());
    };
    let text = &scope[text_start..close];
    let text = &text[..text.len().min(TITLE_CAPACITY)];
    (String::from_utf8_lossy(text).into_owned(), close)
}

/// Resolves `href` against the page it was found on.
///
/// Returns `None` for empty hrefs, for relative hrefs on a page without a
/// base URL, and when the result would exceed [`URL_CAPACITY`].
pub fn resolve_link(base_url: &str, href: &str) -> Option<String> {
    if href.is_empty() || href.len() > URL_CAPACITY {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_owned());
    }
    if base_url.is_empty() || base_url.len() + 1 + href.len() > URL_CAPACITY {
        return None;
    }

    if href.starts_with('/') {
        return Some(format!("{}{href}", origin(base_url)));
    }
    if base_url.ends_with('/') {
        Some(format!("{base_url}{href}"))
    } else {
        Some(format!("{base_url}/{href}"))
    }
}

/// Scheme and host: everything before the first `/` following `//`.
fn origin(base_url: &str) -> &str {
    let host_start = base_url.find("//").map_or(0, |pos| pos + 2);
    match base_url[host_start..].find('/') {
        Some(slash) => &base_url[..host_start + slash],
        None => base_url,
    }
}
