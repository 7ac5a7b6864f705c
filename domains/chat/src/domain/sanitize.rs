//! Message content sanitization and AI mention detection
//!
//! Sanitization strips the HTML vectors a browser client could otherwise
//! render: script/iframe blocks, `javascript:` URIs, and inline event
//! handler attributes. It runs before storage, so persisted and broadcast
//! content are identical. Sanitization is idempotent.

use regex::Regex;

/// The literal mention marker that activates the AI responder
pub const AI_MENTION: &str = "@ai";

lazy_static::lazy_static! {
    /// Whole <script>…</script> blocks, shortest match first
    static ref SCRIPT_RE: Regex = Regex::new(r"(?is)<script\b.*?</script>").unwrap();

    /// Whole <iframe>…</iframe> blocks
    static ref IFRAME_RE: Regex = Regex::new(r"(?is)<iframe\b.*?</iframe>").unwrap();

    /// javascript: URI scheme
    static ref JS_URI_RE: Regex = Regex::new(r"(?i)javascript:").unwrap();

    /// Inline event handler attributes (onclick=, onerror=, …)
    static ref EVENT_HANDLER_RE: Regex = Regex::new(r"(?i)\bon\w+\s*=").unwrap();
}

/// Strip script/iframe blocks, `javascript:` URIs, and inline event handler
/// attributes, then trim surrounding whitespace.
pub fn sanitize_content(content: &str) -> String {
    let content = SCRIPT_RE.replace_all(content, "");
    let content = IFRAME_RE.replace_all(&content, "");
    let content = JS_URI_RE.replace_all(&content, "");
    let content = EVENT_HANDLER_RE.replace_all(&content, "");
    content.trim().to_string()
}

/// Check whether content contains the literal AI mention marker.
///
/// Case-sensitive by design: `@ai` triggers, `@AI` does not.
pub fn contains_ai_mention(content: &str) -> bool {
    content.contains(AI_MENTION)
}

/// Remove every AI mention marker and trim the remainder.
///
/// Used when recording a doctor's statement as a memory entry: the stored
/// fact is the advice itself, not the trigger syntax.
pub fn strip_ai_mention(content: &str) -> String {
    content.replace(AI_MENTION, "").trim().to_string()
}
