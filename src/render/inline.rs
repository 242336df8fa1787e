//! Inline rules: code spans, links and emphasis.
//!
//! Code spans and links are rendered first and swapped out for placeholder
//! tokens, so emphasis never matches inside their output and can still wrap
//! around them. Everything else is HTML-escaped before emphasis runs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::escape_html;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid code span regex"));
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    // URLs never contain a stashed code span.
    Regex::new(r"\[([^\[\]]+)\]\(([^()\s\x{E000}\x{E001}]+)\)").expect("valid link regex")
});
static BOLD_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*(.+?)\*\*\*").expect("valid bold italic regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid italic regex"));
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{E000}([0-9]+)\u{E001}").expect("valid placeholder regex")
});

/// Render one line of inline markdown to HTML.
pub fn render_inline(text: &str) -> String {
    let mut fragments: Vec<String> = Vec::new();
    let text = text.replace([OPEN, CLOSE], "\u{FFFD}");

    let text = CODE_SPAN.replace_all(&text, |caps: &Captures<'_>| {
        stash(
            &mut fragments,
            format!("<code>{}</code>", escape_html(&caps[1])),
        )
    });

    let text = LINK.replace_all(&text, |caps: &Captures<'_>| {
        let html = format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            escape_html(safe_url(&caps[2])),
            emphasis(&escape_html(&caps[1])),
        );
        stash(&mut fragments, html)
    });

    let html = emphasis(&escape_html(&text));
    restore(&html, &fragments)
}

fn stash(fragments: &mut Vec<String>, html: String) -> String {
    fragments.push(html);
    format!("{OPEN}{}{CLOSE}", fragments.len() - 1)
}

/// Longest token first, so `***x***` is not consumed as `**` + `*x*` + `**`.
fn emphasis(escaped: &str) -> String {
    let s = BOLD_ITALIC.replace_all(escaped, "<strong><em>$1</em></strong>");
    let s = BOLD.replace_all(&s, "<strong>$1</strong>");
    ITALIC.replace_all(&s, "<em>$1</em>").into_owned()
}

/// Link fragments may themselves contain code placeholders; resolve until stable.
fn restore(html: &str, fragments: &[String]) -> String {
    let mut out = html.to_string();
    while PLACEHOLDER.is_match(&out) {
        out = PLACEHOLDER
            .replace_all(&out, |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| fragments.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned();
    }
    out
}

/// Script-capable URL schemes are replaced with an inert fragment link.
fn safe_url(url: &str) -> &str {
    let lower = url.trim().to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        "#"
    } else {
        url
    }
}
