//! Rule-based markdown to HTML renderer.
//!
//! Each source line is classified once, in a fixed priority order (fence,
//! heading, rule, task item, bullet, ordered item, quote, blank, text).
//! Consecutive lines of the same kind are grouped into one block, and
//! inline rules run only on the text a block owns.

use std::sync::LazyLock;

use regex::Regex;

use super::escape_html;
use super::inline::render_inline;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,3}) (.*)$").expect("valid heading regex"));
static TASK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \[([ xX])\](?: (.*))?$").expect("valid task regex"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- (.*)$").expect("valid bullet regex"));
static ORDERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)\. (.*)$").expect("valid ordered item regex"));
static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>(?: (.*))?$").expect("valid quote regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    Fence,
    Heading(usize, &'a str),
    Rule,
    Task { checked: bool, text: &'a str },
    Bullet(&'a str),
    Ordered { number: u64, text: &'a str },
    Quote(&'a str),
    Blank,
    Text(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.trim_start().starts_with("```") {
        return Line::Fence;
    }
    if let Some(caps) = HEADING.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.len());
        return Line::Heading(level, caps.get(2).map_or("", |m| m.as_str()));
    }
    if line.trim_end() == "---" {
        return Line::Rule;
    }
    if let Some(caps) = TASK.captures(line) {
        return Line::Task {
            checked: !caps.get(1).is_some_and(|m| m.as_str() == " "),
            text: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = BULLET.captures(line) {
        return Line::Bullet(caps.get(1).map_or("", |m| m.as_str()));
    }
    if let Some(caps) = ORDERED.captures(line) {
        return Line::Ordered {
            // Digits only, so parsing fails only on overflow.
            number: caps[1].parse().unwrap_or(u64::MAX),
            text: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = QUOTE.captures(line) {
        return Line::Quote(caps.get(1).map_or("", |m| m.as_str()));
    }
    if line.trim().is_empty() {
        return Line::Blank;
    }
    Line::Text(line)
}

/// Render markdown to an HTML fragment, one block per output line group.
pub fn render(markdown: &str) -> String {
    let lines: Vec<&str> = markdown
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let mut blocks: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        match classify(lines[i]) {
            Line::Fence => {
                let body_start = i + 1;
                let mut end = body_start;
                while end < lines.len() && lines[end].trim() != "```" {
                    end += 1;
                }
                let body = lines[body_start..end].join("\n");
                blocks.push(format!("<pre><code>{}</code></pre>", escape_html(&body)));
                // An unclosed fence runs to the end of the document.
                i = (end + 1).min(lines.len());
            }
            Line::Heading(level, text) => {
                blocks.push(format!("<h{level}>{}</h{level}>", render_inline(text)));
                i += 1;
            }
            Line::Rule => {
                blocks.push("<hr>".to_string());
                i += 1;
            }
            Line::Task { checked, text } => {
                let checked = if checked { " checked" } else { "" };
                blocks.push(format!(
                    "<div class=\"task-list-item\"><input type=\"checkbox\" disabled{checked}> {}</div>",
                    render_inline(text)
                ));
                i += 1;
            }
            Line::Bullet(_) => {
                let (items, next) = collect(&lines, i, |line| match line {
                    Line::Bullet(text) => Some(text),
                    _ => None,
                });
                blocks.push(list("ul", "", &items));
                i = next;
            }
            Line::Ordered { number, .. } => {
                let (items, next) = collect(&lines, i, |line| match line {
                    Line::Ordered { text, .. } => Some(text),
                    _ => None,
                });
                let start = if number == 1 {
                    String::new()
                } else {
                    format!(" start=\"{number}\"")
                };
                blocks.push(list("ol", &start, &items));
                i = next;
            }
            Line::Quote(_) => {
                let (quoted, next) = collect(&lines, i, |line| match line {
                    Line::Quote(text) => Some(text),
                    _ => None,
                });
                let body: Vec<String> = quoted.iter().map(|t| render_inline(t)).collect();
                blocks.push(format!("<blockquote>{}</blockquote>", body.join("<br>\n")));
                i = next;
            }
            Line::Blank => {
                i += 1;
            }
            Line::Text(_) => {
                let (para, next) = collect(&lines, i, |line| match line {
                    Line::Text(text) => Some(text),
                    _ => None,
                });
                let body: Vec<String> = para.iter().map(|t| render_inline(t)).collect();
                blocks.push(format!("<p>{}</p>", body.join("<br>\n")));
                i = next;
            }
        }
    }

    crate::perf::log_event(
        "render.pipeline",
        format!("bytes={} lines={} blocks={}", markdown.len(), lines.len(), blocks.len()),
    );
    blocks.join("\n")
}

/// Collect the run of consecutive lines starting at `start` that `pick` accepts.
fn collect<'a>(
    lines: &[&'a str],
    start: usize,
    pick: impl Fn(Line<'a>) -> Option<&'a str>,
) -> (Vec<&'a str>, usize) {
    let mut items = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let Some(text) = pick(classify(lines[i])) else {
            break;
        };
        items.push(text);
        i += 1;
    }
    (items, i)
}

fn list(tag: &str, attrs: &str, items: &[&str]) -> String {
    let mut html = format!("<{tag}{attrs}>\n");
    for item in items {
        html.push_str("<li>");
        html.push_str(&render_inline(item));
        html.push_str("</li>\n");
    }
    html.push_str(&format!("</{tag}>"));
    html
}
