//! Syntax highlighting for fenced code blocks.
//!
//! Uses syntect with Sublime Text syntax definitions and emits HTML spans
//! with inline styles, so highlighted blocks survive export without a
//! separate stylesheet.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::Result;
use crate::theme::Appearance;

/// Look up a syntax by fence token (`rs`, `js`) or by name (`Rust`).
pub fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let lang = language.trim();
    if lang.is_empty() {
        return None;
    }
    let syntax_set = syntax_set();
    syntax_set
        .find_syntax_by_token(lang)
        .or_else(|| syntax_set.find_syntax_by_name(lang))
}

/// Highlight `code` as `language`.
///
/// Returns `Ok(None)` when the language is not recognized so the caller can
/// fall back to plain escaped code.
///
/// # Errors
/// Returns an error if syntect fails while parsing a line.
pub fn highlight_html(
    language: &str,
    code: &str,
    appearance: Appearance,
) -> Result<Option<String>> {
    let Some(syntax) = find_syntax(language) else {
        return Ok(None);
    };
    let _scope = crate::perf::scope("highlight.code_block");
    let mut highlighter = HighlightLines::new(syntax, theme(appearance));
    let mut html = String::with_capacity(code.len() * 4);
    for line in LinesWithEndings::from(code) {
        let regions = highlighter.highlight_line(line, syntax_set())?;
        html.push_str(&styled_line_to_highlighted_html(
            &regions,
            IncludeBackground::No,
        )?);
    }
    Ok(Some(html))
}

/// `background-color` declaration for highlighted blocks, if the theme has one.
pub fn background_css(appearance: Appearance) -> Option<String> {
    let c = theme(appearance).settings.background?;
    Some(format!(
        "background-color:#{:02x}{:02x}{:02x};",
        c.r, c.g, c.b
    ))
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme(appearance: Appearance) -> &'static Theme {
    static DARK: OnceLock<Theme> = OnceLock::new();
    static LIGHT: OnceLock<Theme> = OnceLock::new();
    let cell = match appearance {
        Appearance::Dark => &DARK,
        Appearance::Light => &LIGHT,
    };
    cell.get_or_init(|| load_theme(appearance))
}

fn load_theme(appearance: Appearance) -> Theme {
    let _scope = crate::perf::scope("highlight.theme.load_defaults");
    let theme_set = ThemeSet::load_defaults();
    let preferred = match appearance {
        Appearance::Dark => [
            "base16-ocean.dark",
            "Monokai Extended",
            "Solarized (dark)",
            "base16-eighties.dark",
        ]
        .as_slice(),
        Appearance::Light => [
            "InspiredGitHub",
            "Solarized (light)",
            "base16-ocean.light",
        ]
        .as_slice(),
    };

    for name in preferred {
        if let Some(theme) = theme_set.themes.get(*name) {
            return theme.clone();
        }
    }

    theme_set
        .themes
        .values()
        .next()
        .cloned()
        .unwrap_or_default()
}
