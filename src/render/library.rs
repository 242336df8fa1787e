//! comrak-backed engine with syntect highlighting for code fences.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use comrak::adapters::SyntaxHighlighterAdapter;
use comrak::{Options, Plugins};
use tracing::warn;

use super::{Renderer, escape_html};
use crate::highlight;
use crate::theme::Appearance;

/// Renders with comrak: tables, strikethrough, task lists, autolinks and
/// emoji shortcodes. Raw HTML in the source is omitted.
#[derive(Debug, Clone, Copy)]
pub struct LibraryRenderer {
    highlighter: CodeHighlighter,
}

impl LibraryRenderer {
    pub const fn new(appearance: Appearance) -> Self {
        Self {
            highlighter: CodeHighlighter { appearance },
        }
    }
}

impl Renderer for LibraryRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut options = Options::default();
        enable_extensions(&mut options);

        let mut plugins = Plugins::default();
        plugins.render.codefence_syntax_highlighter = Some(&self.highlighter);

        let html = comrak::markdown_to_html_with_plugins(markdown, &options, &plugins);
        crate::perf::log_event(
            "render.library",
            format!("bytes={} html_bytes={}", markdown.len(), html.len()),
        );
        html
    }

    fn name(&self) -> &'static str {
        "library"
    }
}

fn enable_extensions(options: &mut Options) {
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.shortcodes = true;
    options.render.unsafe_ = false;
}

/// Code fence hook: highlights recognized languages, escapes everything else.
#[derive(Debug, Clone, Copy)]
struct CodeHighlighter {
    appearance: Appearance,
}

impl SyntaxHighlighterAdapter for CodeHighlighter {
    fn write_highlighted(
        &self,
        output: &mut dyn Write,
        lang: Option<&str>,
        code: &str,
    ) -> io::Result<()> {
        let highlighted = match lang {
            Some(lang) => highlight::highlight_html(lang, code, self.appearance)
                .unwrap_or_else(|err| {
                    warn!(lang, %err, "highlighting failed, falling back to plain code");
                    None
                }),
            None => None,
        };
        match highlighted {
            Some(html) => output.write_all(html.as_bytes()),
            None => output.write_all(escape_html(code).as_bytes()),
        }
    }

    fn write_pre_tag(
        &self,
        output: &mut dyn Write,
        attributes: HashMap<String, String>,
    ) -> io::Result<()> {
        write_tag(output, "pre", attributes)
    }

    fn write_code_tag(
        &self,
        output: &mut dyn Write,
        mut attributes: HashMap<String, String>,
    ) -> io::Result<()> {
        let recognized = attributes
            .get("class")
            .and_then(|class| class.strip_prefix("language-"))
            .is_some_and(|lang| highlight::find_syntax(lang).is_some());
        if recognized
            && let Some(css) = highlight::background_css(self.appearance)
        {
            attributes.insert("style".to_string(), css);
        }
        write_tag(output, "code", attributes)
    }
}

fn write_tag(
    output: &mut dyn Write,
    tag: &str,
    attributes: HashMap<String, String>,
) -> io::Result<()> {
    // Sorted so output does not depend on hash order.
    let sorted: BTreeMap<String, String> = attributes.into_iter().collect();
    write!(output, "<{tag}")?;
    for (name, value) in &sorted {
        write!(output, " {}=\"{}\"", name, escape_html(value))?;
    }
    write!(output, ">")
}
