//! Markdown to HTML rendering.
//!
//! Two engines share the [`Renderer`] trait:
//! - [`PipelineRenderer`]: in-crate block and inline rules. Default engine,
//!   also used for HTML export.
//! - [`LibraryRenderer`]: comrak with GFM extensions and syntect
//!   highlighting for language-tagged code fences.
//!
//! Both engines escape all source text; raw HTML in the document is never
//! passed through.

mod inline;
mod library;
mod pipeline;

pub use inline::render_inline;
pub use library::LibraryRenderer;

use crate::theme::Appearance;

/// Converts a full markdown document to an HTML fragment.
pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;

    fn name(&self) -> &'static str;
}

/// The rule-based engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineRenderer;

impl Renderer for PipelineRenderer {
    fn render(&self, markdown: &str) -> String {
        pipeline::render(markdown)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RenderEngine {
    #[default]
    Pipeline,
    Library,
}

impl RenderEngine {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Library => "library",
        }
    }

    /// Build the renderer for this engine. Only the library engine
    /// depends on `appearance` (it picks the highlighting theme).
    pub fn renderer(self, appearance: Appearance) -> Box<dyn Renderer> {
        match self {
            Self::Pipeline => Box::new(PipelineRenderer),
            Self::Library => Box::new(LibraryRenderer::new(appearance)),
        }
    }

    /// Render with a one-off renderer for this engine.
    pub fn render(self, markdown: &str, appearance: Appearance) -> String {
        let _scope = crate::perf::scope("render.document");
        self.renderer(appearance).render(markdown)
    }
}

impl std::str::FromStr for RenderEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pipeline" => Ok(Self::Pipeline),
            "library" | "comrak" => Ok(Self::Library),
            other => Err(format!("unknown render engine: {other}")),
        }
    }
}

/// Render `markdown` with the pipeline engine.
pub fn render(markdown: &str) -> String {
    pipeline::render(markdown)
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
