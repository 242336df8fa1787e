//! Export the document as a downloadable file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::render::{PipelineRenderer, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    #[value(alias = "md")]
    Markdown,
    Html,
}

impl ExportFormat {
    pub const fn filename(self) -> &'static str {
        match self {
            Self::Markdown => "document.md",
            Self::Html => "document.html",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
        }
    }
}

/// A file ready to be written or offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub contents: String,
}

impl Export {
    /// Build the export for `document`. HTML uses the pipeline renderer
    /// wrapped in a standalone page.
    pub fn new(format: ExportFormat, document: &str) -> Self {
        Self::with_renderer(format, document, &PipelineRenderer)
    }

    /// Like [`Export::new`], rendering HTML with `renderer`.
    pub fn with_renderer(
        format: ExportFormat,
        document: &str,
        renderer: &dyn Renderer,
    ) -> Self {
        let contents = match format {
            ExportFormat::Markdown => document.to_string(),
            ExportFormat::Html => html_page(&renderer.render(document)),
        };
        Self {
            filename: format.filename(),
            mime_type: format.mime_type(),
            contents,
        }
    }
}

/// Write `export` into `dir` under its fixed filename.
///
/// # Errors
/// Returns an error if the directory cannot be created or the file written.
pub fn write_export(export: &Export, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export.filename);
    fs::write(&path, &export.contents)?;
    info!(path = %path.display(), mime = export.mime_type, "exported");
    Ok(path)
}

const STYLESHEET: &str = "\
body { max-width: 48rem; margin: 2rem auto; padding: 0 1rem; \
font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; line-height: 1.6; }
h1 { font-size: 2em; font-weight: bold; margin: 0.67em 0; }
h2 { font-size: 1.5em; font-weight: bold; margin: 0.83em 0; }
h3 { font-size: 1.17em; font-weight: bold; margin: 1em 0; }
code { background: #f3f4f6; padding: 0.1em 0.3em; border-radius: 4px; \
font-family: ui-monospace, Menlo, monospace; }
pre { background: #f3f4f6; padding: 1em; border-radius: 6px; overflow-x: auto; }
pre code { background: none; padding: 0; }
blockquote { border-left: 4px solid #d1d5db; margin: 1em 0; padding-left: 1em; color: #4b5563; }
.task-list-item { list-style: none; margin: 0.25em 0; }
.task-list-item input { margin-right: 0.5em; }
a { color: #2563eb; }
hr { border: none; border-top: 1px solid #d1d5db; margin: 1.5em 0; }
";

fn html_page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Document</title>\n<style>\n{STYLESHEET}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_markdown_export_is_raw_document() {
        let export = Export::new(ExportFormat::Markdown, "# Hi\n*there*");
        assert_eq!(export.filename, "document.md");
        assert_eq!(export.mime_type, "text/markdown");
        assert_eq!(export.contents, "# Hi\n*there*");
    }

    #[test]
    fn test_html_export_wraps_rendered_body() {
        let export = Export::new(ExportFormat::Html, "# Hi\n\n> quote");
        assert_eq!(export.filename, "document.html");
        assert_eq!(export.mime_type, "text/html");
        assert!(export.contents.starts_with("<!DOCTYPE html>"));
        assert!(export.contents.contains("<style>"));
        assert!(export.contents.contains("<h1>Hi</h1>\n<blockquote>quote</blockquote>"));
        assert!(export.contents.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_html_export_with_library_renderer() {
        let renderer = crate::render::LibraryRenderer::new(crate::theme::Appearance::Light);
        let export = Export::with_renderer(ExportFormat::Html, "~~old~~", &renderer);
        assert!(export.contents.contains("<del>old</del>"));
        assert_eq!(export.filename, "document.html");
    }

    #[test]
    fn test_stylesheet_covers_block_elements() {
        for selector in ["h1 {", "pre {", "code {", "blockquote {", ".task-list-item {"] {
            assert!(STYLESHEET.contains(selector), "missing {selector}");
        }
    }

    #[test]
    fn test_write_export_uses_fixed_filename() {
        let dir = tempdir().unwrap();
        let export = Export::new(ExportFormat::Markdown, "body");
        let path = write_export(&export, &dir.path().join("out")).unwrap();
        assert_eq!(path, dir.path().join("out").join("document.md"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "body");
    }
}
