//! Persistent string key-value storage.
//!
//! Mirrors browser local storage: string keys, string values, synchronous
//! reads and writes. The file-backed store keeps everything in one JSON
//! object and rewrites it on every `set`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::theme::ThemePreference;

/// Last edited document.
pub const CONTENT_KEY: &str = "markdown-editor-content";
/// Theme preference: `"true"`, `"false"` or `"auto"`.
pub const THEME_KEY: &str = "markdown-editor-theme";
/// Legacy boolean dark-mode flag, read only when [`THEME_KEY`] is absent.
pub const LEGACY_DARK_MODE_KEY: &str = "markdown-editor-dark-mode";

/// Document shown when nothing has been stored yet.
pub const DEFAULT_DOCUMENT: &str = "# Welcome to Markdown Editor

Start typing your markdown here...

## Features
- Live preview
- Syntax highlighting
- Dark mode support
- Local storage persistence
- Toolbar with formatting buttons
- Keyboard shortcuts (Ctrl+B, Ctrl+I)

## Example Content

**Bold text** and *italic text*

`Inline code` and code blocks:

```javascript
const greeting = \"Hello, World!\";
console.log(greeting);
```

> This is a blockquote
> It can span multiple lines

### Task List
- [x] Build basic editor
- [x] Add live preview
- [ ] Add more features
- [ ] Polish the UI

---

*Happy writing!*";

pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Volatile storage, used by tests and `--storage-dir` free runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object in a single file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. A corrupt file is logged and
    /// treated as empty; it is only overwritten on the next `set`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring unreadable storage file");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = values.len(), "storage opened");
        Self { path, values }
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let serde_json::Value::Object(map) = value else {
        return Err(Error::Storage("expected a JSON object".to_string()));
    };
    // Only string values are kept.
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) => Some((k, s)),
            _ => None,
        })
        .collect())
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.values.get(key).is_some_and(|v| v == value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Stored document, or the welcome template when nothing (or an empty
/// string) was stored.
pub fn load_document(storage: &dyn Storage) -> String {
    storage
        .get(CONTENT_KEY)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT.to_string())
}

/// Stored theme preference, falling back to the legacy flag.
pub fn load_theme(storage: &dyn Storage) -> ThemePreference {
    if let Some(value) = storage.get(THEME_KEY) {
        return ThemePreference::from_stored(Some(&value));
    }
    storage
        .get(LEGACY_DARK_MODE_KEY)
        .and_then(|v| ThemePreference::from_legacy_dark_mode(&v))
        .unwrap_or_default()
}
