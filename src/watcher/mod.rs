//! Debounced change notifications for a source file.
//!
//! Backs the `watch` command: edits made in another editor are picked up
//! and the preview is regenerated. Uses `notify` for cross-platform events.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

/// Watches the directory containing one file and reports when that file
/// has settled after a burst of writes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    target: PathBuf,
    target_name: Option<OsString>,
    debounce: Duration,
    dirty_since: Option<Instant>,
}

impl FileWatcher {
    /// Start watching `path`.
    ///
    /// Editors often save by writing a temp file and renaming it, so the
    /// parent directory is watched rather than the file itself.
    ///
    /// # Errors
    /// Returns an error if the watcher cannot be created or the directory
    /// cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        let path = path.as_ref();
        // Event paths from the OS are canonical.
        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let target_name = target.file_name().map(std::ffi::OsStr::to_os_string);
        let dir = parent_dir(&target);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        debug!(target = %target.display(), dir = %dir.display(), "watching");

        Ok(Self {
            _watcher: watcher,
            rx,
            dir,
            target,
            target_name,
            debounce,
            dirty_since: None,
        })
    }

    pub fn target_path(&self) -> &Path {
        &self.target
    }

    /// Drain pending events. Returns true once the file has been quiet for
    /// the debounce interval after a relevant change.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            self.record(event, &mut relevant, &mut ignored);
        }
        self.settle(relevant, ignored)
    }

    /// Block up to `timeout` for a debounced change.
    pub fn wait_for_change(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.take_change_ready() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let wait = self
                .dirty_since
                .map_or(deadline - now, |since| {
                    (since + self.debounce).saturating_duration_since(now)
                })
                .min(deadline - now)
                .max(Duration::from_millis(1));
            match self.rx.recv_timeout(wait) {
                Ok(event) => {
                    let (mut relevant, mut ignored) = (0, 0);
                    self.record(event, &mut relevant, &mut ignored);
                    if relevant > 0 {
                        self.dirty_since = Some(Instant::now());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    fn record(&self, event: notify::Result<Event>, relevant: &mut u32, ignored: &mut u32) {
        match event {
            Ok(ev) if self.is_relevant(&ev) => *relevant += 1,
            Ok(ev) => {
                *ignored += 1;
                crate::perf::log_event(
                    "watcher.ignored",
                    format!("kind={:?} paths={:?}", ev.kind, ev.paths),
                );
            }
            Err(err) => {
                warn!(%err, "watch error");
                crate::perf::log_event("watcher.error", err.to_string());
            }
        }
    }

    fn settle(&mut self, relevant: u32, ignored: u32) -> bool {
        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} target={}",
                    self.target.display()
                ),
            );
        }
        if relevant > 0 {
            self.dirty_since = Some(Instant::now());
        }
        match self.dirty_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.dirty_since = None;
                true
            }
            _ => false,
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.dir
                || path == &self.target
                || self
                    .target_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
