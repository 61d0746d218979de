//! View routing
//!
//! Maps location paths to views and back. History side effects go through
//! the [`Navigator`] port so the router never depends on a concrete history
//! mechanism.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use procure_common::Error;

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Predictor,
    Docs,
    Status,
}

impl View {
    /// View for a location path; unknown paths show the predictor
    pub fn from_path(path: &str) -> Self {
        match path {
            "/docs" => View::Docs,
            "/status" => View::Status,
            _ => View::Predictor,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            View::Predictor => "/",
            View::Docs => "/docs",
            View::Status => "/status",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            View::Predictor => "predictor",
            View::Docs => "docs",
            View::Status => "status",
        }
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "predictor" | "home" | "/" => Ok(View::Predictor),
            "docs" | "/docs" => Ok(View::Docs),
            "status" | "/status" => Ok(View::Status),
            other => Err(Error::InvalidInput(format!(
                "Unknown view '{}' (expected predictor, docs or status)",
                other
            ))),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// History port
pub trait Navigator: Send + Sync {
    /// Record a new location without reloading
    fn push_path(&self, path: &str);

    /// Location currently shown
    fn current_path(&self) -> String;

    /// Step back in history; navigators without history return false
    fn back(&self) -> bool {
        false
    }

    /// Step forward in history; navigators without history return false
    fn forward(&self) -> bool {
        false
    }
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn push_path(&self, path: &str) {
        (**self).push_path(path)
    }

    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn back(&self) -> bool {
        (**self).back()
    }

    fn forward(&self) -> bool {
        (**self).forward()
    }
}

#[derive(Debug)]
struct HistoryStack {
    entries: Vec<String>,
    cursor: usize,
}

/// In-process history with back/forward traversal
///
/// Pushing after going back discards the forward entries.
#[derive(Debug)]
pub struct MemoryHistory {
    stack: Mutex<HistoryStack>,
}

impl MemoryHistory {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            stack: Mutex::new(HistoryStack {
                entries: vec![initial_path.into()],
                cursor: 0,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HistoryStack> {
        // The stack holds plain data, so a poisoned lock is still consistent
        self.stack.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for MemoryHistory {
    fn push_path(&self, path: &str) {
        let mut stack = self.lock();
        let keep = stack.cursor + 1;
        stack.entries.truncate(keep);
        stack.entries.push(path.to_string());
        stack.cursor = stack.entries.len() - 1;
    }

    fn current_path(&self) -> String {
        let stack = self.lock();
        stack.entries[stack.cursor].clone()
    }

    /// Returns false at the oldest entry
    fn back(&self) -> bool {
        let mut stack = self.lock();
        if stack.cursor == 0 {
            return false;
        }
        stack.cursor -= 1;
        true
    }

    /// Returns false at the newest entry
    fn forward(&self) -> bool {
        let mut stack = self.lock();
        if stack.cursor + 1 >= stack.entries.len() {
            return false;
        }
        stack.cursor += 1;
        true
    }
}

/// Active view plus the navigator it writes to
pub struct ViewRouter<N: Navigator> {
    navigator: N,
    view: View,
}

impl<N: Navigator> ViewRouter<N> {
    /// Derive the initial view from the navigator's current location
    pub fn new(navigator: N) -> Self {
        let view = View::from_path(&navigator.current_path());
        Self { navigator, view }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Switch to `view` and push its path
    ///
    /// Returns whether the active view changed.
    pub fn navigate(&mut self, view: View) -> bool {
        let changed = self.view != view;
        self.view = view;
        self.navigator.push_path(view.path());
        changed
    }

    /// Re-derive the view after the location changed outside of
    /// [`navigate`](Self::navigate) (history back/forward)
    ///
    /// Returns whether the active view changed.
    pub fn sync_with_location(&mut self) -> bool {
        let view = View::from_path(&self.navigator.current_path());
        let changed = self.view != view;
        self.view = view;
        changed
    }
}
