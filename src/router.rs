use std::collections::VecDeque;

use crate::route::{FRAGMENT_PREFIX, Route};

/// Location history as the viewer sees it.
///
/// `replace_silently` rewrites the current entry without emitting a route change
/// and without adding an entry. `push` adds an entry and queues a route change, the
/// same way a link click or a manual address-bar edit would.
pub trait History {
    fn fragment(&self) -> String;
    fn replace_silently(&mut self, fragment: &str);
    fn push(&mut self, fragment: &str);
    fn back(&mut self) -> bool;
    fn forward(&mut self) -> bool;
    /// Next fragment the host navigated to, if any is pending.
    fn poll_route_change(&mut self) -> Option<String>;
}

/// In-process history with back/forward support.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
    pending: VecDeque<String>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_owned()],
            cursor: 0,
            pending: VecDeque::new(),
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(FRAGMENT_PREFIX)
    }
}

impl History for MemoryHistory {
    fn fragment(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn replace_silently(&mut self, fragment: &str) {
        self.entries[self.cursor] = fragment.to_owned();
    }

    fn push(&mut self, fragment: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment.to_owned());
        self.cursor += 1;
        self.pending.push_back(fragment.to_owned());
    }

    fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.pending.push_back(self.entries[self.cursor].clone());
        true
    }

    fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        self.pending.push_back(self.entries[self.cursor].clone());
        true
    }

    fn poll_route_change(&mut self) -> Option<String> {
        self.pending.pop_front()
    }
}

/// Keeps the address bar in step with controller state without re-entering dispatch.
pub struct Router {
    history: Box<dyn History>,
}

impl Router {
    pub fn new(history: Box<dyn History>) -> Self {
        Self { history }
    }

    pub fn fragment(&self) -> String {
        self.history.fragment()
    }

    /// Returns `false` when the fragment already matched and nothing was written.
    pub fn write_silently(&mut self, route: Route) -> bool {
        let fragment = route.fragment();
        if self.history.fragment() == fragment {
            return false;
        }
        tracing::debug!(%fragment, "silent fragment write");
        self.history.replace_silently(&fragment);
        true
    }

    pub fn write_navigable(&mut self, route: Route) {
        let fragment = route.fragment();
        tracing::debug!(%fragment, "navigable fragment write");
        self.history.push(&fragment);
    }

    pub fn next_route_change(&mut self) -> Option<String> {
        self.history.poll_route_change()
    }

    pub fn history_mut(&mut self) -> &mut dyn History {
        self.history.as_mut()
    }
}
