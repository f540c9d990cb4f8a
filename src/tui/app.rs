use crate::fsm::{FsmStateKind, FuzzyFinder};
use crate::search::executor::FuzzySearchResult;

/// Result rows requested per page; raised in steps when the user asks for
/// more after a truncation notice.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Interactive picker state. The event loop owns the terminal; the app
/// owns the finder session and the cursor.
pub struct App {
    finder: FuzzyFinder,
    pub query: String,
    /// Focused row, always within `0..results_count()` when nonempty
    pub focus_index: usize,
    pub max_results: usize,
    pub debug: bool,
    /// Last search answer; `None` until the FSM can serve queries
    pub result: Option<FuzzySearchResult>,
    /// Path chosen with Enter, handed back to the caller on exit
    pub selection: Option<String>,
}

impl App {
    pub fn new(finder: FuzzyFinder, initial_query: Option<String>, debug: bool) -> Self {
        Self {
            finder,
            query: initial_query.unwrap_or_default(),
            focus_index: 0,
            max_results: DEFAULT_MAX_RESULTS,
            debug,
            result: None,
            selection: None,
        }
    }

    /// One scheduling turn: advance the lifecycle, then refresh the
    /// visible results from the current (possibly partial) index. Repeated
    /// identical queries are absorbed by the finder's result cache.
    pub fn on_tick(&mut self) {
        self.finder.step();
        self.result = self.finder.search(&self.query, self.max_results);
        let count = self.results_count();
        if count > 0 && self.focus_index >= count {
            self.focus_index = count - 1;
        }
    }

    pub fn state_kind(&self) -> FsmStateKind {
        self.finder.state_kind()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.finder.error_message()
    }

    pub fn progress(&self) -> Option<(usize, usize)> {
        self.finder.progress()
    }

    pub fn total_file_count(&self) -> usize {
        self.finder.total_file_count().unwrap_or(0)
    }

    pub fn estimated_false_positive_rate(&self) -> f64 {
        self.finder.estimated_false_positive_rate().unwrap_or(0.0)
    }

    pub fn results_count(&self) -> usize {
        self.result.as_ref().map_or(0, |r| r.results_count())
    }

    pub fn is_truncated(&self) -> bool {
        self.result.as_ref().is_some_and(|r| !r.is_complete)
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.focus_index = 0;
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.focus_index = 0;
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
        self.focus_index = 0;
    }

    /// Move the focus by `delta`, cycling past either end so holding the
    /// down arrow wraps from the last result back to the first.
    pub fn move_focus(&mut self, delta: isize) {
        let count = self.results_count() as isize;
        if count == 0 {
            return;
        }
        let next = (self.focus_index as isize + delta) % count;
        self.focus_index = if next < 0 { count + next } else { next } as usize;
    }

    /// Raise the page size after a truncation notice
    pub fn show_more(&mut self) {
        if self.is_truncated() {
            self.max_results += DEFAULT_MAX_RESULTS;
        }
    }

    /// Record the focused path as the final selection
    pub fn select_focused(&mut self) {
        if let Some(result) = &self.result {
            if let Some(file_match) = result.matches.get(self.focus_index) {
                self.selection = Some(file_match.text.clone());
            }
        }
    }
}
