//! Depth-first traversal and filtering over the data tree.
//!
//! These work on the ingested data, not on what is materialized, so they see
//! nodes hidden behind lazily collapsed parents too.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::data::DataStore;
use crate::id::DataKey;

/// What a traversal visitor wants to happen next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traverse {
    /// Descend into the node's children.
    #[default]
    Continue,
    /// Skip the node's children but keep going with its siblings.
    Prune,
    /// End the traversal.
    Stop,
}

impl From<()> for Traverse {
    fn from(_: ()) -> Self {
        Traverse::Continue
    }
}

/// `false` prunes, `true` continues.
impl From<bool> for Traverse {
    fn from(descend: bool) -> Self {
        if descend {
            Traverse::Continue
        } else {
            Traverse::Prune
        }
    }
}

/// Visit nodes depth-first in document order, starting at `from` (inclusive)
/// or at every root. Returns `false` if the visitor stopped early.
pub fn traverse<T, F, R>(store: &DataStore<T>, from: Option<DataKey>, mut visit: F) -> bool
where
    F: FnMut(DataKey, &T) -> R,
    R: Into<Traverse>,
{
    let mut stack: Vec<DataKey> = match from {
        Some(key) => vec![key],
        None => store.roots().iter().rev().copied().collect(),
    };
    while let Some(key) = stack.pop() {
        let Some(payload) = store.payload(key) else {
            continue;
        };
        match visit(key, payload).into() {
            Traverse::Continue => stack.extend(store.children(key).iter().rev()),
            Traverse::Prune => {}
            Traverse::Stop => return false,
        }
    }
    true
}

/// All keys in depth-first document order.
pub fn flatten<T>(store: &DataStore<T>, from: Option<DataKey>) -> Vec<DataKey> {
    let mut out = Vec::new();
    traverse(store, from, |key, _| out.push(key));
    out
}

/// Keys of matching nodes in depth-first order, at most `limit` of them.
pub fn filtered<T, F>(
    store: &DataStore<T>,
    from: Option<DataKey>,
    mut predicate: F,
    limit: usize,
) -> Vec<DataKey>
where
    F: FnMut(&T) -> bool,
{
    let mut out = Vec::new();
    if limit == 0 {
        return out;
    }
    traverse(store, from, |key, payload| {
        if predicate(payload) {
            out.push(key);
            if out.len() >= limit {
                return Traverse::Stop;
            }
        }
        Traverse::Continue
    });
    log::debug!("filter matched {} nodes (limit {})", out.len(), limit);
    out
}

/// Case-insensitive fuzzy matcher over display text.
///
/// An empty query matches everything.
pub struct FuzzyQuery {
    pattern: Option<Pattern>,
    matcher: Matcher,
    buf: Vec<char>,
}

impl FuzzyQuery {
    pub fn new(query: &str) -> Self {
        let pattern = (!query.trim().is_empty()).then(|| {
            Pattern::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
            )
        });
        Self {
            pattern,
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::new(),
        }
    }

    /// Match score for `text`, higher is better.
    pub fn score(&mut self, text: &str) -> Option<u32> {
        let Some(pattern) = &self.pattern else {
            return Some(0);
        };
        self.buf.clear();
        let haystack = Utf32Str::new(text, &mut self.buf);
        pattern.score(haystack, &mut self.matcher)
    }

    pub fn matches(&mut self, text: &str) -> bool {
        self.score(text).is_some()
    }
}

impl std::fmt::Debug for FuzzyQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyQuery")
            .field("empty", &self.pattern.is_none())
            .finish()
    }
}
