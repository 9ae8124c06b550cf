//! Route → requirement registry.
//!
//! Every guarded route is registered together with the [`Requirements`] the
//! gate middleware enforces for it, so the handler table and the access table
//! cannot drift apart.

use std::collections::HashMap;

use axum::Router;
use axum::routing::MethodRouter;

use roombook_auth::Requirements;

/// Access requirements keyed by route pattern.
///
/// Patterns are the ones given to axum (`/users/:id`), matched against
/// `MatchedPath`, never against the raw request URI. An entry covers every
/// method the pattern's `MethodRouter` answers, including the implicit
/// `HEAD` of a `get` handler.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: HashMap<String, Requirements>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pattern: impl Into<String>, requirements: Requirements) {
        self.entries.insert(pattern.into(), requirements);
    }

    /// `None` for a pattern nobody registered; callers must treat that as a
    /// misconfiguration, not as public.
    pub fn requirements(&self, pattern: &str) -> Option<&Requirements> {
        self.entries.get(pattern)
    }
}

/// Router builder that records each route's requirements as it is added.
pub struct GuardedRouter<S = ()> {
    router: Router<S>,
    table: RouteTable,
}

impl<S> GuardedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            table: RouteTable::new(),
        }
    }

    /// Add `handler` under `pattern`, guarded by `requirements` for every
    /// method it serves.
    pub fn route(mut self, pattern: &str, handler: MethodRouter<S>, requirements: Requirements) -> Self {
        self.table.insert(pattern, requirements);
        self.router = self.router.route(pattern, handler);
        self
    }

    pub fn into_parts(self) -> (Router<S>, RouteTable) {
        (self.router, self.table)
    }
}

impl<S> Default for GuardedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
