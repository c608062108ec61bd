//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Register an implicit OPTIONS preflight route for every path
//! - Look up matching route for request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) method lookup via HashMap
//! - O(n) pattern scan per method (acceptable for typical route counts)
//! - Explicit NoMatch rather than silent default

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use axum::http::Method;

use crate::action::ActionRef;
use crate::config::HandlerConfig;
use crate::routing::matcher::{PathParams, PathPattern};
use crate::routing::RouteError;

/// The fixed set of methods a handler may be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Verb {
    pub const ALL: [Verb; 6] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Options => "OPTIONS",
        }
    }

    /// Map a request method, if it is one we route.
    pub fn from_method(method: &Method) -> Option<Self> {
        Verb::ALL.into_iter().find(|v| v.as_str() == method.as_str())
    }
}

impl FromStr for Verb {
    type Err = RouteError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == upper)
            .ok_or(RouteError::InvalidMethod(upper))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated handler registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub method: Verb,
    pub pattern: PathPattern,
    pub action: ActionRef,
}

impl RouteConfig {
    pub fn new(method: &str, path: &str, action: impl Into<ActionRef>) -> Result<Self, RouteError> {
        let method = method.parse()?;
        let pattern = PathPattern::parse(path)?;
        let action = action.into();
        if action.as_str().is_empty() {
            return Err(RouteError::MissingAction);
        }
        Ok(Self {
            method,
            pattern,
            action,
        })
    }

    /// Validate a handler as read from configuration.
    pub fn from_handler(handler: &HandlerConfig) -> Result<Self, RouteError> {
        let (method, path) = match (&handler.method, &handler.path) {
            (None, None) => return Err(RouteError::MissingSettings),
            (None, Some(_)) => return Err(RouteError::MissingMethod),
            (Some(m), _) if m.trim().is_empty() => return Err(RouteError::MissingMethod),
            (Some(_), None) => return Err(RouteError::EmptyPath),
            (Some(m), Some(p)) => (m, p),
        };
        Self::new(method, path, handler.action_id.as_str())
    }
}

/// What a matched route leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// Invoke the runner with this action.
    Action(ActionRef),
    /// Answer a CORS preflight.
    Preflight,
}

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Verb,
    pub pattern: PathPattern,
    pub target: RouteTarget,
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: PathParams,
}

impl RouteMatch<'_> {
    pub fn action(&self) -> Option<&ActionRef> {
        match &self.route.target {
            RouteTarget::Action(action) => Some(action),
            RouteTarget::Preflight => None,
        }
    }
}

/// Immutable (after startup) table of routes, keyed by method.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<Verb, Vec<Route>>,
    /// (method, pattern) pairs registered explicitly, for duplicate detection.
    explicit: HashSet<(Verb, String)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from configured handlers, stopping at the first bad one.
    pub fn from_handlers(handlers: &[HandlerConfig]) -> Result<Self, RouteError> {
        let mut table = Self::new();
        for handler in handlers {
            table.register(RouteConfig::from_handler(handler)?)?;
        }
        Ok(table)
    }

    /// Register a route, plus the OPTIONS preflight route for its path.
    pub fn register(&mut self, config: RouteConfig) -> Result<(), RouteError> {
        let key = (config.method, config.pattern.as_str().to_string());
        if self.explicit.contains(&key) {
            return Err(RouteError::Duplicate {
                method: config.method.to_string(),
                path: config.pattern.as_str().to_string(),
            });
        }
        self.explicit.insert(key);

        tracing::debug!(
            method = %config.method,
            path = %config.pattern,
            action = %config.action,
            "Registering handler"
        );

        if config.method == Verb::Options {
            tracing::warn!(
                path = %config.pattern,
                action = %config.action,
                "OPTIONS is answered by the CORS preflight; action will not be invoked"
            );
        } else {
            self.routes.entry(config.method).or_default().push(Route {
                method: config.method,
                pattern: config.pattern.clone(),
                target: RouteTarget::Action(config.action),
            });
        }

        self.ensure_preflight(config.pattern);
        Ok(())
    }

    fn ensure_preflight(&mut self, pattern: PathPattern) {
        let preflights = self.routes.entry(Verb::Options).or_default();
        if preflights.iter().all(|r| r.pattern != pattern) {
            preflights.push(Route {
                method: Verb::Options,
                pattern,
                target: RouteTarget::Preflight,
            });
        }
    }

    /// Find the route for a request.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let verb = Verb::from_method(method)?;
        let candidates = self.routes.get(&verb)?;

        let mut best: Option<RouteMatch<'_>> = None;
        for route in candidates {
            if let Some(params) = route.pattern.matches(path) {
                let better = match &best {
                    None => true,
                    Some(current) => {
                        route.pattern.specificity() > current.route.pattern.specificity()
                    }
                };
                if better {
                    best = Some(RouteMatch { route, params });
                }
            }
        }
        best
    }

    /// All registered routes, including implicit preflights.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
