//! Path scoping for cross-cutting concerns.
//!
//! A [`PathScope`] decides per request whether an interceptor, a filter or
//! the exception advice applies. Patterns use glob syntax:
//!
//! - `/css/**` matches `/css` and everything beneath it
//! - `/error` matches exactly `/error`
//! - patterns without a leading `/` (such as `*.ico`) match the last path segment

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathScope {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl PathScope {
    /// An empty scope matches nothing until patterns are included
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path
    pub fn all() -> Self {
        Self::new().include("/**")
    }

    /// The base path itself and everything beneath it
    pub fn prefix(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        if base.is_empty() {
            return Self::all();
        }
        Self::new().include(base).include(format!("{base}/**"))
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn include_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn exclude_all<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn includes(&self) -> &[String] {
        &self.include
    }

    pub fn excludes(&self) -> &[String] {
        &self.exclude
    }

    /// Exclusions win over inclusions
    pub fn matches(&self, path: &str) -> bool {
        if self.exclude.iter().any(|p| pattern_matches(p, path)) {
            return false;
        }
        self.include.iter().any(|p| pattern_matches(p, path))
    }
}

/// Match a single pattern against a request path
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    if !pattern.starts_with('/') {
        let segment = path.rsplit('/').next().unwrap_or(path);
        return fast_glob::glob_match(pattern, segment);
    }

    // `/base/**` also covers `/base` itself
    if let Some(base) = pattern.strip_suffix("/**") {
        let bare = path.trim_end_matches('/');
        if bare == base {
            return true;
        }
    }

    fast_glob::glob_match(pattern, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interceptor_scope() -> PathScope {
        PathScope::all().exclude_all(["/css/**", "*.ico", "/error", "/error-page/**"])
    }

    #[test]
    fn test_all_matches_everything() {
        let scope = PathScope::all();
        assert!(scope.matches("/"));
        assert!(scope.matches("/members"));
        assert!(scope.matches("/api/members/1"));
    }

    #[test]
    fn test_excludes_error_paths() {
        let scope = interceptor_scope();
        assert!(!scope.matches("/error"));
        assert!(!scope.matches("/error-page/500"));
        assert!(!scope.matches("/css/site/main.css"));
        assert!(!scope.matches("/favicon.ico"));
        assert!(!scope.matches("/static/img/logo.ico"));

        assert!(scope.matches("/error-ex"));
        assert!(scope.matches("/errors"));
        assert!(scope.matches("/api/members/bad"));
    }

    #[test]
    fn test_prefix_scope() {
        let scope = PathScope::prefix("/api/");
        assert!(scope.matches("/api"));
        assert!(scope.matches("/api/members"));
        assert!(scope.matches("/api/members/user-ex"));

        assert!(!scope.matches("/apis"));
        assert!(!scope.matches("/error-ex"));
        assert!(!scope.matches("/"));
    }

    #[test]
    fn test_empty_scope_matches_nothing() {
        assert!(!PathScope::new().matches("/anything"));
    }

    #[test]
    fn test_double_star_covers_base() {
        assert!(pattern_matches("/css/**", "/css"));
        assert!(pattern_matches("/css/**", "/css/"));
        assert!(!pattern_matches("/css/**", "/cssx"));
    }
}
