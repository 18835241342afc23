use crate::classifier::PathParams;
use crate::errors::PaperTrailError;
use regex::Regex;
use std::sync::LazyLock;

/// Content-manager editing routes: `/content-manager/collection-types/api::article.article/12`
pub const DEFAULT_ADMIN_PATH_PATTERN: &str =
    r"^/content-manager/(?:collection-types|single-types)/(?P<uid>[^/]+)(?:/(?P<id>[^/]+))?/?$";

/// Generated public API routes: `/api/articles/12`
pub const DEFAULT_API_PATH_PATTERN: &str = r"^/api/(?P<name>[^/]+)(?:/(?P<id>[^/]+))?/?$";

static DEFAULT_ADMIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_ADMIN_PATH_PATTERN).expect("default admin path pattern compiles")
});

static DEFAULT_API: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_API_PATH_PATTERN).expect("default api path pattern compiles")
});

/// Which route family a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFamily {
    Admin,
    Api,
}

/// Compiled matchers for the two route families
///
/// A pattern must name the content-type segment `uid` or `name` and may name
/// the record segment `id`. The administrative family is tried first.
#[derive(Debug, Clone)]
pub struct PathMatchers {
    admin: Regex,
    api: Regex,
}

impl PathMatchers {
    /// # Errors
    ///
    /// `InvalidPattern` if a pattern does not compile or lacks a
    /// content-type capture group.
    pub fn new(admin_pattern: &str, api_pattern: &str) -> Result<Self, PaperTrailError> {
        Ok(Self {
            admin: compile(admin_pattern)?,
            api: compile(api_pattern)?,
        })
    }

    pub fn match_path(&self, path: &str) -> Option<(PathFamily, PathParams)> {
        let path = strip_query(path);
        if let Some(params) = extract(&self.admin, path) {
            return Some((PathFamily::Admin, params));
        }
        extract(&self.api, path).map(|params| (PathFamily::Api, params))
    }
}

impl Default for PathMatchers {
    fn default() -> Self {
        Self {
            admin: DEFAULT_ADMIN.clone(),
            api: DEFAULT_API.clone(),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, PaperTrailError> {
    let regex = Regex::new(pattern).map_err(|e| PaperTrailError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let names: Vec<&str> = regex.capture_names().flatten().collect();
    if !names.contains(&"uid") && !names.contains(&"name") {
        return Err(PaperTrailError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "pattern must capture `uid` or `name`".to_string(),
        });
    }
    Ok(regex)
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn extract(regex: &Regex, path: &str) -> Option<PathParams> {
    let caps = regex.captures(path)?;
    let content_type = caps.name("uid").or_else(|| caps.name("name"))?.as_str();
    Some(PathParams {
        content_type: content_type.to_string(),
        record_id: caps.name("id").map(|m| m.as_str().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("/api/articles/1?populate=*"), "/api/articles/1");
        assert_eq!(strip_query("/api/articles"), "/api/articles");
    }

    #[test]
    fn test_pattern_without_content_type_group_is_rejected() {
        let err = PathMatchers::new(r"^/admin/(?P<id>\d+)$", DEFAULT_API_PATH_PATTERN).unwrap_err();
        assert!(matches!(err, PaperTrailError::InvalidPattern { .. }));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        assert!(PathMatchers::new("(", DEFAULT_API_PATH_PATTERN).is_err());
    }
}
