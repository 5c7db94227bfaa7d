use super::Category;
use crate::Result;
use ohno::{IntoAppError, app_err};
use url::Url;

/// One artifact repository being scored, identified by its resolved
/// `namespace/repo` name and [`Category`].
///
/// Category resolution happens upstream; a `Target` is only constructed from
/// an already-classified `(url, category)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    name: String,
    url: Url,
    category: Category,
}

impl Target {
    /// Resolve a target from a repository URL and its upstream-assigned category.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL does not parse or does not carry a
    /// `namespace/repo` path.
    pub fn parse(url: &str, category: Category) -> Result<Self> {
        let url = Url::parse(url.trim()).into_app_err_with(|| format!("invalid target URL '{url}'"))?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        // Hub dataset URLs carry a `datasets/` prefix before the namespace.
        let parts: &[&str] = match segments.as_slice() {
            ["datasets", rest @ ..] => rest,
            other => other,
        };

        let [namespace, repo, ..] = parts else {
            return Err(app_err!("target URL '{url}' has no namespace/repo path"));
        };

        Ok(Self {
            name: format!("{namespace}/{repo}"),
            url,
            category,
        })
    }

    /// The resolved `namespace/repo` name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }
}

impl core::fmt::Display for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.name, self.category)
    }
}
