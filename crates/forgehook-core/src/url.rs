//! # URL Provider
//!
//! Builds the absolute links embedded in repository projections.

use url::Url;

/// Failure to construct a URL provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("invalid base URL '{base}': {message}")]
    InvalidBase { base: String, message: String },
}

/// Interface for building absolute links from repository paths.
pub trait UrlProvider: Send + Sync {
    /// Absolute git clone URL for the repository at `repo_path`.
    fn git_clone_url(&self, repo_path: &str) -> String;
}

/// URL provider rooted at a single configured base URL.
#[derive(Debug, Clone)]
pub struct BaseUrlProvider {
    base: Url,
}

impl BaseUrlProvider {
    /// Create a provider from the instance base URL, e.g. `https://git.example.com`.
    pub fn new(base: &str) -> Result<Self, UrlError> {
        let base = Url::parse(base).map_err(|e| UrlError::InvalidBase {
            base: base.to_string(),
            message: e.to_string(),
        })?;

        if base.cannot_be_a_base() {
            return Err(UrlError::InvalidBase {
                base: base.to_string(),
                message: "URL cannot serve as a base".to_string(),
            });
        }

        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl UrlProvider for BaseUrlProvider {
    fn git_clone_url(&self, repo_path: &str) -> String {
        format!(
            "{}/{}.git",
            self.base.as_str().trim_end_matches('/'),
            repo_path.trim_start_matches('/'),
        )
    }
}

#[cfg(test)]
#[path = "url_tests.rs"]
mod tests;
