//! Client settings loaded from the environment.

use serde::Serialize;

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "CUSTOMGPT_API_KEY";
/// Environment variable holding the API base URL.
pub const API_BASE_VAR: &str = "CUSTOMGPT_API_BASE";
/// Legacy name for [`API_BASE_VAR`], still honoured.
pub const LEGACY_BASE_URL_VAR: &str = "CUSTOMGPT_BASE_URL";
/// Environment variable holding the per-request timeout in seconds.
pub const TIMEOUT_VAR: &str = "CUSTOMGPT_TIMEOUT_SECS";

/// Production API base.
pub const DEFAULT_API_BASE: &str = "https://app.customgpt.ai/api/v1";
/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for [`crate::CustomGptClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// API credential. Empty when not configured.
    pub api_key: String,
    /// API base URL without a trailing slash.
    pub api_base: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientSettings {
    /// Create settings with the default base URL and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = normalize_base(&base.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Load settings from process environment variables.
    ///
    /// Checks in order:
    /// 1. CUSTOMGPT_API_BASE
    /// 2. CUSTOMGPT_BASE_URL (legacy)
    /// 3. the production base URL
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR).unwrap_or_default();
        let api_base = non_empty(API_BASE_VAR)
            .or_else(|| non_empty(LEGACY_BASE_URL_VAR))
            .map(|b| normalize_base(&b))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = non_empty(TIMEOUT_VAR)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key,
            api_base,
            timeout_secs,
        }
    }

    /// Whether a credential is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Return every configuration problem found. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.has_api_key() {
            errors.push(format!("{} environment variable is required", API_KEY_VAR));
        }

        match reqwest::Url::parse(&self.api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => errors.push(format!(
                "{} must be an absolute http(s) URL, got '{}'",
                API_BASE_VAR, self.api_base
            )),
        }

        if self.timeout_secs == 0 {
            errors.push(format!("{} must be greater than zero", TIMEOUT_VAR));
        }

        errors
    }

    /// The credential with everything but the first and last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        mask_secret(&self.api_key)
    }

    /// A view of the settings that is safe to print.
    pub fn redacted(&self) -> RedactedSettings {
        RedactedSettings {
            customgpt_api_key: self.masked_api_key(),
            customgpt_api_base: self.api_base.clone(),
            customgpt_timeout_secs: self.timeout_secs,
        }
    }
}

/// Printable settings with the credential masked.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedSettings {
    pub customgpt_api_key: String,
    pub customgpt_api_base: String,
    pub customgpt_timeout_secs: u64,
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}
