use crate::constants::{protocols, sodium};
use crate::errors::ToolError;
use url::Url;

/// Connection settings for one tenant, fixed for the process lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct SodiumConfig {
    pub base_url: Url,
    pub api_key: String,
    pub tenant: String,
}

impl std::fmt::Debug for SodiumConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SodiumConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("tenant", &self.tenant)
            .finish()
    }
}

impl SodiumConfig {
    pub fn new(base_url: &str, api_key: &str, tenant: &str) -> Result<Self, ToolError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            api_key: require_value(sodium::ENV_API_KEY, Some(api_key.to_string()))?,
            tenant: require_value(sodium::ENV_TENANT, Some(tenant.to_string()))?,
        })
    }

    pub fn from_env() -> Result<Self, ToolError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ToolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = require_value(sodium::ENV_API_KEY, lookup(sodium::ENV_API_KEY))?;
        let tenant = require_value(sodium::ENV_TENANT, lookup(sodium::ENV_TENANT))?;
        let base_url = lookup(sodium::ENV_API_URL)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| sodium::DEFAULT_API_URL.to_string());
        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            api_key,
            tenant,
        })
    }
}

fn require_value(name: &str, value: Option<String>) -> Result<String, ToolError> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| {
            ToolError::config(format!("{} environment variable is required", name))
                .with_hint(format!("Set {} before starting the server.", name))
        })
}

fn normalize_base_url(raw: &str) -> Result<Url, ToolError> {
    let raw = raw.trim();
    let mut url = Url::parse(raw).map_err(|_| {
        ToolError::config(format!("{} is not a valid URL", sodium::ENV_API_URL))
            .with_hint("Expected a URL such as \"https://api.sodiumhq.com\".")
            .with_details(serde_json::json!({ "url": raw }))
    })?;
    let scheme = format!("{}:", url.scheme());
    if !protocols::ALLOWED_HTTP.contains(&scheme.as_str()) {
        return Err(ToolError::config(format!(
            "{} must use http or https",
            sodium::ENV_API_URL
        ))
        .with_details(serde_json::json!({ "url": raw })));
    }
    url.set_fragment(None);
    url.set_query(None);
    Ok(url)
}
