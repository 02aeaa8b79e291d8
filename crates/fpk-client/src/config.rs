use anyhow::{bail, Result};

/// Endpoint configuration, resolved from the environment **once** at startup
/// and passed into constructors. Do not scatter `std::env::var` calls
/// elsewhere. The token is redacted in `Debug` output.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the flag service, no trailing slash required.
    pub base_url: String,
    /// Bearer token for the patch endpoint.
    pub api_token: String,
    pub project: String,
    pub environment: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("project", &self.project)
            .field("environment", &self.environment)
            .finish()
    }
}

impl ClientConfig {
    /// Resolve from `FPK_API_BASE_URL`, `FPK_API_TOKEN`, `FPK_PROJECT`,
    /// `FPK_ENVIRONMENT`. Error messages name the env var, never its value.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: required_env("FPK_API_BASE_URL")?,
            api_token: required_env("FPK_API_TOKEN")?,
            project: required_env("FPK_PROJECT")?,
            environment: required_env("FPK_ENVIRONMENT")?,
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("missing required env var {name}"),
    }
}
