use fpk_schemas::PatchPayload;
use tracing::{debug, info, warn};

use crate::error::decode_error_body;
use crate::{CancelToken, ClientConfig, PatchSubmitError};

/// HTTP adapter for the "patch feature flag" endpoint.
///
/// One client per process is enough; `reqwest::Client` pools connections
/// internally. All submissions go through
/// [`submit_patch`][FlagPatchClient::submit_patch], which races the request
/// against the caller's cancellation token.
#[derive(Debug, Clone)]
pub struct FlagPatchClient {
    http: reqwest::Client,
    cfg: ClientConfig,
}

impl FlagPatchClient {
    pub fn new(cfg: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    fn patch_url(&self, flag: &str) -> String {
        format!(
            "{}/projects/{}/environments/{}/flags/{}/targeting",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.project,
            self.cfg.environment,
            flag
        )
    }

    /// PATCH the accumulated instruction list for one flag.
    ///
    /// An empty payload is a no-op returning `Ok` — emptiness means "no
    /// change", and the backend must not see an empty instruction list.
    /// Cancellation abandons the in-flight request and returns
    /// [`PatchSubmitError::Cancelled`]; whether the backend applied the
    /// patch is then unknown to the caller.
    pub async fn submit_patch(
        &self,
        flag: &str,
        payload: &PatchPayload,
        cancel: &CancelToken,
    ) -> Result<(), PatchSubmitError> {
        if payload.is_empty() {
            debug!(flag, "empty patch payload, skipping network call");
            return Ok(());
        }
        if cancel.is_cancelled() {
            return Err(PatchSubmitError::Cancelled);
        }

        info!(
            flag,
            instructions = payload.len(),
            "submitting targeting patch"
        );

        let request = self
            .http
            .patch(self.patch_url(flag))
            .bearer_auth(&self.cfg.api_token)
            .json(payload)
            .send();

        let mut cancel = cancel.clone();
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                warn!(flag, "patch submission cancelled by caller");
                return Err(PatchSubmitError::Cancelled);
            }
            resp = request => resp.map_err(PatchSubmitError::Transport)?,
        };

        let status = response.status();
        if status.is_success() {
            info!(flag, status = status.as_u16(), "targeting patch applied");
            return Ok(());
        }

        let body = response
            .text()
            .await
            .map_err(PatchSubmitError::Transport)?;
        let err = decode_error_body(status.as_u16(), &body);
        warn!(flag, status = status.as_u16(), %err, "targeting patch rejected");
        Err(err)
    }
}
