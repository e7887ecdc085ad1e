//! Account identity resolution via STS `GetCallerIdentity`.

use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::provider::IdentityProvider;

/// Placeholder used in the report header when the account id cannot be
/// resolved. Identity failure never aborts the sweep.
pub const ACCOUNT_PLACEHOLDER: &str = "unknown";

/// STS-backed identity provider.
pub struct StsIdentity {
    client: aws_sdk_sts::Client,
}

impl StsIdentity {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_sts::Client::new(config),
        }
    }
}

impl IdentityProvider for StsIdentity {
    async fn get_account_id(&self) -> Result<String, ProviderError> {
        debug!("Sending STS GetCallerIdentity API request");

        let response = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| ProviderError::aws("sts::identity", e))?;

        response
            .account()
            .map(String::from)
            .ok_or_else(|| ProviderError::new("sts::identity", "response carried no account id"))
    }
}

/// Resolve the account id for the report header, degrading to
/// [`ACCOUNT_PLACEHOLDER`] on any error. No retries.
pub async fn resolve_identity(provider: &impl IdentityProvider) -> String {
    match provider.get_account_id().await {
        Ok(account) => {
            info!(account = %account, "Resolved AWS account identity");
            account
        }
        Err(e) => {
            warn!(
                error = %e,
                placeholder = ACCOUNT_PLACEHOLDER,
                "Failed to resolve AWS account identity, using placeholder"
            );
            ACCOUNT_PLACEHOLDER.to_string()
        }
    }
}
