//! Collaborator seams for the sweep orchestrator.
//!
//! Each cloud interaction sits behind a trait so tests can substitute
//! in-memory fakes. The AWS implementations live in `ec2` and `identity`.

use crate::error::ProviderError;
use crate::types::Instance;

/// Resolves the account identifier for the report header.
pub trait IdentityProvider {
    async fn get_account_id(&self) -> Result<String, ProviderError>;
}

/// Lists the regions available to the account, in provider order.
pub trait RegionDirectory {
    async fn describe_regions(&self) -> Result<Vec<String>, ProviderError>;
}

/// Per-region compute operations used by the region sweeper.
pub trait ComputeProvider {
    /// Instances in the `running` state, in the order the provider returns them.
    async fn list_running_instances(&self, region: &str) -> Result<Vec<Instance>, ProviderError>;

    async fn stop_instance(&self, region: &str, instance_id: &str) -> Result<(), ProviderError>;
}
