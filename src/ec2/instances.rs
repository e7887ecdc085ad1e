use std::collections::HashMap;

use aws_sdk_ec2::types::{Filter, Tag};
use tracing::{debug, info, warn};

use super::Ec2Client;
use crate::error::ProviderError;
use crate::provider::ComputeProvider;
use crate::types::Instance;

const STATE_RUNNING: &str = "running";

impl ComputeProvider for Ec2Client {
    async fn list_running_instances(&self, region: &str) -> Result<Vec<Instance>, ProviderError> {
        debug!(
            region = %region,
            state_filter = STATE_RUNNING,
            "Sending DescribeInstances API request"
        );

        // TODO: paginate DescribeInstances for regions with >1000 running instances
        let response = self
            .regional_client(region)
            .describe_instances()
            .filters(
                Filter::builder()
                    .name("instance-state-name")
                    .values(STATE_RUNNING)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| ProviderError::aws("ec2::describe", e))?;

        let mut instances = Vec::new();
        for reservation in response.reservations() {
            for instance in reservation.instances() {
                if let Some(instance_id) = instance.instance_id() {
                    instances.push(Instance {
                        id: instance_id.to_string(),
                        tags: tag_map(instance.tags()),
                    });
                }
            }
        }

        debug!(
            region = %region,
            running_count = instances.len(),
            "Listed running instances"
        );

        Ok(instances)
    }

    async fn stop_instance(&self, region: &str, instance_id: &str) -> Result<(), ProviderError> {
        if self.dry_run {
            warn!(
                instance_id = %instance_id,
                region = %region,
                action = "stop",
                "DRY RUN: Would stop instance (no action taken)"
            );
            return Ok(());
        }

        info!(
            instance_id = %instance_id,
            region = %region,
            api_action = "StopInstances",
            "Sending stop request to AWS EC2 API"
        );

        self.regional_client(region)
            .stop_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| ProviderError::aws("ec2::stop", e))?;

        Ok(())
    }
}

/// Convert the EC2 tag list to a key/value map. Tags without a key or
/// value are dropped; EC2 tag keys are unique per instance.
pub(super) fn tag_map(tags: &[Tag]) -> HashMap<String, String> {
    tags.iter()
        .filter_map(|tag| match (tag.key(), tag.value()) {
            (Some(key), Some(value)) => Some((key.to_string(), value.to_string())),
            _ => None,
        })
        .collect()
}
