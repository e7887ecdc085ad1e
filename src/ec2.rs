//! AWS EC2 adapter: region directory and per-region compute operations.

mod instances;

use aws_config::BehaviorVersion;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::provider::RegionDirectory;

/// EC2 adapter holding the shared SDK config.
///
/// `DescribeRegions` goes through the default-region client; instance
/// listing and stop calls build a client bound to the target region, the
/// way the sweep visits one region at a time.
pub struct Ec2Client {
    config: aws_config::SdkConfig,
    client: aws_sdk_ec2::Client,
    dry_run: bool,
}

impl Ec2Client {
    pub async fn new(dry_run: bool) -> Self {
        debug!("Initializing AWS SDK configuration");

        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let client = aws_sdk_ec2::Client::new(&config);

        let region_name = config.region().map(|r| r.as_ref()).unwrap_or("unknown");
        info!(
            default_region = %region_name,
            dry_run = dry_run,
            "AWS EC2 client initialized"
        );

        Self {
            config,
            client,
            dry_run,
        }
    }

    /// Shared SDK config, for collaborators riding the same credential chain.
    pub const fn sdk_config(&self) -> &aws_config::SdkConfig {
        &self.config
    }

    /// Build an EC2 client bound to a specific region, reusing the shared
    /// credentials chain.
    fn regional_client(&self, region: &str) -> aws_sdk_ec2::Client {
        let conf = aws_sdk_ec2::config::Builder::from(&self.config)
            .region(aws_config::Region::new(region.to_string()))
            .build();
        aws_sdk_ec2::Client::from_conf(conf)
    }
}

impl RegionDirectory for Ec2Client {
    async fn describe_regions(&self) -> Result<Vec<String>, ProviderError> {
        debug!("Sending DescribeRegions API request");

        let response = self
            .client
            .describe_regions()
            .send()
            .await
            .map_err(|e| ProviderError::aws("ec2::regions", e))?;

        let regions: Vec<String> = response
            .regions()
            .iter()
            .filter_map(|r| r.region_name())
            .map(String::from)
            .collect();

        info!(region_count = regions.len(), "Enumerated account regions");
        Ok(regions)
    }
}
