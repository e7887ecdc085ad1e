//! The sweep orchestrator: per-region sweeping and account-wide aggregation.
//!
//! Failure isolation boundaries:
//! - a region's listing failure is contained in its `RegionOutcome`;
//! - a stop failure becomes the region-level error and, by default,
//!   short-circuits the remaining instances of that region;
//! - only region enumeration failure aborts the run.

use futures::StreamExt;
use tracing::{error, info, warn};

use crate::error::SweepError;
use crate::identity::resolve_identity;
use crate::policy;
use crate::provider::{ComputeProvider, IdentityProvider, RegionDirectory};
use crate::types::{RegionOutcome, SweepEvent, SweepResult};

/// Knobs for the aggregation loop.
#[derive(Debug, Clone, Copy)]
pub struct SweepOptions {
    /// Upper bound on regions swept in parallel. 1 = sequential.
    pub max_concurrent_regions: usize,
    /// Keep stopping sibling instances after one stop failure in a region.
    /// Off by default: the first failure in a region short-circuits the
    /// remaining instances of that region.
    pub continue_on_stop_failure: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            max_concurrent_regions: 1,
            continue_on_stop_failure: false,
        }
    }
}

/// Sweep one region: list running instances, apply the exclusion policy,
/// stop what is not excluded.
///
/// Never returns an error; failures are recorded in the outcome. Instance
/// processing is strictly sequential because the short-circuit policy is
/// order-dependent.
pub async fn sweep_region(
    compute: &impl ComputeProvider,
    region: &str,
    opts: SweepOptions,
) -> RegionOutcome {
    let instances = match compute.list_running_instances(region).await {
        Ok(instances) => instances,
        Err(e) => {
            error!(
                region = %region,
                error = %e,
                "Failed to list running instances, skipping region"
            );
            return RegionOutcome {
                region: region.to_string(),
                events: Vec::new(),
                error: Some(format!("Error processing region {}: {}", region, e)),
            };
        }
    };

    info!(
        region = %region,
        running_count = instances.len(),
        "Sweeping region"
    );

    let mut events = Vec::new();
    let mut region_error: Option<String> = None;

    for instance in &instances {
        let decision = policy::evaluate(&instance.tags);
        if decision.excluded {
            info!(
                instance_id = %instance.id,
                region = %region,
                rule = ?decision.rule,
                "Skipping instance due to exclusion tag"
            );
            events.push(SweepEvent::SkippedExcluded {
                region: region.to_string(),
                instance_id: instance.id.clone(),
            });
            continue;
        }

        info!(
            instance_id = %instance.id,
            region = %region,
            "Stopping instance"
        );
        events.push(SweepEvent::Stopping {
            region: region.to_string(),
            instance_id: instance.id.clone(),
        });

        match compute.stop_instance(region, &instance.id).await {
            Ok(()) => {
                info!(
                    instance_id = %instance.id,
                    region = %region,
                    "Stopped instance"
                );
                events.push(SweepEvent::Stopped {
                    region: region.to_string(),
                    instance_id: instance.id.clone(),
                });
            }
            Err(e) => {
                let message = format!("Error processing region {}: {}", region, e);
                error!(
                    instance_id = %instance.id,
                    region = %region,
                    error = %e,
                    "Failed to stop instance"
                );
                if region_error.is_none() {
                    region_error = Some(message);
                } else {
                    // Only the first failure becomes the region error
                    warn!(
                        instance_id = %instance.id,
                        region = %region,
                        "Additional stop failure in region, not recorded in outcome"
                    );
                }
                if !opts.continue_on_stop_failure {
                    break;
                }
            }
        }
    }

    RegionOutcome {
        region: region.to_string(),
        events,
        error: region_error,
    }
}

/// Run the region sweeper over every region, preserving enumeration order
/// in the output regardless of completion order. Never fails itself.
pub async fn aggregate(
    compute: &impl ComputeProvider,
    regions: Vec<String>,
    opts: SweepOptions,
) -> Vec<RegionOutcome> {
    let concurrency = opts.max_concurrent_regions.max(1);

    // buffered() yields results in input order even when sweeps overlap
    futures::stream::iter(regions)
        .map(|region| async move { sweep_region(compute, &region, opts).await })
        .buffered(concurrency)
        .collect()
        .await
}

/// The full account-wide sweep: identity, region enumeration, aggregation.
///
/// Only enumeration failure propagates; see [`SweepError`].
pub async fn run_sweep(
    identity: &impl IdentityProvider,
    directory: &impl RegionDirectory,
    compute: &impl ComputeProvider,
    opts: SweepOptions,
) -> Result<SweepResult, SweepError> {
    let account = resolve_identity(identity).await;

    let regions = directory
        .describe_regions()
        .await
        .map_err(SweepError::FatalEnumeration)?;

    let outcomes = aggregate(compute, regions, opts).await;

    let result = SweepResult { account, outcomes };
    info!(
        account = %result.account,
        regions_swept = result.outcomes.len(),
        instances_stopped = result.stopped_count(),
        error_count = result.errors().len(),
        "Sweep complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;
    use crate::error::ProviderError;
    use crate::types::Instance;

    /// In-memory compute provider: fixed instance listings per region, a
    /// set of instance ids whose stop call fails, and a record of stops.
    struct FakeCompute {
        listings: HashMap<String, Result<Vec<Instance>, ProviderError>>,
        failing_stops: HashSet<String>,
        stopped: Mutex<Vec<String>>,
    }

    impl FakeCompute {
        fn new() -> Self {
            Self {
                listings: HashMap::new(),
                failing_stops: HashSet::new(),
                stopped: Mutex::new(Vec::new()),
            }
        }

        fn with_region(mut self, region: &str, instances: Vec<Instance>) -> Self {
            self.listings.insert(region.to_string(), Ok(instances));
            self
        }

        fn with_failing_region(mut self, region: &str, message: &str) -> Self {
            self.listings.insert(
                region.to_string(),
                Err(ProviderError::new("ec2::describe", message)),
            );
            self
        }

        fn with_failing_stop(mut self, instance_id: &str) -> Self {
            self.failing_stops.insert(instance_id.to_string());
            self
        }

        fn stopped_ids(&self) -> Vec<String> {
            self.stopped.lock().expect("poisoned mutex").clone()
        }
    }

    impl ComputeProvider for FakeCompute {
        async fn list_running_instances(
            &self,
            region: &str,
        ) -> Result<Vec<Instance>, ProviderError> {
            match self.listings.get(region) {
                Some(result) => result.clone(),
                None => Ok(Vec::new()),
            }
        }

        async fn stop_instance(
            &self,
            _region: &str,
            instance_id: &str,
        ) -> Result<(), ProviderError> {
            if self.failing_stops.contains(instance_id) {
                return Err(ProviderError::new("ec2::stop", "stop request rejected"));
            }
            self.stopped
                .lock()
                .expect("poisoned mutex")
                .push(instance_id.to_string());
            Ok(())
        }
    }

    fn instance(id: &str, tags: &[(&str, &str)]) -> Instance {
        Instance {
            id: id.to_string(),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_listing_failure_yields_zero_events_one_error() {
        let compute = FakeCompute::new().with_failing_region("ap-south-1", "throttled");
        let outcome = sweep_region(&compute, "ap-south-1", SweepOptions::default()).await;

        assert!(outcome.events.is_empty());
        assert!(outcome.error.is_some());
        assert!(compute.stopped_ids().is_empty());
    }

    #[tokio::test]
    async fn test_excluded_instance_is_skipped_not_stopped() {
        let compute = FakeCompute::new().with_region(
            "us-east-1",
            vec![
                instance("i-1", &[("AutoStop", "no")]),
                instance("i-2", &[]),
            ],
        );
        let outcome = sweep_region(&compute, "us-east-1", SweepOptions::default()).await;

        assert_eq!(
            outcome.events,
            vec![
                SweepEvent::SkippedExcluded {
                    region: "us-east-1".to_string(),
                    instance_id: "i-1".to_string(),
                },
                SweepEvent::Stopping {
                    region: "us-east-1".to_string(),
                    instance_id: "i-2".to_string(),
                },
                SweepEvent::Stopped {
                    region: "us-east-1".to_string(),
                    instance_id: "i-2".to_string(),
                },
            ]
        );
        assert!(outcome.error.is_none());
        assert_eq!(compute.stopped_ids(), vec!["i-2".to_string()]);
    }

    #[tokio::test]
    async fn test_stop_failure_short_circuits_remaining_instances() {
        let compute = FakeCompute::new()
            .with_region(
                "us-east-1",
                vec![
                    instance("i-1", &[]),
                    instance("i-2", &[]),
                    instance("i-3", &[]),
                ],
            )
            .with_failing_stop("i-2");
        let outcome = sweep_region(&compute, "us-east-1", SweepOptions::default()).await;

        // i-1 stopped, i-2 left at Stopping, i-3 never visited
        assert_eq!(outcome.stopped_count(), 1);
        assert_eq!(outcome.events.len(), 3);
        assert_eq!(outcome.events.last().map(SweepEvent::instance_id), Some("i-2"));
        assert!(outcome.error.as_deref().is_some_and(|e| e.contains("us-east-1")));
        assert_eq!(compute.stopped_ids(), vec!["i-1".to_string()]);
    }

    #[tokio::test]
    async fn test_stop_failure_continues_when_configured() {
        let opts = SweepOptions {
            continue_on_stop_failure: true,
            ..SweepOptions::default()
        };
        let compute = FakeCompute::new()
            .with_region(
                "us-east-1",
                vec![
                    instance("i-1", &[]),
                    instance("i-2", &[]),
                    instance("i-3", &[]),
                ],
            )
            .with_failing_stop("i-1");
        let outcome = sweep_region(&compute, "us-east-1", opts).await;

        assert_eq!(outcome.stopped_count(), 2);
        assert!(outcome.error.is_some());
        assert_eq!(
            compute.stopped_ids(),
            vec!["i-2".to_string(), "i-3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_aggregate_preserves_region_order() {
        let compute = FakeCompute::new()
            .with_region("us-east-1", vec![instance("i-1", &[])])
            .with_failing_region("ap-south-1", "throttled")
            .with_region("eu-west-1", vec![instance("i-2", &[])]);

        let regions = vec![
            "us-east-1".to_string(),
            "ap-south-1".to_string(),
            "eu-west-1".to_string(),
        ];
        let opts = SweepOptions {
            max_concurrent_regions: 3,
            ..SweepOptions::default()
        };
        let outcomes = aggregate(&compute, regions, opts).await;

        let order: Vec<&str> = outcomes.iter().map(|o| o.region.as_str()).collect();
        assert_eq!(order, vec!["us-east-1", "ap-south-1", "eu-west-1"]);
    }

    #[tokio::test]
    async fn test_aggregate_result_independent_of_concurrency() {
        let build = || {
            FakeCompute::new()
                .with_region(
                    "us-east-1",
                    vec![instance("i-1", &[("AutoStop", "no")]), instance("i-2", &[])],
                )
                .with_region("eu-west-1", vec![instance("i-3", &[])])
                .with_failing_region("ap-south-1", "throttled")
        };
        let regions = vec![
            "us-east-1".to_string(),
            "eu-west-1".to_string(),
            "ap-south-1".to_string(),
        ];

        let sequential = aggregate(&build(), regions.clone(), SweepOptions::default()).await;
        let concurrent = aggregate(
            &build(),
            regions,
            SweepOptions {
                max_concurrent_regions: 8,
                ..SweepOptions::default()
            },
        )
        .await;

        assert_eq!(sequential, concurrent);
    }

    struct FixedDirectory(Result<Vec<String>, ProviderError>);

    impl RegionDirectory for FixedDirectory {
        async fn describe_regions(&self) -> Result<Vec<String>, ProviderError> {
            self.0.clone()
        }
    }

    struct FixedIdentity(Result<String, ProviderError>);

    impl IdentityProvider for FixedIdentity {
        async fn get_account_id(&self) -> Result<String, ProviderError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_run_sweep_enumeration_failure_is_fatal() {
        let identity = FixedIdentity(Ok("123456789012".to_string()));
        let directory = FixedDirectory(Err(ProviderError::new("ec2::regions", "denied")));
        let compute = FakeCompute::new();

        let err = run_sweep(&identity, &directory, &compute, SweepOptions::default())
            .await
            .expect_err("enumeration failure should abort the run");
        assert!(matches!(err, SweepError::FatalEnumeration(_)));
    }

    #[tokio::test]
    async fn test_run_sweep_identity_failure_degrades_to_placeholder() {
        let identity = FixedIdentity(Err(ProviderError::new("sts::identity", "denied")));
        let directory = FixedDirectory(Ok(vec!["us-east-1".to_string()]));
        let compute = FakeCompute::new().with_region("us-east-1", vec![instance("i-1", &[])]);

        let result = run_sweep(&identity, &directory, &compute, SweepOptions::default())
            .await
            .expect("sweep should run despite identity failure");
        assert_eq!(result.account, crate::identity::ACCOUNT_PLACEHOLDER);
        assert_eq!(result.stopped_count(), 1);
    }

    #[tokio::test]
    async fn test_run_sweep_success_count_is_recomputed_sum() {
        let identity = FixedIdentity(Ok("123456789012".to_string()));
        let directory = FixedDirectory(Ok(vec![
            "us-east-1".to_string(),
            "eu-west-1".to_string(),
        ]));
        let compute = FakeCompute::new()
            .with_region(
                "us-east-1",
                vec![instance("i-1", &[("AutoStop", "NO")]), instance("i-2", &[])],
            )
            .with_region("eu-west-1", vec![instance("i-3", &[]), instance("i-4", &[])]);

        let result = run_sweep(&identity, &directory, &compute, SweepOptions::default())
            .await
            .expect("sweep should pass");

        let per_region_sum: usize = result
            .outcomes
            .iter()
            .map(RegionOutcome::stopped_count)
            .sum();
        assert_eq!(result.stopped_count(), per_region_sum);
        assert_eq!(result.stopped_count(), 3);
        assert!(result.errors().is_empty());
    }
}
