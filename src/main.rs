use anyhow::Result;
use std::time::Instant;
use tracing::{error, info, warn};

use ec2_autostop::config::Config;
use ec2_autostop::ec2::Ec2Client;
use ec2_autostop::identity::StsIdentity;
use ec2_autostop::logging;
use ec2_autostop::notify::{Notifier, SlackNotifier};
use ec2_autostop::report::build_report;
use ec2_autostop::sweep::{SweepOptions, run_sweep};
use ec2_autostop::types::ExecutionSummary;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args();
    logging::init(&config.log_format, &config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT"),
        build_date = env!("BUILD_DATE"),
        "EC2 AutoStop sweep starting"
    );

    config.display();
    let start_time = Instant::now();

    let ec2 = Ec2Client::new(config.dry_run).await;
    let identity = StsIdentity::new(ec2.sdk_config());

    let opts = SweepOptions {
        max_concurrent_regions: config.max_concurrent_regions,
        continue_on_stop_failure: config.continue_on_stop_failure,
    };

    let result = match run_sweep(&identity, &ec2, &ec2, opts).await {
        Ok(result) => result,
        Err(e) => {
            // The one failure mode that is not isolated: nothing to report
            error!(
                error = %e,
                total_execution_seconds = start_time.elapsed().as_secs_f64(),
                "Sweep aborted"
            );
            std::process::exit(1);
        }
    };

    let report = build_report(&result);

    let notified = match SlackNotifier::from_config(config.slack_webhook_url.as_deref()) {
        Some(notifier) => notifier.notify(&report).await,
        None => {
            warn!("SLACK_WEBHOOK_URL is not set, sweep report will not be delivered");
            false
        }
    };

    let total_time = start_time.elapsed().as_secs_f64();
    let summary = ExecutionSummary {
        status: "Success".to_string(),
        message: "EC2 instances checked and stopped where necessary, check the report for details."
            .to_string(),
        account: result.account.clone(),
        regions_swept: result.outcomes.len(),
        instances_stopped: result.stopped_count(),
        error_count: result.errors().len(),
        notified,
        total_execution_time_seconds: total_time,
    };

    info!(
        account = %summary.account,
        regions_swept = summary.regions_swept,
        instances_stopped = summary.instances_stopped,
        error_count = summary.error_count,
        notified = summary.notified,
        total_execution_seconds = total_time,
        "Sweep execution completed"
    );

    // Partial failure lives inside the report; the process still exits 0
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
