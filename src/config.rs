use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ec2-autostop",
    version,
    about = "Scheduled multi-region EC2 stop sweep with AutoStop tag opt-out"
)]
pub struct Config {
    /// Maximum number of regions swept in parallel (1 = sequential)
    #[arg(long, env = "MAX_CONCURRENT_REGIONS", default_value = "1")]
    pub max_concurrent_regions: usize,

    /// Keep stopping sibling instances in a region after one stop failure
    #[arg(long, env = "CONTINUE_ON_STOP_FAILURE", default_value = "false")]
    pub continue_on_stop_failure: bool,

    /// Dry run mode (no actual stop requests)
    #[arg(long, env = "DRY_RUN", default_value = "false")]
    pub dry_run: bool,

    /// Slack incoming webhook URL for the sweep report
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    pub slack_webhook_url: Option<String>,

    /// Log format: json or pretty
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn display(&self) {
        let webhook_info = if self.slack_webhook_url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            "configured"
        } else {
            "NOT SET (report will not be delivered)"
        };

        tracing::info!(
            max_concurrent_regions = self.max_concurrent_regions,
            continue_on_stop_failure = self.continue_on_stop_failure,
            dry_run = self.dry_run,
            slack_webhook = webhook_info,
            log_format = %self.log_format,
            log_level = %self.log_level,
            "Configuration initialized"
        );

        if self.dry_run {
            tracing::warn!("DRY RUN MODE ENABLED - No instances will be stopped, only logged");
        }
    }
}
