use crate::config::toml_config::TomlConfig;
use crate::config::AuditConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "delivery-audit")]
#[command(about = "Audit closed delivery orders: phone validity, duplicates and zero sums")]
pub struct CliConfig {
    /// API login used to obtain an access token
    #[arg(long)]
    pub login: Option<String>,

    /// Range start, 'YYYY-MM-DD HH:MM:SS.mmm'
    #[arg(long = "from")]
    pub from: String,

    /// Range end, 'YYYY-MM-DD HH:MM:SS.mmm' (clamped to now)
    #[arg(long = "to")]
    pub to: String,

    #[arg(long)]
    pub token_url: Option<String>,

    #[arg(long)]
    pub orgs_url: Option<String>,

    #[arg(long)]
    pub deliv_url: Option<String>,

    /// Organization id to audit; repeat to select several and skip the prompt
    #[arg(long = "org")]
    pub organizations: Vec<String>,

    /// Order status filter; repeat for several (default: Closed)
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// What to do when one day-window fails: skip, abort or retry
    #[arg(long)]
    pub on_window_error: Option<String>,

    #[arg(long)]
    pub retry_attempts: Option<u32>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for summary.json and orders.csv
    #[arg(short, long)]
    pub output: Option<String>,

    /// Do not offer the per-order detail view
    #[arg(long)]
    pub no_details: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_log: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 載入 TOML（若有指定）後再套用命令列參數
    pub fn resolve(&self) -> Result<AuditConfig> {
        let mut config = AuditConfig::new(&self.from, &self.to);

        if let Some(path) = &self.config {
            tracing::info!("Loading configuration from: {}", path);
            config.merge_toml(&TomlConfig::from_file(path)?);
        }

        if let Some(login) = &self.login {
            config.login = Some(login.clone());
        }
        if let Some(url) = &self.token_url {
            config.token_url = url.clone();
        }
        if let Some(url) = &self.orgs_url {
            config.organizations_url = url.clone();
        }
        if let Some(url) = &self.deliv_url {
            config.deliveries_url = url.clone();
        }
        if !self.organizations.is_empty() {
            config.organizations = self.organizations.clone();
        }
        if !self.statuses.is_empty() {
            config.statuses = self.statuses.clone();
        }
        if let Some(policy) = &self.on_window_error {
            config.on_window_error = policy.clone();
        }
        if let Some(attempts) = self.retry_attempts {
            config.retry_attempts = attempts;
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.clone());
        }
        if self.no_details {
            config.show_details = false;
        }

        Ok(config)
    }
}
