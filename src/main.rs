use clap::Parser;
use delivery_audit::core::date_chunker::parse_timestamp;
use delivery_audit::core::{Presenter, Selector};
use delivery_audit::utils::error::ErrorSeverity;
use delivery_audit::utils::{logger, validation::Validate};
use delivery_audit::{
    adapters::report::export_report, AuditConfig, AuditEngine, AuditError, CliConfig,
    ConsolePresenter, ConsoleSelector, FixedSelector, LocalStorage, SyrveClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_log {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli);

    if let Err(e) = execute(cli).await {
        let exit_code = report_failure(&e);
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
    Ok(())
}

async fn execute(cli: CliConfig) -> delivery_audit::Result<()> {
    let config = cli.resolve()?;
    config.validate()?;
    let client = SyrveClient::new(&config)?;

    if config.organizations.is_empty() {
        run(&config, client, ConsoleSelector::stdio()).await
    } else {
        run(&config, client, FixedSelector::new(config.organizations.clone())).await
    }
}

async fn run<S: Selector>(
    config: &AuditConfig,
    client: SyrveClient,
    selector: S,
) -> delivery_audit::Result<()> {
    let start = parse_timestamp(&config.from)?;
    let end = parse_timestamp(&config.to)?;
    // the console selector holds the stdin lock until the engine is dropped
    let outcome = {
        let engine = AuditEngine::new(client, selector).with_policy(config.window_error_policy()?);
        engine.run(config.login()?, start, end).await?
    };

    let presenter = ConsolePresenter::stdio();
    presenter.report(&outcome.summary, &config.from, &config.to, &outcome.organizations)?;

    if let Some(dir) = &config.output_path {
        let storage = LocalStorage::new(dir.clone());
        let files = export_report(&storage, &outcome.summary, &outcome.orders).await?;
        tracing::info!("Report written to {}: {}", dir, files.join(", "));
    }

    if config.show_details {
        presenter.details(&outcome.orders)?;
    }
    Ok(())
}

/// Logs the error and returns the process exit code for its severity.
fn report_failure(e: &AuditError) -> i32 {
    tracing::error!(
        "Audit failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0, // 警告，但成功
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    exit_code
}
