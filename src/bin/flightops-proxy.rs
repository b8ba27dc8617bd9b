use anyhow::Result;
use clap::Parser;
use flightops_proxy::credentials::store::{mask, Credentials};
use flightops_proxy::proxy::service::ProxyService;
use flightops_proxy::refresh::scheduler::RefreshScheduler;
use flightops_proxy::server;
use flightops_proxy::utils::config_loader;
use flightops_proxy::utils::logging;
use flightops_proxy::utils::logging::LogLevel;
use std::path::Path;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "flightops-proxy.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Make preparations
    //
    // read .env, parse args
    // -------------------------------

    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config, init logging
    // -------------------------------

    let service_config = config_loader::run(&args.config)?;
    logging::run(&service_config.settings.logging, args.log_level);
    if !Path::new(&args.config).exists() {
        warn!("config file '{}' not found, using defaults", args.config);
    }

    // -------------------------------
    // 3. Credentials from environment
    // -------------------------------

    let initial = Credentials::new(
        std::env::var("APP_ID").unwrap_or_default(),
        std::env::var("APP_KEY").unwrap_or_default(),
    );
    info!(
        "credentials from environment: app_id = {}, app_key = {}",
        mask(&initial.app_id),
        if initial.app_key.is_empty() { "missing" } else { "present" }
    );

    // -------------------------------
    // 4. Build proxy core
    // -------------------------------

    let service = ProxyService::new(service_config.upstream.clone(), initial)?;

    match service.check_stored_credentials().await {
        Some(true) => info!("environment credentials accepted by upstream"),
        Some(false) => warn!("environment credentials rejected by upstream, waiting for new ones on /keys"),
        None => info!("no credentials configured yet, open /keys"),
    }

    // -------------------------------
    // 5. Background refresh
    // -------------------------------

    let scheduler = RefreshScheduler::new(service.refresh_cycle(), service_config.refresh.period());
    let refresher = tokio::spawn(scheduler.run());

    // -------------------------------
    // 6. Http server
    // -------------------------------

    let http_server = server::server::start(&service_config.settings, service);

    info!("Service starting...");
    tokio::select! {
        res = http_server => res?,
        res = refresher => res??,
    }

    Ok(())
}
