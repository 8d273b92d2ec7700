use clap::{Arg, Command};
use hostprobe_core::{config::CliConfig, Collector, Config};
use hostprobe_http::MetricsServer;
use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    sync::Arc,
};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("hostprobe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Expose host hardware and OS metrics in Prometheus text format")
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_name("ADDR")
                .help("Address to bind the HTTP server (default: 0.0.0.0)"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("Port for the HTTP server (default: 9105)")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .help("Print metrics once to stdout instead of running the server")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json-config")
                .long("json-config")
                .value_name("PATH")
                .help("Path to JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error); default: info, or RUST_LOG"),
        )
        .get_matches();

    init_logging(
        matches.get_one::<String>("log-level").map(String::as_str),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
    );

    let cli_config = CliConfig {
        bind: matches.get_one::<String>("bind").cloned(),
        port: matches.get_one::<u16>("port").copied(),
    };
    let json_config_path = matches.get_one::<PathBuf>("json-config");
    let once = matches.get_flag("once");

    if let Err(e) = run(&cli_config, json_config_path, once) {
        error!("{:#}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so `--once` output stays a clean document.
fn init_logging(level: Option<&str>, rust_log: Option<String>) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(level, rust_log.as_deref()))
        .with_writer(io::stderr)
        .init();
}

/// `RUST_LOG` is the base; an explicit `--log-level` raises or lowers the
/// workspace crates on top of it. With neither, the workspace logs at info.
fn log_filter(level: Option<&str>, rust_log: Option<&str>) -> EnvFilter {
    let env_filter = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok());

    match (level, env_filter) {
        (None, Some(filter)) => filter,
        (level, filter) => {
            let level = level
                .and_then(|l| l.parse::<Level>().ok())
                .unwrap_or(Level::INFO);

            let mut filter = filter.unwrap_or_default();
            for krate in ["hostprobe", "hostprobe_core", "hostprobe_http"] {
                if let Ok(directive) = format!("{krate}={level}").parse() {
                    filter = filter.add_directive(directive);
                }
            }
            filter
        }
    }
}

fn run(cli_config: &CliConfig, json_config_path: Option<&PathBuf>, once: bool) -> anyhow::Result<()> {
    let config = Config::load(Some(cli_config), json_config_path)?;

    // Host statistics are the one dependency we cannot run without
    let collector = Collector::new(&config)?;
    for (probe, status) in collector.probe_statuses() {
        info!(probe, %status, "probe ready");
    }

    if once {
        let document = collector.collect().render();
        let mut stdout = io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    run_server(config, Arc::new(collector))
}

/// Serve until Ctrl+C or SIGTERM
fn run_server(config: Config, collector: Arc<Collector>) -> anyhow::Result<()> {
    let listen_addr = config.listen_addr()?;
    let server = MetricsServer::new(collector, listen_addr, config.metrics_path.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server.run(shutdown_signal()))?;
    info!("Exporter stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
