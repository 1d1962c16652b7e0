use std::net::TcpListener;
use std::path::PathBuf;

use anyhow::Context;
use settings_sync_host::api::{self, AppState};
use settings_sync_host::config::Config;
use settings_sync_host::hub::EventHub;
use settings_sync_host::settings::SettingsStore;
use settings_sync_protocol::ServerEvent;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line overrides on top of the config file
#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    settings: Option<PathBuf>,
    port: Option<u16>,
}

enum Command {
    Serve(CliArgs),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-v" => return Ok(Command::Version),
            "--config" | "-c" if i + 1 < args.len() => {
                cli.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--settings" | "-s" if i + 1 < args.len() => {
                cli.settings = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--port" | "-p" if i + 1 < args.len() => {
                let port = args[i + 1]
                    .parse()
                    .with_context(|| format!("Invalid port {}", args[i + 1]))?;
                cli.port = Some(port);
                i += 2;
            }
            "serve" => i += 1,
            other => anyhow::bail!("Unknown argument {other} (try --help)"),
        }
    }

    Ok(Command::Serve(cli))
}

fn print_help() {
    println!("settings-sync - live settings pages");
    println!();
    println!("USAGE:");
    println!("    settings-sync [serve] [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config FILE     Config file (default ~/.config/settings-sync/config.toml)");
    println!("    -s, --settings FILE   Settings document served as /settings.json");
    println!("    -p, --port PORT       HTTP port");
    println!("    -h, --help            Print help information");
    println!("    -v, --version         Print version");
}

/// Graceful start: Check if port is available
fn check_port_available(bind: &str, port: u16) -> bool {
    TcpListener::bind(format!("{bind}:{port}")).is_ok()
}

/// Graceful start: Find available port starting from default
fn find_available_port(bind: &str, start: u16) -> Option<u16> {
    (start..start.saturating_add(10)).find(|&port| check_port_available(bind, port))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    eprintln!();
    eprintln!("  \x1b[1;33m[stop]\x1b[0m   Graceful shutdown initiated...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging (tracing)
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args)? {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::Version => {
            println!("settings-sync {VERSION}");
            return Ok(());
        }
        Command::Serve(cli) => cli,
    };

    // === LOAD CONFIGURATION ===
    let mut config = if let Some(path) = &cli.config {
        Config::load_from_path(path)?
    } else {
        Config::create_default_if_missing();
        Config::load()
    };
    if let Some(path) = cli.settings {
        config.settings.path = path;
    }
    if let Some(port) = cli.port {
        config.server.http_port = port;
    }
    eprintln!(
        "  \x1b[1;32m[config]\x1b[0m Settings file {}",
        config.settings.path.display()
    );

    // === GRACEFUL START ===
    let bind = config.server.bind.clone();
    let http_port = if check_port_available(&bind, config.server.http_port) {
        config.server.http_port
    } else {
        eprintln!(
            "  \x1b[1;33m[warn]\x1b[0m   Port {} in use, finding alternative...",
            config.server.http_port
        );
        find_available_port(&bind, config.server.http_port.saturating_add(1)).with_context(|| {
            format!(
                "No available HTTP ports in range {}-{}",
                config.server.http_port,
                config.server.http_port.saturating_add(10)
            )
        })?
    };

    let store = SettingsStore::open(&config.settings.path)
        .await
        .with_context(|| format!("Failed to load {}", config.settings.path.display()))?;
    tracing::info!(count = store.values().len(), "settings loaded");

    let hub = EventHub::new(config.settings.channel_capacity);
    let state = AppState::new(store, hub.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = api::router(state).layer(cors);

    let http_addr = format!("{bind}:{http_port}");
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("Failed to bind {http_addr}"))?;

    eprintln!("  \x1b[1;32m[http]\x1b[0m   Listening on \x1b[4;96mhttp://{http_addr}\x1b[0m");
    eprintln!("  \x1b[2mPress Ctrl+C to stop\x1b[0m");
    eprintln!();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Let open pages know before their streams drop
            hub.publish(ServerEvent::info("Server stopping"));
            hub.shut_down();
        })
        .await?;

    eprintln!("  \x1b[1;32m[done]\x1b[0m   Stopped.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("settings-sync")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let Command::Serve(cli) = parse_args(&args(&["serve", "-s", "device.json", "--port", "9000"]))
            .expect("valid args")
        else {
            panic!("expected serve");
        };
        assert_eq!(cli.settings, Some(PathBuf::from("device.json")));
        assert_eq!(cli.port, Some(9000));
        assert!(cli.config.is_none());

        assert!(matches!(parse_args(&args(&["--version"])), Ok(Command::Version)));
        assert!(parse_args(&args(&["--port", "http"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
    }
}
