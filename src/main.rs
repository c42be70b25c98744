use std::path::{Path, PathBuf};

use hrqa::cli::{Cli, Commands, ConfigAction};
use hrqa::config::{Config, Credentials};
use hrqa::error::{HrqaError, Result};
use hrqa::service::{AppState, Services};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(cli.config, host, port)?;
        }
        Commands::Ingest { file } => {
            cmd_ingest(cli.config, &file)?;
        }
        Commands::Ask { question, json } => {
            cmd_ask(cli.config, &question, json)?;
        }
        Commands::Reset { yes } => {
            cmd_reset(cli.config, yes)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "hrqa=debug,tower_http=debug"
    } else {
        "hrqa=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| HrqaError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })
}

fn cmd_serve(config_path: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting hrqa server...");

    runtime()?.block_on(async {
        let state = AppState::start(&config).await?;
        hrqa::server::serve(state, &config.listen_addr()).await
    })
}

fn cmd_ingest(config_path: Option<PathBuf>, file: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let bytes = std::fs::read(file).map_err(|e| HrqaError::Io {
        source: e,
        context: format!("Failed to read {:?}", file),
    })?;

    let report = runtime()?.block_on(async {
        let services = connect(&config).await?;
        services.ingest_pdf(&bytes).await
    })?;

    println!("✓ Ingested {}", file.display());
    println!("  Chunks:  {}", report.chunks);
    println!("  Batches: {}", report.batches);
    println!("  Time:    {} ms", report.duration_ms);

    Ok(())
}

fn cmd_ask(config_path: Option<PathBuf>, question: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;

    let answer = runtime()?.block_on(async {
        let services = connect(&config).await?;
        services.ask(question).await
    })?;

    if json {
        let out = serde_json::to_string_pretty(&answer).map_err(|e| HrqaError::Json {
            source: e,
            context: "Failed to serialize answer".to_string(),
        })?;
        println!("{}", out);
    } else {
        println!("{}", answer.answer);
    }

    Ok(())
}

fn cmd_reset(config_path: Option<PathBuf>, yes: bool) -> Result<()> {
    let config = load_config(config_path)?;

    if !yes {
        println!(
            "This deletes every chunk in collection '{}'.",
            config.weaviate.collection
        );
        println!("Re-run with --yes to confirm");
        return Ok(());
    }

    runtime()?.block_on(async {
        let services = connect(&config).await?;
        services.reset().await
    })?;

    println!("✓ Collection '{}' reset", config.weaviate.collection);
    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| HrqaError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);

            match Credentials::from_env(&config) {
                Ok(_) => println!("✓ Credentials present"),
                Err(e) => println!("⚠ {}", e),
            }
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| HrqaError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    Config::load_or_default(&path)
}

async fn connect(config: &Config) -> Result<Services> {
    let credentials = Credentials::from_env(config)?;
    Services::connect(config, &credentials).await
}
