use clap::Parser;
use console::Term;
use tracing_subscriber::EnvFilter;

use vulnrec::cli::{self, Cli, Commands};
use vulnrec::config::{self, ClientConfig};
use vulnrec::errors::VulnrecError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.with_ansi(!cli.no_color).init();
    }

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
    let spinner = Term::stderr().is_term() && !cli.log_json;

    let result = match cli.command {
        Commands::Validate(args) => cli::validate::handle_validate(args).await,
        command => match resolve_config(cli.config.as_deref(), cli.api_url.as_deref()).await {
            Ok(config) => match command {
                Commands::Upload(args) => cli::upload::handle_upload(args, config, spinner).await,
                Commands::Example(args) => cli::example::handle_example(args, config, spinner).await,
                Commands::Watch(args) => cli::watch::handle_watch(args, config, spinner).await,
                Commands::Validate(_) => Ok(()),
            },
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

/// File and environment, then the `--api-url` flag on top.
async fn resolve_config(
    path: Option<&std::path::Path>,
    api_url: Option<&str>,
) -> Result<ClientConfig, VulnrecError> {
    let mut config = config::load_config(path).await?;
    if let Some(url) = api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
        config::parser::validate_semantics(&config)?;
    }
    Ok(config)
}

fn exit_code(error: &VulnrecError) -> i32 {
    match error {
        VulnrecError::Config(_) | VulnrecError::Yaml(_) => 2,
        VulnrecError::Session { kind: "PollingFailure", .. } => 3,
        VulnrecError::Network(_) | VulnrecError::Timeout(_) => 4,
        VulnrecError::Session { kind: "NetworkError" | "TimeoutError", .. } => 4,
        _ => 1,
    }
}
