use console::style;

use crate::cli::commands::ValidateArgs;
use crate::config::parse_config;
use crate::errors::VulnrecError;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), VulnrecError> {
    let config = parse_config(&args.config).await?;
    println!("{} Configuration is valid: {}", style("✓").green(), args.config.display());
    println!("  api.base_url          {}", config.api.base_url);
    println!("  polling.interval_secs {}", config.polling.interval_secs);
    println!("  pagination.limit      {}", config.pagination.limit);
    println!("  retry.max_retries     {}", config.retry.max_retries);
    Ok(())
}
