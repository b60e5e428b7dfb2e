use anyhow::{Context, Result};
use clap::Parser;

use toolbelt::cli::{Cli, Commands};
use toolbelt::config::{StaticConfig, get_config, init_config_from};
use toolbelt::errors::ToolbeltError;
use toolbelt::runtime::modes::run_server;
use toolbelt::system::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Commands::GenConfig { output }) = &cli.command {
        let sample = StaticConfig::generate_sample_config();
        match output {
            Some(path) => {
                std::fs::write(path, sample)
                    .with_context(|| format!("Failed to write sample config to {}", path))?;
                println!("Sample configuration written to {}", path);
            }
            None => print!("{}", sample),
        }
        return Ok(());
    }

    init_config_from(&cli.config);
    let config = get_config();

    // guard 需要活到进程结束，否则缓冲的日志会丢失
    let log_guard = init_logging(&config)?;

    if let Err(e) = run_server(&config).await {
        match e.downcast_ref::<ToolbeltError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("Server error: {:#}", e),
        }
        drop(log_guard);
        std::process::exit(1);
    }

    drop(log_guard);
    Ok(())
}
