//! Validate configuration command.

use anyhow::Result;
use bt_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    let backtest = config.backtest.to_config();
    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Initial capital: {}", config.backtest.default_capital);
    println!("Fee: {}%", config.backtest.fee_pct);
    println!("Slippage: {}%", config.backtest.slippage_pct);
    println!("Position mode: {}", backtest.position_mode);
    println!("Allocation per entry: {}%", backtest.allocation_pct());
    println!("Max entries: {}", backtest.max_entries());
    println!("Walk-forward split: {}", backtest.walk_forward_split);
    println!(
        "Monte Carlo: {} simulations at {} confidence",
        config.monte_carlo.simulations, config.monte_carlo.confidence_level
    );

    Ok(())
}
