//! List strategies command.

use anyhow::Result;
use bt_strategies::StrategyRegistry;

pub async fn run() -> Result<()> {
    let registry = StrategyRegistry::new();

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ({})", info.name, info.key);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        let defaults: Vec<String> = info
            .default_params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        println!("  Defaults: {}", defaults.join(", "));
        println!();
    }

    println!("Use --strategy <key> to select a strategy and -p key=value to override parameters.");

    Ok(())
}
