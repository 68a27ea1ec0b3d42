use anyhow::bail;

use snowtask_core::{Config, Paths};

/// Write a default config file for hand-editing.
pub async fn init(force: bool) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config_path = paths.config_file();

    if config_path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        );
    }

    paths.ensure_dirs()?;
    Config::default().save(&config_path)?;

    println!("Wrote {}", config_path.display());
    println!("Edit it to set your task-list URL and username.");
    Ok(())
}

/// Print the current configuration and where it came from.
pub async fn show() -> anyhow::Result<()> {
    let paths = Paths::new();
    let config_path = paths.config_file();
    let config = Config::load_or_default(&paths)?;

    println!(
        "Config: {} {}",
        config_path.display(),
        if config_path.exists() { "" } else { "(not found, showing defaults)" }
    );
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
