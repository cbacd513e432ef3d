use anyhow::{bail, Result};

use autoscroll_core::AppConfig;

pub fn show(config: &AppConfig) -> Result<()> {
    println!("# {}", AppConfig::config_path().display());
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    let path = AppConfig::config_path();

    if path.exists() && !force {
        bail!(
            "{} already exists.\nUse --force to overwrite it with the defaults.",
            path.display()
        );
    }

    AppConfig::default().save()?;
    println!("Wrote default configuration to {}", path.display());

    Ok(())
}
