use anyhow::Result;

use snapscroll_core::AppConfig;

pub fn run(config: &AppConfig, write: bool) -> Result<()> {
    if write {
        let path = AppConfig::config_path();
        if path.exists() {
            println!("Config already exists at {}, leaving it untouched", path.display());
            return Ok(());
        }
        AppConfig::default().save()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
