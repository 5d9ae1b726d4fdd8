use anyhow::Context;
pub(crate) use protocol::config::DashboardConfig;
use std::path::Path;

fn validate_config(config: &DashboardConfig) -> anyhow::Result<()> {
    let model = &config.model;
    for (name, value) in [
        ("model.base_url", &model.base_url),
        ("model.model", &model.model),
        ("model.api_key_env", &model.api_key_env),
    ] {
        if value.trim().is_empty() {
            anyhow::bail!("{} must not be empty", name);
        }
    }
    if model.timeout_secs == 0 {
        anyhow::bail!("model.timeout_secs must be greater than zero");
    }
    if !(10..=1000).contains(&config.ui.tick_ms) {
        anyhow::bail!("ui.tick_ms must be between 10 and 1000");
    }
    Ok(())
}

pub(crate) fn load_config(
    path: Option<&Path>,
    model_override: Option<&str>,
) -> anyhow::Result<DashboardConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => DashboardConfig::default(),
    };
    if let Some(model) = model_override {
        config.model.model = model.trim().to_string();
    }
    validate_config(&config)?;
    Ok(config)
}
