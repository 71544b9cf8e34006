use std::path::PathBuf;

pub const CONFIG_ENV: &str = "LEARNASSIST_CONFIG";
pub const BASE_URL_ENV: &str = "LEARNASSIST_BASE_URL";
pub const TOKEN_ENV: &str = "LEARNASSIST_TOKEN";

/// `$LEARNASSIST_CONFIG`, else `<config dir>/learnassist/config.json`, else a file
/// in the working directory.
pub fn default_config_path() -> PathBuf {
    if let Some(p) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(p);
    }

    dirs::config_dir()
        .map(|d| d.join("learnassist").join("config.json"))
        .unwrap_or_else(|| PathBuf::from("learnassist-config.json"))
}

/// Env values win over whatever the config file says.
pub fn apply_env_overrides(cfg: &mut learnassist_core::config::AppConfig) {
    apply_overrides(
        cfg,
        std::env::var(BASE_URL_ENV).ok(),
        std::env::var(TOKEN_ENV).ok(),
    );
}

fn apply_overrides(
    cfg: &mut learnassist_core::config::AppConfig,
    base_url: Option<String>,
    token: Option<String>,
) {
    if let Some(url) = base_url.filter(|s| !s.trim().is_empty()) {
        cfg.gateway.base_url = url.trim().to_string();
    }
    if let Some(token) = token.filter(|s| !s.trim().is_empty()) {
        cfg.gateway.bearer_token = Some(token.trim().to_string());
    }
}
