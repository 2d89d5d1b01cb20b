use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const APP_DIR_NAME: &str = "tutor-chat";

/// Loads config from `path`, or from `./config.toml` falling back to the
/// per-user config dir. A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    let mut config = AppConfig::default();

    if !config_path.exists() {
        return Ok(config);
    }

    let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path,
        source,
    })?;

    file_config.merge_into(&mut config);
    Ok(config)
}

fn default_config_path() -> PathBuf {
    let local = PathBuf::from(DEFAULT_CONFIG_PATH);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_CONFIG_PATH))
        .unwrap_or(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_defaults_when_file_is_missing() {
        let config = load(Some(Path::new("./missing-config.toml"))).expect("config must load");

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.sync.poll_interval_ms, 5_000);
    }

    #[test]
    fn merges_file_values_over_defaults() {
        let temp_dir = tempfile::tempdir().expect("temp dir should be creatable");
        let config_path = temp_dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"[logging]
level = "debug"

[api]
base_url = "https://tutor.example.test/api"
asset_base_url = "https://files.example.test"
token = "abc"
user_id = 42

[sync]
poll_interval_ms = 2500

[display]
utc_offset_minutes = 180
"#,
        )
        .expect("must write test config");

        let config = load(Some(&config_path)).expect("config must load");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.api.base_url, "https://tutor.example.test/api");
        assert_eq!(
            config.api.asset_base_url.as_deref(),
            Some("https://files.example.test")
        );
        assert_eq!(config.api.token, "abc");
        assert_eq!(config.api.user_id, 42);
        assert_eq!(config.api.request_timeout_ms, 15_000);
        assert_eq!(config.sync.poll_interval_ms, 2_500);
        assert_eq!(config.display.utc_offset_minutes, 180);
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let temp_dir = tempfile::tempdir().expect("temp dir should be creatable");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[sync]\npoll_interval_ms = 0\n").expect("must write test config");

        let config = load(Some(&config_path)).expect("config must load");

        assert_eq!(config.sync.poll_interval_ms, 1);
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let temp_dir = tempfile::tempdir().expect("temp dir should be creatable");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[api]\nuser_id = \"not a number\"\n")
            .expect("must write test config");

        let error = load(Some(&config_path)).expect_err("config must fail to parse");

        assert!(matches!(error, AppError::ConfigParse { ref path, .. } if *path == config_path));
    }
}
