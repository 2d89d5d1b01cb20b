use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Root of the REST API, e.g. `https://tutor.example.com/api`.
    pub base_url: String,
    /// Site root that relative attachment and avatar paths resolve against.
    /// Defaults to the origin of `base_url`.
    pub asset_base_url: Option<String>,
    /// Bearer token of the signed-in user.
    pub token: String,
    /// Id of the signed-in user; decides which messages render as sent.
    pub user_id: i64,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_owned(),
            asset_base_url: None,
            token: String::new(),
            user_id: 0,
            request_timeout_ms: 15_000,
        }
    }
}

impl ApiConfig {
    /// `asset_base_url` when set, else the scheme, host and port of `base_url`.
    pub fn asset_root(&self) -> String {
        if let Some(explicit) = self
            .asset_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
        {
            return explicit.trim_end_matches('/').to_owned();
        }

        reqwest::Url::parse(self.base_url.trim())
            .ok()
            .filter(|url| url.has_host())
            .map(|url| url.origin().ascii_serialization())
            .unwrap_or_else(|| self.base_url.trim().trim_end_matches('/').to_owned())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DisplayConfig {
    /// Offset from UTC used for message times and day separators.
    pub utc_offset_minutes: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str, asset_base_url: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_owned(),
            asset_base_url: asset_base_url.map(str::to_owned),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn asset_root_defaults_to_api_origin() {
        assert_eq!(
            api("https://tutor.example.com/api", None).asset_root(),
            "https://tutor.example.com"
        );
        assert_eq!(
            api("http://localhost:8000/api/", None).asset_root(),
            "http://localhost:8000"
        );
    }

    #[test]
    fn explicit_asset_root_wins() {
        assert_eq!(
            api("https://api.example.com/v1", Some("https://cdn.example.com/")).asset_root(),
            "https://cdn.example.com"
        );
        assert_eq!(
            api("https://api.example.com/v1", Some("  ")).asset_root(),
            "https://api.example.com"
        );
    }
}
