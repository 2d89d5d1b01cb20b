use serde::Deserialize;

use crate::infra::config::{ApiConfig, AppConfig, DisplayConfig, LogConfig, SyncConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub api: Option<FileApiConfig>,
    pub sync: Option<FileSyncConfig>,
    pub display: Option<FileDisplayConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(api) = self.api {
            api.merge_into(&mut config.api);
        }

        if let Some(sync) = self.sync {
            sync.merge_into(&mut config.sync);
        }

        if let Some(display) = self.display {
            display.merge_into(&mut config.display);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileApiConfig {
    pub base_url: Option<String>,
    pub asset_base_url: Option<String>,
    pub token: Option<String>,
    pub user_id: Option<i64>,
    pub request_timeout_ms: Option<u64>,
}

impl FileApiConfig {
    fn merge_into(self, config: &mut ApiConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(asset_base_url) = self.asset_base_url {
            config.asset_base_url = Some(asset_base_url);
        }

        if let Some(token) = self.token {
            config.token = token;
        }

        if let Some(user_id) = self.user_id {
            config.user_id = user_id;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSyncConfig {
    pub poll_interval_ms: Option<u64>,
}

impl FileSyncConfig {
    fn merge_into(self, config: &mut SyncConfig) {
        if let Some(interval_ms) = self.poll_interval_ms {
            // A zero period would make the poll timer panic.
            config.poll_interval_ms = interval_ms.max(1);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDisplayConfig {
    pub utc_offset_minutes: Option<i32>,
}

impl FileDisplayConfig {
    fn merge_into(self, config: &mut DisplayConfig) {
        if let Some(offset) = self.utc_offset_minutes {
            config.utc_offset_minutes = offset;
        }
    }
}
