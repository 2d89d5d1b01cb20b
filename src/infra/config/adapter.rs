use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::infra::{
    config::{load, AppConfig},
    contracts::ConfigAdapter,
};

/// Environment variable that overrides `api.token`, so the token can stay
/// out of the config file.
pub const TOKEN_ENV_VAR: &str = "TUTOR_CHAT_TOKEN";

#[derive(Debug, Clone, Default)]
pub struct FileConfigAdapter {
    path: Option<PathBuf>,
}

impl FileConfigAdapter {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        let mut config = load(self.path.as_deref())?;
        apply_token_override(&mut config, std::env::var(TOKEN_ENV_VAR).ok());
        Ok(config)
    }
}

fn apply_token_override(config: &mut AppConfig, token: Option<String>) {
    if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
        config.api.token = token.trim().to_owned();
    }
}
