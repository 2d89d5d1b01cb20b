use std::{path::Path, sync::Arc};

use crate::{
    api::RestGateway,
    infra::{self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError},
    usecases::context::AppContext,
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let context = build_context(config_path)?;
    infra::logging::init(&context.config.logging)?;

    if context.config.api.token.is_empty() {
        tracing::warn!("api.token is empty; requests will be sent unauthenticated");
    }

    Ok(context)
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config_adapter = FileConfigAdapter::new(config_path);
    let config = config_adapter
        .load()
        .map_err(|error| error.downcast::<AppError>().unwrap_or_else(AppError::Other))?;
    let gateway = RestGateway::new(&config.api)?;

    Ok(AppContext::new(config, Arc::new(gateway)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_context_with_default_config_when_file_is_missing() {
        let context = build_context(Some(Path::new("./missing-config.toml")))
            .expect("context should build from defaults");

        assert_eq!(
            context.config.sync,
            crate::infra::config::AppConfig::default().sync
        );
    }

    #[test]
    fn config_parse_error_keeps_its_kind() {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sync\n").expect("must write config");

        let error = build_context(Some(&path)).expect_err("startup must fail");

        assert!(matches!(error, AppError::ConfigParse { .. }));
    }

    #[test]
    fn invalid_base_url_fails_startup() {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"ftp://nope\"\n").expect("must write config");

        let error = build_context(Some(&path)).expect_err("startup must fail");

        assert!(matches!(error, AppError::InvalidBaseUrl { .. }));
    }
}
