use std::{sync::Arc, time::Duration};

use chrono::{FixedOffset, Offset, Utc};

use crate::{
    domain::{conversation::ConversationRef, display_mapper::DisplayMapper},
    infra::config::AppConfig,
    usecases::contracts::MessageGateway,
};

/// Everything a command needs once startup has finished.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub gateway: Arc<dyn MessageGateway>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    pub fn new(config: AppConfig, gateway: Arc<dyn MessageGateway>) -> Self {
        Self { config, gateway }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.sync.poll_interval_ms.max(1))
    }

    pub fn display_offset(&self) -> FixedOffset {
        let seconds = self.config.display.utc_offset_minutes.saturating_mul(60);

        FixedOffset::east_opt(seconds).unwrap_or_else(|| {
            tracing::warn!(
                utc_offset_minutes = self.config.display.utc_offset_minutes,
                "display offset out of range, using UTC"
            );
            Utc.fix()
        })
    }

    pub fn mapper_for(&self, conversation: &ConversationRef) -> DisplayMapper {
        DisplayMapper::new(
            self.config.api.user_id,
            &self.config.api.asset_root(),
            self.display_offset(),
            conversation.kind(),
        )
    }
}
