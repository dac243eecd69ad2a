use std::time::Duration;

use caffy_core::config::{BackendConfig, BackendMode};

/// Where [`BackendClient`](crate::BackendClient) gets its answers from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Talk to the backend at `base_url` (no trailing slash).
    Live { base_url: String },
    /// Serve canned fixtures; streamed answers pause `stream_delay` between
    /// chunks so they still arrive incrementally.
    Dummy { stream_delay: Duration },
}

impl RuntimeMode {
    pub fn live(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self::Live {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dummy() -> Self {
        Self::Dummy {
            stream_delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        match config.mode {
            BackendMode::Live => Self::live(&config.base_url),
            BackendMode::Dummy => Self::Dummy {
                stream_delay: Duration::from_millis(config.dummy_stream_delay_ms),
            },
        }
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self, RuntimeMode::Dummy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_trims_trailing_slash() {
        assert_eq!(
            RuntimeMode::live("http://localhost:8000/"),
            RuntimeMode::Live { base_url: "http://localhost:8000".into() }
        );
    }

    #[test]
    fn config_selects_mode() {
        let mut config = BackendConfig::default();
        assert!(!RuntimeMode::from_config(&config).is_dummy());

        config.mode = BackendMode::Dummy;
        config.dummy_stream_delay_ms = 5;
        assert_eq!(
            RuntimeMode::from_config(&config),
            RuntimeMode::Dummy { stream_delay: Duration::from_millis(5) }
        );
    }
}
