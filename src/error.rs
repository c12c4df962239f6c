//! Error types for outbound provider calls

use thiserror::Error;

/// Failure of a single external call (search, page fetch, liveness, model).
///
/// These never escape the resolver: each one degrades to "fewer candidates".
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}")]
    Status {
        provider: &'static str,
        status: u16,
    },

    #[error("{provider} response could not be decoded: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} is not configured: {message}")]
    NotConfigured {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn transport(provider: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { provider, source }
    }

    pub fn status(provider: &'static str, status: reqwest::StatusCode) -> Self {
        Self::Status {
            provider,
            status: status.as_u16(),
        }
    }

    pub fn decode(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            provider,
            message: message.into(),
        }
    }

    pub fn not_configured(provider: &'static str, message: impl Into<String>) -> Self {
        Self::NotConfigured {
            provider,
            message: message.into(),
        }
    }

    /// Name of the provider that failed
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Transport { provider, .. }
            | Self::Status { provider, .. }
            | Self::Decode { provider, .. }
            | Self::NotConfigured { provider, .. } => provider,
        }
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
