//! CLI error types.

use tessera_config::ConfigError;
use tessera_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{failed} of {total} pages failed to render")]
    BuildFailed { failed: usize, total: usize },
}
