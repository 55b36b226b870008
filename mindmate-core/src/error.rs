use thiserror::Error;

use crate::chat::ChatError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum MindMateError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
