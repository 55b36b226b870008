pub mod app;
pub mod chat;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod session;
pub mod store;

pub use app::MindMate;
pub use chat::{
    ChatError, ChatGateway, ChatMessage, ChatProvider, HostedChatClient, LocalChatClient,
    ProviderKind,
};
pub use config::MindMateConfig;
pub use error::MindMateError;
pub use metrics::{Analytics, Dashboard, ScorePoint, Summary, Trend};
pub use models::{ChatEvent, ChatRole, CheckinRecord, CheckinScores, Snapshot};
pub use session::{new_session_uid, ChatSession};
pub use store::{EventStore, StoreError};
