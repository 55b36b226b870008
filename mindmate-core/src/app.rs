use chrono::{Local, Utc};

use crate::chat::ChatGateway;
use crate::config::MindMateConfig;
use crate::error::MindMateError;
use crate::metrics::{self, Analytics, Dashboard};
use crate::models::{CheckinRecord, CheckinScores};
use crate::store::EventStore;

/// Everything a front end needs for one process lifetime: the loaded store
/// and the configured chat gateway.
pub struct MindMate {
    pub config: MindMateConfig,
    pub store: EventStore,
    pub gateway: ChatGateway,
}

impl MindMate {
    pub fn open(config: MindMateConfig) -> Result<Self, MindMateError> {
        let gateway = ChatGateway::from_config(&config)?;
        let store = EventStore::load(&config.store.path);

        Ok(Self {
            config,
            store,
            gateway,
        })
    }

    /// Record today's check-in. Scores are clamped, notes truncated.
    pub fn submit_checkin(&mut self, uid: &str, scores: CheckinScores, notes: &str) -> CheckinRecord {
        let record = CheckinRecord::new(uid, scores, notes);
        self.store.append_checkin(record.clone());
        tracing::info!(uid = %uid, total = record.total(), "Check-in recorded");
        record
    }

    pub fn dashboard(&self) -> Dashboard {
        metrics::compute_dashboard(self.store.snapshot(), Utc::now(), Local::now().date_naive())
    }

    pub fn analytics(&self) -> Option<Analytics> {
        metrics::compute_analytics(self.store.snapshot())
    }
}
