use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::DraftSettings;
use crate::ws::broker::RealtimeBroker;
use crate::ws::hub::RoomRegistry;

/// Shared resources handed to every handler and websocket session.
#[derive(Clone)]
pub struct AppState {
    /// Pool; absent only in tests that exercise the no-database path
    pub db: Option<DatabaseConnection>,
    pub settings: DraftSettings,
    registry: Arc<RoomRegistry>,
    broker: Option<Arc<RealtimeBroker>>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, settings: DraftSettings) -> Self {
        Self {
            db: Some(db),
            settings,
            registry: Arc::new(RoomRegistry::new()),
            broker: None,
        }
    }

    pub fn without_db(settings: DraftSettings) -> Self {
        Self {
            db: None,
            settings,
            registry: Arc::new(RoomRegistry::new()),
            broker: None,
        }
    }

    /// Route fanout through Redis; the broker's registry replaces the local one.
    pub fn with_broker(mut self, broker: Arc<RealtimeBroker>) -> Self {
        self.registry = broker.registry();
        self.broker = Some(broker);
        self
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        self.registry.clone()
    }

    pub fn broker(&self) -> Option<&Arc<RealtimeBroker>> {
        self.broker.as_ref()
    }
}
