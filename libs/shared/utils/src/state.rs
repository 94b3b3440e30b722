use std::sync::Arc;

use tracing::{info, warn};

use shared_config::AppConfig;
use shared_database::{AvailabilityStore, MemoryStore, ScheduleStore, SupabaseStore, UserStore};

/// Built once at start-up and shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub availabilities: Arc<dyn AvailabilityStore>,
    pub schedules: Arc<dyn ScheduleStore>,
}

impl AppState {
    /// Supabase when configured, otherwise the in-memory store.
    pub fn from_config(config: AppConfig) -> Self {
        if config.is_configured() {
            info!("Using Supabase storage at {}", config.supabase_url);
            Self::supabase(config)
        } else {
            warn!("Supabase not configured, data will not survive a restart");
            Self::in_memory(config)
        }
    }

    pub fn supabase(config: AppConfig) -> Self {
        let store = Arc::new(SupabaseStore::new(&config));
        Self {
            config: Arc::new(config),
            users: store.clone(),
            availabilities: store.clone(),
            schedules: store,
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config: Arc::new(config),
            users: store.clone(),
            availabilities: store.clone(),
            schedules: store,
        }
    }
}
