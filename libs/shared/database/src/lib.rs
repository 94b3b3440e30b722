pub mod error;
pub mod memory;
pub mod postgrest;
pub mod store;
pub mod supabase;

pub use error::DatabaseError;
pub use memory::MemoryStore;
pub use postgrest::SupabaseStore;
pub use store::{AvailabilityQuery, AvailabilityStore, ScheduleStore, UserStore};
pub use supabase::SupabaseClient;
