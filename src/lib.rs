// Core infrastructure modules
pub mod core;

// Data-access modules
pub mod config;
pub mod criteria;
pub mod dialect;
pub mod record;
pub mod session;
pub mod sql;
pub mod value;

// Re-export the public surface at the crate root
pub use config::{Config, ConnectionProfile};
pub use crate::core::{LitedalError, Result};
pub use criteria::Criteria;
pub use dialect::{Dialect, TransactionBehavior};
pub use record::Record;
pub use session::{Session, TransactionState};
pub use value::Value;
