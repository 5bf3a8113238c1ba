pub mod core;
pub mod manager;
pub mod registry;

pub use self::core::build_pool;
pub use manager::DatabaseManager;
pub use registry::{DbInfrastructure, ManagerRegistry};
