pub mod service_db;

pub use service_db::{AnalyticsDb, DbService, OrdersDb, ServiceDb, UsersDb};
