//! Meridian Library
//!
//! This library contains all the core modules for the Meridian console backend.

use std::sync::Arc;

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use services::{
    ContextSlot, DataSource, HttpDataSource, ListDetailTable, OverviewConfig,
    OverviewContextValue, SelectionStore, TopSqlService,
};

/// Application shared state
///
/// Design Philosophy: Keep it simple - Rust's type system IS our DI container.
/// All services are wrapped in Arc for cheap cloning and thread safety.
#[derive(Clone)]
pub struct AppState {
    /// Provider slot for the Overview page context. Handlers read it and
    /// treat an unprovided slot as "not available", never as a fault.
    pub overview_context: Arc<ContextSlot>,

    pub topsql_service: Arc<TopSqlService>,
}
