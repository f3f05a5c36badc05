pub mod advisor;
pub mod api_connection;
pub mod cache;
pub mod cli;
pub mod config;
pub mod equipment_registry;
pub mod kitchen_service;
pub mod maintenance_reconciler;
pub mod models;
pub mod recommendation_merger;
pub mod shopping_sync;
pub mod storage;
pub mod upstream;
