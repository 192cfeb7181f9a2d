pub mod api;
pub mod auth;
pub mod backend;
pub mod category;
pub mod config;
pub mod errors;
pub mod http_client;
pub mod local_cache;
pub mod logging;
pub mod provider;
pub mod scoreboard;
pub mod section;
pub mod state;
pub mod store;
pub mod validate;
