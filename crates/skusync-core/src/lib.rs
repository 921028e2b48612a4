pub mod a1;
pub mod auth;
pub mod config;
pub mod control;
pub mod download;
pub mod drive_link;
pub mod locator;
pub mod logging;
pub mod pipeline;
pub mod rate_limit;
pub mod resolver;
pub mod retry;
pub mod store;
