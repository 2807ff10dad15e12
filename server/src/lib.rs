//! HTTP function exposing CRUD over the backend's `employees` table.

pub mod config;
pub mod handlers;
pub mod http;
pub mod routing;
pub mod seed;
