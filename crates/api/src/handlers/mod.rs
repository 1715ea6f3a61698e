//! HTTP request handlers, grouped by resource.

pub mod auth;
pub mod courses;
pub mod health;
pub mod questions;
pub mod webhooks;
