//! Row types and DTOs for every table.

pub mod course;
pub mod purchase;
pub mod question;
pub mod session;
pub mod trial;
pub mod user;
