//! Command handlers

pub mod admin;
pub mod report;
