//! # gather-rs
//!
//! Backend pieces for a small community-events site: validated environment
//! configuration, event storage in Postgres, auth settings for magic-link
//! sign-in, and a buffered product-analytics client.

pub mod analytics;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod telemetry;
