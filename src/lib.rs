//! Nurtura - maternal-wellness content and community backend
//!
//! This library provides the core functionality for the Nurtura service:
//! editorial content, a community forum, personalized calendar content,
//! and the breastfeeding / elimination-communication tracking tools.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
