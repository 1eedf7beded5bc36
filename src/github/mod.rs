//! GitHub API integration module
//!
//! This module provides the hosting-platform surface obsync consumes:
//! - Authenticated identity lookup
//! - Repository lookup and private-repository creation
//! - Credentialed remote URL composition
//! - Error classification

pub mod client;
pub mod error_handler;

pub use client::GitHubClient;
pub use error_handler::classify_github_error;
