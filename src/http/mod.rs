//! HTTP transport layer
//!
//! Provides the public health probe and the authenticated unit status and log tail endpoints.

pub mod handlers;
