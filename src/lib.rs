//! RAiCare client core
//!
//! Conversation and assessment workflow controllers for the RAiCare health
//! assistant, with the severity guidance tables and the REST gateway they use.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod assessment;
pub mod config;
pub mod conversation;
pub mod gateway;
pub mod overview;
pub mod runtime;
pub mod session;
pub mod severity;
