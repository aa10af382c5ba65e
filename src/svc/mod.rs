//! # Services module
//!
//! This module provide services to interact with the DocumentDB api, to
//! resolve orderable instances and to expose them.
pub mod cfg;
pub mod docdb;
pub mod http;
pub mod orderable;
