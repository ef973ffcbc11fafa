//! # HATEOAS Sample Library
//!
//! This library exposes the core modules of the sample application for integration testing.

pub mod config;
pub mod lifecycle;
pub mod model;
