//! Infrastructure layer - Port implementations
//!
//! This module contains concrete implementations of the domain ports using
//! actual hardware and system resources.

pub mod adapters;
pub mod drivers;
pub mod repositories;
pub mod tasks;
