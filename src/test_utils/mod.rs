//! Test doubles and helpers shared by the unit tests
mod common;
mod scripted_coordinator;

pub use common::*;
pub use scripted_coordinator::*;
