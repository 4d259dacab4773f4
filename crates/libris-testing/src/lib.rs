//! Test doubles for the Libris workspace
//!
//! Scripted model clients and counting mock capabilities used by unit and
//! integration tests across the workspace.

pub mod mock_capability;
pub mod mock_model;

pub use mock_capability::MockCapability;
pub use mock_model::MockModelClient;
