//! Test helpers para tiercache-server.

#![allow(dead_code, unused_imports)]

pub mod client;
pub mod fixtures;

pub use client::{TestClient, TestResponse, client, client_with};
pub use fixtures::{StaticSecrets, UnreachableTier, default_secrets, test_registry, test_state};
