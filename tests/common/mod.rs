//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.

mod client;
mod constants;
mod image_host;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use image_host::TestImageHost;
#[allow(unused_imports)]
pub use server::TestServer;
