//! Shared constants for end-to-end tests
//!
//! When the seeded credentials or fixture bytes change, update only this file.

/// Seeded admin login id
pub const ADMIN_USER: &str = "admin";

/// Seeded admin password
pub const ADMIN_PASS: &str = "admin1234";

/// Seeded guest login id
pub const GUEST_USER: &str = "guest";

/// Seeded guest password
pub const GUEST_PASS: &str = "1234";

/// Bytes served by the stub image host at /test.png
pub const TEST_IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n first test image";

/// Bytes served by the stub image host at /other.png
pub const OTHER_IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n second test image";

/// A URL no request can ever reach (port 1 is not listening)
pub const UNREACHABLE_IMAGE_URL: &str = "http://127.0.0.1:1/missing.png";

/// How long to wait for a spawned server before failing the test
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for the server
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
