//! Shared constants for end-to-end tests
//!
//! When test users or the fake catalog data change, update only this file.

// ============================================================================
// Test Users
// ============================================================================

/// Handle of the user most tests act as
pub const TEST_USER: &str = "alice";

pub const TEST_USER_FIRST_NAME: &str = "Alice";

/// Second user, used as Duo Wrapped counterpart
pub const OTHER_USER: &str = "bob";

pub const OTHER_USER_FIRST_NAME: &str = "Bob";

// ============================================================================
// Catalog Access Tokens
// ============================================================================

/// Access token the fake catalog answers with full data
pub const CATALOG_ACCESS_TOKEN: &str = "catalog-access-token";

/// Access token the fake catalog treats as expired, every fetch degrades to
/// an empty list
pub const EXPIRED_ACCESS_TOKEN: &str = "expired-access-token";

// ============================================================================
// Fake Catalog Data
// ============================================================================

pub const TRACK_1_NAME: &str = "Yellow";
pub const TRACK_2_NAME: &str = "Clocks";
pub const TRACK_3_NAME: &str = "Creep";

pub const ARTIST_1_NAME: &str = "Coldplay";
pub const ARTIST_2_NAME: &str = "Radiohead";
pub const ARTIST_3_NAME: &str = "Portishead";

pub const ARTIST_1_ID: &str = "artist-coldplay";
pub const ARTIST_2_ID: &str = "artist-radiohead";
pub const ARTIST_3_ID: &str = "artist-portishead";

/// Normalized first genre of Coldplay
pub const TOP_GENRE: &str = "Pop Rock";

/// Sum of the recently-played durations, in minutes
pub const RECENT_MINUTES: u64 = 10;

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
