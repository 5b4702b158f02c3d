//! Shared constants for test infrastructure

// SDK versions
pub const SDK_6_0_400: &str = "6.0.400";
pub const SDK_8_0_100: &str = "8.0.100";
pub const SDK_8_0_200: &str = "8.0.200";
pub const SDK_9_0_100_PREVIEW: &str = "9.0.100-preview.1";

// Binary content for testing
pub const OLD_BINARY_CONTENT: &[u8] = b"old dnvm binary";
pub const NEW_BINARY_CONTENT: &[u8] = b"new dnvm binary";
