//! API constants

/// API base path prefix
pub const API_BASE: &str = "/api";

/// Multipart field carrying the uploaded video
pub const VIDEO_FIELD: &str = "video";

/// Headroom on top of the upload ceiling for multipart framing and other form fields
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub const DEMO_MESSAGE: &str = "Hello from the backend server! 🚀";

/// Upper bound on requests handled at once, independent of the transcode slots
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;
