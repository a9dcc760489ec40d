/// Zero-based position of a frame in the original decoded sequence.
pub type FrameIndex = u64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
