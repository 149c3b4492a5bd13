/// Counters describing one frame of batching, reset at every flush.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FlushStats {
    /// Steps in the committed sequence at execution time.
    pub steps: usize,
    /// Draw calls the backend actually issued.
    pub draws: usize,
    /// Successful GPU uploads (new or replaced geometry).
    pub uploads: usize,
    /// Uploads that failed and left their step unusable.
    pub failed_uploads: usize,
    /// Closed steps that matched the previous frame and kept their GPU objects.
    pub reused: usize,
    /// Steps dropped from the sequence (truncation, stale tail, unmatched external).
    pub evicted: usize,
    /// Steps present but not drawn (unusable, or rejected by the backend).
    pub skipped: usize,
}
