/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    /// One-based position of the current question; equals `total` once complete.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub remaining_secs: Option<u32>,
    pub is_complete: bool,
}
