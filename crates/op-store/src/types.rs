/// Errors from history edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("index {index} out of range for history of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
