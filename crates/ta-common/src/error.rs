/// Error types shared across the virtual TA crates.
///
/// These represent request-shape failures that both the server and its clients need
/// to agree on. The `Display` text is the exact message returned in a 400 body.
/// Crate-specific errors wrap `CommonError` via `#[from]`.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommonError {
    #[error("No data provided")]
    MissingData,

    #[error("No question provided")]
    MissingQuestion,
}
