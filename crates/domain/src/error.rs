/// Error type shared across the CronForge crates.
///
/// Subsystems with richer failure taxonomies (schedule building, field
/// validation) define their own error types next to their logic; this
/// enum covers the cross-cutting delivery and persistence cases.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A webhook delivery could not be attempted or completed.
    #[error("delivery: {0}")]
    Delivery(String),

    /// Reading or writing persisted gateway state failed.
    #[error("storage io: {0}")]
    StorageIo(#[from] std::io::Error),

    /// Persisted state could not be encoded or decoded.
    #[error("storage encoding: {0}")]
    StorageEncoding(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
