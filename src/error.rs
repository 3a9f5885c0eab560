use thiserror::Error;

/// Failure of one of the external data providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or its body could not be read.
    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// The service answered with a non-success status code.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The query succeeded but returned nothing usable.
    #[error("no result for {0}")]
    NotFound(String),

    /// Response cache read/write failure.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to geocode boundary for {place:?}: {source}")]
    Geocode { place: String, #[source] source: ProviderError },

    #[error("failed to fetch street graph: {0}")]
    StreetGraph(#[source] ProviderError),

    #[error("no administrative sub-units found inside the boundary; nothing to score")]
    NoUnits,
}
