use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network, status or parse failure against an upstream registry.
    #[error("data source error: {0}")]
    DataSource(String),

    /// Unknown county, zero population or a malformed slider value.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn from_http(source: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::DataSource(format!("{source} request timed out"))
        } else {
            Error::DataSource(format!("HTTP error from {source}: {err}"))
        }
    }
}

/// First few hundred characters of an upstream error body, for log/error text.
pub fn body_snippet(body: &str) -> String {
    body.chars().take(300).collect()
}
