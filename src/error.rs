use camino::Utf8PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("missing config file gsom-pipeline.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("no NOAA tokens configured (set NOAA_TOKEN_1..NOAA_TOKEN_{0})")]
    NoCredentials(usize),

    #[error("transport failure for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("all credentials rate limited or failing")]
    CredentialsExhausted,

    #[error("url is blacklisted: {0}")]
    Blacklisted(String),

    #[error("response for {0} had no result envelope")]
    MalformedResponse(String),

    #[error("upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("no reduction policy mapped for datatype {0}")]
    UnmappedDatatype(String),

    #[error("store unavailable at {0}")]
    StoreUnavailable(String),

    #[error("store request failed: {0}")]
    StoreHttp(String),

    #[error("store returned status {status}: {message}")]
    StoreStatus { status: u16, message: String },

    #[error("store query returned unexpected shape: {0}")]
    StoreQuery(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl PipelineError {
    /// Failures that end the whole run rather than one url or one country.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::CredentialsExhausted
                | PipelineError::StoreUnavailable(_)
                | PipelineError::UnmappedDatatype(_)
                | PipelineError::MissingConfig
                | PipelineError::ConfigRead(_)
                | PipelineError::ConfigParse(_)
                | PipelineError::NoCredentials(_)
        )
    }
}
