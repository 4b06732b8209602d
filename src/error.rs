use thiserror::Error;

/// Errors surfaced by the blob submitter.
///
/// Everything except [`Error::VerifyFailed`] is fatal for the run. `VerifyFailed`
/// is only ever reported alongside a blob, never returned from a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required setting `{0}`")]
    ConfigMissing(&'static str),

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("credential setup failed: {0:#}")]
    CredentialSetupFailed(#[source] anyhow::Error),

    #[error("failed to create client: {0:#}")]
    ClientConstructionFailed(#[source] anyhow::Error),

    #[error("failed to create namespace: {0}")]
    NamespaceConstructionFailed(String),

    #[error("failed to submit blob {sequence}: {cause:#}")]
    SubmitFailed {
        sequence: u32,
        #[source]
        cause: anyhow::Error,
    },

    #[error("could not verify blob {sequence}: {reason}")]
    VerifyFailed { sequence: u32, reason: String },
}

impl Error {
    /// Process exit code for a fatal error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::ConfigMissing(_) | Error::ConfigInvalid(_) => 2,
            Error::CredentialSetupFailed(_) => 3,
            Error::ClientConstructionFailed(_) => 4,
            Error::NamespaceConstructionFailed(_) => 5,
            Error::SubmitFailed { .. } => 6,
            Error::VerifyFailed { .. } => 7,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
