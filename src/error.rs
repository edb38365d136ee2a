use thiserror::Error;

/// Remote transport failures (RPC, history index, signing service).
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("response decode failed: {0}")]
    Decode(String),
}

/// Local persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Private-key material that cannot be parsed or derived from.
#[derive(Error, Debug, Clone)]
pub enum KeyError {
    #[error("invalid private key material")]
    InvalidKey,
}

/// Catalog refresh / reconciliation failures.
///
/// Stage- and branch-level fetch failures are recovered inside the
/// pipeline; this surfaces only the failures that abort a whole run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unknown account {0}@{1}")]
    UnknownAccount(String, String),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("invalid private key material")]
    InvalidKey,

    #[error("account discovery failed: {0}")]
    Discovery(#[from] TransportError),

    #[error("persistence error: {0}")]
    Store(#[from] StoreError),
}

/// Failures while decoding and resolving an incoming signing request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed signing request: {0}")]
    Malformed(String),

    #[error("signing request is missing required field `{0}`")]
    UnknownField(&'static str),

    #[error("no tracked account can sign for the requested chain")]
    UnknownSigner,

    #[error("signer account has no resolvable chain provider")]
    NoProvider,
}

/// Local credential check failures.
#[derive(Error, Debug, Clone)]
pub enum AuthError {
    #[error("authentication denied")]
    Denied,

    #[error("authenticator unavailable: {0}")]
    Unavailable(String),
}

/// Failures on the accept path of the signing protocol.
#[derive(Error, Debug)]
pub enum AcceptError {
    #[error("no signing request is pending")]
    NoPendingRequest,

    #[error("authentication failed: {0}")]
    AuthenticationFailed(#[from] AuthError),

    #[error("no stored signing key for the required permission")]
    NoSigningKey,

    #[error("request resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("submission failed: {0}")]
    Submission(#[from] TransportError),
}
