use crate::error::AuthError;
use async_trait::async_trait;

/// Local credential check (biometric / passcode) gating the accept
/// transition of the signing protocol.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<(), AuthError>;
}

/// Pass-through authenticator for environments without a local
/// credential provider (headless daemon, tests).
#[derive(Debug, Default, Clone)]
pub struct NoopAuthenticator;

#[async_trait]
impl Authenticator for NoopAuthenticator {
    async fn authenticate(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
