use super::request;
use crate::auth::Authenticator;
use crate::constants::{SIGNING_PERMISSION, TX_EXPIRE_SECS};
use crate::crypto::Crypto;
use crate::error::{AcceptError, ParseError};
use crate::keystore::KeyStore;
use crate::models::{Account, EsrSession, ResolvedTransaction, SigningRequest};
use crate::persist::Store;
use crate::state::SharedState;
use crate::transport::{SignedSubmission, Transport};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// The signing-request state machine.
///
/// One request is current at a time: parse overwrites, decline and
/// accept consume. Accept runs authenticate → key lookup → resolve →
/// sign → submit in one call and always leaves the current request
/// cleared, whichever way it ends.
#[derive(Clone)]
pub struct SigningRequestProtocol {
    state: SharedState,
    transport: Arc<dyn Transport>,
    store: Arc<dyn Store>,
    keystore: Arc<dyn KeyStore>,
    auth: Arc<dyn Authenticator>,
    crypto: Arc<dyn Crypto>,
}

impl SigningRequestProtocol {
    pub fn new(
        state: SharedState,
        transport: Arc<dyn Transport>,
        store: Arc<dyn Store>,
        keystore: Arc<dyn KeyStore>,
        auth: Arc<dyn Authenticator>,
        crypto: Arc<dyn Crypto>,
    ) -> Self {
        Self {
            state,
            transport,
            store,
            keystore,
            auth,
            crypto,
        }
    }

    /// Decode an incoming request and resolve it against local account
    /// and provider data. On success the request becomes current,
    /// discarding any previously pending one.
    pub async fn parse(&self, raw: &str) -> Result<SigningRequest, ParseError> {
        let payload = request::decode(raw)?;

        let (signer, provider) = {
            let state = self.state.read().await;
            let signer = state
                .accounts
                .iter()
                .filter(|a| a.chain_id == payload.chain_id)
                .find(|a| a.stored_key.is_some())
                .or_else(|| {
                    state
                        .accounts
                        .iter()
                        .find(|a| a.chain_id == payload.chain_id)
                })
                .ok_or(ParseError::UnknownSigner)?;
            let provider = state
                .provider(&payload.chain_id)
                .cloned()
                .ok_or(ParseError::NoProvider)?;
            (signer.key(), provider)
        };

        // Best-effort display enrichment for the requesting party; a
        // failure here never blocks the request.
        let requestor_display = match self.transport.fetch_profile(&provider, &payload.account).await
        {
            Ok(profile) => profile.and_then(|p| p.display_name),
            Err(e) => {
                tracing::warn!(requestor = %payload.account, error = %e, "requestor profile fetch failed");
                None
            }
        };

        let pending = SigningRequest {
            chain_id: payload.chain_id.clone(),
            requestor: payload.account.clone(),
            requestor_display,
            signer,
            session_id: payload.session_id.clone(),
            payload,
            resolved: None,
        };

        let mut state = self.state.write().await;
        if state.current_request.is_some() {
            tracing::debug!("discarding previously pending signing request");
        }
        state.current_request = Some(pending.clone());
        Ok(pending)
    }

    /// Clear the current request unconditionally.
    pub async fn decline(&self) {
        let declined = {
            let mut state = self.state.write().await;
            state.current_request.take()
        };
        if let Some(request) = declined {
            tracing::info!(session_id = %request.session_id, "signing request declined");
        }
        self.flush().await;
    }

    /// Authenticate, sign, and submit the current request. The request
    /// is taken out of state before the first fallible step, so every
    /// exit path leaves it cleared.
    pub async fn accept(&self) -> Result<EsrSession, AcceptError> {
        let pending = {
            let mut state = self.state.write().await;
            state.current_request.take()
        }
        .ok_or(AcceptError::NoPendingRequest)?;

        let result = self.accept_inner(pending).await;
        self.flush().await;
        result
    }

    async fn accept_inner(&self, mut pending: SigningRequest) -> Result<EsrSession, AcceptError> {
        self.auth.authenticate().await?;

        let account = {
            let state = self.state.read().await;
            state
                .accounts
                .get(&pending.signer)
                .cloned()
                .ok_or(AcceptError::NoSigningKey)?
        };
        let private_key = self.signing_key(&account).ok_or(AcceptError::NoSigningKey)?;

        let resolved = resolve(&pending, &account.name)?;
        pending.resolved = Some(resolved.clone());
        let digest = self
            .crypto
            .transaction_digest(&pending.chain_id, &resolved);
        let signature = self
            .crypto
            .sign_digest(&private_key, &digest)
            .map_err(|e| AcceptError::SigningFailed(e.to_string()))?;

        let submission = SignedSubmission {
            session_id: pending.session_id.clone(),
            transaction: resolved,
            signature,
            nonce: format!("{:016x}", rand::random::<u64>()),
            callback: pending.payload.callback.clone(),
        };
        let ack = self.transport.submit_callback(&submission).await?;

        let session = EsrSession {
            session_id: ack.session_id.unwrap_or(pending.session_id),
            account: pending.signer,
            signer_display: ack.signer_display.or(account.display_name),
            created_at: Utc::now(),
        };
        {
            let mut state = self.state.write().await;
            state.sessions.upsert(session.clone());
        }
        tracing::info!(session_id = %session.session_id, "signing request accepted");
        Ok(session)
    }

    /// Remove a session locally and notify the remote service without
    /// waiting for it: the client must always be able to forget a
    /// session it distrusts, even when the service is unreachable.
    pub async fn revoke(&self, session_id: &str) {
        let removed = {
            let mut state = self.state.write().await;
            state.sessions.remove(&session_id.to_string())
        };
        let Some(session) = removed else {
            return;
        };
        tracing::info!(session_id = %session.session_id, "session revoked");

        let transport = self.transport.clone();
        let id = session.session_id;
        tokio::spawn(async move {
            if let Err(e) = transport.revoke_session(&id).await {
                tracing::warn!(session_id = %id, error = %e, "remote revocation notify failed");
            }
        });
        self.flush().await;
    }

    /// Private key for the account's signing permission: any permission
    /// key present in the keystore, falling back to the account's
    /// stored key reference.
    fn signing_key(&self, account: &Account) -> Option<String> {
        let permission_keys = account
            .permission(SIGNING_PERMISSION)
            .map(|p| p.keys.iter().map(|k| k.public_key.clone()).collect::<Vec<_>>())
            .unwrap_or_default();
        let candidates = permission_keys
            .into_iter()
            .chain(account.stored_key.clone());
        for public_key in candidates {
            match self.keystore.private_key(&public_key) {
                Ok(Some(private_key)) => return Some(private_key),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "keystore lookup failed");
                }
            }
        }
        None
    }

    async fn flush(&self) {
        let state = self.state.read().await;
        if let Err(e) = state.persist(self.store.as_ref()) {
            tracing::warn!(error = %e, "state flush failed");
        }
    }
}

/// Bind the abstract request to the signer's permission level and an
/// expiration window.
fn resolve(pending: &SigningRequest, actor: &str) -> Result<ResolvedTransaction, AcceptError> {
    if pending.payload.actions.is_empty() {
        return Err(AcceptError::ResolutionFailed(
            "request carries no actions".to_string(),
        ));
    }
    let mut actions = pending.payload.actions.clone();
    for action in &mut actions {
        request::apply_placeholders(&mut action.data, actor, SIGNING_PERMISSION);
    }
    Ok(ResolvedTransaction {
        chain_id: pending.chain_id.clone(),
        actor: actor.to_string(),
        permission: SIGNING_PERMISSION.to_string(),
        actions,
        expiration: Utc::now() + Duration::seconds(TX_EXPIRE_SECS),
    })
}
