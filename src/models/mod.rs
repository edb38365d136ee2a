use crate::collection::Identify;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity of a tracked account: (chain id, account name).
pub type AccountKey = (String, String);

/// Identity of a token contract: (chain id, contract, symbol).
pub type ContractKey = (String, String, String);

// ==================== PROVIDER ====================

/// Reference to a token contract a provider declares as known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRef {
    pub contract: String,
    pub symbol: String,
}

/// A configured remote chain: transaction RPC plus history index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainProvider {
    pub chain_id: String,
    pub name: String,
    pub rpc_url: String,
    pub history_url: String,
    pub icon_url: Option<String>,
    pub token_contracts: Vec<ContractRef>,
}

impl Identify for ChainProvider {
    type Key = String;

    fn identity(&self) -> String {
        self.chain_id.clone()
    }
}

// ==================== TOKEN ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenContract {
    pub chain_id: String,
    pub contract: String,
    pub symbol: String,
    pub issuer: Option<String>,
    pub supply: Decimal,
    pub max_supply: Decimal,
    pub name: Option<String>,
    pub logo_url: Option<String>,
    /// True when this entry was synthesized because a balance referenced
    /// a contract the catalog does not know.
    pub blacklisted: bool,
}

impl TokenContract {
    /// Placeholder for a contract seen only through a balance.
    pub fn placeholder(chain_id: &str, contract: &str, symbol: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            contract: contract.to_string(),
            symbol: symbol.to_string(),
            issuer: None,
            supply: Decimal::ZERO,
            max_supply: Decimal::ZERO,
            name: None,
            logo_url: None,
            blacklisted: true,
        }
    }
}

impl Identify for TokenContract {
    type Key = ContractKey;

    fn identity(&self) -> ContractKey {
        (
            self.chain_id.clone(),
            self.contract.clone(),
            self.symbol.clone(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    pub chain_id: String,
    pub account: String,
    pub contract: String,
    pub symbol: String,
    pub amount: Decimal,
}

impl TokenBalance {
    pub fn contract_key(&self) -> ContractKey {
        (
            self.chain_id.clone(),
            self.contract.clone(),
            self.symbol.clone(),
        )
    }
}

impl Identify for TokenBalance {
    type Key = (String, String, String, String);

    fn identity(&self) -> Self::Key {
        (
            self.chain_id.clone(),
            self.account.clone(),
            self.contract.clone(),
            self.symbol.clone(),
        )
    }
}

// ==================== ACCOUNT ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyWeight {
    pub public_key: String,
    pub weight: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    pub threshold: u32,
    pub keys: Vec<KeyWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub chain_id: String,
    pub name: String,
    pub permissions: Vec<Permission>,
    /// Public key referencing the KeyStore entry that controls this
    /// account. Private material never lives here.
    pub stored_key: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
}

impl Account {
    pub fn new(chain_id: &str, name: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            name: name.to_string(),
            permissions: Vec::new(),
            stored_key: None,
            display_name: None,
            avatar_url: None,
            verified: false,
        }
    }

    pub fn key(&self) -> AccountKey {
        (self.chain_id.clone(), self.name.clone())
    }

    pub fn permission(&self, name: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.name == name)
    }
}

impl Identify for Account {
    type Key = AccountKey;

    fn identity(&self) -> AccountKey {
        self.key()
    }
}

// ==================== TRANSFER ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTransferAction {
    pub chain_id: String,
    pub tx_id: String,
    pub account: String,
    pub contract: String,
    pub symbol: String,
    pub from: String,
    pub to: String,
    pub quantity: Decimal,
    pub memo: String,
    pub timestamp: DateTime<Utc>,
    /// Computed against the owning account: `from == account`.
    pub sent: bool,
}

impl Identify for TokenTransferAction {
    type Key = (String, String, String, String);

    fn identity(&self) -> Self::Key {
        (
            self.chain_id.clone(),
            self.tx_id.clone(),
            self.account.clone(),
            self.contract.clone(),
        )
    }
}

// ==================== SIGNING ====================

/// One action of a decoded signing request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsrAction {
    pub contract: String,
    pub action: String,
    pub data: serde_json::Value,
}

/// Decoded body of an `esr://` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsrPayload {
    pub chain_id: String,
    pub account: String,
    pub session_id: String,
    pub actions: Vec<EsrAction>,
    #[serde(default)]
    pub callback: Option<String>,
}

/// The single outstanding external signing request. Transient: never
/// persisted, overwritten by the next parse, cleared by accept/decline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningRequest {
    pub chain_id: String,
    pub requestor: String,
    pub requestor_display: Option<String>,
    pub signer: AccountKey,
    pub session_id: String,
    pub payload: EsrPayload,
    pub resolved: Option<ResolvedTransaction>,
}

/// A signing request bound to a concrete signer permission and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedTransaction {
    pub chain_id: String,
    pub actor: String,
    pub permission: String,
    pub actions: Vec<EsrAction>,
    pub expiration: DateTime<Utc>,
}

/// A durable record of a granted signing authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsrSession {
    pub session_id: String,
    pub account: AccountKey,
    pub signer_display: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identify for EsrSession {
    type Key = String;

    fn identity(&self) -> String {
        self.session_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_contract_is_blacklisted_with_zero_supply() {
        let contract = TokenContract::placeholder("chain-x", "spam.token", "SPAM");
        assert!(contract.blacklisted);
        assert_eq!(contract.supply, Decimal::ZERO);
        assert_eq!(
            contract.identity(),
            (
                "chain-x".to_string(),
                "spam.token".to_string(),
                "SPAM".to_string()
            )
        );
    }

    #[test]
    fn account_permission_lookup_by_name() {
        let mut account = Account::new("chain-x", "alice");
        account.permissions.push(Permission {
            name: "active".to_string(),
            threshold: 1,
            keys: vec![KeyWeight {
                public_key: "PUB_K1_abc".to_string(),
                weight: 1,
            }],
        });
        assert!(account.permission("active").is_some());
        assert!(account.permission("owner").is_none());
    }

    #[test]
    fn transfer_identity_ignores_direction_fields() {
        let base = TokenTransferAction {
            chain_id: "chain-x".to_string(),
            tx_id: "tx1".to_string(),
            account: "alice".to_string(),
            contract: "token".to_string(),
            symbol: "TOK".to_string(),
            from: "alice".to_string(),
            to: "bob".to_string(),
            quantity: Decimal::ONE,
            memo: String::new(),
            timestamp: Utc::now(),
            sent: true,
        };
        let mut other = base.clone();
        other.sent = false;
        other.memo = "different".to_string();
        assert_eq!(base.identity(), other.identity());
    }
}
