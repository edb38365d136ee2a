/// Application constants

// Chain RPC endpoints (relative to a provider's rpc_url)
pub const RPC_GET_ACCOUNT: &str = "/v1/chain/get_account";
pub const RPC_GET_TABLE_ROWS: &str = "/v1/chain/get_table_rows";

// History index endpoints (relative to a provider's history_url)
pub const HISTORY_GET_TOKENS: &str = "/v2/state/get_tokens";
pub const HISTORY_GET_CONTRACTS: &str = "/v2/state/get_token_contracts";
pub const HISTORY_GET_ACTIONS: &str = "/v2/history/get_actions";
pub const HISTORY_GET_KEY_ACCOUNTS: &str = "/v2/state/get_key_accounts";

// Signing service endpoints (relative to the configured esr_service_url)
pub const ESR_CALLBACK: &str = "/v1/callback";
pub const ESR_REVOKE: &str = "/v1/sessions/revoke";

// Profile registry contract
pub const PROFILE_CONTRACT: &str = "profiles";
pub const PROFILE_TABLE: &str = "profiles";

// History paging
pub const DEFAULT_ACTIONS_PAGE_SIZE: u32 = 100;

// Signing request payload prefix
pub const ESR_SCHEME: &str = "esr://";

// Key / signature string prefixes
pub const PRIVATE_KEY_PREFIX: &str = "PVT_K1_";
pub const PUBLIC_KEY_PREFIX: &str = "PUB_K1_";
pub const SIGNATURE_PREFIX: &str = "SIG_K1_";

// Resolved transactions expire this long after resolution
pub const TX_EXPIRE_SECS: i64 = 120;

// Permission level used to sign accepted requests
pub const SIGNING_PERMISSION: &str = "active";

// Persistence keys for the published collections
pub const STORE_KEY_PROVIDERS: &str = "providers";
pub const STORE_KEY_CONTRACTS: &str = "token_contracts";
pub const STORE_KEY_ACCOUNTS: &str = "accounts";
pub const STORE_KEY_BALANCES: &str = "balances";
pub const STORE_KEY_TRANSFERS: &str = "transfers";
pub const STORE_KEY_SESSIONS: &str = "sessions";
