use crate::constants::ESR_SCHEME;
use crate::error::ParseError;
use crate::models::EsrPayload;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Requesting party's placeholder for "whoever signs this".
pub const PLACEHOLDER_ACTOR: &str = "............1";
/// Placeholder for the signing permission level.
pub const PLACEHOLDER_PERMISSION: &str = "............2";

/// Decode an `esr://` + base64url(JSON) payload.
pub fn decode(raw: &str) -> Result<EsrPayload, ParseError> {
    let body = raw
        .trim()
        .strip_prefix(ESR_SCHEME)
        .ok_or_else(|| ParseError::Malformed("missing esr:// scheme".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(body)
        .map_err(|e| ParseError::Malformed(format!("base64: {e}")))?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| ParseError::Malformed(format!("json: {e}")))?;

    // Required metadata is validated by name so the caller learns which
    // field was absent, not just that deserialization failed.
    for field in ["chain_id", "account", "session_id"] {
        let present = value
            .get(field)
            .and_then(|v| v.as_str())
            .is_some_and(|s| !s.trim().is_empty());
        if !present {
            return Err(ParseError::UnknownField(match field {
                "chain_id" => "chain_id",
                "account" => "account",
                _ => "session_id",
            }));
        }
    }

    serde_json::from_value(value).map_err(|e| ParseError::Malformed(format!("payload: {e}")))
}

/// Encode a payload back into its wire form.
pub fn encode(payload: &EsrPayload) -> String {
    let json = serde_json::to_vec(payload).unwrap_or_default();
    format!("{}{}", ESR_SCHEME, URL_SAFE_NO_PAD.encode(json))
}

/// Substitute signer placeholders in action data with the resolved
/// actor and permission.
pub fn apply_placeholders(value: &mut serde_json::Value, actor: &str, permission: &str) {
    match value {
        serde_json::Value::String(s) => {
            if s == PLACEHOLDER_ACTOR {
                *s = actor.to_string();
            } else if s == PLACEHOLDER_PERMISSION {
                *s = permission.to_string();
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                apply_placeholders(item, actor, permission);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values_mut() {
                apply_placeholders(item, actor, permission);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EsrAction;

    fn payload() -> EsrPayload {
        EsrPayload {
            chain_id: "chain-x".to_string(),
            account: "requestor".to_string(),
            session_id: "sess-1".to_string(),
            actions: vec![EsrAction {
                contract: "token".to_string(),
                action: "transfer".to_string(),
                data: serde_json::json!({
                    "from": PLACEHOLDER_ACTOR,
                    "to": "requestor",
                    "quantity": "1.0000 TOK"
                }),
            }],
            callback: None,
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let decoded = decode(&encode(&payload())).unwrap();
        assert_eq!(decoded.chain_id, "chain-x");
        assert_eq!(decoded.session_id, "sess-1");
        assert_eq!(decoded.actions.len(), 1);
    }

    #[test]
    fn missing_scheme_is_malformed() {
        assert!(matches!(
            decode("https://example/abc"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn bad_base64_is_malformed() {
        assert!(matches!(
            decode("esr://%%%not-base64%%%"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn missing_session_id_is_unknown_field() {
        let mut value = serde_json::to_value(payload()).unwrap();
        value.as_object_mut().unwrap().remove("session_id");
        let raw = format!(
            "esr://{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&value).unwrap())
        );
        assert_eq!(
            decode(&raw).unwrap_err(),
            ParseError::UnknownField("session_id")
        );
    }

    #[test]
    fn empty_account_is_unknown_field() {
        let mut p = payload();
        p.account = "  ".to_string();
        assert_eq!(
            decode(&encode(&p)).unwrap_err(),
            ParseError::UnknownField("account")
        );
    }

    #[test]
    fn placeholders_resolve_recursively() {
        let mut data = serde_json::json!({
            "from": PLACEHOLDER_ACTOR,
            "auth": [{ "actor": PLACEHOLDER_ACTOR, "permission": PLACEHOLDER_PERMISSION }],
            "memo": "unchanged"
        });
        apply_placeholders(&mut data, "alice", "active");
        assert_eq!(data["from"], "alice");
        assert_eq!(data["auth"][0]["actor"], "alice");
        assert_eq!(data["auth"][0]["permission"], "active");
        assert_eq!(data["memo"], "unchanged");
    }
}
