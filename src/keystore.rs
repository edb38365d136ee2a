use crate::error::StoreError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Secure storage of private-key material, keyed by public key.
///
/// Kept separate from the general [`crate::persist::Store`] so key
/// material never shares a file with display state.
pub trait KeyStore: Send + Sync {
    fn store_key(&self, public_key: &str, private_key: &str) -> Result<(), StoreError>;
    fn private_key(&self, public_key: &str) -> Result<Option<String>, StoreError>;
}

/// File-backed keystore: a single JSON map guarded by a mutex.
pub struct FileKeyStore {
    path: PathBuf,
    keys: Mutex<HashMap<String, String>>,
}

impl FileKeyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let path = dir.join("keys.json");
        let keys = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            keys: Mutex::new(keys),
        })
    }

    fn flush(&self, keys: &HashMap<String, String>) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(keys)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyStore for FileKeyStore {
    fn store_key(&self, public_key: &str, private_key: &str) -> Result<(), StoreError> {
        let mut keys = self.keys.lock().expect("keystore lock poisoned");
        keys.insert(public_key.to_string(), private_key.to_string());
        self.flush(&keys)
    }

    fn private_key(&self, public_key: &str) -> Result<Option<String>, StoreError> {
        let keys = self.keys.lock().expect("keystore lock poisoned");
        Ok(keys.get(public_key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let keystore = FileKeyStore::new(dir.path()).unwrap();
        keystore.store_key("PUB_K1_a", "PVT_K1_secret01").unwrap();
        assert_eq!(
            keystore.private_key("PUB_K1_a").unwrap().as_deref(),
            Some("PVT_K1_secret01")
        );
        assert!(keystore.private_key("PUB_K1_b").unwrap().is_none());
    }

    #[test]
    fn keys_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let keystore = FileKeyStore::new(dir.path()).unwrap();
            keystore.store_key("PUB_K1_a", "PVT_K1_secret01").unwrap();
        }
        let reopened = FileKeyStore::new(dir.path()).unwrap();
        assert_eq!(
            reopened.private_key("PUB_K1_a").unwrap().as_deref(),
            Some("PVT_K1_secret01")
        );
    }
}
