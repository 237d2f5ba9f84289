use std::sync::Arc;

use session_crypto::{Barrier, JoseCodec, KeyGenerator, RawKeyMaterial};
use session_model::{NewSessionKey, SessionAlgorithm, SessionClass};
use session_store::Store;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SessionError;

/// Persists and retrieves the active signing/encryption key for a (session-class, algorithm)
/// pair, reusing it across restarts. `active` is provisional: readers pick the newest
/// `active = true` row; writers only ever insert. Rotation is out of scope.
pub struct SessionKeyRegistry {
    keygen: Arc<dyn KeyGenerator>,
    jose: Arc<dyn JoseCodec>,
    barrier: Arc<dyn Barrier>,
    store: Arc<dyn Store>,
}

impl SessionKeyRegistry {
    pub fn new(
        keygen: Arc<dyn KeyGenerator>,
        jose: Arc<dyn JoseCodec>,
        barrier: Arc<dyn Barrier>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            keygen,
            jose,
            barrier,
            store,
        }
    }

    pub async fn initialize_session_key(
        &self,
        class: SessionClass,
        algorithm: SessionAlgorithm,
    ) -> Result<Uuid, SessionError> {
        let algorithm_tag = algorithm.to_string();

        let existing = self
            .store
            .find_active_session_key(class, &algorithm_tag)
            .await
            .map_err(SessionError::StoreQueryFailed)?;

        if let Some(row) = existing {
            debug!(class = class.as_str(), algorithm = %algorithm_tag, key.id = %row.id, "Reusing active session key");
            return Ok(row.id);
        }

        let key = self.keygen.generate(algorithm).map_err(SessionError::KeyGenerateFailed)?;
        let serialized = self
            .jose
            .serialize_key(&key)
            .map_err(SessionError::KeyParseFailed)?;
        let sealed = self
            .barrier
            .seal(&serialized)
            .map_err(|e| SessionError::KeyStoreFailed(e.into()))?;

        let id = session_model::new_time_ordered_id();
        let id = self
            .store
            .insert_session_key(
                class,
                NewSessionKey {
                    id,
                    encrypted_jwk: &sealed,
                    algorithm,
                },
            )
            .await
            .map_err(SessionError::StoreInsertFailed)?;

        info!(class = class.as_str(), algorithm = %algorithm_tag, key.id = %id, "Minted new session key");

        Ok(id)
    }

    pub async fn load_key(&self, class: SessionClass, key_id: Uuid) -> Result<RawKeyMaterial, SessionError> {
        let row = self
            .store
            .load_session_key(class, key_id)
            .await
            .map_err(SessionError::StoreQueryFailed)?
            .ok_or(SessionError::KeyLoadFailed)?;

        let unsealed = self
            .barrier
            .unseal(&row.encrypted_jwk)
            .map_err(SessionError::KeyUnsealFailed)?;

        let is_symmetric = matches!(
            row.algorithm,
            SessionAlgorithm::Jwe(_)
                | SessionAlgorithm::Jws(session_model::JwsAlgorithm::Hs256)
                | SessionAlgorithm::Jws(session_model::JwsAlgorithm::Hs384)
                | SessionAlgorithm::Jws(session_model::JwsAlgorithm::Hs512)
        );

        self.jose
            .parse_key(is_symmetric, &unsealed)
            .map_err(SessionError::KeyParseFailed)
    }
}
