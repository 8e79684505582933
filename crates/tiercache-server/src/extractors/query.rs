use serde::Deserialize;

/// Query parameters de los endpoints key-scoped.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UserIdQuery {
    /// Identificador del usuario cuyas entries se operan.
    pub user_id: Option<String>,
}

impl UserIdQuery {
    /// Retorna el user_id o un error de validacion si falta.
    pub fn required(&self) -> Result<&str, tiercache_core::CacheError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| tiercache_core::CacheError::validation("user_id", "is required"))
    }
}
