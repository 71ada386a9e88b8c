use crate::error::Result;

/// Abstract interface for raw key/value persistence.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`Catalog`](super::catalog::Catalog) handles the "what" (which keys hold
/// which entities and when they are written).
///
/// Values are opaque strings; the catalog stores JSON documents under the
/// keys in [`super::keys`].
pub trait StorageBackend {
    /// Read the value stored under `key`.
    /// Returns Ok(None) if nothing has been stored yet.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    /// MUST be atomic: readers see either the old or the new value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}
