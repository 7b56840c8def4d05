//! Stream configuration.

/// Options applied when opening an [`OutputStream`](crate::OutputStream).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StreamConfig {
    /// Capacity of the write buffer in front of a local file, in bytes.
    pub buffer_capacity:    usize,
    /// Create missing parent directories of a local destination.
    pub create_parent_dirs: bool,
    /// Truncate an existing destination.  When `false`, opening a destination
    /// that already exists fails with `ErrorKind::AlreadyExists`.
    pub overwrite:          bool,
    /// `fsync` a local file before `close` returns.
    pub sync_on_close:      bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_capacity:    64 * 1024,
            create_parent_dirs: true,
            overwrite:          true,
            sync_on_close:      true,
        }
    }
}
