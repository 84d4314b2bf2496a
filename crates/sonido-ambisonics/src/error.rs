/// Errors raised by the reverb engine.
///
/// `thiserror` 2.0 derives its `Error` impl against `core::error::Error`
/// (stable since Rust 1.81), so the derive works unmodified in this crate's
/// `no_std` default build — the same derive the rest of the workspace uses
/// for its error enums (`sonido_io::Error`, `sonido_config::ConfigError`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The buffer allocator could not size or allocate the shared sample
    /// buffer for the requested sample rate. Only raised from
    /// [`crate::state::ReverbEngine::device_update`].
    #[error("reverb: failed to allocate the shared delay buffer")]
    AllocationFailed,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
