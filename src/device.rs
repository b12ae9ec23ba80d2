//! Device selection, made explicit.
//!
//! icicle keeps the active device as thread-local runtime state. The benchmark
//! never relies on whatever happens to be active: a [`DeviceContext`] is opened
//! once at start-up and handed to everything that talks to the device, which
//! re-activates it before use.

use std::fmt;

use icicle_runtime::{Device, runtime};
use tracing::{debug, info};

use crate::error::BenchError;

pub const HOST_DEVICE: &str = "CPU";

/// Loads the backend libraries from `ICICLE_BACKEND_INSTALL_DIR`, or the
/// default install location.
pub fn load_backend() -> Result<(), BenchError> {
    runtime::load_backend_from_env_or_default()
        .map_err(|e| BenchError::BackendLoad(format!("{e:?}")))?;
    debug!("icicle backend loaded");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceContext {
    kind: String,
    index: i32,
}

impl DeviceContext {
    /// A context for `kind:index`. Nothing is loaded or selected yet.
    pub fn new(kind: impl Into<String>, index: i32) -> Self {
        Self { kind: kind.into(), index }
    }

    /// The host device, always present without loading any backend.
    pub fn host() -> Self {
        Self::new(HOST_DEVICE, 0)
    }

    /// Loads the backend, checks that `kind:index` exists and selects it.
    pub fn open(kind: &str, index: i32) -> Result<Self, BenchError> {
        load_backend()?;

        let ctx = Self::new(kind, index);
        if !ctx.is_available() {
            return Err(BenchError::DeviceUnavailable { kind: ctx.kind, index });
        }
        ctx.activate()?;

        info!(device = %ctx, "device selected");
        Ok(ctx)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn is_host(&self) -> bool {
        self.kind.eq_ignore_ascii_case(HOST_DEVICE)
    }

    pub fn device(&self) -> Device {
        Device::new(&self.kind, self.index)
    }

    pub fn is_available(&self) -> bool {
        icicle_runtime::is_device_available(&self.device())
    }

    /// Makes this the active device for the calling thread.
    pub fn activate(&self) -> Result<(), BenchError> {
        icicle_runtime::set_device(&self.device()).map_err(|e| BenchError::DeviceSelect {
            kind: self.kind.clone(),
            index: self.index,
            reason: format!("{e:?}"),
        })
    }
}

impl fmt::Display for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.index)
    }
}
