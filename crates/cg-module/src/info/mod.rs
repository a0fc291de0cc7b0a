//! The `info` action: capability discovery for the orchestrator.
//!
//! The report is derived on every call from the capability registry and the
//! handler table, so partial modules never advertise actions they cannot
//! perform.

use std::io::Write;
use std::sync::Arc;

use tracing::debug;

use crate::capability::ModuleDescriptor;
use crate::error::ModuleError;
use crate::handler::Handlers;
use crate::protocol::ModuleInfo;

const INFO_TARGET: &str = "cg_module::info";

/// Builds the capability report for a module.
#[must_use]
pub fn report_info(descriptor: &ModuleDescriptor, handlers: &Handlers<'_>) -> ModuleInfo {
    let capabilities = descriptor.capabilities();
    ModuleInfo::new(
        descriptor.name(),
        descriptor.display_name(),
        descriptor.version(),
        capabilities.library_versions(),
        capabilities.supported_project_types(),
        handlers.actions(),
    )
}

/// Serialises `info` as a single JSON line on `stdout`.
///
/// # Errors
///
/// Returns [`ModuleError::SerializeInfo`] if serialisation fails and
/// [`ModuleError::Io`] if the stream rejects the write.
pub fn write_info(info: &ModuleInfo, stdout: &mut impl Write) -> Result<(), ModuleError> {
    let payload = serde_json::to_string(info).map_err(ModuleError::SerializeInfo)?;
    debug!(
        target: INFO_TARGET,
        bytes = payload.len(),
        "writing module info"
    );

    let io_error = |source| ModuleError::Io {
        what: "module info",
        source: Arc::new(source),
    };
    stdout.write_all(payload.as_bytes()).map_err(io_error)?;
    stdout.write_all(b"\n").map_err(io_error)?;
    stdout.flush().map_err(io_error)
}
