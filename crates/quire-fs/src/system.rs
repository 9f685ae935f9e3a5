// system.rs — Environment query for the trusted side.

use quire_protocol::SystemInfo;

/// Describe the platform and runtime this service runs on.
///
/// Infallible: an unreadable working directory is reported as an empty string.
pub fn current_system_info() -> SystemInfo {
    let cwd = std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    SystemInfo {
        platform: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        family: std::env::consts::FAMILY.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cwd,
        pid: std::process::id(),
    }
}
