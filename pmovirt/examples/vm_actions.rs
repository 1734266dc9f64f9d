//! Runs a few actions against a VM.
//!
//! ```text
//! PMOVIRT_CONFIG__API__URL=https://engine.example.com/api \
//! RUST_LOG=pmovirt=debug \
//! cargo run -p pmovirt --example vm_actions -- /api/vms/128f9ffd
//! ```

use anyhow::{Context, Result};
use pmoconfig::get_config;
use pmovirt::{RestService, VersionDiscovery, VirtConfigExt, VirtError, Vm, GIGABYTE};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = get_config();

    // RUST_LOG wins over the configured level
    let level = config.get_log_min_level()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let href = std::env::args()
        .nth(1)
        .context("usage: vm_actions <vm href>")?;

    let settings = config.get_rest_settings()?;
    let service = RestService::new(settings)?;

    let version = service.current_version()?;
    info!(version = %version, "Connected");

    let vm = Vm::new(href, &service, &service);
    vm.set_memory_reserve(GIGABYTE)?;
    vm.detach_floppy()?;

    match vm.stop() {
        Ok(_) => info!("VM stopped"),
        Err(VirtError::VmNotRunning(detail)) => warn!(%detail, "VM was already down"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
