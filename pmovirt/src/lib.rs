//! # pmovirt - VM actions over the management REST API
//!
//! Translates attribute mappings describing a change to a virtual machine
//! into version-correct XML request bodies, sends them, and turns the
//! server's fault payloads into typed errors.
//!
//! - [`DocumentBuilder`] : règles de construction des documents XML
//! - [`VersionPolicy`] : variantes de format selon la version du serveur
//! - [`fault`] : classification des réponses
//! - [`ActionDispatcher`] : orchestration build → envoi → interprétation
//! - [`RestService`] : transport HTTP `ureq` et découverte de version
//! - [`Vm`] : façade par VM
//!
//! ## Example
//!
//! ```rust,no_run
//! use pmovirt::{AttributeOptions, RestService, RestSettings, Vm};
//!
//! let service = RestService::new(RestSettings::new("https://engine.example.com/api"))?;
//! let vm = Vm::new("/api/vms/128f9ffd", &service, &service);
//!
//! let disk = AttributeOptions::new()
//!     .with("name", "data")
//!     .with("interface", "virtio")
//!     .with("format", "raw")
//!     .with("size", 10737418240_i64)
//!     .with("sparse", true)
//!     .with_ref("storage", "aa7e70e5-40d0-43e2-a605-92ce6ba652a8");
//! vm.create_disk(&disk)?;
//! vm.set_memory_reserve(pmovirt::GIGABYTE)?;
//! # Ok::<(), pmovirt::VirtError>(())
//! ```

pub mod action;
pub mod config_ext;
pub mod dispatcher;
pub mod errors;
pub mod fault;
pub mod options;
pub mod resource;
pub mod rest_service;
pub mod transport;
pub mod version;
pub mod vm;
pub mod xml;

pub use action::{ActionKind, ActionTarget};
pub use config_ext::VirtConfigExt;
pub use dispatcher::ActionDispatcher;
pub use errors::{Result, VirtError};
pub use fault::{FAULT_PATTERNS, Fault, FaultKind};
pub use options::{AttrValue, AttributeOptions, DiskOptions, NicOptions};
pub use resource::Resource;
pub use rest_service::{RestService, RestSettings};
pub use transport::{RawResponse, Transport, VersionDiscovery};
pub use version::{PayloadShape, ServerVersion, VersionPolicy};
pub use vm::{GIGABYTE, Vm};
pub use xml::{DocumentBuilder, XmlDocument};
