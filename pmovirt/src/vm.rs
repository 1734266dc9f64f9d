//! Façade par VM
//!
//! [`Vm`] binds a VM reference to an [`ActionDispatcher`] and exposes one
//! method per action, converting typed arguments into attribute options.

use crate::action::ActionKind;
use crate::dispatcher::ActionDispatcher;
use crate::errors::Result;
use crate::options::AttributeOptions;
use crate::resource::Resource;
use crate::transport::{Transport, VersionDiscovery};
use crate::xml::builder::{DESCRIPTION_KEY, INITIALIZATION_KEY, MEMORY_KEY, MEMORY_RESERVE_KEY};

/// Bytes in one gigabyte, as the API counts them.
pub const GIGABYTE: u64 = 1 << 30;

/// A VM resource identified by its href.
pub struct Vm<T, V> {
    href: String,
    dispatcher: ActionDispatcher<T, V>,
}

impl<T: Transport, V: VersionDiscovery> Vm<T, V> {
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use pmovirt::{RestService, RestSettings, Vm};
    ///
    /// let service = RestService::new(RestSettings::new("https://engine.example.com/api"))?;
    /// let vm = Vm::new("/api/vms/128f9ffd", &service, &service);
    /// vm.detach_floppy()?;
    /// # Ok::<(), pmovirt::VirtError>(())
    /// ```
    pub fn new(href: impl Into<String>, transport: T, versions: V) -> Self {
        Self {
            href: href.into(),
            dispatcher: ActionDispatcher::new(transport, versions),
        }
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn dispatcher(&self) -> &ActionDispatcher<T, V> {
        &self.dispatcher
    }

    /// POST a new disk to `{href}/disks`.
    pub fn create_disk(&self, options: &AttributeOptions) -> Result<Resource> {
        self.dispatcher
            .perform(ActionKind::CreateDisk, &self.href, options)
    }

    /// POST a new NIC to `{href}/nics`.
    pub fn create_nic(&self, options: &AttributeOptions) -> Result<Resource> {
        self.dispatcher
            .perform(ActionKind::CreateNic, &self.href, options)
    }

    /// Sets the guaranteed memory, in bytes.
    pub fn set_memory_reserve(&self, bytes: u64) -> Result<Resource> {
        let options = AttributeOptions::new().with(MEMORY_RESERVE_KEY, bytes);
        self.dispatcher
            .perform(ActionKind::SetMemoryReserve, &self.href, &options)
    }

    /// Sets the memory size, in bytes.
    pub fn set_memory(&self, bytes: u64) -> Result<Resource> {
        let options = AttributeOptions::new().with(MEMORY_KEY, bytes);
        self.dispatcher
            .perform(ActionKind::SetMemory, &self.href, &options)
    }

    pub fn set_description(&self, description: &str) -> Result<Resource> {
        let options = AttributeOptions::new().with(DESCRIPTION_KEY, description);
        self.dispatcher
            .perform(ActionKind::SetDescription, &self.href, &options)
    }

    /// Attaches a floppy payload made of `(file name, content)` pairs.
    pub fn attach_floppy(&self, files: &[(&str, &str)]) -> Result<Resource> {
        let options: AttributeOptions = files.iter().copied().collect();
        self.dispatcher
            .perform_with_query(ActionKind::AttachFloppy, &self.href, &options)
    }

    pub fn detach_floppy(&self) -> Result<Resource> {
        self.dispatcher
            .perform_with_query(ActionKind::DetachFloppy, &self.href, &AttributeOptions::new())
    }

    /// Sets first-boot initialization from cloud-config text. Needs API 3.4.
    pub fn set_cloud_init(&self, content: &str) -> Result<Resource> {
        let options = AttributeOptions::new().with(INITIALIZATION_KEY, content);
        self.dispatcher
            .perform_with_query(ActionKind::SetInitialization, &self.href, &options)
    }

    pub fn start(&self) -> Result<Resource> {
        self.operation(ActionKind::Start)
    }

    /// Fails with [`VirtError::VmNotRunning`](crate::VirtError::VmNotRunning)
    /// when the VM is already down.
    pub fn stop(&self) -> Result<Resource> {
        self.operation(ActionKind::Stop)
    }

    pub fn shutdown(&self) -> Result<Resource> {
        self.operation(ActionKind::Shutdown)
    }

    pub fn suspend(&self) -> Result<Resource> {
        self.operation(ActionKind::Suspend)
    }

    fn operation(&self, action: ActionKind) -> Result<Resource> {
        self.dispatcher
            .perform(action, &self.href, &AttributeOptions::new())
    }
}
