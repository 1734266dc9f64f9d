//! Supported VM actions and where each one is sent.

use std::fmt;
use std::str::FromStr;

use crate::errors::VirtError;

/// One supported mutation of a VM resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateDisk,
    CreateNic,
    SetMemoryReserve,
    SetMemory,
    SetDescription,
    AttachFloppy,
    DetachFloppy,
    SetInitialization,
    Start,
    Stop,
    Shutdown,
    Suspend,
}

/// HTTP verb and URL of an action, relative to the VM reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTarget {
    /// POST to `{href}/{collection}`.
    SubCollection(&'static str),
    /// PUT to `{href}`.
    Resource,
    /// POST to `{href}/{operation}`.
    Operation(&'static str),
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        ActionKind::CreateDisk,
        ActionKind::CreateNic,
        ActionKind::SetMemoryReserve,
        ActionKind::SetMemory,
        ActionKind::SetDescription,
        ActionKind::AttachFloppy,
        ActionKind::DetachFloppy,
        ActionKind::SetInitialization,
        ActionKind::Start,
        ActionKind::Stop,
        ActionKind::Shutdown,
        ActionKind::Suspend,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::CreateDisk => "create_disk",
            ActionKind::CreateNic => "create_nic",
            ActionKind::SetMemoryReserve => "set_memory_reserve",
            ActionKind::SetMemory => "set_memory",
            ActionKind::SetDescription => "set_description",
            ActionKind::AttachFloppy => "attach_floppy",
            ActionKind::DetachFloppy => "detach_floppy",
            ActionKind::SetInitialization => "set_initialization",
            ActionKind::Start => "start",
            ActionKind::Stop => "stop",
            ActionKind::Shutdown => "shutdown",
            ActionKind::Suspend => "suspend",
        }
    }

    pub fn target(&self) -> ActionTarget {
        match self {
            ActionKind::CreateDisk => ActionTarget::SubCollection("disks"),
            ActionKind::CreateNic => ActionTarget::SubCollection("nics"),
            ActionKind::SetMemoryReserve
            | ActionKind::SetMemory
            | ActionKind::SetDescription
            | ActionKind::AttachFloppy
            | ActionKind::DetachFloppy
            | ActionKind::SetInitialization => ActionTarget::Resource,
            ActionKind::Start => ActionTarget::Operation("start"),
            ActionKind::Stop => ActionTarget::Operation("stop"),
            ActionKind::Shutdown => ActionTarget::Operation("shutdown"),
            ActionKind::Suspend => ActionTarget::Operation("suspend"),
        }
    }

    /// Whether the request shape depends on the server version.
    pub fn is_version_sensitive(&self) -> bool {
        matches!(
            self,
            ActionKind::AttachFloppy | ActionKind::DetachFloppy | ActionKind::SetInitialization
        )
    }
}

impl ActionTarget {
    /// Absolute or resource-relative URL for a VM reference.
    pub fn url(&self, vm_href: &str) -> String {
        let href = vm_href.trim_end_matches('/');
        match self {
            ActionTarget::SubCollection(suffix) | ActionTarget::Operation(suffix) => {
                format!("{href}/{suffix}")
            }
            ActionTarget::Resource => href.to_string(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = VirtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| VirtError::unsupported_action(s))
    }
}
