//! Construction des corps de requête par action

use xmltree::Element;

use super::initialization::InitializationData;
use super::{XmlDocument, container, empty, leaf, push};
use crate::action::ActionKind;
use crate::errors::{Result, VirtError};
use crate::options::{AttributeOptions, DiskOptions, NicOptions};
use crate::version::{PayloadShape, VersionPolicy};

/// Option key carrying the guaranteed memory, in bytes.
pub const MEMORY_RESERVE_KEY: &str = "memory_reserve";
/// Option key carrying the memory size, in bytes.
pub const MEMORY_KEY: &str = "memory";
pub const DESCRIPTION_KEY: &str = "description";
/// Option key carrying the cloud-config text.
pub const INITIALIZATION_KEY: &str = "content";

/// Pure translation of attribute options into request documents.
pub struct DocumentBuilder;

impl DocumentBuilder {
    /// Builds the request body of `action`.
    ///
    /// Version-sensitive actions need the resolved `policy`; without it the
    /// builder fails with [`VirtError::VersionRequired`] rather than guess a
    /// wire shape.
    pub fn build(
        action: ActionKind,
        options: &AttributeOptions,
        policy: Option<&VersionPolicy>,
    ) -> Result<XmlDocument> {
        let root = match action {
            ActionKind::CreateDisk => disk(&DiskOptions::from_attributes(options)),
            ActionKind::CreateNic => nic(&NicOptions::from_attributes(options)),
            ActionKind::SetMemoryReserve => {
                memory_reserve(&required_text(action, options, MEMORY_RESERVE_KEY)?)
            }
            ActionKind::SetMemory => vm_leaf(MEMORY_KEY, required_text(action, options, MEMORY_KEY)?),
            ActionKind::SetDescription => {
                vm_leaf(DESCRIPTION_KEY, required_text(action, options, DESCRIPTION_KEY)?)
            }
            ActionKind::AttachFloppy => {
                let policy = policy.ok_or_else(|| VirtError::VersionRequired(action.to_string()))?;
                let files: Vec<(String, String)> = options
                    .iter()
                    .map(|(name, content)| (name.to_string(), content.to_text()))
                    .collect();
                attach_floppy(policy.payload_shape(), &files)
            }
            ActionKind::DetachFloppy => {
                let policy = policy.ok_or_else(|| VirtError::VersionRequired(action.to_string()))?;
                detach_floppy(policy.payload_shape())
            }
            ActionKind::SetInitialization => {
                let policy = policy.ok_or_else(|| VirtError::VersionRequired(action.to_string()))?;
                policy.require_initialization(action.name())?;
                let content = options.text(INITIALIZATION_KEY).unwrap_or_default();
                initialization(&InitializationData::parse(&content)?)
            }
            ActionKind::Start | ActionKind::Stop | ActionKind::Shutdown | ActionKind::Suspend => {
                Element::new("action")
            }
        };

        Ok(XmlDocument::new(root))
    }
}

fn required_text(action: ActionKind, options: &AttributeOptions, key: &str) -> Result<String> {
    options
        .text(key)
        .ok_or_else(|| VirtError::MissingOption {
            action: action.to_string(),
            key: key.to_string(),
        })
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn disk(options: &DiskOptions) -> Element {
    let mut disk = Element::new("disk");

    let texts = [
        ("name", &options.name),
        ("interface", &options.interface),
        ("format", &options.format),
        ("size", &options.size),
    ];
    for (name, value) in texts {
        if let Some(value) = value {
            push(&mut disk, leaf(name, value.as_str()));
        }
    }

    let flags = [
        ("sparse", options.sparse),
        ("bootable", options.bootable),
        ("wipe_after_delete", options.wipe_after_delete),
        ("propagate_errors", options.propagate_errors),
    ];
    for (name, value) in flags {
        if let Some(value) = value {
            push(&mut disk, leaf(name, bool_text(value)));
        }
    }

    if let Some(storage) = &options.storage {
        push(
            &mut disk,
            container("storage_domains", vec![empty("storage_domain", &[("id", storage.as_str())])]),
        );
    }

    disk
}

fn nic(options: &NicOptions) -> Element {
    let mut nic = Element::new("nic");
    push(&mut nic, leaf("name", options.name.as_str()));

    if let Some(interface) = &options.interface {
        push(&mut nic, leaf("interface", interface.as_str()));
    }
    if let Some(network_id) = &options.network_id {
        push(&mut nic, empty("network", &[("id", network_id.as_str())]));
    }
    if let Some(mac_address) = &options.mac_address {
        push(&mut nic, empty("mac", &[("address", mac_address.as_str())]));
    }

    nic
}

fn memory_reserve(bytes: &str) -> Element {
    container(
        "vm",
        vec![container("memory_policy", vec![leaf("guaranteed", bytes)])],
    )
}

fn vm_leaf(name: &str, text: String) -> Element {
    container("vm", vec![leaf(name, text)])
}

fn detach_floppy(shape: PayloadShape) -> Element {
    let payloads = match shape {
        PayloadShape::Legacy => {
            container("payloads", vec![empty("payload", &[("type", "floppy")])])
        }
        PayloadShape::Modern => Element::new("payloads"),
    };
    container("vm", vec![payloads])
}

fn attach_floppy(shape: PayloadShape, files: &[(String, String)]) -> Element {
    let mut payload = empty("payload", &[("type", "floppy")]);

    match shape {
        PayloadShape::Legacy => {
            for (name, content) in files {
                let mut file = empty("file", &[("name", name.as_str())]);
                push(&mut file, leaf("content", content.as_str()));
                push(&mut payload, file);
            }
        }
        PayloadShape::Modern => {
            let entries = files
                .iter()
                .map(|(name, content)| {
                    container(
                        "file",
                        vec![leaf("name", name.as_str()), leaf("content", content.as_str())],
                    )
                })
                .collect();
            push(&mut payload, container("files", entries));
        }
    }

    container("vm", vec![container("payloads", vec![payload])])
}

fn initialization(data: &InitializationData) -> Element {
    let fields = data
        .fields
        .iter()
        .map(|(name, text)| leaf(name, text.as_str()))
        .collect();
    container("vm", vec![container("initialization", fields)])
}
