//! Orchestration of one action: build, send, interpret.

use tracing::{debug, info};

use crate::action::{ActionKind, ActionTarget};
use crate::errors::Result;
use crate::fault;
use crate::options::AttributeOptions;
use crate::resource::Resource;
use crate::transport::{Transport, VersionDiscovery};
use crate::version::VersionPolicy;
use crate::xml::{DocumentBuilder, XmlDocument};

/// Runs actions against VM resources.
///
/// Stateless: each call builds its own document and issues exactly one
/// mutating request. Version-sensitive actions add one discovery call
/// before it.
pub struct ActionDispatcher<T, V> {
    transport: T,
    versions: V,
}

impl<T: Transport, V: VersionDiscovery> ActionDispatcher<T, V> {
    pub fn new(transport: T, versions: V) -> Self {
        Self {
            transport,
            versions,
        }
    }

    /// Builds and sends an action whose shape does not depend on the
    /// server version.
    pub fn perform(
        &self,
        action: ActionKind,
        vm_href: &str,
        options: &AttributeOptions,
    ) -> Result<Resource> {
        let document = DocumentBuilder::build(action, options, None)?;
        self.send(action, vm_href, &document)
    }

    /// Discovers the server version, resolves the policy, then builds and
    /// sends the action.
    pub fn perform_with_query(
        &self,
        action: ActionKind,
        vm_href: &str,
        options: &AttributeOptions,
    ) -> Result<Resource> {
        let version = self.versions.current_version()?;
        let policy = VersionPolicy::resolve(version);
        debug!(action = %action, version = %version, shape = ?policy.payload_shape(), "Resolved version policy");

        let document = DocumentBuilder::build(action, options, Some(&policy))?;
        self.send(action, vm_href, &document)
    }

    /// Picks [`perform`](Self::perform) or
    /// [`perform_with_query`](Self::perform_with_query) for `action`.
    pub fn run(
        &self,
        action: ActionKind,
        vm_href: &str,
        options: &AttributeOptions,
    ) -> Result<Resource> {
        if action.is_version_sensitive() {
            self.perform_with_query(action, vm_href, options)
        } else {
            self.perform(action, vm_href, options)
        }
    }

    fn send(&self, action: ActionKind, vm_href: &str, document: &XmlDocument) -> Result<Resource> {
        let target = action.target();
        let url = target.url(vm_href);
        let body = document.to_xml_string()?;

        // Initialization data carries the root password
        if action != ActionKind::SetInitialization {
            debug!(action = %action, body = %body, "Request body");
        }

        let response = match target {
            ActionTarget::SubCollection(_) | ActionTarget::Operation(_) => {
                self.transport.post(&url, &body)?
            }
            ActionTarget::Resource => self.transport.put(&url, &body)?,
        };

        let resource = fault::interpret(&response)?;
        info!(action = %action, url = %url, status = response.status, "Action completed");
        Ok(resource)
    }
}
