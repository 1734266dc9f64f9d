//! Erreurs du client de gestion de VM

use thiserror::Error;

use crate::version::ServerVersion;

/// Type Result personnalisé pour pmovirt
pub type Result<T> = std::result::Result<T, VirtError>;

/// Errors raised while building, sending or interpreting a VM action.
#[derive(Error, Debug)]
pub enum VirtError {
    /// The document builder has no rule for this action.
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// The server is too old for a version-gated action.
    #[error("{action} requires API {required_major}.{required_minor} or newer (server is {found})")]
    UnsupportedVersion {
        action: String,
        required_major: u32,
        required_minor: u32,
        found: ServerVersion,
    },

    /// A version-sensitive document was requested without a resolved policy.
    #[error("{0} needs the server version to build its request")]
    VersionRequired(String),

    /// A value the document cannot be built without was not supplied.
    #[error("{action} requires the '{key}' option")]
    MissingOption { action: String, key: String },

    #[error("VM is not running: {0}")]
    VmNotRunning(String),

    #[error("VM is already running: {0}")]
    VmAlreadyRunning(String),

    #[error("VM is not ready to boot: {0}")]
    VmNotReadyToBoot(String),

    /// Any other fault reported by the server.
    #[error("Action failed (HTTP status {}): {detail}", display_status(.status))]
    ActionFailed { status: Option<u16>, detail: String },

    /// The request never got an HTTP answer (connect, timeout, IO).
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Invalid server version: {0}")]
    InvalidVersion(String),

    #[error("Invalid initialization data: {0}")]
    InvalidInitialization(String),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

fn display_status(status: &Option<u16>) -> String {
    status
        .map(|code| code.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl VirtError {
    pub fn unsupported_action(action: &str) -> Self {
        VirtError::UnsupportedAction(action.to_string())
    }

    pub fn action_failed(status: Option<u16>, detail: impl Into<String>) -> Self {
        VirtError::ActionFailed {
            status,
            detail: detail.into(),
        }
    }

    /// Vérifie si l'action n'a pas pu être tentée (erreur réseau)
    pub fn is_transport_error(&self) -> bool {
        matches!(self, VirtError::Transport(_))
    }

    /// Vérifie si le serveur a refusé l'action pour une raison métier
    pub fn is_domain_fault(&self) -> bool {
        matches!(
            self,
            VirtError::VmNotRunning(_)
                | VirtError::VmAlreadyRunning(_)
                | VirtError::VmNotReadyToBoot(_)
                | VirtError::ActionFailed { .. }
        )
    }

    /// HTTP status attached to a generic fault, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            VirtError::ActionFailed { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<xmltree::ParseError> for VirtError {
    fn from(err: xmltree::ParseError) -> Self {
        VirtError::Xml(err.to_string())
    }
}

impl From<xmltree::Error> for VirtError {
    fn from(err: xmltree::Error) -> Self {
        VirtError::Xml(err.to_string())
    }
}
