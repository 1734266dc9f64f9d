//! Interprétation des réponses d'action
//!
//! A response is a fault when its root is `<action>` holding a `<fault>`, or
//! is a bare `<fault>`, whatever HTTP status came with it. Fault details are
//! matched against [`FAULT_PATTERNS`]; unknown details become
//! [`VirtError::ActionFailed`] so nothing is silently swallowed.

use std::io::BufReader;

use tracing::{debug, warn};
use xmltree::Element;

use crate::errors::{Result, VirtError};
use crate::resource::Resource;
use crate::transport::RawResponse;

/// Domain condition a fault detail maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    VmNotRunning,
    VmAlreadyRunning,
    VmNotReadyToBoot,
}

/// Detail substrings and the condition they denote, checked in order.
///
/// "VM is not running" must precede "VM is running".
pub const FAULT_PATTERNS: &[(&str, FaultKind)] = &[
    ("VM is not running", FaultKind::VmNotRunning),
    ("VM is running", FaultKind::VmAlreadyRunning),
    ("VM is being created", FaultKind::VmNotReadyToBoot),
    ("disks are locked", FaultKind::VmNotReadyToBoot),
];

/// Fault payload extracted from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub detail: String,
    pub status: Option<u16>,
}

impl Fault {
    pub fn kind(&self) -> Option<FaultKind> {
        FAULT_PATTERNS
            .iter()
            .find(|(pattern, _)| self.detail.contains(pattern))
            .map(|(_, kind)| *kind)
    }

    pub fn into_error(self) -> VirtError {
        match self.kind() {
            Some(FaultKind::VmNotRunning) => VirtError::VmNotRunning(self.detail),
            Some(FaultKind::VmAlreadyRunning) => VirtError::VmAlreadyRunning(self.detail),
            Some(FaultKind::VmNotReadyToBoot) => VirtError::VmNotReadyToBoot(self.detail),
            None => VirtError::ActionFailed {
                status: self.status,
                detail: self.detail,
            },
        }
    }
}

/// Status 0 is what transports report when they had no status line.
fn known_status(status: u16) -> Option<u16> {
    (status != 0).then_some(status)
}

/// Looks for a fault payload in `body`.
pub fn detect_fault(body: &str, status: Option<u16>) -> Option<Fault> {
    let root = Element::parse(BufReader::new(body.as_bytes())).ok()?;

    let fault = match root.name.as_str() {
        "action" => root.get_child("fault")?,
        "fault" => &root,
        _ => return None,
    };

    let detail = ["detail", "reason"]
        .iter()
        .find_map(|name| {
            fault
                .get_child(*name)
                .and_then(|child| child.get_text())
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        })
        .unwrap_or_else(|| body.trim().to_string());

    Some(Fault { detail, status })
}

/// Turns a raw response into the resource it describes, or the matching
/// error.
pub fn interpret(response: &RawResponse) -> Result<Resource> {
    let status = known_status(response.status);

    if let Some(fault) = detect_fault(&response.body, status) {
        let error = fault.into_error();
        warn!(status = response.status, error = %error, "Action rejected by server");
        return Err(error);
    }

    if response.is_success() {
        debug!(status = response.status, "Action accepted");
        return Ok(Resource::new(response.status, response.body.clone()));
    }

    let detail = match response.body.trim() {
        "" => format!("HTTP status {}", response.status),
        body => body.to_string(),
    };
    warn!(status = response.status, "Action failed without fault payload");
    Err(VirtError::ActionFailed { status, detail })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOT_RUNNING: &str = r#"<action>
    <fault>
        <detail>[Cannot stop VM. VM is not running.]</detail>
    </fault>
</action>"#;

    #[test]
    fn not_running_fault_ignores_status() {
        for status in [200, 400, 409] {
            let err = interpret(&RawResponse::new(status, NOT_RUNNING)).unwrap_err();
            assert!(
                matches!(&err, VirtError::VmNotRunning(detail) if detail == "[Cannot stop VM. VM is not running.]"),
                "status {status}: {err:?}"
            );
        }
    }

    #[test]
    fn already_running_is_not_confused_with_not_running() {
        let body = "<action><fault><detail>[Cannot run VM. VM is running.]</detail></fault></action>";
        let err = interpret(&RawResponse::new(409, body)).unwrap_err();
        assert!(matches!(err, VirtError::VmAlreadyRunning(_)));
    }

    #[test]
    fn unknown_fault_keeps_detail_and_status() {
        let body = "<fault><reason>Operation Failed</reason><detail>[Cannot add Disk. Low disk space.]</detail></fault>";
        let err = interpret(&RawResponse::new(400, body)).unwrap_err();
        match err {
            VirtError::ActionFailed { status, detail } => {
                assert_eq!(status, Some(400));
                assert_eq!(detail, "[Cannot add Disk. Low disk space.]");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fault_without_status_or_detail_is_still_reported() {
        let body = "<action><fault/></action>";
        let err = interpret(&RawResponse::new(0, body)).unwrap_err();
        match err {
            VirtError::ActionFailed { status, detail } => {
                assert_eq!(status, None);
                assert_eq!(detail, body);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn successful_action_is_not_a_fault() {
        let body = "<action><status><state>complete</state></status></action>";
        let resource = interpret(&RawResponse::new(200, body)).unwrap();
        assert_eq!(resource.child_text(&["status", "state"]).as_deref(), Some("complete"));
    }

    #[test]
    fn http_error_without_fault_is_action_failed() {
        let err = interpret(&RawResponse::new(503, "")).unwrap_err();
        assert!(matches!(
            err,
            VirtError::ActionFailed { status: Some(503), ref detail } if detail == "HTTP status 503"
        ));
    }

    #[test]
    fn non_xml_success_body_is_kept_raw() {
        let resource = interpret(&RawResponse::new(200, "ok")).unwrap();
        assert_eq!(resource.raw_body, "ok");
        assert!(resource.root.is_none());
    }
}
