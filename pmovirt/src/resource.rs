//! Resource representation returned by a successful action.

use std::io::BufReader;

use xmltree::Element;

/// Server answer to a successful action.
///
/// The body is kept verbatim; when it is XML the parsed tree is available
/// for the few lookups callers usually need.
#[derive(Debug, Clone)]
pub struct Resource {
    pub status: u16,
    pub raw_body: String,
    pub root: Option<Element>,
}

impl Resource {
    pub fn new(status: u16, raw_body: String) -> Self {
        let root = if raw_body.trim().is_empty() {
            None
        } else {
            Element::parse(BufReader::new(raw_body.as_bytes())).ok()
        };
        Self {
            status,
            raw_body,
            root,
        }
    }

    /// Root element name (`vm`, `disk`, `action`...).
    pub fn kind(&self) -> Option<&str> {
        self.root.as_ref().map(|root| root.name.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn href(&self) -> Option<&str> {
        self.attribute("href")
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.root
            .as_ref()
            .and_then(|root| root.attributes.get(name))
            .map(String::as_str)
    }

    /// Text of the element reached by following `path` from the root.
    pub fn child_text(&self, path: &[&str]) -> Option<String> {
        let mut current = self.root.as_ref()?;
        for name in path {
            current = current.get_child(*name)?;
        }
        current
            .get_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
