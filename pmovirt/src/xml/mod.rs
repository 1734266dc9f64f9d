//! # Module XML - request documents
//!
//! Construction des documents XML envoyés à l'API.
//!
//! - [`XmlDocument`] : arbre ordonné d'éléments, sérialisé avec une
//!   indentation de deux espaces et sans déclaration XML
//! - [`DocumentBuilder`] : une règle de construction par action
//! - [`initialization`] : lecture du texte cloud-config
//!
//! L'ordre des éléments fait partie du contrat : le serveur comme les
//! fixtures de test comparent les documents octet par octet.

pub mod builder;
pub mod initialization;

pub use builder::DocumentBuilder;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::errors::{Result, VirtError};

/// A request body ready to be serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Serializes the document: no declaration, two-space indentation,
    /// `<empty/>` without padding, no trailing newline.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let config = EmitterConfig::new()
            .write_document_declaration(false)
            .perform_indent(true)
            .indent_string("  ")
            .pad_self_closing(false);
        self.root.write_with_config(&mut buf, config)?;

        let xml = String::from_utf8(buf).map_err(|e| VirtError::Xml(e.to_string()))?;
        Ok(xml.trim_end_matches('\n').to_string())
    }
}

/// `<name>text</name>`
pub(crate) fn leaf(name: &str, text: impl Into<String>) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.into()));
    elem
}

/// `<name a="v"/>`
pub(crate) fn empty(name: &str, attributes: &[(&str, &str)]) -> Element {
    let mut elem = Element::new(name);
    for (key, value) in attributes {
        elem.attributes.insert((*key).to_string(), (*value).to_string());
    }
    elem
}

/// `<name>children...</name>`, children kept in the given order.
pub(crate) fn container(name: &str, children: Vec<Element>) -> Element {
    let mut elem = Element::new(name);
    elem.children
        .extend(children.into_iter().map(XMLNode::Element));
    elem
}

/// Appends `child` to `parent`.
pub(crate) fn push(parent: &mut Element, child: Element) {
    parent.children.push(XMLNode::Element(child));
}
