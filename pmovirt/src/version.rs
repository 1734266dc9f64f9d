//! Server version and the wire-format variants it selects.

use std::fmt;
use std::io::BufReader;

use tracing::debug;
use xmltree::Element;

use crate::errors::{Result, VirtError};

/// First API level that removes payloads with an empty `<payloads/>` and
/// nests floppy files under `<files>`.
pub const MODERN_PAYLOADS_SINCE: (u32, u32) = (3, 3);

/// First API level that accepts an `<initialization>` block.
pub const INITIALIZATION_SINCE: (u32, u32) = (3, 4);

/// Version reported by the server's product info.
///
/// Only `(major, minor)` drive behaviour; build and revision are kept for
/// logging and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl ServerVersion {
    pub fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parses the four components as reported by the API (they arrive as
    /// strings). Missing build/revision count as 0.
    pub fn from_parts(
        major: &str,
        minor: &str,
        build: Option<&str>,
        revision: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            major: parse_component("major", major)?,
            minor: parse_component("minor", minor)?,
            build: build.map(|b| parse_component("build", b)).transpose()?.unwrap_or(0),
            revision: revision
                .map(|r| parse_component("revision", r))
                .transpose()?
                .unwrap_or(0),
        })
    }

    /// Extracts the version from the API entry point document
    /// (`<api><product_info><version .../></product_info></api>`).
    ///
    /// 3.x servers carry the components as attributes, 4.x servers as child
    /// elements; both are accepted.
    pub fn from_api_xml(xml: &str) -> Result<Self> {
        let root = Element::parse(BufReader::new(xml.as_bytes()))?;
        let version = root
            .get_child("product_info")
            .and_then(|info| info.get_child("version"))
            .ok_or_else(|| VirtError::InvalidVersion("missing product_info/version".into()))?;

        let field = |name: &str| -> Option<String> {
            version.attributes.get(name).cloned().or_else(|| {
                version
                    .get_child(name)
                    .and_then(|child| child.get_text())
                    .map(|text| text.trim().to_string())
            })
        };

        let major = field("major")
            .ok_or_else(|| VirtError::InvalidVersion("missing major component".into()))?;
        let minor = field("minor")
            .ok_or_else(|| VirtError::InvalidVersion("missing minor component".into()))?;
        let build = field("build");
        let revision = field("revision");

        let parsed = Self::from_parts(&major, &minor, build.as_deref(), revision.as_deref())?;
        debug!(version = %parsed, "Parsed API product version");
        Ok(parsed)
    }

    /// Lexicographic comparison on `(major, minor)` as integers.
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

fn parse_component(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| VirtError::InvalidVersion(format!("{name} component '{value}' is not a number")))
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// How removable-media payloads are shaped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Before 3.3: a detached floppy is an empty `<payload type="floppy"/>`,
    /// files are `<file name="...">` elements.
    Legacy,
    /// 3.3 and later: detach sends an empty `<payloads/>`, files are wrapped
    /// in `<files>` with a `<name>` child.
    Modern,
}

/// Behaviour variants resolved once from a discovered [`ServerVersion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionPolicy {
    version: ServerVersion,
    payload_shape: PayloadShape,
    initialization: bool,
}

impl VersionPolicy {
    pub fn resolve(version: ServerVersion) -> Self {
        let (modern_major, modern_minor) = MODERN_PAYLOADS_SINCE;
        let (init_major, init_minor) = INITIALIZATION_SINCE;

        let payload_shape = if version.at_least(modern_major, modern_minor) {
            PayloadShape::Modern
        } else {
            PayloadShape::Legacy
        };

        Self {
            version,
            payload_shape,
            initialization: version.at_least(init_major, init_minor),
        }
    }

    pub fn version(&self) -> ServerVersion {
        self.version
    }

    pub fn payload_shape(&self) -> PayloadShape {
        self.payload_shape
    }

    pub fn supports_initialization(&self) -> bool {
        self.initialization
    }

    /// Fails with [`VirtError::UnsupportedVersion`] when the server does not
    /// accept `<initialization>`.
    pub fn require_initialization(&self, action: &str) -> Result<()> {
        if self.initialization {
            return Ok(());
        }
        let (required_major, required_minor) = INITIALIZATION_SINCE;
        Err(VirtError::UnsupportedVersion {
            action: action.to_string(),
            required_major,
            required_minor,
            found: self.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape_switches_at_3_3() {
        let legacy = VersionPolicy::resolve(ServerVersion::new(3, 0, 0, 0));
        assert_eq!(legacy.payload_shape(), PayloadShape::Legacy);

        let legacy = VersionPolicy::resolve(ServerVersion::new(3, 2, 9, 9));
        assert_eq!(legacy.payload_shape(), PayloadShape::Legacy);

        let modern = VersionPolicy::resolve(ServerVersion::new(3, 3, 0, 0));
        assert_eq!(modern.payload_shape(), PayloadShape::Modern);

        let modern = VersionPolicy::resolve(ServerVersion::new(4, 0, 0, 0));
        assert_eq!(modern.payload_shape(), PayloadShape::Modern);
    }

    #[test]
    fn comparison_is_numeric_not_textual() {
        // "10" < "3" as strings
        let version = ServerVersion::from_parts("3", "10", None, None).unwrap();
        assert!(version.at_least(3, 4));
        assert_eq!(
            VersionPolicy::resolve(version).payload_shape(),
            PayloadShape::Modern
        );
    }

    #[test]
    fn initialization_requires_3_4() {
        let old = VersionPolicy::resolve(ServerVersion::new(3, 3, 0, 0));
        assert!(!old.supports_initialization());
        let err = old.require_initialization("set_initialization").unwrap_err();
        assert!(matches!(
            err,
            VirtError::UnsupportedVersion {
                required_major: 3,
                required_minor: 4,
                ..
            }
        ));

        let new = VersionPolicy::resolve(ServerVersion::new(3, 4, 0, 0));
        assert!(new.require_initialization("set_initialization").is_ok());
    }

    #[test]
    fn parses_attribute_style_product_info() {
        let xml = r#"<api>
  <product_info>
    <name>oVirt Engine</name>
    <version major="3" minor="4" build="0" revision="0"/>
  </product_info>
</api>"#;
        let version = ServerVersion::from_api_xml(xml).unwrap();
        assert_eq!(version, ServerVersion::new(3, 4, 0, 0));
    }

    #[test]
    fn parses_element_style_product_info() {
        let xml = r#"<api>
  <product_info>
    <version>
      <build>2</build>
      <full_version>4.3.2</full_version>
      <major>4</major>
      <minor>3</minor>
      <revision>0</revision>
    </version>
  </product_info>
</api>"#;
        let version = ServerVersion::from_api_xml(xml).unwrap();
        assert_eq!(version, ServerVersion::new(4, 3, 2, 0));
    }

    #[test]
    fn rejects_missing_version() {
        let err = ServerVersion::from_api_xml("<api/>").unwrap_err();
        assert!(matches!(err, VirtError::InvalidVersion(_)));

        let err = ServerVersion::from_parts("three", "0", None, None).unwrap_err();
        assert!(matches!(err, VirtError::InvalidVersion(_)));
    }
}
