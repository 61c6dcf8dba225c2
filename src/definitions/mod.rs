//! Typed document model for forensic artifact definitions.
//!
//! An artifact definition names one or more collection sources (file sets,
//! registry keys, commands, WMI queries or groups of other definitions).
//! The model is deliberately permissive: the decoder accepts any attribute
//! combination and the validator polices semantic fitness afterwards.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A Windows Registry key path and value name that can be collected.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct KeyValuePair {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A knowledge base entry that a source claims to populate.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Provide {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub regex: String,
    #[serde(default)]
    pub wmi_key: String,
}

/// Source attributes. Only a subset of fields is meaningful per source
/// type; populating the others is a validation flaw, not a decode error.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    /// Member definition names of an artifact group.
    #[serde(default)]
    pub names: Vec<String>,
    /// File, directory or path locations, may contain `%%parameter%%`
    /// placeholders and glob patterns.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Path separator used in `paths`, either `\` or empty.
    #[serde(default)]
    pub separator: String,
    /// Command binary.
    #[serde(default)]
    pub cmd: String,
    /// Command arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Registry key paths.
    #[serde(default)]
    pub keys: Vec<String>,
    /// WMI query string.
    #[serde(default)]
    pub query: String,
    /// WMI base object.
    #[serde(default)]
    pub base_object: String,
    /// Registry key and value name pairs.
    #[serde(default)]
    pub key_value_pairs: Vec<KeyValuePair>,
}

/// The closed set of source kinds.
///
/// `Unknown` is only ever produced by the decoder for a wire string that
/// does not name a known kind, so an authoring typo surfaces as a validator
/// flaw instead of aborting the decode. Rule code matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceType {
    ArtifactGroup,
    Command,
    Directory,
    File,
    Path,
    RegistryKey,
    RegistryValue,
    Wmi,
    Unknown(String),
}

impl SourceType {
    /// All valid source kinds in wire order.
    pub const KNOWN: [SourceType; 8] = [
        SourceType::ArtifactGroup,
        SourceType::Command,
        SourceType::Directory,
        SourceType::File,
        SourceType::Path,
        SourceType::RegistryKey,
        SourceType::RegistryValue,
        SourceType::Wmi,
    ];

    /// The wire representation, e.g. `ARTIFACT_GROUP`.
    pub fn as_str(&self) -> &str {
        match self {
            SourceType::ArtifactGroup => "ARTIFACT_GROUP",
            SourceType::Command => "COMMAND",
            SourceType::Directory => "DIRECTORY",
            SourceType::File => "FILE",
            SourceType::Path => "PATH",
            SourceType::RegistryKey => "REGISTRY_KEY",
            SourceType::RegistryValue => "REGISTRY_VALUE",
            SourceType::Wmi => "WMI",
            SourceType::Unknown(other) => other,
        }
    }

    /// Parse a wire string, falling back to `Unknown` for anything else.
    pub fn from_wire(value: &str) -> SourceType {
        match value {
            "ARTIFACT_GROUP" => SourceType::ArtifactGroup,
            "COMMAND" => SourceType::Command,
            "DIRECTORY" => SourceType::Directory,
            "FILE" => SourceType::File,
            "PATH" => SourceType::Path,
            "REGISTRY_KEY" => SourceType::RegistryKey,
            "REGISTRY_VALUE" => SourceType::RegistryValue,
            "WMI" => SourceType::Wmi,
            other => SourceType::Unknown(other.to_string()),
        }
    }

    /// Whether the wire string named a known kind.
    pub fn is_known(&self) -> bool {
        !matches!(self, SourceType::Unknown(_))
    }
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Unknown(String::new())
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SourceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = SourceType;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a source type string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<SourceType, E> {
                Ok(SourceType::from_wire(value))
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

/// One typed collection target inside an artifact definition.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Source {
    #[serde(rename = "type", default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub attributes: Attributes,
    /// Deprecated in the wire format, kept so the validator can flag it.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Narrows the owning definition's OS set for this source only.
    #[serde(default)]
    pub supported_os: Vec<String>,
    #[serde(default)]
    pub provides: Vec<Provide>,
}

impl Source {
    /// An empty source of the given kind.
    pub fn new(source_type: SourceType) -> Source {
        Source {
            source_type,
            ..Source::default()
        }
    }
}

/// A named, declarative description of one or more collection sources.
///
/// Name uniqueness across a corpus is enforced by the validator, not
/// structurally. An empty `supported_os` means the definition applies to
/// every operating system.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ArtifactDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Deprecated in the wire format, kept so the validator can flag it.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Deprecated in the wire format, kept so the validator can flag it.
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub supported_os: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}
