//! YAML decoder boundary.
//!
//! Definition files are multi-document YAML streams. Decoding is
//! forgiving: a structural or type mismatch in a document becomes an
//! Error flaw instead of aborting the corpus, and only I/O failures
//! surface as hard errors. Strict mode (the default) additionally flags
//! unknown fields.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yaml::Value;

use crate::definitions::ArtifactDefinition;
use crate::validate::{Flaw, Severity};

const DEFINITION_FIELDS: [&str; 8] = [
    "name",
    "doc",
    "sources",
    "conditions",
    "provides",
    "labels",
    "supported_os",
    "urls",
];
const SOURCE_FIELDS: [&str; 5] = ["type", "attributes", "conditions", "supported_os", "provides"];
const ATTRIBUTE_FIELDS: [&str; 9] = [
    "names",
    "paths",
    "separator",
    "cmd",
    "args",
    "keys",
    "query",
    "base_object",
    "key_value_pairs",
];
const KEY_VALUE_PAIR_FIELDS: [&str; 2] = ["key", "value"];
const PROVIDE_FIELDS: [&str; 3] = ["key", "regex", "wmi_key"];

/// Reads artifact definitions from YAML document streams.
#[derive(Debug, Clone)]
pub struct Decoder {
    strict: bool,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl Decoder {
    /// A strict decoder: unknown fields are flagged as Error flaws.
    pub fn new() -> Decoder {
        Decoder { strict: true }
    }

    /// Toggle unknown-field checking; non-strict decoding tolerates
    /// extra fields silently.
    pub fn with_strict(strict: bool) -> Decoder {
        Decoder { strict }
    }

    /// Decode every document in `input`. `filename` is only used to
    /// attribute flaws.
    pub fn decode(&self, input: &str, filename: &str) -> (Vec<ArtifactDefinition>, Vec<Flaw>) {
        let mut definitions = Vec::new();
        let mut flaws = Vec::new();

        for document in serde_yaml::Deserializer::from_str(input) {
            let value = match Value::deserialize(document) {
                Ok(value) => value,
                Err(err) => {
                    // The stream is unreliable past a parse error.
                    flaws.push(decode_flaw(filename, format!("{err}")));
                    break;
                }
            };
            if value.is_null() {
                continue;
            }

            if self.strict {
                check_unknown_fields(&value, filename, &mut flaws);
            }

            match serde_yaml::from_value::<ArtifactDefinition>(value) {
                Ok(definition) => definitions.push(definition),
                Err(err) => flaws.push(decode_flaw(filename, format!("{err}"))),
            }
        }

        (definitions, flaws)
    }

    /// Decode from a reader; the read itself is the only hard failure.
    pub fn decode_reader<R: Read>(
        &self,
        mut reader: R,
        filename: &str,
    ) -> Result<(Vec<ArtifactDefinition>, Vec<Flaw>)> {
        let mut input = String::new();
        reader
            .read_to_string(&mut input)
            .context("failed to read definition stream")?;
        Ok(self.decode(&input, filename))
    }

    /// Decode a definition file. I/O failures are hard errors; everything
    /// else is reported as flaws.
    pub fn decode_file(&self, path: &Path) -> Result<(Vec<ArtifactDefinition>, Vec<Flaw>)> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(self.decode(&content, &path.to_string_lossy()))
    }
}

/// Decode a single definition file with the default strict decoder.
pub fn decode_file(path: &Path) -> Result<(Vec<ArtifactDefinition>, Vec<Flaw>)> {
    Decoder::new().decode_file(path)
}

fn decode_flaw(filename: &str, message: String) -> Flaw {
    Flaw {
        severity: Severity::Error,
        message,
        artifact: String::new(),
        file: filename.to_string(),
    }
}

/// Flag mapping keys that are not part of the wire format, walking into
/// sources, attributes, key value pairs and provides.
fn check_unknown_fields(value: &Value, filename: &str, flaws: &mut Vec<Flaw>) {
    check_keys(value, &DEFINITION_FIELDS, "artifact definition", filename, flaws);

    let Some(sources) = value.get("sources").and_then(Value::as_sequence) else {
        return;
    };
    for source in sources {
        check_keys(source, &SOURCE_FIELDS, "source", filename, flaws);

        if let Some(attributes) = source.get("attributes") {
            check_keys(attributes, &ATTRIBUTE_FIELDS, "attributes", filename, flaws);

            if let Some(pairs) = attributes.get("key_value_pairs").and_then(Value::as_sequence) {
                for pair in pairs {
                    check_keys(pair, &KEY_VALUE_PAIR_FIELDS, "key value pair", filename, flaws);
                }
            }
        }

        if let Some(provides) = source.get("provides").and_then(Value::as_sequence) {
            for provide in provides {
                check_keys(provide, &PROVIDE_FIELDS, "provide", filename, flaws);
            }
        }
    }
}

fn check_keys(
    value: &Value,
    allowed: &[&str],
    context: &str,
    filename: &str,
    flaws: &mut Vec<Flaw>,
) {
    let Some(mapping) = value.as_mapping() else {
        return;
    };
    for key in mapping.keys() {
        if let Some(name) = key.as_str() {
            if !allowed.contains(&name) {
                flaws.push(decode_flaw(
                    filename,
                    format!("Field {name} not found in {context}"),
                ));
            }
        }
    }
}
