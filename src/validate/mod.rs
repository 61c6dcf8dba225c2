//! Severity-tiered rule engine over decoded artifact definitions.
//!
//! Rules run in a single linear pass and append [`Flaw`] values; nothing
//! is ever thrown. Global rules see the whole corpus (uniqueness, group
//! references, cycles, parameter coverage), per-file rules check the raw
//! file text, and per-artifact/per-source rules check one definition at a
//! time. The returned list is sorted for deterministic output.

mod artifact;
mod global;
mod source;
mod syntax;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::decode;
use crate::definitions::ArtifactDefinition;
use crate::knowledge::OperatingSystem;

/// Severity level of a flaw, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// Common, mostly cosmetic findings.
    Common,
    /// Style violations that will not create any issues.
    Info,
    /// Will work but might create unexpected results.
    Warning,
    /// Will likely break processing.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Common => "COMMON",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "{label}")
    }
}

/// A single authoring defect found by the validator.
///
/// `artifact` is empty for whole-file findings, `file` is empty for
/// whole-corpus findings. Flaws are plain values and never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flaw {
    pub severity: Severity,
    pub message: String,
    pub artifact: String,
    pub file: String,
}

/// Collects flaws over one validation pass.
pub(crate) struct Validator {
    flaws: Vec<Flaw>,
}

impl Validator {
    fn new() -> Validator {
        Validator { flaws: Vec::new() }
    }

    fn add(&mut self, severity: Severity, file: &str, artifact: &str, message: String) {
        self.flaws.push(Flaw {
            severity,
            message,
            artifact: artifact.to_string(),
            file: file.to_string(),
        });
    }

    pub(crate) fn add_common(&mut self, file: &str, artifact: &str, message: String) {
        self.add(Severity::Common, file, artifact, message);
    }

    pub(crate) fn add_info(&mut self, file: &str, artifact: &str, message: String) {
        self.add(Severity::Info, file, artifact, message);
    }

    pub(crate) fn add_warning(&mut self, file: &str, artifact: &str, message: String) {
        self.add(Severity::Warning, file, artifact, message);
    }

    pub(crate) fn add_error(&mut self, file: &str, artifact: &str, message: String) {
        self.add(Severity::Error, file, artifact, message);
    }
}

/// Decode and validate a set of definition files with the default strict
/// decoder.
///
/// An unreadable or undecodable file is reported as an Error flaw and
/// does not abort validation of the remaining files.
pub fn validate_files(paths: &[PathBuf]) -> Vec<Flaw> {
    validate_files_with(paths, &decode::Decoder::new())
}

/// [`validate_files`] with an explicit decoder, e.g. a non-strict one.
pub fn validate_files_with(paths: &[PathBuf], decoder: &decode::Decoder) -> Vec<Flaw> {
    let mut corpus: BTreeMap<String, Vec<ArtifactDefinition>> = BTreeMap::new();
    let mut flaws = Vec::new();

    for path in paths {
        let filename = path.to_string_lossy().into_owned();
        match decoder.decode_file(path) {
            Ok((definitions, decode_flaws)) => {
                flaws.extend(decode_flaws);
                corpus.insert(filename, definitions);
            }
            Err(err) => {
                flaws.push(Flaw {
                    severity: Severity::Error,
                    message: format!("Error {err:#}"),
                    artifact: String::new(),
                    file: filename.clone(),
                });
                corpus.insert(filename, Vec::new());
            }
        }
    }

    flaws.extend(validate_definitions(&corpus));
    sort_flaws(&mut flaws);
    flaws
}

/// Validate an already decoded corpus, keyed by origin filename. An empty
/// filename skips the per-file syntax rules for that entry.
pub fn validate_definitions(corpus: &BTreeMap<String, Vec<ArtifactDefinition>>) -> Vec<Flaw> {
    let mut validator = Validator::new();

    let mut all_definitions = Vec::new();
    for (filename, definitions) in corpus {
        if !filename.is_empty() {
            validator.validate_syntax(Path::new(filename));
        }
        for definition in definitions {
            validator.validate_artifact_definition(filename, definition);
        }
        all_definitions.extend(definitions.iter().cloned());
    }

    validator.validate_name_unique(&all_definitions);
    validator.validate_registry_key_unique(&all_definitions);
    validator.validate_registry_value_unique(&all_definitions);
    validator.validate_group_members_exist(&all_definitions);
    validator.validate_no_cycles(&all_definitions);
    validator.validate_parameters_provided(&all_definitions);

    let mut flaws = validator.flaws;
    sort_flaws(&mut flaws);
    flaws
}

fn sort_flaws(flaws: &mut [Flaw]) {
    flaws.sort_by(|a, b| {
        (&a.file, &a.artifact, a.severity, &a.message)
            .cmp(&(&b.file, &b.artifact, b.severity, &b.message))
    });
}

impl Validator {
    /// Per-artifact and per-source rules for one definition.
    fn validate_artifact_definition(&mut self, filename: &str, definition: &ArtifactDefinition) {
        let windows_artifact =
            crate::filter::is_os_supported(OperatingSystem::Windows, &definition.supported_os);
        let linux_artifact =
            crate::filter::is_os_supported(OperatingSystem::Linux, &definition.supported_os);
        let macos_artifact =
            crate::filter::is_os_supported(OperatingSystem::Darwin, &definition.supported_os);

        self.validate_name_case(filename, definition);
        self.validate_name_type_suffix(filename, definition);
        self.validate_doc_long(filename, definition);
        self.validate_name_prefix(filename, definition);
        self.validate_os_specific_file(filename, definition);
        self.validate_artifact_os(filename, definition);
        self.validate_artifact_labels(filename, definition);
        self.validate_no_definition_conditions(filename, definition);
        self.validate_no_definition_provides(filename, definition);
        self.validate_urls(filename, definition);
        if macos_artifact {
            self.validate_macos_double_path(filename, definition);
        }

        for source in &definition.sources {
            let windows_source =
                crate::filter::is_os_supported(OperatingSystem::Windows, &source.supported_os);
            let linux_source =
                crate::filter::is_os_supported(OperatingSystem::Linux, &source.supported_os);
            let macos_source =
                crate::filter::is_os_supported(OperatingSystem::Darwin, &source.supported_os);

            self.validate_unnecessary_attributes(filename, &definition.name, source);
            self.validate_required_attributes(filename, &definition.name, source);
            self.validate_deprecated_vars(filename, &definition.name, source);
            self.validate_registry_current_control_set(filename, &definition.name, source);
            self.validate_registry_hkey_current_user(filename, &definition.name, source);
            self.validate_source_os(filename, &definition.name, source);
            self.validate_source_type(filename, &definition.name, source);
            self.validate_parameters_known(filename, &definition.name, source);
            self.validate_source_provides(filename, &definition.name, source);

            if windows_artifact && windows_source {
                self.validate_no_windows_homedir(filename, &definition.name, source);
                self.validate_required_windows_attributes(filename, &definition.name, source);
            }
            if (linux_artifact || macos_artifact) && (linux_source || macos_source) {
                self.validate_required_non_windows_attributes(filename, &definition.name, source);
            }
        }
    }
}
