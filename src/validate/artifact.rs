//! Per-artifact rules: naming, docs, OS and label enumerations,
//! deprecated fields, URLs and macOS path conventions.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use super::Validator;
use crate::constants::URL_CHECK_TIMEOUT_SECS;
use crate::definitions::{ArtifactDefinition, SourceType};
use crate::filter::is_os_supported;
use crate::knowledge::{OperatingSystem, LABELS};

/// OS hinted by a definition filename like `windows_registry.yaml`.
fn filename_os(filename: &str) -> Option<(&'static str, OperatingSystem)> {
    let base = Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if base.starts_with("windows") {
        Some(("Windows", OperatingSystem::Windows))
    } else if base.starts_with("linux") {
        Some(("Linux", OperatingSystem::Linux))
    } else if base.starts_with("macos") {
        Some(("MacOS", OperatingSystem::Darwin))
    } else {
        None
    }
}

impl Validator {
    pub(crate) fn validate_name_case(&mut self, filename: &str, definition: &ArtifactDefinition) {
        if definition.name.len() < 2 {
            self.add_error(
                filename,
                &definition.name,
                "Artifact names must be longer than 2 characters".to_string(),
            );
            return;
        }
        let first = &definition.name[..1];
        if first.to_uppercase() != first {
            self.add_info(
                filename,
                &definition.name,
                "Artifact names should be CamelCase".to_string(),
            );
        }
        if definition.name.contains(' ') || definition.name.contains('\t') {
            self.add_info(
                filename,
                &definition.name,
                "Artifact names should not contain whitespace".to_string(),
            );
        }
    }

    /// Definitions whose sources all share one type should carry a
    /// matching name suffix, e.g. all-FILE definitions end in File(s).
    pub(crate) fn validate_name_type_suffix(
        &mut self,
        filename: &str,
        definition: &ArtifactDefinition,
    ) {
        let Some(first) = definition.sources.first() else {
            self.add_error(
                filename,
                &definition.name,
                "Artifact has no sources".to_string(),
            );
            return;
        };
        if definition
            .sources
            .iter()
            .any(|source| source.source_type != first.source_type)
        {
            return;
        }

        let endings: &[&str] = match first.source_type {
            SourceType::Command => &["Command", "Commands"],
            SourceType::Directory => &["Directory", "Directories"],
            SourceType::File => &["File", "Files"],
            SourceType::Path => &["Path", "Paths"],
            SourceType::RegistryKey => &["RegistryKey", "RegistryKeys"],
            SourceType::RegistryValue => &["RegistryValue", "RegistryValues"],
            SourceType::ArtifactGroup | SourceType::Wmi | SourceType::Unknown(_) => return,
        };

        let trimmed = definition.name.trim();
        if !endings.iter().any(|ending| trimmed.ends_with(ending)) {
            self.add_common(
                filename,
                &definition.name,
                format!("Artifact name should end in {}", endings.join(" or ")),
            );
        }
    }

    pub(crate) fn validate_doc_long(&mut self, filename: &str, definition: &ArtifactDefinition) {
        if definition.doc.contains('\n') && !definition.doc.contains("\n\n") {
            self.add_info(
                filename,
                &definition.name,
                "Long docs should contain an empty line".to_string(),
            );
        }
    }

    /// Artifacts in OS-prefixed files should carry that OS as a name
    /// prefix.
    pub(crate) fn validate_name_prefix(&mut self, filename: &str, definition: &ArtifactDefinition) {
        let Some((prefix, _)) = filename_os(filename) else {
            return;
        };
        if !definition.name.starts_with(prefix) {
            self.add_common(
                filename,
                &definition.name,
                format!("Artifact name should start with {prefix}"),
            );
        }
    }

    /// OS-prefixed files should only contain artifacts for that OS.
    pub(crate) fn validate_os_specific_file(
        &mut self,
        filename: &str,
        definition: &ArtifactDefinition,
    ) {
        let Some((_, os)) = filename_os(filename) else {
            return;
        };

        let mismatch = definition
            .supported_os
            .iter()
            .chain(
                definition
                    .sources
                    .iter()
                    .flat_map(|source| source.supported_os.iter()),
            )
            .any(|supported| !os.matches(supported));
        if mismatch {
            self.add_info(
                filename,
                &definition.name,
                format!(
                    "File should only contain {} artifact definitions",
                    os.as_str()
                ),
            );
        }
    }

    pub(crate) fn validate_artifact_os(&mut self, filename: &str, definition: &ArtifactDefinition) {
        for supported in &definition.supported_os {
            if !OperatingSystem::is_valid(supported) {
                self.add_warning(
                    filename,
                    &definition.name,
                    format!("OS {supported} is not valid"),
                );
            }
        }
    }

    pub(crate) fn validate_artifact_labels(
        &mut self,
        filename: &str,
        definition: &ArtifactDefinition,
    ) {
        for label in &definition.labels {
            if !LABELS.contains(&label.as_str()) {
                self.add_warning(
                    filename,
                    &definition.name,
                    format!("Label {label} is not valid"),
                );
            }
        }
    }

    pub(crate) fn validate_no_definition_conditions(
        &mut self,
        filename: &str,
        definition: &ArtifactDefinition,
    ) {
        if !definition.conditions.is_empty() {
            self.add_info(
                filename,
                &definition.name,
                "Definition conditions are deprecated".to_string(),
            );
        }
    }

    pub(crate) fn validate_no_definition_provides(
        &mut self,
        filename: &str,
        definition: &ArtifactDefinition,
    ) {
        if !definition.provides.is_empty() {
            self.add_info(
                filename,
                &definition.name,
                "Definition provides are deprecated".to_string(),
            );
        }
    }

    /// Best-effort reachability check for reference URLs. Failures are
    /// Common flaws; the pass never aborts on network problems.
    pub(crate) fn validate_urls(&mut self, filename: &str, definition: &ArtifactDefinition) {
        if definition.urls.is_empty() {
            return;
        }
        let client = match reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(URL_CHECK_TIMEOUT_SECS))
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                self.add_common(
                    filename,
                    &definition.name,
                    format!("Error creating http client: {err}"),
                );
                return;
            }
        };

        for url in &definition.urls {
            match client.get(url).send() {
                Ok(response) => {
                    let status = response.status();
                    if status != reqwest::StatusCode::OK {
                        self.add_common(
                            filename,
                            &definition.name,
                            format!("Status code retrieving url {url} was {}", status.as_u16()),
                        );
                    }
                }
                Err(err) => {
                    self.add_common(
                        filename,
                        &definition.name,
                        format!("Error retrieving url {url}: {err}"),
                    );
                }
            }
        }
    }

    /// On macOS `/var`, `/tmp` and `/etc` are symlinks into `/private`;
    /// a definition listing only one of the two spellings likely misses
    /// data.
    pub(crate) fn validate_macos_double_path(
        &mut self,
        filename: &str,
        definition: &ArtifactDefinition,
    ) {
        const PREFIXES: [&str; 3] = ["/var", "/tmp", "/etc"];

        let mut known = BTreeSet::new();
        if is_os_supported(OperatingSystem::Darwin, &definition.supported_os) {
            for source in &definition.sources {
                if !is_os_supported(OperatingSystem::Darwin, &source.supported_os) {
                    continue;
                }
                for path in &source.attributes.paths {
                    let bare_or_private = PREFIXES.iter().any(|prefix| {
                        path.starts_with(prefix)
                            || path.starts_with(&format!("/private{prefix}"))
                    });
                    if bare_or_private {
                        known.insert(path.clone());
                    }
                }
            }
        }

        for path in &known {
            let sibling = if let Some(rest) = path.strip_prefix("/private") {
                rest.to_string()
            } else {
                format!("/private{path}")
            };
            if !known.contains(&sibling) {
                self.add_warning(
                    filename,
                    &definition.name,
                    format!("Found {path} but not {sibling}"),
                );
            }
        }
    }
}
