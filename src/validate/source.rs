//! Per-source rules: attribute fitness, OS-specific requirements,
//! deprecated variables and registry conventions.

use super::Validator;
use crate::definitions::{Source, SourceType};
use crate::expand::resolver::PLACEHOLDER;
use crate::knowledge::{self, OperatingSystem};

impl Validator {
    /// Attributes that are meaningless for the source type are flagged,
    /// e.g. `paths` on a REGISTRY_KEY source.
    pub(crate) fn validate_unnecessary_attributes(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        let attributes = &source.attributes;
        let has_names = !attributes.names.is_empty();
        let has_command = !attributes.cmd.is_empty() || !attributes.args.is_empty();
        let has_paths = !attributes.paths.is_empty() || !attributes.separator.is_empty();
        let has_keys = !attributes.keys.is_empty();
        let has_key_value_pairs = !attributes.key_value_pairs.is_empty();
        let has_wmi = !attributes.query.is_empty() || !attributes.base_object.is_empty();

        let unnecessary = match source.source_type {
            SourceType::ArtifactGroup => {
                has_paths || has_command || has_keys || has_wmi || has_key_value_pairs
            }
            SourceType::Command => {
                has_names || has_paths || has_keys || has_wmi || has_key_value_pairs
            }
            SourceType::Directory | SourceType::File | SourceType::Path => {
                has_names || has_command || has_keys || has_wmi || has_key_value_pairs
            }
            SourceType::RegistryKey => {
                has_names || has_paths || has_command || has_wmi || has_key_value_pairs
            }
            SourceType::RegistryValue => {
                has_names || has_paths || has_command || has_keys || has_wmi
            }
            SourceType::Wmi => {
                has_names || has_paths || has_command || has_keys || has_key_value_pairs
            }
            SourceType::Unknown(_) => false,
        };
        if unnecessary {
            self.add_warning(filename, artifact, "Unnecessary attribute set".to_string());
        }
    }

    pub(crate) fn validate_required_attributes(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        match source.source_type {
            SourceType::ArtifactGroup => {
                if source.attributes.names.is_empty() {
                    self.add_warning(
                        filename,
                        artifact,
                        "An ARTIFACT_GROUP requires the names attribute".to_string(),
                    );
                }
            }
            SourceType::Command => {
                if source.attributes.cmd.is_empty() {
                    self.add_warning(
                        filename,
                        artifact,
                        "A COMMAND requires the cmd attribute".to_string(),
                    );
                }
            }
            _ => {}
        }
    }

    /// Windows sources need their type's location attribute populated and
    /// a backslash (or empty) separator.
    pub(crate) fn validate_required_windows_attributes(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        let source_type = &source.source_type;
        match source_type {
            SourceType::Directory | SourceType::File | SourceType::Path => {
                if source.attributes.paths.is_empty() {
                    self.add_warning(
                        filename,
                        artifact,
                        format!("A {source_type} requires the paths attribute"),
                    );
                }
                if !source.attributes.separator.is_empty() && source.attributes.separator != "\\" {
                    self.add_warning(
                        filename,
                        artifact,
                        format!("A {source_type} requires a separator value of \"\\\" or \"\""),
                    );
                }
            }
            SourceType::RegistryKey => {
                if source.attributes.keys.is_empty() {
                    self.add_warning(
                        filename,
                        artifact,
                        format!("A {source_type} requires the keys attribute"),
                    );
                }
            }
            SourceType::RegistryValue => {
                if source.attributes.key_value_pairs.is_empty() {
                    self.add_warning(
                        filename,
                        artifact,
                        format!("A {source_type} requires the key_value_pairs attribute"),
                    );
                }
            }
            SourceType::Wmi => {
                if source.attributes.query.is_empty() {
                    self.add_warning(
                        filename,
                        artifact,
                        format!("A {source_type} requires the query attribute"),
                    );
                }
            }
            SourceType::ArtifactGroup | SourceType::Command | SourceType::Unknown(_) => {}
        }
    }

    /// Non-Windows sources need paths for location types and must not use
    /// the Windows-only registry and WMI types at all.
    pub(crate) fn validate_required_non_windows_attributes(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        let source_type = &source.source_type;
        match source_type {
            SourceType::Directory | SourceType::File | SourceType::Path => {
                if source.attributes.paths.is_empty() {
                    self.add_warning(
                        filename,
                        artifact,
                        format!("A {source_type} requires the paths attribute"),
                    );
                }
            }
            SourceType::RegistryKey | SourceType::RegistryValue | SourceType::Wmi => {
                self.add_error(
                    filename,
                    artifact,
                    format!("{source_type} only supported for windows"),
                );
            }
            SourceType::ArtifactGroup | SourceType::Command | SourceType::Unknown(_) => {}
        }
    }

    pub(crate) fn validate_registry_current_control_set(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        const MESSAGE: &str = "Registry key should not start with %%CURRENT_CONTROL_SET%%. \
                               Replace %%CURRENT_CONTROL_SET%% with \
                               HKEY_LOCAL_MACHINE\\System\\CurrentControlSet";

        for key in &source.attributes.keys {
            if key.contains("%%CURRENT_CONTROL_SET%%") {
                self.add_info(filename, artifact, MESSAGE.to_string());
            }
        }
        for pair in &source.attributes.key_value_pairs {
            if pair.key.contains("%%CURRENT_CONTROL_SET%%") {
                self.add_info(filename, artifact, MESSAGE.to_string());
            }
        }
    }

    /// `HKEY_CURRENT_USER` depends on the collecting user; definitions
    /// must address user hives through `HKEY_USERS` and `%%users.sid%%`.
    pub(crate) fn validate_registry_hkey_current_user(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        const MESSAGE: &str =
            r"HKEY_CURRENT_USER\ is not supported instead use: HKEY_USERS\%%users.sid%%\";

        for key in &source.attributes.keys {
            if key.starts_with(r"HKEY_CURRENT_USER\") {
                self.add_error(filename, artifact, MESSAGE.to_string());
            }
        }
        for pair in &source.attributes.key_value_pairs {
            if pair.key.starts_with(r"HKEY_CURRENT_USER\") {
                self.add_error(filename, artifact, MESSAGE.to_string());
            }
        }
    }

    pub(crate) fn validate_deprecated_vars(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        const DEPRECATIONS: [(&str, &str); 4] = [
            (r"%%users.userprofile%%\AppData\Local", "%%users.localappdata%%"),
            (r"%%users.userprofile%%\AppData\Roaming", "%%users.appdata%%"),
            (r"%%users.userprofile%%\Application Data", "%%users.appdata%%"),
            (
                r"%%users.userprofile%%\Local Settings\Application Data",
                "%%users.localappdata%%",
            ),
        ];

        for path in &source.attributes.paths {
            for (old, new) in DEPRECATIONS {
                if path.contains(old) {
                    self.add_info(filename, artifact, format!("Replace {old} by {new}"));
                }
            }
        }
    }

    /// `users.homedir` resolves through `/etc/passwd` semantics; Windows
    /// sources should address profiles via `users.userprofile`.
    pub(crate) fn validate_no_windows_homedir(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        let windows_only = source.supported_os.len() == 1
            && OperatingSystem::Windows.matches(&source.supported_os[0]);
        if source.supported_os.is_empty() || windows_only {
            for path in &source.attributes.paths {
                if path.contains("%%users.homedir%%") {
                    self.add_info(
                        filename,
                        artifact,
                        "Replace %%users.homedir%% by %%users.userprofile%%".to_string(),
                    );
                }
            }
        }
    }

    pub(crate) fn validate_source_type(&mut self, filename: &str, artifact: &str, source: &Source) {
        if !source.source_type.is_known() {
            self.add_error(
                filename,
                artifact,
                format!("Type {} is not valid", source.source_type),
            );
        }
    }

    pub(crate) fn validate_source_os(&mut self, filename: &str, artifact: &str, source: &Source) {
        for supported in &source.supported_os {
            if !OperatingSystem::is_valid(supported) {
                self.add_warning(filename, artifact, format!("OS {supported} is not valid"));
            }
        }
    }

    /// Every `%%parameter%%` reference must name a knowledge base entry.
    pub(crate) fn validate_parameters_known(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        let attributes = &source.attributes;
        let values = attributes
            .paths
            .iter()
            .chain(attributes.keys.iter())
            .chain(attributes.key_value_pairs.iter().map(|pair| &pair.key))
            .chain(std::iter::once(&attributes.query));

        for value in values {
            for capture in PLACEHOLDER.captures_iter(value) {
                let parameter = capture.get(1).map(|m| m.as_str()).unwrap_or_default();
                if !knowledge::is_known_parameter(parameter) {
                    self.add_warning(
                        filename,
                        artifact,
                        format!("Parameter {parameter} not found"),
                    );
                }
            }
        }
    }

    /// Groups and directories only aggregate or locate; they cannot
    /// populate knowledge base entries.
    pub(crate) fn validate_source_provides(
        &mut self,
        filename: &str,
        artifact: &str,
        source: &Source,
    ) {
        let aggregating = matches!(
            source.source_type,
            SourceType::ArtifactGroup | SourceType::Directory
        );
        if aggregating && !source.provides.is_empty() {
            self.add_warning(
                filename,
                artifact,
                format!(
                    "{} source should not have a provides key",
                    source.source_type
                ),
            );
        }
    }
}
