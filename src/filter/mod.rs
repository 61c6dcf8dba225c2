//! Supported-OS and name based corpus filtering.

use std::collections::HashMap;

use crate::definitions::{ArtifactDefinition, Source};
use crate::expand::expand_artifact_group;
use crate::knowledge::OperatingSystem;

/// Whether a `supported_os` list covers the given platform. An empty list
/// means every platform; comparison is case-insensitive.
pub fn is_os_supported(os: OperatingSystem, supported_os: &[String]) -> bool {
    supported_os.is_empty() || supported_os.iter().any(|entry| os.matches(entry))
}

/// The OS names a source is effective for: its own list if set, else the
/// owning definition's, else every supported OS.
pub fn effective_os(definition: &ArtifactDefinition, source: &Source) -> Vec<String> {
    if !source.supported_os.is_empty() {
        source.supported_os.clone()
    } else if !definition.supported_os.is_empty() {
        definition.supported_os.clone()
    } else {
        OperatingSystem::ALL
            .iter()
            .map(|os| os.as_str().to_string())
            .collect()
    }
}

/// Keep only the definitions (and within them, the sources) that apply to
/// the current platform. Pure and order preserving.
pub fn filter_os(definitions: Vec<ArtifactDefinition>) -> Vec<ArtifactDefinition> {
    filter_os_for(definitions, OperatingSystem::current())
}

/// [`filter_os`] against an explicit platform.
pub fn filter_os_for(
    definitions: Vec<ArtifactDefinition>,
    os: OperatingSystem,
) -> Vec<ArtifactDefinition> {
    definitions
        .into_iter()
        .filter(|definition| is_os_supported(os, &definition.supported_os))
        .map(|mut definition| {
            definition
                .sources
                .retain(|source| is_os_supported(os, &source.supported_os));
            definition
        })
        .collect()
}

/// Reduce a corpus to the definitions reachable from the requested names,
/// flattening artifact groups along the way. Output is sorted by name.
pub fn filter_name(
    names: &[String],
    definitions: Vec<ArtifactDefinition>,
) -> Vec<ArtifactDefinition> {
    let by_name: HashMap<String, ArtifactDefinition> = definitions
        .into_iter()
        .map(|definition| (definition.name.clone(), definition))
        .collect();
    expand_artifact_group(names, &by_name)
        .into_values()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{Attributes, SourceType};

    fn definition(name: &str, supported_os: &[&str], source_os: &[&str]) -> ArtifactDefinition {
        ArtifactDefinition {
            name: name.to_string(),
            supported_os: supported_os.iter().map(|os| os.to_string()).collect(),
            sources: vec![Source {
                source_type: SourceType::File,
                attributes: Attributes {
                    paths: vec!["/tmp/x".to_string()],
                    ..Attributes::default()
                },
                supported_os: source_os.iter().map(|os| os.to_string()).collect(),
                ..Source::default()
            }],
            ..ArtifactDefinition::default()
        }
    }

    #[test]
    fn test_empty_supported_os_matches_everything() {
        assert!(is_os_supported(OperatingSystem::Linux, &[]));
        assert!(is_os_supported(OperatingSystem::Windows, &[]));
    }

    #[test]
    fn test_os_match_is_case_insensitive() {
        assert!(is_os_supported(
            OperatingSystem::Darwin,
            &["darwin".to_string()]
        ));
        assert!(!is_os_supported(
            OperatingSystem::Darwin,
            &["Windows".to_string()]
        ));
    }

    #[test]
    fn test_filter_os_retains_matching_definitions() {
        let corpus = vec![
            definition("LinuxOnly", &["Linux"], &[]),
            definition("WindowsOnly", &["Windows"], &[]),
            definition("Everywhere", &[], &[]),
        ];
        let filtered = filter_os_for(corpus, OperatingSystem::Linux);
        let names: Vec<&str> = filtered.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["LinuxOnly", "Everywhere"]);
    }

    #[test]
    fn test_filter_os_prunes_sources() {
        let corpus = vec![definition("Mixed", &[], &["Windows"])];
        let filtered = filter_os_for(corpus, OperatingSystem::Linux);
        assert_eq!(filtered.len(), 1);
        assert!(filtered[0].sources.is_empty());
    }

    #[test]
    fn test_filter_os_is_a_subset_by_name() {
        let corpus = vec![
            definition("A", &["Linux"], &[]),
            definition("B", &["Darwin"], &["Darwin"]),
            definition("C", &[], &["Linux", "Darwin"]),
        ];
        for os in OperatingSystem::ALL {
            let filtered = filter_os_for(corpus.clone(), os);
            for kept in &filtered {
                assert!(corpus.iter().any(|d| d.name == kept.name));
                for source in &kept.sources {
                    assert!(is_os_supported(os, &source.supported_os));
                }
            }
        }
    }

    #[test]
    fn test_effective_os_precedence() {
        let mut def = definition("X", &["Windows", "Linux"], &[]);
        def.sources[0].supported_os = vec!["Windows".to_string()];
        assert_eq!(effective_os(&def, &def.sources[0]), vec!["Windows"]);

        def.sources[0].supported_os.clear();
        assert_eq!(
            effective_os(&def, &def.sources[0]),
            vec!["Windows", "Linux"]
        );

        def.supported_os.clear();
        assert_eq!(
            effective_os(&def, &def.sources[0]),
            vec!["Darwin", "Linux", "Windows"]
        );
    }

    #[test]
    fn test_filter_name_flattens_groups() {
        let mut group = ArtifactDefinition {
            name: "Group".to_string(),
            ..ArtifactDefinition::default()
        };
        group.sources.push(Source {
            source_type: SourceType::ArtifactGroup,
            attributes: Attributes {
                names: vec!["Leaf".to_string()],
                ..Attributes::default()
            },
            ..Source::default()
        });
        let leaf = definition("Leaf", &[], &[]);

        let filtered = filter_name(&["Group".to_string()], vec![group, leaf]);
        let names: Vec<&str> = filtered.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Leaf"]);
    }
}
