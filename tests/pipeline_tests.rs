//! Integration tests for the collection pipeline over an in-memory
//! filesystem.

use std::collections::BTreeSet;
use std::sync::Arc;

use rust_artifacts::definitions::{ArtifactDefinition, Attributes, Source, SourceType};
use rust_artifacts::expand::ArtifactCollector;
use rust_artifacts::knowledge::{IdentityResolver, OperatingSystem, ParameterResolver};
use rust_artifacts::pipeline::{process, process_parallel, NamedSource};
use rust_artifacts::vfs::{InMemoryFilesystem, VirtualFilesystem};

struct MemoryCollector {
    fs: InMemoryFilesystem,
    resolver: IdentityResolver,
}

impl ArtifactCollector for MemoryCollector {
    fn resolver(&self) -> &dyn ParameterResolver {
        &self.resolver
    }

    fn fs(&self) -> &dyn VirtualFilesystem {
        &self.fs
    }

    fn registry(&self) -> Option<&dyn VirtualFilesystem> {
        None
    }

    fn add_partitions(&self) -> bool {
        false
    }
}

fn collector() -> MemoryCollector {
    let mut fs = InMemoryFilesystem::new();
    fs.create_file("/home/alice/.bash_history", b"history");
    fs.create_file("/home/bob/.bash_history", b"history");
    fs.create_file("/home/alice/.zsh_history", b"history");
    fs.create_file("/var/log/syslog", b"log");
    MemoryCollector {
        fs,
        resolver: IdentityResolver,
    }
}

fn file_definition(name: &str, pattern: &str) -> ArtifactDefinition {
    ArtifactDefinition {
        name: name.to_string(),
        sources: vec![Source {
            source_type: SourceType::File,
            attributes: Attributes {
                paths: vec![pattern.to_string()],
                ..Attributes::default()
            },
            ..Source::default()
        }],
        ..ArtifactDefinition::default()
    }
}

fn group_definition(name: &str, members: &[&str]) -> ArtifactDefinition {
    ArtifactDefinition {
        name: name.to_string(),
        sources: vec![Source {
            source_type: SourceType::ArtifactGroup,
            attributes: Attributes {
                names: members.iter().map(|member| member.to_string()).collect(),
                ..Attributes::default()
            },
            ..Source::default()
        }],
        ..ArtifactDefinition::default()
    }
}

fn corpus() -> Vec<ArtifactDefinition> {
    vec![
        group_definition("ShellArtifacts", &["BashHistoryFile", "ZshHistoryFile"]),
        file_definition("BashHistoryFile", "/home/*/.bash_history"),
        file_definition("ZshHistoryFile", "/home/*/.zsh_history"),
        file_definition("SyslogFile", "/var/log/syslog"),
    ]
}

fn expanded_paths(results: &[NamedSource]) -> BTreeSet<(String, Vec<String>)> {
    results
        .iter()
        .map(|named| {
            (
                named.artifact.clone(),
                named.source.attributes.paths.clone(),
            )
        })
        .collect()
}

#[test]
fn test_group_selection_flattens_and_expands() {
    let results = process(Some(&["ShellArtifacts".to_string()]), corpus(), &collector());

    assert_eq!(
        expanded_paths(&results),
        BTreeSet::from([
            (
                "BashHistoryFile".to_string(),
                vec![
                    "/home/alice/.bash_history".to_string(),
                    "/home/bob/.bash_history".to_string()
                ]
            ),
            (
                "ZshHistoryFile".to_string(),
                vec!["/home/alice/.zsh_history".to_string()]
            ),
        ])
    );
}

#[test]
fn test_unselected_corpus_expands_everything() {
    let results = process(None, corpus(), &collector());
    // The group itself contributes a source; its attributes pass through.
    assert_eq!(results.len(), 4);
    assert!(results
        .iter()
        .any(|named| named.artifact == "SyslogFile"
            && named.source.attributes.paths == vec!["/var/log/syslog"]));
}

#[test]
fn test_foreign_os_sources_are_pruned() {
    let mut foreign = file_definition("ForeignFiles", "/var/log/syslog");
    foreign.supported_os = OperatingSystem::ALL
        .iter()
        .filter(|os| **os != OperatingSystem::current())
        .map(|os| os.as_str().to_string())
        .collect();

    let results = process(None, vec![foreign], &collector());
    assert!(results.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_parallel_pipeline_matches_sequential() {
    let sequential = process(Some(&["ShellArtifacts".to_string()]), corpus(), &collector());

    let shared: Arc<dyn ArtifactCollector> = Arc::new(collector());
    let (expected, mut rx) = process_parallel(
        Some(&["ShellArtifacts".to_string()]),
        corpus(),
        shared,
    );

    let mut parallel = Vec::new();
    while let Some(named) = rx.recv().await {
        parallel.push(named);
    }

    assert_eq!(expected, sequential.len());
    assert_eq!(parallel.len(), expected);
    assert_eq!(expanded_paths(&parallel), expanded_paths(&sequential));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_parallel_pipeline_closes_channel_when_done() {
    let shared: Arc<dyn ArtifactCollector> = Arc::new(collector());
    let (expected, mut rx) = process_parallel(None, corpus(), shared);

    let mut received = 0;
    while rx.recv().await.is_some() {
        received += 1;
    }
    assert_eq!(received, expected);
    // A closed channel keeps returning None.
    assert!(rx.recv().await.is_none());
}
