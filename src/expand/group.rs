//! Recursive artifact group flattening.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::warn;

use crate::definitions::{ArtifactDefinition, SourceType};

/// Flatten a list of requested definition names into the leaf definitions
/// they denote.
///
/// Group members are followed recursively. A definition whose sources are
/// exclusively artifact groups is a pure alias and is elided from the
/// output; only definitions with at least one non-group source are
/// emitted. Unknown member names are logged and skipped. Names already
/// visited are not followed again, so an (invalid, validator-detectable)
/// cyclic corpus still terminates.
pub fn expand_artifact_group(
    names: &[String],
    definitions: &HashMap<String, ArtifactDefinition>,
) -> BTreeMap<String, ArtifactDefinition> {
    let mut selected = BTreeMap::new();
    let mut visited = HashSet::new();
    collect(names, definitions, &mut visited, &mut selected);
    selected
}

fn collect(
    names: &[String],
    definitions: &HashMap<String, ArtifactDefinition>,
    visited: &mut HashSet<String>,
    selected: &mut BTreeMap<String, ArtifactDefinition>,
) {
    for name in names {
        if !visited.insert(name.clone()) {
            continue;
        }
        let Some(artifact) = definitions.get(name) else {
            warn!("artifact definition {name} not found");
            continue;
        };

        let mut only_group = true;
        for source in &artifact.sources {
            if source.source_type == SourceType::ArtifactGroup {
                collect(&source.attributes.names, definitions, visited, selected);
            } else {
                only_group = false;
            }
        }
        if !only_group {
            selected.insert(artifact.name.clone(), artifact.clone());
        }
    }
}
