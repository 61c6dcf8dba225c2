//! Whole-corpus rules: uniqueness, group references, cycles and
//! parameter coverage.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::Validator;
use crate::definitions::{ArtifactDefinition, SourceType};
use crate::expand::resolver::PLACEHOLDER;
use crate::filter::effective_os;
use crate::knowledge::OperatingSystem;

impl Validator {
    /// Every artifact name may appear only once; each repeated occurrence
    /// is flagged, the first one is not.
    pub(crate) fn validate_name_unique(&mut self, definitions: &[ArtifactDefinition]) {
        let mut known = HashSet::new();
        for definition in definitions {
            if !known.insert(definition.name.clone()) {
                self.add_warning(
                    "",
                    &definition.name,
                    format!("Duplicate artifact name {}", definition.name),
                );
            }
        }
    }

    pub(crate) fn validate_registry_key_unique(&mut self, definitions: &[ArtifactDefinition]) {
        let mut known = HashSet::new();
        for definition in definitions {
            for source in &definition.sources {
                for key in &source.attributes.keys {
                    if !known.insert(key.clone()) {
                        self.add_warning(
                            "",
                            &definition.name,
                            format!("Duplicate registry key {key}"),
                        );
                    }
                }
            }
        }
    }

    pub(crate) fn validate_registry_value_unique(&mut self, definitions: &[ArtifactDefinition]) {
        let mut known = HashSet::new();
        for definition in definitions {
            for source in &definition.sources {
                for pair in &source.attributes.key_value_pairs {
                    if !known.insert(format!("{}/{}", pair.key, pair.value)) {
                        self.add_warning(
                            "",
                            &definition.name,
                            format!("Duplicate registry value {} {}", pair.key, pair.value),
                        );
                    }
                }
            }
        }
    }

    /// Every name referenced by an artifact group must exist in the corpus.
    pub(crate) fn validate_group_members_exist(&mut self, definitions: &[ArtifactDefinition]) {
        let known: HashSet<&str> = definitions
            .iter()
            .map(|definition| definition.name.as_str())
            .collect();

        for definition in definitions {
            for source in &definition.sources {
                for member in &source.attributes.names {
                    if !known.contains(member.as_str()) {
                        self.add_error(
                            "",
                            &definition.name,
                            format!("Unknown name {member} in {}", definition.name),
                        );
                    }
                }
            }
        }
    }

    /// Artifact group references must form an acyclic graph. A group that
    /// names itself is reported directly; larger cycles fall out of the
    /// strongly connected components.
    pub(crate) fn validate_no_cycles(&mut self, definitions: &[ArtifactDefinition]) {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

        let node = |graph: &mut DiGraph<String, ()>,
                    nodes: &mut HashMap<String, NodeIndex>,
                    name: &str| {
            *nodes
                .entry(name.to_string())
                .or_insert_with(|| graph.add_node(name.to_string()))
        };

        for definition in definitions {
            for source in &definition.sources {
                if source.source_type != SourceType::ArtifactGroup {
                    continue;
                }
                let from = node(&mut graph, &mut nodes, &definition.name);
                for member in &source.attributes.names {
                    if member == &definition.name {
                        self.add_error(
                            "",
                            &definition.name,
                            "Artifact group references itself".to_string(),
                        );
                    }
                    let to = node(&mut graph, &mut nodes, member);
                    graph.add_edge(from, to, ());
                }
            }
        }

        for component in kosaraju_scc(&graph) {
            if component.len() > 1 {
                let mut members: Vec<String> = component
                    .into_iter()
                    .map(|index| graph[index].clone())
                    .collect();
                members.sort();
                self.add_error(
                    "",
                    "",
                    format!("Cyclic artifact group: {}", members.join(", ")),
                );
            }
        }
    }

    /// For every OS, each `%%parameter%%` referenced by a path or key must
    /// be provided by some source effective on that OS.
    pub(crate) fn validate_parameters_provided(&mut self, definitions: &[ArtifactDefinition]) {
        let mut required: BTreeMap<&'static str, BTreeMap<String, String>> = OperatingSystem::ALL
            .iter()
            .map(|os| (os.as_str(), BTreeMap::new()))
            .collect();
        let mut provided: BTreeMap<&'static str, HashSet<String>> = OperatingSystem::ALL
            .iter()
            .map(|os| (os.as_str(), HashSet::new()))
            .collect();

        for definition in definitions {
            for source in &definition.sources {
                let effective = effective_os(definition, source);
                for value in source
                    .attributes
                    .paths
                    .iter()
                    .chain(source.attributes.keys.iter())
                {
                    for capture in PLACEHOLDER.captures_iter(value) {
                        let parameter = capture.get(1).map(|m| m.as_str()).unwrap_or_default();
                        for os in &effective {
                            if let Some(for_os) = required.get_mut(os.as_str()) {
                                for_os
                                    .entry(parameter.to_string())
                                    .or_insert_with(|| definition.name.clone());
                            }
                        }
                    }
                }

                for provide in &source.provides {
                    for os in &effective {
                        if let Some(for_os) = provided.get_mut(os.as_str()) {
                            for_os.insert(provide.key.clone());
                        }
                    }
                }
            }
        }

        for (os, parameters) in &required {
            for (parameter, artifact) in parameters {
                let known = provided
                    .get(os)
                    .map(|for_os| for_os.contains(parameter))
                    .unwrap_or(false);
                if !known {
                    self.add_warning(
                        "",
                        artifact,
                        format!("Parameter {parameter} is not provided for {os}"),
                    );
                }
            }
        }
    }
}
