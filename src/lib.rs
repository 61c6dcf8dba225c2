//! # rust_artifacts
//!
//! A cross-platform engine for forensic artifact definitions: it decodes
//! the declarative YAML format describing where forensically relevant
//! data lives on a system, expands the definitions into concrete,
//! host-specific locations and checks them for authoring defects.
//!
//! ## Overview
//!
//! Artifact definitions name one or more collection sources: file and
//! directory paths, registry keys and values, commands, WMI queries or
//! groups of other definitions. Paths and keys may contain
//! `%%parameter%%` placeholders and glob patterns; the engine resolves
//! placeholders against a knowledge base of host parameters, folds
//! Windows drive letters into slash-rooted forensic paths and matches
//! globs against a pluggable filesystem abstraction. A severity-tiered
//! validator reports structural and semantic flaws in definition files.
//!
//! The engine locates data but never collects it: file contents and
//! registry values are left to downstream collectors.
//!
//! ## Validating definition files
//!
//! ```no_run
//! use std::path::PathBuf;
//! use rust_artifacts::validate::validate_files;
//!
//! let flaws = validate_files(&[PathBuf::from("artifacts/windows.yaml")]);
//! for flaw in &flaws {
//!     println!("{} {} {}", flaw.severity, flaw.artifact, flaw.message);
//! }
//! ```
//!
//! ## Expanding definitions for the current host
//!
//! ```no_run
//! use std::path::Path;
//! use rust_artifacts::decode::decode_file;
//! use rust_artifacts::pipeline::{process, HostCollector};
//!
//! # fn main() -> anyhow::Result<()> {
//! let (definitions, _) = decode_file(Path::new("artifacts/linux.yaml"))?;
//! let collector = HostCollector::new(false);
//! for named in process(None, definitions, &collector) {
//!     println!("{}: {:?}", named.artifact, named.source.attributes.paths);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`definitions`]: Typed document model for artifact definitions
//! - [`decode`]: YAML decoder boundary over multi-document streams
//! - [`knowledge`]: Parameter catalog and host-backed resolvers
//! - [`vfs`]: Filesystem capability with OS, registry and in-memory backends
//! - [`expand`]: Placeholder resolution, glob and group expansion
//! - [`filter`]: Supported-OS and name based corpus filtering
//! - [`validate`]: Severity-tiered rule engine producing flaws
//! - [`pipeline`]: Decode, filter and expand orchestration
//! - [`cli`]: Command-line interface definitions for the validator binary
//! - [`constants`]: Process-wide constants and tunables

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Process-wide constants and tunables
pub mod constants;

/// YAML decoder boundary over multi-document definition streams
pub mod decode;

/// Typed document model for artifact definitions
pub mod definitions;

/// Placeholder resolution, glob expansion and artifact group flattening
pub mod expand;

/// Supported-OS and name based corpus filtering
pub mod filter;

/// Knowledge base catalog and host-backed parameter resolvers
pub mod knowledge;

/// Collection pipeline orchestration, sequential and parallel
pub mod pipeline;

/// Severity-tiered validation rules producing flaws
pub mod validate;

/// Abstract filesystem capability and its backends
pub mod vfs;
