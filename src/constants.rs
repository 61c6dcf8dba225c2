//! Global constants for the artifact engine.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

// Expansion constants
/// Maximum nesting depth for recursive `%%parameter%%` resolution.
/// A chain deeper than this is treated as unresolvable rather than
/// recursing further.
pub const MAX_PLACEHOLDER_DEPTH: usize = 32;

/// Recursion depth used for a `**` glob segment without an explicit bound.
pub const DEFAULT_GLOB_DEPTH: usize = usize::MAX;

// Pipeline constants
/// Capacity of the bounded channel the parallel pipeline pushes expanded
/// sources into.
pub const RESULT_CHANNEL_CAPACITY: usize = 100;

// Validation constants
/// Timeout for each outbound URL reachability check, in seconds.
pub const URL_CHECK_TIMEOUT_SECS: u64 = 5;
