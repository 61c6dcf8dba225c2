//! Recursive `%%parameter%%` substitution.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::MAX_PLACEHOLDER_DEPTH;
use crate::knowledge::{ParameterResolver, ResolutionError};

lazy_static! {
    /// Placeholder pattern. The optional leading and trailing `%` tolerate
    /// the malformed single-percent variants (`%name%%`, `%%name%`) that
    /// exist in published definition corpora.
    pub(crate) static ref PLACEHOLDER: Regex = Regex::new(r"%?%(.*?)%?%").unwrap();
}

/// Expand every placeholder in `raw` into the set of concrete strings it
/// denotes.
///
/// Each distinct placeholder is substituted independently across the
/// current candidate set, producing the cross-product of all placeholder
/// combinations. Resolved values may themselves contain placeholders
/// (e.g. `users.appdata` resolves to a path referencing
/// `%%users.homedir%%`), so resolution recurses until no placeholder
/// remains. A string without placeholders resolves to itself.
///
/// Parameter lookups are memoized for the duration of one call, and any
/// lookup failure fails the whole call; there are no partial results.
pub fn resolve(
    raw: &str,
    resolver: &dyn ParameterResolver,
) -> Result<Vec<String>, ResolutionError> {
    let mut cache = HashMap::new();
    resolve_recursive(raw, resolver, &mut cache, 0)
}

fn resolve_recursive(
    input: &str,
    resolver: &dyn ParameterResolver,
    cache: &mut HashMap<String, Vec<String>>,
    depth: usize,
) -> Result<Vec<String>, ResolutionError> {
    if depth > MAX_PLACEHOLDER_DEPTH {
        return Err(ResolutionError::DepthExceeded(MAX_PLACEHOLDER_DEPTH));
    }

    let placeholders = distinct_placeholders(input);
    if placeholders.is_empty() {
        return Ok(vec![input.to_string()]);
    }

    let mut candidates = vec![input.to_string()];
    for (occurrence, parameter) in placeholders {
        let values = match cache.get(&parameter) {
            Some(values) => values.clone(),
            None => {
                let values = resolver.resolve(&parameter)?;
                cache.insert(parameter.clone(), values.clone());
                values
            }
        };

        let mut substituted = Vec::with_capacity(candidates.len() * values.len());
        for candidate in &candidates {
            for value in &values {
                substituted.push(candidate.replace(&occurrence, value));
            }
        }
        candidates = substituted;
    }

    let mut results = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        results.extend(resolve_recursive(&candidate, resolver, cache, depth + 1)?);
    }
    Ok(results)
}

/// The distinct `(matched text, parameter name)` pairs in `input`, in
/// match order.
fn distinct_placeholders(input: &str) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut placeholders = Vec::new();
    for capture in PLACEHOLDER.captures_iter(input) {
        let occurrence = capture.get(0).map(|m| m.as_str()).unwrap_or_default();
        let parameter = capture.get(1).map(|m| m.as_str()).unwrap_or_default();
        if seen.insert(occurrence.to_string()) {
            placeholders.push((occurrence.to_string(), parameter.to_string()));
        }
    }
    placeholders
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Resolver with two fixed parameters, one of which resolves into
    /// another placeholder.
    struct ChainResolver;

    impl ParameterResolver for ChainResolver {
        fn resolve(&self, parameter: &str) -> Result<Vec<String>, ResolutionError> {
            match parameter {
                "foo" => Ok(vec!["xxx".to_string(), "yyy".to_string()]),
                "faz" => Ok(vec!["%foo%".to_string()]),
                other => Err(ResolutionError::UnknownParameter(other.to_string())),
            }
        }
    }

    /// Resolver that loops forever: `a` resolves to a string naming `a`.
    struct LoopResolver;

    impl ParameterResolver for LoopResolver {
        fn resolve(&self, _parameter: &str) -> Result<Vec<String>, ResolutionError> {
            Ok(vec!["%%a%%".to_string()])
        }
    }

    /// Resolver that counts lookups to verify memoization.
    struct CountingResolver(std::sync::atomic::AtomicUsize);

    impl ParameterResolver for CountingResolver {
        fn resolve(&self, _parameter: &str) -> Result<Vec<String>, ResolutionError> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(vec!["v".to_string()])
        }
    }

    #[test]
    fn test_plain_resolve() {
        let resolved = resolve("asd%%foo%%bar", &ChainResolver).unwrap();
        assert_eq!(resolved, vec!["asdxxxbar".to_string(), "asdyyybar".to_string()]);
    }

    #[test]
    fn test_recursive_resolve() {
        let resolved = resolve("asd%%faz%%bar", &ChainResolver).unwrap();
        assert_eq!(resolved, vec!["asdxxxbar".to_string(), "asdyyybar".to_string()]);
    }

    #[test]
    fn test_failed_resolve_has_no_partial_results() {
        assert!(resolve("asd%%far%%bar", &ChainResolver).is_err());
    }

    #[test]
    fn test_no_placeholder_is_identity() {
        let resolved = resolve("/etc/passwd", &ChainResolver).unwrap();
        assert_eq!(resolved, vec!["/etc/passwd".to_string()]);
    }

    #[test]
    fn test_cross_product_of_two_parameters() {
        struct TwoResolver;
        impl ParameterResolver for TwoResolver {
            fn resolve(&self, parameter: &str) -> Result<Vec<String>, ResolutionError> {
                match parameter {
                    "u" => Ok(vec!["1".to_string(), "2".to_string()]),
                    "v" => Ok(vec!["a".to_string(), "b".to_string()]),
                    other => Err(ResolutionError::UnknownParameter(other.to_string())),
                }
            }
        }
        let resolved = resolve("%%u%%-%%v%%", &TwoResolver).unwrap();
        assert_eq!(
            resolved,
            vec![
                "1-a".to_string(),
                "1-b".to_string(),
                "2-a".to_string(),
                "2-b".to_string()
            ]
        );
    }

    #[test]
    fn test_runaway_chain_is_an_error() {
        assert!(matches!(
            resolve("%%a%%", &LoopResolver),
            Err(ResolutionError::DepthExceeded(_))
        ));
    }

    #[test]
    fn test_repeated_parameter_is_resolved_once() {
        let resolver = CountingResolver(std::sync::atomic::AtomicUsize::new(0));
        resolve("%%p%%/%%p%%", &resolver).unwrap();
        assert_eq!(resolver.0.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    proptest! {
        /// Strings without percent signs always resolve to themselves.
        #[test]
        fn test_resolve_identity_without_placeholders(s in "[a-zA-Z0-9/_.-]{0,64}") {
            let resolved = resolve(&s, &ChainResolver).unwrap();
            prop_assert_eq!(resolved, vec![s]);
        }
    }
}
