//! Layer-name rewrites that bridge naming schemes between a saved state
//! dict and the model it is loaded into.
//!
//! Both functions build a new dict and keep entry order; the input is never
//! touched. They compose: strip the exporter's prefix, then add ours.

use runtime_core::StateDict;

/// Replace the leading `prefix` of every key that has it with `replacement`.
/// Keys without the prefix are kept unchanged.
pub fn strip_prefix<V: Clone>(dict: &StateDict<V>, prefix: &str, replacement: &str) -> StateDict<V> {
    dict.iter()
        .map(|(key, value)| {
            let key = match key.strip_prefix(prefix) {
                Some(rest) => format!("{}{}", replacement, rest),
                None => key.to_string(),
            };
            (key, value.clone())
        })
        .collect()
}

/// Prepend `prefix` to every key
pub fn add_prefix<V: Clone>(dict: &StateDict<V>, prefix: &str) -> StateDict<V> {
    dict.iter()
        .map(|(key, value)| (format!("{}{}", prefix, key), value.clone()))
        .collect()
}

/// Owning variant of [`add_prefix`] for dicts that are consumed anyway
pub fn into_prefixed<V>(dict: StateDict<V>, prefix: &str) -> StateDict<V> {
    dict.into_iter()
        .map(|(key, value)| (format!("{}{}", prefix, key), value))
        .collect()
}
