//! Environment variable interpolation for child processes.
//!
//! Variables supplied in the project file may reference the inherited
//! environment with a `%NAME%` placeholder. The `%` delimiters keep them
//! clear of the `${...}` syntax used by shells and by CMake itself.
//!
//! Placeholders are only ever resolved against a snapshot of the ambient
//! environment, never against other supplied variables, so the result does
//! not depend on the order in which the overlay is applied.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

use crate::builder::errors::BuildError;

/// Snapshot of an environment: name to value.
pub type Environment = HashMap<String, String>;

/// Variables supplied for a phase, in declaration order. Values may embed
/// `%NAME%` placeholders.
pub type EnvironmentSpec = IndexMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%([A-Za-z0-9_-]+)%").expect("valid placeholder pattern"));

/// Capture the environment of the current process.
///
/// Variables whose name or value is not valid unicode are converted lossily;
/// they remain untouched in the child, which inherits the real environment.
pub fn snapshot() -> Environment {
    std::env::vars_os()
        .map(|(k, v)| {
            (
                k.to_string_lossy().into_owned(),
                v.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// Expand every placeholder in `value` against `base`.
///
/// Unknown names expand to the empty string.
pub fn expand(base: &Environment, value: &str) -> String {
    PLACEHOLDER
        .replace_all(value, |caps: &Captures<'_>| {
            base.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Resolve the supplied variables against `base`.
///
/// Returns only the resolved overlay. `base` is left untouched.
pub fn resolve(base: &Environment, overlay: &EnvironmentSpec) -> Result<EnvironmentSpec, BuildError> {
    let mut resolved = IndexMap::with_capacity(overlay.len());

    for (name, raw) in overlay {
        let value = expand(base, raw);
        check_variable(name, &value)?;
        resolved.insert(name.clone(), value);
    }

    Ok(resolved)
}

/// The complete environment a child would see: `base` with the resolved
/// overlay applied on top.
pub fn apply(base: &Environment, overlay: &EnvironmentSpec) -> Result<Environment, BuildError> {
    let resolved = resolve(base, overlay)?;
    let mut env = base.clone();
    env.extend(resolved);
    Ok(env)
}

// Mirrors the conditions under which the platform refuses to set a variable.
fn check_variable(name: &str, value: &str) -> Result<(), BuildError> {
    let reason = if name.is_empty() {
        Some("has an empty name")
    } else if name.contains('=') {
        Some("has a name containing '='")
    } else if name.contains('\0') {
        Some("has a name containing a NUL byte")
    } else if value.contains('\0') {
        Some("has a value containing a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(BuildError::Environment {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
