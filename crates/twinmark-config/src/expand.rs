//! `${VAR}` expansion in configuration strings.

use std::env::VarError;

use crate::ConfigError;

/// Variable that was referenced without a default and is not set.
struct Unset(String);

/// Expand `${VAR}` and `${VAR:-default}` in `value`.
///
/// Bare `$VAR` is left alone so values containing a dollar sign survive.
/// `field` names the configuration key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| match std::env::var(name) {
        Ok(found) => Ok(Some(found)),
        Err(VarError::NotPresent | VarError::NotUnicode(_)) => Err(Unset(name.to_owned())),
    };

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.cause.0),
        })
}
