use std::io::{Error, ErrorKind};

use which::which;

/// Fail when the dump binary cannot be found in `PATH`.
pub fn binary_exists(binary_name: &str) -> Result<(), Error> {
    which(binary_name).map(|_| ()).map_err(|_| {
        Error::new(
            ErrorKind::NotFound,
            format!(
                "'{}' is not in PATH, install it or set `database.binary_path`",
                binary_name
            ),
        )
    })
}

/// `$NAME` values are read from the environment, anything else is kept as is.
pub fn substitute_env_var(value: &str) -> Result<String, Error> {
    match value.strip_prefix('$').filter(|name| !name.is_empty()) {
        Some(name) => std::env::var(name).map_err(|_| {
            Error::new(
                ErrorKind::NotFound,
                format!("environment variable '{}' is not set", name),
            )
        }),
        None => Ok(value.to_string()),
    }
}
