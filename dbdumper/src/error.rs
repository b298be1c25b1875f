use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong while configuring or running a dump.
///
/// The first two variants are raised synchronously by setters and by
/// `dump_to_file`. The others only ever come out of `PendingDump::wait`.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Parameter `{0}` cannot be empty.")]
    EmptyParameter(&'static str),

    #[error("Cannot set [{name}] because it conflicts with parameter [{conflict}].")]
    ConflictingParameters {
        name: &'static str,
        conflict: &'static str,
    },

    #[error(
        "The dump process failed with exitcode {} : {description}",
        .code.map_or_else(|| "unknown".to_string(), |code| code.to_string())
    )]
    ProcessFailed {
        code: Option<i32>,
        description: String,
    },

    #[error("The dumpfile could not be created")]
    DumpfileNotCreated,

    #[error("The created dumpfile is empty")]
    DumpfileEmpty,

    #[error("The dump process did not finish within {0:?}")]
    Timeout(Duration),

    #[error("could not write temporary credentials file {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not start the dump process: {0}")]
    Spawn(#[source] io::Error),

    #[error("dump task aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::DumpError;

    #[test]
    fn messages() {
        assert_eq!(
            DumpError::EmptyParameter("userName").to_string(),
            "Parameter `userName` cannot be empty."
        );
        assert_eq!(
            DumpError::ConflictingParameters {
                name: "excludeTables",
                conflict: "includeTables",
            }
            .to_string(),
            "Cannot set [excludeTables] because it conflicts with parameter [includeTables]."
        );
        assert_eq!(
            DumpError::ProcessFailed {
                code: Some(2),
                description: "mysqldump: Got error: 1045".to_string(),
            }
            .to_string(),
            "The dump process failed with exitcode 2 : mysqldump: Got error: 1045"
        );
        assert_eq!(
            DumpError::ProcessFailed {
                code: None,
                description: "signal: 9 (SIGKILL)".to_string(),
            }
            .to_string(),
            "The dump process failed with exitcode unknown : signal: 9 (SIGKILL)"
        );
    }
}
