use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::credentials::TemporaryCredentialsFile;
use crate::error::DumpError;

/// Everything needed to run one dump command.
#[derive(Debug)]
pub struct DumpJob {
    pub command: String,
    pub envs: Vec<(String, String)>,
    pub dump_file: PathBuf,
    /// dropped, and therefore deleted, once the process is over
    pub credentials: Option<TemporaryCredentialsFile>,
    pub timeout: Option<Duration>,
}

/// A dump whose process has been started.
///
/// The process, the validation of the dump file and the credentials
/// cleanup run in a background task; `wait` is the only place where their
/// outcome can be observed.
#[derive(Debug)]
pub struct PendingDump {
    dump_file: PathBuf,
    handle: JoinHandle<Result<(), DumpError>>,
}

impl PendingDump {
    pub fn dump_file(&self) -> &Path {
        self.dump_file.as_path()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// wait for the process to end and return the path of the validated dump file
    pub async fn wait(self) -> Result<PathBuf, DumpError> {
        let PendingDump { dump_file, handle } = self;
        handle.await??;

        Ok(dump_file)
    }
}

/// Start the dump command. Must be called from within a tokio runtime.
pub fn spawn_dump(job: DumpJob) -> Result<PendingDump, DumpError> {
    let mut command = shell_command(job.command.as_str());
    command
        .envs(job.envs.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(DumpError::Spawn)?;
    let process_group = child.id();

    info!("dump started, writing to {}", job.dump_file.display());

    let dump_file = job.dump_file.clone();
    let handle = tokio::spawn(async move {
        let DumpJob {
            dump_file,
            credentials,
            timeout,
            ..
        } = job;

        let output = match timeout {
            Some(timeout) => match tokio::time::timeout(timeout, child.wait_with_output()).await
            {
                Ok(output) => output,
                // kill_on_drop only reaches the shell, the pipeline lives in its group
                Err(_) => {
                    warn!("dump to {} timed out after {:?}", dump_file.display(), timeout);
                    if let Some(process_group) = process_group {
                        kill_process_group(process_group);
                    }
                    return Err(DumpError::Timeout(timeout));
                }
            },
            None => child.wait_with_output().await,
        };

        let result = match output {
            Ok(output) => check_if_dump_was_successful(&output, dump_file.as_path()).await,
            Err(err) => Err(DumpError::ProcessFailed {
                code: None,
                description: err.to_string(),
            }),
        };

        drop(credentials);

        match &result {
            Ok(_) => info!("dump written to {}", dump_file.display()),
            Err(err) => warn!("dump to {} failed: {}", dump_file.display(), err),
        }

        result
    });

    Ok(PendingDump { dump_file, handle })
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut shell = Command::new("sh");
    shell.arg("-c").arg(command).process_group(0);
    shell
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    // cmd does its own parsing of the command line
    let mut shell = Command::new("cmd");
    shell.arg("/C").raw_arg(command);
    shell
}

/// The shell is its own group leader, so its pid is the group id.
#[cfg(unix)]
fn kill_process_group(process_group: u32) {
    // SAFETY: killpg only sends a signal, no memory is shared with the callee
    let result = unsafe { libc::killpg(process_group as libc::pid_t, libc::SIGKILL) };
    if result == -1 {
        debug!(
            "cannot kill process group {}: {}",
            process_group,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_process_group: u32) {}

async fn check_if_dump_was_successful(output: &Output, dump_file: &Path) -> Result<(), DumpError> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let description = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        };

        return Err(DumpError::ProcessFailed {
            code: output.status.code(),
            description,
        });
    }

    let metadata = match tokio::fs::metadata(dump_file).await {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!("cannot stat {}: {}", dump_file.display(), err);
            return Err(DumpError::DumpfileNotCreated);
        }
    };

    if metadata.len() == 0 {
        return Err(DumpError::DumpfileEmpty);
    }

    Ok(())
}
