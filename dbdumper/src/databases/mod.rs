use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::compressor::Compressor;
use crate::credentials::TemporaryCredentialsFile;
use crate::error::DumpError;
use crate::process::{spawn_dump, DumpJob, PendingDump};
use crate::shell::Platform;

pub mod mongodb;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

/// A list of table names, given either as a sequence or as one comma separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableList(Vec<String>);

impl TableList {
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for TableList {
    fn from(tables: &str) -> Self {
        TableList(tables.split(',').map(|table| table.to_string()).collect())
    }
}

impl From<String> for TableList {
    fn from(tables: String) -> Self {
        TableList::from(tables.as_str())
    }
}

impl<S: Into<String>> From<Vec<S>> for TableList {
    fn from(tables: Vec<S>) -> Self {
        TableList(tables.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for TableList {
    fn from(tables: [S; N]) -> Self {
        TableList(tables.into_iter().map(Into::into).collect())
    }
}

impl From<&[&str]> for TableList {
    fn from(tables: &[&str]) -> Self {
        TableList(tables.iter().map(|table| table.to_string()).collect())
    }
}

/// Connection and output settings shared by every database engine.
#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub(crate) db_name: Option<String>,
    /// number of extra options present when `db_name` was last set
    pub(crate) db_name_set_at: usize,
    pub(crate) user_name: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) socket: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) dump_binary_path: String,
    pub(crate) include_tables: Vec<String>,
    pub(crate) exclude_tables: Vec<String>,
    pub(crate) extra_options: Vec<String>,
    pub(crate) extra_options_after_db_name: Vec<String>,
    pub(crate) compressor: Option<Arc<dyn Compressor>>,
    pub(crate) platform: Platform,
}

impl DumpOptions {
    pub fn new(port: u16) -> Self {
        DumpOptions {
            db_name: None,
            db_name_set_at: 0,
            user_name: None,
            password: None,
            host: String::from("localhost"),
            port,
            socket: String::new(),
            timeout: None,
            dump_binary_path: String::new(),
            include_tables: vec![],
            exclude_tables: vec![],
            extra_options: vec![],
            extra_options_after_db_name: vec![],
            compressor: None,
            platform: Platform::current(),
        }
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket(&self) -> &str {
        self.socket.as_str()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn dump_binary_path(&self) -> &str {
        self.dump_binary_path.as_str()
    }

    pub fn included_tables(&self) -> &[String] {
        self.include_tables.as_slice()
    }

    pub fn excluded_tables(&self) -> &[String] {
        self.exclude_tables.as_slice()
    }

    pub fn extra_options(&self) -> &[String] {
        self.extra_options.as_slice()
    }

    pub fn extra_options_after_db_name(&self) -> &[String] {
        self.extra_options_after_db_name.as_slice()
    }

    pub fn compressor(&self) -> Option<&dyn Compressor> {
        self.compressor.as_deref()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn set_included_tables(&mut self, tables: TableList) -> Result<(), DumpError> {
        if !self.exclude_tables.is_empty() {
            return Err(DumpError::ConflictingParameters {
                name: "includeTables",
                conflict: "excludeTables",
            });
        }

        self.include_tables = tables.into_inner();
        Ok(())
    }

    fn set_excluded_tables(&mut self, tables: TableList) -> Result<(), DumpError> {
        if !self.include_tables.is_empty() {
            return Err(DumpError::ConflictingParameters {
                name: "excludeTables",
                conflict: "includeTables",
            });
        }

        self.exclude_tables = tables.into_inner();
        Ok(())
    }
}

/// table names as they go into a command
pub(crate) fn trimmed(tables: &[String]) -> impl Iterator<Item = &str> {
    tables.iter().map(|table| table.trim())
}

/// Check `fields` in order and fail on the first one that is missing or empty.
pub(crate) fn require(fields: &[(&'static str, Option<&str>)]) -> Result<(), DumpError> {
    for (name, value) in fields {
        match value {
            Some(value) if !value.is_empty() => {}
            _ => return Err(DumpError::EmptyParameter(*name)),
        }
    }

    Ok(())
}

/// A database engine able to turn its options into a dump command.
pub trait DbDumper: Send + Sync {
    fn options(&self) -> &DumpOptions;

    fn options_mut(&mut self) -> &mut DumpOptions;

    /// fail with the first required parameter that is not set
    fn guard_against_incomplete_credentials(&self) -> Result<(), DumpError>;

    /// the full shell command writing the dump into `dump_file`
    fn dump_command(&self, dump_file: &Path, credentials_file: Option<&Path>) -> String;

    /// suffix and contents of the credentials file the binary reads, if it needs one
    fn credentials_file_contents(&self) -> Option<(&'static str, String)> {
        None
    }

    /// extra environment variables for the dump process
    fn environment(&self, _credentials_file: Option<&Path>) -> Vec<(String, String)> {
        vec![]
    }

    /// true when the command line carries a password in clear
    fn command_contains_password(&self) -> bool {
        false
    }

    fn db_name(&self) -> Option<&str> {
        self.options().db_name.as_deref()
    }

    fn host(&self) -> &str {
        self.options().host.as_str()
    }

    fn compressor_extension(&self) -> Option<&str> {
        self.options().compressor().map(|compressor| compressor.extension())
    }

    /// Validate the options, stage credentials and start the dump process.
    ///
    /// Configuration errors are returned right away. Process and dump file
    /// errors come out of `PendingDump::wait`. Must be called from within a
    /// tokio runtime.
    fn dump_to_file(&self, dump_file: &Path) -> Result<PendingDump, DumpError> {
        self.guard_against_incomplete_credentials()?;

        let credentials = match self.credentials_file_contents() {
            Some((suffix, contents)) => Some(TemporaryCredentialsFile::create(suffix, &contents)?),
            None => None,
        };
        let credentials_path = credentials.as_ref().map(|c| c.path().to_path_buf());

        let command = self.dump_command(dump_file, credentials_path.as_deref());
        if self.command_contains_password() {
            debug!("running dump command (password redacted)");
        } else {
            debug!("running dump command: {}", command);
        }

        spawn_dump(DumpJob {
            command,
            envs: self.environment(credentials_path.as_deref()),
            dump_file: PathBuf::from(dump_file),
            credentials,
            timeout: self.options().timeout,
        })
    }

    fn set_db_name<S: Into<String>>(mut self, db_name: S) -> Self
    where
        Self: Sized,
    {
        let options = self.options_mut();
        options.db_name = Some(db_name.into());
        options.db_name_set_at = options.extra_options.len();
        self
    }

    fn set_user_name<S: Into<String>>(mut self, user_name: S) -> Self
    where
        Self: Sized,
    {
        self.options_mut().user_name = Some(user_name.into());
        self
    }

    fn set_password<S: Into<String>>(mut self, password: S) -> Self
    where
        Self: Sized,
    {
        self.options_mut().password = Some(password.into());
        self
    }

    fn set_host<S: Into<String>>(mut self, host: S) -> Self
    where
        Self: Sized,
    {
        self.options_mut().host = host.into();
        self
    }

    fn set_port(mut self, port: u16) -> Self
    where
        Self: Sized,
    {
        self.options_mut().port = port;
        self
    }

    fn set_socket<S: Into<String>>(mut self, socket: S) -> Self
    where
        Self: Sized,
    {
        self.options_mut().socket = socket.into();
        self
    }

    fn set_timeout(mut self, timeout: Duration) -> Self
    where
        Self: Sized,
    {
        self.options_mut().timeout = Some(timeout);
        self
    }

    /// directory holding the dump binary, a trailing `/` is added when missing
    fn set_dump_binary_path<S: Into<String>>(mut self, dump_binary_path: S) -> Self
    where
        Self: Sized,
    {
        let mut dump_binary_path = dump_binary_path.into();
        if !dump_binary_path.is_empty() && !dump_binary_path.ends_with('/') {
            dump_binary_path.push('/');
        }

        self.options_mut().dump_binary_path = dump_binary_path;
        self
    }

    fn set_included_tables<T: Into<TableList>>(mut self, tables: T) -> Result<Self, DumpError>
    where
        Self: Sized,
    {
        self.options_mut().set_included_tables(tables.into())?;
        Ok(self)
    }

    fn set_excluded_tables<T: Into<TableList>>(mut self, tables: T) -> Result<Self, DumpError>
    where
        Self: Sized,
    {
        self.options_mut().set_excluded_tables(tables.into())?;
        Ok(self)
    }

    /// empty options are ignored
    fn add_extra_option<S: Into<String>>(mut self, extra_option: S) -> Self
    where
        Self: Sized,
    {
        let extra_option = extra_option.into();
        if !extra_option.is_empty() {
            self.options_mut().extra_options.push(extra_option);
        }
        self
    }

    /// empty options are ignored
    fn add_extra_option_after_db_name<S: Into<String>>(mut self, extra_option: S) -> Self
    where
        Self: Sized,
    {
        let extra_option = extra_option.into();
        if !extra_option.is_empty() {
            self.options_mut().extra_options_after_db_name.push(extra_option);
        }
        self
    }

    fn use_compressor<C: Compressor + 'static>(mut self, compressor: C) -> Self
    where
        Self: Sized,
    {
        self.options_mut().compressor = Some(Arc::new(compressor));
        self
    }

    /// share one compressor between several dumpers
    fn use_shared_compressor(mut self, compressor: Arc<dyn Compressor>) -> Self
    where
        Self: Sized,
    {
        self.options_mut().compressor = Some(compressor);
        self
    }

    fn set_platform(mut self, platform: Platform) -> Self
    where
        Self: Sized,
    {
        self.options_mut().platform = platform;
        self
    }
}
