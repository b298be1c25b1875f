use std::path::Path;

use crate::databases::{require, DbDumper, DumpOptions};
use crate::error::DumpError;
use crate::shell::{quote, redirect_to_file};

/// Dumps a SQLite database file with the `sqlite3` shell.
///
/// The database name is the path of the database file.
#[derive(Debug, Clone)]
pub struct Sqlite {
    options: DumpOptions,
}

impl Default for Sqlite {
    fn default() -> Self {
        Sqlite {
            options: DumpOptions::new(0),
        }
    }
}

impl Sqlite {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DbDumper for Sqlite {
    fn options(&self) -> &DumpOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut DumpOptions {
        &mut self.options
    }

    fn guard_against_incomplete_credentials(&self) -> Result<(), DumpError> {
        require(&[("dbName", self.db_name())])
    }

    fn dump_command(&self, dump_file: &Path, _credentials_file: Option<&Path>) -> String {
        let options = &self.options;
        let platform = options.platform;

        // the immediate transaction keeps writers out while .dump runs
        let dump_in_sqlite = if platform.is_windows() {
            "(echo BEGIN IMMEDIATE; & echo .dump)"
        } else {
            "echo 'BEGIN IMMEDIATE;\n.dump'"
        };

        let command = format!(
            "{} | {} --bail {}",
            dump_in_sqlite,
            quote(platform, &format!("{}sqlite3", options.dump_binary_path)),
            quote(platform, self.db_name().unwrap_or_default())
        );

        redirect_to_file(
            &command,
            &dump_file.to_string_lossy(),
            options.compressor(),
            platform,
        )
    }
}
