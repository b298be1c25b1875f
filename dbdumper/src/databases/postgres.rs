use std::path::Path;

use crate::databases::{require, trimmed, DbDumper, DumpOptions};
use crate::error::DumpError;
use crate::shell::{quote, redirect_to_file};

pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Dumps a PostgreSQL database with `pg_dump`.
#[derive(Debug, Clone)]
pub struct PostgreSql {
    options: DumpOptions,
    use_inserts: bool,
    create_tables: bool,
}

impl Default for PostgreSql {
    fn default() -> Self {
        PostgreSql {
            options: DumpOptions::new(DEFAULT_POSTGRES_PORT),
            use_inserts: false,
            create_tables: true,
        }
    }
}

impl PostgreSql {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_inserts(mut self) -> Self {
        self.use_inserts = true;
        self
    }

    pub fn do_not_create_tables(mut self) -> Self {
        self.create_tables = false;
        self
    }

    /// a single `.pgpass` line: `host:port:database:username:password`
    pub fn contents_of_credentials_file(&self) -> String {
        [
            escape_pgpass_field(self.options.host.as_str()),
            self.options.port.to_string(),
            escape_pgpass_field(self.db_name().unwrap_or_default()),
            escape_pgpass_field(self.options.user_name().unwrap_or_default()),
            escape_pgpass_field(self.options.password().unwrap_or_default()),
        ]
        .join(":")
    }
}

fn escape_pgpass_field(field: &str) -> String {
    field.replace('\\', "\\\\").replace(':', "\\:")
}

impl DbDumper for PostgreSql {
    fn options(&self) -> &DumpOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut DumpOptions {
        &mut self.options
    }

    fn guard_against_incomplete_credentials(&self) -> Result<(), DumpError> {
        require(&[
            ("userName", self.options.user_name()),
            ("dbName", self.db_name()),
            ("host", Some(self.options.host.as_str())),
        ])
    }

    fn dump_command(&self, dump_file: &Path, _credentials_file: Option<&Path>) -> String {
        let options = &self.options;
        let host = if options.socket.is_empty() {
            options.host.as_str()
        } else {
            options.socket.as_str()
        };

        let mut command = vec![
            format!(
                "export PGPASSWORD='{}';",
                options.password().unwrap_or_default().replace('\'', "'\\''")
            ),
            quote(
                options.platform,
                &format!("{}pg_dump", options.dump_binary_path),
            ),
            format!("-U {}", options.user_name().unwrap_or_default()),
            format!("-h {}", host),
            format!("-p {}", options.port),
        ];

        if self.use_inserts {
            command.push("--inserts".to_string());
        }

        if !self.create_tables {
            command.push("--data-only".to_string());
        }

        command.extend(options.extra_options.iter().cloned());

        if !options.include_tables.is_empty() {
            command.push(format!(
                "-t {}",
                trimmed(&options.include_tables)
                    .collect::<Vec<_>>()
                    .join(" -t ")
            ));
        }

        if !options.exclude_tables.is_empty() {
            command.push(format!(
                "-T {}",
                trimmed(&options.exclude_tables)
                    .collect::<Vec<_>>()
                    .join(" -T ")
            ));
        }

        redirect_to_file(
            &command.join(" "),
            &dump_file.to_string_lossy(),
            options.compressor(),
            options.platform,
        )
    }

    fn credentials_file_contents(&self) -> Option<(&'static str, String)> {
        Some(("", self.contents_of_credentials_file()))
    }

    fn environment(&self, credentials_file: Option<&Path>) -> Vec<(String, String)> {
        let mut envs = vec![];

        if let Some(credentials_file) = credentials_file {
            envs.push((
                "PGPASSFILE".to_string(),
                credentials_file.to_string_lossy().into_owned(),
            ));
        }

        if let Some(db_name) = self.db_name() {
            envs.push(("PGDATABASE".to_string(), db_name.to_string()));
        }

        envs
    }

    fn command_contains_password(&self) -> bool {
        true
    }
}
