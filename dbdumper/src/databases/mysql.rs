use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::databases::{require, trimmed, DbDumper, DumpOptions};
use crate::error::DumpError;
use crate::shell::{quote, redirect_to_file};

pub const DEFAULT_MYSQL_PORT: u16 = 3306;

const GTID_PURGED_AUTO: &str = "AUTO";

lazy_static! {
    static ref DATABASES_OPTION: Regex = Regex::new(r"^--databases (\S+)").unwrap();
}

/// Database selection carried by a `mysqldump` extra option.
#[derive(Debug, PartialEq)]
enum DatabaseSelection<'a> {
    AllDatabases,
    Named(&'a str),
}

/// `--all-databases` is looked for first, so it wins over a `--databases` match
fn database_selection(extra_option: &str) -> Option<DatabaseSelection<'_>> {
    if extra_option.contains("--all-databases") {
        return Some(DatabaseSelection::AllDatabases);
    }

    DATABASES_OPTION
        .captures(extra_option)
        .and_then(|captures| captures.get(1))
        .map(|name| DatabaseSelection::Named(name.as_str()))
}

/// Dumps a MySQL or MariaDB database with `mysqldump`.
///
/// Credentials go through a `--defaults-extra-file` so they never show up
/// in the process list.
#[derive(Debug, Clone)]
pub struct MySql {
    options: DumpOptions,
    skip_comments: bool,
    use_extended_inserts: bool,
    use_single_transaction: bool,
    skip_lock_tables: bool,
    use_quick: bool,
    default_character_set: String,
    set_gtid_purged: String,
    create_tables: bool,
}

impl Default for MySql {
    fn default() -> Self {
        MySql {
            options: DumpOptions::new(DEFAULT_MYSQL_PORT),
            skip_comments: true,
            use_extended_inserts: true,
            use_single_transaction: false,
            skip_lock_tables: false,
            use_quick: false,
            default_character_set: String::new(),
            set_gtid_purged: String::from(GTID_PURGED_AUTO),
            create_tables: true,
        }
    }
}

impl MySql {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_comments(mut self) -> Self {
        self.skip_comments = true;
        self
    }

    pub fn dont_skip_comments(mut self) -> Self {
        self.skip_comments = false;
        self
    }

    pub fn use_extended_inserts(mut self) -> Self {
        self.use_extended_inserts = true;
        self
    }

    pub fn dont_use_extended_inserts(mut self) -> Self {
        self.use_extended_inserts = false;
        self
    }

    pub fn use_single_transaction(mut self) -> Self {
        self.use_single_transaction = true;
        self
    }

    pub fn dont_use_single_transaction(mut self) -> Self {
        self.use_single_transaction = false;
        self
    }

    pub fn skip_lock_tables(mut self) -> Self {
        self.skip_lock_tables = true;
        self
    }

    pub fn dont_skip_lock_tables(mut self) -> Self {
        self.skip_lock_tables = false;
        self
    }

    pub fn use_quick(mut self) -> Self {
        self.use_quick = true;
        self
    }

    pub fn dont_use_quick(mut self) -> Self {
        self.use_quick = false;
        self
    }

    pub fn set_default_character_set<S: Into<String>>(mut self, character_set: S) -> Self {
        self.default_character_set = character_set.into();
        self
    }

    /// value of `--set-gtid-purged`, the flag is left out for `AUTO`
    pub fn set_gtid_purged<S: Into<String>>(mut self, set_gtid_purged: S) -> Self {
        self.set_gtid_purged = set_gtid_purged.into();
        self
    }

    pub fn do_not_create_tables(mut self) -> Self {
        self.create_tables = false;
        self
    }

    fn all_databases(&self) -> bool {
        self.options
            .extra_options
            .iter()
            .any(|option| database_selection(option) == Some(DatabaseSelection::AllDatabases))
    }

    /// true when the databases to dump are picked by an extra option
    fn db_name_was_set_as_extra_option(&self) -> bool {
        self.options
            .extra_options
            .iter()
            .any(|option| database_selection(option).is_some())
    }

    pub fn contents_of_credentials_file(&self) -> String {
        [
            "[client]".to_string(),
            format!(
                "user = '{}'",
                escape_option_value(self.options.user_name().unwrap_or_default())
            ),
            format!(
                "password = '{}'",
                escape_option_value(self.options.password().unwrap_or_default())
            ),
            format!("host = '{}'", escape_option_value(&self.options.host)),
            format!("port = '{}'", self.options.port),
        ]
        .join("\n")
    }
}

/// mysql option files treat `\` as an escape character and only strip the
/// outer pair of quotes, so quotes inside the value stay as they are
fn escape_option_value(value: &str) -> String {
    value.replace('\\', "\\\\")
}

impl DbDumper for MySql {
    fn options(&self) -> &DumpOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut DumpOptions {
        &mut self.options
    }

    fn guard_against_incomplete_credentials(&self) -> Result<(), DumpError> {
        require(&[
            ("userName", self.options.user_name()),
            ("host", Some(self.options.host.as_str())),
        ])?;

        if !self.all_databases() {
            require(&[("dbName", self.db_name())])?;
        }

        Ok(())
    }

    fn dump_command(&self, dump_file: &Path, credentials_file: Option<&Path>) -> String {
        let options = &self.options;
        let db_name = self.db_name().unwrap_or_default();
        let credentials_file = credentials_file
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut command = vec![
            quote(
                options.platform,
                &format!("{}mysqldump", options.dump_binary_path),
            ),
            format!("--defaults-extra-file=\"{}\"", credentials_file),
        ];

        if !self.create_tables {
            command.push("--no-create-info".to_string());
        }

        if self.skip_comments {
            command.push("--skip-comments".to_string());
        }

        command.push(if self.use_extended_inserts {
            "--extended-insert".to_string()
        } else {
            "--skip-extended-insert".to_string()
        });

        if self.use_single_transaction {
            command.push("--single-transaction".to_string());
        }

        if self.skip_lock_tables {
            command.push("--skip-lock-tables".to_string());
        }

        if self.use_quick {
            command.push("--quick".to_string());
        }

        if !options.socket.is_empty() {
            command.push(format!("--socket={}", options.socket));
        }

        for table in trimmed(&options.exclude_tables) {
            command.push(format!("--ignore-table={}.{}", db_name, table));
        }

        if !self.default_character_set.is_empty() {
            command.push(format!(
                "--default-character-set={}",
                self.default_character_set
            ));
        }

        command.extend(options.extra_options.iter().cloned());

        if self.set_gtid_purged != GTID_PURGED_AUTO {
            command.push(format!("--set-gtid-purged={}", self.set_gtid_purged));
        }

        if !self.db_name_was_set_as_extra_option() {
            command.push(db_name.to_string());
        }

        if !options.include_tables.is_empty() {
            command.push(format!(
                "--tables {}",
                trimmed(&options.include_tables).collect::<Vec<_>>().join(" ")
            ));
        }

        command.extend(options.extra_options_after_db_name.iter().cloned());

        redirect_to_file(
            &command.join(" "),
            &dump_file.to_string_lossy(),
            options.compressor(),
            options.platform,
        )
    }

    fn credentials_file_contents(&self) -> Option<(&'static str, String)> {
        Some((".txt", self.contents_of_credentials_file()))
    }

    /// The last of `set_db_name` and `--databases <name>` extra options wins.
    fn db_name(&self) -> Option<&str> {
        let named = self
            .options
            .extra_options
            .iter()
            .enumerate()
            .filter_map(|(position, option)| match database_selection(option) {
                Some(DatabaseSelection::Named(name)) => Some((position, name)),
                _ => None,
            })
            .last();

        match (named, self.options.db_name.as_deref()) {
            (Some((position, _)), Some(db_name)) if position < self.options.db_name_set_at => {
                Some(db_name)
            }
            (Some((_, name)), _) => Some(name),
            (None, db_name) => db_name,
        }
    }
}
