use std::path::Path;

use crate::databases::{require, DbDumper, DumpOptions};
use crate::error::DumpError;
use crate::shell::{quote, redirect_to_file};

pub const DEFAULT_MONGODB_PORT: u16 = 27017;

/// Dumps a MongoDB database as a `mongodump` archive.
#[derive(Debug, Clone)]
pub struct MongoDb {
    options: DumpOptions,
    collection: Option<String>,
    authentication_database: Option<String>,
}

impl Default for MongoDb {
    fn default() -> Self {
        MongoDb {
            options: DumpOptions::new(DEFAULT_MONGODB_PORT),
            collection: None,
            authentication_database: None,
        }
    }
}

impl MongoDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// only dump this collection
    pub fn set_collection<S: Into<String>>(mut self, collection: S) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn set_authentication_database<S: Into<String>>(mut self, database: S) -> Self {
        self.authentication_database = Some(database.into());
        self
    }
}

impl DbDumper for MongoDb {
    fn options(&self) -> &DumpOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut DumpOptions {
        &mut self.options
    }

    fn guard_against_incomplete_credentials(&self) -> Result<(), DumpError> {
        require(&[
            ("dbName", self.db_name()),
            ("host", Some(self.options.host.as_str())),
        ])
    }

    fn dump_command(&self, dump_file: &Path, _credentials_file: Option<&Path>) -> String {
        let options = &self.options;

        let mut command = vec![
            quote(
                options.platform,
                &format!("{}mongodump", options.dump_binary_path),
            ),
            format!("--db {}", self.db_name().unwrap_or_default()),
            "--archive".to_string(),
        ];

        if let Some(user_name) = options.user_name().filter(|u| !u.is_empty()) {
            command.push(format!("--username '{}'", user_name));
        }

        if let Some(password) = options.password().filter(|p| !p.is_empty()) {
            command.push(format!("--password '{}'", password));
        }

        if !options.host.is_empty() {
            command.push(format!("--host {}", options.host));
        }

        if options.port != 0 {
            command.push(format!("--port {}", options.port));
        }

        if let Some(collection) = self.collection.as_deref().filter(|c| !c.is_empty()) {
            command.push(format!("--collection {}", collection));
        }

        if let Some(database) = self
            .authentication_database
            .as_deref()
            .filter(|d| !d.is_empty())
        {
            command.push(format!("--authenticationDatabase {}", database));
        }

        redirect_to_file(
            &command.join(" "),
            &dump_file.to_string_lossy(),
            options.compressor(),
            options.platform,
        )
    }

    fn command_contains_password(&self) -> bool {
        self.options.password().map_or(false, |p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::MongoDb;
    use crate::compressor::GzipCompressor;
    use crate::databases::DbDumper;
    use crate::error::DumpError;
    use crate::shell::Platform;

    fn get_mongodb() -> MongoDb {
        MongoDb::new()
            .set_platform(Platform::Unix)
            .set_db_name("dbname")
    }

    fn dump_command(mongodb: &MongoDb) -> String {
        mongodb.dump_command(Path::new("dbname.gz"), None)
    }

    #[test]
    fn no_credentials() {
        let err = MongoDb::new()
            .dump_to_file(Path::new("test.gz"))
            .unwrap_err();
        assert!(matches!(err, DumpError::EmptyParameter("dbName")));

        let err = get_mongodb()
            .set_host("")
            .guard_against_incomplete_credentials()
            .unwrap_err();
        assert!(matches!(err, DumpError::EmptyParameter("host")));
    }

    #[test]
    fn dump_command_without_credentials() {
        let command = dump_command(&get_mongodb());

        assert_eq!(
            command,
            "'mongodump' --db dbname --archive --host localhost --port 27017 > \"dbname.gz\""
        );
        assert!(!command.contains("--username"));
        assert!(!command.contains("--password"));
    }

    #[test]
    fn dump_command_with_gzip_compressor() {
        assert_eq!(
            dump_command(&get_mongodb().use_compressor(GzipCompressor)),
            "(((('mongodump' --db dbname --archive --host localhost --port 27017; echo $? >&3) | gzip > \"dbname.gz\") 3>&1) | (read x; exit $x))"
        );
    }

    #[test]
    fn dump_command_with_absolute_path_having_space_and_brackets() {
        assert_eq!(
            get_mongodb().dump_command(Path::new("/save/to/new (directory)/dbname.gz"), None),
            "'mongodump' --db dbname --archive --host localhost --port 27017 > \"/save/to/new (directory)/dbname.gz\""
        );
    }

    #[test]
    fn dump_command_with_username_and_password() {
        let mongodb = get_mongodb()
            .set_user_name("username")
            .set_password("password");

        assert_eq!(
            dump_command(&mongodb),
            "'mongodump' --db dbname --archive --username 'username' --password 'password' --host localhost --port 27017 > \"dbname.gz\""
        );
        assert!(mongodb.command_contains_password());
    }

    #[test]
    fn dump_command_with_custom_host_and_port() {
        assert_eq!(
            dump_command(&get_mongodb().set_host("mongodb.test.com").set_port(27018)),
            "'mongodump' --db dbname --archive --host mongodb.test.com --port 27018 > \"dbname.gz\""
        );
    }

    #[test]
    fn dump_command_for_a_single_collection() {
        assert_eq!(
            dump_command(&get_mongodb().set_collection("mycollection")),
            "'mongodump' --db dbname --archive --host localhost --port 27017 --collection mycollection > \"dbname.gz\""
        );
    }

    #[test]
    fn dump_command_with_custom_binary_path() {
        assert_eq!(
            dump_command(&get_mongodb().set_dump_binary_path("/custom/directory")),
            "'/custom/directory/mongodump' --db dbname --archive --host localhost --port 27017 > \"dbname.gz\""
        );
    }

    #[test]
    fn dump_command_with_authentication_database() {
        assert_eq!(
            dump_command(&get_mongodb().set_authentication_database("admin")),
            "'mongodump' --db dbname --archive --host localhost --port 27017 --authenticationDatabase admin > \"dbname.gz\""
        );
    }
}
