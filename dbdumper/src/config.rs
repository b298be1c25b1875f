use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compressor::{Compressor, GzipCompressor};
use crate::databases::mongodb::MongoDb;
use crate::databases::mysql::MySql;
use crate::databases::postgres::PostgreSql;
use crate::databases::sqlite::Sqlite;
use crate::databases::{DbDumper, TableList};
use crate::utils::substitute_env_var;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub compression: Option<CompressionConfig>,
}

impl Config {
    pub fn compressor(&self) -> Option<Arc<dyn Compressor>> {
        self.compression.as_ref().map(|compression| match compression {
            CompressionConfig::Gzip => Arc::new(GzipCompressor) as Arc<dyn Compressor>,
        })
    }

    /// the dumper described by this configuration, compressor included
    pub fn dumper(&self) -> Result<Box<dyn DbDumper>, Error> {
        let compressor = self.compressor();
        let database = &self.database;

        let dumper: Box<dyn DbDumper> = match database.database_type {
            DatabaseType::MySql => {
                let mut mysql = database.apply(MySql::new(), compressor)?;
                if let Some(skip_comments) = database.skip_comments {
                    mysql = match skip_comments {
                        true => mysql.skip_comments(),
                        false => mysql.dont_skip_comments(),
                    };
                }
                if let Some(extended_inserts) = database.extended_inserts {
                    mysql = match extended_inserts {
                        true => mysql.use_extended_inserts(),
                        false => mysql.dont_use_extended_inserts(),
                    };
                }
                if database.single_transaction.unwrap_or(false) {
                    mysql = mysql.use_single_transaction();
                }
                if database.skip_lock_tables.unwrap_or(false) {
                    mysql = mysql.skip_lock_tables();
                }
                if database.quick.unwrap_or(false) {
                    mysql = mysql.use_quick();
                }
                if let Some(character_set) = &database.default_character_set {
                    mysql = mysql.set_default_character_set(character_set.as_str());
                }
                if let Some(set_gtid_purged) = &database.set_gtid_purged {
                    mysql = mysql.set_gtid_purged(set_gtid_purged.as_str());
                }
                if !database.create_tables.unwrap_or(true) {
                    mysql = mysql.do_not_create_tables();
                }
                Box::new(mysql)
            }
            DatabaseType::PostgreSql => {
                let mut postgres = database.apply(PostgreSql::new(), compressor)?;
                if database.inserts.unwrap_or(false) {
                    postgres = postgres.use_inserts();
                }
                if !database.create_tables.unwrap_or(true) {
                    postgres = postgres.do_not_create_tables();
                }
                Box::new(postgres)
            }
            DatabaseType::MongoDb => {
                let mut mongodb = database.apply(MongoDb::new(), compressor)?;
                if let Some(collection) = &database.collection {
                    mongodb = mongodb.set_collection(collection.as_str());
                }
                if let Some(authentication_database) = &database.authentication_database {
                    mongodb = mongodb.set_authentication_database(authentication_database.as_str());
                }
                Box::new(mongodb)
            }
            DatabaseType::Sqlite => Box::new(database.apply(Sqlite::new(), compressor)?),
        };

        Ok(dumper)
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub enum CompressionConfig {
    #[serde(rename = "gzip")]
    Gzip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DatabaseType {
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "postgresql")]
    PostgreSql,
    #[serde(rename = "mongodb")]
    MongoDb,
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl DatabaseType {
    /// the binary the dump command runs
    pub fn binary_name(&self) -> &'static str {
        match self {
            DatabaseType::MySql => "mysqldump",
            DatabaseType::PostgreSql => "pg_dump",
            DatabaseType::MongoDb => "mongodump",
            DatabaseType::Sqlite => "sqlite3",
        }
    }
}

/// `"a, b"` or `[a, b]`
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableListConfig {
    Single(String),
    List(Vec<String>),
}

impl From<&TableListConfig> for TableList {
    fn from(tables: &TableListConfig) -> Self {
        match tables {
            TableListConfig::Single(tables) => TableList::from(tables.as_str()),
            TableListConfig::List(tables) => TableList::from(tables.clone()),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub database_type: DatabaseType,
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub socket: Option<String>,
    pub binary_path: Option<String>,
    pub include_tables: Option<TableListConfig>,
    pub exclude_tables: Option<TableListConfig>,
    #[serde(default)]
    pub extra_options: Vec<String>,
    #[serde(default)]
    pub extra_options_after_db_name: Vec<String>,
    /// seconds
    pub timeout: Option<u64>,
    // mysql
    pub skip_comments: Option<bool>,
    pub extended_inserts: Option<bool>,
    pub single_transaction: Option<bool>,
    pub skip_lock_tables: Option<bool>,
    pub quick: Option<bool>,
    pub default_character_set: Option<String>,
    pub set_gtid_purged: Option<String>,
    // mysql and postgresql
    pub create_tables: Option<bool>,
    // postgresql
    pub inserts: Option<bool>,
    // mongodb
    pub collection: Option<String>,
    pub authentication_database: Option<String>,
}

impl DatabaseConfig {
    pub fn name(&self) -> Result<Option<String>, Error> {
        substitute_optional_env_var(self.name.as_deref())
    }

    pub fn username(&self) -> Result<Option<String>, Error> {
        substitute_optional_env_var(self.username.as_deref())
    }

    pub fn password(&self) -> Result<Option<String>, Error> {
        substitute_optional_env_var(self.password.as_deref())
    }

    pub fn host(&self) -> Result<Option<String>, Error> {
        substitute_optional_env_var(self.host.as_deref())
    }

    /// set the options every engine shares
    fn apply<D: DbDumper>(
        &self,
        mut dumper: D,
        compressor: Option<Arc<dyn Compressor>>,
    ) -> Result<D, Error> {
        if let Some(name) = self.name()? {
            dumper = dumper.set_db_name(name);
        }
        if let Some(username) = self.username()? {
            dumper = dumper.set_user_name(username);
        }
        if let Some(password) = self.password()? {
            dumper = dumper.set_password(password);
        }
        if let Some(host) = self.host()? {
            dumper = dumper.set_host(host);
        }
        if let Some(port) = self.port {
            dumper = dumper.set_port(port);
        }
        if let Some(socket) = &self.socket {
            dumper = dumper.set_socket(socket.as_str());
        }
        if let Some(binary_path) = &self.binary_path {
            dumper = dumper.set_dump_binary_path(binary_path.as_str());
        }
        if let Some(timeout) = self.timeout {
            dumper = dumper.set_timeout(Duration::from_secs(timeout));
        }
        if let Some(tables) = &self.include_tables {
            dumper = dumper
                .set_included_tables(tables)
                .map_err(|err| Error::new(ErrorKind::Other, err))?;
        }
        if let Some(tables) = &self.exclude_tables {
            dumper = dumper
                .set_excluded_tables(tables)
                .map_err(|err| Error::new(ErrorKind::Other, err))?;
        }
        for extra_option in &self.extra_options {
            dumper = dumper.add_extra_option(extra_option.as_str());
        }
        for extra_option in &self.extra_options_after_db_name {
            dumper = dumper.add_extra_option_after_db_name(extra_option.as_str());
        }
        if let Some(compressor) = compressor {
            dumper = dumper.use_shared_compressor(compressor);
        }

        Ok(dumper)
    }
}

fn substitute_optional_env_var(value: Option<&str>) -> Result<Option<String>, Error> {
    value.map(substitute_env_var).transpose()
}

#[cfg(test)]
mod tests {
    use crate::config::{CompressionConfig, Config, DatabaseType, TableListConfig};
    use crate::databases::TableList;

    #[test]
    fn parse_minimal_config() {
        let config: Config = serde_yaml::from_str(
            r#"
database:
  type: sqlite
  name: /var/lib/app.sqlite
"#,
        )
        .unwrap();

        assert_eq!(config.database.database_type, DatabaseType::Sqlite);
        assert_eq!(config.database.name, Some("/var/lib/app.sqlite".to_string()));
        assert!(config.database.extra_options.is_empty());
        assert_eq!(config.compression, None);
        assert!(config.compressor().is_none());
    }

    #[test]
    fn parse_compression() {
        let config: Config = serde_yaml::from_str(
            r#"
database:
  type: mongodb
  name: shop
compression: gzip
"#,
        )
        .unwrap();

        assert_eq!(config.compression, Some(CompressionConfig::Gzip));
        assert_eq!(config.compressor().unwrap().extension(), "gz");
    }

    #[test]
    fn unknown_database_type() {
        let config = serde_yaml::from_str::<Config>(
            r#"
database:
  type: oracle
  name: shop
"#,
        );

        assert!(config.is_err());
    }

    #[test]
    fn table_list_as_string_or_sequence() {
        let single: TableListConfig = serde_yaml::from_str("\"tb1, tb2\"").unwrap();
        let list: TableListConfig = serde_yaml::from_str("[tb1, tb2]").unwrap();

        assert_eq!(
            TableList::from(&single).into_inner(),
            vec!["tb1".to_string(), " tb2".to_string()]
        );
        assert_eq!(
            TableList::from(&list).into_inner(),
            vec!["tb1".to_string(), "tb2".to_string()]
        );
    }

    #[test]
    fn password_from_env_var() {
        std::env::set_var("DBDUMPER_CONFIG_TEST_PASSWORD", "secret");

        let config: Config = serde_yaml::from_str(
            r#"
database:
  type: postgresql
  name: shop
  username: root
  password: $DBDUMPER_CONFIG_TEST_PASSWORD
"#,
        )
        .unwrap();

        assert_eq!(config.database.password().unwrap(), Some("secret".to_string()));
    }

    #[test]
    fn missing_env_var() {
        let config: Config = serde_yaml::from_str(
            r#"
database:
  type: postgresql
  name: shop
  username: root
  password: $DBDUMPER_CONFIG_TEST_MISSING
"#,
        )
        .unwrap();

        assert!(config.database.password().is_err());
        assert!(config.dumper().is_err());
    }

    #[test]
    fn conflicting_tables() {
        let config: Config = serde_yaml::from_str(
            r#"
database:
  type: mysql
  name: shop
  username: root
  include_tables: tb1
  exclude_tables: [tb2]
"#,
        )
        .unwrap();

        let err = config.dumper().err().unwrap();
        assert_eq!(
            err.to_string(),
            "Cannot set [excludeTables] because it conflicts with parameter [includeTables]."
        );
    }
}
