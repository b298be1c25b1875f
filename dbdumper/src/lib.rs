pub mod compressor;
pub mod config;
pub mod credentials;
pub mod databases;
pub mod error;
pub mod process;
pub mod shell;
pub mod utils;

pub use compressor::{Compressor, GzipCompressor};
pub use databases::mongodb::MongoDb;
pub use databases::mysql::MySql;
pub use databases::postgres::PostgreSql;
pub use databases::sqlite::Sqlite;
pub use databases::{DbDumper, DumpOptions, TableList};
pub use error::DumpError;
pub use process::PendingDump;
pub use shell::Platform;
