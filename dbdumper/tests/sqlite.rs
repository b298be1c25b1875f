use std::io::Read;
use std::path::Path;
use std::process::Command;

use flate2::read::GzDecoder;

use dbdumper::{DbDumper, DumpError, GzipCompressor, Platform, Sqlite};

fn binaries_available(binaries: &[&str]) -> bool {
    for binary in binaries {
        if which::which(binary).is_err() {
            eprintln!("'{}' not found in PATH, skipping", binary);
            return false;
        }
    }

    true
}

fn create_database(path: &Path) {
    let status = Command::new("sqlite3")
        .arg(path)
        .arg(
            "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL); \
             INSERT INTO customers (name) VALUES ('Alice'), ('Bob');",
        )
        .status()
        .unwrap();

    assert!(status.success());
}

#[cfg(unix)]
#[tokio::test]
async fn dump_sqlite_database() {
    if !binaries_available(&["sqlite3"]) {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("shop.sqlite");
    create_database(database.as_path());

    let dump_file = dir.path().join("dump.sql");
    let dumped = Sqlite::new()
        .set_platform(Platform::Unix)
        .set_db_name(database.to_string_lossy())
        .dump_to_file(dump_file.as_path())
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(dumped, dump_file);

    let dump = std::fs::read_to_string(dump_file).unwrap();
    assert!(dump.contains("CREATE TABLE customers"));
    assert!(dump.contains("'Alice'"));
    assert!(dump.contains("COMMIT;"));
}

#[cfg(unix)]
#[tokio::test]
async fn dump_sqlite_database_with_gzip() {
    if !binaries_available(&["sqlite3", "gzip"]) {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("shop.sqlite");
    create_database(database.as_path());

    // a space and brackets in the destination must not break the command
    let output_dir = dir.path().join("new (directory)");
    std::fs::create_dir(&output_dir).unwrap();
    let dump_file = output_dir.join("dump.sql.gz");

    let sqlite = Sqlite::new()
        .set_platform(Platform::Unix)
        .set_db_name(database.to_string_lossy())
        .use_compressor(GzipCompressor);
    assert_eq!(sqlite.compressor_extension(), Some("gz"));

    let dumped = sqlite
        .dump_to_file(dump_file.as_path())
        .unwrap()
        .wait()
        .await
        .unwrap();

    let mut dump = String::new();
    GzDecoder::new(std::fs::File::open(dumped).unwrap())
        .read_to_string(&mut dump)
        .unwrap();

    assert!(dump.contains("CREATE TABLE customers"));
    assert!(dump.contains("'Bob'"));
}

#[cfg(unix)]
#[tokio::test]
async fn missing_dump_binary_fails_the_dump() {
    let dir = tempfile::tempdir().unwrap();
    let dump_file = dir.path().join("dump.sql");

    let err = Sqlite::new()
        .set_platform(Platform::Unix)
        .set_db_name("shop.sqlite")
        .set_dump_binary_path(dir.path().join("bin").to_string_lossy())
        .dump_to_file(dump_file.as_path())
        .unwrap()
        .wait()
        .await
        .unwrap_err();

    match err {
        DumpError::ProcessFailed { code, description } => {
            assert_eq!(code, Some(127));
            assert!(!description.is_empty());
        }
        err => panic!("unexpected error: {}", err),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn compressed_dump_keeps_the_exit_code_of_the_dump_binary() {
    if !binaries_available(&["gzip"]) {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let dump_file = dir.path().join("dump.sql.gz");

    let err = Sqlite::new()
        .set_platform(Platform::Unix)
        .set_db_name("shop.sqlite")
        .set_dump_binary_path(dir.path().join("bin").to_string_lossy())
        .use_compressor(GzipCompressor)
        .dump_to_file(dump_file.as_path())
        .unwrap()
        .wait()
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::ProcessFailed { code: Some(127), .. }));
}
