use std::io::Write;
use std::path::Path;

use log::debug;
use tempfile::{Builder, TempPath};

use crate::error::DumpError;

/// Plaintext credentials handed to a dump binary through a file.
///
/// The file lives in the system temp directory, is only readable by its
/// owner on unix and is removed when the value is dropped. Removal errors
/// are ignored.
#[derive(Debug)]
pub struct TemporaryCredentialsFile {
    path: TempPath,
}

impl TemporaryCredentialsFile {
    /// `suffix` is appended verbatim to the random name, e.g. `.txt`
    pub fn create(suffix: &str, contents: &str) -> Result<Self, DumpError> {
        let name = random_file_name();
        let dir = std::env::temp_dir();
        let credentials_error = |source| DumpError::Credentials {
            path: dir.join(format!("{}{}", name, suffix)),
            source,
        };

        let mut file = Builder::new()
            .prefix(name.as_str())
            .suffix(suffix)
            .rand_bytes(0)
            .tempfile_in(&dir)
            .map_err(credentials_error)?;

        file.write_all(contents.as_bytes())
            .map_err(credentials_error)?;

        let path = file.into_temp_path();
        debug!("staged credentials in {}", path.display());

        Ok(TemporaryCredentialsFile { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// six random bytes read as a little endian integer, in base 36
fn random_file_name() -> String {
    let bytes: [u8; 6] = rand::random();
    let value = bytes
        .iter()
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | *byte as u64);

    to_base36(value)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut digits = vec![];
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    // only ASCII digits were pushed
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::{random_file_name, to_base36, TemporaryCredentialsFile};

    #[test]
    fn base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(0xffff_ffff_ffff), "2rrvthnxtr");
    }

    #[test]
    fn random_names_are_short_and_lowercase() {
        let name = random_file_name();
        assert!(!name.is_empty() && name.len() <= 10);
        assert!(name
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn file_is_written_then_removed_on_drop() {
        let credentials = TemporaryCredentialsFile::create(".txt", "[client]\nuser = 'root'")
            .expect("cannot stage credentials");
        let path = credentials.path().to_path_buf();

        assert!(path.starts_with(std::env::temp_dir()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("txt"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[client]\nuser = 'root'"
        );

        drop(credentials);
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let credentials = TemporaryCredentialsFile::create("", "localhost:5432:db:root:pw")
            .expect("cannot stage credentials");
        let mode = std::fs::metadata(credentials.path())
            .unwrap()
            .permissions()
            .mode();

        assert_eq!(mode & 0o777, 0o600);
    }
}
