use crate::compressor::Compressor;

/// Shell family the generated command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn is_windows(&self) -> bool {
        *self == Platform::Windows
    }

    pub fn quote(&self) -> char {
        match self {
            Platform::Windows => '"',
            Platform::Unix => '\'',
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}

/// wrap a binary or path token in the platform quote character
pub fn quote(platform: Platform, token: &str) -> String {
    let quote = platform.quote();
    format!("{}{}{}", quote, token, quote)
}

/// Escape a destination path and wrap it in double quotes.
///
/// Backslashes go first so the escapes added afterwards are not doubled.
pub fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len() + 2);
    escaped.push('"');

    for c in path.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\u{8}' => escaped.push_str("\\b"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\u{c}' => escaped.push_str("\\f"),
            '\r' => escaped.push_str("\\r"),
            '"' => escaped.push_str("\\\""),
            c => escaped.push(c),
        }
    }

    escaped.push('"');
    escaped
}

/// Send the output of `command` to `dump_file`, through the compressor if there is one.
///
/// On Unix the pipeline keeps the exit code of the dump command instead of
/// the one of the compressor: it is written to fd 3, which is then fed to a
/// subshell that exits with it.
pub fn redirect_to_file(
    command: &str,
    dump_file: &str,
    compressor: Option<&dyn Compressor>,
    platform: Platform,
) -> String {
    let dump_file = escape_path(dump_file);

    match compressor {
        None => format!("{} > {}", command, dump_file),
        Some(compressor) if platform.is_windows() => {
            format!("{} | {} > {}", command, compressor.command(), dump_file)
        }
        Some(compressor) => format!(
            "(((({}; echo $? >&3) | {} > {}) 3>&1) | (read x; exit $x))",
            command,
            compressor.command(),
            dump_file
        ),
    }
}
