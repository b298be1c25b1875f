use std::fmt::Debug;

/// A shell utility the dump output is piped through before it hits the disk.
pub trait Compressor: Debug + Send + Sync {
    /// command placed on the right hand side of the pipe
    fn command(&self) -> &str;
    /// extension of the files it produces, without the leading dot
    fn extension(&self) -> &str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GzipCompressor;

impl Compressor for GzipCompressor {
    fn command(&self) -> &str {
        "gzip"
    }

    fn extension(&self) -> &str {
        "gz"
    }
}
