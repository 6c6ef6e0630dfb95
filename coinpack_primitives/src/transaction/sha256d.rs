use std::io::{self, Write};

use sha2::{Digest, Sha256};

/// Abstraction over a writer which SHA-256d-hashes the data being written.
#[derive(Default)]
pub struct HashWriter {
    hasher: Sha256,
}

impl HashWriter {
    /// Destroy this writer and return the double-SHA-256 hash of the data written to it.
    pub fn into_hash(self) -> [u8; 32] {
        *Sha256::digest(self.hasher.finalize()).as_ref()
    }
}

impl Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
