//! Streaming checksum computation for uploaded survey-data files.
//!
//! Digests are computed over fixed-size chunks so arbitrarily large
//! files never have to fit in memory, and the stream is rewound both
//! before and after hashing so later stages can read the same bytes
//! again.

use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

const CHUNK_SIZE: usize = 4096;

/// Digest algorithm declared in upload metadata.
///
/// SHA-1 and MD5 exist only for compatibility with legacy declared
/// checksums; new uploads should always declare SHA-256.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    #[default]
    Sha256,
    Sha1,
    Md5,
}

impl FromStr for ChecksumAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("sha256") {
            Ok(Self::Sha256)
        } else if s.eq_ignore_ascii_case("sha1") {
            Ok(Self::Sha1)
        } else if s.eq_ignore_ascii_case("md5") {
            Ok(Self::Md5)
        } else {
            Err(UnsupportedAlgorithm(s.to_string()))
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha1 => write!(f, "SHA1"),
            Self::Md5 => write!(f, "MD5"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported checksum algorithm `{0}`")]
pub struct UnsupportedAlgorithm(pub String);

enum Hasher {
    Sha256(Sha256),
    Sha1(Sha1),
    Md5(md5::Context),
}

impl Hasher {
    fn new(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            ChecksumAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            ChecksumAlgorithm::Md5 => Self::Md5(md5::Context::new()),
        }
    }

    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(chunk),
            Self::Sha1(h) => h.update(chunk),
            Self::Md5(h) => h.consume(chunk),
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Sha1(h) => format!("{:x}", h.finalize()),
            Self::Md5(h) => format!("{:x}", h.compute()),
        }
    }
}

/// Compute the lowercase hex digest of `reader` with `algorithm`.
///
/// The reader is rewound to the start before hashing and again after,
/// so the caller can re-read the same bytes afterwards.
pub async fn digest_stream<R>(reader: &mut R, algorithm: ChecksumAlgorithm) -> io::Result<String>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    reader.rewind().await?;

    let mut hasher = Hasher::new(algorithm);
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    reader.rewind().await?;
    Ok(hasher.finalize_hex())
}
