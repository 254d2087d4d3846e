//! Content hashing for checksum documents.

use crate::models::HashAlgorithm;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 8192;

/// Computes the lowercase hex digest of a file's contents.
///
/// The file is streamed in fixed-size chunks, so memory use does not grow
/// with file size.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> std::io::Result<String> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    match algorithm {
        HashAlgorithm::Md5 => digest_reader::<Md5, _>(reader),
        HashAlgorithm::Sha256 => digest_reader::<Sha256, _>(reader),
    }
}

/// Computes the lowercase hex digest of a byte slice.
pub fn hash_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Md5 => hex::encode(Md5::digest(data)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
    }
}

fn digest_reader<D: Digest, R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
