//! Registry file format: MessagePack + LZ4 with a trailing SHA-256 checksum,
//! written atomically (temp file, fsync, rename) so an interrupted pass never
//! leaves a corrupt registry behind.

use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

use super::error::RegistryError;
use super::{BatterRegistry, REGISTRY_VERSION};

const CHECKSUM_LEN: usize = 32;

/// Serialize and compress a registry for storage.
pub fn serialize_and_compress(registry: &BatterRegistry) -> Result<Vec<u8>, RegistryError> {
    let msgpack = to_vec_named(registry)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

/// Verify, decompress, and deserialize a stored registry.
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<BatterRegistry, RegistryError> {
    // Size-prepend header plus checksum is the minimum well-formed payload.
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(RegistryError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    if &hasher.finalize()[..] != checksum_bytes {
        return Err(RegistryError::ChecksumMismatch);
    }

    let msgpack =
        decompress_size_prepended(payload).map_err(|_| RegistryError::Decompression)?;
    let registry: BatterRegistry = from_slice(&msgpack)?;

    if registry.version > REGISTRY_VERSION {
        return Err(RegistryError::VersionMismatch {
            found: registry.version,
            expected: REGISTRY_VERSION,
        });
    }

    Ok(registry)
}

/// Persist a registry atomically: write to a temp sibling, fsync, rename.
pub fn save_registry(path: &Path, registry: &BatterRegistry) -> Result<(), RegistryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let data = serialize_and_compress(registry)?;
    let temp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.flush()?;
        file.sync_all()?;
    }

    rename(&temp_path, path)?;

    log::debug!(
        "Saved registry: {} batters, {} bytes to {}",
        registry.len(),
        data.len(),
        path.display()
    );
    Ok(())
}

/// Load a previously saved registry.
pub fn load_registry(path: &Path) -> Result<BatterRegistry, RegistryError> {
    if !path.exists() {
        return Err(RegistryError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let registry = decompress_and_deserialize(&data)?;
    log::debug!(
        "Loaded registry: {} batters from {}",
        registry.len(),
        path.display()
    );
    Ok(registry)
}
