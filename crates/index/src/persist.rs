//! Paired on-disk artifacts for a built index.
//!
//! The index is written as a small header (magic + codec byte) followed by a
//! bincode payload, optionally zstd-compressed. The catalog is plain JSON so it
//! can be inspected and edited by hand. Both carry the same build id; a pair
//! whose ids differ is rejected on load.

use std::fs;
use std::path::{Path, PathBuf};

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use fingerprint::{FingerprintHash, FINGERPRINT_VERSION};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use xxhash_rust::xxh3::Xxh3;
use zstd::stream::{decode_all, encode_all};

use crate::{FingerprintIndex, IndexEntry, IndexError, SongCatalog, INDEX_SCHEMA_VERSION};

const INDEX_MAGIC: &[u8; 4] = b"SPIX";
const HEADER_LEN: usize = INDEX_MAGIC.len() + 1;

/// Default file name of the index artifact.
pub const INDEX_FILE_NAME: &str = "database.bin";
/// Default file name of the catalog artifact.
pub const CATALOG_FILE_NAME: &str = "catalog.json";

/// Compression codec options for the index artifact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    /// Raw bincode, handy when inspecting artifacts.
    None,
    #[default]
    Zstd,
}

impl CompressionCodec {
    fn tag(self) -> u8 {
        match self {
            CompressionCodec::None => 0,
            CompressionCodec::Zstd => 1,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(CompressionCodec::None),
            1 => Some(CompressionCodec::Zstd),
            _ => None,
        }
    }
}

/// Compression behavior configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub codec: CompressionCodec,
    /// Zstd level (1-22); ignored for [`CompressionCodec::None`].
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(encode_all(data, self.level)?),
        }
    }
}

fn decompress(codec: CompressionCodec, data: &[u8]) -> Result<Vec<u8>, IndexError> {
    match codec {
        CompressionCodec::None => Ok(data.to_vec()),
        CompressionCodec::Zstd => {
            decode_all(data).map_err(|e| IndexError::Decode(format!("zstd: {e}")))
        }
    }
}

/// Options for [`save`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    pub compression: CompressionConfig,
}

impl PersistConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.compression.codec == CompressionCodec::Zstd
            && !(1..=22).contains(&self.compression.level)
        {
            return Err(IndexError::InvalidConfig(format!(
                "zstd level must be within 1..=22 (got {})",
                self.compression.level
            )));
        }
        Ok(())
    }
}

/// Locations of the two artifacts that make up a persisted database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub index: PathBuf,
    pub catalog: PathBuf,
}

impl ArtifactPaths {
    pub fn new(index: impl Into<PathBuf>, catalog: impl Into<PathBuf>) -> Self {
        Self {
            index: index.into(),
            catalog: catalog.into(),
        }
    }

    /// Default artifact names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(INDEX_FILE_NAME), dir.join(CATALOG_FILE_NAME))
    }

    /// True when both artifacts are present on disk.
    pub fn both_exist(&self) -> bool {
        self.index.is_file() && self.catalog.is_file()
    }
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    schema_version: u16,
    fingerprint_version: u16,
    /// Digest of the fingerprint settings the buckets were hashed with.
    fingerprint_digest: Option<u64>,
    build_id: u64,
    /// Buckets sorted by raw hash value so the payload is reproducible.
    buckets: Vec<(u32, Vec<IndexEntry>)>,
}

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    schema_version: u16,
    build_id: u64,
    songs: SongCatalog,
}

fn sorted_buckets(index: &FingerprintIndex) -> Vec<(u32, Vec<IndexEntry>)> {
    let mut buckets: Vec<(u32, Vec<IndexEntry>)> = index
        .iter()
        .map(|(hash, entries)| (hash.raw(), entries.to_vec()))
        .collect();
    buckets.sort_unstable_by_key(|(raw, _)| *raw);
    buckets
}

/// Content hash shared by the two artifacts of one build.
fn build_id(
    buckets: &[(u32, Vec<IndexEntry>)],
    catalog: &SongCatalog,
    fingerprint_digest: Option<u64>,
) -> u64 {
    let mut hasher = Xxh3::new();
    if let Some(digest) = fingerprint_digest {
        hasher.update(&digest.to_le_bytes());
    }
    for (id, source) in catalog.iter() {
        hasher.update(&id.0.to_le_bytes());
        hasher.update(source.as_bytes());
        hasher.update(&[0]);
    }
    for (raw, entries) in buckets {
        hasher.update(&raw.to_le_bytes());
        for entry in entries {
            hasher.update(&entry.song_id.0.to_le_bytes());
            hasher.update(&entry.time_bin.to_le_bytes());
        }
    }
    hasher.digest()
}

/// Write `index` and `catalog` to `paths`. Returns the build id stamped on both.
///
/// Refuses to write a pair whose index references songs missing from the
/// catalog. Parent directories are created as needed.
pub fn save(
    index: &FingerprintIndex,
    catalog: &SongCatalog,
    paths: &ArtifactPaths,
    cfg: &PersistConfig,
) -> Result<u64, IndexError> {
    cfg.validate()?;
    index.check_catalog(catalog)?;

    let buckets = sorted_buckets(index);
    let fingerprint_digest = index.fingerprint_digest();
    let build_id = build_id(&buckets, catalog, fingerprint_digest);

    let payload = encode_to_vec(
        IndexFile {
            schema_version: INDEX_SCHEMA_VERSION,
            fingerprint_version: FINGERPRINT_VERSION,
            fingerprint_digest,
            build_id,
            buckets,
        },
        standard(),
    )?;
    let compressed = cfg.compression.compress(&payload)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(INDEX_MAGIC);
    bytes.push(cfg.compression.codec.tag());
    bytes.extend_from_slice(&compressed);

    let catalog_json = serde_json::to_vec_pretty(&CatalogFile {
        schema_version: INDEX_SCHEMA_VERSION,
        build_id,
        songs: catalog.clone(),
    })
    .map_err(|e| IndexError::Encode(e.to_string()))?;

    for path in [&paths.index, &paths.catalog] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&paths.index, &bytes)?;
    fs::write(&paths.catalog, &catalog_json)?;

    info!(
        index_path = %paths.index.display(),
        catalog_path = %paths.catalog.display(),
        build_id = format_args!("{build_id:#018x}"),
        songs = catalog.len(),
        distinct_hashes = index.len(),
        bytes = bytes.len(),
        "index_save_success"
    );
    Ok(build_id)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, IndexError> {
    if !path.is_file() {
        return Err(IndexError::MissingArtifact(path.display().to_string()));
    }
    Ok(fs::read(path)?)
}

fn check_schema(found: u16) -> Result<(), IndexError> {
    if found != INDEX_SCHEMA_VERSION {
        return Err(IndexError::UnsupportedSchema {
            found,
            expected: INDEX_SCHEMA_VERSION,
        });
    }
    Ok(())
}

/// Load a persisted index and catalog pair.
///
/// Fails when either artifact is missing, when the two come from different
/// builds, or when the index references a song absent from the catalog.
pub fn load(paths: &ArtifactPaths) -> Result<(FingerprintIndex, SongCatalog), IndexError> {
    let bytes = read_artifact(&paths.index)?;
    let catalog_bytes = read_artifact(&paths.catalog)?;

    if bytes.len() < HEADER_LEN || &bytes[..INDEX_MAGIC.len()] != INDEX_MAGIC {
        return Err(IndexError::Decode(format!(
            "{} is not a songprint index",
            paths.index.display()
        )));
    }
    let tag = bytes[INDEX_MAGIC.len()];
    let codec = CompressionCodec::from_tag(tag)
        .ok_or_else(|| IndexError::Decode(format!("unknown compression tag {tag}")))?;
    let payload = decompress(codec, &bytes[HEADER_LEN..])?;
    let (file, _): (IndexFile, usize) = decode_from_slice(&payload, standard())?;
    check_schema(file.schema_version)?;
    if file.fingerprint_version != FINGERPRINT_VERSION {
        return Err(IndexError::Decode(format!(
            "index was built with fingerprint version {} but this build uses {}",
            file.fingerprint_version, FINGERPRINT_VERSION
        )));
    }

    let catalog_file: CatalogFile = serde_json::from_slice(&catalog_bytes)?;
    check_schema(catalog_file.schema_version)?;

    if file.build_id != catalog_file.build_id {
        return Err(IndexError::ArtifactMismatch {
            index: file.build_id,
            catalog: catalog_file.build_id,
        });
    }

    let mut index = FingerprintIndex::new();
    index.fingerprint_digest = file.fingerprint_digest;
    for (raw, entries) in file.buckets {
        let hash = FingerprintHash::from_raw(raw)
            .ok_or_else(|| IndexError::Decode(format!("hash {raw:#x} exceeds 30 bits")))?;
        for entry in entries {
            index.push(hash, entry);
        }
    }
    let catalog = catalog_file.songs;
    index.check_catalog(&catalog)?;

    debug!(build_id = format_args!("{:#018x}", file.build_id), "index_artifacts_verified");
    info!(
        index_path = %paths.index.display(),
        songs = catalog.len(),
        distinct_hashes = index.len(),
        entries = index.entry_count(),
        "index_load_success"
    );
    Ok((index, catalog))
}
