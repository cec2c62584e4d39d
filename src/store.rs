use crate::config::Number;
use crate::document::{Document, IndexEntry, Metadata};
use crate::error::{Error, Result};
use crate::index::VectorIndex;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const INDEX_MAGIC: &[u8; 4] = b"RDX1";
const INDEX_EXTENSION: &str = "idx";

// Metadata values are self-describing, which bincode cannot decode, so they
// travel as JSON text inside the binary snapshot.
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    embedding: Vec<Number>,
    text: String,
    document_metadata: String,
    metadata: String,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    dimension: Option<u64>,
    entries: Vec<StoredEntry>,
}

/// Rejects names that would escape `storage_root` or produce no file name.
pub fn validate_index_name(index_name: &str) -> Result<()> {
    let invalid = index_name.is_empty()
        || index_name == "."
        || index_name == ".."
        || index_name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(Error::InvalidIndexName(index_name.to_string()));
    }
    Ok(())
}

pub fn artifact_path(index_name: &str, storage_root: &Path) -> Result<PathBuf> {
    validate_index_name(index_name)?;
    Ok(storage_root.join(format!("{}.{}", index_name, INDEX_EXTENSION)))
}

/// Names of all index artifacts under `storage_root`, sorted.
pub fn list_indexes(storage_root: impl AsRef<Path>) -> Result<Vec<String>> {
    let storage_root = storage_root.as_ref();
    if !storage_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(storage_root)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(INDEX_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

impl VectorIndex {
    /// Writes the whole index to `<storage_root>/<index_name>.idx`, replacing
    /// any previous artifact of that name. Returns the artifact path.
    pub fn save(&self, index_name: &str, storage_root: impl AsRef<Path>) -> Result<PathBuf> {
        let storage_root = storage_root.as_ref();
        let path = artifact_path(index_name, storage_root)?;
        fs::create_dir_all(storage_root)?;

        let snapshot = Snapshot {
            dimension: self.dimension().map(|d| d as u64),
            entries: self
                .entries()
                .iter()
                .map(encode_entry)
                .collect::<Result<Vec<_>>>()?,
        };

        let mut bytes = INDEX_MAGIC.to_vec();
        bincode::serialize_into(&mut bytes, &snapshot)
            .map_err(|e| Error::CorruptData(format!("failed to encode index: {}", e)))?;

        // Readers may hold the old artifact mapped, so never truncate it in place.
        let tmp = path.with_extension("idx.tmp");
        if let Err(e) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        log::info!(
            "Saved index '{}' ({} entries) to {}",
            index_name,
            self.len(),
            path.display()
        );
        Ok(path)
    }

    /// Reads back an index written by [`VectorIndex::save`].
    pub fn load(index_name: &str, storage_root: impl AsRef<Path>) -> Result<Self> {
        let path = artifact_path(index_name, storage_root.as_ref())?;
        log::debug!("Loading index '{}' from {}", index_name, path.display());

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound {
                    index_name: index_name.to_string(),
                    path,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if file.metadata()?.len() < INDEX_MAGIC.len() as u64 {
            return Err(Error::CorruptData(format!(
                "{} is too short to be an index",
                path.display()
            )));
        }

        let mmap = unsafe { Mmap::map(&file)? };
        let index = decode(&mmap)?;

        log::info!("Loaded index '{}' ({} entries)", index_name, index.len());
        Ok(index)
    }
}

fn encode_entry(entry: &IndexEntry) -> Result<StoredEntry> {
    let to_json = |metadata: &Metadata| {
        serde_json::to_string(metadata)
            .map_err(|e| Error::CorruptData(format!("failed to encode metadata: {}", e)))
    };
    Ok(StoredEntry {
        embedding: entry.embedding.clone(),
        text: entry.document.text.clone(),
        document_metadata: to_json(&entry.document.metadata)?,
        metadata: to_json(&entry.metadata)?,
    })
}

fn decode(bytes: &[u8]) -> Result<VectorIndex> {
    let payload = bytes
        .strip_prefix(INDEX_MAGIC.as_slice())
        .ok_or_else(|| Error::CorruptData("missing index header".to_string()))?;

    let snapshot: Snapshot = bincode::deserialize(payload)
        .map_err(|e| Error::CorruptData(format!("failed to decode index: {}", e)))?;

    let dimension = snapshot.dimension.map(|d| d as usize);
    if dimension.is_none() && !snapshot.entries.is_empty() {
        return Err(Error::CorruptData("entries without a dimension".to_string()));
    }

    let from_json = |raw: &str| {
        serde_json::from_str::<Metadata>(raw)
            .map_err(|e| Error::CorruptData(format!("failed to decode metadata: {}", e)))
    };

    let entries = snapshot
        .entries
        .into_iter()
        .map(|stored| {
            if Some(stored.embedding.len()) != dimension {
                return Err(Error::CorruptData(format!(
                    "embedding width {} does not match index dimension {:?}",
                    stored.embedding.len(),
                    dimension
                )));
            }
            Ok(IndexEntry {
                embedding: stored.embedding,
                document: Document::with_metadata(stored.text, from_json(&stored.document_metadata)?),
                metadata: from_json(&stored.metadata)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VectorIndex::from_parts(entries, dimension))
}
