//! Item discovery: pairing image files with their JSON descriptors and
//! building the ordered, deduplicated item set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::types::{AssetMetadata, CacheDocument};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// One discovered item: the index (filename stem) and the paths of its
/// image/descriptor pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPair {
    pub index: String,
    pub image: PathBuf,
    pub metadata: PathBuf,
}

/// Ascending numeric order for item indices; non-numeric stems sort after
/// the numeric ones.
pub fn index_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Walk `dir` and build the ordered item set.
///
/// Deduplicated by index with an insertion-order-preserving pass that keeps
/// the first occurrence among freshly discovered files, then appends any
/// index already present in the cache but missing from the listing, so a
/// previously uploaded-but-unconfirmed item is retried even if its source
/// file was moved.
pub fn discover_items(dir: &Path, cache: &CacheDocument) -> Result<Vec<AssetPair>> {
    if !dir.is_dir() {
        bail!("assets directory {} does not exist", dir.display());
    }

    let mut discovered: Vec<AssetPair> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("listing assets directory {}", dir.display()))?
    {
        let path = entry?.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if !matches!(ext.as_deref(), Some(e) if IMAGE_EXTENSIONS.contains(&e)) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        discovered.push(AssetPair {
            index: stem.to_string(),
            metadata: dir.join(format!("{stem}.json")),
            image: path,
        });
    }

    discovered.sort_by(|a, b| index_order(&a.index, &b.index));

    let mut seen = HashSet::new();
    let mut items: Vec<AssetPair> = discovered
        .into_iter()
        .filter(|pair| seen.insert(pair.index.clone()))
        .collect();

    // Cached indices whose source files vanished still belong to the set.
    let mut cache_only: Vec<&String> = cache
        .items
        .keys()
        .filter(|idx| !seen.contains(*idx))
        .collect();
    cache_only.sort_by(|a, b| index_order(a, b));
    for idx in cache_only {
        debug!("index {} present in cache but not on disk", idx);
        items.push(AssetPair {
            index: idx.clone(),
            image: dir.join(format!("{idx}.png")),
            metadata: dir.join(format!("{idx}.json")),
        });
    }

    Ok(items)
}

/// Read and parse an item's descriptor, rewriting the embedded image
/// filename to the canonical `<stem>.png` when it differs. Returns the
/// parsed descriptor and the bytes to upload.
pub fn load_metadata(pair: &AssetPair) -> Result<(AssetMetadata, Vec<u8>)> {
    let bytes = std::fs::read(&pair.metadata)
        .with_context(|| format!("reading descriptor {}", pair.metadata.display()))?;
    let mut meta: AssetMetadata = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing descriptor {}", pair.metadata.display()))?;

    let canonical = format!("{}.png", pair.index);
    if meta.image != canonical {
        debug!(
            "rewriting image filename {:?} -> {:?} for index {}",
            meta.image, canonical, pair.index
        );
        meta.image = canonical;
    }

    let out = serde_json::to_vec(&meta)?;
    Ok((meta, out))
}
