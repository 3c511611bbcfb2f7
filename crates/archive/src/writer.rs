//! Buffered archive writer.
//!
//! Tiles may arrive in any order. Payloads are appended to an anonymous
//! spill file as they come in, identical payloads once. At
//! [`PmTilesWriter::finalize`] the index is sorted by tile id, duplicate ids
//! are rejected and the tiles are handed to the PMTiles container in that
//! order.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use pmtiles2::{Compression, PMTiles, TileType};
use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::header::ArchiveHeader;

/// A tile id and the index of the payload it points at.
#[derive(Debug, Clone, Copy)]
struct Pending {
    tile_id: u64,
    content: usize,
}

/// Counts reported after a successful finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinalizeStats {
    /// Tiles written by the caller.
    pub addressed_tiles: u64,
    /// Distinct payloads stored.
    pub tile_contents: u64,
    /// Total bytes written to the output.
    pub bytes_written: u64,
}

/// Collects tiles and writes them as one PMTiles v3 archive.
pub struct PmTilesWriter {
    spill: BufWriter<File>,
    /// Length of each unique payload, in spill order.
    contents: Vec<usize>,
    by_hash: HashMap<(u64, usize), usize>,
    pending: Vec<Pending>,
}

impl PmTilesWriter {
    /// Create a writer spilling tile data to the system temp directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_spill(tempfile::tempfile()?))
    }

    /// Create a writer spilling tile data into `dir`.
    pub fn new_in(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_spill(tempfile::tempfile_in(dir)?))
    }

    fn with_spill(file: File) -> Self {
        Self {
            spill: BufWriter::new(file),
            contents: Vec::new(),
            by_hash: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Number of tiles written so far.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct payloads written so far.
    pub fn unique_tiles(&self) -> usize {
        self.contents.len()
    }

    /// Add one tile. Identical payloads are stored once.
    pub fn write_tile(&mut self, tile_id: u64, data: &[u8]) -> Result<()> {
        let key = (content_hash(data), data.len());
        let content = match self.by_hash.get(&key) {
            Some(&index) => index,
            None => {
                self.spill.write_all(data)?;
                let index = self.contents.len();
                self.contents.push(data.len());
                self.by_hash.insert(key, index);
                index
            }
        };

        self.pending.push(Pending { tile_id, content });
        Ok(())
    }

    /// Write the complete archive to `out`.
    ///
    /// Fails with [`ArchiveError::DuplicateTile`] if a tile id was written
    /// more than once.
    pub fn finalize<W: Write + Seek>(
        self,
        out: &mut W,
        header: ArchiveHeader,
        metadata: &serde_json::Value,
    ) -> Result<FinalizeStats> {
        let Self {
            spill,
            contents,
            mut pending,
            ..
        } = self;

        pending.sort_unstable_by_key(|p| p.tile_id);
        if let Some(pair) = pending.windows(2).find(|w| w[0].tile_id == w[1].tile_id) {
            return Err(ArchiveError::DuplicateTile(pair[0].tile_id));
        }

        let mut spill = spill.into_inner().map_err(|e| e.into_error())?;
        spill.seek(SeekFrom::Start(0))?;
        let mut spill = BufReader::new(spill);
        let mut payloads = Vec::with_capacity(contents.len());
        for length in &contents {
            let mut buf = vec![0u8; *length];
            spill.read_exact(&mut buf)?;
            payloads.push(buf);
        }

        let mut archive = PMTiles::new(TileType::Unknown, Compression::None);
        header.apply(&mut archive);
        archive.meta_data = serde_json::from_value(metadata.clone())?;
        for p in &pending {
            archive.add_tile(p.tile_id, payloads[p.content].clone());
        }
        drop(payloads);

        let start = out.stream_position()?;
        archive.to_writer(out)?;
        let end = out.seek(SeekFrom::End(0))?;
        out.flush()?;

        let stats = FinalizeStats {
            addressed_tiles: pending.len() as u64,
            tile_contents: contents.len() as u64,
            bytes_written: end - start,
        };
        debug!(
            addressed_tiles = stats.addressed_tiles,
            tile_contents = stats.tile_contents,
            bytes = stats.bytes_written,
            "Finalized archive"
        );
        Ok(stats)
    }
}

fn content_hash(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}
