use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

use super::token_graph::TokenGraph;
use crate::error::GeneratorError;
use crate::io;

/// On-disk form of a built graph plus its provenance.
#[derive(Deserialize)]
struct Snapshot {
	source_id: String,
	depth: usize,
	fingerprint: u64,
	graph: TokenGraph,
}

/// Borrowed counterpart of `Snapshot`, used on the write path to avoid
/// cloning the graph. Field order must match `Snapshot`.
#[derive(Serialize)]
struct SnapshotRef<'a> {
	source_id: &'a str,
	depth: usize,
	fingerprint: u64,
	graph: &'a TokenGraph,
}

/// Snapshot store for built token graphs.
///
/// A snapshot lives beside its source file (`<stem>-d<depth>.bin`) and is
/// keyed by source path, token depth and a fingerprint of the source
/// bytes. `load` only returns a graph when all three match, so an edited
/// source is re-parsed even when its path did not change.
///
/// # Responsibilities
/// - Reload a previously built graph without re-parsing the source
/// - Persist a freshly built graph for the next construction
/// - Drop the snapshot on explicit invalidation
pub struct StateCache {
	source_path: PathBuf,
	snapshot_path: PathBuf,
	depth: usize,
}

impl StateCache {
	/// Creates a cache handle for a source file and token depth.
	///
	/// # Errors
	/// Fails if the source path has no file name to derive the snapshot
	/// path from.
	pub fn new<P: AsRef<Path>>(source_path: P, depth: usize) -> Result<Self, GeneratorError> {
		let source_path = source_path.as_ref().to_path_buf();
		let snapshot_path = io::snapshot_path(&source_path, depth)?;
		Ok(Self { source_path, snapshot_path, depth })
	}

	/// Loads the cached graph if the snapshot matches `content`, the
	/// current bytes of the source file.
	///
	/// Any mismatch (depth, source identity, content fingerprint) or an
	/// unreadable or undecodable snapshot is a miss, never an error.
	pub fn load(&self, content: &[u8]) -> Option<TokenGraph> {
		let bytes = match fs::read(&self.snapshot_path) {
			Ok(bytes) => bytes,
			Err(e) => {
				if e.kind() != std::io::ErrorKind::NotFound {
					log::warn!("unreadable snapshot {}: {e}", self.snapshot_path.display());
				}
				return None;
			}
		};

		let snapshot: Snapshot = match postcard::from_bytes(&bytes) {
			Ok(snapshot) => snapshot,
			Err(e) => {
				log::warn!("undecodable snapshot {}: {e}", self.snapshot_path.display());
				return None;
			}
		};

		if snapshot.depth != self.depth
			|| snapshot.source_id != self.source_id()
			|| snapshot.fingerprint != xxh64(content, 0)
		{
			log::debug!("stale snapshot for {}", self.source_path.display());
			return None;
		}

		log::debug!(
			"snapshot hit for {} (depth {})",
			self.source_path.display(),
			self.depth
		);
		Some(snapshot.graph)
	}

	/// Persists a built graph together with its provenance. `content`
	/// must be the source bytes the graph was built from.
	///
	/// # Errors
	/// Fails when the snapshot cannot be encoded or written.
	pub fn save(&self, content: &[u8], graph: &TokenGraph) -> Result<(), GeneratorError> {
		let source_id = self.source_id();
		let snapshot = SnapshotRef {
			source_id: &source_id,
			depth: self.depth,
			fingerprint: xxh64(content, 0),
			graph,
		};

		let bytes = postcard::to_stdvec(&snapshot)?;
		fs::write(&self.snapshot_path, bytes)?;
		log::debug!("snapshot saved to {}", self.snapshot_path.display());
		Ok(())
	}

	/// Removes the snapshot so the next `load` misses, even for an
	/// unchanged source identity.
	///
	/// # Errors
	/// Fails when an existing snapshot file cannot be removed.
	pub fn invalidate(&self) -> Result<(), GeneratorError> {
		if self.snapshot_path.exists() {
			fs::remove_file(&self.snapshot_path)?;
			log::debug!("snapshot {} invalidated", self.snapshot_path.display());
		}
		Ok(())
	}

	fn source_id(&self) -> String {
		self.source_path.to_string_lossy().into_owned()
	}
}
