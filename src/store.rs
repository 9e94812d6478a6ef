use std::{
	collections::VecDeque,
	io,
	path::{Path, PathBuf},
	sync::Arc,
	time::SystemTime,
};

use tokio::sync::RwLock;

use crate::model::{NewPost, Post};

/// The maximum number of posts kept live. Older posts are evicted first.
pub const RETENTION: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("data directory {} does not exist", .0.display())]
	MissingDirectory(PathBuf),
	#[error("record io error: {0}")]
	Io(#[from] io::Error),
	#[error("record encoding error: {0}")]
	Encode(#[from] serde_json::Error),
	#[error("post ids are exhausted")]
	IdsExhausted,
}

/// The bounded collection of posts shared by every handler.
///
/// Readers take a snapshot under the shared lock. [`Store::append`] holds the
/// exclusive lock across id assignment, the record write, insertion and
/// eviction, so a reader never sees a partially written post or more than
/// [`RETENTION`] entries.
pub struct Store {
	posts: RwLock<Posts>,
	records: Option<Records>,
}

struct Posts {
	/// Oldest first, in insertion order.
	entries: VecDeque<Arc<Post>>,
	next_id: i64,
}

impl Store {
	/// Creates a store that keeps posts in memory only.
	///
	/// `seed` is the first id handed out, usually the current epoch seconds
	/// so ids keep increasing across restarts.
	pub fn memory(seed: i64) -> Self {
		Self {
			posts: RwLock::new(Posts {
				entries: VecDeque::with_capacity(RETENTION + 1),
				next_id: seed,
			}),
			records: None,
		}
	}

	/// Opens a store backed by one record file per post in `dir`.
	///
	/// Existing records are ordered by modification time and trimmed to the
	/// retention window. Unreadable records are logged and skipped.
	pub async fn open(dir: impl Into<PathBuf>, seed: i64) -> Result<Self, Error> {
		let records = Records { dir: dir.into() };

		match tokio::fs::metadata(&records.dir).await {
			Ok(metadata) if metadata.is_dir() => {}
			_ => return Err(Error::MissingDirectory(records.dir)),
		}

		let mut loaded = Vec::new();

		for record in records.scan().await? {
			match record {
				Record::Loaded { post, modified } => loaded.push((modified, post)),
				Record::Unreadable { path, error } => {
					tracing::warn!(path = %path.display(), %error, "skipping unreadable post record");
				}
			}
		}

		loaded.sort_by(|(a_time, a), (b_time, b)| a_time.cmp(b_time).then(a.id.cmp(&b.id)));

		let excess = loaded.len().saturating_sub(RETENTION);

		for (_, post) in loaded.drain(..excess) {
			records.remove(post.id).await;
		}

		let next_id = loaded
			.iter()
			.filter_map(|(_, post)| post.id.checked_add(1))
			.max()
			.map_or(seed, |id| id.max(seed));

		tracing::info!(
			dir = %records.dir.display(),
			posts = loaded.len(),
			evicted = excess,
			next_id,
			"loaded post records"
		);

		Ok(Self {
			posts: RwLock::new(Posts {
				entries: loaded.into_iter().map(|(_, post)| Arc::new(post)).collect(),
				next_id,
			}),
			records: Some(records),
		})
	}

	/// Stores a validated submission, returning it with its assigned id.
	pub async fn append(&self, post: NewPost) -> Result<Arc<Post>, Error> {
		let mut posts = self.posts.write().await;

		let next_id = posts.next_id.checked_add(1).ok_or(Error::IdsExhausted)?;
		let post = Arc::new(post.into_post(posts.next_id));

		if let Some(records) = &self.records {
			records.write(&post).await?;
		}

		posts.next_id = next_id;
		posts.entries.push_back(Arc::clone(&post));

		while posts.entries.len() > RETENTION {
			let Some(evicted) = posts.entries.pop_front() else {
				break;
			};

			tracing::debug!(id = evicted.id, "evicted post");

			if let Some(records) = &self.records {
				records.remove(evicted.id).await;
			}
		}

		Ok(post)
	}

	/// Returns a snapshot of every retained post, oldest first.
	pub async fn list(&self) -> Vec<Arc<Post>> {
		self.posts.read().await.entries.iter().cloned().collect()
	}

	pub async fn get(&self, id: i64) -> Option<Arc<Post>> {
		self.posts
			.read()
			.await
			.entries
			.iter()
			.find(|post| post.id == id)
			.cloned()
	}

	pub async fn len(&self) -> usize {
		self.posts.read().await.entries.len()
	}
}

/// The outcome of reading one record file during a directory scan.
#[derive(Debug)]
pub enum Record {
	Loaded { post: Post, modified: SystemTime },
	Unreadable { path: PathBuf, error: RecordError },
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
	#[error("read failed: {0}")]
	Io(#[from] io::Error),
	#[error("parse failed: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("file is named after post {expected} but holds post {found}")]
	IdMismatch { expected: i64, found: i64 },
	#[error("post {0} leaves no id for the next post")]
	LastId(i64),
}

struct Records {
	dir: PathBuf,
}

impl Records {
	fn path(&self, id: i64) -> PathBuf {
		self.dir.join(format!("{id}.json"))
	}

	/// Writes the record next to its final path and renames it into place.
	async fn write(&self, post: &Post) -> Result<(), Error> {
		let path = self.path(post.id);
		let partial = path.with_extension("json.tmp");

		let written = match tokio::fs::write(&partial, serde_json::to_vec(post)?).await {
			Ok(()) => tokio::fs::rename(&partial, &path).await,
			Err(error) => Err(error),
		};

		if let Err(error) = written {
			remove_quietly(&partial).await;
			return Err(error.into());
		}

		Ok(())
	}

	async fn remove(&self, id: i64) {
		remove_quietly(&self.path(id)).await;
	}

	async fn scan(&self) -> Result<Vec<Record>, Error> {
		let mut entries = tokio::fs::read_dir(&self.dir).await?;
		let mut records = Vec::new();

		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();

			if is_partial(&path) {
				tracing::debug!(path = %path.display(), "removing partial post record");
				remove_quietly(&path).await;
				continue;
			}

			let Some(id) = record_id(&path) else {
				continue;
			};

			records.push(match read_record(&path, id).await {
				Ok((post, modified)) => Record::Loaded { post, modified },
				Err(error) => Record::Unreadable { path, error },
			});
		}

		Ok(records)
	}
}

/// Record files are named `<id>.json`; anything else in the directory is ignored.
fn record_id(path: &Path) -> Option<i64> {
	if path.extension()? != "json" {
		return None;
	}

	path.file_stem()?.to_str()?.parse().ok()
}

/// Leftover `<id>.json.tmp` files from a write that never reached its rename.
fn is_partial(path: &Path) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| name.ends_with(".json.tmp"))
}

async fn remove_quietly(path: &Path) {
	match tokio::fs::remove_file(path).await {
		Ok(()) => {}
		Err(error) if error.kind() == io::ErrorKind::NotFound => {}
		Err(error) => tracing::warn!(path = %path.display(), %error, "failed to remove post record"),
	}
}

async fn read_record(path: &Path, id: i64) -> Result<(Post, SystemTime), RecordError> {
	let modified = tokio::fs::metadata(path).await?.modified()?;
	let post: Post = serde_json::from_slice(&tokio::fs::read(path).await?)?;

	if post.id != id {
		return Err(RecordError::IdMismatch {
			expected: id,
			found: post.id,
		});
	}

	if post.id.checked_add(1).is_none() {
		return Err(RecordError::LastId(post.id));
	}

	Ok((post, modified))
}
