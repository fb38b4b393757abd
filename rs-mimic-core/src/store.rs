use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::history::Identity;
use crate::io;
use crate::model::corpus::Corpus;

/// File extension of corpus files.
pub const CORPUS_EXTENSION: &str = "corpus";

/// Lookup of a sender's corpus.
///
/// The generator only ever reads through this trait, so tests can hand it an
/// in-memory [`CorpusMap`] instead of a directory.
pub trait CorpusSource {
	/// Returns the corpus of `sender`.
	///
	/// # Errors
	/// Returns `Error::CorpusNotFound` if the sender has no corpus.
	fn load(&self, sender: &Identity) -> Result<Cow<'_, Corpus>>;

	/// Lists senders that have a corpus, sorted.
	fn senders(&self) -> Result<Vec<Identity>>;
}

impl<T: CorpusSource + ?Sized> CorpusSource for &T {
	fn load(&self, sender: &Identity) -> Result<Cow<'_, Corpus>> {
		(**self).load(sender)
	}

	fn senders(&self) -> Result<Vec<Identity>> {
		(**self).senders()
	}
}

/// Directory holding one `<sender>.corpus` file per sender.
///
/// # Notes
/// - The directory is created on first save.
/// - Saving replaces the previous file atomically (temp file + rename).
/// - Sender identities are escaped into safe file names.
#[derive(Clone, Debug)]
pub struct CorpusDir {
	dir: PathBuf,
}

impl CorpusDir {
	pub fn new<P: AsRef<Path>>(dir: P) -> Self {
		Self { dir: dir.as_ref().to_path_buf() }
	}

	pub fn path(&self) -> &Path {
		&self.dir
	}

	/// Path of the file holding `sender`'s corpus (whether it exists or not).
	pub fn corpus_path(&self, sender: &Identity) -> PathBuf {
		io::build_output_path(&self.dir, sender, CORPUS_EXTENSION)
	}

	pub fn contains(&self, sender: &Identity) -> bool {
		self.corpus_path(sender).is_file()
	}

	/// Writes `corpus` under its sender's name and returns the file path.
	pub fn save(&self, corpus: &Corpus) -> Result<PathBuf> {
		let path = self.corpus_path(corpus.sender());
		corpus.save(&path)?;
		Ok(path)
	}
}

impl CorpusSource for CorpusDir {
	fn load(&self, sender: &Identity) -> Result<Cow<'_, Corpus>> {
		let path = self.corpus_path(sender);
		let corpus = match Corpus::load(&path) {
			Ok(corpus) => corpus,
			Err(Error::Storage(e)) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(Error::CorpusNotFound { sender: sender.clone() });
			}
			Err(e) => return Err(e),
		};

		if corpus.sender() != sender {
			return Err(Error::InvalidCorpusFile(format!(
				"{} holds the corpus of {}, not {}",
				path.display(),
				corpus.sender(),
				sender
			)));
		}
		Ok(Cow::Owned(corpus))
	}

	/// Files whose names do not decode to an identity are ignored.
	fn senders(&self) -> Result<Vec<Identity>> {
		if !self.dir.is_dir() {
			return Ok(Vec::new());
		}

		let mut senders = Vec::new();
		for file in io::list_files(&self.dir, CORPUS_EXTENSION)? {
			let stem = io::get_filename(&file)?;
			if let Some(id) = io::decode_file_stem(&stem) {
				senders.push(Identity::from(id));
			}
		}
		senders.sort();
		Ok(senders)
	}
}

/// In-memory corpora keyed by sender.
#[derive(Clone, Debug, Default)]
pub struct CorpusMap {
	corpora: BTreeMap<Identity, Corpus>,
}

impl CorpusMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a corpus, returning the one it replaces.
	pub fn insert(&mut self, corpus: Corpus) -> Option<Corpus> {
		self.corpora.insert(corpus.sender().clone(), corpus)
	}

	pub fn get(&self, sender: &Identity) -> Option<&Corpus> {
		self.corpora.get(sender)
	}

	pub fn len(&self) -> usize {
		self.corpora.len()
	}

	pub fn is_empty(&self) -> bool {
		self.corpora.is_empty()
	}
}

impl FromIterator<Corpus> for CorpusMap {
	fn from_iter<I: IntoIterator<Item = Corpus>>(iter: I) -> Self {
		let mut map = Self::new();
		for corpus in iter {
			map.insert(corpus);
		}
		map
	}
}

impl CorpusSource for CorpusMap {
	fn load(&self, sender: &Identity) -> Result<Cow<'_, Corpus>> {
		self.corpora
			.get(sender)
			.map(Cow::Borrowed)
			.ok_or_else(|| Error::CorpusNotFound { sender: sender.clone() })
	}

	fn senders(&self) -> Result<Vec<Identity>> {
		Ok(self.corpora.keys().cloned().collect())
	}
}
