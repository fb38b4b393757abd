use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{fs, io};

use tempfile::NamedTempFile;

use crate::history::Identity;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Writes `bytes` to `path` so that readers only ever see the previous
/// content or the complete new content.
///
/// The data goes to a temporary file in the same directory, is flushed to
/// disk, then renamed over `path`.
pub(crate) fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> io::Result<()> {
	let path = path.as_ref();
	let parent = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};
	fs::create_dir_all(parent)?;

	let mut temp_file = NamedTempFile::new_in(parent)?;
	temp_file.write_all(bytes)?;
	temp_file.as_file().sync_all()?;
	temp_file.persist(path).map_err(|e| e.error)?;
	Ok(())
}

/// Builds the file path of a sender's corpus inside `dir`.
///
/// Example:
/// `corpora` + `alice@example.com` + `"corpus"` → `corpora/alice@example.com.corpus`
pub(crate) fn build_output_path<P: AsRef<Path>>(dir: P, sender: &Identity, extension: &str) -> PathBuf {
	let mut output = dir.as_ref().join(encode_file_stem(sender.as_str()));
	output.as_mut_os_string().push(".");
	output.as_mut_os_string().push(extension);
	output
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./corpora/alice.corpus"` → `"alice"`
/// - `"alice.corpus"` → `"alice"`
pub(crate) fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Stem of the empty identity. A lone `%` is never produced otherwise.
const EMPTY_STEM: &str = "%";

fn is_plain(byte: u8) -> bool {
	byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'.' | b'_' | b'@' | b'-')
}

/// Turns an identity into a portable file stem.
///
/// Bytes outside `[a-z0-9._@-]` are written as `%XX` (uppercase hex), and so
/// is a leading dot (hidden files). Uppercase letters are escaped too, so two
/// identities never share a file on a case-insensitive filesystem. The empty
/// identity becomes `%`. The mapping is reversible with [`decode_file_stem`].
pub(crate) fn encode_file_stem(id: &str) -> String {
	if id.is_empty() {
		return EMPTY_STEM.to_owned();
	}
	let mut stem = String::with_capacity(id.len());
	for (i, byte) in id.bytes().enumerate() {
		if is_plain(byte) && !(i == 0 && byte == b'.') {
			stem.push(byte as char);
		} else {
			stem.push_str(&format!("%{byte:02X}"));
		}
	}
	stem
}

/// Inverse of [`encode_file_stem`]. Returns `None` for stems this crate
/// did not produce.
pub(crate) fn decode_file_stem(stem: &str) -> Option<String> {
	if stem == EMPTY_STEM {
		return Some(String::new());
	}
	let bytes = stem.as_bytes();
	let mut decoded = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			let hex = stem.get(i + 1..i + 3)?;
			if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
				return None;
			}
			decoded.push(u8::from_str_radix(hex, 16).ok()?);
			i += 3;
		} else {
			decoded.push(bytes[i]);
			i += 1;
		}
	}
	String::from_utf8(decoded).ok()
}
