//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read a fixture file.
///
/// # Panics
///
/// Panics when the fixture is missing.
pub fn fixture_bytes(name: &str) -> Vec<u8> {
	let path = fixture_path(name);
	std::fs::read(&path).unwrap_or_else(|err| panic!("fixture {} unreadable: {err}", path.display()))
}

/// Byte-level builder for group records, independent of the codec under test.
///
/// The size field is derived from the payload unless overridden.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
	magic: [u8; 4],
	version: Option<u16>,
	wide_size: bool,
	size: Option<u32>,
	payload: Vec<u8>,
}

impl RecordBuilder {
	/// Record of `magic` with version 0.1 and a 16-bit size.
	pub fn new(magic: &[u8; 4]) -> Self {
		Self {
			magic: *magic,
			version: Some(0x0001),
			wide_size: false,
			size: None,
			payload: Vec::new(),
		}
	}

	/// Header version `major.minor`.
	pub fn version(mut self, major: u8, minor: u8) -> Self {
		self.version = Some(u16::from_be_bytes([major, minor]));
		self
	}

	/// Omit the version from the header.
	pub fn unversioned(mut self) -> Self {
		self.version = None;
		self
	}

	/// Bootloader-style header: 32-bit size, no version.
	pub fn bolt(mut self) -> Self {
		self.wide_size = true;
		self.version = None;
		self
	}

	/// Force the size field.
	pub fn size(mut self, size: u32) -> Self {
		self.size = Some(size);
		self
	}

	/// Append one byte.
	pub fn u8(mut self, value: u8) -> Self {
		self.payload.push(value);
		self
	}

	/// Append a big-endian `u16`.
	pub fn u16(mut self, value: u16) -> Self {
		self.payload.extend_from_slice(&value.to_be_bytes());
		self
	}

	/// Append a big-endian `u32`.
	pub fn u32(mut self, value: u32) -> Self {
		self.payload.extend_from_slice(&value.to_be_bytes());
		self
	}

	/// Append raw bytes.
	pub fn raw(mut self, bytes: &[u8]) -> Self {
		self.payload.extend_from_slice(bytes);
		self
	}

	/// Append a `u8`-prefixed string, optionally NUL-terminated inside the prefix.
	pub fn p8str(self, text: &str, nul: bool) -> Self {
		let len = text.len() + usize::from(nul);
		let len = u8::try_from(len).expect("p8 string fits");
		let builder = self.u8(len).raw(text.as_bytes());
		if nul { builder.u8(0) } else { builder }
	}

	/// Append a `u16`-prefixed string without terminator.
	pub fn p16str(self, text: &str) -> Self {
		let len = u16::try_from(text.len()).expect("p16 string fits");
		self.u16(len).raw(text.as_bytes())
	}

	/// Append `text` zero-padded to `width`.
	pub fn fixed_str(self, text: &str, width: usize) -> Self {
		assert!(text.len() <= width, "{text:?} wider than {width}");
		let mut bytes = text.as_bytes().to_vec();
		bytes.resize(width, 0);
		self.raw(&bytes)
	}

	/// Header length for the configured shape.
	pub fn header_len(&self) -> usize {
		4 + if self.wide_size { 4 } else { 2 } + if self.version.is_some() { 2 } else { 0 }
	}

	/// Encode header and payload.
	pub fn build(&self) -> Vec<u8> {
		let total = self.header_len() + self.payload.len();
		let size = self.size.unwrap_or_else(|| u32::try_from(total).expect("record size fits"));

		let mut out = Vec::with_capacity(total);
		out.extend_from_slice(&self.magic);
		if self.wide_size {
			out.extend_from_slice(&size.to_be_bytes());
		} else {
			let size = u16::try_from(size).expect("size fits the 16-bit field");
			out.extend_from_slice(&size.to_be_bytes());
		}
		if let Some(version) = self.version {
			out.extend_from_slice(&version.to_be_bytes());
		}
		out.extend_from_slice(&self.payload);
		out
	}
}

/// Concatenate built records into one dump.
pub fn dump(records: &[RecordBuilder]) -> Vec<u8> {
	records.iter().flat_map(RecordBuilder::build).collect()
}
