use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::nv::bytes::Cursor;
use crate::nv::{Format, GenericLayout, GroupLayout, Magic, NvError, Profile, Result, Tree, Version, builtin_layouts};

/// Record decoding behavior.
#[derive(Debug, Clone)]
pub struct ReadOptions {
	/// Decode unregistered magics as opaque records instead of failing.
	pub fallback_generic: bool,
	/// Fail when a size field claims more bytes than the input holds.
	pub strict_size: bool,
}

impl Default for ReadOptions {
	fn default() -> Self {
		Self {
			fallback_generic: false,
			strict_size: true,
		}
	}
}

impl ReadOptions {
	/// Preset for salvaging damaged or unfamiliar dumps.
	pub fn lenient() -> Self {
		Self {
			fallback_generic: true,
			strict_size: false,
		}
	}
}

/// Magic-keyed table of record prototypes.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
	prototypes: BTreeMap<Magic, Tree>,
}

impl GroupRegistry {
	/// Empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every built-in layout.
	pub fn builtin() -> Self {
		let mut registry = Self::new();
		for layout in builtin_layouts() {
			registry.register(layout);
		}
		registry
	}

	/// Add a prototype for `layout`.
	///
	/// # Panics
	///
	/// Panics when the magic is already registered.
	pub fn register(&mut self, layout: Arc<dyn GroupLayout>) {
		let magic = layout.magic();
		assert!(!self.prototypes.contains_key(&magic), "group {magic} already registered");
		debug!(%magic, name = layout.name(), "registered group");
		self.prototypes.insert(magic, Tree::for_layout(layout));
	}

	/// Whether `magic` has a prototype.
	pub fn contains(&self, magic: Magic) -> bool {
		self.prototypes.contains_key(&magic)
	}

	/// Registered magics in order.
	pub fn magics(&self) -> impl Iterator<Item = Magic> + '_ {
		self.prototypes.keys().copied()
	}

	/// Number of registered layouts.
	pub fn len(&self) -> usize {
		self.prototypes.len()
	}

	/// Whether nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.prototypes.is_empty()
	}

	/// Unread prototype for `magic`.
	pub fn prototype(&self, magic: Magic) -> Option<&Tree> {
		self.prototypes.get(&magic)
	}

	/// Fresh record of `magic` with its parts built for `format` and `version`.
	pub fn create(&self, magic: Magic, format: Format, version: Version) -> Result<Tree> {
		let mut tree = self.prototype(magic).cloned().ok_or(NvError::UnrecognizedRecord { magic })?;
		let root = tree.root();
		tree.set_header(root, format, version, None)?;
		tree.init(root, true)?;
		Ok(tree)
	}

	/// Decode one record at the cursor.
	///
	/// An unregistered magic fails with [`NvError::UnrecognizedRecord`] and leaves the cursor where it was, unless
	/// `opt.fallback_generic` is set.
	pub fn read(&self, cursor: &mut Cursor<'_>, format: Format, profile: Option<Arc<dyn Profile>>, opt: &ReadOptions) -> Result<Tree> {
		let magic = Magic(cursor.peek_code4()?);
		let mut tree = match self.prototype(magic) {
			Some(prototype) => prototype.clone(),
			None if opt.fallback_generic => {
				debug!(%magic, "unregistered magic, decoding as generic record");
				Tree::for_layout(Arc::new(GenericLayout::new(magic)))
			}
			None => return Err(NvError::UnrecognizedRecord { magic }),
		};
		trace!(%magic, offset = cursor.pos(), %format, "decoding record");

		let root = tree.root();
		tree.set_header(root, format, Version::default(), profile)?;
		tree.set_strict_size(root, opt.strict_size)?;
		tree.read(root, cursor)?;
		Ok(tree)
	}

	/// Decode consecutive records until the input is exhausted.
	pub fn read_all(&self, bytes: &[u8], format: Format, profile: Option<Arc<dyn Profile>>, opt: &ReadOptions) -> Result<Vec<Tree>> {
		let mut cursor = Cursor::new(bytes);
		let mut records = Vec::new();
		while !cursor.is_at_end() {
			records.push(self.read(&mut cursor, format, profile.clone(), opt)?);
		}
		debug!(count = records.len(), %format, "decoded record sequence");
		Ok(records)
	}
}

/// Process-wide registry of built-in layouts, populated on first access.
pub fn registry() -> &'static GroupRegistry {
	static REGISTRY: OnceLock<GroupRegistry> = OnceLock::new();
	REGISTRY.get_or_init(GroupRegistry::builtin)
}

#[cfg(test)]
mod tests;
