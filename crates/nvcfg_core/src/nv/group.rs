use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::nv::bytes::Cursor;
use crate::nv::{Compound, Field, Magic, NodeId, NumType, NvError, Result, Tree, Value, ValueType, Version};

/// Storage area a record was taken from; selects header shape and, per layout, field sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
	/// Not known; treated like permanent settings.
	#[default]
	Unknown,
	/// Permanent settings.
	Perm,
	/// Dynamic settings.
	Dyn,
	/// Gateway settings.
	Gws,
	/// Dynamic gateway settings.
	GwsDyn,
	/// Bootloader environment; 32-bit size and no version.
	BoltEnv,
}

impl Format {
	/// Every format.
	pub const ALL: [Self; 6] = [Self::Unknown, Self::Perm, Self::Dyn, Self::Gws, Self::GwsDyn, Self::BoltEnv];

	/// Lowercase name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::Perm => "perm",
			Self::Dyn => "dyn",
			Self::Gws => "gws",
			Self::GwsDyn => "gwsdyn",
			Self::BoltEnv => "boltenv",
		}
	}

	/// Type of the header size field.
	pub fn size_type(&self) -> NumType {
		match self {
			Self::BoltEnv => NumType::U32,
			_ => NumType::U16,
		}
	}

	/// Whether record headers carry a version.
	pub fn has_version(&self) -> bool {
		*self != Self::BoltEnv
	}

	/// Whether this is one of the dynamic settings areas.
	pub fn is_dynamic(&self) -> bool {
		matches!(self, Self::Dyn | Self::GwsDyn)
	}
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Format {
	type Err = NvError;

	fn from_str(text: &str) -> Result<Self> {
		Self::ALL
			.into_iter()
			.find(|format| format.as_str() == text)
			.ok_or_else(|| NvError::invalid_text("format", text))
	}
}

/// Device or firmware profile consulted while decoding.
pub trait Profile: fmt::Debug + Send + Sync {
	/// Profile name.
	fn name(&self) -> &str;

	/// Layout version to assume for records whose header carries none.
	fn default_version(&self, magic: Magic, format: Format) -> Option<Version> {
		let _ = (magic, format);
		None
	}
}

/// Profile backed by a fixed magic-to-version table.
#[derive(Debug, Clone, Default)]
pub struct StaticProfile {
	name: String,
	versions: BTreeMap<Magic, Version>,
}

impl StaticProfile {
	/// Empty profile.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			versions: BTreeMap::new(),
		}
	}

	/// Add a default version for `magic`.
	pub fn with_version(mut self, magic: Magic, version: Version) -> Self {
		self.versions.insert(magic, version);
		self
	}
}

impl Profile for StaticProfile {
	fn name(&self) -> &str {
		&self.name
	}

	fn default_version(&self, magic: Magic, _format: Format) -> Option<Version> {
		self.versions.get(&magic).copied()
	}
}

/// Payload layout of one record type.
pub trait GroupLayout: fmt::Debug + Send + Sync {
	/// Record identifier.
	fn magic(&self) -> Magic;

	/// Short name, used as the root node name.
	fn name(&self) -> &str;

	/// Whether headers carry a version (when the format has one).
	fn is_versioned(&self) -> bool {
		true
	}

	/// Whether payloads may end before every field is present.
	fn is_partial(&self) -> bool {
		true
	}

	/// Payload fields for a header.
	fn definition(&self, format: Format, version: Version, profile: Option<&dyn Profile>) -> Vec<Field>;
}

/// Layout with no fields; the whole payload lands in `_extra`.
#[derive(Debug, Clone)]
pub struct GenericLayout {
	magic: Magic,
	name: String,
}

impl GenericLayout {
	/// Layout for records of `magic`.
	pub fn new(magic: Magic) -> Self {
		Self {
			magic,
			name: format!("grp_{magic}"),
		}
	}
}

impl GroupLayout for GenericLayout {
	fn magic(&self) -> Magic {
		self.magic
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn definition(&self, _format: Format, _version: Version, _profile: Option<&dyn Profile>) -> Vec<Field> {
		Vec::new()
	}
}

/// Top-level record: header state plus the payload compound.
#[derive(Debug, Clone)]
pub struct Group {
	layout: Arc<dyn GroupLayout>,
	format: Format,
	version: Version,
	size: usize,
	profile: Option<Arc<dyn Profile>>,
	pub(crate) extra_len: usize,
	pub(crate) strict_size: bool,
	pub(crate) body: Compound,
}

impl Group {
	/// Unread record of `layout`.
	pub fn new(layout: Arc<dyn GroupLayout>) -> Self {
		let body = Compound::new(layout.is_partial(), 0);
		Self {
			layout,
			format: Format::Unknown,
			version: Version::default(),
			size: 0,
			profile: None,
			extra_len: 0,
			strict_size: true,
			body,
		}
	}

	/// Payload layout.
	pub fn layout(&self) -> &Arc<dyn GroupLayout> {
		&self.layout
	}

	/// Record identifier.
	pub fn magic(&self) -> Magic {
		self.layout.magic()
	}

	/// Storage area.
	pub fn format(&self) -> Format {
		self.format
	}

	/// Layout version from the header or profile.
	pub fn version(&self) -> Version {
		self.version
	}

	/// Size field of the last read header.
	pub fn size(&self) -> usize {
		self.size
	}

	/// Profile in effect.
	pub fn profile(&self) -> Option<&Arc<dyn Profile>> {
		self.profile.as_ref()
	}

	/// Length of preserved trailing payload.
	pub fn extra_len(&self) -> usize {
		self.extra_len
	}

	/// Type name, `group[<magic>]`.
	pub fn type_name(&self) -> String {
		format!("group[{}]", self.magic())
	}

	/// Whether this header carries a version.
	pub fn has_version(&self) -> bool {
		self.layout.is_versioned() && self.format.has_version()
	}

	/// Header length: magic, size, and optional version.
	pub fn header_len(&self) -> usize {
		4 + self.format.size_type().width() + if self.has_version() { 2 } else { 0 }
	}

	pub(crate) fn definition(&self) -> Vec<Field> {
		let mut fields = self.layout.definition(self.format, self.version, self.profile.as_deref());
		if self.extra_len > 0 {
			fields.push(Field::new("_extra", ValueType::data(self.extra_len)));
		}
		fields
	}
}

impl Tree {
	/// Tree holding an unread record of `layout`.
	pub fn for_layout(layout: Arc<dyn GroupLayout>) -> Self {
		let name = layout.name().to_owned();
		Self::from_value(&name, Value::Group(Group::new(layout)))
	}

	/// The record at the root.
	pub fn group(&self) -> Result<&Group> {
		self.value(self.root()).as_group()
	}

	/// Assign header context to a record; call [`Tree::init`] with `force` afterwards to rebuild its parts.
	pub fn set_header(&mut self, id: NodeId, format: Format, version: Version, profile: Option<Arc<dyn Profile>>) -> Result<()> {
		let group = self.value_mut(id).as_group_mut()?;
		group.format = format;
		group.version = version;
		group.profile = profile;
		Ok(())
	}

	pub(crate) fn set_strict_size(&mut self, id: NodeId, strict: bool) -> Result<()> {
		self.value_mut(id).as_group_mut()?.strict_size = strict;
		Ok(())
	}

	pub(crate) fn read_group(&mut self, id: NodeId, cursor: &mut Cursor<'_>) -> Result<usize> {
		let start = cursor.pos();
		let group = self.value(id).as_group()?;
		let (expected, format, strict, has_version, partial) =
			(group.magic(), group.format, group.strict_size, group.has_version(), group.body.partial);
		let profile = group.profile.clone();

		let magic = Magic(cursor.read_code4()?);
		if magic != expected {
			return Err(NvError::UnrecognizedRecord { magic });
		}
		let size = format.size_type().decode(cursor)?;
		let version = if has_version {
			Version(cursor.read_u16_be()?)
		} else {
			profile.as_deref().and_then(|profile| profile.default_version(magic, format)).unwrap_or_default()
		};
		let header = cursor.pos() - start;
		let size = usize::try_from(size).unwrap_or_default();
		if size < header {
			return Err(NvError::malformed(
				format!("group[{magic}]"),
				format!("record size {size} smaller than its {header} byte header"),
			));
		}

		let mut len = size - header;
		if len > cursor.remaining() {
			if strict {
				return Err(NvError::ShortRead {
					at: cursor.pos(),
					need: len,
					rem: cursor.remaining(),
				});
			}
			warn!(%magic, size, available = cursor.remaining(), "record truncated by end of input");
			len = cursor.remaining();
		}
		debug!(%magic, %format, %version, size, "group header");

		{
			let group = self.value_mut(id).as_group_mut()?;
			group.version = version;
			group.size = size;
			group.extra_len = 0;
		}
		self.init(id, true)?;

		let payload = cursor.read_exact(len)?;
		let mut body = Cursor::new(payload);
		let consumed = self.read_parts(id, &mut body, partial, len)?;
		if consumed < len {
			self.keep_extra(id, &payload[consumed..])?;
		}
		self.node_mut(id).set = true;
		Ok(header + len)
	}

	fn keep_extra(&mut self, id: NodeId, extra: &[u8]) -> Result<()> {
		debug!(path = %self.type_name(id), bytes = extra.len(), "keeping trailing payload");
		let parts = self.children(id).to_vec();
		let tail = parts.iter().rposition(|part| self.is_set(*part) && !self.is_disabled(*part)).map_or(0, |idx| idx + 1);
		for part in &parts[tail..] {
			self.set_disabled(*part, true);
		}

		let field = Field::new("_extra", ValueType::data(extra.len()));
		let part = self.alloc(&field, id);
		self.read(part, &mut Cursor::new(extra))?;

		let group = self.value_mut(id).as_group_mut()?;
		group.extra_len = extra.len();
		group.body.parts.push(part);
		group.body.observed += extra.len();
		Ok(())
	}

	pub(crate) fn write_group(&self, id: NodeId, out: &mut Vec<u8>) -> Result<()> {
		let group = self.value(id).as_group()?;
		let mut payload = Vec::new();
		self.write_parts(id, &mut payload)?;

		let total = group.header_len() + payload.len();
		out.extend_from_slice(&group.magic().bytes());
		group
			.format
			.size_type()
			.encode(total as i128, out)
			.map_err(|_| NvError::too_large(group.type_name(), format!("record size {total}")))?;
		if group.has_version() {
			out.extend_from_slice(&group.version.0.to_be_bytes());
		}
		out.extend_from_slice(&payload);
		Ok(())
	}
}
