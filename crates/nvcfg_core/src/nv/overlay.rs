use std::collections::BTreeMap;
use std::sync::Arc;

use crate::nv::bytes::Cursor;
use crate::nv::text::parse_int;
use crate::nv::{NumType, NumValue, NvError, Result};

/// Whether table entries name ordinals or individual bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayMode {
	/// Entries name whole values.
	Enum,
	/// Entries name single bits; values are OR-combinations.
	Bitmask,
}

/// Name table of an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTable {
	/// Index is the value (enum) or the bit position (bitmask); empty names are gaps.
	Dense(Vec<Box<str>>),
	/// Raw value (enum) or flag value (bitmask) to name.
	Sparse(BTreeMap<i128, Box<str>>),
}

impl NameTable {
	fn len(&self) -> usize {
		match self {
			Self::Dense(names) => names.len(),
			Self::Sparse(names) => names.len(),
		}
	}
}

/// Name table laid over a numeric codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
	name: Box<str>,
	num: NumType,
	table: NameTable,
	mode: OverlayMode,
}

impl Overlay {
	/// Build an overlay.
	///
	/// # Panics
	///
	/// Panics when the table has more entries than the storage can address.
	pub fn new(name: &str, num: NumType, table: NameTable, mode: OverlayMode) -> Arc<Self> {
		let capacity = match mode {
			OverlayMode::Enum => num.storage_max(),
			OverlayMode::Bitmask => num.width() as i128 * 8,
		};
		assert!(
			table.len() as i128 <= capacity,
			"number of {mode:?} entries ({}) exceeds maximum for {}",
			table.len(),
			num.type_name()
		);

		let name = if name.is_empty() {
			match mode {
				OverlayMode::Enum => "enum",
				OverlayMode::Bitmask => "bitmask",
			}
		} else {
			name
		};
		Arc::new(Self {
			name: name.into(),
			num,
			table,
			mode,
		})
	}

	/// Enumeration whose values are the indexes of `names`.
	pub fn enumeration(name: &str, num: NumType, names: &[&str]) -> Arc<Self> {
		Self::new(name, num, dense(names), OverlayMode::Enum)
	}

	/// Enumeration over sparse raw values.
	pub fn enum_map(name: &str, num: NumType, entries: &[(i128, &str)]) -> Arc<Self> {
		Self::new(name, num, sparse(entries), OverlayMode::Enum)
	}

	/// Bitmask whose bit `i` is named `names[i]`.
	pub fn bitmask(name: &str, num: NumType, names: &[&str]) -> Arc<Self> {
		Self::new(name, num, dense(names), OverlayMode::Bitmask)
	}

	/// Bitmask over sparse flag values.
	pub fn bitmask_map(name: &str, num: NumType, entries: &[(i128, &str)]) -> Arc<Self> {
		Self::new(name, num, sparse(entries), OverlayMode::Bitmask)
	}

	/// Overlay name, used as type name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Underlying storage.
	pub fn num_type(&self) -> NumType {
		self.num
	}

	/// Enum or bitmask.
	pub fn mode(&self) -> OverlayMode {
		self.mode
	}

	/// Multi-line listing of the table, for help output.
	pub fn describe(&self) -> String {
		let mut out = self.name.to_string();
		let entries: Vec<(i128, &str)> = match &self.table {
			NameTable::Dense(names) => names
				.iter()
				.enumerate()
				.map(|(idx, name)| (self.dense_value(idx), name.as_ref()))
				.collect(),
			NameTable::Sparse(names) => names.iter().map(|(value, name)| (*value, name.as_ref())).collect(),
		};
		if entries.is_empty() {
			return out;
		}

		out.push_str(" {");
		for (value, name) in entries.into_iter().filter(|(_, name)| !name.is_empty()) {
			let value = match self.mode {
				OverlayMode::Enum => value.to_string(),
				OverlayMode::Bitmask => self.num.hex_text(value),
			};
			out.push_str(&format!("\n  {value} = {name}"));
		}
		out.push_str("\n}");
		out
	}

	fn dense_value(&self, idx: usize) -> i128 {
		match self.mode {
			OverlayMode::Enum => idx as i128,
			OverlayMode::Bitmask => 1_i128 << idx,
		}
	}

	fn name_of(&self, key: i128, bit: usize) -> Option<&str> {
		let found = match (&self.table, self.mode) {
			(NameTable::Dense(names), OverlayMode::Enum) => usize::try_from(key).ok().and_then(|idx| names.get(idx)),
			(NameTable::Dense(names), OverlayMode::Bitmask) => names.get(bit),
			(NameTable::Sparse(names), _) => names.get(&key),
		};
		found.map(|name| name.as_ref()).filter(|name| !name.is_empty())
	}

	fn str_to_num(&self, text: &str) -> Option<i128> {
		let by_name = match &self.table {
			NameTable::Dense(names) => names.iter().position(|name| !name.is_empty() && name.as_ref() == text).map(|idx| self.dense_value(idx)),
			NameTable::Sparse(names) => names.iter().find(|(_, name)| name.as_ref() == text).map(|(value, _)| *value),
		};
		by_name.or_else(|| self.raw_to_num(text))
	}

	fn raw_to_num(&self, text: &str) -> Option<i128> {
		parse_int(text).filter(|value| *value >= self.num.storage_min() && *value <= self.num.storage_max())
	}

	/// Value of the `<name>(<n>)` form rendered for an enum value without a name.
	fn unnamed_to_num(&self, text: &str) -> Option<i128> {
		let inner = text.strip_prefix(self.name.as_ref())?.strip_prefix('(')?.strip_suffix(')')?;
		self.raw_to_num(inner)
	}
}

fn dense(names: &[&str]) -> NameTable {
	NameTable::Dense(names.iter().map(|name| Box::from(*name)).collect())
}

fn sparse(entries: &[(i128, &str)]) -> NameTable {
	NameTable::Sparse(entries.iter().map(|(value, name)| (*value, Box::from(*name))).collect())
}

/// Numeric value rendered and parsed through an [`Overlay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayValue {
	overlay: Arc<Overlay>,
	num: NumValue,
}

impl OverlayValue {
	/// Create a zero value.
	pub fn new(overlay: Arc<Overlay>) -> Self {
		let num = NumValue::new(overlay.num);
		Self { overlay, num }
	}

	/// Overlay description.
	pub fn overlay(&self) -> &Arc<Overlay> {
		&self.overlay
	}

	/// Current numeric value.
	pub fn num(&self) -> i128 {
		self.num.num()
	}

	/// Assign a numeric value without checks.
	pub fn set_num(&mut self, value: i128) {
		self.num.set_num(value);
	}

	/// Type name (the overlay name).
	pub fn type_name(&self) -> String {
		self.overlay.name.to_string()
	}

	/// Wire size in bytes.
	pub fn bytes(&self) -> usize {
		self.num.bytes()
	}

	/// Read the underlying number.
	pub fn read(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
		self.num.read(cursor)
	}

	/// Write the underlying number.
	pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
		self.num.write(out)
	}

	/// Parse a name or number; enums also accept their own `<name>(<n>)` rendering, and bitmasks accept `a|b`
	/// combinations and `+flag` or `-flag` deltas.
	pub fn parse(&mut self, text: &str) -> Result<()> {
		let invalid = || NvError::invalid_text(self.overlay.name.as_ref(), text);
		if self.overlay.mode == OverlayMode::Enum {
			let value = self.overlay.str_to_num(text).or_else(|| self.overlay.unnamed_to_num(text)).ok_or_else(invalid)?;
			self.num.set_num(value);
			return Ok(());
		}

		let current = self.num.num();
		let value = if let Some(flag) = text.strip_prefix('+') {
			current | self.overlay.str_to_num(flag).ok_or_else(invalid)?
		} else if let Some(flag) = text.strip_prefix('-') {
			current & !self.overlay.str_to_num(flag).ok_or_else(invalid)?
		} else {
			let mut value = 0;
			for flag in text.split('|') {
				value |= self.overlay.str_to_num(flag.trim()).ok_or_else(invalid)?;
			}
			value
		};
		self.num.set_num(value);
		Ok(())
	}

	/// Render by name; pretty text appends the overlay name in brackets.
	pub fn render(&self, pretty: bool) -> String {
		let text = match self.overlay.mode {
			OverlayMode::Enum => self.render_enum(),
			OverlayMode::Bitmask => self.render_bitmask(pretty),
		};
		if pretty { format!("{text} [{}]", self.overlay.name) } else { text }
	}

	fn render_enum(&self) -> String {
		let value = self.num.num();
		match self.overlay.name_of(value, 0) {
			Some(name) => name.to_owned(),
			None => format!("{}({value})", self.overlay.name),
		}
	}

	fn render_bitmask(&self, pretty: bool) -> String {
		let num = self.overlay.num;
		let value = self.num.num();
		if value == 0 {
			return num.hex_text(0);
		}

		let raw = value as u64;
		let mut parts = Vec::new();
		for bit in 0..num.width() * 8 {
			if raw & (1_u64 << bit) == 0 {
				continue;
			}
			let flag = 1_i128 << bit;
			parts.push(match self.overlay.name_of(flag, bit) {
				Some(name) => name.to_owned(),
				None => num.hex_text(flag),
			});
		}
		parts.join(if pretty { " | " } else { "|" })
	}
}

#[cfg(test)]
mod tests;
