use std::borrow::Cow;

use crate::nv::bytes::{Cursor, Endianness, decode_uint, put_uint};
use crate::nv::text::{parse_hex, to_hex};
use crate::nv::{NvError, Result};

/// NUL-termination requirement of a string layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NulPolicy {
	/// No terminator handling.
	None,
	/// A trailing NUL is stripped when present.
	Optional,
	/// A trailing NUL must be present.
	Required,
}

/// Immutable wire layout of a string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrLayout {
	nul: NulPolicy,
	is_data: bool,
	prefix: u8,
	size_includes_prefix: bool,
	width: usize,
}

impl StrLayout {
	const fn new(nul: NulPolicy, prefix: u8, width: usize) -> Self {
		Self {
			nul,
			is_data: false,
			prefix,
			size_includes_prefix: false,
			width,
		}
	}

	/// Fixed-width string with optional NUL: with width 6, `foo` is `66:6f:6f:00:00:00`.
	pub const fn fstring(width: usize) -> Self {
		Self::new(NulPolicy::Optional, 0, width)
	}

	/// Fixed-width string with mandatory NUL, holding at most `width - 1` bytes.
	pub const fn fzstring(width: usize) -> Self {
		Self::new(NulPolicy::Required, 0, width)
	}

	/// NUL-terminated string of unbounded length.
	pub const fn zstring() -> Self {
		Self::new(NulPolicy::Required, 0, 0)
	}

	/// `u8`-prefixed string with optional NUL.
	pub const fn p8string() -> Self {
		Self::new(NulPolicy::Optional, 1, 0)
	}

	/// `u8`-prefixed string whose length counts the prefix itself.
	pub const fn p8istring() -> Self {
		Self::new(NulPolicy::None, 1, 0).including_prefix()
	}

	/// `u8`-prefixed string with mandatory NUL.
	pub const fn p8zstring() -> Self {
		Self::new(NulPolicy::Required, 1, 0)
	}

	/// `u8`-prefixed opaque bytes.
	pub const fn p8data() -> Self {
		Self::new(NulPolicy::None, 1, 0).data()
	}

	/// `u16`-prefixed string with optional NUL.
	pub const fn p16string() -> Self {
		Self::new(NulPolicy::Optional, 2, 0)
	}

	/// `u16`-prefixed string whose length counts the prefix itself.
	pub const fn p16istring() -> Self {
		Self::new(NulPolicy::None, 2, 0).including_prefix()
	}

	/// `u16`-prefixed string with mandatory NUL.
	pub const fn p16zstring() -> Self {
		Self::new(NulPolicy::Required, 2, 0)
	}

	/// `u16`-prefixed opaque bytes.
	pub const fn p16data() -> Self {
		Self::new(NulPolicy::None, 2, 0).data()
	}

	const fn including_prefix(mut self) -> Self {
		self.size_includes_prefix = true;
		self
	}

	const fn data(mut self) -> Self {
		self.is_data = true;
		self
	}

	/// Termination policy.
	pub fn nul(&self) -> NulPolicy {
		self.nul
	}

	/// Length-prefix width in bytes (0, 1 or 2).
	pub fn prefix_width(&self) -> usize {
		usize::from(self.prefix)
	}

	/// Fixed width, 0 for prefixed or NUL-delimited layouts.
	pub fn width(&self) -> usize {
		self.width
	}

	/// Whether contents are opaque bytes.
	pub fn is_data(&self) -> bool {
		self.is_data
	}

	/// Structural type name such as `fzstring[32]` or `p16istring`.
	pub fn type_name(&self) -> String {
		let mut name = String::new();
		match self.prefix {
			0 if self.width > 0 => name.push('f'),
			0 => {}
			1 => name.push_str("p8"),
			_ => name.push_str("p16"),
		}
		if self.size_includes_prefix {
			name.push('i');
		}
		if self.nul == NulPolicy::Required {
			name.push('z');
		}
		name.push_str(if self.is_data { "data" } else { "string" });
		if self.prefix == 0 && self.width > 0 {
			name.push_str(&format!("[{}]", self.width));
		}
		name
	}

	fn max_prefix_count(&self) -> usize {
		if self.prefix == 1 { 0xff } else { 0xffff }
	}

	/// Largest payload (without terminator) that fits this layout when a prefixed value writes `nul`.
	fn budget(&self, nul: bool) -> usize {
		if self.prefix > 0 {
			let own = if self.size_includes_prefix { self.prefix_width() } else { 0 };
			self.max_prefix_count().saturating_sub(usize::from(nul) + own)
		} else if self.width > 0 {
			self.width.saturating_sub(usize::from(self.nul == NulPolicy::Required && !self.is_data))
		} else {
			usize::MAX
		}
	}
}

/// String or opaque byte payload with a fixed layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrValue {
	layout: StrLayout,
	buf: Vec<u8>,
	had_nul: bool,
}

impl StrValue {
	/// Create an empty value.
	pub fn new(layout: StrLayout) -> Self {
		Self {
			layout,
			buf: Vec::new(),
			had_nul: false,
		}
	}

	/// Wire layout.
	pub fn layout(&self) -> StrLayout {
		self.layout
	}

	/// Logical contents without terminator.
	pub fn as_bytes(&self) -> &[u8] {
		&self.buf
	}

	/// Logical contents as text.
	pub fn as_str(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.buf)
	}

	/// Replace contents without a width check; [`StrValue::write`] enforces it.
	pub fn set_str(&mut self, text: &str) {
		self.buf = text.as_bytes().to_vec();
	}

	/// Structural type name.
	pub fn type_name(&self) -> String {
		self.layout.type_name()
	}

	/// Encoded size; for an empty value this is the layout minimum.
	pub fn bytes(&self) -> usize {
		let layout = &self.layout;
		if layout.prefix > 0 {
			layout.prefix_width() + self.buf.len() + usize::from(self.writes_nul())
		} else if layout.width > 0 {
			layout.width.max(self.buf.len())
		} else {
			self.buf.len() + 1
		}
	}

	fn budget(&self) -> usize {
		self.layout.budget(self.writes_nul())
	}

	fn writes_nul(&self) -> bool {
		!self.layout.is_data && (self.layout.nul == NulPolicy::Required || (self.layout.nul == NulPolicy::Optional && self.had_nul))
	}

	/// Read prefix, payload, and terminator per layout.
	pub fn read(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
		let layout = self.layout;
		let payload = if layout.prefix > 0 {
			let count = decode_uint(cursor.read_exact_or_drain(layout.prefix_width())?, Endianness::Big) as usize;
			let len = if layout.size_includes_prefix {
				count
					.checked_sub(layout.prefix_width())
					.ok_or_else(|| NvError::malformed(self.type_name(), format!("length {count} smaller than its prefix")))?
			} else {
				count
			};
			cursor.read_exact_or_drain(len)?
		} else if layout.width > 0 {
			cursor.read_exact_or_drain(layout.width)?
		} else {
			self.buf = cursor.read_cstring_bytes()?.to_vec();
			self.had_nul = true;
			return Ok(());
		};

		if layout.is_data {
			self.buf = payload.to_vec();
			self.had_nul = false;
			return Ok(());
		}

		let (content, had_nul) = match (layout.nul, layout.prefix > 0) {
			(NulPolicy::None, _) => (payload, false),
			(NulPolicy::Required, true) => match payload.split_last() {
				Some((&0, rest)) => (rest, true),
				_ => return Err(NvError::malformed(self.type_name(), "missing NUL terminator")),
			},
			(NulPolicy::Optional, true) => match payload.split_last() {
				Some((&0, rest)) => (rest, true),
				_ => (payload, false),
			},
			(policy, false) => match payload.iter().position(|byte| *byte == 0) {
				Some(end) => (&payload[..end], true),
				None if policy == NulPolicy::Required => return Err(NvError::malformed(self.type_name(), "missing NUL terminator")),
				None => (payload, false),
			},
		};
		self.buf = content.to_vec();
		self.had_nul = had_nul;
		Ok(())
	}

	/// Emit prefix, payload, terminator, and padding per layout.
	pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
		let layout = &self.layout;
		if self.buf.len() > self.budget() {
			return Err(NvError::too_large(self.type_name(), format!("of length {}", self.buf.len())));
		}

		let nul = usize::from(self.writes_nul());
		if layout.prefix > 0 {
			let own = if layout.size_includes_prefix { layout.prefix_width() } else { 0 };
			let count = self.buf.len() + nul + own;
			put_uint(out, count as u64, layout.prefix_width(), Endianness::Big);
			out.extend_from_slice(&self.buf);
			if nul > 0 {
				out.push(0);
			}
		} else if layout.width > 0 {
			out.extend_from_slice(&self.buf);
			out.resize(out.len() + layout.width - self.buf.len(), 0);
		} else {
			out.extend_from_slice(&self.buf);
			out.push(0);
		}
		Ok(())
	}

	/// Parse a literal (or hex for data layouts); oversized input is rejected.
	///
	/// A prefixed value read with an optional NUL keeps it, so its terminator counts against the prefix.
	pub fn parse(&mut self, text: &str) -> Result<()> {
		let parsed = if self.layout.is_data {
			parse_hex(text)
		} else if text.as_bytes().contains(&0) {
			None
		} else {
			Some(text.as_bytes().to_vec())
		};
		match parsed {
			Some(buf) if buf.len() <= self.budget() => {
				self.buf = buf;
				Ok(())
			}
			_ => Err(NvError::invalid_text(self.type_name(), text)),
		}
	}

	/// Render contents; pretty text is quoted.
	pub fn render(&self, pretty: bool) -> String {
		if self.layout.is_data {
			return to_hex(&self.buf, if pretty { ":" } else { "" });
		}
		if pretty { format!("{:?}", self.as_str()) } else { self.as_str().into_owned() }
	}
}

#[cfg(test)]
mod tests;
