use crate::nv::bytes::{Cursor, Endianness, decode_uint, put_uint};
use crate::nv::text::parse_int;
use crate::nv::{NvError, Result};

/// How a numeric value renders and parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumStyle {
	/// Decimal text.
	Decimal,
	/// `0x`-prefixed hex text padded to the storage width.
	Hex,
	/// `yes`/`no` over a byte constrained to `[0, 1]`.
	Bool,
}

/// Storage and range description of a fixed-width integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumType {
	width: u8,
	signed: bool,
	endianness: Endianness,
	style: NumStyle,
	min: i128,
	max: i128,
}

impl NumType {
	/// Unsigned byte.
	pub const U8: Self = Self::new(1, false, Endianness::Big);
	/// Signed byte.
	pub const I8: Self = Self::new(1, true, Endianness::Big);
	/// Big-endian `u16`.
	pub const U16: Self = Self::new(2, false, Endianness::Big);
	/// Big-endian `u32`.
	pub const U32: Self = Self::new(4, false, Endianness::Big);
	/// Big-endian `u64`.
	pub const U64: Self = Self::new(8, false, Endianness::Big);
	/// Big-endian `i16`.
	pub const I16: Self = Self::new(2, true, Endianness::Big);
	/// Big-endian `i32`.
	pub const I32: Self = Self::new(4, true, Endianness::Big);
	/// Big-endian `i64`.
	pub const I64: Self = Self::new(8, true, Endianness::Big);
	/// Little-endian `u16`.
	pub const U16LE: Self = Self::new(2, false, Endianness::Little);
	/// Little-endian `u32`.
	pub const U32LE: Self = Self::new(4, false, Endianness::Little);
	/// Little-endian `u64`.
	pub const U64LE: Self = Self::new(8, false, Endianness::Little);
	/// Little-endian `i16`.
	pub const I16LE: Self = Self::new(2, true, Endianness::Little);
	/// Little-endian `i32`.
	pub const I32LE: Self = Self::new(4, true, Endianness::Little);
	/// Little-endian `i64`.
	pub const I64LE: Self = Self::new(8, true, Endianness::Little);
	/// Boolean byte.
	pub const BOOL: Self = Self::new(1, false, Endianness::Big).with_max(1).with_style(NumStyle::Bool);

	/// Describe an integer of `width` bytes (1, 2, 4 or 8) spanning its full storage range.
	pub const fn new(width: u8, signed: bool, endianness: Endianness) -> Self {
		let bits = width as u32 * 8;
		let (min, max) = if signed {
			(-(1_i128 << (bits - 1)), (1_i128 << (bits - 1)) - 1)
		} else {
			(0, (1_i128 << bits) - 1)
		};
		Self {
			width,
			signed,
			endianness,
			style: NumStyle::Decimal,
			min,
			max,
		}
	}

	/// Restrict the accepted parse range to `[min, max]`.
	pub const fn with_range(mut self, min: i128, max: i128) -> Self {
		self.min = min;
		self.max = max;
		self
	}

	/// Restrict the accepted parse range to `[storage min, max]`.
	pub const fn with_max(mut self, max: i128) -> Self {
		self.max = max;
		self
	}

	/// Render and describe as hex.
	pub const fn hex(self) -> Self {
		self.with_style(NumStyle::Hex)
	}

	const fn with_style(mut self, style: NumStyle) -> Self {
		self.style = style;
		self
	}

	/// Storage width in bytes.
	pub fn width(&self) -> usize {
		usize::from(self.width)
	}

	/// Whether storage is two's-complement signed.
	pub fn is_signed(&self) -> bool {
		self.signed
	}

	/// Render style.
	pub fn style(&self) -> NumStyle {
		self.style
	}

	/// Configured lower bound.
	pub fn min(&self) -> i128 {
		self.min
	}

	/// Configured upper bound.
	pub fn max(&self) -> i128 {
		self.max
	}

	/// Smallest value the storage can represent.
	pub fn storage_min(&self) -> i128 {
		Self::new(self.width, self.signed, self.endianness).min
	}

	/// Largest value the storage can represent.
	pub fn storage_max(&self) -> i128 {
		Self::new(self.width, self.signed, self.endianness).max
	}

	/// Structural type name, for example `u8`, `i32le`, `x16be`, `u8<0,100>`.
	pub fn type_name(&self) -> String {
		if self.style == NumStyle::Bool {
			return "bool".to_owned();
		}

		let mut name = match (self.style, self.signed) {
			(NumStyle::Hex, _) => "x".to_owned(),
			(_, true) => "i".to_owned(),
			(_, false) => "u".to_owned(),
		};
		name.push_str(&(self.width() * 8).to_string());
		if self.width > 1 {
			name.push_str(match self.endianness {
				Endianness::Big => "be",
				Endianness::Little => "le",
			});
		}
		if self.min != self.storage_min() || self.max != self.storage_max() {
			name.push_str(&format!("<{},{}>", self.min, self.max));
		}
		name
	}

	pub(crate) fn encode(&self, value: i128, out: &mut Vec<u8>) -> Result<()> {
		if value > self.storage_max() || value < self.storage_min() {
			return Err(NvError::too_large(self.type_name(), value));
		}
		put_uint(out, value as u64, self.width(), self.endianness);
		Ok(())
	}

	pub(crate) fn decode(&self, cursor: &mut Cursor<'_>) -> Result<i128> {
		let raw = decode_uint(cursor.read_exact_or_drain(self.width())?, self.endianness);
		Ok(self.from_raw(raw))
	}

	fn from_raw(&self, raw: u64) -> i128 {
		if !self.signed {
			return i128::from(raw);
		}
		let shift = 64 - self.width() as u32 * 8;
		i128::from(((raw << shift) as i64) >> shift)
	}

	pub(crate) fn hex_text(&self, value: i128) -> String {
		let bits = self.width() * 8;
		let raw = if bits == 64 { value as u64 } else { (value as u64) & ((1_u64 << bits) - 1) };
		format!("0x{:0width$x}", raw, width = self.width() * 2)
	}
}

/// Fixed-width integer value with an inclusive parse range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumValue {
	ty: NumType,
	val: i128,
}

impl NumValue {
	/// Create a zero value of `ty`.
	pub fn new(ty: NumType) -> Self {
		Self { ty, val: 0 }
	}

	/// Storage description.
	pub fn num_type(&self) -> NumType {
		self.ty
	}

	/// Current numeric value.
	pub fn num(&self) -> i128 {
		self.val
	}

	/// Assign a value without range checks.
	///
	/// Values outside the storage range are rejected later by [`NumValue::write`].
	pub fn set_num(&mut self, val: i128) {
		self.val = val;
	}

	/// Return `true` when the value lies within the configured range.
	pub fn in_range(&self) -> bool {
		self.val >= self.ty.min && self.val <= self.ty.max
	}

	/// Structural type name.
	pub fn type_name(&self) -> String {
		self.ty.type_name()
	}

	/// Wire size in bytes.
	pub fn bytes(&self) -> usize {
		self.ty.width()
	}

	/// Read the value; no range check is applied.
	pub fn read(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
		self.val = self.ty.decode(cursor)?;
		Ok(())
	}

	/// Write the value, rejecting values outside the storage range.
	pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
		self.ty.encode(self.val, out)
	}

	/// Parse text within the configured range; on failure the value is unchanged.
	pub fn parse(&mut self, text: &str) -> Result<()> {
		let parsed = match self.ty.style {
			NumStyle::Bool => parse_bool(text),
			_ => parse_int(text),
		};
		match parsed {
			Some(val) if val >= self.ty.min && val <= self.ty.max => {
				self.val = val;
				Ok(())
			}
			_ => Err(NvError::invalid_text(self.type_name(), text)),
		}
	}

	/// Render as text, annotating out-of-range values in pretty mode.
	pub fn render(&self, pretty: bool) -> String {
		let mut out = match self.ty.style {
			NumStyle::Bool if self.val == 0 => "no".to_owned(),
			NumStyle::Bool if self.val == 1 => "yes".to_owned(),
			NumStyle::Hex => self.ty.hex_text(self.val),
			_ => self.val.to_string(),
		};
		if pretty && !self.in_range() {
			out.push_str(" (out of range)");
		}
		out
	}
}

fn parse_bool(text: &str) -> Option<i128> {
	match text {
		"yes" | "true" | "on" => Some(1),
		"no" | "false" | "off" => Some(0),
		_ => parse_int(text),
	}
}
