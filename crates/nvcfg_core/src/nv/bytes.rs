use crate::nv::{NvError, Result};

/// Byte order of a multi-byte wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
	/// Least significant byte first.
	Little,
	/// Most significant byte first.
	Big,
}

/// Simple bounded cursor over an immutable byte slice.
///
/// A failed read reports [`NvError::ShortRead`]; a clean end of input is
/// observable beforehand through [`Cursor::is_at_end`].
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Return `true` when no bytes remain.
	pub fn is_at_end(&self) -> bool {
		self.remaining() == 0
	}

	/// Read exactly `n` bytes and advance cursor.
	///
	/// On short input the cursor does not move.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(NvError::ShortRead {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read exactly `n` bytes; on short input consume whatever is left.
	pub fn read_exact_or_drain(&mut self, n: usize) -> Result<&'a [u8]> {
		match self.read_exact(n) {
			Ok(bytes) => Ok(bytes),
			Err(err) => {
				self.pos = self.bytes.len();
				Err(err)
			}
		}
	}

	/// Return the next `n` bytes without consuming them.
	pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(NvError::ShortRead {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}
		Ok(&self.bytes[self.pos..self.pos + n])
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		let raw = self.read_exact(4)?;
		let mut out = [0_u8; 4];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Peek a four-byte code.
	pub fn peek_code4(&self) -> Result<[u8; 4]> {
		let raw = self.peek(4)?;
		let mut out = [0_u8; 4];
		out.copy_from_slice(raw);
		Ok(out)
	}

	/// Read a big-endian `u16`.
	pub fn read_u16_be(&mut self) -> Result<u16> {
		Ok(self.read_uint(2, Endianness::Big)? as u16)
	}

	/// Read an unsigned integer of `width` bytes (1..=8) in the selected byte order.
	pub fn read_uint(&mut self, width: usize, endianness: Endianness) -> Result<u64> {
		let raw = self.read_exact(width)?;
		Ok(decode_uint(raw, endianness))
	}

	/// Read one byte at a time until a NUL, returning the bytes before it.
	pub fn read_cstring_bytes(&mut self) -> Result<&'a [u8]> {
		let start = self.pos;
		let rem = &self.bytes[self.pos..];
		let Some(rel_end) = rem.iter().position(|byte| *byte == 0) else {
			self.pos = self.bytes.len();
			return Err(NvError::ShortRead {
				at: start,
				need: rem.len() + 1,
				rem: rem.len(),
			});
		};

		let end = start + rel_end;
		self.pos = end + 1;
		Ok(&self.bytes[start..end])
	}
}

/// Decode up to 8 bytes as an unsigned integer.
pub(crate) fn decode_uint(raw: &[u8], endianness: Endianness) -> u64 {
	let mut value = 0_u64;
	match endianness {
		Endianness::Big => {
			for byte in raw {
				value = (value << 8) | u64::from(*byte);
			}
		}
		Endianness::Little => {
			for byte in raw.iter().rev() {
				value = (value << 8) | u64::from(*byte);
			}
		}
	}
	value
}

/// Append the low `width` bytes of `value` in the selected byte order.
pub(crate) fn put_uint(out: &mut Vec<u8>, value: u64, width: usize, endianness: Endianness) {
	let be = value.to_be_bytes();
	let low = &be[8 - width..];
	match endianness {
		Endianness::Big => out.extend_from_slice(low),
		Endianness::Little => out.extend(low.iter().rev()),
	}
}
