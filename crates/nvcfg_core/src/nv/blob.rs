use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::nv::bytes::Cursor;
use crate::nv::text::{indent, parse_hex, parse_int, to_hex};
use crate::nv::{NvError, Result};

/// Four-byte record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Magic(pub [u8; 4]);

impl Magic {
	/// Raw identifier bytes.
	pub fn bytes(&self) -> [u8; 4] {
		self.0
	}

	/// Identifier as a big-endian integer.
	pub fn as_u32(&self) -> u32 {
		u32::from_be_bytes(self.0)
	}

	fn is_printable(&self) -> bool {
		self.0.iter().all(|byte| (0x20..0x7f).contains(byte))
	}
}

impl From<u32> for Magic {
	fn from(value: u32) -> Self {
		Self(value.to_be_bytes())
	}
}

impl From<[u8; 4]> for Magic {
	fn from(value: [u8; 4]) -> Self {
		Self(value)
	}
}

impl fmt::Display for Magic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_printable() {
			self.0.iter().try_for_each(|byte| write!(f, "{}", char::from(*byte)))
		} else {
			write!(f, "0x{}", to_hex(&self.0, ""))
		}
	}
}

impl FromStr for Magic {
	type Err = NvError;

	fn from_str(text: &str) -> Result<Self> {
		if text.len() == 4 && text.is_ascii() {
			let mut out = [0_u8; 4];
			out.copy_from_slice(text.as_bytes());
			return Ok(Self(out));
		}

		match parse_int(text) {
			Some(value) if (0..=i128::from(u32::MAX)).contains(&value) && text.starts_with("0x") => Ok(Self::from(value as u32)),
			_ => Err(NvError::invalid_text("magic", text)),
		}
	}
}

/// Two-byte `major.minor` layout version, stored big-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(pub u16);

impl Version {
	/// Build from components.
	pub const fn new(major: u8, minor: u8) -> Self {
		Self(((major as u16) << 8) | minor as u16)
	}

	/// Major component.
	pub fn major(&self) -> u8 {
		(self.0 >> 8) as u8
	}

	/// Minor component.
	pub fn minor(&self) -> u8 {
		(self.0 & 0xff) as u8
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.major(), self.minor())
	}
}

impl FromStr for Version {
	type Err = NvError;

	fn from_str(text: &str) -> Result<Self> {
		let err = || NvError::invalid_text("version", text);
		if let Some((major, minor)) = text.split_once('.') {
			let major = parse_int(major).and_then(|value| u8::try_from(value).ok()).ok_or_else(err)?;
			let minor = parse_int(minor).and_then(|value| u8::try_from(value).ok()).ok_or_else(err)?;
			return Ok(Self::new(major, minor));
		}
		parse_int(text).and_then(|value| u16::try_from(value).ok()).map(Self).ok_or_else(err)
	}
}

/// Text interpretation of a raw byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobKind {
	/// Opaque bytes rendered as hex.
	Data,
	/// IPv4 address (4 bytes).
	Ip4,
	/// IPv6 address (16 bytes).
	Ip6,
	/// Hardware address (6 bytes).
	Mac,
	/// Record magic (4 bytes).
	Magic,
	/// `major.minor` version (2 bytes).
	Version,
}

impl BlobKind {
	/// Fixed width of this kind, `None` for [`BlobKind::Data`].
	pub fn fixed_width(&self) -> Option<usize> {
		match self {
			Self::Data => None,
			Self::Ip4 | Self::Magic => Some(4),
			Self::Ip6 => Some(16),
			Self::Mac => Some(6),
			Self::Version => Some(2),
		}
	}
}

/// Fixed-size raw buffer with a kind-specific text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobValue {
	kind: BlobKind,
	buf: Vec<u8>,
}

impl BlobValue {
	/// Create a zeroed buffer; `width` is only used for [`BlobKind::Data`].
	pub fn new(kind: BlobKind, width: usize) -> Self {
		let width = kind.fixed_width().unwrap_or(width);
		Self { kind, buf: vec![0; width] }
	}

	/// Text interpretation.
	pub fn kind(&self) -> BlobKind {
		self.kind
	}

	/// Raw contents.
	pub fn as_bytes(&self) -> &[u8] {
		&self.buf
	}

	/// Contents as a magic, when this is a 4-byte buffer.
	pub fn magic(&self) -> Option<Magic> {
		let raw: [u8; 4] = self.buf.as_slice().try_into().ok()?;
		Some(Magic(raw))
	}

	/// Structural type name.
	pub fn type_name(&self) -> String {
		match self.kind {
			BlobKind::Data => format!("data[{}]", self.buf.len()),
			BlobKind::Ip4 => "ip4".to_owned(),
			BlobKind::Ip6 => "ip6".to_owned(),
			BlobKind::Mac => "mac".to_owned(),
			BlobKind::Magic => "magic".to_owned(),
			BlobKind::Version => "version".to_owned(),
		}
	}

	/// Wire size in bytes.
	pub fn bytes(&self) -> usize {
		self.buf.len()
	}

	/// Fill the buffer from input.
	pub fn read(&mut self, cursor: &mut Cursor<'_>) -> Result<()> {
		let raw = cursor.read_exact_or_drain(self.buf.len())?;
		self.buf.copy_from_slice(raw);
		Ok(())
	}

	/// Emit the buffer unchanged.
	pub fn write(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&self.buf);
	}

	/// Parse kind-specific text; on failure the buffer is unchanged.
	pub fn parse(&mut self, text: &str) -> Result<()> {
		let parsed = match self.kind {
			BlobKind::Data => parse_hex(text),
			BlobKind::Ip4 => text.parse::<Ipv4Addr>().ok().map(|addr| addr.octets().to_vec()),
			BlobKind::Ip6 => text.parse::<Ipv6Addr>().ok().map(|addr| addr.octets().to_vec()),
			BlobKind::Mac => parse_mac(text),
			BlobKind::Magic => text.parse::<Magic>().ok().map(|magic| magic.0.to_vec()),
			BlobKind::Version => text.parse::<Version>().ok().map(|version| version.0.to_be_bytes().to_vec()),
		};
		match parsed {
			Some(buf) if buf.len() == self.buf.len() => {
				self.buf = buf;
				Ok(())
			}
			_ => Err(NvError::invalid_text(self.type_name(), text)),
		}
	}

	/// Render kind-specific text; long data buffers become a hex block in pretty mode.
	pub fn render(&self, level: usize, pretty: bool) -> String {
		match self.kind {
			BlobKind::Data if !pretty => to_hex(&self.buf, ""),
			BlobKind::Data if self.buf.len() <= 16 => to_hex(&self.buf, ":"),
			BlobKind::Data => {
				let mut out = String::new();
				for row in self.buf.chunks(16) {
					out.push('\n');
					out.push_str(&indent(level + 1));
					out.push_str(&to_hex(row, " "));
				}
				out
			}
			BlobKind::Ip4 => self.fixed::<4>().map(|raw| Ipv4Addr::from(raw).to_string()).unwrap_or_default(),
			BlobKind::Ip6 => self.fixed::<16>().map(|raw| Ipv6Addr::from(raw).to_string()).unwrap_or_default(),
			BlobKind::Mac => to_hex(&self.buf, ":"),
			BlobKind::Magic => self.magic().map(|magic| magic.to_string()).unwrap_or_default(),
			BlobKind::Version => self.fixed::<2>().map(|raw| Version(u16::from_be_bytes(raw)).to_string()).unwrap_or_default(),
		}
	}

	fn fixed<const N: usize>(&self) -> Option<[u8; N]> {
		self.buf.as_slice().try_into().ok()
	}
}

fn parse_mac(text: &str) -> Option<Vec<u8>> {
	let parts: Vec<&str> = text.split([':', '-']).collect();
	if parts.len() != 6 {
		return None;
	}
	parts
		.iter()
		.map(|part| {
			if part.is_empty() || part.len() > 2 {
				return None;
			}
			u8::from_str_radix(part, 16).ok()
		})
		.collect()
}
