//! Shared text helpers: number literals, hex, indentation, and the compact
//! compound syntax.

use std::borrow::Cow;
use std::fmt::Write as _;

/// Parse a decimal or `0x`-prefixed hex integer with an optional leading `-`.
pub(crate) fn parse_int(text: &str) -> Option<i128> {
	let (negative, body) = match text.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, text),
	};

	let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
		if hex.is_empty() || !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
			return None;
		}
		i128::from_str_radix(hex, 16).ok()?
	} else {
		if body.is_empty() || !body.bytes().all(|byte| byte.is_ascii_digit()) {
			return None;
		}
		body.parse::<i128>().ok()?
	};

	Some(if negative { -magnitude } else { magnitude })
}

/// Render bytes as lowercase hex, optionally separated.
pub(crate) fn to_hex(bytes: &[u8], sep: &str) -> String {
	let mut out = String::with_capacity(bytes.len() * (2 + sep.len()));
	for (idx, byte) in bytes.iter().enumerate() {
		if idx > 0 {
			out.push_str(sep);
		}
		let _ = write!(out, "{byte:02x}");
	}
	out
}

/// Parse hex text, ignoring an optional `0x` prefix and `:`/whitespace separators.
pub(crate) fn parse_hex(text: &str) -> Option<Vec<u8>> {
	let body = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text);
	let digits: Vec<u8> = body.bytes().filter(|byte| *byte != b':' && !byte.is_ascii_whitespace()).collect();
	if digits.len() % 2 != 0 {
		return None;
	}

	digits
		.chunks(2)
		.map(|pair| {
			let hi = char::from(pair[0]).to_digit(16)?;
			let lo = char::from(pair[1]).to_digit(16)?;
			Some((hi * 16 + lo) as u8)
		})
		.collect()
}

/// Indentation for pretty output at `level`.
pub(crate) fn indent(level: usize) -> String {
	"  ".repeat(level)
}

const STRUCTURAL: &[char] = &['{', '}', '[', ']', ',', '=', '"', '\\'];

/// Quote leaf text for embedding in compact compound output when needed.
pub(crate) fn quote_if_needed(text: &str) -> Cow<'_, str> {
	let needs_quotes = text.is_empty()
		|| text.contains(STRUCTURAL)
		|| text.starts_with(char::is_whitespace)
		|| text.ends_with(char::is_whitespace);
	if !needs_quotes {
		return Cow::Borrowed(text);
	}

	let mut out = String::with_capacity(text.len() + 2);
	out.push('"');
	for ch in text.chars() {
		if ch == '"' || ch == '\\' {
			out.push('\\');
		}
		out.push(ch);
	}
	out.push('"');
	Cow::Owned(out)
}

/// One entry of a compact `{name=value, ...}` or `[value, ...]` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompactEntry {
	/// Part name; `None` for positional array entries.
	pub(crate) name: Option<String>,
	/// Unquoted leaf text, or the raw bracketed text of a nested compound.
	pub(crate) value: String,
}

/// Split compact compound text into entries.
///
/// `named` selects `{name=value}` syntax; otherwise `[value]` positional syntax.
/// Returns `None` on any syntax error.
pub(crate) fn split_compact(text: &str, named: bool) -> Option<Vec<CompactEntry>> {
	let (open, close) = if named { ('{', '}') } else { ('[', ']') };
	let inner = text.trim().strip_prefix(open)?.strip_suffix(close)?;
	let chars: Vec<char> = inner.chars().collect();
	let mut idx = 0_usize;
	let mut out = Vec::new();

	loop {
		skip_ws(&chars, &mut idx);
		if idx >= chars.len() {
			break;
		}

		let name = if named {
			let start = idx;
			while idx < chars.len() && chars[idx] != '=' {
				if STRUCTURAL.contains(&chars[idx]) {
					return None;
				}
				idx += 1;
			}
			if idx >= chars.len() {
				return None;
			}
			let name: String = chars[start..idx].iter().collect::<String>().trim().to_owned();
			if name.is_empty() {
				return None;
			}
			idx += 1;
			skip_ws(&chars, &mut idx);
			Some(name)
		} else {
			None
		};

		let value = match chars.get(idx) {
			Some('"') => read_quoted(&chars, &mut idx)?,
			Some('{') | Some('[') => read_bracketed(&chars, &mut idx)?,
			_ => {
				let start = idx;
				while idx < chars.len() && chars[idx] != ',' {
					if STRUCTURAL.contains(&chars[idx]) {
						return None;
					}
					idx += 1;
				}
				chars[start..idx].iter().collect::<String>().trim().to_owned()
			}
		};
		out.push(CompactEntry { name, value });

		skip_ws(&chars, &mut idx);
		match chars.get(idx) {
			None => break,
			Some(',') => idx += 1,
			Some(_) => return None,
		}
	}

	Some(out)
}

fn skip_ws(chars: &[char], idx: &mut usize) {
	while *idx < chars.len() && chars[*idx].is_whitespace() {
		*idx += 1;
	}
}

fn read_quoted(chars: &[char], idx: &mut usize) -> Option<String> {
	*idx += 1;
	let mut out = String::new();
	while *idx < chars.len() {
		match chars[*idx] {
			'"' => {
				*idx += 1;
				return Some(out);
			}
			'\\' => {
				*idx += 1;
				out.push(*chars.get(*idx)?);
			}
			ch => out.push(ch),
		}
		*idx += 1;
	}
	None
}

fn read_bracketed(chars: &[char], idx: &mut usize) -> Option<String> {
	let start = *idx;
	let mut depth = 0_usize;
	let mut in_quotes = false;
	while *idx < chars.len() {
		let ch = chars[*idx];
		if in_quotes {
			if ch == '\\' {
				*idx += 1;
			} else if ch == '"' {
				in_quotes = false;
			}
		} else {
			match ch {
				'"' => in_quotes = true,
				'{' | '[' => depth += 1,
				'}' | ']' => {
					depth = depth.checked_sub(1)?;
					if depth == 0 {
						*idx += 1;
						return Some(chars[start..*idx].iter().collect());
					}
				}
				_ => {}
			}
		}
		*idx += 1;
	}
	None
}

#[cfg(test)]
mod tests;
