use std::fmt;

use crate::nv::{NvError, Result};

/// One parsed operation in a field path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a named part.
	Field(String),
	/// Select an array or list element by zero-based index.
	Index(usize),
	/// Append a new element to a list (`-1`).
	Append,
}

impl fmt::Display for PathStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Field(name) => f.write_str(name),
			Self::Index(idx) => write!(f, "{idx}"),
			Self::Append => f.write_str("-1"),
		}
	}
}

/// Parsed field path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
	/// Ordered sequence of path steps.
	pub steps: Vec<PathStep>,
}

impl FieldPath {
	/// Parse dotted syntax where segments are names, indexes, or `-1`, each optionally followed by `[index]` selectors.
	///
	/// `ssids.0.name`, `ssids[0].name`, and `leases.-1.ip` are all accepted.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = || NvError::UnknownField { path: input.to_owned() };
		if input.is_empty() {
			return Err(invalid());
		}

		let bytes = input.as_bytes();
		let mut idx = 0_usize;
		let mut steps = Vec::new();

		while idx < bytes.len() {
			if input[idx..].starts_with("-1") && matches!(bytes.get(idx + 2), None | Some(b'.') | Some(b'[')) {
				steps.push(PathStep::Append);
				idx += 2;
			} else {
				let start = idx;
				while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
					idx += 1;
				}
				if idx == start {
					return Err(invalid());
				}
				let segment = &input[start..idx];
				steps.push(match segment.parse::<usize>() {
					Ok(number) if segment.bytes().all(|byte| byte.is_ascii_digit()) => PathStep::Index(number),
					_ => PathStep::Field(segment.to_owned()),
				});
			}

			while idx < bytes.len() && bytes[idx] == b'[' {
				idx += 1;
				let n_start = idx;
				while idx < bytes.len() && bytes[idx] != b']' {
					idx += 1;
				}
				if idx >= bytes.len() {
					return Err(invalid());
				}
				let inner = &input[n_start..idx];
				steps.push(match inner {
					"-1" => PathStep::Append,
					_ if !inner.is_empty() && inner.bytes().all(|byte| byte.is_ascii_digit()) => {
						PathStep::Index(inner.parse::<usize>().map_err(|_| invalid())?)
					}
					_ => return Err(invalid()),
				});
				idx += 1;
			}

			if idx < bytes.len() {
				if bytes[idx] != b'.' {
					return Err(invalid());
				}
				idx += 1;
				if idx >= bytes.len() {
					return Err(invalid());
				}
			}
		}

		Ok(Self { steps })
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, step) in self.steps.iter().enumerate() {
			if idx > 0 {
				f.write_str(".")?;
			}
			write!(f, "{step}")?;
		}
		Ok(())
	}
}
