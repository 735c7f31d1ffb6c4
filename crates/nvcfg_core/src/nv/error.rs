use thiserror::Error;

use crate::nv::Magic;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, NvError>;

/// Errors produced while reading, writing, parsing, and addressing value trees.
#[derive(Debug, Error)]
pub enum NvError {
	/// Input ended before a fixed-size field was fully consumed.
	#[error("short read at offset {at}, need {need} bytes, remaining {rem}")]
	ShortRead {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Text could not be parsed into the target value.
	#[error("{}invalid {type_name} value {text:?}", at(.path))]
	InvalidText {
		/// Dotted path of the target value, empty when unknown.
		path: String,
		/// Type name of the target value.
		type_name: String,
		/// Rejected input.
		text: String,
	},
	/// `get`/`set` addressed a part that does not exist.
	#[error("no such field: {path}")]
	UnknownField {
		/// Full dotted path that failed to resolve.
		path: String,
	},
	/// Magic is not present in the group registry.
	#[error("not a recognized record (magic={magic})")]
	UnrecognizedRecord {
		/// Magic read from the input.
		magic: Magic,
	},
	/// Write attempted with a value the wire storage cannot represent.
	#[error("{}value {value} exceeds maximum of {type_name}", at(.path))]
	ValueTooLarge {
		/// Dotted path of the failing value, empty when unknown.
		path: String,
		/// Type name of the failing value.
		type_name: String,
		/// Offending value rendered as text.
		value: String,
	},
	/// List append beyond what its count field can encode.
	#[error("{}maximum list size {max} reached", at(.path))]
	CapacityExceeded {
		/// Dotted path of the list.
		path: String,
		/// Largest encodable element count.
		max: u64,
	},
	/// An operation expected a different value kind.
	#[error("type mismatch: expected {expected}, got {got}")]
	TypeMismatch {
		/// Expected value kind.
		expected: &'static str,
		/// Actual type name.
		got: String,
	},
	/// Input is structurally invalid for the value layout.
	#[error("{}malformed {type_name}: {reason}", at(.path))]
	Malformed {
		/// Dotted path of the failing value, empty when unknown.
		path: String,
		/// Type name of the failing value.
		type_name: String,
		/// Short description of the violation.
		reason: String,
	},
}

impl NvError {
	pub(crate) fn invalid_text(type_name: impl Into<String>, text: &str) -> Self {
		Self::InvalidText {
			path: String::new(),
			type_name: type_name.into(),
			text: text.to_owned(),
		}
	}

	pub(crate) fn too_large(type_name: impl Into<String>, value: impl ToString) -> Self {
		Self::ValueTooLarge {
			path: String::new(),
			type_name: type_name.into(),
			value: value.to_string(),
		}
	}

	pub(crate) fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Malformed {
			path: String::new(),
			type_name: type_name.into(),
			reason: reason.into(),
		}
	}

	/// Attach a field path to errors raised at a leaf that did not know it.
	pub fn at_path(mut self, node_path: &str) -> Self {
		match &mut self {
			Self::InvalidText { path, .. }
			| Self::ValueTooLarge { path, .. }
			| Self::Malformed { path, .. }
			| Self::CapacityExceeded { path, .. } => {
				if path.is_empty() {
					*path = node_path.to_owned();
				}
			}
			_ => {}
		}
		self
	}

	/// Return `true` for [`NvError::ShortRead`].
	pub fn is_short_read(&self) -> bool {
		matches!(self, Self::ShortRead { .. })
	}
}

fn at(path: &str) -> String {
	if path.is_empty() { String::new() } else { format!("{path}: ") }
}
