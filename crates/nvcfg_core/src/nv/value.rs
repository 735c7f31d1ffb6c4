use std::sync::Arc;

use crate::nv::{
	ArraySpec, ArrayValue, BlobKind, BlobValue, Compound, Group, NumType, NumValue, NvError, Overlay, OverlayMode, OverlayValue, Result,
	StrLayout, StrValue, StructDef, StructValue,
};

/// Declarative type of a part, instantiated into a [`Value`] when a compound initializes.
#[derive(Debug, Clone)]
pub enum ValueType {
	/// Fixed-width integer.
	Num(NumType),
	/// String or prefixed data.
	Str(StrLayout),
	/// Raw buffer; the width is only used by [`BlobKind::Data`].
	Blob(BlobKind, usize),
	/// Enumeration or bitmask.
	Named(Arc<Overlay>),
	/// Nested named compound.
	Struct(Arc<StructDef>),
	/// Fixed array or count-prefixed list.
	Array(Arc<ArraySpec>),
}

impl ValueType {
	/// Opaque bytes of `width`.
	pub fn data(width: usize) -> Self {
		Self::Blob(BlobKind::Data, width)
	}

	/// IPv4 address.
	pub fn ip4() -> Self {
		Self::Blob(BlobKind::Ip4, 4)
	}

	/// IPv6 address.
	pub fn ip6() -> Self {
		Self::Blob(BlobKind::Ip6, 16)
	}

	/// Hardware address.
	pub fn mac() -> Self {
		Self::Blob(BlobKind::Mac, 6)
	}

	/// Four-byte magic.
	pub fn magic() -> Self {
		Self::Blob(BlobKind::Magic, 4)
	}

	/// `major.minor` version.
	pub fn version() -> Self {
		Self::Blob(BlobKind::Version, 2)
	}

	/// Boolean byte.
	pub fn boolean() -> Self {
		Self::Num(NumType::BOOL)
	}

	/// Build a default (unset) value of this type; compound parts are not created yet.
	pub fn instantiate(&self) -> Value {
		match self {
			Self::Num(ty) => Value::Num(NumValue::new(*ty)),
			Self::Str(layout) => Value::Str(StrValue::new(*layout)),
			Self::Blob(kind, width) => Value::Blob(BlobValue::new(*kind, *width)),
			Self::Named(overlay) => Value::Named(OverlayValue::new(overlay.clone())),
			Self::Struct(def) => Value::Struct(StructValue::new(def.clone())),
			Self::Array(spec) => Value::Array(ArrayValue::new(spec.clone())),
		}
	}

	/// Minimum byte count of a default value of this type.
	pub fn min_bytes(&self) -> usize {
		match self {
			Self::Num(ty) => ty.width(),
			Self::Str(layout) => StrValue::new(*layout).bytes(),
			Self::Blob(kind, width) => kind.fixed_width().unwrap_or(*width),
			Self::Named(overlay) => overlay.num_type().width(),
			Self::Struct(def) => def.width(),
			Self::Array(spec) => spec.min_bytes(),
		}
	}

	/// Structural type name of a default value.
	pub fn type_name(&self) -> String {
		self.instantiate().type_name()
	}
}

impl From<NumType> for ValueType {
	fn from(value: NumType) -> Self {
		Self::Num(value)
	}
}

impl From<StrLayout> for ValueType {
	fn from(value: StrLayout) -> Self {
		Self::Str(value)
	}
}

impl From<Arc<Overlay>> for ValueType {
	fn from(value: Arc<Overlay>) -> Self {
		Self::Named(value)
	}
}

impl From<StructDef> for ValueType {
	fn from(value: StructDef) -> Self {
		Self::Struct(Arc::new(value))
	}
}

impl From<Arc<StructDef>> for ValueType {
	fn from(value: Arc<StructDef>) -> Self {
		Self::Struct(value)
	}
}

impl From<ArraySpec> for ValueType {
	fn from(value: ArraySpec) -> Self {
		Self::Array(Arc::new(value))
	}
}

/// One named entry of a compound definition.
#[derive(Debug, Clone)]
pub struct Field {
	/// Part name, unique within its compound.
	pub name: Box<str>,
	/// Part type.
	pub ty: ValueType,
	/// Whether the part starts excluded from serialization.
	pub disabled: bool,
}

impl Field {
	/// Build an enabled field.
	pub fn new(name: &str, ty: impl Into<ValueType>) -> Self {
		Self {
			name: name.into(),
			ty: ty.into(),
			disabled: false,
		}
	}

	/// Keep the part in the tree but skip it on the wire.
	pub fn disabled(self) -> Self {
		self.disabled_if(true)
	}

	/// Keep the part in the tree but skip it on the wire when `cond` holds.
	pub fn disabled_if(mut self, cond: bool) -> Self {
		self.disabled = cond;
		self
	}
}

/// Variant tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	/// [`Value::Num`].
	Num,
	/// [`Value::Str`].
	Str,
	/// [`Value::Blob`].
	Blob,
	/// [`Value::Named`] in enum mode.
	Enum,
	/// [`Value::Named`] in bitmask mode.
	Bitmask,
	/// [`Value::Struct`].
	Struct,
	/// [`Value::Array`] with a fixed count.
	Array,
	/// [`Value::Array`] with a count prefix.
	List,
	/// [`Value::Group`].
	Group,
}

impl ValueKind {
	/// Lowercase label.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Num => "number",
			Self::Str => "string",
			Self::Blob => "blob",
			Self::Enum => "enum",
			Self::Bitmask => "bitmask",
			Self::Struct => "struct",
			Self::Array => "array",
			Self::List => "list",
			Self::Group => "group",
		}
	}
}

/// Closed set of runtime values stored in a [`crate::nv::Tree`].
#[derive(Debug, Clone)]
pub enum Value {
	/// Fixed-width integer.
	Num(NumValue),
	/// String or prefixed data.
	Str(StrValue),
	/// Raw buffer.
	Blob(BlobValue),
	/// Enumeration or bitmask.
	Named(OverlayValue),
	/// Named compound.
	Struct(StructValue),
	/// Array or list.
	Array(ArrayValue),
	/// Top-level record.
	Group(Group),
}

macro_rules! typed_accessor {
	($name:ident, $name_mut:ident, $variant:ident, $ty:ty, $expected:literal) => {
		/// Borrow as the expected variant or fail with [`NvError::TypeMismatch`].
		pub fn $name(&self) -> Result<&$ty> {
			match self {
				Self::$variant(value) => Ok(value),
				other => Err(other.mismatch($expected)),
			}
		}

		/// Mutably borrow as the expected variant or fail with [`NvError::TypeMismatch`].
		pub fn $name_mut(&mut self) -> Result<&mut $ty> {
			match self {
				Self::$variant(value) => Ok(value),
				other => Err(other.mismatch($expected)),
			}
		}
	};
}

impl Value {
	typed_accessor!(as_num, as_num_mut, Num, NumValue, "number");
	typed_accessor!(as_string, as_string_mut, Str, StrValue, "string");
	typed_accessor!(as_blob, as_blob_mut, Blob, BlobValue, "blob");
	typed_accessor!(as_named, as_named_mut, Named, OverlayValue, "enum or bitmask");
	typed_accessor!(as_struct, as_struct_mut, Struct, StructValue, "struct");
	typed_accessor!(as_array, as_array_mut, Array, ArrayValue, "array");
	typed_accessor!(as_group, as_group_mut, Group, Group, "group");

	fn mismatch(&self, expected: &'static str) -> NvError {
		NvError::TypeMismatch {
			expected,
			got: self.type_name(),
		}
	}

	/// Variant tag.
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Num(_) => ValueKind::Num,
			Self::Str(_) => ValueKind::Str,
			Self::Blob(_) => ValueKind::Blob,
			Self::Named(value) => match value.overlay().mode() {
				OverlayMode::Enum => ValueKind::Enum,
				OverlayMode::Bitmask => ValueKind::Bitmask,
			},
			Self::Struct(_) => ValueKind::Struct,
			Self::Array(value) if value.is_list() => ValueKind::List,
			Self::Array(_) => ValueKind::Array,
			Self::Group(_) => ValueKind::Group,
		}
	}

	/// Structural type name.
	pub fn type_name(&self) -> String {
		match self {
			Self::Num(value) => value.type_name(),
			Self::Str(value) => value.type_name(),
			Self::Blob(value) => value.type_name(),
			Self::Named(value) => value.type_name(),
			Self::Struct(value) => value.def().name().to_owned(),
			Self::Array(value) => value.type_name(),
			Self::Group(value) => value.type_name(),
		}
	}

	/// Return `true` for values that own parts.
	pub fn is_compound(&self) -> bool {
		self.body().is_some()
	}

	pub(crate) fn body(&self) -> Option<&Compound> {
		match self {
			Self::Struct(value) => Some(&value.body),
			Self::Array(value) => Some(&value.body),
			Self::Group(value) => Some(&value.body),
			_ => None,
		}
	}

	pub(crate) fn body_mut(&mut self) -> Option<&mut Compound> {
		match self {
			Self::Struct(value) => Some(&mut value.body),
			Self::Array(value) => Some(&mut value.body),
			Self::Group(value) => Some(&mut value.body),
			_ => None,
		}
	}
}
