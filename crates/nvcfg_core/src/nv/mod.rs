mod array;
mod blob;
mod bytes;
mod compound;
mod error;
mod group;
mod groups;
mod json;
mod num;
mod overlay;
mod path;
mod registry;
mod string;
mod text;
mod tree;
mod value;

/// Fixed arrays, count-prefixed lists, and their runtime values.
pub use array::{ArraySpec, ArrayValue, IsEnd};
/// Raw buffers, addresses, and record header identifiers.
pub use blob::{BlobKind, BlobValue, Magic, Version};
/// Bounded input cursor and byte order.
pub use bytes::{Cursor, Endianness};
/// Struct definitions and shared part bookkeeping.
pub use compound::{Compound, StructDef, StructValue};
/// Error and result aliases.
pub use error::{NvError, Result};
/// Records, formats, layouts, and profiles.
pub use group::{Format, GenericLayout, Group, GroupLayout, Profile, StaticProfile};
/// Built-in record layouts.
pub use groups::{BoltEnvLayout, DhcpLayout, FirewallLayout, HttpLayout, WifiLayout, builtin_layouts};
/// JSON export types.
pub use json::RecordJson;
/// Fixed-width integer codec.
pub use num::{NumStyle, NumType, NumValue};
/// Enum and bitmask name tables.
pub use overlay::{NameTable, Overlay, OverlayMode, OverlayValue};
/// Field path parser types.
pub use path::{FieldPath, PathStep};
/// Record registry and decode options.
pub use registry::{GroupRegistry, ReadOptions, registry};
/// String layouts and values.
pub use string::{NulPolicy, StrLayout, StrValue};
/// Value tree arena.
pub use tree::{Node, NodeId, Tree};
/// Value and type model.
pub use value::{Field, Value, ValueKind, ValueType};
