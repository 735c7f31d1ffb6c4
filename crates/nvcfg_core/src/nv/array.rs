use std::sync::Arc;

use tracing::debug;

use crate::nv::bytes::Cursor;
use crate::nv::text::{indent, split_compact};
use crate::nv::{Compound, Field, NodeId, NumType, NvError, Result, Tree, ValueType};

/// Predicate that marks the element where pretty output of a self-terminating sequence stops.
pub type IsEnd = fn(&Tree, NodeId) -> bool;

/// Element type and count source of an array or list.
#[derive(Debug, Clone)]
pub struct ArraySpec {
	elem: ValueType,
	count: usize,
	count_type: Option<NumType>,
	is_end: Option<IsEnd>,
}

impl ArraySpec {
	/// Array of exactly `count` elements with no count on the wire.
	///
	/// # Panics
	///
	/// Panics when `count` is zero.
	pub fn fixed(elem: impl Into<ValueType>, count: usize) -> Self {
		assert!(count > 0, "fixed array count must be nonzero");
		Self {
			elem: elem.into(),
			count,
			count_type: None,
			is_end: None,
		}
	}

	/// List whose element count is a big-endian `count_type` prefix.
	pub fn list(elem: impl Into<ValueType>, count_type: NumType) -> Self {
		Self {
			elem: elem.into(),
			count: 0,
			count_type: Some(count_type),
			is_end: None,
		}
	}

	/// List with a `u8` count.
	pub fn p8list(elem: impl Into<ValueType>) -> Self {
		Self::list(elem, NumType::U8)
	}

	/// List with a `u16` count.
	pub fn p16list(elem: impl Into<ValueType>) -> Self {
		Self::list(elem, NumType::U16)
	}

	/// Stop pretty output at the first element matching `is_end`.
	pub fn until(mut self, is_end: IsEnd) -> Self {
		self.is_end = Some(is_end);
		self
	}

	/// Element type.
	pub fn elem(&self) -> &ValueType {
		&self.elem
	}

	/// Whether a count prefix is present.
	pub fn is_list(&self) -> bool {
		self.count_type.is_some()
	}

	/// Count prefix type, `None` for fixed arrays.
	pub fn count_type(&self) -> Option<NumType> {
		self.count_type
	}

	pub(crate) fn min_bytes(&self) -> usize {
		match self.count_type {
			Some(count_type) => count_type.width(),
			None => self.count * self.elem.min_bytes(),
		}
	}
}

/// Smallest encoding any value of `ty` can have.
fn floor_bytes(ty: &ValueType) -> usize {
	match ty {
		ValueType::Struct(def) if def.is_partial() || def.width() > 0 => 0,
		ValueType::Struct(def) => def.fields().iter().filter(|field| !field.disabled).map(|field| floor_bytes(&field.ty)).sum(),
		ValueType::Array(spec) => match spec.count_type {
			Some(count_type) => count_type.width(),
			None => spec.count * floor_bytes(&spec.elem),
		},
		leaf => leaf.min_bytes(),
	}
}

/// Runtime value of an [`ArraySpec`].
#[derive(Debug, Clone)]
pub struct ArrayValue {
	spec: Arc<ArraySpec>,
	count: usize,
	pub(crate) body: Compound,
}

impl ArrayValue {
	pub(crate) fn new(spec: Arc<ArraySpec>) -> Self {
		let count = if spec.is_list() { 0 } else { spec.count };
		let body = Compound::new(false, count * spec.elem.min_bytes());
		Self { spec, count, body }
	}

	/// Shape of this array.
	pub fn spec(&self) -> &Arc<ArraySpec> {
		&self.spec
	}

	/// Current element count.
	pub fn count(&self) -> usize {
		self.count
	}

	/// Whether a count prefix is present.
	pub fn is_list(&self) -> bool {
		self.spec.is_list()
	}

	/// Largest count a list prefix can encode, `None` for fixed arrays.
	pub fn max_count(&self) -> Option<u64> {
		self.spec.count_type.map(|count_type| count_type.storage_max() as u64)
	}

	/// Type name such as `list<u32>[3]` or `array<mac>[4]`.
	pub fn type_name(&self) -> String {
		let kind = if self.is_list() { "list" } else { "array" };
		let mut name = format!("{kind}<{}>", self.spec.elem.type_name());
		if self.count > 0 {
			name.push_str(&format!("[{}]", self.count));
		}
		name
	}

	pub(crate) fn set_count(&mut self, count: usize) {
		self.count = count;
		self.body.width = count * self.spec.elem.min_bytes();
	}

	pub(crate) fn count_width(&self) -> usize {
		self.spec.count_type.map_or(0, |count_type| count_type.width())
	}

	pub(crate) fn definition(&self) -> Vec<Field> {
		(0..self.count).map(|idx| Field::new(&idx.to_string(), self.spec.elem.clone())).collect()
	}
}

impl Tree {
	pub(crate) fn read_array(&mut self, id: NodeId, cursor: &mut Cursor<'_>) -> Result<usize> {
		let mut consumed = 0;
		if let Some(count_type) = self.value(id).as_array()?.spec.count_type {
			if cursor.is_at_end() {
				debug!(path = %self.path_of(id), "no list count in input");
				self.value_mut(id).as_array_mut()?.set_count(0);
				self.init(id, true)?;
				self.node_mut(id).set = true;
				return Ok(0);
			}
			let raw = count_type.decode(cursor).map_err(|err| err.at_path(&self.path_of(id)))?;
			let count = usize::try_from(raw)
				.map_err(|_| NvError::malformed(self.type_name(id), format!("invalid count {raw}")).at_path(&self.path_of(id)))?;
			let need = count.saturating_mul(floor_bytes(&self.value(id).as_array()?.spec.elem));
			if need > cursor.remaining() {
				cursor.read_exact_or_drain(need)?;
			}
			self.value_mut(id).as_array_mut()?.set_count(count);
			self.init(id, true)?;
			consumed = count_type.width();
		} else {
			self.init_if_needed(id);
		}

		match self.read_parts(id, cursor, false, 0) {
			Ok(len) => consumed += len,
			Err(err) => {
				if self.value(id).as_array()?.is_list() {
					debug!(path = %self.path_of(id), %err, "list elements cut short");
					self.clear(id)?;
				}
				return Err(err);
			}
		}
		self.node_mut(id).set = true;
		Ok(consumed)
	}

	pub(crate) fn write_array(&self, id: NodeId, out: &mut Vec<u8>) -> Result<()> {
		let array = self.value(id).as_array()?;
		if let Some(count_type) = array.spec.count_type {
			count_type.encode(array.count as i128, out)?;
		}
		self.write_parts(id, out)
	}

	/// Grow a list by one default element and return it.
	pub fn append(&mut self, id: NodeId) -> Result<NodeId> {
		self.init_if_needed(id);
		let array = self.value(id).as_array()?;
		let Some(max) = array.max_count() else {
			return Err(NvError::TypeMismatch {
				expected: "list",
				got: array.type_name(),
			});
		};
		if array.count as u64 >= max {
			return Err(NvError::CapacityExceeded {
				path: self.path_of(id),
				max,
			});
		}

		let count = array.count;
		let field = Field::new(&count.to_string(), array.spec.elem.clone());
		let part = self.alloc(&field, id);
		let array = self.value_mut(id).as_array_mut()?;
		array.set_count(count + 1);
		array.body.parts.push(part);
		Ok(part)
	}

	pub(crate) fn remove_last(&mut self, id: NodeId) {
		let Ok(array) = self.value_mut(id).as_array_mut() else {
			return;
		};
		let Some(part) = array.body.parts.pop() else {
			return;
		};
		let count = array.count.saturating_sub(1);
		array.set_count(count);
		self.release(part);
	}

	pub(crate) fn render_array(&self, id: NodeId, level: usize, pretty: bool) -> String {
		let parts = self.wire_parts(id);
		if !pretty {
			let body: Vec<String> = parts.iter().map(|part| self.render_embedded(*part)).collect();
			return format!("[{}]", body.join(", "));
		}

		let is_end = self.value(id).as_array().ok().and_then(|array| array.spec.is_end);
		let mut lines = Vec::new();
		for part in parts {
			if is_end.is_some_and(|is_end| is_end(self, part)) {
				break;
			}
			lines.push(format!("{}{} = {}", indent(level + 1), self.node(part).name(), self.render(part, level + 1, true)));
		}
		if lines.is_empty() {
			return "[ ]".to_owned();
		}
		format!("[\n{}\n{}]", lines.join("\n"), indent(level))
	}

	pub(crate) fn parse_array_entries(&mut self, id: NodeId, text: &str) -> Result<()> {
		let invalid = |tree: &Self| NvError::invalid_text(tree.type_name(id), text).at_path(&tree.path_of(id));
		let Some(entries) = split_compact(text, false) else {
			return Err(invalid(self));
		};

		let array = self.value(id).as_array()?;
		let (count, max_count) = (array.count, array.max_count());
		match max_count {
			Some(max) if entries.len() as u64 > max => {
				return Err(NvError::CapacityExceeded {
					path: self.path_of(id),
					max,
				});
			}
			Some(_) => {
				self.value_mut(id).as_array_mut()?.set_count(entries.len());
				self.init(id, true)?;
			}
			None if entries.len() > count => return Err(invalid(self)),
			None => self.init_if_needed(id),
		}

		let parts = self.children(id).to_vec();
		for (part, entry) in parts.into_iter().zip(entries) {
			self.parse(part, &entry.value)?;
		}
		self.mark_set(id);
		Ok(())
	}
}

#[cfg(test)]
mod tests;
