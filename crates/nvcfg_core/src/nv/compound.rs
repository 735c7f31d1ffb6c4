use std::sync::Arc;

use tracing::debug;

use crate::nv::bytes::Cursor;
use crate::nv::text::{indent, quote_if_needed, split_compact};
use crate::nv::{Field, NodeId, NvError, Result, Tree, Value};

/// Declarative definition of a named compound.
#[derive(Debug, Clone)]
pub struct StructDef {
	name: Box<str>,
	fields: Vec<Field>,
	partial: bool,
	width: usize,
}

impl StructDef {
	/// Non-partial compound without a declared width.
	pub fn new(name: &str, fields: Vec<Field>) -> Self {
		Self {
			name: name.into(),
			fields,
			partial: false,
			width: 0,
		}
	}

	/// Tolerate input ending before all fields are read.
	pub fn partial(mut self) -> Self {
		self.partial = true;
		self
	}

	/// Stop reading once the next field would cross `width` bytes.
	pub fn with_width(mut self, width: usize) -> Self {
		self.width = width;
		self
	}

	/// Type name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Fields in wire order.
	pub fn fields(&self) -> &[Field] {
		&self.fields
	}

	/// Whether early end of input is tolerated.
	pub fn is_partial(&self) -> bool {
		self.partial
	}

	/// Declared width, 0 when unbounded.
	pub fn width(&self) -> usize {
		self.width
	}
}

/// Part bookkeeping shared by structs, arrays, and groups.
#[derive(Debug, Clone, Default)]
pub struct Compound {
	pub(crate) partial: bool,
	pub(crate) width: usize,
	pub(crate) observed: usize,
	pub(crate) parts: Vec<NodeId>,
	pub(crate) initialized: bool,
}

impl Compound {
	pub(crate) fn new(partial: bool, width: usize) -> Self {
		Self {
			partial,
			width,
			..Self::default()
		}
	}

	/// Parts in wire order.
	pub fn parts(&self) -> &[NodeId] {
		&self.parts
	}

	/// Whether early end of input is tolerated.
	pub fn is_partial(&self) -> bool {
		self.partial
	}

	/// Declared width, 0 when unbounded.
	pub fn declared_width(&self) -> usize {
		self.width
	}

	/// Bytes consumed by the last read.
	pub fn observed_size(&self) -> usize {
		self.observed
	}

	/// Observed size when nonzero, else the declared width.
	pub fn effective_size(&self) -> usize {
		if self.observed > 0 { self.observed } else { self.width }
	}
}

/// Runtime value of a [`StructDef`].
#[derive(Debug, Clone)]
pub struct StructValue {
	def: Arc<StructDef>,
	pub(crate) body: Compound,
}

impl StructValue {
	pub(crate) fn new(def: Arc<StructDef>) -> Self {
		let body = Compound::new(def.partial, def.width);
		Self { def, body }
	}

	/// Definition this value was built from.
	pub fn def(&self) -> &Arc<StructDef> {
		&self.def
	}

	/// Part bookkeeping.
	pub fn body(&self) -> &Compound {
		&self.body
	}
}

impl Tree {
	/// Build the parts of a compound from its definition.
	///
	/// Runs once; `force` rebuilds and drops existing part values. Returns whether parts were (re)built.
	pub fn init(&mut self, id: NodeId, force: bool) -> Result<bool> {
		let value = self.value(id);
		let Some(body) = value.body() else {
			return Err(NvError::TypeMismatch {
				expected: "compound",
				got: value.type_name(),
			});
		};
		if body.initialized && !force {
			return Ok(false);
		}
		self.rebuild(id);
		Ok(true)
	}

	pub(crate) fn init_if_needed(&mut self, id: NodeId) {
		if self.value(id).body().is_some_and(|body| !body.initialized) {
			self.rebuild(id);
		}
	}

	/// Reset a compound to its unset state, discarding every part value.
	pub fn clear(&mut self, id: NodeId) -> Result<()> {
		match self.value_mut(id) {
			Value::Array(array) if array.is_list() => array.set_count(0),
			Value::Group(group) => group.extra_len = 0,
			_ => {}
		}
		self.init(id, true)?;
		self.node_mut(id).set = false;
		Ok(())
	}

	fn rebuild(&mut self, id: NodeId) {
		let old = self.node_mut(id).value.body_mut().map(|body| std::mem::take(&mut body.parts)).unwrap_or_default();
		for part in old {
			self.release(part);
		}

		let fields = self.definition(id);
		let parts: Vec<NodeId> = fields.iter().map(|field| self.alloc(field, id)).collect();
		if let Some(body) = self.node_mut(id).value.body_mut() {
			body.parts = parts;
			body.initialized = true;
			body.observed = 0;
		}
	}

	/// Field list the parts of `id` are built from.
	pub(crate) fn definition(&self, id: NodeId) -> Vec<Field> {
		match self.value(id) {
			Value::Struct(value) => value.def.fields.clone(),
			Value::Array(value) => value.definition(),
			Value::Group(value) => value.definition(),
			_ => Vec::new(),
		}
	}

	pub(crate) fn read_struct(&mut self, id: NodeId, cursor: &mut Cursor<'_>) -> Result<usize> {
		self.init_if_needed(id);
		let (partial, width) = match self.value(id).body() {
			Some(body) => (body.partial, body.width),
			None => (false, 0),
		};
		let consumed = self.read_parts(id, cursor, partial, width)?;
		self.node_mut(id).set = true;
		Ok(consumed)
	}

	/// Read enabled parts in order and record the consumed size.
	///
	/// A nonzero `width` stops before the first part that would cross it. A `partial` compound stops quietly when
	/// input runs out, and a part it fails to read short is not counted as consumed. In both stops the cut part and
	/// every part after it are disabled so a write reproduces the input.
	pub(crate) fn read_parts(&mut self, id: NodeId, cursor: &mut Cursor<'_>, partial: bool, width: usize) -> Result<usize> {
		let parts = self.children(id).to_vec();
		let mut consumed = 0_usize;
		let mut cut = None;

		for (idx, part) in parts.iter().copied().enumerate() {
			if self.is_disabled(part) {
				continue;
			}
			if width > 0 && consumed + self.bytes(part) > width {
				debug!(path = %self.path_of(part), consumed, width, "declared width reached");
				cut = Some(idx);
				break;
			}
			if partial && cursor.is_at_end() {
				debug!(path = %self.path_of(part), "input exhausted, leaving remaining parts unset");
				break;
			}
			match self.read_node(part, cursor) {
				Ok(len) => consumed += len,
				Err(err) if partial && err.is_short_read() => {
					debug!(path = %self.path_of(part), %err, "short read in partial compound");
					cut = Some(idx);
					break;
				}
				Err(err) => return Err(err),
			}
		}

		if let Some(idx) = cut {
			for part in &parts[idx..] {
				self.set_disabled(*part, true);
			}
		}
		if let Some(body) = self.node_mut(id).value.body_mut() {
			body.observed = consumed;
		}
		Ok(consumed)
	}

	/// Enabled parts that take part in write and render.
	///
	/// Partial compounds stop after their last set part.
	pub(crate) fn wire_parts(&self, id: NodeId) -> Vec<NodeId> {
		let Some(body) = self.value(id).body() else {
			return Vec::new();
		};
		let end = if body.partial {
			body.parts
				.iter()
				.rposition(|part| self.is_set(*part) && !self.is_disabled(*part))
				.map_or(0, |idx| idx + 1)
		} else {
			body.parts.len()
		};
		body.parts[..end].iter().copied().filter(|part| !self.is_disabled(*part)).collect()
	}

	pub(crate) fn write_parts(&self, id: NodeId, out: &mut Vec<u8>) -> Result<()> {
		for part in self.wire_parts(id) {
			self.write(part, out)?;
		}
		Ok(())
	}

	/// Text of a part embedded in a parent's compact form.
	pub(crate) fn render_embedded(&self, id: NodeId) -> String {
		let text = self.render(id, 0, false);
		if self.value(id).is_compound() { text } else { quote_if_needed(&text).into_owned() }
	}

	pub(crate) fn render_compound(&self, id: NodeId, level: usize, pretty: bool) -> String {
		let parts = self.wire_parts(id);
		if !pretty {
			let body: Vec<String> = parts
				.iter()
				.map(|part| format!("{}={}", self.node(*part).name(), self.render_embedded(*part)))
				.collect();
			return format!("{{{}}}", body.join(", "));
		}

		if parts.is_empty() {
			return "{ }".to_owned();
		}
		let mut out = String::from("{\n");
		for part in parts {
			out.push_str(&format!(
				"{}{} = {}\n",
				indent(level + 1),
				self.node(part).name(),
				self.render(part, level + 1, true)
			));
		}
		out.push_str(&indent(level));
		out.push('}');
		out
	}

	/// Apply compact text to a compound; the tree is left untouched on failure.
	pub(crate) fn parse_compound(&mut self, id: NodeId, text: &str) -> Result<()> {
		let snapshot = self.clone();
		let result = match self.value(id) {
			Value::Array(_) => self.parse_array_entries(id, text),
			_ => self.parse_named_entries(id, text),
		};
		if result.is_err() {
			*self = snapshot;
		}
		result
	}

	fn parse_named_entries(&mut self, id: NodeId, text: &str) -> Result<()> {
		let entries =
			split_compact(text, true).ok_or_else(|| NvError::invalid_text(self.type_name(id), text).at_path(&self.path_of(id)))?;
		self.init_if_needed(id);
		for entry in entries {
			let name = entry.name.unwrap_or_default();
			self.set(id, &name, &entry.value)?;
		}
		self.mark_set(id);
		Ok(())
	}
}
