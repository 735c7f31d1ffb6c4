use crate::nv::bytes::Cursor;
use crate::nv::{Field, FieldPath, NvError, PathStep, Result, Value, ValueType};

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
	fn index(self) -> usize {
		self.0 as usize
	}
}

/// One value slot in the arena, with its name and parent link.
#[derive(Debug, Clone)]
pub struct Node {
	name: Box<str>,
	parent: Option<NodeId>,
	pub(crate) value: Value,
	pub(crate) set: bool,
	pub(crate) disabled: bool,
}

impl Node {
	/// Part name within the parent, empty for roots.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Owning compound, `None` for roots.
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	/// Stored value.
	pub fn value(&self) -> &Value {
		&self.value
	}

	/// Whether the value has been read, parsed, or assigned.
	pub fn is_set(&self) -> bool {
		self.set
	}

	/// Whether the value is excluded from serialization.
	pub fn is_disabled(&self) -> bool {
		self.disabled
	}
}

/// Arena owning a value tree; compounds refer to their parts by [`NodeId`].
///
/// Cloning yields a structurally independent tree.
#[derive(Debug, Clone)]
pub struct Tree {
	nodes: Vec<Node>,
	free: Vec<NodeId>,
	root: NodeId,
}

impl Tree {
	/// Build a tree whose root is a default value of `ty`; compound roots are initialized.
	pub fn new(ty: impl Into<ValueType>) -> Self {
		let mut tree = Self::from_value("", ty.into().instantiate());
		let root = tree.root;
		if tree.value(root).is_compound() {
			tree.init_if_needed(root);
		}
		tree
	}

	pub(crate) fn from_value(name: &str, value: Value) -> Self {
		Self {
			nodes: vec![Node {
				name: name.into(),
				parent: None,
				value,
				set: false,
				disabled: false,
			}],
			free: Vec::new(),
			root: NodeId(0),
		}
	}

	/// Root node.
	pub fn root(&self) -> NodeId {
		self.root
	}

	/// Borrow a node.
	///
	/// # Panics
	///
	/// Panics when `id` does not belong to this tree.
	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.index()]
	}

	pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
		&mut self.nodes[id.index()]
	}

	/// Borrow the value stored at `id`.
	pub fn value(&self, id: NodeId) -> &Value {
		&self.node(id).value
	}

	/// Mutably borrow the value stored at `id`; the set flag is left untouched.
	pub fn value_mut(&mut self, id: NodeId) -> &mut Value {
		&mut self.node_mut(id).value
	}

	/// Whether the value at `id` has been read, parsed, or assigned.
	pub fn is_set(&self, id: NodeId) -> bool {
		self.node(id).set
	}

	/// Whether the value at `id` is excluded from serialization.
	pub fn is_disabled(&self, id: NodeId) -> bool {
		self.node(id).disabled
	}

	/// Include or exclude the value at `id` from serialization.
	pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
		self.node_mut(id).disabled = disabled;
	}

	/// Parts of a compound in wire order; empty for leaves.
	pub fn children(&self, id: NodeId) -> &[NodeId] {
		self.value(id).body().map(|body| body.parts.as_slice()).unwrap_or_default()
	}

	/// Structural type name of the value at `id`.
	pub fn type_name(&self, id: NodeId) -> String {
		self.value(id).type_name()
	}

	/// Dotted path from the root to `id`; the root itself is the empty path.
	pub fn path_of(&self, id: NodeId) -> String {
		let mut names = Vec::new();
		let mut cur = id;
		while let Some(parent) = self.node(cur).parent {
			names.push(self.node(cur).name.as_ref());
			cur = parent;
		}
		names.reverse();
		names.join(".")
	}

	fn join_path(&self, id: NodeId, path: &str) -> String {
		let base = self.path_of(id);
		if base.is_empty() { path.to_owned() } else { format!("{base}.{path}") }
	}

	/// Look up a direct part by name without failing.
	pub fn find(&self, id: NodeId, name: &str) -> Option<NodeId> {
		self.children(id).iter().copied().find(|part| self.node(*part).name.as_ref() == name)
	}

	/// Resolve a dotted path below `id`.
	pub fn get(&self, id: NodeId, path: &str) -> Result<NodeId> {
		let parsed = FieldPath::parse(path)?;
		let mut cur = id;
		for step in &parsed.steps {
			let next = match step {
				PathStep::Field(name) => self.find(cur, name),
				PathStep::Index(idx) => self.find(cur, &idx.to_string()),
				PathStep::Append => None,
			};
			cur = next.ok_or_else(|| NvError::UnknownField {
				path: self.join_path(id, path),
			})?;
		}
		Ok(cur)
	}

	/// Resolve `path` below `id` and parse `text` into the target.
	///
	/// A `-1` step appends a list element; when the rest of the assignment fails, that element is removed again.
	pub fn set(&mut self, id: NodeId, path: &str, text: &str) -> Result<NodeId> {
		let parsed = FieldPath::parse(path)?;
		let full = self.join_path(id, path);
		self.set_steps(id, &parsed.steps, &full, text)
	}

	fn set_steps(&mut self, id: NodeId, steps: &[PathStep], full: &str, text: &str) -> Result<NodeId> {
		let Some((step, rest)) = steps.split_first() else {
			self.parse(id, text)?;
			return Ok(id);
		};
		if self.value(id).is_compound() {
			self.init_if_needed(id);
		}

		let next = match step {
			PathStep::Field(name) => self.find(id, name),
			PathStep::Index(idx) => self.find(id, &idx.to_string()),
			PathStep::Append => {
				let is_list = matches!(self.value(id), Value::Array(array) if array.is_list());
				if !is_list {
					return Err(NvError::UnknownField { path: full.to_owned() });
				}
				let appended = self.append(id)?;
				return match self.set_steps(appended, rest, full, text) {
					Ok(target) => Ok(target),
					Err(err) => {
						self.remove_last(id);
						Err(err)
					}
				};
			}
		};
		let next = next.ok_or_else(|| NvError::UnknownField { path: full.to_owned() })?;
		self.set_steps(next, rest, full, text)
	}

	/// Parse text into the value at `id`; on failure the previous value is kept.
	///
	/// Compact `[v0, v1, ...]` text replaces a list's contents, so its count becomes the number of entries rather
	/// than growing through [`Tree::append`]. A fixed array takes at most its count of entries and keeps the rest.
	pub fn parse(&mut self, id: NodeId, text: &str) -> Result<()> {
		let result = match &mut self.node_mut(id).value {
			Value::Num(value) => value.parse(text),
			Value::Str(value) => value.parse(text),
			Value::Blob(value) => value.parse(text),
			Value::Named(value) => value.parse(text),
			Value::Struct(_) | Value::Array(_) | Value::Group(_) => return self.parse_compound(id, text),
		};
		match result {
			Ok(()) => {
				self.mark_set(id);
				Ok(())
			}
			Err(err) => Err(err.at_path(&self.path_of(id))),
		}
	}

	/// Assign a raw number to a numeric, enum, or bitmask leaf without a range check.
	pub fn set_num(&mut self, id: NodeId, num: i128) -> Result<()> {
		match &mut self.node_mut(id).value {
			Value::Num(value) => value.set_num(num),
			Value::Named(value) => value.set_num(num),
			other => {
				return Err(NvError::TypeMismatch {
					expected: "number",
					got: other.type_name(),
				});
			}
		}
		self.mark_set(id);
		Ok(())
	}

	pub(crate) fn mark_set(&mut self, id: NodeId) {
		let mut cur = Some(id);
		while let Some(node) = cur {
			self.node_mut(node).set = true;
			cur = self.node(node).parent;
		}
	}

	/// Render the value at `id`; pretty text is indented at `level`, compact text is parseable.
	pub fn render(&self, id: NodeId, level: usize, pretty: bool) -> String {
		match self.value(id) {
			Value::Num(value) => value.render(pretty),
			Value::Str(value) => value.render(pretty),
			Value::Blob(value) => value.render(level, pretty),
			Value::Named(value) => value.render(pretty),
			Value::Struct(_) | Value::Group(_) => self.render_compound(id, level, pretty),
			Value::Array(_) => self.render_array(id, level, pretty),
		}
	}

	/// Compact text of the value at `id`.
	pub fn to_str(&self, id: NodeId) -> String {
		self.render(id, 0, false)
	}

	/// Pretty text of the value at `id`.
	pub fn to_pretty(&self, id: NodeId) -> String {
		self.render(id, 0, true)
	}

	/// Decode the value at `id` from `cursor`; the set flag is raised on success.
	pub fn read(&mut self, id: NodeId, cursor: &mut Cursor<'_>) -> Result<()> {
		self.read_node(id, cursor).map(|_| ())
	}

	/// Decode and return the number of bytes the value claims from the input.
	pub(crate) fn read_node(&mut self, id: NodeId, cursor: &mut Cursor<'_>) -> Result<usize> {
		let start = cursor.pos();
		let result = match &mut self.node_mut(id).value {
			Value::Num(value) => value.read(cursor),
			Value::Str(value) => value.read(cursor),
			Value::Blob(value) => value.read(cursor),
			Value::Named(value) => value.read(cursor),
			Value::Struct(_) => return self.read_struct(id, cursor),
			Value::Array(_) => return self.read_array(id, cursor),
			Value::Group(_) => return self.read_group(id, cursor),
		};
		match result {
			Ok(()) => {
				self.node_mut(id).set = true;
				Ok(cursor.pos() - start)
			}
			Err(err) => Err(err.at_path(&self.path_of(id))),
		}
	}

	/// Encode the value at `id` onto `out`.
	pub fn write(&self, id: NodeId, out: &mut Vec<u8>) -> Result<()> {
		let result = match self.value(id) {
			Value::Num(value) => value.write(out),
			Value::Str(value) => value.write(out),
			Value::Blob(value) => {
				value.write(out);
				Ok(())
			}
			Value::Named(value) => value.write(out),
			Value::Struct(_) => self.write_parts(id, out),
			Value::Array(_) => self.write_array(id, out),
			Value::Group(_) => self.write_group(id, out),
		};
		result.map_err(|err| err.at_path(&self.path_of(id)))
	}

	/// Encode the value at `id` into a fresh buffer.
	pub fn to_bytes(&self, id: NodeId) -> Result<Vec<u8>> {
		let mut out = Vec::new();
		self.write(id, &mut out)?;
		Ok(out)
	}

	/// Current byte length of the value at `id`.
	pub fn bytes(&self, id: NodeId) -> usize {
		match self.value(id) {
			Value::Num(value) => value.bytes(),
			Value::Str(value) => value.bytes(),
			Value::Blob(value) => value.bytes(),
			Value::Named(value) => value.bytes(),
			Value::Struct(value) => value.body.effective_size(),
			Value::Array(value) => value.body.effective_size() + value.count_width(),
			Value::Group(value) => value.body.effective_size() + value.header_len(),
		}
	}

	pub(crate) fn alloc(&mut self, field: &Field, parent: NodeId) -> NodeId {
		let node = Node {
			name: field.name.clone(),
			parent: Some(parent),
			value: field.ty.instantiate(),
			set: false,
			disabled: field.disabled,
		};
		let id = match self.free.pop() {
			Some(id) => {
				self.nodes[id.index()] = node;
				id
			}
			None => {
				let id = NodeId(self.nodes.len() as u32);
				self.nodes.push(node);
				id
			}
		};
		if self.value(id).is_compound() {
			self.init_if_needed(id);
		}
		id
	}

	/// Return `id` and its descendants to the free list.
	pub(crate) fn release(&mut self, id: NodeId) {
		let mut stack = vec![id];
		while let Some(cur) = stack.pop() {
			stack.extend_from_slice(self.children(cur));
			if let Some(body) = self.node_mut(cur).value.body_mut() {
				body.parts.clear();
			}
			self.free.push(cur);
		}
	}

	/// Number of live nodes.
	pub fn len(&self) -> usize {
		self.nodes.len() - self.free.len()
	}

	/// Always `false`; a tree has at least its root.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
