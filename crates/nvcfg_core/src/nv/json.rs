use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::nv::{Format, NodeId, NumStyle, Result, Tree, Value, Version};

/// Header summary and payload of a decoded record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordJson {
	/// Magic as text.
	pub magic: String,
	/// Layout name.
	pub name: String,
	/// Storage area.
	pub format: Format,
	/// Layout version.
	pub version: Version,
	/// Size field of the last read header.
	pub size: usize,
	/// Payload tree.
	pub value: JsonValue,
}

impl Tree {
	/// JSON form of the value at `id`; compounds omit parts that are not serialized.
	pub fn to_json(&self, id: NodeId) -> JsonValue {
		match self.value(id) {
			Value::Num(value) => match value.num_type().style() {
				NumStyle::Bool => serde_json::json!(value.num() != 0),
				NumStyle::Hex => serde_json::json!(value.render(false)),
				NumStyle::Decimal => {
					if let Ok(num) = i64::try_from(value.num()) {
						serde_json::json!(num)
					} else if let Ok(num) = u64::try_from(value.num()) {
						serde_json::json!(num)
					} else {
						serde_json::json!(value.num().to_string())
					}
				}
			},
			Value::Str(_) | Value::Blob(_) | Value::Named(_) => serde_json::json!(self.render(id, 0, false)),
			Value::Array(_) => JsonValue::Array(self.wire_parts(id).into_iter().map(|part| self.to_json(part)).collect()),
			Value::Struct(_) | Value::Group(_) => {
				let fields: Map<String, JsonValue> = self
					.wire_parts(id)
					.into_iter()
					.map(|part| (self.node(part).name().to_owned(), self.to_json(part)))
					.collect();
				JsonValue::Object(fields)
			}
		}
	}

	/// Record summary of the root group.
	pub fn record_json(&self) -> Result<RecordJson> {
		let group = self.group()?;
		Ok(RecordJson {
			magic: group.magic().to_string(),
			name: group.layout().name().to_owned(),
			format: group.format(),
			version: group.version(),
			size: group.size(),
			value: self.to_json(self.root()),
		})
	}
}
