#![allow(missing_docs)]

use nvcfg::nv::{Cursor, NumType, NvError, Overlay, StrLayout, Tree, ValueType};

fn leaf_types() -> Vec<(ValueType, &'static str)> {
	vec![
		(NumType::U8.into(), "255"),
		(NumType::I8.into(), "-128"),
		(NumType::U16.into(), "65535"),
		(NumType::I16LE.into(), "-2"),
		(NumType::U32LE.into(), "305419896"),
		(NumType::I64.into(), "-9223372036854775808"),
		(NumType::U64.into(), "18446744073709551615"),
		(NumType::U16.hex().into(), "0x00ff"),
		(NumType::BOOL.into(), "yes"),
		(ValueType::ip4(), "10.1.2.3"),
		(ValueType::ip6(), "fe80::1"),
		(ValueType::mac(), "00:1a:2b:3c:4d:5e"),
		(ValueType::magic(), "MLog"),
		(ValueType::version(), "1.2"),
		(ValueType::data(3), "a1b2c3"),
		(StrLayout::fstring(8).into(), "abc"),
		(StrLayout::fstring(3).into(), "abc"),
		(StrLayout::fzstring(4).into(), "abc"),
		(StrLayout::zstring().into(), "hello"),
		(StrLayout::p8string().into(), "x y"),
		(StrLayout::p8istring().into(), "abc"),
		(StrLayout::p8zstring().into(), "secret"),
		(StrLayout::p16string().into(), "admin"),
		(StrLayout::p16istring().into(), "abc"),
		(StrLayout::p16zstring().into(), "root"),
		(StrLayout::p8data().into(), "0102"),
		(Overlay::enumeration("mode", NumType::U8, &["off", "on", "auto"]).into(), "auto"),
		(Overlay::enum_map("band", NumType::U8, &[(2, "2.4ghz"), (5, "5ghz")]).into(), "2.4ghz"),
		(Overlay::bitmask("flags", NumType::U16, &["A", "B", "C"]).into(), "A|C"),
	]
}

#[test]
fn every_leaf_round_trips_through_the_wire() {
	for (ty, text) in leaf_types() {
		let mut tree = Tree::new(ty.clone());
		let root = tree.root();
		tree.parse(root, text).unwrap_or_else(|err| panic!("{text} as {}: {err}", ty.type_name()));
		let bytes = tree.to_bytes(root).expect("write");
		assert_eq!(bytes.len(), tree.bytes(root), "{}", ty.type_name());

		let mut back = Tree::new(ty.clone());
		let mut cursor = Cursor::new(&bytes);
		back.read(root, &mut cursor).expect("read");
		assert!(cursor.is_at_end(), "{} left bytes behind", ty.type_name());
		assert_eq!(back.to_str(root), text, "{}", ty.type_name());
	}
}

#[test]
fn render_then_parse_is_idempotent() {
	for (ty, text) in leaf_types() {
		let mut tree = Tree::new(ty.clone());
		let root = tree.root();
		tree.parse(root, text).expect("parse");
		let first = tree.to_str(root);
		tree.parse(root, &first).expect("reparse own text");
		assert_eq!(tree.to_str(root), first, "{}", ty.type_name());
	}
}

#[test]
fn text_outside_declared_range_is_rejected_and_value_kept() {
	let mut tree = Tree::new(NumType::U16.with_range(1, 100));
	let root = tree.root();
	tree.parse(root, "50").expect("in range");
	for text in ["0", "101", "-1", "65536", "fifty", ""] {
		let err = tree.parse(root, text).expect_err(text);
		assert!(matches!(err, NvError::InvalidText { .. }), "{text}: {err}");
		assert_eq!(tree.to_str(root), "50");
	}
}

#[test]
fn write_checks_storage_range_not_declared_range() {
	let mut tree = Tree::new(NumType::U16.with_range(1, 100));
	let root = tree.root();
	tree.set_num(root, 5000).expect("numeric leaf");
	assert_eq!(tree.to_bytes(root).expect("fits storage"), [0x13, 0x88]);
	assert_eq!(tree.to_pretty(root), "5000 (out of range)");

	let mut back = Tree::new(NumType::U16.with_range(1, 100));
	back.read(root, &mut Cursor::new(&[0x13, 0x88])).expect("read does not check the range");
	assert_eq!(back.to_str(root), "5000");

	tree.set_num(root, 70000).expect("numeric leaf");
	let err = tree.to_bytes(root).expect_err("exceeds storage");
	assert!(matches!(err, NvError::ValueTooLarge { .. }), "{err}");
}

#[test]
fn bitmask_deltas_accumulate() {
	let mut tree = Tree::new(Overlay::bitmask("flags", NumType::U8, &["A", "B"]));
	let root = tree.root();
	assert_eq!(tree.to_str(root), "0x00");

	tree.parse(root, "+A").expect("or A");
	assert_eq!(tree.to_bytes(root).expect("write"), [0x01]);
	tree.parse(root, "+B").expect("or B");
	assert_eq!(tree.to_bytes(root).expect("write"), [0x03]);
	assert_eq!(tree.to_str(root), "A|B");
	tree.parse(root, "-A").expect("clear A");
	assert_eq!(tree.to_bytes(root).expect("write"), [0x02]);
	tree.parse(root, "A").expect("replace");
	assert_eq!(tree.to_bytes(root).expect("write"), [0x01]);
}

#[test]
fn enum_accepts_unnamed_numbers() {
	let mut tree = Tree::new(Overlay::enumeration("mode", NumType::U8, &["off", "on"]));
	let root = tree.root();
	tree.parse(root, "7").expect("raw value");
	assert_eq!(tree.to_str(root), "mode(7)");
	assert_eq!(tree.to_pretty(root), "mode(7) [mode]");
	tree.parse(root, "maybe").expect_err("not a name or number");
}

#[test]
fn strings_respect_their_width() {
	let mut tree = Tree::new(StrLayout::fzstring(4));
	let root = tree.root();
	tree.parse(root, "abcd").expect_err("no room for the NUL");
	tree.parse(root, "").expect("empty");
	assert_eq!(tree.to_bytes(root).expect("write"), [0, 0, 0, 0]);

	let mut missing_nul = Tree::new(StrLayout::p8zstring());
	let err = missing_nul.read(root, &mut Cursor::new(&[2, b'a', b'b'])).expect_err("unterminated");
	assert!(matches!(err, NvError::Malformed { .. }), "{err}");
}

#[test]
fn truncated_leaf_is_short_read() {
	let mut tree = Tree::new(NumType::U32);
	let root = tree.root();
	let err = tree.read(root, &mut Cursor::new(&[1, 2])).expect_err("two of four bytes");
	assert!(err.is_short_read(), "{err}");
}
