use crate::nv::bytes::Cursor;
use crate::nv::{ArraySpec, NodeId, NumType, NvError, StrLayout, Tree, ValueKind};

fn u32_list() -> Tree {
	Tree::new(ArraySpec::p16list(NumType::U32))
}

#[test]
fn appended_elements_serialize_after_count() {
	let mut tree = u32_list();
	let root = tree.root();
	for text in ["1", "2", "0xdeadbeef"] {
		tree.set(root, "-1", text).expect("append");
	}
	assert_eq!(tree.value(root).as_array().expect("list").count(), 3);
	assert_eq!(tree.value(root).kind(), ValueKind::List);
	assert_eq!(tree.type_name(root), "list<u32be>[3]");

	let bytes = tree.to_bytes(root).expect("write");
	assert_eq!(bytes, [0, 3, 0, 0, 0, 1, 0, 0, 0, 2, 0xde, 0xad, 0xbe, 0xef]);
	assert_eq!(tree.bytes(root), 14);

	let mut back = u32_list();
	back.read(root, &mut Cursor::new(&bytes)).expect("read back");
	assert_eq!(back.to_str(root), tree.to_str(root));
	assert_eq!(back.to_str(root), "[1, 2, 3735928559]");
}

#[test]
fn list_without_count_is_set_but_empty() {
	let mut tree = u32_list();
	let root = tree.root();
	tree.read(root, &mut Cursor::new(&[])).expect("empty input");
	assert!(tree.is_set(root));
	assert!(tree.children(root).is_empty());
	assert_eq!(tree.to_bytes(root).expect("write"), [0, 0]);
}

#[test]
fn truncated_list_element_is_short_read() {
	let mut tree = u32_list();
	let root = tree.root();
	let err = tree.read(root, &mut Cursor::new(&[0, 2, 0, 0, 0, 1, 0])).expect_err("second element truncated");
	assert!(err.is_short_read());
}

#[test]
fn list_cut_inside_an_element_is_reset() {
	let mut tree = Tree::new(ArraySpec::p8list(StrLayout::p8string()));
	let root = tree.root();
	let err = tree.read(root, &mut Cursor::new(&[2, 1, b'a', 5, b'b'])).expect_err("second element truncated");
	assert!(err.is_short_read(), "{err}");
	assert_eq!(tree.value(root).as_array().expect("list").count(), 0);
	assert!(tree.children(root).is_empty());
	assert!(!tree.is_set(root));
	assert_eq!(tree.to_bytes(root).expect("write"), [0]);
}

#[test]
fn append_fails_at_count_capacity() {
	let mut tree = Tree::new(ArraySpec::p8list(NumType::U8));
	let root = tree.root();
	for _ in 0..255 {
		tree.append(root).expect("below capacity");
	}
	let err = tree.set(root, "-1", "1").expect_err("count field is full");
	assert!(matches!(err, NvError::CapacityExceeded { max: 255, .. }), "{err}");
	assert_eq!(tree.children(root).len(), 255);
}

#[test]
fn fixed_arrays_have_no_count_and_cannot_grow() {
	let mut tree = Tree::new(ArraySpec::fixed(NumType::U16, 2));
	let root = tree.root();
	assert_eq!(tree.type_name(root), "array<u16be>[2]");
	tree.set(root, "1", "7").expect("index");
	assert_eq!(tree.to_bytes(root).expect("write"), [0, 0, 0, 7]);

	tree.set(root, "-1", "1").expect_err("no append on fixed arrays");
	let err = tree.append(root).expect_err("append api");
	assert!(matches!(err, NvError::TypeMismatch { expected: "list", .. }));
	tree.set(root, "2", "1").expect_err("index past the end");
}

#[test]
#[should_panic(expected = "nonzero")]
fn fixed_array_rejects_zero_count() {
	let _ = ArraySpec::fixed(NumType::U8, 0);
}

fn empty_name(tree: &Tree, id: NodeId) -> bool {
	tree.value(id).as_string().is_ok_and(|name| name.as_bytes().is_empty())
}

#[test]
fn is_end_only_shortens_pretty_output() {
	let mut tree = Tree::new(ArraySpec::fixed(StrLayout::fzstring(4), 3).until(empty_name));
	let root = tree.root();
	tree.read(root, &mut Cursor::new(b"ab\0\0\0\0\0\0cd\0\0")).expect("read");

	assert_eq!(tree.to_pretty(root), "[\n  0 = \"ab\"\n]");
	assert_eq!(tree.to_str(root), "[ab, \"\", cd]");
	assert_eq!(tree.children(root).len(), 3);
	assert_eq!(tree.to_bytes(root).expect("write").len(), 12);
}

#[test]
fn compact_list_text_replaces_contents() {
	let mut tree = u32_list();
	let root = tree.root();
	tree.parse(root, "[5, 6]").expect("two elements");
	tree.parse(root, "[7]").expect("one element");
	assert_eq!(tree.to_bytes(root).expect("write"), [0, 1, 0, 0, 0, 7]);

	tree.parse(root, "[8, x]").expect_err("bad element");
	assert_eq!(tree.to_str(root), "[7]");

	let mut fixed = Tree::new(ArraySpec::fixed(NumType::U8, 2));
	let root = fixed.root();
	fixed.parse(root, "[1]").expect("prefix");
	fixed.parse(root, "[1, 2, 3]").expect_err("too many");
	assert_eq!(fixed.to_str(root), "[1, 0]");
}
