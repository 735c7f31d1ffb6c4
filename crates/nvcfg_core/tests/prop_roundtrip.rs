//! Property-based tests for leaf codecs and record framing.

#![allow(missing_docs)]

use nvcfg::nv::{Cursor, Format, NumType, Overlay, ReadOptions, StrLayout, Tree, ValueType, registry};
use nvcfg_testkit::RecordBuilder;
use proptest::prelude::*;

fn round_trip(ty: impl Into<ValueType>, text: &str) -> (Vec<u8>, String) {
	let ty = ty.into();
	let mut tree = Tree::new(ty.clone());
	let root = tree.root();
	tree.parse(root, text).expect("parse");
	let bytes = tree.to_bytes(root).expect("write");

	let mut back = Tree::new(ty);
	back.read(root, &mut Cursor::new(&bytes)).expect("read");
	(bytes, back.to_str(root))
}

fn builtin_magic() -> impl Strategy<Value = [u8; 4]> {
	prop_oneof![Just(*b"MLog"), Just(*b"CDP."), Just(*b"WiFi"), Just(*b"FIRE"), Just(*b"BENV")]
}

#[test]
fn prop_u32_text_matches_big_endian_bytes() {
	proptest!(|(value in any::<u32>())| {
		let (bytes, text) = round_trip(NumType::U32, &value.to_string());
		prop_assert_eq!(bytes, value.to_be_bytes().to_vec());
		prop_assert_eq!(text, value.to_string());
	});
}

#[test]
fn prop_i16le_round_trips() {
	proptest!(|(value in any::<i16>())| {
		let (bytes, text) = round_trip(NumType::I16LE, &value.to_string());
		prop_assert_eq!(bytes, value.to_le_bytes().to_vec());
		prop_assert_eq!(text, value.to_string());
	});
}

#[test]
fn prop_prefixed_strings_round_trip() {
	proptest!(|(text in "[ -~]{0,40}")| {
		for layout in [StrLayout::p8string(), StrLayout::p8zstring(), StrLayout::p16istring(), StrLayout::zstring()] {
			let (_, back) = round_trip(layout, &text);
			prop_assert_eq!(&back, &text);
		}
		let fixed = &text[..text.len().min(15)];
		let (bytes, back) = round_trip(StrLayout::fzstring(16), fixed);
		prop_assert_eq!(bytes.len(), 16);
		prop_assert_eq!(back, fixed);
	});
}

#[test]
fn prop_bitmask_render_parses_back() {
	let overlay = Overlay::bitmask("flags", NumType::U16, &["A", "B", "", "D"]);
	proptest!(|(value in any::<u16>())| {
		let mut tree = Tree::new(overlay.clone());
		let root = tree.root();
		tree.set_num(root, i128::from(value)).expect("numeric leaf");
		let text = tree.to_str(root);

		let mut back = Tree::new(overlay.clone());
		back.parse(root, &text).expect("own rendering parses");
		prop_assert_eq!(back.to_bytes(root).expect("write"), value.to_be_bytes().to_vec());
	});
}

#[test]
fn prop_opaque_records_reencode_exactly() {
	proptest!(|(payload in proptest::collection::vec(any::<u8>(), 0..64))| {
		let bytes = RecordBuilder::new(b"ZZZZ").raw(&payload).build();
		let records = registry().read_all(&bytes, Format::Perm, None, &ReadOptions::lenient()).expect("generic record");
		prop_assert_eq!(records.len(), 1);
		prop_assert_eq!(records[0].to_bytes(records[0].root()).expect("write"), bytes);
	});
}

#[test]
fn prop_arbitrary_payloads_never_panic() {
	proptest!(|(magic in builtin_magic(), tail in proptest::collection::vec(any::<u8>(), 0..128))| {
		let bytes = RecordBuilder::new(&magic).raw(&tail).build();
		for format in Format::ALL {
			let _ = registry().read_all(&bytes, format, None, &ReadOptions::lenient());
			let _ = registry().read_all(&tail, format, None, &ReadOptions::default());
		}
	});
}
