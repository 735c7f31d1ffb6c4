use crate::nv::bytes::Cursor;
use crate::nv::{NvError, StrLayout, StrValue};

fn read(layout: StrLayout, bytes: &[u8]) -> (StrValue, usize) {
	let mut value = StrValue::new(layout);
	let mut cursor = Cursor::new(bytes);
	value.read(&mut cursor).expect("string reads");
	(value, cursor.pos())
}

fn written(value: &StrValue) -> Vec<u8> {
	let mut out = Vec::new();
	value.write(&mut out).expect("string writes");
	out
}

#[test]
fn type_names_follow_layout() {
	assert_eq!(StrLayout::fstring(6).type_name(), "fstring[6]");
	assert_eq!(StrLayout::fzstring(33).type_name(), "fzstring[33]");
	assert_eq!(StrLayout::zstring().type_name(), "zstring");
	assert_eq!(StrLayout::p8istring().type_name(), "p8istring");
	assert_eq!(StrLayout::p16zstring().type_name(), "p16zstring");
	assert_eq!(StrLayout::p16data().type_name(), "p16data");
}

#[test]
fn fixed_width_string_pads_and_strips() {
	let (value, consumed) = read(StrLayout::fstring(6), b"foo\0\0\0tail");
	assert_eq!(consumed, 6);
	assert_eq!(value.as_str(), "foo");
	assert_eq!(written(&value), b"foo\0\0\0");

	let (full, _) = read(StrLayout::fstring(3), b"foo");
	assert_eq!(full.as_str(), "foo");
	assert_eq!(written(&full), b"foo");
}

#[test]
fn mandatory_nul_limits_fixed_width() {
	let mut value = StrValue::new(StrLayout::fzstring(4));
	value.parse("abc").expect("three bytes fit");
	value.parse("abcd").expect_err("no room for NUL");
	assert_eq!(value.as_str(), "abc");

	let mut missing = StrValue::new(StrLayout::fzstring(4));
	let err = missing.read(&mut Cursor::new(b"abcd")).expect_err("no terminator in width");
	assert!(matches!(err, NvError::Malformed { .. }));

	value.set_str("toolong");
	let err = value.write(&mut Vec::new()).expect_err("oversized write");
	assert!(matches!(err, NvError::ValueTooLarge { .. }));
}

#[test]
fn prefixed_optional_nul_preserves_terminator_choice() {
	let (with_nul, _) = read(StrLayout::p8string(), &[4, b'f', b'o', b'o', 0]);
	assert_eq!(with_nul.as_str(), "foo");
	assert_eq!(written(&with_nul), [4, b'f', b'o', b'o', 0]);

	let (without, _) = read(StrLayout::p8string(), &[3, b'f', b'o', b'o']);
	assert_eq!(without.as_str(), "foo");
	assert_eq!(written(&without), [3, b'f', b'o', b'o']);
}

#[test]
fn kept_terminator_counts_against_the_prefix() {
	let (mut value, _) = read(StrLayout::p8string(), &[2, b'a', 0]);
	let longest = "x".repeat(254);
	value.parse(&longest).expect("254 bytes plus NUL fit a u8 prefix");
	let out = written(&value);
	assert_eq!(out.len(), 256);
	assert_eq!((out[0], out[255]), (255, 0));
	let (back, _) = read(StrLayout::p8string(), &out);
	assert_eq!(back.as_bytes().len(), 254);

	let err = value.parse(&"x".repeat(255)).expect_err("no room for the NUL");
	assert!(matches!(err, NvError::InvalidText { .. }), "{err}");
	value.set_str(&"x".repeat(255));
	let err = value.write(&mut Vec::new()).expect_err("prefix overflow");
	assert!(matches!(err, NvError::ValueTooLarge { .. }), "{err}");

	let mut bare = StrValue::new(StrLayout::p8string());
	bare.parse(&"x".repeat(255)).expect("no terminator to keep");
	assert_eq!(written(&bare)[0], 255);
}

#[test]
fn prefix_can_count_itself() {
	let (value, consumed) = read(StrLayout::p16istring(), &[0, 5, b'f', b'o', b'o']);
	assert_eq!(consumed, 5);
	assert_eq!(value.as_str(), "foo");
	assert_eq!(written(&value), [0, 5, b'f', b'o', b'o']);

	let mut bad = StrValue::new(StrLayout::p8istring());
	let err = bad.read(&mut Cursor::new(&[0])).expect_err("length below prefix width");
	assert!(matches!(err, NvError::Malformed { .. }));
}

#[test]
fn prefixed_mandatory_nul_is_checked() {
	let (value, _) = read(StrLayout::p16zstring(), &[0, 4, b'f', b'o', b'o', 0]);
	assert_eq!(value.as_str(), "foo");
	assert_eq!(value.bytes(), 6);

	let mut bad = StrValue::new(StrLayout::p16zstring());
	bad.read(&mut Cursor::new(&[0, 3, b'f', b'o', b'o'])).expect_err("last byte is not NUL");
}

#[test]
fn zstring_reads_to_terminator() {
	let (value, consumed) = read(StrLayout::zstring(), b"hello\0world");
	assert_eq!(consumed, 6);
	assert_eq!(value.as_str(), "hello");
	assert_eq!(written(&value), b"hello\0");
	assert_eq!(StrValue::new(StrLayout::zstring()).bytes(), 1);
}

#[test]
fn data_layout_is_opaque_hex() {
	let (value, _) = read(StrLayout::p8data(), &[3, 0, 0xff, 0]);
	assert_eq!(value.as_bytes(), [0, 0xff, 0]);
	assert_eq!(value.render(false), "00ff00");
	assert_eq!(value.render(true), "00:ff:00");

	let mut parsed = StrValue::new(StrLayout::p8data());
	parsed.parse("0102").expect("hex payload");
	assert_eq!(written(&parsed), [2, 1, 2]);
	parsed.parse("xyz").expect_err("not hex");
}

#[test]
fn pretty_text_is_quoted() {
	let mut value = StrValue::new(StrLayout::p16string());
	value.parse("say \"hi\"").expect("parse");
	assert_eq!(value.render(false), "say \"hi\"");
	assert_eq!(value.render(true), "\"say \\\"hi\\\"\"");
}

#[test]
fn short_payload_is_short_read() {
	let mut value = StrValue::new(StrLayout::p8string());
	let err = value.read(&mut Cursor::new(&[5, b'a'])).expect_err("payload truncated");
	assert!(err.is_short_read());
}
