use crate::nv::bytes::Cursor;
use crate::nv::{NumType, NvError, Overlay, OverlayValue};

#[test]
fn enum_parses_names_and_accepts_unknown_numbers() {
	let overlay = Overlay::enumeration("security", NumType::U8, &["disabled", "wep", "wpa", "wpa2"]);
	let mut value = OverlayValue::new(overlay);

	value.parse("wpa").expect("known name");
	assert_eq!(value.num(), 2);
	assert_eq!(value.render(false), "wpa");
	assert_eq!(value.render(true), "wpa [security]");

	value.parse("9").expect("unknown numbers are accepted");
	assert_eq!(value.render(false), "security(9)");
	value.parse("security(0x0a)").expect("own unnamed form");
	assert_eq!(value.num(), 10);
	value.parse("mode(3)").expect_err("another overlay's name");

	let err = value.parse("wpa3").expect_err("neither a name nor a number");
	assert!(matches!(err, NvError::InvalidText { .. }));
	assert_eq!(value.num(), 10);

	value.parse("300").expect_err("not representable in u8");
}

#[test]
fn sparse_enum_uses_raw_values() {
	let overlay = Overlay::enum_map("mode", NumType::U16, &[(0x10, "bridge"), (0x20, "router")]);
	let mut value = OverlayValue::new(overlay);
	value.read(&mut Cursor::new(&[0x00, 0x20])).expect("read");
	assert_eq!(value.render(false), "router");
	value.parse("bridge").expect("name");
	let mut out = Vec::new();
	value.write(&mut out).expect("write");
	assert_eq!(out, [0x00, 0x10]);
}

#[test]
fn bitmask_deltas_accumulate() {
	let overlay = Overlay::bitmask("flags", NumType::U8, &["A", "B"]);
	let mut value = OverlayValue::new(overlay);

	value.parse("+A").expect("set A");
	assert_eq!(value.num(), 0x01);
	value.parse("+B").expect("set B");
	assert_eq!(value.num(), 0x03);
	assert_eq!(value.render(false), "A|B");
	assert_eq!(value.render(true), "A | B [flags]");
	value.parse("-A").expect("clear A");
	assert_eq!(value.num(), 0x02);

	value.parse("0x05").expect("replace with a number");
	assert_eq!(value.render(false), "A|0x04");
	value.parse("+").expect_err("empty flag");
}

#[test]
fn bitmask_zero_renders_as_hex() {
	let overlay = Overlay::bitmask("flags", NumType::U16, &["A"]);
	let value = OverlayValue::new(overlay);
	assert_eq!(value.render(false), "0x0000");
}

#[test]
fn sparse_bitmask_names_flag_values() {
	let overlay = Overlay::bitmask_map("opts", NumType::U32, &[(0x100, "nat"), (0x1, "upnp")]);
	let mut value = OverlayValue::new(overlay);
	value.parse("nat").expect("name");
	value.parse("+upnp").expect("delta");
	assert_eq!(value.num(), 0x101);
	assert_eq!(value.render(false), "upnp|nat");
}

#[test]
fn describe_lists_named_entries() {
	let overlay = Overlay::bitmask("flags", NumType::U8, &["A", "", "C"]);
	assert_eq!(overlay.describe(), "flags {\n  0x01 = A\n  0x04 = C\n}");
	let unnamed = Overlay::enumeration("", NumType::U8, &[]);
	assert_eq!(unnamed.describe(), "enum");
}

#[test]
#[should_panic(expected = "exceeds maximum")]
fn rejects_oversized_bit_table() {
	let names = ["x"; 9];
	let _ = Overlay::bitmask("wide", NumType::U8, &names);
}

#[test]
fn rendered_flag_combinations_parse_back() {
	let overlay = Overlay::bitmask("flags", NumType::U16, &["A", "B", "", "D"]);
	let mut value = OverlayValue::new(overlay.clone());
	value.parse("A|D|0x0100").expect("names and raw bit");
	assert_eq!(value.num(), 0x109);

	let mut back = OverlayValue::new(overlay);
	back.parse(&value.render(false)).expect("compact text");
	assert_eq!(back.num(), value.num());
	back.parse("A|nope").expect_err("unknown flag");
	assert_eq!(back.num(), 0x109);
}
