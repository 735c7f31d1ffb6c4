use crate::nv::text::{CompactEntry, parse_hex, parse_int, quote_if_needed, split_compact, to_hex};

#[test]
fn parses_decimal_and_hex_literals() {
	assert_eq!(parse_int("255"), Some(255));
	assert_eq!(parse_int("0xff"), Some(255));
	assert_eq!(parse_int("0XFF"), Some(255));
	assert_eq!(parse_int("-12"), Some(-12));
	assert_eq!(parse_int(""), None);
	assert_eq!(parse_int("0x"), None);
	assert_eq!(parse_int("12a"), None);
	assert_eq!(parse_int("+1"), None);
}

#[test]
fn hex_helpers_accept_separators() {
	assert_eq!(to_hex(&[0xde, 0xad, 0x01], ""), "dead01");
	assert_eq!(to_hex(&[0xde, 0xad], ":"), "de:ad");
	assert_eq!(parse_hex("de:ad:01"), Some(vec![0xde, 0xad, 0x01]));
	assert_eq!(parse_hex("0xDEAD"), Some(vec![0xde, 0xad]));
	assert_eq!(parse_hex("abc"), None);
	assert_eq!(parse_hex("zz"), None);
}

#[test]
fn quotes_only_structural_text() {
	assert_eq!(quote_if_needed("plain"), "plain");
	assert_eq!(quote_if_needed(""), "\"\"");
	assert_eq!(quote_if_needed("a,b"), "\"a,b\"");
	assert_eq!(quote_if_needed("say \"hi\""), "\"say \\\"hi\\\"\"");
	assert_eq!(quote_if_needed(" pad"), "\" pad\"");
}

#[test]
fn splits_named_entries_with_nesting_and_quotes() {
	let entries = split_compact("{a=1, b={x=2, y=[1, 2]}, c=\"q,}\"}", true).expect("valid compact text");
	assert_eq!(
		entries,
		vec![
			CompactEntry {
				name: Some("a".to_owned()),
				value: "1".to_owned(),
			},
			CompactEntry {
				name: Some("b".to_owned()),
				value: "{x=2, y=[1, 2]}".to_owned(),
			},
			CompactEntry {
				name: Some("c".to_owned()),
				value: "q,}".to_owned(),
			},
		]
	);
}

#[test]
fn splits_positional_entries() {
	let entries = split_compact("[1, 0x02,3]", false).expect("valid compact array");
	let values: Vec<&str> = entries.iter().map(|entry| entry.value.as_str()).collect();
	assert_eq!(values, ["1", "0x02", "3"]);
	assert!(split_compact("[]", false).expect("empty array").is_empty());
}

#[test]
fn rejects_malformed_compact_text() {
	assert!(split_compact("{a=1", true).is_none());
	assert!(split_compact("{=1}", true).is_none());
	assert!(split_compact("{a=1 b=2}", true).is_none());
	assert!(split_compact("{a={b=1}", true).is_none());
	assert!(split_compact("[1, 2}", false).is_none());
}
