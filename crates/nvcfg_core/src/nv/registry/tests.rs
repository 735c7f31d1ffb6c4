use std::sync::Arc;

use crate::nv::bytes::Cursor;
use crate::nv::{Format, GenericLayout, GroupRegistry, HttpLayout, Magic, NvError, ReadOptions, Version, registry};

#[test]
fn builtin_registry_knows_every_layout() {
	let registry = registry();
	let magics: Vec<String> = registry.magics().map(|magic| magic.to_string()).collect();
	assert_eq!(magics, ["BENV", "CDP.", "FIRE", "MLog", "WiFi"]);
	assert!(std::ptr::eq(registry, crate::nv::registry()));
	assert_eq!(registry.len(), 5);
}

#[test]
#[should_panic(expected = "already registered")]
fn duplicate_magic_panics() {
	let mut registry = GroupRegistry::new();
	registry.register(Arc::new(HttpLayout));
	registry.register(Arc::new(GenericLayout::new(Magic(*b"MLog"))));
}

#[test]
fn unregistered_magic_consumes_nothing() {
	let bytes = b"ZZZZ\x00\x08\x00\x01";
	let mut cursor = Cursor::new(bytes);
	let err = registry().read(&mut cursor, Format::Perm, None, &ReadOptions::default()).expect_err("unknown magic");
	assert!(matches!(err, NvError::UnrecognizedRecord { magic } if magic == Magic(*b"ZZZZ")), "{err}");
	assert_eq!(cursor.pos(), 0);
}

#[test]
fn generic_fallback_keeps_payload_opaque() {
	let bytes = b"ZZZZ\x00\x0b\x00\x01\x01\x02\x03";
	let mut cursor = Cursor::new(bytes);
	let tree = registry().read(&mut cursor, Format::Perm, None, &ReadOptions::lenient()).expect("generic record");
	let root = tree.root();

	assert_eq!(tree.type_name(root), "group[ZZZZ]");
	assert_eq!(tree.node(root).name(), "grp_ZZZZ");
	assert_eq!(tree.to_str(root), "{_extra=010203}");
	assert_eq!(tree.to_bytes(root).expect("write"), bytes);
}

#[test]
fn read_all_decodes_consecutive_records() {
	let mut bytes = Vec::new();
	bytes.extend_from_slice(b"MLog\x00\x12\x00\x01\x00\x01u\x00\x01p\x00\x00\x00\x00");
	bytes.extend_from_slice(b"ZZZZ\x00\x09\x00\x01\xff");

	let records = registry().read_all(&bytes, Format::Perm, None, &ReadOptions::lenient()).expect("two records");
	assert_eq!(records.len(), 2);
	assert_eq!(records[0].to_str(records[0].root()), "{user_name=u, user_password=p, admin_name=\"\", admin_password=\"\"}");
	assert_eq!(records[1].to_str(records[1].root()), "{_extra=ff}");

	let mut out = Vec::new();
	for record in &records {
		record.write(record.root(), &mut out).expect("write");
	}
	assert_eq!(out, bytes);

	let err = registry().read_all(&bytes, Format::Perm, None, &ReadOptions::default()).expect_err("strict registry");
	assert!(matches!(err, NvError::UnrecognizedRecord { .. }));
}

#[test]
fn create_builds_parts_for_header() {
	let mut tree = registry().create(Magic(*b"MLog"), Format::Perm, Version::new(0, 2)).expect("known magic");
	let root = tree.root();
	assert_eq!(tree.children(root).len(), 5);
	assert!(!tree.is_set(root));

	tree.set(root, "user_name", "admin").expect("user");
	tree.set(root, "telnet_enabled", "yes").expect("flag");
	let bytes = tree.to_bytes(root).expect("write");

	let back = registry().read(&mut Cursor::new(&bytes), Format::Perm, None, &ReadOptions::default()).expect("read back");
	assert_eq!(back.to_str(root), tree.to_str(root));
	assert_eq!(back.to_str(root), "{user_name=admin, user_password=\"\", admin_name=\"\", admin_password=\"\", telnet_enabled=yes}");

	registry().create(Magic(*b"NOPE"), Format::Perm, Version::default()).expect_err("unknown magic");
}
