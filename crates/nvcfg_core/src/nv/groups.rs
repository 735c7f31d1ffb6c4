//! Built-in record layouts.

use std::sync::Arc;

use crate::nv::{
	ArraySpec, Field, Format, GroupLayout, Magic, NodeId, NumType, Overlay, Profile, StrLayout, StructDef, Tree, ValueType, Version,
};

/// Every built-in layout, in registration order.
pub fn builtin_layouts() -> Vec<Arc<dyn GroupLayout>> {
	vec![
		Arc::new(HttpLayout),
		Arc::new(DhcpLayout::new()),
		Arc::new(WifiLayout::new()),
		Arc::new(FirewallLayout::new()),
		Arc::new(BoltEnvLayout::new()),
	]
}

const V0_2: Version = Version::new(0, 2);
const V0_3: Version = Version::new(0, 3);

/// Web interface credentials (`MLog`).
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpLayout;

impl GroupLayout for HttpLayout {
	fn magic(&self) -> Magic {
		Magic(*b"MLog")
	}

	fn name(&self) -> &str {
		"http"
	}

	fn definition(&self, _format: Format, version: Version, _profile: Option<&dyn Profile>) -> Vec<Field> {
		let mut fields = vec![
			Field::new("user_name", StrLayout::p16string()),
			Field::new("user_password", StrLayout::p16string()),
			Field::new("admin_name", StrLayout::p16string()),
			Field::new("admin_password", StrLayout::p16string()),
		];
		if version >= V0_2 {
			fields.push(Field::new("telnet_enabled", ValueType::boolean()));
		}
		if version >= V0_3 {
			fields.push(Field::new("session_timeout", NumType::U16.with_max(3600)));
		}
		fields
	}
}

/// LAN DHCP server (`CDP.`); dynamic areas hold the lease table instead of the pool setup.
#[derive(Debug, Clone)]
pub struct DhcpLayout {
	reservation: Arc<StructDef>,
	lease: Arc<StructDef>,
}

impl DhcpLayout {
	/// Build the layout.
	pub fn new() -> Self {
		let reservation = StructDef::new("reservation", vec![Field::new("mac", ValueType::mac()), Field::new("ip", ValueType::ip4())]);
		let lease = StructDef::new(
			"lease",
			vec![
				Field::new("mac", ValueType::mac()),
				Field::new("ip", ValueType::ip4()),
				Field::new("expires", NumType::U32),
				Field::new("host_name", StrLayout::p8string()),
			],
		);
		Self {
			reservation: Arc::new(reservation),
			lease: Arc::new(lease),
		}
	}
}

impl Default for DhcpLayout {
	fn default() -> Self {
		Self::new()
	}
}

impl GroupLayout for DhcpLayout {
	fn magic(&self) -> Magic {
		Magic(*b"CDP.")
	}

	fn name(&self) -> &str {
		"dhcp"
	}

	fn definition(&self, format: Format, version: Version, _profile: Option<&dyn Profile>) -> Vec<Field> {
		if format.is_dynamic() {
			return vec![Field::new("leases", ArraySpec::p16list(self.lease.clone()))];
		}

		let mut fields = vec![
			Field::new("lan_ip", ValueType::ip4()),
			Field::new("subnet_mask", ValueType::ip4()),
			Field::new("pool_start", ValueType::ip4()),
			Field::new("pool_end", ValueType::ip4()),
			Field::new("lease_time", NumType::U32),
		];
		if version >= V0_2 {
			fields.push(Field::new("domain", StrLayout::p8string()));
		}
		fields.push(Field::new("reservations", ArraySpec::p8list(self.reservation.clone())));
		fields
	}
}

/// Primary wireless network (`WiFi`).
#[derive(Debug, Clone)]
pub struct WifiLayout {
	band: Arc<Overlay>,
	security: Arc<Overlay>,
	flags: Arc<Overlay>,
}

impl WifiLayout {
	/// Build the layout.
	pub fn new() -> Self {
		Self {
			band: Overlay::enum_map("band", NumType::U8, &[(2, "2.4ghz"), (5, "5ghz")]),
			security: Overlay::enumeration("security", NumType::U8, &["open", "wep", "wpa", "wpa2", "wpa_wpa2"]),
			flags: Overlay::bitmask("wifi_flags", NumType::U16, &["hidden", "wmm", "wps", "isolate", "", "", "", "", "radio_off"]),
		}
	}
}

impl Default for WifiLayout {
	fn default() -> Self {
		Self::new()
	}
}

fn empty_ssid(tree: &Tree, id: NodeId) -> bool {
	tree.value(id).as_string().is_ok_and(|ssid| ssid.as_bytes().is_empty())
}

impl GroupLayout for WifiLayout {
	fn magic(&self) -> Magic {
		Magic(*b"WiFi")
	}

	fn name(&self) -> &str {
		"wifi"
	}

	fn definition(&self, format: Format, version: Version, _profile: Option<&dyn Profile>) -> Vec<Field> {
		let gateway = matches!(format, Format::Gws | Format::GwsDyn);
		let mut fields = vec![
			Field::new("ssid", StrLayout::fzstring(33)),
			Field::new("channel", NumType::U8.with_range(0, 165)),
			Field::new("band", self.band.clone()),
			Field::new("security", self.security.clone()),
			Field::new("passphrase", StrLayout::p8zstring()),
			Field::new("flags", self.flags.clone()),
			Field::new("guest_ssids", ArraySpec::fixed(StrLayout::fzstring(33), 3).until(empty_ssid)),
			Field::new("wps_pin", StrLayout::fstring(8)).disabled_if(!gateway),
		];
		if version >= V0_2 {
			fields.push(Field::new("country", StrLayout::fstring(3)));
			fields.push(Field::new("tx_power", NumType::U8.with_range(0, 100)));
		}
		fields
	}
}

/// Firewall features and packet filters (`FIRE`).
#[derive(Debug, Clone)]
pub struct FirewallLayout {
	features: Arc<Overlay>,
	filter: Arc<StructDef>,
	log_level: Arc<Overlay>,
}

impl FirewallLayout {
	/// Build the layout.
	pub fn new() -> Self {
		let features = Overlay::bitmask_map(
			"fw_features",
			NumType::U32,
			&[
				(0x0001, "enabled"),
				(0x0002, "block_ping"),
				(0x0004, "block_ident"),
				(0x0010, "ipsec_passthrough"),
				(0x0020, "pptp_passthrough"),
				(0x0100, "block_multicast"),
			],
		);
		let proto = Overlay::enumeration("proto", NumType::U8, &["any", "tcp", "udp", "icmp"]);
		let action = Overlay::enumeration("action", NumType::U8, &["drop", "accept", "reject"]);
		let filter = StructDef::new(
			"filter",
			vec![
				Field::new("enabled", ValueType::boolean()),
				Field::new("proto", proto),
				Field::new("src", ValueType::ip4()),
				Field::new("src_mask", ValueType::ip4()),
				Field::new("port_start", NumType::U16),
				Field::new("port_end", NumType::U16),
				Field::new("action", action),
			],
		);
		Self {
			features,
			filter: Arc::new(filter),
			log_level: Overlay::enumeration("log_level", NumType::U8, &["off", "error", "warn", "info", "debug"]),
		}
	}
}

impl Default for FirewallLayout {
	fn default() -> Self {
		Self::new()
	}
}

impl GroupLayout for FirewallLayout {
	fn magic(&self) -> Magic {
		Magic(*b"FIRE")
	}

	fn name(&self) -> &str {
		"firewall"
	}

	fn definition(&self, _format: Format, version: Version, _profile: Option<&dyn Profile>) -> Vec<Field> {
		let mut fields = vec![
			Field::new("features", self.features.clone()),
			Field::new("filters", ArraySpec::p8list(self.filter.clone())),
		];
		if version >= V0_2 {
			fields.push(Field::new("log_level", self.log_level.clone()));
		}
		fields
	}
}

/// Bootloader environment variables (`BENV`); headers never carry a version.
#[derive(Debug, Clone)]
pub struct BoltEnvLayout {
	var: Arc<StructDef>,
}

impl BoltEnvLayout {
	/// Build the layout.
	pub fn new() -> Self {
		let var = StructDef::new("bolt_var", vec![Field::new("name", StrLayout::p8zstring()), Field::new("value", StrLayout::p8zstring())]);
		Self { var: Arc::new(var) }
	}
}

impl Default for BoltEnvLayout {
	fn default() -> Self {
		Self::new()
	}
}

impl GroupLayout for BoltEnvLayout {
	fn magic(&self) -> Magic {
		Magic(*b"BENV")
	}

	fn name(&self) -> &str {
		"bolt"
	}

	fn is_versioned(&self) -> bool {
		false
	}

	fn definition(&self, _format: Format, _version: Version, _profile: Option<&dyn Profile>) -> Vec<Field> {
		vec![
			Field::new("flags", NumType::U32.hex()),
			Field::new("vars", ArraySpec::p16list(self.var.clone())),
		]
	}
}
