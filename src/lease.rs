//! The lease record and its textual rendering.
//!
//! A [`Lease`] holds what dhcpd recorded about one `lease` or `host` block:
//!
//! ```text
//! lease 172.24.43.3 {
//!   starts 6 2019/04/27 03:24:45;
//!   ends 6 2019/04/27 03:34:45;
//!   tstp 6 2019/04/27 03:34:45;
//!   cltt 6 2019/04/27 03:24:45;
//!   binding state free;
//!   hardware ethernet 00:db:70:c3:11:d7;
//!   uid "\001\000\333p\303\021\327";
//! }
//! ```
//!
//! Every field is optional. The parser fills fields in as it recognizes
//! statements and never touches the record again once the block is done.
//!
//! The [`Display`](fmt::Display) impl writes a lease back out as a block. It
//! is a formatting convenience, not an inverse of the parser: weekday digits
//! are fixed and unset fields are written as empty or zero values.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hardware::Hardware;
use crate::timestamp::format_date_time;

/// Binding state of a lease currently held by a client.
pub const BINDING_STATE_ACTIVE: &str = "active";

/// One DHCP lease or host declaration from a leases file.
///
/// Serialized field names are the keys existing consumers of the JSON
/// output read, including the historical `cllt` and `vendor-nmae` spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Lease {
    /// Address from the `lease` header or a `fixed-address` statement.
    pub ip: Option<IpAddr>,

    /// Start of the lease.
    pub starts: Option<DateTime<Utc>>,

    /// When the lease expires.
    pub ends: Option<DateTime<Utc>>,

    /// Failover: the expiry time the peer has been told.
    pub tstp: Option<DateTime<Utc>>,

    /// Failover: the expiry time the peer has acknowledged.
    pub tsfp: Option<DateTime<Utc>>,

    /// Failover: the actual time sent from the partner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atsfp: Option<DateTime<Utc>>,

    /// Client's last transaction time.
    #[serde(rename = "cllt")]
    pub cltt: Option<DateTime<Utc>>,

    /// Current binding state. Without failover this is `active` or `free`;
    /// failover adds `backup` and transitional states, so any token is kept.
    pub binding_state: Option<String>,

    /// State the lease moves to when `ends` passes.
    pub next_binding_state: Option<String>,

    /// Failover: state to rewind to when partners lose contact.
    pub rewind_binding_state: Option<String>,

    /// The `hardware` statement.
    pub hardware: Hardware,

    /// Client identifier as written between the quotes, escapes untouched.
    pub uid: Option<String>,

    /// `client-hostname`, or the name of a `host` declaration.
    pub client_hostname: Option<String>,

    #[serde(rename = "vendor-class-identifier")]
    pub vendor_class_id: Option<String>,

    #[serde(rename = "vendor-nmae")]
    pub vendor_name: Option<String>,

    /// Relay agent circuit-id suboption, verbatim.
    #[serde(rename = "RelayCircuitId")]
    pub relay_circuit_id: Option<String>,

    /// Relay agent remote-id suboption, verbatim.
    #[serde(rename = "RelayRemoteId")]
    pub relay_remote_id: Option<String>,
}

impl Lease {
    /// Returns true if the lease has an `ends` time at or before `now`.
    ///
    /// A lease without `ends` (including `ends never;`) never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.ends.is_some_and(|ends| ends <= now)
    }

    /// Returns true if the lease is bound to a client and not yet expired.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.binding_state.as_deref() == Some(BINDING_STATE_ACTIVE) && !self.is_expired_at(now)
    }

    /// Renders the lease as a `lease <ip> { ... }` block.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

impl fmt::Display for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = self.ip.map(|ip| ip.to_string()).unwrap_or_default();

        writeln!(f)?;
        writeln!(f, "lease {} {{", ip)?;
        writeln!(f, "  starts 4 {};", format_date_time(self.starts.as_ref()))?;
        writeln!(f, "  ends 4 {};", format_date_time(self.ends.as_ref()))?;
        writeln!(f, "  tstp 5 {};", format_date_time(self.tstp.as_ref()))?;
        writeln!(f, "  tsfp 6 {};", format_date_time(self.tsfp.as_ref()))?;
        writeln!(f, "  cltt 4 {};", format_date_time(self.cltt.as_ref()))?;
        writeln!(
            f,
            "  binding state {};",
            self.binding_state.as_deref().unwrap_or_default()
        )?;
        writeln!(
            f,
            "  client-hostname \"{}\";",
            self.client_hostname.as_deref().unwrap_or_default()
        )?;
        writeln!(
            f,
            "  next binding state {};",
            self.next_binding_state.as_deref().unwrap_or_default()
        )?;
        writeln!(f, "  hardware ethernet {};", self.hardware.mac)?;
        writeln!(f, "  uid \"{}\";", self.uid.as_deref().unwrap_or_default())?;

        // atsfp is written as a second cltt line.
        if let Some(atsfp) = &self.atsfp {
            writeln!(f, "  cltt 4 {};", format_date_time(Some(atsfp)))?;
        }
        if let Some(state) = present(&self.rewind_binding_state) {
            writeln!(f, "  rewind binding state {};", state)?;
        }
        if let Some(vendor_class_id) = present(&self.vendor_class_id) {
            writeln!(f, "  set vendor-class-identifier = \"{}\";", vendor_class_id)?;
        }
        if let Some(vendor_name) = present(&self.vendor_name) {
            writeln!(f, "  set vendor-name = \"{}\";", vendor_name)?;
        }
        if let Some(circuit_id) = present(&self.relay_circuit_id) {
            writeln!(f, "  option agent.circuit-id {};", circuit_id)?;
        }
        if let Some(remote_id) = present(&self.relay_remote_id) {
            writeln!(f, "  option agent.remote-id {};", remote_id)?;
        }
        writeln!(f, "}}")
    }
}
