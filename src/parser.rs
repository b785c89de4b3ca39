//! Reads a whole leases file into [`Lease`] records.

use std::io::{BufReader, Read};

use tracing::debug;

use crate::decoder::{DecoderRegistry, registry};
use crate::error::Result;
use crate::lease::Lease;
use crate::tokenizer::Blocks;

/// Parses every `lease` and `host` block of a dhcpd.leases stream.
///
/// Records come back in file order. Blocks for the same address are not
/// merged. Unknown statements and blocks are skipped, malformed values leave
/// individual fields unset, and a truncated final block is dropped.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if reading the stream fails, or
/// [`Error::InvalidPattern`](crate::Error::InvalidPattern) if the standard
/// registry could not be built.
///
/// # Example
///
/// ```
/// let file = b"lease 10.0.0.7 {\n  binding state active;\n}\n";
/// let leases = dhcpd_leases::parse(&file[..])?;
/// assert_eq!(leases[0].binding_state.as_deref(), Some("active"));
/// # Ok::<(), dhcpd_leases::Error>(())
/// ```
pub fn parse<R: Read>(reader: R) -> Result<Vec<Lease>> {
    parse_with(reader, registry()?)
}

/// Like [`parse`], with an explicit decoder registry.
pub fn parse_with<R: Read>(reader: R, registry: &DecoderRegistry) -> Result<Vec<Lease>> {
    let mut leases = Vec::new();
    for block in Blocks::new(BufReader::new(reader)) {
        let block = block?;
        leases.push(registry.decode_block(&block.text()));
    }
    debug!(count = leases.len(), "parsed leases");
    Ok(leases)
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use chrono::{TimeZone, Utc};

    use super::*;

    const ISC_LEASES: &str = r#"# The format of this file is documented in the dhcpd.leases(5) manual page.
# This lease file was written by isc-dhcp-4.3.6-P1

# authoring-byte-order entry is generated, DO NOT DELETE
authoring-byte-order little-endian;

lease 172.24.43.3 {
	starts 6 2019/04/27 03:24:45;
	ends 6 2019/04/27 03:34:45;
	tstp 6 2019/04/27 03:34:45;
	tsfp 6 2019/04/27 03:34:45;
	cltt 6 2019/04/27 03:24:45;
	atsfp 6 2019/04/27 03:34:45;
	client-hostname "gertrude";
	binding state active;
	next binding state free;
	hardware ethernet 01:34:56:67:89:9a;
	uid "\001\000\333p\303\021\327";
}
lease 172.24.43.4 {

"#;

    const ISC_HOSTS: &str = r#"# The format of this file is documented in the dhcpd.leases(5) manual page.
# This lease file was written by isc-dhcp-4.2.5

host test1.example.com {
  dynamic;
  hardware ethernet 4b:54:ef:7d:c3:0d;
  fixed-address 10.113.10.24;
        supersede server.filename = "pxelinux.0";
        supersede host-name = "test1.example.com";
}
host test2.example.com {
  dynamic;
  hardware ethernet c5:ea:cf:1e:2f:c9;
  fixed-address 10.113.10.9;
        supersede server.filename = "pxelinux.0";
        supersede host-name = "test2.example.com";
}
	"#;

    fn ip(text: &str) -> Option<IpAddr> {
        Some(text.parse().unwrap())
    }

    #[test]
    fn test_parse_lease_file() {
        let leases = parse(ISC_LEASES.as_bytes()).unwrap();
        assert_eq!(leases.len(), 1);

        let lease = &leases[0];
        assert_eq!(lease.ip, ip("172.24.43.3"));
        assert_eq!(
            lease.starts,
            Some(Utc.with_ymd_and_hms(2019, 4, 27, 3, 24, 45).unwrap())
        );
        assert_eq!(
            lease.atsfp,
            Some(Utc.with_ymd_and_hms(2019, 4, 27, 3, 34, 45).unwrap())
        );
        assert_eq!(lease.client_hostname.as_deref(), Some("gertrude"));
        assert_eq!(lease.binding_state.as_deref(), Some("active"));
        assert_eq!(lease.next_binding_state.as_deref(), Some("free"));
        assert_eq!(lease.rewind_binding_state, None);
        assert_eq!(lease.hardware.mac, "01:34:56:67:89:9a");
        assert_eq!(lease.uid.as_deref(), Some(r"\001\000\333p\303\021\327"));
    }

    #[test]
    fn test_parse_host_file() {
        let leases = parse(ISC_HOSTS.as_bytes()).unwrap();
        assert_eq!(leases.len(), 2);
        assert_eq!(leases[0].client_hostname.as_deref(), Some("test1.example.com"));
        assert_eq!(leases[0].ip, ip("10.113.10.24"));
        assert_eq!(leases[1].client_hostname.as_deref(), Some("test2.example.com"));
        assert_eq!(leases[1].ip, ip("10.113.10.9"));
        assert_eq!(leases[1].hardware.hardware, "ethernet");
    }

    #[test]
    fn test_single_line_block() {
        let leases = parse(
            r#"lease 172.24.43.3 { starts 6 2019/04/27 03:24:45; ends 6 2019/04/27 03:34:45; binding state free; hardware ethernet 00:db:70:c3:11:d7; uid "\001\000\333p\303\021\327"; }"#
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(leases.len(), 1);

        let lease = &leases[0];
        assert_eq!(lease.ip, ip("172.24.43.3"));
        assert_eq!(
            lease.starts,
            Some(Utc.with_ymd_and_hms(2019, 4, 27, 3, 24, 45).unwrap())
        );
        assert_eq!(
            lease.ends,
            Some(Utc.with_ymd_and_hms(2019, 4, 27, 3, 34, 45).unwrap())
        );
        assert_eq!(lease.binding_state.as_deref(), Some("free"));
        assert_eq!(lease.hardware.mac, "00:db:70:c3:11:d7");
        assert_eq!(lease.uid.as_deref(), Some(r"\001\000\333p\303\021\327"));
    }

    #[test]
    fn test_duplicate_addresses_are_kept_in_order() {
        let leases = parse(
            "lease 10.0.0.1 {\n  binding state free;\n}\nlease 10.0.0.1 {\n  binding state active;\n}\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(leases.len(), 2);
        assert_eq!(leases[0].binding_state.as_deref(), Some("free"));
        assert_eq!(leases[1].binding_state.as_deref(), Some("active"));
    }

    #[test]
    fn test_no_blocks_is_empty_not_error() {
        let leases = parse(
            "# comment\nauthoring-byte-order little-endian;\nserver-duid \"\\000\\001\";\n"
                .as_bytes(),
        )
        .unwrap();
        assert!(leases.is_empty());
        assert!(parse(&b""[..]).unwrap().is_empty());
    }

    #[test]
    fn test_block_without_identity_is_still_emitted() {
        let leases = parse("lease garbage {\n  binding state free;\n}\n".as_bytes()).unwrap();
        assert_eq!(leases.len(), 1);
        assert!(leases[0].ip.is_none());
        assert!(leases[0].client_hostname.is_none());
        assert_eq!(leases[0].binding_state.as_deref(), Some("free"));
    }

    #[test]
    fn test_epoch_time_format() {
        let leases = parse(
            "lease 10.0.0.1 {\n  starts epoch 1556335485; # Sat Apr 27 03:24:45 2019\n}\n"
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(
            leases[0].starts,
            Some(Utc.with_ymd_and_hms(2019, 4, 27, 3, 24, 45).unwrap())
        );
    }

    #[test]
    fn test_parse_with_explicit_registry() {
        let registry = DecoderRegistry::standard().unwrap();
        let leases = parse_with(ISC_HOSTS.as_bytes(), &registry).unwrap();
        assert_eq!(leases.len(), 2);
    }

    #[test]
    fn test_non_utf8_bytes_do_not_fail() {
        let mut input = b"lease 10.0.0.1 {\n  client-hostname \"".to_vec();
        input.extend_from_slice(&[0xff, 0xfe]);
        input.extend_from_slice(b"\";\n  binding state free;\n}\n");
        let leases = parse(&input[..]).unwrap();
        assert_eq!(leases.len(), 1);
        assert_eq!(leases[0].binding_state.as_deref(), Some("free"));
    }
}
