//! Link-layer descriptors from `hardware` statements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Octet counts accepted for a link-layer address: EUI-48, EUI-64 and
/// 20-octet IP over InfiniBand.
const VALID_ADDRESS_LENGTHS: [usize; 3] = [6, 8, 20];

/// The `hardware <type> <address>;` statement of a lease.
///
/// The textual address is kept as written. The typed address is filled in
/// only when the text parses, so the two can disagree on malformed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hardware {
    /// Hardware type keyword, e.g. `ethernet` or `token-ring`.
    pub hardware: String,

    /// Address text exactly as it appeared in the file.
    pub mac: String,

    /// Parsed address, `None` if `mac` is not a valid link-layer address.
    #[serde(skip)]
    pub mac_addr: Option<MacAddr>,
}

impl Hardware {
    /// Builds a descriptor from a type keyword and address text, parsing the
    /// address on a best-effort basis.
    pub fn new(hardware: impl Into<String>, mac: impl Into<String>) -> Self {
        let mac = mac.into();
        let mac_addr = mac.parse().ok();
        Self {
            hardware: hardware.into(),
            mac,
            mac_addr,
        }
    }

    /// Returns true if no `hardware` statement was seen.
    pub fn is_empty(&self) -> bool {
        self.hardware.is_empty() && self.mac.is_empty()
    }
}

/// A parsed link-layer address of 6, 8 or 20 octets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacAddr(Vec<u8>);

impl MacAddr {
    /// Returns the raw octets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    /// Accepts `00:db:70:c3:11:d7`, `00-db-70-c3-11-d7` and the dotted
    /// `00db.70c3.11d7` form.
    fn from_str(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidMacAddress(text.to_string());

        let octets = if text.contains('.') {
            parse_dotted(text).ok_or_else(invalid)?
        } else {
            let separator = if text.contains('-') { '-' } else { ':' };
            text.split(separator)
                .map(parse_octet)
                .collect::<Option<Vec<u8>>>()
                .ok_or_else(invalid)?
        };

        if !VALID_ADDRESS_LENGTHS.contains(&octets.len()) {
            return Err(invalid());
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, byte) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// dhcpd writes octets without zero padding (`0:1b:...`), so one or two
/// hex digits are accepted.
fn parse_octet(part: &str) -> Option<u8> {
    if part.is_empty() || part.len() > 2 {
        return None;
    }
    u8::from_str_radix(part, 16).ok()
}

fn parse_dotted(text: &str) -> Option<Vec<u8>> {
    let mut octets = Vec::new();
    for group in text.split('.') {
        if group.len() != 4 {
            return None;
        }
        let value = u16::from_str_radix(group, 16).ok()?;
        octets.extend_from_slice(&value.to_be_bytes());
    }
    Some(octets)
}
