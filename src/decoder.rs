//! Statement decoders for the body of a lease block.
//!
//! The [`DecoderRegistry`] is an ordered list of [`Rule`]s. Each rule pairs
//! an anchored pattern with the [`Field`] it fills and an extractor that
//! writes the captured value into a [`Lease`]. Every rule is tried against
//! every statement and each match fires; statements no rule recognizes
//! (`dynamic;`, `supersede ...;`, comments) are skipped.
//!
//! All patterns require the keyword to be the first token of the statement.
//! Without that, `binding state` would also match `next binding state` and
//! `rewind binding state`.
//!
//! The standard registry is built once and shared: see [`registry`].

use std::net::IpAddr;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::trace;

use crate::error::{Error, Result};
use crate::hardware::Hardware;
use crate::lease::Lease;
use crate::timestamp;

static STANDARD: LazyLock<Result<DecoderRegistry>> = LazyLock::new(DecoderRegistry::standard);

/// Returns the process-wide standard registry, built on first use.
///
/// # Errors
///
/// Returns [`Error::InvalidPattern`] if a standard pattern fails to compile.
pub fn registry() -> Result<&'static DecoderRegistry> {
    STANDARD.as_ref().map_err(|error| match error {
        Error::InvalidPattern(message) => Error::InvalidPattern(message.clone()),
        other => Error::InvalidPattern(other.to_string()),
    })
}

/// The lease field a [`Rule`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ip,
    ClientHostname,
    Starts,
    Ends,
    Tstp,
    Tsfp,
    Atsfp,
    Cltt,
    Uid,
    BindingState,
    NextBindingState,
    RewindBindingState,
    Hardware,
    VendorClassId,
    VendorName,
    RelayCircuitId,
    RelayRemoteId,
}

/// Writes a captured value into a lease.
pub type Extractor = fn(&mut Lease, &str);

/// One statement decoder.
#[derive(Debug)]
pub struct Rule {
    field: Field,
    pattern: Regex,
    extract: Extractor,
}

impl Rule {
    /// Builds a rule. The extractor receives the first capture group that
    /// participated in the match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if `pattern` is not a valid regular
    /// expression.
    pub fn new(field: Field, pattern: &str, extract: Extractor) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|error| Error::InvalidPattern(format!("{:?}: {}", pattern, error)))?;
        Ok(Self {
            field,
            pattern,
            extract,
        })
    }

    pub fn field(&self) -> Field {
        self.field
    }

    fn capture<'a>(&self, statement: &'a str) -> Option<&'a str> {
        let captures = self.pattern.captures(statement)?;
        captures
            .iter()
            .skip(1)
            .flatten()
            .next()
            .map(|capture| capture.as_str())
    }
}

/// Ordered, immutable set of statement decoders.
///
/// Decoding only mutates the [`Lease`] passed in, so one registry can be
/// shared by any number of concurrent parses.
#[derive(Debug)]
pub struct DecoderRegistry {
    rules: Vec<Rule>,
}

impl DecoderRegistry {
    /// Builds a registry from an explicit rule list, evaluated in order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The decoders for every field of [`Lease`].
    pub fn standard() -> Result<Self> {
        Ok(Self::new(vec![
            Rule::new(Field::Ip, r"^\s*lease\s+([0-9A-Fa-f:.]+)\s*\{", set_ip)?,
            Rule::new(
                Field::ClientHostname,
                r#"^\s*host\s+(?:"([^"]*)"|([^\s{]+))\s*\{"#,
                |lease, value| lease.client_hostname = Some(value.to_string()),
            )?,
            Rule::new(Field::Ip, r"^\s*fixed-address\s+([^;]+?)\s*;", set_fixed_address)?,
            Rule::new(Field::Cltt, r"^\s*cltt\s+(.+?)\s*;", |lease, value| {
                lease.cltt = timestamp::decode(value)
            })?,
            Rule::new(Field::Starts, r"^\s*starts\s+(.+?)\s*;", |lease, value| {
                lease.starts = timestamp::decode(value)
            })?,
            Rule::new(Field::Ends, r"^\s*ends\s+(.+?)\s*;", |lease, value| {
                lease.ends = timestamp::decode(value)
            })?,
            Rule::new(Field::Tsfp, r"^\s*tsfp\s+(.+?)\s*;", |lease, value| {
                lease.tsfp = timestamp::decode(value)
            })?,
            Rule::new(Field::Tstp, r"^\s*tstp\s+(.+?)\s*;", |lease, value| {
                lease.tstp = timestamp::decode(value)
            })?,
            Rule::new(Field::Atsfp, r"^\s*atsfp\s+(.+?)\s*;", |lease, value| {
                lease.atsfp = timestamp::decode(value)
            })?,
            Rule::new(
                Field::Uid,
                r#"^\s*uid\s+(?:"(.*)"|([^\s";]+))\s*;"#,
                |lease, value| lease.uid = Some(value.to_string()),
            )?,
            Rule::new(
                Field::ClientHostname,
                r#"^\s*client-hostname\s+"(.*)"\s*;"#,
                |lease, value| lease.client_hostname = Some(value.to_string()),
            )?,
            Rule::new(
                Field::BindingState,
                r"^\s*binding\s+state\s+([^\s;]+)\s*;",
                |lease, value| lease.binding_state = Some(value.to_string()),
            )?,
            Rule::new(
                Field::NextBindingState,
                r"^\s*next\s+binding\s+state\s+([^\s;]+)\s*;",
                |lease, value| lease.next_binding_state = Some(value.to_string()),
            )?,
            Rule::new(
                Field::RewindBindingState,
                r"^\s*rewind\s+binding\s+state\s+([^\s;]+)\s*;",
                |lease, value| lease.rewind_binding_state = Some(value.to_string()),
            )?,
            Rule::new(
                Field::Hardware,
                r"^\s*hardware\s+(\S+\s+[^\s;]+)\s*;",
                set_hardware,
            )?,
            Rule::new(
                Field::VendorClassId,
                r#"^\s*set\s+vendor-class-identifier\s*=\s*"(.*)"\s*;"#,
                |lease, value| lease.vendor_class_id = Some(value.to_string()),
            )?,
            Rule::new(
                Field::VendorName,
                r#"^\s*set\s+vendor-name\s*=\s*"(.*)"\s*;"#,
                |lease, value| lease.vendor_name = Some(value.to_string()),
            )?,
            Rule::new(
                Field::RelayCircuitId,
                r"^\s*option\s+agent\.circuit-id\s+(.+?)\s*;",
                |lease, value| lease.relay_circuit_id = Some(value.to_string()),
            )?,
            Rule::new(
                Field::RelayRemoteId,
                r"^\s*option\s+agent\.remote-id\s+(.+?)\s*;",
                |lease, value| lease.relay_remote_id = Some(value.to_string()),
            )?,
        ]))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the fields every rule matching `statement` would write.
    pub fn matching_fields(&self, statement: &str) -> Vec<Field> {
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_match(statement))
            .map(Rule::field)
            .collect()
    }

    /// Runs every matching rule against one statement.
    pub fn decode_statement(&self, lease: &mut Lease, statement: &str) {
        for rule in &self.rules {
            if let Some(value) = rule.capture(statement) {
                (rule.extract)(lease, value);
            }
        }
    }

    /// Decodes the text of one block, header line included, into a new lease.
    pub fn decode_block(&self, block: &str) -> Lease {
        let mut lease = Lease::default();
        for statement in split_statements(block) {
            self.decode_statement(&mut lease, statement);
        }
        lease
    }
}

/// Splits block text into statements.
///
/// Statements end at a newline, or at `;` or `{` outside a quoted string, so
/// `lease 10.0.0.1 { starts ...; ends ...; }` splits the same way as the
/// multi-line form dhcpd writes. `#` starts a comment running to the end of
/// the line.
pub fn split_statements(text: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut in_comment = false;
    let mut escaped = false;

    for (index, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            if !in_comment {
                statements.push(&text[start..index]);
            }
            start = index + 1;
            in_quotes = false;
            in_comment = false;
            escaped = false;
            continue;
        }
        if in_comment {
            continue;
        }
        if in_quotes {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_quotes = true,
            b'#' => {
                statements.push(&text[start..index]);
                in_comment = true;
            }
            b';' | b'{' => {
                statements.push(&text[start..=index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if !in_comment {
        statements.push(&text[start..]);
    }

    statements.retain(|statement| !statement.trim().is_empty());
    statements
}

fn set_ip(lease: &mut Lease, value: &str) {
    match value.parse::<IpAddr>() {
        Ok(ip) => lease.ip = Some(ip),
        Err(error) => trace!(value, %error, "unparseable lease address"),
    }
}

/// `fixed-address` may list several addresses or name hosts; the first entry
/// is used when it is a literal address.
fn set_fixed_address(lease: &mut Lease, value: &str) {
    let first = value.split(',').next().unwrap_or_default().trim();
    set_ip(lease, first);
}

fn set_hardware(lease: &mut Lease, value: &str) {
    let Some((hardware, mac)) = value.split_once(char::is_whitespace) else {
        return;
    };
    lease.hardware = Hardware::new(hardware, mac.trim());
    if lease.hardware.mac_addr.is_none() {
        trace!(mac = %lease.hardware.mac, "unparseable hardware address");
    }
}
