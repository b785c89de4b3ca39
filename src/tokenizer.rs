//! Splits a leases file into raw `lease` and `host` blocks.
//!
//! [`Blocks`] reads the stream one line at a time and yields each block as
//! soon as its closing `}` has been read. A block starts at a `lease ` or
//! `host ` keyword that begins a token (start of line, or after whitespace,
//! `;` or `}`) outside comments and quoted strings, and ends at the first
//! `}` after the keyword. Everything between blocks (comments,
//! `authoring-byte-order`, `server-duid`, `failover` state, ...) is skipped.

use std::io::BufRead;

use tracing::debug;

use crate::error::Result;

const LEASE_KEYWORD: &[u8] = b"lease ";
const HOST_KEYWORD: &[u8] = b"host ";

/// The declaration keyword that opened a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Lease,
    Host,
}

impl BlockKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Lease => "lease",
            Self::Host => "host",
        }
    }
}

/// One block as read from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub kind: BlockKind,

    /// Bytes from just after the keyword through the closing `}`, e.g.
    /// `172.24.43.3 {\n  starts ...;\n}`.
    pub body: Vec<u8>,
}

impl RawBlock {
    /// The block text with its keyword restored, lossily decoded as UTF-8.
    pub fn text(&self) -> String {
        format!(
            "{} {}",
            self.kind.keyword(),
            String::from_utf8_lossy(&self.body)
        )
    }
}

/// Lazy iterator over the blocks of a leases file.
///
/// Yields an I/O error at most once, after which iteration ends. A block
/// still open at end of input is dropped.
#[derive(Debug)]
pub struct Blocks<R> {
    reader: R,
    line: Vec<u8>,
    cursor: usize,
    open: Option<RawBlock>,
    finished: bool,
}

impl<R: BufRead> Blocks<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            cursor: 0,
            open: None,
            finished: false,
        }
    }

    /// Reads the next line. Returns false at end of input.
    fn read_line(&mut self) -> std::io::Result<bool> {
        self.line.clear();
        self.cursor = 0;
        Ok(self.reader.read_until(b'\n', &mut self.line)? > 0)
    }
}

impl<R: BufRead> Iterator for Blocks<R> {
    type Item = Result<RawBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            if self.cursor >= self.line.len() {
                match self.read_line() {
                    Ok(true) => {}
                    Ok(false) => {
                        self.finished = true;
                        if let Some(block) = self.open.take() {
                            debug!(
                                kind = block.kind.keyword(),
                                bytes = block.body.len(),
                                "dropping truncated block at end of input"
                            );
                        }
                        return None;
                    }
                    Err(error) => {
                        self.finished = true;
                        return Some(Err(error.into()));
                    }
                }
            }

            let rest = &self.line[self.cursor..];
            match self.open.as_mut() {
                Some(block) => match rest.iter().position(|&byte| byte == b'}') {
                    Some(end) => {
                        block.body.extend_from_slice(&rest[..=end]);
                        self.cursor += end + 1;
                        return self.open.take().map(Ok);
                    }
                    None => {
                        block.body.extend_from_slice(rest);
                        self.cursor = self.line.len();
                    }
                },
                None => match find_keyword(&self.line, self.cursor) {
                    Some((kind, body_start)) => {
                        self.open = Some(RawBlock {
                            kind,
                            body: Vec::new(),
                        });
                        self.cursor = body_start;
                    }
                    None => self.cursor = self.line.len(),
                },
            }
        }
    }
}

/// Finds the next block keyword in `line` at or after `from`, returning the
/// block kind and the offset just past the keyword.
fn find_keyword(line: &[u8], from: usize) -> Option<(BlockKind, usize)> {
    let mut index = from;
    while index < line.len() {
        match line[index] {
            b'#' => return None,
            b'"' => {
                index += 1;
                while index < line.len() && line[index] != b'"' {
                    if line[index] == b'\\' {
                        index += 1;
                    }
                    index += 1;
                }
            }
            _ if at_token_start(line, index) => {
                let rest = &line[index..];
                if rest.starts_with(LEASE_KEYWORD) {
                    return Some((BlockKind::Lease, index + LEASE_KEYWORD.len()));
                }
                if rest.starts_with(HOST_KEYWORD) {
                    return Some((BlockKind::Host, index + HOST_KEYWORD.len()));
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}

fn at_token_start(line: &[u8], index: usize) -> bool {
    index == 0 || matches!(line[index - 1], b' ' | b'\t' | b'\r' | b'\n' | b';' | b'}')
}
