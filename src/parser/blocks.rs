/*!
Grouping reply lines into logical blocks.

Peers and routes are printed as a one-line summary optionally followed by a detail block:

```text
1002-PS1      BGP      T_PS1    start  Jun13       Passive
1006-  Description:    Peering AS8954 - InTouch
  Preference:     100
  ...
                                                    <- blank line closes a protocol detail block
1007-2a02:898::/32      via 2001:7f8:1::a500:8954:1 on eth1 [PS2 12:46] * (100) [AS8283i]
1008-   Type: BGP unicast univ
1012-   BGP.origin: IGP
    BGP.as_path: 8954 8283
1007-...                                            <- first line without `BGP.` closes a route detail block
```

[BlockAssembler] walks the reply once with a single line of lookahead and yields one
[LogicalBlock] per summary, with the detail attached when one immediately follows it.
*/
use crate::models::{FieldLine, ReplyCode};
use std::iter::Peekable;
use std::str::Lines;

/// Namespace marker of route attribute lines, compared lower-cased.
const ATTRIBUTE_MARKER: &str = "bgp.";

/// Number of physical lines following the router ID line in `show status`.
const STATUS_LINES: usize = 3;

/// The reply shape a [BlockAssembler] expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind<'p> {
    Status,
    /// Only protocols of the given type (e.g. `BGP`) produce blocks.
    Peers { protocol: &'p str },
    Routes,
}

/// One summary line and everything that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalBlock {
    pub summary: FieldLine,
    /// Code-less lines printed between the summary and the detail block.
    pub continuation: Vec<FieldLine>,
    /// The detail block, starting with the detail-start line itself.
    pub detail: Vec<FieldLine>,
}

impl LogicalBlock {
    fn new(summary: FieldLine) -> Self {
        LogicalBlock {
            summary,
            continuation: vec![],
            detail: vec![],
        }
    }
}

enum State {
    Scanning,
    /// A summary was read and may still receive its detail block.
    Pending(LogicalBlock),
    /// `8001` seen, or input exhausted.
    Done,
}

pub struct BlockAssembler<'a, 'p> {
    kind: ReplyKind<'p>,
    lines: Peekable<Lines<'a>>,
    state: State,
    network_not_in_table: bool,
}

impl<'a, 'p> BlockAssembler<'a, 'p> {
    pub fn new(reply: &'a str, kind: ReplyKind<'p>) -> Self {
        BlockAssembler {
            kind,
            lines: reply.lines().peekable(),
            state: State::Scanning,
            network_not_in_table: false,
        }
    }

    /// Whether the reply ended with `8001 Network not in table`. Blocks yielded before that
    /// line are void.
    pub fn network_not_in_table(&self) -> bool {
        self.network_not_in_table
    }

    fn summary_code(&self) -> ReplyCode {
        match self.kind {
            ReplyKind::Status => ReplyCode::StatusRouterId,
            ReplyKind::Peers { .. } => ReplyCode::ProtocolList,
            ReplyKind::Routes => ReplyCode::RouteList,
        }
    }

    fn detail_code(&self) -> Option<ReplyCode> {
        match self.kind {
            ReplyKind::Status => None,
            ReplyKind::Peers { .. } => Some(ReplyCode::ProtocolDetails),
            ReplyKind::Routes => Some(ReplyCode::RouteAttributes),
        }
    }

    /// Whether a summary line belongs to the protocol type this assembler collects.
    fn accepts_summary(&self, summary: &FieldLine) -> bool {
        match self.kind {
            ReplyKind::Peers { protocol } => {
                summary.payload.split_whitespace().nth(1) == Some(protocol)
            }
            ReplyKind::Status | ReplyKind::Routes => true,
        }
    }

    /// Read the lines following a detail-start line.
    fn read_detail(&mut self, start: FieldLine) -> Vec<FieldLine> {
        let mut detail = vec![start];
        match self.kind {
            ReplyKind::Status => {}
            ReplyKind::Peers { .. } => {
                while let Some(raw) = self.lines.peek() {
                    let line = FieldLine::from_raw(raw);
                    if line.is_blank() {
                        self.lines.next();
                        break;
                    }
                    if line.code.is_some() && !line.is_ignored() {
                        // next top-level line, leave it to the scanner
                        break;
                    }
                    self.lines.next();
                    if !line.is_ignored() {
                        detail.push(line);
                    }
                }
            }
            ReplyKind::Routes => {
                while let Some(raw) = self.lines.peek() {
                    let line = FieldLine::from_raw(raw);
                    if line.is_ignored() {
                        self.lines.next();
                        continue;
                    }
                    if !raw.trim().to_lowercase().contains(ATTRIBUTE_MARKER) {
                        break;
                    }
                    self.lines.next();
                    detail.push(line);
                }
            }
        }
        detail
    }

    /// The router ID line plus the next three physical lines, whatever their codes.
    fn read_status_block(&mut self, summary: FieldLine) -> LogicalBlock {
        let mut block = LogicalBlock::new(summary);
        while block.detail.len() < STATUS_LINES {
            let Some(raw) = self.lines.next() else {
                break;
            };
            let line = FieldLine::from_raw(raw);
            if line.payload.starts_with("Hostname is") {
                block.continuation.push(line);
            } else {
                block.detail.push(line);
            }
        }
        block
    }

    /// Advance the state machine by one line. Returns a block when one is complete.
    fn step(&mut self, raw: &str) -> Option<LogicalBlock> {
        let line = FieldLine::from_raw(raw);
        if line.is_ignored() {
            return None;
        }

        if self.kind == ReplyKind::Routes && line.has_code(ReplyCode::NetworkNotInTable) {
            self.network_not_in_table = true;
            self.state = State::Done;
            return None;
        }

        if self.kind == ReplyKind::Status {
            return match line.reply_code() {
                Some(ReplyCode::BirdVersion) => Some(LogicalBlock::new(line)),
                Some(ReplyCode::StatusRouterId) => Some(self.read_status_block(line)),
                _ => None,
            };
        }

        if line.has_code(self.summary_code()) {
            let previous = std::mem::replace(&mut self.state, State::Scanning);
            if self.accepts_summary(&line) {
                self.state = State::Pending(LogicalBlock::new(line));
            }
            return match previous {
                State::Pending(block) => Some(block),
                _ => None,
            };
        }

        if self.detail_code().is_some_and(|code| line.has_code(code)) {
            let detail = self.read_detail(line);
            return match std::mem::replace(&mut self.state, State::Scanning) {
                State::Pending(mut block) => {
                    block.detail = detail;
                    Some(block)
                }
                // orphan detail block, nothing to attach it to
                _ => None,
            };
        }

        if line.code.is_none() && self.kind == ReplyKind::Routes {
            if let State::Pending(block) = &mut self.state {
                if !line.payload.is_empty() {
                    block.continuation.push(line);
                }
            }
        }
        None
    }
}

impl Iterator for BlockAssembler<'_, '_> {
    type Item = LogicalBlock;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if matches!(self.state, State::Done) {
                return None;
            }
            let Some(raw) = self.lines.next() else {
                return match std::mem::replace(&mut self.state, State::Done) {
                    State::Pending(block) => Some(block),
                    _ => None,
                };
            };
            if let Some(block) = self.step(raw) {
                return Some(block);
            }
        }
    }
}
