use num_enum::{FromPrimitive, IntoPrimitive};

/// Reply codes of the BIRD control protocol.
///
/// Every reply line starts with a four digit code followed by a space (last line of a reply) or
/// a dash (more lines follow). Continuation lines of the same code start with a space instead.
///
/// Only the codes this crate interprets are named, everything else maps to [ReplyCode::Other].
#[derive(Debug, FromPrimitive, IntoPrimitive, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ReplyCode {
    Ok = 0,
    Welcome = 1,
    ReadingConfiguration = 2,
    Reconfigured = 3,
    ReconfigurationInProgress = 4,
    StatusReport = 13,
    ReconfigurationConfirmed = 18,
    NothingToDo = 19,
    ConfigurationOk = 20,

    BirdVersion = 1000,
    ProtocolList = 1002,
    ProtocolDetails = 1006,
    RouteList = 1007,
    RouteDetails = 1008,
    StatusRouterId = 1011,
    RouteAttributes = 1012,

    ProtocolListHeader = 2002,

    NetworkNotInTable = 8001,
    InvalidValue = 8002,
    NoProtocolsMatch = 8003,
    StoppedDueToReconfiguration = 8004,
    ProtocolDown = 8005,
    ReloadFailed = 8006,
    AccessDenied = 8007,
    EvaluationRuntimeError = 8008,

    ParseError = 9001,

    #[num_enum(catch_all)]
    Other(u16),
}

impl ReplyCode {
    /// Decorative lines: greeting banner, table headers, the route type line and end markers.
    /// They carry nothing a record parser needs and are dropped before grouping.
    pub const fn is_ignored(&self) -> bool {
        matches!(
            self,
            ReplyCode::Ok
                | ReplyCode::Welcome
                | ReplyCode::StatusReport
                | ReplyCode::RouteDetails
                | ReplyCode::ProtocolListHeader
        )
    }

    /// Codes that end a reply. The transport stops reading once one of them arrives.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReplyCode::Ok
                | ReplyCode::Reconfigured
                | ReplyCode::ReconfigurationInProgress
                | ReplyCode::StatusReport
                | ReplyCode::ReconfigurationConfirmed
                | ReplyCode::NothingToDo
                | ReplyCode::ConfigurationOk
                | ReplyCode::NetworkNotInTable
                | ReplyCode::InvalidValue
                | ReplyCode::NoProtocolsMatch
                | ReplyCode::StoppedDueToReconfiguration
                | ReplyCode::ProtocolDown
                | ReplyCode::ReloadFailed
                | ReplyCode::AccessDenied
                | ReplyCode::EvaluationRuntimeError
                | ReplyCode::ParseError
        )
    }

    /// Codes reporting that the daemon could not execute the command at all.
    pub const fn is_daemon_error(&self) -> bool {
        matches!(
            self,
            ReplyCode::StoppedDueToReconfiguration
                | ReplyCode::ProtocolDown
                | ReplyCode::ReloadFailed
                | ReplyCode::AccessDenied
                | ReplyCode::EvaluationRuntimeError
                | ReplyCode::ParseError
        )
    }
}

/// One tokenized reply line.
///
/// `code` is `None` for bare continuation lines. `payload` is the line content without the
/// leading code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine {
    pub code: Option<u16>,
    pub payload: String,
}

impl FieldLine {
    pub fn reply_code(&self) -> Option<ReplyCode> {
        self.code.map(ReplyCode::from)
    }

    pub fn has_code(&self, code: ReplyCode) -> bool {
        self.reply_code() == Some(code)
    }

    pub fn is_ignored(&self) -> bool {
        self.reply_code().is_some_and(|c| c.is_ignored())
    }

    /// All-whitespace line; closes a protocol detail block.
    pub fn is_blank(&self) -> bool {
        self.code.is_none() && self.payload.trim().is_empty()
    }
}
