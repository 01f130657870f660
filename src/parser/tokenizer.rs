//! Splitting reply lines into their field code and payload.
use crate::models::FieldLine;
use regex::Regex;
use std::sync::LazyLock;

static FIELD_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[ -]").expect("valid field code regex"));

/// Extract the leading field code of a line.
///
/// A line carries a code if it starts with one or more digits followed by a space or a dash.
/// The returned payload has the code and a leading dash removed and is trimmed. Lines without
/// a code are returned unchanged.
///
/// ```
/// use bgpkit_birdc::parser::extract_field_code;
///
/// assert_eq!(extract_field_code("1002-PS1  BGP  T_PS1"), (Some(1002), "PS1  BGP  T_PS1"));
/// assert_eq!(extract_field_code("  Preference: 100"), (None, "  Preference: 100"));
/// ```
pub fn extract_field_code(line: &str) -> (Option<u16>, &str) {
    let Some(caps) = FIELD_CODE.captures(line) else {
        return (None, line);
    };
    let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
        return (None, line);
    };
    match digits.as_str().parse::<u16>() {
        Ok(code) => {
            let rest = &line[whole.end()..];
            (Some(code), rest.trim_start_matches('-').trim())
        }
        Err(_) => (None, line),
    }
}

impl FieldLine {
    /// Tokenize one raw reply line. Surrounding whitespace is removed before the code is looked
    /// for, so indented continuation lines come back without a code.
    pub fn from_raw(line: &str) -> FieldLine {
        let (code, payload) = extract_field_code(line.trim());
        FieldLine {
            code,
            payload: payload.to_string(),
        }
    }
}

/// Tokenize a whole reply.
pub fn tokenize_reply(reply: &str) -> Vec<FieldLine> {
    reply.lines().map(FieldLine::from_raw).collect()
}
