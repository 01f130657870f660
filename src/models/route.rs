use ipnet::IpNet;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Value of a `BGP.*` route attribute.
///
/// Attributes printed without a value (e.g. `BGP.atomic_aggr:`) are flags.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AttributeValue {
    Text(String),
    Flag(bool),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s.as_str()),
            AttributeValue::Flag(_) => None,
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Text(s) => write!(f, "{}", s),
            AttributeValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// One routing table entry from `show route ... all`.
///
/// ```text
/// 1007-2a02:898::/32      via 2001:7f8:1::a500:8954:1 on eth1 [PS2 12:46] * (100) [AS8283i]
/// 1008-   Type: BGP unicast univ
/// 1012-   BGP.origin: IGP
///     BGP.as_path: 8954 8283
///     BGP.next_hop: 2001:7f8:1::a500:8954:1 fe80::21f:caff:fe16:e02
///     BGP.local_pref: 100
///     BGP.community: (8954,620)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// `None` for additional routes to the previously printed prefix.
    pub prefix: Option<IpNet>,
    /// Next hop of a `via` route, otherwise the `from` address or the source protocol.
    pub peer: String,
    pub interface: Option<String>,
    /// Bare route type such as `unreachable` or `blackhole`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub route_type: Option<String>,
    /// Protocol that originated the route.
    pub source: String,
    /// Time of the last change, verbatim.
    pub time: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Route {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}
