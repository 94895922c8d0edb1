//! Firewall hit attributes: kinds, services and attribute values.

use crate::address::Address;
use crate::error::SuggestError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors from parsing attribute text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeParseError {
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),
    #[error("invalid prefix length: {0}")]
    InvalidPrefixLength(String),
    #[error("invalid protocol: {0}")]
    InvalidProtocol(String),
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid service: {0}")]
    InvalidService(String),
}

/// The attribute column a suggestion is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Source,
    Destination,
    Service,
}

/// How suggestions are computed for an attribute kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeClass {
    /// Values form an address trie; suggestions are compressed subnets.
    Ip,
    /// Values are opaque; suggestions are per-value counts.
    Discrete,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 3] = [
        AttributeKind::Source,
        AttributeKind::Destination,
        AttributeKind::Service,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Source => "source",
            AttributeKind::Destination => "destination",
            AttributeKind::Service => "service",
        }
    }

    pub fn class(&self) -> AttributeClass {
        match self {
            AttributeKind::Source | AttributeKind::Destination => AttributeClass::Ip,
            AttributeKind::Service => AttributeClass::Discrete,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKind {
    type Err = SuggestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" | "src" => Ok(AttributeKind::Source),
            "destination" | "dest" | "dst" => Ok(AttributeKind::Destination),
            "service" | "svc" => Ok(AttributeKind::Service),
            _ => Err(SuggestError::UnknownAttribute(s.to_string())),
        }
    }
}

/// Well-known IP protocol numbers.
pub const PROTO_ICMP: u8 = 1;
pub const PROTO_TCP: u8 = 6;
pub const PROTO_UDP: u8 = 17;

const ANY: &str = "Any";

/// A service: IP protocol plus an inclusive destination port range.
///
/// `protocol == None` matches every protocol; the full port range matches
/// every port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Service {
    protocol: Option<u8>,
    port_lo: u16,
    port_hi: u16,
}

impl Service {
    /// Service matching everything.
    pub fn any() -> Self {
        Self {
            protocol: None,
            port_lo: 0,
            port_hi: u16::MAX,
        }
    }

    /// One protocol on one port.
    pub fn new(protocol: u8, port: u16) -> Self {
        Self {
            protocol: Some(protocol),
            port_lo: port,
            port_hi: port,
        }
    }

    /// Protocol (or any) over an inclusive port range.
    pub fn with_range(protocol: Option<u8>, port_lo: u16, port_hi: u16) -> Result<Self, AttributeParseError> {
        if port_lo > port_hi {
            return Err(AttributeParseError::InvalidPort(format!("{}-{}", port_lo, port_hi)));
        }
        Ok(Self {
            protocol,
            port_lo,
            port_hi,
        })
    }

    pub fn protocol(&self) -> Option<u8> {
        self.protocol
    }

    pub fn ports(&self) -> (u16, u16) {
        (self.port_lo, self.port_hi)
    }

    fn all_ports(&self) -> bool {
        self.port_lo == 0 && self.port_hi == u16::MAX
    }

    /// Whether every packet of `other` also matches this service.
    pub fn contains(&self, other: &Service) -> bool {
        let protocol_ok = match (self.protocol, other.protocol) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a == b,
        };
        protocol_ok && self.port_lo <= other.port_lo && other.port_hi <= self.port_hi
    }
}

/// Parse a protocol name or number. `Any` yields `None`.
pub fn parse_protocol(s: &str) -> Result<Option<u8>, AttributeParseError> {
    match s.to_ascii_lowercase().as_str() {
        "any" => Ok(None),
        "icmp" => Ok(Some(PROTO_ICMP)),
        "tcp" => Ok(Some(PROTO_TCP)),
        "udp" => Ok(Some(PROTO_UDP)),
        p => p
            .parse::<u8>()
            .map(Some)
            .map_err(|_| AttributeParseError::InvalidProtocol(s.to_string())),
    }
}

fn protocol_name(protocol: u8) -> String {
    match protocol {
        PROTO_ICMP => "ICMP".to_string(),
        PROTO_TCP => "TCP".to_string(),
        PROTO_UDP => "UDP".to_string(),
        p => p.to_string(),
    }
}

fn parse_port(s: &str) -> Result<u16, AttributeParseError> {
    s.parse::<u16>()
        .map_err(|_| AttributeParseError::InvalidPort(s.to_string()))
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let protocol = self.protocol.map(protocol_name);
        let protocol = protocol.as_deref().unwrap_or(ANY);

        if self.all_ports() {
            f.write_str(protocol)
        } else if self.port_lo == self.port_hi {
            write!(f, "{} {}", protocol, self.port_lo)
        } else {
            write!(f, "{} {}-{}", protocol, self.port_lo, self.port_hi)
        }
    }
}

impl FromStr for Service {
    type Err = AttributeParseError;

    /// Accepts `Any`, `TCP`, `TCP 80`, `UDP 1000-2000`, `6 443`, `Any 53`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let protocol = match tokens.next() {
            Some(token) => parse_protocol(token)?,
            None => return Err(AttributeParseError::InvalidService(s.to_string())),
        };

        let (port_lo, port_hi) = match tokens.next() {
            None => (0, u16::MAX),
            Some(ports) if ports.eq_ignore_ascii_case(ANY) => (0, u16::MAX),
            Some(ports) => match ports.split_once('-') {
                Some((lo, hi)) => (parse_port(lo)?, parse_port(hi)?),
                None => {
                    let port = parse_port(ports)?;
                    (port, port)
                }
            },
        };

        if tokens.next().is_some() {
            return Err(AttributeParseError::InvalidService(s.to_string()));
        }

        Self::with_range(protocol, port_lo, port_hi)
    }
}

/// The value of one attribute of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeValue {
    Ip(Address),
    Service(Service),
}

impl AttributeValue {
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            AttributeValue::Ip(address) => Some(address),
            AttributeValue::Service(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Ip(address) => fmt::Display::fmt(address, f),
            AttributeValue::Service(service) => fmt::Display::fmt(service, f),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<Address> for AttributeValue {
    fn from(address: Address) -> Self {
        AttributeValue::Ip(address)
    }
}

impl From<Service> for AttributeValue {
    fn from(service: Service) -> Self {
        AttributeValue::Service(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // AttributeKind
    // ===========================================

    #[test]
    fn test_kind_from_str_aliases() {
        assert_eq!("source".parse::<AttributeKind>().unwrap(), AttributeKind::Source);
        assert_eq!("SRC".parse::<AttributeKind>().unwrap(), AttributeKind::Source);
        assert_eq!("Destination".parse::<AttributeKind>().unwrap(), AttributeKind::Destination);
        assert_eq!("dst".parse::<AttributeKind>().unwrap(), AttributeKind::Destination);
        assert_eq!(" service ".parse::<AttributeKind>().unwrap(), AttributeKind::Service);
    }

    #[test]
    fn test_kind_from_str_unknown() {
        let err = "port".parse::<AttributeKind>().unwrap_err();
        assert_eq!(err, SuggestError::UnknownAttribute("port".to_string()));
    }

    #[test]
    fn test_kind_class() {
        assert_eq!(AttributeKind::Source.class(), AttributeClass::Ip);
        assert_eq!(AttributeKind::Destination.class(), AttributeClass::Ip);
        assert_eq!(AttributeKind::Service.class(), AttributeClass::Discrete);
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in AttributeKind::ALL {
            assert_eq!(kind.to_string().parse::<AttributeKind>().unwrap(), kind);
        }
    }

    // ===========================================
    // Service
    // ===========================================

    #[test]
    fn test_service_parse_forms() {
        assert_eq!("Any".parse::<Service>().unwrap(), Service::any());
        assert_eq!("TCP 80".parse::<Service>().unwrap(), Service::new(PROTO_TCP, 80));
        assert_eq!("6 80".parse::<Service>().unwrap(), Service::new(PROTO_TCP, 80));
        assert_eq!(
            "udp 1000-2000".parse::<Service>().unwrap(),
            Service::with_range(Some(PROTO_UDP), 1000, 2000).unwrap()
        );
        assert_eq!(
            "tcp".parse::<Service>().unwrap(),
            Service::with_range(Some(PROTO_TCP), 0, u16::MAX).unwrap()
        );
        assert_eq!(
            "Any 53".parse::<Service>().unwrap(),
            Service::with_range(None, 53, 53).unwrap()
        );
    }

    #[test]
    fn test_service_parse_errors() {
        assert!("".parse::<Service>().is_err());
        assert!("TCP 70000".parse::<Service>().is_err());
        assert!("TCP 90-80".parse::<Service>().is_err());
        assert!("bogus 80".parse::<Service>().is_err());
        assert!("TCP 80 extra".parse::<Service>().is_err());
    }

    #[test]
    fn test_service_display() {
        assert_eq!(Service::any().to_string(), "Any");
        assert_eq!(Service::new(PROTO_TCP, 443).to_string(), "TCP 443");
        assert_eq!(Service::new(47, 0).to_string(), "47 0");
        assert_eq!(
            Service::with_range(Some(PROTO_UDP), 10, 20).unwrap().to_string(),
            "UDP 10-20"
        );
        assert_eq!(
            Service::with_range(Some(PROTO_ICMP), 0, u16::MAX).unwrap().to_string(),
            "ICMP"
        );
    }

    #[test]
    fn test_service_contains() {
        let any = Service::any();
        let tcp = "TCP".parse::<Service>().unwrap();
        let tcp_web = "TCP 80-443".parse::<Service>().unwrap();
        let tcp_80 = Service::new(PROTO_TCP, 80);
        let udp_80 = Service::new(PROTO_UDP, 80);

        assert!(any.contains(&tcp_80));
        assert!(tcp.contains(&tcp_80));
        assert!(tcp_web.contains(&tcp_80));
        assert!(!tcp_web.contains(&Service::new(PROTO_TCP, 8080)));
        assert!(!tcp.contains(&udp_80));
        assert!(!tcp_80.contains(&any));
    }

    // ===========================================
    // AttributeValue
    // ===========================================

    #[test]
    fn test_value_display_and_address() {
        let ip: AttributeValue = "10.0.0.0/8".parse::<Address>().unwrap().into();
        assert_eq!(ip.to_string(), "10.0.0.0/8");
        assert!(ip.as_address().is_some());

        let svc: AttributeValue = Service::new(PROTO_UDP, 53).into();
        assert_eq!(svc.to_string(), "UDP 53");
        assert!(svc.as_address().is_none());
    }
}
