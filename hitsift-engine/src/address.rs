//! IP addresses and subnets with an explicit prefix length.
//!
//! Both families share one representation: the address bits live in the low
//! bits of a `u128` (32 for IPv4, 128 for IPv6), MSB-first, so the numeric
//! order of `bits` is the big-endian order of the address.

use crate::attribute::AttributeParseError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Number of address bits (32 or 128).
    pub const fn max_prefix_len(self) -> u8 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 128,
        }
    }

    const fn width_mask(self) -> u128 {
        match self {
            AddressFamily::V4 => u32::MAX as u128,
            AddressFamily::V6 => u128::MAX,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// An IP subnet: address bits plus prefix length.
///
/// Host bits past the prefix are always zero. Field order gives the derived
/// ordering: family, then numeric address, then prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    family: AddressFamily,
    bits: u128,
    prefix_len: u8,
}

impl Address {
    /// Create a subnet, zeroing any host bits past `prefix_len`.
    pub fn new(family: AddressFamily, bits: u128, prefix_len: u8) -> Result<Self, AttributeParseError> {
        if prefix_len > family.max_prefix_len() {
            return Err(AttributeParseError::InvalidPrefixLength(format!(
                "/{} exceeds {} for {}",
                prefix_len,
                family.max_prefix_len(),
                family
            )));
        }
        if bits & !family.width_mask() != 0 {
            return Err(AttributeParseError::InvalidAddress(format!(
                "{:#x} does not fit in {}",
                bits, family
            )));
        }
        Ok(Self::normalized(family, bits, prefix_len))
    }

    fn normalized(family: AddressFamily, bits: u128, prefix_len: u8) -> Self {
        Self {
            family,
            bits: bits & network_mask(family, prefix_len),
            prefix_len,
        }
    }

    /// A single IPv4 host (/32).
    pub fn host_v4(ip: Ipv4Addr) -> Self {
        Self::normalized(AddressFamily::V4, u128::from(u32::from(ip)), 32)
    }

    /// A single IPv6 host (/128).
    pub fn host_v6(ip: Ipv6Addr) -> Self {
        Self::normalized(AddressFamily::V6, u128::from(ip), 128)
    }

    /// A single host of either family.
    pub fn host(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self::host_v4(v4),
            IpAddr::V6(v6) => Self::host_v6(v6),
        }
    }

    /// The whole address space of a family (/0).
    pub fn any(family: AddressFamily) -> Self {
        Self::normalized(family, 0, 0)
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn max_prefix_len(&self) -> u8 {
        self.family.max_prefix_len()
    }

    /// Number of free host bits, i.e. log2 of the subnet size.
    pub fn subnet_bits(&self) -> u32 {
        u32::from(self.max_prefix_len() - self.prefix_len)
    }

    /// The enclosing subnet one bit shorter, or `None` at /0.
    pub fn parent(&self) -> Option<Self> {
        if self.prefix_len == 0 {
            return None;
        }
        Some(Self::normalized(self.family, self.bits, self.prefix_len - 1))
    }

    /// Whether `other` is the other half of this subnet's parent.
    ///
    /// Siblings share family and prefix length `L > 0`, agree on the first
    /// `L - 1` bits and differ in bit `L - 1`.
    pub fn is_sibling(&self, other: &Address) -> bool {
        if self.family != other.family || self.prefix_len != other.prefix_len || self.prefix_len == 0 {
            return false;
        }
        let last_bit = 1u128 << (self.max_prefix_len() - self.prefix_len);
        self.bits ^ other.bits == last_bit
    }

    /// Whether `other` lies entirely inside this subnet.
    pub fn contains(&self, other: &Address) -> bool {
        self.family == other.family
            && self.prefix_len <= other.prefix_len
            && other.bits & network_mask(self.family, self.prefix_len) == self.bits
    }

    fn ip(&self) -> IpAddr {
        match self.family {
            AddressFamily::V4 => IpAddr::V4(Ipv4Addr::from(self.bits as u32)),
            AddressFamily::V6 => IpAddr::V6(Ipv6Addr::from(self.bits)),
        }
    }
}

fn network_mask(family: AddressFamily, prefix_len: u8) -> u128 {
    let host_bits = u32::from(family.max_prefix_len() - prefix_len);
    if host_bits >= 128 {
        0
    } else {
        (u128::MAX << host_bits) & family.width_mask()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip(), self.prefix_len)
    }
}

impl FromStr for Address {
    type Err = AttributeParseError;

    /// Parse `10.0.0.1`, `10.0.0.0/24`, `2001:db8::/32` and the like.
    /// A bare address is a single host; `Any` is the IPv4 /0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(Self::any(AddressFamily::V4));
        }
        let (ip_str, prefix_str) = match s.split_once('/') {
            Some((ip, prefix)) => (ip, Some(prefix)),
            None => (s, None),
        };

        let ip: IpAddr = ip_str
            .parse()
            .map_err(|_| AttributeParseError::InvalidAddress(s.to_string()))?;
        let host = Self::host(ip);

        match prefix_str {
            None => Ok(host),
            Some(prefix) => {
                let prefix_len: u8 = prefix
                    .parse()
                    .map_err(|_| AttributeParseError::InvalidPrefixLength(s.to_string()))?;
                if prefix_len > host.max_prefix_len() {
                    return Err(AttributeParseError::InvalidPrefixLength(s.to_string()));
                }
                Ok(Self::normalized(host.family, host.bits, prefix_len))
            }
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    // ===========================================
    // Parsing and display
    // ===========================================

    #[test]
    fn test_parse_bare_v4_is_host() {
        let a = addr("10.0.0.1");
        assert_eq!(a.family(), AddressFamily::V4);
        assert_eq!(a.prefix_len(), 32);
        assert_eq!(a.bits(), 0x0A00_0001);
        assert_eq!(a.to_string(), "10.0.0.1/32");
    }

    #[test]
    fn test_parse_cidr_normalizes_host_bits() {
        let a = addr("10.0.0.5/24");
        assert_eq!(a.bits(), 0x0A00_0000);
        assert_eq!(a.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_parse_v6() {
        let a = addr("2001:db8::1/32");
        assert_eq!(a.family(), AddressFamily::V6);
        assert_eq!(a.prefix_len(), 32);
        assert_eq!(a.to_string(), "2001:db8::/32");
    }

    #[test]
    fn test_parse_slash_zero() {
        let a = addr("192.168.1.1/0");
        assert_eq!(a, Address::any(AddressFamily::V4));
        assert_eq!(a.to_string(), "0.0.0.0/0");
    }

    #[test]
    fn test_parse_any() {
        for text in ["Any", "any", " ANY "] {
            let a = addr(text);
            assert_eq!(a, Address::any(AddressFamily::V4));
            assert_eq!(a.to_string(), "0.0.0.0/0");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-an-ip".parse::<Address>().is_err());
        assert!("10.0.0.0/33".parse::<Address>().is_err());
        assert!("10.0.0.0/x".parse::<Address>().is_err());
        assert!("::/129".parse::<Address>().is_err());
    }

    #[test]
    fn test_new_rejects_oversized_bits() {
        assert!(Address::new(AddressFamily::V4, 1u128 << 32, 32).is_err());
        assert!(Address::new(AddressFamily::V4, 0, 33).is_err());
        assert!(Address::new(AddressFamily::V6, u128::MAX, 128).is_ok());
    }

    // ===========================================
    // Parent / sibling
    // ===========================================

    #[test]
    fn test_parent_drops_last_bit() {
        let a = addr("0.0.0.3");
        assert_eq!(a.parent(), Some(addr("0.0.0.2/31")));
        assert_eq!(addr("0.0.0.0/1").parent(), Some(addr("0.0.0.0/0")));
        assert_eq!(addr("0.0.0.0/0").parent(), None);
    }

    #[test]
    fn test_siblings() {
        assert!(addr("0.0.0.0").is_sibling(&addr("0.0.0.1")));
        assert!(addr("0.0.0.1").is_sibling(&addr("0.0.0.0")));
        assert!(addr("0.0.0.0/31").is_sibling(&addr("0.0.0.2/31")));
        assert!(addr("0.0.0.0/1").is_sibling(&addr("128.0.0.0/1")));
    }

    #[test]
    fn test_not_siblings() {
        // Adjacent but under different parents
        assert!(!addr("0.0.0.1").is_sibling(&addr("0.0.0.2")));
        // Different prefix lengths
        assert!(!addr("0.0.0.0/31").is_sibling(&addr("0.0.0.2/32")));
        // Equal
        assert!(!addr("0.0.0.0").is_sibling(&addr("0.0.0.0")));
        // Root has no sibling
        assert!(!addr("0.0.0.0/0").is_sibling(&addr("0.0.0.0/0")));
    }

    #[test]
    fn test_siblings_across_families() {
        let v4 = Address::new(AddressFamily::V4, 0, 32).unwrap();
        let v6 = Address::new(AddressFamily::V6, 1, 32).unwrap();
        assert!(!v4.is_sibling(&v6));
    }

    #[test]
    fn test_v6_siblings_at_full_length() {
        assert!(addr("2001:db8::").is_sibling(&addr("2001:db8::1")));
        assert!(!addr("2001:db8::1").is_sibling(&addr("2001:db8::2")));
    }

    // ===========================================
    // Ordering and containment
    // ===========================================

    #[test]
    fn test_ordering_is_big_endian() {
        let mut v = vec![addr("10.0.0.2"), addr("9.255.255.255"), addr("10.0.0.1")];
        v.sort();
        assert_eq!(v, vec![addr("9.255.255.255"), addr("10.0.0.1"), addr("10.0.0.2")]);
    }

    #[test]
    fn test_contains() {
        let net = addr("192.168.1.0/24");
        assert!(net.contains(&addr("192.168.1.100")));
        assert!(net.contains(&addr("192.168.1.128/25")));
        assert!(!net.contains(&addr("192.168.2.1")));
        assert!(!net.contains(&addr("192.168.0.0/16")));
        assert!(addr("0.0.0.0/0").contains(&addr("255.255.255.255")));
        assert!(!addr("::/0").contains(&addr("10.0.0.1")));
    }

    #[test]
    fn test_subnet_bits() {
        assert_eq!(addr("10.0.0.0/30").subnet_bits(), 2);
        assert_eq!(addr("10.0.0.1").subnet_bits(), 0);
        assert_eq!(addr("::/0").subnet_bits(), 128);
    }
}
