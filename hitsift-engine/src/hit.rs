//! Hits, rules and filters.
//!
//! A hit is one logged packet/flow with up to three attributes. Rules and
//! filters share one shape: a set of optional attribute constraints that a
//! hit must all satisfy. A hit covered by an existing rule needs no new rule,
//! and a hit outside the operator's current filter is not of interest, so
//! both are removed before suggestions are computed.

use crate::address::Address;
use crate::attribute::{AttributeKind, AttributeParseError, AttributeValue, Service};
use std::collections::BTreeMap;

/// One logged hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hit {
    pub source: Option<Address>,
    pub destination: Option<Address>,
    pub service: Option<Service>,
}

impl Hit {
    pub fn new(source: Address, destination: Address, service: Service) -> Self {
        Self {
            source: Some(source),
            destination: Some(destination),
            service: Some(service),
        }
    }

    /// Builder: set source.
    pub fn with_source(mut self, source: Address) -> Self {
        self.source = Some(source);
        self
    }

    /// Builder: set destination.
    pub fn with_destination(mut self, destination: Address) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Builder: set service.
    pub fn with_service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    /// The hit's value for one attribute column, if present.
    pub fn attribute(&self, kind: AttributeKind) -> Option<AttributeValue> {
        match kind {
            AttributeKind::Source => self.source.map(AttributeValue::Ip),
            AttributeKind::Destination => self.destination.map(AttributeValue::Ip),
            AttributeKind::Service => self.service.map(AttributeValue::Service),
        }
    }
}

/// A distinct hit together with how many times it was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountedHit {
    pub hit: Hit,
    pub count: u64,
}

impl CountedHit {
    pub fn new(hit: Hit, count: u64) -> Self {
        Self { hit, count }
    }
}

/// Deduplicate raw hits into counted hits, in ascending hit order.
pub fn count_hits<I>(hits: I) -> Vec<CountedHit>
where
    I: IntoIterator<Item = Hit>,
{
    let mut counts: BTreeMap<Hit, u64> = BTreeMap::new();
    for hit in hits {
        *counts.entry(hit).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(hit, count)| CountedHit { hit, count })
        .collect()
}

/// Optional per-attribute constraints a hit must all satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitMatcher {
    pub source: Option<Address>,
    pub destination: Option<Address>,
    pub service: Option<Service>,
}

/// An existing firewall rule.
pub type Rule = HitMatcher;

/// The operator's current view restriction.
pub type Filter = HitMatcher;

impl HitMatcher {
    /// Matcher without constraints; matches every hit.
    pub fn any() -> Self {
        Self::default()
    }

    /// Build from optional attribute texts. Missing, empty and `Any` mean
    /// "no constraint".
    pub fn parse(
        source: Option<&str>,
        destination: Option<&str>,
        service: Option<&str>,
    ) -> Result<Self, AttributeParseError> {
        Ok(Self {
            source: parse_constraint(source)?,
            destination: parse_constraint(destination)?,
            service: parse_constraint(service)?,
        })
    }

    pub fn is_any(&self) -> bool {
        self.source.is_none() && self.destination.is_none() && self.service.is_none()
    }

    /// Whether every constraint contains the hit's attribute. A constrained
    /// attribute that the hit lacks never matches.
    pub fn matches(&self, hit: &Hit) -> bool {
        constraint_holds(self.source, hit.source, |c, v| c.contains(v))
            && constraint_holds(self.destination, hit.destination, |c, v| c.contains(v))
            && constraint_holds(self.service, hit.service, |c, v| c.contains(v))
    }
}

fn parse_constraint<T>(text: Option<&str>) -> Result<Option<T>, AttributeParseError>
where
    T: std::str::FromStr<Err = AttributeParseError>,
{
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) if t.eq_ignore_ascii_case("any") => Ok(None),
        Some(t) => t.parse().map(Some),
    }
}

fn constraint_holds<T>(constraint: Option<T>, value: Option<T>, contains: impl Fn(&T, &T) -> bool) -> bool {
    match (constraint, value) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(c), Some(v)) => contains(&c, &v),
    }
}

/// Keep the hits that match `filter` and no rule in `rules`.
pub fn uncovered_hits(hits: Vec<CountedHit>, rules: &[Rule], filter: &Filter) -> Vec<CountedHit> {
    hits.into_iter()
        .filter(|h| filter.matches(&h.hit) && !rules.iter().any(|r| r.matches(&h.hit)))
        .collect()
}
