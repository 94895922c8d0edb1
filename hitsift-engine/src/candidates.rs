//! Candidate subnet groups with O(1) splicing.
//!
//! Every trie node carries the group of subnets that realizes its compression
//! cost. When a node stays split, its group is the concatenation of its two
//! children's groups. Copying those lists at every merge would make the
//! compressor quadratic, so groups are intrusive singly-linked lists of
//! indices into one shared arena and a splice only rewires a `next` link.

use crate::address::Address;

/// A subnet proposed as one firewall rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateSuggestion {
    pub subnet: Address,
    /// Hits covered by the subnet.
    pub size: u64,
    /// Reciprocal of the compression cost of the subtree the subnet stands for.
    pub score: f64,
}

#[derive(Debug)]
struct Entry {
    candidate: CandidateSuggestion,
    next: Option<usize>,
}

/// Backing storage for all candidate groups of one compression run.
///
/// Entries of groups discarded by a union decision stay allocated until the
/// arena is dropped; at most `2n - 1` entries are ever created for `n` leaves.
#[derive(Debug, Default)]
pub struct CandidateArena {
    entries: Vec<Entry>,
}

/// A non-empty, ordered group of candidates living in a [`CandidateArena`].
///
/// Deliberately neither `Clone` nor `Copy`: splicing consumes the donor group,
/// so no two groups ever share a tail.
#[derive(Debug, PartialEq, Eq)]
pub struct CandidateGroup {
    head: usize,
    tail: usize,
    len: usize,
}

impl CandidateArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of entries ever allocated.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocate a group holding exactly one candidate.
    pub fn singleton(&mut self, candidate: CandidateSuggestion) -> CandidateGroup {
        let index = self.entries.len();
        self.entries.push(Entry {
            candidate,
            next: None,
        });
        CandidateGroup {
            head: index,
            tail: index,
            len: 1,
        }
    }

    /// Iterate a group's candidates in order.
    pub fn iter<'a>(&'a self, group: &CandidateGroup) -> CandidateIter<'a> {
        CandidateIter {
            arena: self,
            cursor: Some(group.head),
            remaining: group.len,
        }
    }

    /// Materialize a group as an owned list.
    pub fn to_list(&self, group: &CandidateGroup) -> Vec<CandidateSuggestion> {
        let mut list = Vec::with_capacity(group.len);
        list.extend(self.iter(group).copied());
        list
    }
}

impl CandidateGroup {
    pub fn len(&self) -> usize {
        self.len
    }

    /// Groups are never empty; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append all of `other` after this group's own elements, consuming it.
    pub fn splice_from(&mut self, other: CandidateGroup, arena: &mut CandidateArena) {
        arena.entries[self.tail].next = Some(other.head);
        self.tail = other.tail;
        self.len += other.len;
    }
}

/// Iterator over one group's candidates.
pub struct CandidateIter<'a> {
    arena: &'a CandidateArena,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for CandidateIter<'a> {
    type Item = &'a CandidateSuggestion;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = &self.arena.entries[self.cursor?];
        self.cursor = entry.next;
        self.remaining -= 1;
        Some(&entry.candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
