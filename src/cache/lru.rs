//! Recency Order Index Module
//!
//! Doubly-linked ordering over resident keys, from least- to most-recently
//! used, with O(1) append, move-to-tail, remove, and evict-head.
//!
//! Nodes live in a `Vec` arena and link to each other by index, with a
//! free-list recycling vacated slots. No node ever holds a reference to
//! another node, so removal is a pure index update.

use std::mem;

/// Sentinel value for null links.
const SENTINEL: usize = usize::MAX;

// == Order Node ==
/// One resident key's position in recency order.
#[derive(Debug)]
struct Node {
    /// The key this node tracks; emptied when the slot is on the free list
    key: String,
    /// Less recently used neighbor
    prev: usize,
    /// More recently used neighbor
    next: usize,
}

// == Order Index ==
/// Tracks access order for LRU eviction.
///
/// Head = least recently used, tail = most recently used. Handles returned
/// by [`push_tail`](Self::push_tail) stay valid until the node is removed.
#[derive(Debug, Default)]
pub struct OrderIndex {
    /// Arena of nodes
    nodes: Vec<Node>,
    /// Least recently used node
    head: usize,
    /// Most recently used node
    tail: usize,
    /// Head of the free-list threaded through `next`
    free_head: usize,
    /// Number of live nodes
    len: usize,
}

impl OrderIndex {
    // == Constructor ==
    /// Creates a new empty order index.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: SENTINEL,
            tail: SENTINEL,
            free_head: SENTINEL,
            len: 0,
        }
    }

    // == Push Tail ==
    /// Appends a key as the most recently used and returns its handle.
    pub fn push_tail(&mut self, key: String) -> usize {
        let idx = match self.free_head {
            SENTINEL => {
                self.nodes.push(Node {
                    key,
                    prev: SENTINEL,
                    next: SENTINEL,
                });
                self.nodes.len() - 1
            }
            free => {
                self.free_head = self.nodes[free].next;
                self.nodes[free] = Node {
                    key,
                    prev: SENTINEL,
                    next: SENTINEL,
                };
                free
            }
        };

        self.link_tail(idx);
        self.len += 1;
        idx
    }

    // == Move To Tail ==
    /// Marks the node as most recently used.
    pub fn move_to_tail(&mut self, idx: usize) {
        if self.tail == idx {
            return;
        }
        self.unlink(idx);
        self.link_tail(idx);
    }

    // == Remove ==
    /// Removes a node and returns its key, recycling the slot.
    pub fn remove(&mut self, idx: usize) -> String {
        self.unlink(idx);
        self.len -= 1;

        let key = mem::take(&mut self.nodes[idx].key);
        self.nodes[idx].next = self.free_head;
        self.nodes[idx].prev = SENTINEL;
        self.free_head = idx;
        key
    }

    // == Evict Head ==
    /// Removes and returns the least recently used key.
    ///
    /// Returns None if the index is empty.
    pub fn pop_head(&mut self) -> Option<String> {
        match self.head {
            SENTINEL => None,
            head => Some(self.remove(head)),
        }
    }

    // == Peek Head ==
    /// Returns the least recently used key without removing it.
    pub fn peek_head(&self) -> Option<&str> {
        match self.head {
            SENTINEL => None,
            head => Some(&self.nodes[head].key),
        }
    }

    // == Iteration ==
    /// Iterates keys from least- to most-recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let mut cursor = self.head;
        std::iter::from_fn(move || match cursor {
            SENTINEL => None,
            idx => {
                cursor = self.nodes[idx].next;
                Some(self.nodes[idx].key.as_str())
            }
        })
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops all nodes and recycled slots.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = SENTINEL;
        self.tail = SENTINEL;
        self.free_head = SENTINEL;
        self.len = 0;
    }

    // == Private Helpers ==
    /// Detaches a node from its neighbors, fixing head/tail.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);

        match prev {
            SENTINEL => self.head = next,
            p => self.nodes[p].next = next,
        }
        match next {
            SENTINEL => self.tail = prev,
            n => self.nodes[n].prev = prev,
        }

        self.nodes[idx].prev = SENTINEL;
        self.nodes[idx].next = SENTINEL;
    }

    /// Attaches a detached node at the tail.
    fn link_tail(&mut self, idx: usize) {
        self.nodes[idx].prev = self.tail;
        self.nodes[idx].next = SENTINEL;

        match self.tail {
            SENTINEL => self.head = idx,
            t => self.nodes[t].next = idx,
        }
        self.tail = idx;
    }
}
