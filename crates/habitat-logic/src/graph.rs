//! Undirected module graph built from connections.
//!
//! `ConnectionGraph` is rebuilt from scratch whenever it's needed; it holds
//! no state between validation calls.

use crate::layout::Connection;
use std::collections::{HashMap, HashSet, VecDeque};

/// Adjacency list over main-module instance ids.
#[derive(Debug, Default)]
pub struct ConnectionGraph<'a> {
    /// module_id → neighbouring module_ids (one entry per connection)
    adj: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> ConnectionGraph<'a> {
    /// Build from connections. Each connection is usable in both directions.
    pub fn from_connections(connections: &'a [Connection]) -> Self {
        let mut adj: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        for c in connections {
            adj.entry(c.from_module_id.as_str())
                .or_default()
                .push(c.to_module_id.as_str());
            adj.entry(c.to_module_id.as_str())
                .or_default()
                .push(c.from_module_id.as_str());
        }
        Self { adj }
    }

    pub fn neighbors(&self, module_id: &str) -> &[&'a str] {
        self.adj.get(module_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every id reachable from `start`, including `start` itself.
    ///
    /// Ids that only appear in connections (dangling references) are still
    /// traversed; callers filter against the placed modules.
    pub fn reachable_from(&self, start: &'a str) -> HashSet<&'a str> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for &next in self.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited
    }
}
