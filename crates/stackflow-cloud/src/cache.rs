//! Caller-owned cache of stack outputs

use crate::api::StackApi;
use crate::clock::Clock;
use crate::error::Result;
use crate::runner::Runner;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Outputs of each stack, fetched once until invalidated.
///
/// There is no global instance; whoever needs the cache owns it.
#[derive(Debug, Default)]
pub struct OutputCache {
    entries: HashMap<String, BTreeMap<String, String>>,
}

impl OutputCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch<A: StackApi, C: Clock>(
        &mut self,
        runner: &Runner<A, C>,
        name: &str,
    ) -> Result<&BTreeMap<String, String>> {
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => {
                let outputs = runner.describe_outputs(name).await?;
                tracing::debug!(stack = name, outputs = outputs.len(), "cached stack outputs");
                Ok(&*entry.insert(outputs))
            }
        }
    }

    /// Look up one output, fetching the stack's outputs if not cached
    pub async fn value<A: StackApi, C: Clock>(
        &mut self,
        runner: &Runner<A, C>,
        name: &str,
        key: &str,
    ) -> Result<Option<String>> {
        Ok(self.get_or_fetch(runner, name).await?.get(key).cloned())
    }

    pub fn get(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.entries.get(name)
    }

    /// Drop one stack's entry; returns whether it was cached
    pub fn invalidate(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
