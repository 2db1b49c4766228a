//! Per-project store of analysis results, keyed by kind then device name.

use std::collections::BTreeMap;

use crate::error::{Result, WorkbenchError};
use crate::types::{AnalysisKind, AnalysisResult};

use super::registry::RenameHook;

#[derive(Debug, Default)]
pub struct AnalysisCache {
    maps: BTreeMap<AnalysisKind, BTreeMap<String, AnalysisResult>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, kind: AnalysisKind, device: &str) -> bool {
        self.maps
            .get(&kind)
            .is_some_and(|m| m.contains_key(device))
    }

    /// Store a result. Fails with `DuplicateResult` if the key exists.
    pub fn put(&mut self, kind: AnalysisKind, device: &str, mut result: AnalysisResult) -> Result<()> {
        let map = self.maps.entry(kind).or_default();
        if map.contains_key(device) {
            return Err(WorkbenchError::DuplicateResult {
                kind,
                device: device.to_string(),
            });
        }
        result.kind = kind;
        result.set_device_name(device);
        map.insert(device.to_string(), result);
        Ok(())
    }

    pub fn get(&self, kind: AnalysisKind, device: &str) -> Option<&AnalysisResult> {
        self.maps.get(&kind)?.get(device)
    }

    /// All `(kind, device)` keys in kind order
    pub fn keys(&self) -> impl Iterator<Item = (AnalysisKind, &str)> {
        self.maps
            .iter()
            .flat_map(|(kind, m)| m.keys().map(move |name| (*kind, name.as_str())))
    }

    /// Results of every kind for `device`
    pub fn results_for<'a>(&'a self, device: &'a str) -> impl Iterator<Item = &'a AnalysisResult> {
        self.maps.values().filter_map(move |m| m.get(device))
    }

    pub fn len(&self) -> usize {
        self.maps.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RenameHook for AnalysisCache {
    fn contains_key(&self, name: &str) -> bool {
        self.maps.values().any(|m| m.contains_key(name))
    }

    fn rename_key(&mut self, old: &str, new: &str) {
        for map in self.maps.values_mut() {
            if let Some(mut result) = map.remove(old) {
                result.set_device_name(new);
                map.insert(new.to_string(), result);
            }
        }
    }
}
