//! Device registry: unique names to devices, with atomic rename.

use std::collections::BTreeMap;

use crate::error::{Result, WorkbenchError};
use crate::types::{Device, DeviceKind};

/// A mapping keyed by device name that must follow renames
pub trait RenameHook {
    fn contains_key(&self, name: &str) -> bool;

    /// Move every entry under `old` to `new`. Only called after
    /// [`contains_key`](Self::contains_key) returned false for `new`.
    fn rename_key(&mut self, old: &str, new: &str);
}

/// Devices of one project keyed by their unique name
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<String, Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.devices.contains_key(name)
    }

    /// Name a Model device would get: `"<base> <n>"` with the first free 1-based `n`
    pub fn next_model_name(&self, base: &str) -> String {
        let mut ordinal = 1 + self
            .devices
            .iter()
            .filter(|(name, d)| d.kind == DeviceKind::Model && has_base(name, base))
            .count();
        loop {
            let candidate = format!("{} {}", base, ordinal);
            if !self.contains(&candidate) {
                return candidate;
            }
            ordinal += 1;
        }
    }

    /// Insert `device` and return the name it was stored under.
    ///
    /// Data devices keep `desired_name` and fail with `NameCollision` if it is
    /// taken. Model devices get an ordinal suffix.
    pub fn insert(&mut self, mut device: Device, desired_name: &str, kind: DeviceKind) -> Result<String> {
        let name = match kind {
            DeviceKind::Data => {
                if self.contains(desired_name) {
                    return Err(WorkbenchError::NameCollision(desired_name.to_string()));
                }
                desired_name.to_string()
            }
            DeviceKind::Model => self.next_model_name(desired_name),
        };
        device.name = name.clone();
        device.kind = kind;
        self.devices.insert(name.clone(), device);
        Ok(name)
    }

    pub fn get(&self, name: &str) -> Result<&Device> {
        self.devices
            .get(name)
            .ok_or_else(|| WorkbenchError::UnknownDevice(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Device> {
        self.devices
            .get_mut(name)
            .ok_or_else(|| WorkbenchError::UnknownDevice(name.to_string()))
    }

    /// Devices in name order
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Whether renaming to `new` would collide here or in any hook
    pub fn check_rename(&self, old: &str, new: &str, hooks: &[&dyn RenameHook]) -> Result<()> {
        if !self.contains(old) {
            return Err(WorkbenchError::UnknownDevice(old.to_string()));
        }
        if old == new {
            return Ok(());
        }
        if self.contains(new) || hooks.iter().any(|h| h.contains_key(new)) {
            return Err(WorkbenchError::NameCollision(new.to_string()));
        }
        Ok(())
    }

    /// Rename `old` to `new` here and in every hook.
    ///
    /// All collisions are checked before anything moves, so either every
    /// mapping is renamed or none is.
    pub fn rename(&mut self, old: &str, new: &str, hooks: &mut [&mut dyn RenameHook]) -> Result<()> {
        {
            let views: Vec<&dyn RenameHook> = hooks.iter().map(|h| &**h).collect();
            self.check_rename(old, new, &views)?;
        }
        if old == new {
            return Ok(());
        }

        if let Some(mut device) = self.devices.remove(old) {
            device.name = new.to_string();
            self.devices.insert(new.to_string(), device);
        }
        for hook in hooks.iter_mut() {
            hook.rename_key(old, new);
        }
        tracing::info!("Renamed device '{}' to '{}'", old, new);
        Ok(())
    }
}

fn has_base(name: &str, base: &str) -> bool {
    name.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix(' '))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}
