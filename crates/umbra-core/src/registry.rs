//! Module registry: ownership, lookup, and priority ordering.
//!
//! The registry owns every module for the whole life of the engine. Ids are
//! registration indices and names are unique, so a module can be referenced
//! either way. The iteration order is kept sorted by priority; the sort is
//! stable over registration order, so equal priorities keep the order in
//! which modules were registered.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::module::{Module, ModuleId, ModuleSlot, ModuleState};
use crate::params::ParamValue;
use crate::queue::ModuleRef;

/// Errors that can occur in registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No module is registered under this reference.
    #[error("unknown module {reference}")]
    UnknownModule {
        /// The reference that failed to resolve.
        reference: ModuleRef,
    },

    /// A module with this name already exists.
    #[error("module name \"{name}\" is already registered")]
    DuplicateName {
        /// The clashing name.
        name: String,
    },
}

/// All registered modules.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    /// Slots indexed by [`ModuleId`].
    slots: Vec<ModuleSlot>,

    /// Name -> id.
    by_name: BTreeMap<String, ModuleId>,

    /// Ids sorted by ascending priority, ties in registration order.
    order: Vec<ModuleId>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_name: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a module under a unique name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        module: Box<dyn Module>,
    ) -> Result<ModuleId, RegistryError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        Ok(self.register_reserved(name, module, 0))
    }

    /// Register an engine-owned module at a fixed priority.
    ///
    /// The caller guarantees `name` is not taken yet.
    pub(crate) fn register_reserved(
        &mut self,
        name: String,
        module: Box<dyn Module>,
        priority: i32,
    ) -> ModuleId {
        let id = ModuleId::new(self.slots.len());
        let mut slot = ModuleSlot::new(id, name.clone(), module);
        slot.set_priority(priority);
        self.by_name.insert(name, id);
        self.slots.push(slot);
        self.order.push(id);
        self.sort_order();
        id
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no module is registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Id registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<ModuleId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a reference to a registered id.
    pub fn resolve(&self, reference: &ModuleRef) -> Result<ModuleId, RegistryError> {
        let id = match reference {
            ModuleRef::Id(id) => Some(*id).filter(|id| id.index() < self.slots.len()),
            ModuleRef::Name(name) => self.lookup(name),
        };
        id.ok_or_else(|| RegistryError::UnknownModule {
            reference: reference.clone(),
        })
    }

    /// The slot for `id`.
    pub fn get(&self, id: ModuleId) -> Option<&ModuleSlot> {
        self.slots.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: ModuleId) -> Option<&mut ModuleSlot> {
        self.slots.get_mut(id.index())
    }

    fn slot_mut(&mut self, id: ModuleId) -> Result<&mut ModuleSlot, RegistryError> {
        self.slots
            .get_mut(id.index())
            .ok_or(RegistryError::UnknownModule {
                reference: ModuleRef::Id(id),
            })
    }

    /// State of `id`, if registered.
    pub fn state(&self, id: ModuleId) -> Option<ModuleState> {
        self.get(id).map(ModuleSlot::state)
    }

    /// Ids in update/render order.
    pub fn ordered(&self) -> &[ModuleId] {
        &self.order
    }

    /// Slots in update/render order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &ModuleSlot> {
        self.order.iter().filter_map(|id| self.get(*id))
    }

    /// Ids of modules in `state`, in update/render order.
    pub fn ids_in_state(&self, state: ModuleState) -> Vec<ModuleId> {
        self.iter_ordered()
            .filter(|slot| slot.state() == state)
            .map(ModuleSlot::id)
            .collect()
    }

    /// Whether any module is active or paused.
    pub fn any_running(&self) -> bool {
        self.slots.iter().any(|slot| slot.state().is_running())
    }

    /// Change a module's priority and re-sort.
    pub fn set_priority(&mut self, id: ModuleId, priority: i32) -> Result<(), RegistryError> {
        self.slot_mut(id)?.set_priority(priority);
        self.sort_order();
        Ok(())
    }

    /// Point `id`'s fallback at the module named `fallback`.
    ///
    /// The name is resolved now. An unknown name leaves the current fallback
    /// untouched and returns an error.
    pub fn set_fallback(&mut self, id: ModuleId, fallback: &str) -> Result<(), RegistryError> {
        let target = self.resolve(&ModuleRef::from(fallback))?;
        self.slot_mut(id)?.set_fallback(Some(target));
        Ok(())
    }

    /// Remove `id`'s fallback.
    pub fn clear_fallback(&mut self, id: ModuleId) -> Result<(), RegistryError> {
        self.slot_mut(id)?.set_fallback(None);
        Ok(())
    }

    /// Set or clear `id`'s timeout. Takes effect at the next activation.
    pub fn set_timeout(&mut self, id: ModuleId, timeout: Option<Duration>) -> Result<(), RegistryError> {
        self.slot_mut(id)?.set_timeout(timeout);
        Ok(())
    }

    /// Upsert a parameter of `id`.
    pub fn set_parameter(
        &mut self,
        id: ModuleId,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<(), RegistryError> {
        self.slot_mut(id)?.params_mut().set(name, value);
        Ok(())
    }

    /// Override the paused render policy for `id` (`None` = engine default).
    pub fn set_render_when_paused(
        &mut self,
        id: ModuleId,
        policy: Option<bool>,
    ) -> Result<(), RegistryError> {
        self.slot_mut(id)?.set_render_when_paused(policy);
        Ok(())
    }

    fn sort_order(&mut self) {
        let slots = &self.slots;
        self.order
            .sort_by_key(|id| (slots.get(id.index()).map_or(i32::MAX, ModuleSlot::priority), *id));
    }
}
