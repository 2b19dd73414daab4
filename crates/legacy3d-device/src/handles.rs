//! Integer handles for textures and materials, and backend light indices for
//! legacy light objects.
//!
//! Tables are small (tens of entries), so reverse lookups are linear scans.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::collab::{object_addr, same_object, LightObject};
use crate::error::{DeviceError, DeviceResult};

/// Largest backend light index handed out to legacy light objects.
pub const MAX_LIGHT_INDEX: u32 = 255;

#[derive(Debug)]
pub struct HandleTable<T: ?Sized> {
    by_handle: HashMap<u32, Arc<T>>,
}

impl<T: ?Sized> Default for HandleTable<T> {
    fn default() -> Self {
        Self {
            by_handle: HashMap::new(),
        }
    }
}

impl<T: ?Sized> HandleTable<T> {
    /// Maps `handle` to `obj`, replacing any previous owner of the handle.
    pub fn set(&mut self, handle: u32, obj: Option<&Arc<T>>) -> DeviceResult<()> {
        let obj = match obj {
            Some(obj) if handle != 0 => obj,
            _ => return Err(DeviceError::InvalidParams),
        };
        self.by_handle.insert(handle, Arc::clone(obj));
        Ok(())
    }

    pub fn get(&self, handle: u32) -> Option<&Arc<T>> {
        self.by_handle.get(&handle)
    }

    pub fn contains(&self, handle: u32) -> bool {
        self.by_handle.contains_key(&handle)
    }

    /// First handle currently mapped to `obj`.
    pub fn handle_of(&self, obj: &Arc<T>) -> Option<u32> {
        self.by_handle
            .iter()
            .find(|(_, v)| same_object(v, obj))
            .map(|(&h, _)| h)
    }

    pub fn remove(&mut self, handle: u32) -> Option<Arc<T>> {
        self.by_handle.remove(&handle)
    }

    /// Drops every mapping that refers to `obj`. Returns the number removed.
    pub fn release_object(&mut self, obj: &Arc<T>) -> usize {
        let before = self.by_handle.len();
        self.by_handle.retain(|_, v| !same_object(v, obj));
        before - self.by_handle.len()
    }

    /// Exchanges the handles of two mapped objects and returns `(handle_a, handle_b)`
    /// as they were before the swap.
    pub fn swap(&mut self, a: &Arc<T>, b: &Arc<T>) -> DeviceResult<(u32, u32)> {
        let (Some(ha), Some(hb)) = (self.handle_of(a), self.handle_of(b)) else {
            return Err(DeviceError::InvalidParams);
        };
        self.by_handle.insert(ha, Arc::clone(b));
        self.by_handle.insert(hb, Arc::clone(a));
        Ok((ha, hb))
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_handle.clear();
    }
}

/// Assigns backend light indices to legacy light objects.
///
/// Indices start at 1 and grow monotonically; released indices go on a free
/// list and are reused before the counter advances. An object keeps its index
/// until it is released.
#[derive(Default)]
pub struct LightIndexMap {
    by_object: HashMap<usize, (Arc<dyn LightObject>, u32)>,
    free: Vec<u32>,
    next: u32,
}

impl LightIndexMap {
    pub fn index_of(&self, light: &Arc<dyn LightObject>) -> Option<u32> {
        self.by_object.get(&object_addr(light)).map(|&(_, index)| index)
    }

    /// Returns the light's index, assigning one on first use.
    pub fn index_for(&mut self, light: &Arc<dyn LightObject>) -> DeviceResult<u32> {
        if let Some(index) = self.index_of(light) {
            return Ok(index);
        }
        let index = match self.free.pop() {
            Some(index) => index,
            None if self.next < MAX_LIGHT_INDEX => {
                self.next += 1;
                self.next
            }
            None => {
                tracing::warn!(live = self.by_object.len(), "out of light indices");
                return Err(DeviceError::Generic);
            }
        };
        self.by_object
            .insert(object_addr(light), (Arc::clone(light), index));
        Ok(index)
    }

    /// Forgets the light and returns the index it held.
    pub fn release(&mut self, light: &Arc<dyn LightObject>) -> Option<u32> {
        let (_, index) = self.by_object.remove(&object_addr(light))?;
        self.free.push(index);
        Some(index)
    }

    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_object.values().map(|&(_, index)| index)
    }

    pub fn len(&self) -> usize {
        self.by_object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_object.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_object.clear();
        self.free.clear();
        self.next = 0;
    }
}
