//! Lifetime ledger for geometry and shading resources.
//!
//! Every generated object owns `ResourceHandle`s. Dropping a handle releases
//! its id into the pool exactly once; the orchestrator forwards released ids
//! to the renderer so GPU objects can be freed on the next frame.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::api::types::ResourceId;

/// What a resource id refers to on the renderer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    Geometry,
    Material,
}

#[derive(Debug, Default)]
struct PoolState {
    next_id: u32,
    live: HashSet<ResourceId>,
    released: Vec<ResourceId>,
    allocated_total: u64,
    released_total: u64,
}

/// Shared allocator for resource ids. Cloning yields another handle to the same pool.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    state: Rc<RefCell<PoolState>>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new live resource.
    pub fn allocate(&self, kind: ResourceKind) -> ResourceHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = ResourceId(state.next_id);
        state.live.insert(id);
        state.allocated_total += 1;
        ResourceHandle {
            id,
            kind,
            pool: Rc::downgrade(&self.state),
        }
    }

    /// Number of resources currently alive.
    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.state.borrow().live.contains(&id)
    }

    pub fn allocated_total(&self) -> u64 {
        self.state.borrow().allocated_total
    }

    pub fn released_total(&self) -> u64 {
        self.state.borrow().released_total
    }

    /// Take the ids released since the last call.
    pub fn drain_released(&self) -> Vec<ResourceId> {
        std::mem::take(&mut self.state.borrow_mut().released)
    }
}

/// Owning handle to one resource. Not `Clone`: there is exactly one owner.
#[derive(Debug)]
pub struct ResourceHandle {
    id: ResourceId,
    kind: ResourceKind,
    pool: Weak<RefCell<PoolState>>,
}

impl ResourceHandle {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        let Some(state) = self.pool.upgrade() else {
            return;
        };
        let mut state = state.borrow_mut();
        if state.live.remove(&self.id) {
            state.released.push(self.id);
            state.released_total += 1;
        } else {
            log::warn!("resource {:?} released twice", self.id);
        }
    }
}
