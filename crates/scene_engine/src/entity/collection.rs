//! Mutation-safe ordered entity collection
//!
//! [`SafeCollection`] keeps a live member list that may be changed at any
//! time, plus a snapshot used while an update or draw pass runs. With the
//! secure cycle enabled the snapshot is refreshed before each pass, so an
//! entity may remove itself or a sibling (through a [`CollectionHandle`])
//! without disturbing the pass in progress; the change shows up on the next
//! pass. With the secure cycle disabled the pass walks the live list directly
//! and any mutation attempted meanwhile fails with
//! [`SceneError::CollectionBusy`].
//!
//! Entities added through a handle while a pass runs are queued and join
//! the collection when its owner calls [`SafeCollection::apply_pending`],
//! which brings them to the collection's lifecycle stage first.
//!
//! Members flagged with [`EntityCore::destroy`](super::EntityCore::destroy)
//! are swept out after every update pass.

use super::core::{lifecycle, Entity, EntityId};
use super::Shared;
use crate::assets::ContentLoader;
use crate::error::SceneError;
use crate::foundation::time::GameTime;
use crate::render::Renderer;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct Member<T: ?Sized> {
    id: EntityId,
    entity: Shared<T>,
}

impl<T: ?Sized> Clone for Member<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            entity: Rc::clone(&self.entity),
        }
    }
}

type MemberList<T> = Rc<RefCell<Vec<Member<T>>>>;
type PendingList<T> = Rc<RefCell<Vec<Shared<T>>>>;

/// Ordered, duplicate-free set of shared entities
pub struct SafeCollection<T: ?Sized + Entity> {
    live: MemberList<T>,
    pending: PendingList<T>,
    snapshot: Vec<Member<T>>,
    secure_cycle: bool,
    initialized: bool,
    assets_loaded: bool,
}

impl<T: ?Sized + Entity> SafeCollection<T> {
    /// Create an empty collection
    pub fn new(secure_cycle: bool) -> Self {
        Self {
            live: Rc::new(RefCell::new(Vec::new())),
            pending: Rc::new(RefCell::new(Vec::new())),
            snapshot: Vec::new(),
            secure_cycle,
            initialized: false,
            assets_loaded: false,
        }
    }

    /// Whether passes iterate a snapshot
    pub fn secure_cycle(&self) -> bool {
        self.secure_cycle
    }

    /// Toggle snapshot iteration
    pub fn set_secure_cycle(&mut self, secure_cycle: bool) {
        self.secure_cycle = secure_cycle;
    }

    /// Whether `initialize` ran on the collection
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether `load_content` ran on the collection
    pub fn is_assets_loaded(&self) -> bool {
        self.assets_loaded
    }

    /// Handle that can add and remove members while a pass is running
    pub fn handle(&self) -> CollectionHandle<T> {
        CollectionHandle {
            live: Rc::downgrade(&self.live),
            pending: Rc::downgrade(&self.pending),
        }
    }

    /// Append an entity
    ///
    /// Returns `Ok(false)` when the entity is already a member. If the
    /// collection has already been initialized or loaded, the new entity is
    /// brought to the same lifecycle stage before it joins; when that fails
    /// the error is returned and the collection is left unchanged.
    pub fn add(&mut self, entity: Shared<T>, content: &mut dyn ContentLoader) -> Result<bool, SceneError> {
        let id = entity.try_borrow().map_err(|_| SceneError::CollectionBusy)?.id();
        if self.live.try_borrow().map_err(|_| SceneError::CollectionBusy)?.iter().any(|member| member.id == id) {
            log::debug!("Entity {} is already in the collection", id);
            return Ok(false);
        }

        {
            let mut guard = entity.try_borrow_mut().map_err(|_| SceneError::CollectionBusy)?;
            if self.initialized {
                lifecycle::initialize(&mut *guard);
            }
            if self.assets_loaded {
                lifecycle::load_content(&mut *guard, content)?;
            }
        }

        self.live
            .try_borrow_mut()
            .map_err(|_| SceneError::CollectionBusy)?
            .push(Member { id, entity });
        Ok(true)
    }

    /// Move entities queued through a [`CollectionHandle`] into the collection
    ///
    /// Each one goes through [`SafeCollection::add`], so it is caught up on
    /// initialize/load first. An entity whose catch-up fails is dropped with a
    /// warning. Members are then asked to apply their own queues, so nested
    /// groups are handled by one call at the top. Returns the entities that
    /// joined this collection.
    pub fn apply_pending(&mut self, content: &mut dyn ContentLoader) -> Vec<Shared<T>> {
        let queued = self
            .pending
            .try_borrow_mut()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default();
        let mut joined = Vec::with_capacity(queued.len());
        for entity in queued {
            match self.add(Rc::clone(&entity), content) {
                Ok(true) => joined.push(entity),
                Ok(false) => {}
                Err(err) => log::warn!("Dropping queued entity: {}", err),
            }
        }

        for member in self.members() {
            if let Ok(mut entity) = member.try_borrow_mut() {
                entity.apply_pending(content);
            }
        }
        joined
    }

    /// Number of entities queued through handles
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Remove the member with the given id
    pub fn remove(&mut self, id: EntityId) -> Result<bool, SceneError> {
        remove_member(&self.live, id)
    }

    /// Remove every member and drop queued additions
    pub fn clear(&mut self) -> Result<(), SceneError> {
        self.live.try_borrow_mut().map_err(|_| SceneError::CollectionBusy)?.clear();
        self.pending.borrow_mut().clear();
        Ok(())
    }

    /// Member at `index` in insertion order
    pub fn get(&self, index: usize) -> Result<Shared<T>, SceneError> {
        let live = self.live.borrow();
        live.get(index)
            .map(|member| Rc::clone(&member.entity))
            .ok_or(SceneError::IndexOutOfRange { index, len: live.len() })
    }

    /// Member with the given id
    pub fn find(&self, id: EntityId) -> Option<Shared<T>> {
        self.live
            .borrow()
            .iter()
            .find(|member| member.id == id)
            .map(|member| Rc::clone(&member.entity))
    }

    /// Whether an entity with the given id is a member
    pub fn contains(&self, id: EntityId) -> bool {
        self.live.borrow().iter().any(|member| member.id == id)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.live.borrow().len()
    }

    /// Whether the collection has no members
    pub fn is_empty(&self) -> bool {
        self.live.borrow().is_empty()
    }

    /// Members in insertion order
    pub fn members(&self) -> Vec<Shared<T>> {
        self.live.borrow().iter().map(|member| Rc::clone(&member.entity)).collect()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> Vec<EntityId> {
        self.live.borrow().iter().map(|member| member.id).collect()
    }

    /// Run `initialize` on every member that has not been initialized
    pub fn initialize(&mut self) {
        for member in self.members() {
            if let Ok(mut entity) = member.try_borrow_mut() {
                lifecycle::initialize(&mut *entity);
            }
        }
        self.initialized = true;
    }

    /// Run `load_content` on every member whose assets are not loaded
    ///
    /// Stops at the first failing member; members after it stay unloaded and
    /// are picked up by the next call.
    pub fn load_content(&mut self, content: &mut dyn ContentLoader) -> Result<(), SceneError> {
        for member in self.members() {
            let mut entity = member.try_borrow_mut().map_err(|_| SceneError::CollectionBusy)?;
            lifecycle::load_content(&mut *entity, content)?;
        }
        self.assets_loaded = true;
        Ok(())
    }

    /// Run `unload_content` on every member
    pub fn unload_content(&mut self) {
        for member in self.members() {
            if let Ok(mut entity) = member.try_borrow_mut() {
                lifecycle::unload_content(&mut *entity);
            }
        }
        self.assets_loaded = false;
    }

    /// Update every enabled member, then drop destroyed ones
    ///
    /// Returns the destroyed members that were swept out, so an owner can
    /// unlink them.
    pub fn update(&mut self, time: &GameTime) -> Vec<Shared<T>> {
        if self.secure_cycle {
            self.take_snapshot();
            for member in &self.snapshot {
                update_member(member, time);
            }
            self.snapshot.clear();
        } else {
            let live = self.live.borrow();
            for member in live.iter() {
                update_member(member, time);
            }
        }
        self.sweep()
    }

    /// Draw every visible member
    pub fn draw(&mut self, time: &GameTime, renderer: &mut dyn Renderer) {
        if self.secure_cycle {
            self.take_snapshot();
            for member in &self.snapshot {
                draw_member(member, time, renderer);
            }
            self.snapshot.clear();
        } else {
            let live = self.live.borrow();
            for member in live.iter() {
                draw_member(member, time, renderer);
            }
        }
    }

    fn take_snapshot(&mut self) {
        self.snapshot.clear();
        self.snapshot.extend(self.live.borrow().iter().cloned());
    }

    fn sweep(&mut self) -> Vec<Shared<T>> {
        let Ok(mut live) = self.live.try_borrow_mut() else {
            return Vec::new();
        };
        let mut swept = Vec::new();
        live.retain(|member| {
            let dirty = member.entity.try_borrow().is_ok_and(|entity| entity.core().is_dirty());
            if dirty {
                swept.push(Rc::clone(&member.entity));
            }
            !dirty
        });
        if !swept.is_empty() {
            log::debug!("Swept {} destroyed entities from collection", swept.len());
        }
        swept
    }
}

fn update_member<T: ?Sized + Entity>(member: &Member<T>, time: &GameTime) {
    match member.entity.try_borrow_mut() {
        Ok(mut entity) => {
            if entity.core().is_active() {
                entity.update(time);
            }
        }
        Err(_) => log::warn!("Skipping update of entity {}: already borrowed", member.id),
    }
}

fn draw_member<T: ?Sized + Entity>(member: &Member<T>, time: &GameTime, renderer: &mut dyn Renderer) {
    match member.entity.try_borrow_mut() {
        Ok(mut entity) => {
            if entity.core().is_drawable() {
                entity.draw(time, renderer);
            }
        }
        Err(_) => log::warn!("Skipping draw of entity {}: already borrowed", member.id),
    }
}

fn remove_member<T: ?Sized>(live: &RefCell<Vec<Member<T>>>, id: EntityId) -> Result<bool, SceneError> {
    let mut live = live.try_borrow_mut().map_err(|_| SceneError::CollectionBusy)?;
    match live.iter().position(|member| member.id == id) {
        Some(index) => {
            live.remove(index);
            Ok(true)
        }
        None => Ok(false),
    }
}

impl<T: ?Sized + Entity> Default for SafeCollection<T> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<T: ?Sized + Entity> fmt::Debug for SafeCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = self.live.try_borrow().map(|live| live.iter().map(|m| m.id).collect::<Vec<_>>());
        f.debug_struct("SafeCollection")
            .field("members", &ids.unwrap_or_default())
            .field("secure_cycle", &self.secure_cycle)
            .field("initialized", &self.initialized)
            .field("assets_loaded", &self.assets_loaded)
            .finish()
    }
}

/// Weak handle for removing members from inside an update pass
///
/// Entities receive only `&GameTime` during update, so a handle captured at
/// construction time is how they reach their own collection.
pub struct CollectionHandle<T: ?Sized> {
    live: Weak<RefCell<Vec<Member<T>>>>,
    pending: Weak<RefCell<Vec<Shared<T>>>>,
}

impl<T: ?Sized> Clone for CollectionHandle<T> {
    fn clone(&self) -> Self {
        Self {
            live: Weak::clone(&self.live),
            pending: Weak::clone(&self.pending),
        }
    }
}

impl<T: ?Sized + Entity> CollectionHandle<T> {
    /// Queue an entity to join on the owner's next [`SafeCollection::apply_pending`]
    ///
    /// Returns `Ok(false)` when it is already a member or already queued, or
    /// when the collection is gone.
    pub fn add(&self, entity: Shared<T>) -> Result<bool, SceneError> {
        let Some(pending) = self.pending.upgrade() else {
            return Ok(false);
        };
        let id = entity.try_borrow().map_err(|_| SceneError::CollectionBusy)?.id();
        let mut pending = pending.try_borrow_mut().map_err(|_| SceneError::CollectionBusy)?;
        let queued = pending
            .iter()
            .any(|other| other.try_borrow().is_ok_and(|other| other.id() == id));
        if queued || self.contains(id) {
            return Ok(false);
        }
        pending.push(entity);
        Ok(true)
    }

    /// Remove a member or a queued addition; `Ok(false)` if absent or the collection is gone
    pub fn remove(&self, id: EntityId) -> Result<bool, SceneError> {
        let Some(live) = self.live.upgrade() else {
            return Ok(false);
        };
        if remove_member(&live, id)? {
            return Ok(true);
        }
        Ok(self.remove_queued(id))
    }

    fn remove_queued(&self, id: EntityId) -> bool {
        let Some(pending) = self.pending.upgrade() else {
            return false;
        };
        let Ok(mut pending) = pending.try_borrow_mut() else {
            return false;
        };
        let before = pending.len();
        pending.retain(|entity| entity.try_borrow().map_or(true, |entity| entity.id() != id));
        pending.len() != before
    }

    /// Whether the member is present
    pub fn contains(&self, id: EntityId) -> bool {
        self.live
            .upgrade()
            .and_then(|live| live.try_borrow().ok().map(|list| list.iter().any(|m| m.id == id)))
            .unwrap_or(false)
    }

    /// Current member count, 0 when the collection is gone
    pub fn len(&self) -> usize {
        self.live
            .upgrade()
            .and_then(|live| live.try_borrow().ok().map(|list| list.len()))
            .unwrap_or(0)
    }

    /// Whether the collection is empty or gone
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> fmt::Debug for CollectionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("alive", &(self.live.strong_count() > 0))
            .finish()
    }
}
