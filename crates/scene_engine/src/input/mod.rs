//! Pointer input resolution
//!
//! The host feeds raw pointer position and button state into a
//! [`PointerState`] once per frame. [`apply_pointer`] then hit-tests every
//! 2D entity of a collection (children included) and stores the outcome in
//! [`EntityCore::pointer`](crate::entity::EntityCore), so entities read
//! resolved over/entered/left/clicked flags during their update instead of
//! subscribing to events.

use crate::entity::{Entity2D, SafeCollection};
use crate::foundation::math::Vec2;

/// Pointer state tracked across frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    position: Vec2,
    primary_down: bool,
    pressed_this_frame: bool,
    released_this_frame: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    /// Pointer at the origin with no button held
    pub fn new() -> Self {
        Self {
            position: Vec2::zeros(),
            primary_down: false,
            pressed_this_frame: false,
            released_this_frame: false,
        }
    }

    /// Update pointer position in screen coordinates
    pub fn update_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Update primary button state
    pub fn update_primary(&mut self, down: bool) {
        let was_down = self.primary_down;
        self.primary_down = down;
        self.pressed_this_frame = !was_down && down;
        self.released_this_frame = was_down && !down;
    }

    /// Reset per-frame flags (call after the frame's pointer resolution)
    pub fn end_frame(&mut self) {
        self.pressed_this_frame = false;
        self.released_this_frame = false;
    }

    /// Current position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the primary button is held
    pub fn primary_down(&self) -> bool {
        self.primary_down
    }

    /// Whether the primary button went down this frame
    pub fn pressed_this_frame(&self) -> bool {
        self.pressed_this_frame
    }

    /// Whether the primary button came up this frame
    pub fn released_this_frame(&self) -> bool {
        self.released_this_frame
    }
}

/// Resolved pointer interaction for one entity and one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerStatus {
    /// Pointer is over the entity
    pub over: bool,
    /// Pointer moved onto the entity this frame
    pub entered: bool,
    /// Pointer moved off the entity this frame
    pub left: bool,
    /// Primary button is held while over the entity
    pub pressed: bool,
    /// Primary button was pressed and released over the entity
    pub clicked: bool,
}

impl PointerStatus {
    /// Next status given whether the pointer is over the entity now
    pub fn resolve(previous: PointerStatus, over: bool, pointer: &PointerState) -> Self {
        Self {
            over,
            entered: over && !previous.over,
            left: !over && previous.over,
            pressed: over && pointer.primary_down(),
            clicked: over && pointer.released_this_frame() && previous.pressed,
        }
    }
}

/// Hit-test every entity in `collection` and store the results
///
/// Disabled, destroyed and non-collidable entities are never "over". Groups
/// are tested against their own rectangle and then recursed into.
pub fn apply_pointer(pointer: &PointerState, collection: &SafeCollection<dyn Entity2D>) {
    for member in collection.members() {
        let Ok(mut entity) = member.try_borrow_mut() else {
            log::warn!("Skipping pointer resolution for a borrowed entity");
            continue;
        };
        let core = entity.core();
        let eligible = core.collidable && core.is_active();
        let previous = core.pointer;
        let over = eligible && entity.rectangle().contains_point(pointer.position());
        entity.core_mut().pointer = PointerStatus::resolve(previous, over, pointer);

        if let Some(children) = entity.children() {
            apply_pointer(pointer, children);
        }
    }
}
