//! Generation-checked handles to windows owned by the presentation layer.
//!
//! The core never owns a window.  It holds a [`WindowId`]: a slot index plus
//! the generation of that slot at the time the window was registered.  When
//! a window is destroyed its slot's generation advances, so every old handle
//! to it stops resolving even after the slot is reused.

use crate::traits::{LocalWindow, LocalWindows, ShellEvent, WindowControl};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

/// Non-owning handle to a window.
///
/// On the wire it is a single integer: `generation << 32 | index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct WindowId {
    index: u32,
    generation: u32,
}

impl From<u64> for WindowId {
    fn from(raw: u64) -> Self {
        Self {
            index: raw as u32,
            generation: (raw >> 32) as u32,
        }
    }
}

impl From<WindowId> for u64 {
    fn from(id: WindowId) -> Self {
        (u64::from(id.generation) << 32) | u64::from(id.index)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with generation-checked access.
#[derive(Debug)]
pub struct WindowArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for WindowArena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> WindowArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> WindowId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return WindowId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        WindowId { index, generation: 0 }
    }

    /// Remove the value behind `id`.  Stale handles return `None`.
    pub fn remove(&mut self, id: WindowId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation || slot.value.is_none() {
            return None;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        slot.value.take()
    }

    pub fn get(&self, id: WindowId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.value.as_mut())
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.get(id).is_some()
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (WindowId, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| {
                (
                    WindowId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    v,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//  Window table

/// What the presentation layer is asked to do with one of its windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAction {
    Show,
    Raise,
    Focus,
    Close,
}

/// The core's view of one presentation-layer window.
#[derive(Debug, Clone)]
struct WindowState {
    title: String,
    visible: bool,
}

/// Errors from acting on a window handle.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("stale window handle {0:?}")]
    Stale(WindowId),
}

/// Table of the windows the presentation layer has reported.
///
/// Cloning yields another handle to the same table; both the registry and
/// the snapshot builder hold one.  The table lives on the owner thread only.
///
/// Window actions update the recorded state and are forwarded as
/// [`ShellEvent::Window`] requests, since the windows themselves belong to
/// the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct WindowTable {
    arena: Rc<RefCell<WindowArena<WindowState>>>,
    requests: Option<mpsc::Sender<ShellEvent>>,
}

impl WindowTable {
    /// A table that does not forward window requests anywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that forwards window requests into `requests`.
    pub fn with_requests(requests: mpsc::Sender<ShellEvent>) -> Self {
        Self {
            arena: Rc::default(),
            requests: Some(requests),
        }
    }

    /// Record a newly created window.
    pub fn open(&self, title: &str, visible: bool) -> WindowId {
        let id = self.arena.borrow_mut().insert(WindowState {
            title: title.to_string(),
            visible,
        });
        debug!("window {:?} opened: {:?}", id, title);
        id
    }

    /// Update title and visibility of a known window.
    pub fn update(&self, id: WindowId, title: &str, visible: bool) -> Result<(), WindowError> {
        let mut arena = self.arena.borrow_mut();
        let state = arena.get_mut(id).ok_or(WindowError::Stale(id))?;
        state.title = title.to_string();
        state.visible = visible;
        Ok(())
    }

    /// Forget a destroyed window.  Returns whether the handle was live.
    pub fn destroy(&self, id: WindowId) -> bool {
        let removed = self.arena.borrow_mut().remove(id).is_some();
        if removed {
            debug!("window {:?} destroyed", id);
        }
        removed
    }

    fn request(&self, window: WindowId, action: WindowAction) {
        if let Some(tx) = &self.requests {
            let _ = tx.send(ShellEvent::Window { window, action });
        }
    }

    fn check(&self, id: WindowId) -> Result<(), WindowError> {
        if self.arena.borrow().contains(id) {
            Ok(())
        } else {
            Err(WindowError::Stale(id))
        }
    }
}

impl WindowControl for WindowTable {
    type Error = WindowError;

    fn is_alive(&self, window: WindowId) -> bool {
        self.arena.borrow().contains(window)
    }

    fn is_visible(&self, window: WindowId) -> Result<bool, WindowError> {
        self.arena
            .borrow()
            .get(window)
            .map(|s| s.visible)
            .ok_or(WindowError::Stale(window))
    }

    fn show(&self, window: WindowId) -> Result<(), WindowError> {
        {
            let mut arena = self.arena.borrow_mut();
            let state = arena.get_mut(window).ok_or(WindowError::Stale(window))?;
            state.visible = true;
        }
        self.request(window, WindowAction::Show);
        Ok(())
    }

    fn raise(&self, window: WindowId) -> Result<(), WindowError> {
        self.check(window)?;
        self.request(window, WindowAction::Raise);
        Ok(())
    }

    fn focus(&self, window: WindowId) -> Result<(), WindowError> {
        self.check(window)?;
        self.request(window, WindowAction::Focus);
        Ok(())
    }

    fn close(&self, window: WindowId) -> Result<(), WindowError> {
        self.check(window)?;
        self.request(window, WindowAction::Close);
        Ok(())
    }
}

impl LocalWindows for WindowTable {
    fn local_windows(&self) -> Vec<LocalWindow> {
        self.arena
            .borrow()
            .iter()
            .map(|(id, s)| LocalWindow {
                id,
                title: s.title.clone(),
                visible: s.visible,
            })
            .collect()
    }
}
