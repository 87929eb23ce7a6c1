use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::input::{PointerEvent, PointerEventKind};
use crate::viewport::SurfaceRect;

/// Pointer listener registered on a render surface.
///
/// Surfaces compare listeners by `Rc` pointer identity, so removing a
/// listener requires the same `Rc` that was added.
pub type Listener = Rc<dyn Fn(&PointerEvent)>;

/// Cursor shown over the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    Inherit,
    Default,
    Pointer,
    Crosshair,
    Grab,
    NotAllowed,
}

impl CursorStyle {
    /// CSS keyword for this cursor.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inherit => "inherit",
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Crosshair => "crosshair",
            Self::Grab => "grab",
            Self::NotAllowed => "not-allowed",
        }
    }
}

impl fmt::Display for CursorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The element pointer events arrive on.
pub trait RenderSurface {
    fn bounding_rect(&self) -> SurfaceRect;

    fn set_cursor(&self, cursor: CursorStyle);

    /// Registers `listener` for `kind`. Adding a listener that is already
    /// registered for that kind does nothing.
    fn add_listener(&self, kind: PointerEventKind, listener: &Listener);

    /// Removes `listener` for `kind`. Unknown listeners are ignored.
    fn remove_listener(&self, kind: PointerEventKind, listener: &Listener);
}

/// In-memory surface for native event loops and tests.
///
/// The host feeds window events through [`HeadlessSurface::dispatch`] and
/// reads the cursor back with [`HeadlessSurface::cursor`].
pub struct HeadlessSurface {
    rect: Cell<SurfaceRect>,
    cursor: Cell<Option<CursorStyle>>,
    listeners: RefCell<Vec<(PointerEventKind, Listener)>>,
}

impl HeadlessSurface {
    pub fn new(rect: SurfaceRect) -> Self {
        Self {
            rect: Cell::new(rect),
            cursor: Cell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn set_rect(&self, rect: SurfaceRect) {
        self.rect.set(rect);
    }

    /// Last cursor written by the router, if any.
    pub fn cursor(&self) -> Option<CursorStyle> {
        self.cursor.get()
    }

    pub fn listener_count(&self, kind: PointerEventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(registered, _)| *registered == kind)
            .count()
    }

    /// Delivers `event` to every listener registered for `kind`.
    ///
    /// Listeners run against a snapshot, so they may add or remove listeners
    /// while being dispatched.
    pub fn dispatch(&self, kind: PointerEventKind, event: &PointerEvent) -> usize {
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(registered, _)| *registered == kind)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(SurfaceRect::default())
    }
}

impl fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessSurface")
            .field("rect", &self.rect.get())
            .field("cursor", &self.cursor.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl RenderSurface for HeadlessSurface {
    fn bounding_rect(&self) -> SurfaceRect {
        self.rect.get()
    }

    fn set_cursor(&self, cursor: CursorStyle) {
        self.cursor.set(Some(cursor));
    }

    fn add_listener(&self, kind: PointerEventKind, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        let present = listeners
            .iter()
            .any(|(registered, existing)| *registered == kind && Rc::ptr_eq(existing, listener));
        if !present {
            listeners.push((kind, Rc::clone(listener)));
        }
    }

    fn remove_listener(&self, kind: PointerEventKind, listener: &Listener) {
        self.listeners.borrow_mut().retain(|(registered, existing)| {
            !(*registered == kind && Rc::ptr_eq(existing, listener))
        });
    }
}

impl<T> RenderSurface for Rc<T>
where
    T: RenderSurface + ?Sized,
{
    fn bounding_rect(&self) -> SurfaceRect {
        (**self).bounding_rect()
    }

    fn set_cursor(&self, cursor: CursorStyle) {
        (**self).set_cursor(cursor)
    }

    fn add_listener(&self, kind: PointerEventKind, listener: &Listener) {
        (**self).add_listener(kind, listener)
    }

    fn remove_listener(&self, kind: PointerEventKind, listener: &Listener) {
        (**self).remove_listener(kind, listener)
    }
}
