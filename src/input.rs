use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Pointer position in client (page) coordinates, as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
}

impl PointerEvent {
    pub const fn new(client_x: f32, client_y: f32) -> Self {
        Self { client_x, client_y }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.client_x, self.client_y)
    }
}

impl From<Vec2> for PointerEvent {
    fn from(position: Vec2) -> Self {
        Self::new(position.x, position.y)
    }
}

/// The two pointer event kinds the router listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    Click,
    Move,
}

impl PointerEventKind {
    pub const ALL: [Self; 2] = [Self::Click, Self::Move];

    /// DOM event type for this kind.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Move => "mousemove",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "click" => Some(Self::Click),
            "mousemove" | "pointermove" => Some(Self::Move),
            _ => None,
        }
    }
}
