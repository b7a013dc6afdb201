use serde::{Deserialize, Serialize};

use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2 { x: 1.0, y: 1.0 },
        }
    }
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Unit vector the transform's rotation points along.
    pub fn direction(&self) -> Vec2 {
        Vec2 {
            x: self.rotation.cos(),
            y: self.rotation.sin(),
        }
    }
}

/// Draw ordering bucket consumed by the renderer; carried here as plain data
/// so simulation code can assign it without knowing anything about drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawLayer {
    Back,
    #[default]
    Front,
}
