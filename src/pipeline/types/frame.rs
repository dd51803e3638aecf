use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of an object placed in a synthetic scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Document,
    Envelope,
    Notebook,
    Whiteboard,
    NonSensitive,
}

impl ObjectClass {
    pub const SENSITIVE: [ObjectClass; 4] = [
        ObjectClass::Document,
        ObjectClass::Envelope,
        ObjectClass::Notebook,
        ObjectClass::Whiteboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClass::Document => "document",
            ObjectClass::Envelope => "envelope",
            ObjectClass::Notebook => "notebook",
            ObjectClass::Whiteboard => "whiteboard",
            ObjectClass::NonSensitive => "nonsensitive",
        }
    }

    pub fn is_sensitive(&self) -> bool {
        !matches!(self, ObjectClass::NonSensitive)
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned box in integer pixel units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneObject {
    pub object_id: String,
    pub class: ObjectClass,
    pub bbox: BoundingBox,
    pub readable: bool,
}

/// Environmental difficulty factors applied to a frame by the stress sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stressors {
    pub lighting: f64,
    pub clutter: f64,
    pub distance: f64,
    pub motion: f64,
    /// Degrees, signed.
    pub camera_angle: f64,
}

impl Stressors {
    pub fn new(lighting: f64, clutter: f64, distance: f64, motion: f64, camera_angle: f64) -> Self {
        Self {
            lighting,
            clutter,
            distance,
            motion,
            camera_angle,
        }
    }
}

/// A rendered synthetic frame with its ground-truth object list.
/// Stressors are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub frame_id: String,
    pub width: u32,
    pub height: u32,
    pub objects: Vec<SceneObject>,
    pub stressors: Stressors,
}

impl Frame {
    pub fn new(
        frame_id: impl Into<String>,
        width: u32,
        height: u32,
        objects: Vec<SceneObject>,
        stressors: Stressors,
    ) -> Self {
        Self {
            frame_id: frame_id.into(),
            width,
            height,
            objects,
            stressors,
        }
    }

    pub fn sensitive_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.class.is_sensitive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_class_serializes_lowercase() {
        let json = serde_json::to_string(&ObjectClass::NonSensitive).unwrap();
        assert_eq!(json, "\"nonsensitive\"");
        let parsed: ObjectClass = serde_json::from_str("\"whiteboard\"").unwrap();
        assert_eq!(parsed, ObjectClass::Whiteboard);
    }

    #[test]
    fn test_sensitive_classes() {
        assert!(ObjectClass::SENSITIVE.iter().all(|c| c.is_sensitive()));
        assert!(!ObjectClass::NonSensitive.is_sensitive());
        assert_eq!(ObjectClass::Document.to_string(), "document");
    }
}
