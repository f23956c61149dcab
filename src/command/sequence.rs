//! Ordered list of motion requests with blend radii

use super::request::MotionRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceItem {
    pub request: MotionRequest,
    /// Radius (m) of the transition into the next item; 0 stops at the junction
    pub blend_radius: f64,
}

/// Motion requests executed back to back.
///
/// Only the first request's start state is used; every later item starts where
/// its predecessor ends. The blend radius of the last item is ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub items: Vec<SequenceItem>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: MotionRequest, blend_radius: f64) {
        self.items.push(SequenceItem { request, blend_radius });
    }

    pub fn with(mut self, request: MotionRequest, blend_radius: f64) -> Self {
        self.push(request, blend_radius);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SequenceItem> {
        self.items.iter()
    }
}
