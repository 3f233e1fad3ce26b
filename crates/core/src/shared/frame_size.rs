use std::fmt;

use crate::shared::constants::MAX_FRAME_DIMENSION;

/// Declared dimensions of the encoded picture, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Non-empty and small enough for the container's codec parameters.
    pub fn is_valid(&self) -> bool {
        !self.is_empty() && self.width <= MAX_FRAME_DIMENSION && self.height <= MAX_FRAME_DIMENSION
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let size = FrameSize::new(1280, 720);
        assert_eq!(size.width, 1280);
        assert_eq!(size.height, 720);
        assert!(!size.is_empty());
    }

    #[test]
    fn test_zero_dimension_is_empty() {
        assert!(FrameSize::new(0, 720).is_empty());
        assert!(FrameSize::new(1280, 0).is_empty());
    }

    #[test]
    fn test_validity() {
        assert!(FrameSize::new(1280, 720).is_valid());
        assert!(FrameSize::new(MAX_FRAME_DIMENSION, 1).is_valid());
        assert!(!FrameSize::new(0, 720).is_valid());
        assert!(!FrameSize::new(MAX_FRAME_DIMENSION + 1, 720).is_valid());
        assert!(!FrameSize::new(1280, u32::MAX).is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(FrameSize::new(1920, 1080).to_string(), "1920x1080");
    }
}
