//! Foundation types, constants, and blend state.
//!
//! The most fundamental types in the engine that everything else depends
//! on: winding and stroke style enums, composite-operation blend state,
//! and the axis-aligned bounds accumulator.

// ============================================================================
// Mathematical constants
// ============================================================================

pub const PI: f32 = std::f32::consts::PI;

/// Length proportional to radius of a cubic bezier handle for 90° arcs.
pub const KAPPA90: f32 = 0.552_284_8;

// ============================================================================
// Winding and solidity
// ============================================================================

/// Winding direction of a sub-path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Winding {
    /// Counter-clockwise, used for solid shapes.
    #[default]
    Ccw,
    /// Clockwise, used for holes.
    Cw,
}

/// Solidity of a sub-path, a readable alias for winding direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solidity {
    Solid,
    Hole,
}

impl From<Solidity> for Winding {
    fn from(s: Solidity) -> Self {
        match s {
            Solidity::Solid => Winding::Ccw,
            Solidity::Hole => Winding::Cw,
        }
    }
}

// ============================================================================
// Stroke style
// ============================================================================

/// Line cap style for stroke endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Line join style at stroke corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

// ============================================================================
// Composite operations
// ============================================================================

/// Blend factors understood by renderer backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
}

/// The canvas composite operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOperation {
    #[default]
    SourceOver,
    SourceIn,
    SourceOut,
    Atop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
}

/// Resolved blend state: one factor per RGB/alpha source/destination slot.
///
/// Backends translate these four factors directly into their pipeline
/// blend configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeOperationState {
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl CompositeOperationState {
    /// Resolve a canvas composite operation into blend factors.
    pub fn new(op: CompositeOperation) -> Self {
        let (sfactor, dfactor) = match op {
            CompositeOperation::SourceOver => (BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
            CompositeOperation::SourceIn => (BlendFactor::DstAlpha, BlendFactor::Zero),
            CompositeOperation::SourceOut => (BlendFactor::OneMinusDstAlpha, BlendFactor::Zero),
            CompositeOperation::Atop => (BlendFactor::DstAlpha, BlendFactor::OneMinusSrcAlpha),
            CompositeOperation::DestinationOver => (BlendFactor::OneMinusDstAlpha, BlendFactor::One),
            CompositeOperation::DestinationIn => (BlendFactor::Zero, BlendFactor::SrcAlpha),
            CompositeOperation::DestinationOut => (BlendFactor::Zero, BlendFactor::OneMinusSrcAlpha),
            CompositeOperation::DestinationAtop => {
                (BlendFactor::OneMinusDstAlpha, BlendFactor::SrcAlpha)
            }
            CompositeOperation::Lighter => (BlendFactor::One, BlendFactor::One),
            CompositeOperation::Copy => (BlendFactor::One, BlendFactor::Zero),
            CompositeOperation::Xor => {
                (BlendFactor::OneMinusDstAlpha, BlendFactor::OneMinusSrcAlpha)
            }
        };
        Self {
            src_rgb: sfactor,
            dst_rgb: dfactor,
            src_alpha: sfactor,
            dst_alpha: dfactor,
        }
    }

    /// Blend state from explicit per-channel factors.
    pub fn with_blend_func_separate(
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) -> Self {
        Self {
            src_rgb,
            dst_rgb,
            src_alpha,
            dst_alpha,
        }
    }
}

impl Default for CompositeOperationState {
    fn default() -> Self {
        Self::new(CompositeOperation::SourceOver)
    }
}

// ============================================================================
// Bounds
// ============================================================================

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// An inverted box that any added point will collapse onto.
    pub fn none() -> Self {
        Self {
            min_x: 1e6,
            min_y: 1e6,
            max_x: -1e6,
            max_y: -1e6,
        }
    }

    /// Grow the box to include `(x, y)`.
    pub fn add_point(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_operation_factors() {
        let over = CompositeOperationState::new(CompositeOperation::SourceOver);
        assert_eq!(over.src_rgb, BlendFactor::One);
        assert_eq!(over.dst_rgb, BlendFactor::OneMinusSrcAlpha);
        assert_eq!(over.src_alpha, over.src_rgb);
        assert_eq!(over.dst_alpha, over.dst_rgb);

        let copy = CompositeOperationState::new(CompositeOperation::Copy);
        assert_eq!(copy.src_rgb, BlendFactor::One);
        assert_eq!(copy.dst_rgb, BlendFactor::Zero);
    }

    #[test]
    fn test_solidity_maps_to_winding() {
        assert_eq!(Winding::from(Solidity::Solid), Winding::Ccw);
        assert_eq!(Winding::from(Solidity::Hole), Winding::Cw);
    }

    #[test]
    fn test_bounds_accumulate() {
        let mut b = Bounds::none();
        b.add_point(10.0, -5.0);
        b.add_point(-2.0, 7.0);
        assert_eq!(b.min_x, -2.0);
        assert_eq!(b.min_y, -5.0);
        assert_eq!(b.max_x, 10.0);
        assert_eq!(b.max_y, 7.0);
        assert_eq!(b.width(), 12.0);
        assert_eq!(b.height(), 12.0);
    }
}
