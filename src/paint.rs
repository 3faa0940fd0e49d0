//! Paint descriptors for fills and strokes.
//!
//! A paint is an opaque descriptor the renderer backend can invert into
//! its shader uniforms: a local-space transform, extents, corner radius,
//! feather width, an inner/outer color pair, and an optional image id.
//!
//! Constructors here produce paints in untransformed (local) space; the
//! context composes the current transform onto the paint when it is
//! installed as the fill or stroke style.

use crate::color::Color;
use crate::transform::Transform;

/// Paint style for fills and strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub xform: Transform,
    pub extent: [f32; 2],
    pub radius: f32,
    pub feather: f32,
    pub inner_color: Color,
    pub outer_color: Color,
    /// Backend image handle; 0 means no image.
    pub image: i32,
}

impl Paint {
    /// Solid color paint: identity transform, zero extent, feather 1,
    /// both colors equal.
    pub fn color(color: Color) -> Self {
        Self {
            xform: Transform::identity(),
            extent: [0.0, 0.0],
            radius: 0.0,
            feather: 1.0,
            inner_color: color,
            outer_color: color,
            image: 0,
        }
    }

    /// Linear gradient from `(sx, sy)` to `(ex, ey)`.
    ///
    /// The gradient axis is encoded as a rotation mapping the local y
    /// axis onto the start→end direction; a large extent places the
    /// feathered band across the whole axis.
    pub fn linear_gradient(
        sx: f32,
        sy: f32,
        ex: f32,
        ey: f32,
        inner_color: Color,
        outer_color: Color,
    ) -> Self {
        const LARGE: f32 = 1e5;

        let mut dx = ex - sx;
        let mut dy = ey - sy;
        let d = (dx * dx + dy * dy).sqrt();
        if d > 0.0001 {
            dx /= d;
            dy /= d;
        } else {
            dx = 0.0;
            dy = 1.0;
        }

        Self {
            xform: Transform {
                a: dy,
                b: -dx,
                c: dx,
                d: dy,
                e: sx - dx * LARGE,
                f: sy - dy * LARGE,
            },
            extent: [LARGE, LARGE + d * 0.5],
            radius: 0.0,
            feather: d.max(1.0),
            inner_color,
            outer_color,
            image: 0,
        }
    }

    /// Radial gradient centered at `(cx, cy)` blending between the inner
    /// and outer radius.
    pub fn radial_gradient(
        cx: f32,
        cy: f32,
        in_radius: f32,
        out_radius: f32,
        inner_color: Color,
        outer_color: Color,
    ) -> Self {
        let r = (in_radius + out_radius) * 0.5;
        let f = out_radius - in_radius;

        Self {
            xform: Transform::translation(cx, cy),
            extent: [r, r],
            radius: r,
            feather: f.max(1.0),
            inner_color,
            outer_color,
            image: 0,
        }
    }

    /// Box gradient: a feathered rounded rectangle, typically used for
    /// drop shadows.
    #[allow(clippy::too_many_arguments)]
    pub fn box_gradient(
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        feather: f32,
        inner_color: Color,
        outer_color: Color,
    ) -> Self {
        Self {
            xform: Transform::translation(x + w * 0.5, y + h * 0.5),
            extent: [w * 0.5, h * 0.5],
            radius,
            feather: feather.max(1.0),
            inner_color,
            outer_color,
            image: 0,
        }
    }

    /// Image pattern: image `image` laid out over the rectangle at
    /// `(cx, cy)` with size `(w, h)`, rotated by `angle` radians.
    pub fn image_pattern(cx: f32, cy: f32, w: f32, h: f32, angle: f32, image: i32, alpha: f32) -> Self {
        let mut xform = Transform::rotation(angle);
        xform.e = cx;
        xform.f = cy;

        let color = Color::rgbaf(1.0, 1.0, 1.0, alpha);
        Self {
            xform,
            extent: [w, h],
            radius: 0.0,
            feather: 0.0,
            inner_color: color,
            outer_color: color,
            image,
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self::color(Color::WHITE)
    }
}
