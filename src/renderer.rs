//! Renderer backend contract.
//!
//! The tessellation engine is backend-agnostic: it produces vertex and
//! path buffers and hands them to a [`Renderer`] together with the
//! resolved paint, blend, and scissor state. Backends rasterize fills
//! with a stencil-then-cover pass over the triangle fans (convex paths
//! can skip the stencil) and strokes as plain triangle strips.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use crate::basics::{Bounds, CompositeOperationState};
use crate::error::Error;
use crate::paint::Paint;
use crate::path_cache::Path;
use crate::state::Scissor;

bitflags! {
    /// Context creation flags, forwarded to the backend.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CreateFlags: u32 {
        /// Generate antialiasing fringes on fill and stroke edges.
        const ANTIALIAS = 1 << 0;
        /// Render strokes through the stencil buffer so overlapping
        /// strip geometry does not double-blend.
        const STENCIL_STROKES = 1 << 1;
    }
}

/// One tessellated vertex. `u`/`v` carry the antialiasing coverage
/// ramp (0.5 centerline, 0/1 at the feathered edges) or texture
/// coordinates for image fills.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
}

impl Vertex {
    #[inline]
    pub(crate) fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self { x, y, u, v }
    }
}

/// GPU backend sink. The engine calls out through this trait only;
/// there are no callbacks.
///
/// The `paths` and `verts` slices passed to the render calls point into
/// buffers reused on the next fill or stroke, so implementations must
/// copy whatever they need before returning.
pub trait Renderer {
    /// One-time backend setup (pipelines, shaders, buffers). Failures
    /// here are fatal for the session and abort context construction.
    fn create(&mut self, flags: CreateFlags) -> Result<(), Error>;

    fn begin_frame(&mut self, width: f32, height: f32, device_pixel_ratio: f32);

    /// Discard everything queued since `begin_frame` without drawing.
    fn cancel(&mut self);

    /// Submit the queued draw calls for the frame.
    fn flush(&mut self);

    #[allow(clippy::too_many_arguments)]
    fn render_fill(
        &mut self,
        paint: &Paint,
        composite_operation: CompositeOperationState,
        scissor: &Scissor,
        fringe: f32,
        bounds: Bounds,
        paths: &[Path],
        verts: &[Vertex],
    );

    #[allow(clippy::too_many_arguments)]
    fn render_stroke(
        &mut self,
        paint: &Paint,
        composite_operation: CompositeOperationState,
        scissor: &Scissor,
        fringe: f32,
        stroke_width: f32,
        paths: &[Path],
        verts: &[Vertex],
    );
}
