//! The drawing context: public path, state, and frame API.
//!
//! A [`Context`] owns one renderer backend, the recorded command
//! buffer, the state stack, and the flattening cache. Applications
//! record paths and state changes, then call [`Context::fill`] or
//! [`Context::stroke`] to tessellate and submit geometry to the
//! backend. All buffers are reused across frames.

use tracing::debug;

use crate::basics::{
    BlendFactor, CompositeOperation, CompositeOperationState, LineCap, LineJoin, Solidity, Winding,
};
use crate::color::Color;
use crate::command::CommandBuffer;
use crate::error::Error;
use crate::expand::{expand_fill, expand_stroke};
use crate::paint::Paint;
use crate::path_cache::PathCache;
use crate::renderer::{CreateFlags, Renderer};
use crate::state::{Scissor, StateStack};
use crate::transform::Transform;

/// Sub-pixel strokes fade with squared coverage; this floor keeps a
/// zero-width hairline visible instead of vanishing.
const MIN_HAIRLINE_ALPHA: f32 = 0.0625;

/// Per-frame tessellation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub fill_triangles: usize,
    pub stroke_triangles: usize,
}

/// Vector drawing context over a renderer backend `R`.
pub struct Context<R: Renderer> {
    renderer: R,
    commands: CommandBuffer,
    states: StateStack,
    cache: PathCache,
    tess_tol: f32,
    dist_tol: f32,
    fringe_width: f32,
    device_px_ratio: f32,
    edge_anti_alias: bool,
    stats: FrameStats,
}

impl<R: Renderer> Context<R> {
    /// Create a context over `renderer`. Backend setup failures are
    /// fatal and abort construction.
    pub fn new(mut renderer: R, flags: CreateFlags) -> Result<Self, Error> {
        renderer.create(flags)?;
        let mut ctx = Self {
            renderer,
            commands: CommandBuffer::new(),
            states: StateStack::new(),
            cache: PathCache::new(),
            tess_tol: 0.0,
            dist_tol: 0.0,
            fringe_width: 0.0,
            device_px_ratio: 0.0,
            edge_anti_alias: flags.contains(CreateFlags::ANTIALIAS),
            stats: FrameStats::default(),
        };
        ctx.set_device_pixel_ratio(1.0);
        Ok(ctx)
    }

    fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.tess_tol = 0.25 / ratio;
        self.dist_tol = 0.01 / ratio;
        self.fringe_width = 1.0 / ratio;
        self.device_px_ratio = ratio;
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_px_ratio
    }

    /// Access the backend, e.g. for image management.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    // ====================================================================
    // Frames
    // ====================================================================

    /// Begin a new frame: resets the state stack and statistics and
    /// rederives the tessellation tolerances from the pixel ratio.
    pub fn begin_frame(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.states.clear();
        self.set_device_pixel_ratio(device_pixel_ratio);
        self.renderer.begin_frame(width, height, device_pixel_ratio);
        self.stats = FrameStats::default();
    }

    /// Discard the frame's accumulated draw calls without submitting.
    pub fn cancel_frame(&mut self) {
        self.renderer.cancel();
    }

    /// Submit the frame to the backend.
    pub fn end_frame(&mut self) {
        self.renderer.flush();
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.stats
    }

    // ====================================================================
    // State stack
    // ====================================================================

    /// Push a copy of the current state. A full stack makes this a
    /// no-op.
    pub fn save(&mut self) {
        self.states.save();
    }

    /// Pop back to the previously saved state. The initial state is
    /// never popped.
    pub fn restore(&mut self) {
        self.states.restore();
    }

    /// Reset the current state to defaults without changing the stack
    /// depth.
    pub fn reset(&mut self) {
        self.states.reset();
    }

    // ====================================================================
    // Render styles
    // ====================================================================

    pub fn shape_anti_alias(&mut self, enabled: bool) {
        self.states.current_mut().shape_anti_alias = enabled;
    }

    pub fn fill_color(&mut self, color: Color) {
        self.states.current_mut().fill = Paint::color(color);
    }

    /// Install a paint as fill style; its local transform is composed
    /// with the current transform.
    pub fn fill_paint(&mut self, paint: Paint) {
        let state = self.states.current_mut();
        let mut paint = paint;
        paint.xform.multiply(&state.xform);
        state.fill = paint;
    }

    pub fn stroke_color(&mut self, color: Color) {
        self.states.current_mut().stroke = Paint::color(color);
    }

    pub fn stroke_paint(&mut self, paint: Paint) {
        let state = self.states.current_mut();
        let mut paint = paint;
        paint.xform.multiply(&state.xform);
        state.stroke = paint;
    }

    pub fn stroke_width(&mut self, width: f32) {
        self.states.current_mut().stroke_width = width;
    }

    pub fn miter_limit(&mut self, limit: f32) {
        self.states.current_mut().miter_limit = limit;
    }

    pub fn line_cap(&mut self, cap: LineCap) {
        self.states.current_mut().line_cap = cap;
    }

    pub fn line_join(&mut self, join: LineJoin) {
        self.states.current_mut().line_join = join;
    }

    pub fn global_alpha(&mut self, alpha: f32) {
        self.states.current_mut().alpha = alpha;
    }

    pub fn global_composite_operation(&mut self, op: CompositeOperation) {
        self.states.current_mut().composite_operation = CompositeOperationState::new(op);
    }

    pub fn global_composite_blend_func(&mut self, sfactor: BlendFactor, dfactor: BlendFactor) {
        self.global_composite_blend_func_separate(sfactor, dfactor, sfactor, dfactor);
    }

    pub fn global_composite_blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.states.current_mut().composite_operation =
            CompositeOperationState::with_blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    // ====================================================================
    // Transforms
    // ====================================================================

    pub fn reset_transform(&mut self) {
        self.states.current_mut().xform = Transform::identity();
    }

    /// Premultiply the current transform by the given matrix.
    #[allow(clippy::many_single_char_names)]
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.states
            .current_mut()
            .xform
            .premultiply(&Transform { a, b, c, d, e, f });
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.states
            .current_mut()
            .xform
            .premultiply(&Transform::translation(x, y));
    }

    pub fn rotate(&mut self, angle: f32) {
        self.states
            .current_mut()
            .xform
            .premultiply(&Transform::rotation(angle));
    }

    pub fn skew_x(&mut self, angle: f32) {
        self.states
            .current_mut()
            .xform
            .premultiply(&Transform::skew_x(angle));
    }

    pub fn skew_y(&mut self, angle: f32) {
        self.states
            .current_mut()
            .xform
            .premultiply(&Transform::skew_y(angle));
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.states
            .current_mut()
            .xform
            .premultiply(&Transform::scaling(x, y));
    }

    pub fn current_transform(&self) -> Transform {
        self.states.current().xform
    }

    // ====================================================================
    // Scissoring
    // ====================================================================

    /// Set the scissor to a rectangle in the current transform space.
    pub fn scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let state = self.states.current_mut();
        let w = w.max(0.0);
        let h = h.max(0.0);

        let mut xform = Transform::translation(x + w * 0.5, y + h * 0.5);
        xform.multiply(&state.xform);
        state.scissor = Scissor {
            xform,
            extent: [w * 0.5, h * 0.5],
        };
    }

    /// Intersect the current scissor with a rectangle. The previous
    /// scissor is mapped into the current transform space through its
    /// axis-aligned cover, so rotated scissors intersect conservatively.
    pub fn intersect_scissor(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let state = *self.states.current();

        if !state.scissor.is_enabled() {
            self.scissor(x, y, w, h);
            return;
        }

        let mut pxform = state.scissor.xform;
        let ex = state.scissor.extent[0];
        let ey = state.scissor.extent[1];
        let invxform = state.xform.inverse().unwrap_or_default();
        pxform.multiply(&invxform);
        let tex = ex * pxform.a.abs() + ey * pxform.c.abs();
        let tey = ex * pxform.b.abs() + ey * pxform.d.abs();

        let (ix, iy, iw, ih) = isect_rects(
            pxform.e - tex,
            pxform.f - tey,
            tex * 2.0,
            tey * 2.0,
            x,
            y,
            w,
            h,
        );
        self.scissor(ix, iy, iw, ih);
    }

    pub fn reset_scissor(&mut self) {
        self.states.current_mut().scissor = Scissor::none();
    }

    // ====================================================================
    // Paths
    // ====================================================================

    /// Clear the recorded path and the flattening cache.
    pub fn begin_path(&mut self) {
        self.commands.clear();
        self.cache.clear();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let xform = self.states.current().xform;
        self.commands.move_to(&xform, x, y);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        let xform = self.states.current().xform;
        self.commands.line_to(&xform, x, y);
    }

    pub fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        let xform = self.states.current().xform;
        self.commands.bezier_to(&xform, c1x, c1y, c2x, c2y, x, y);
    }

    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let xform = self.states.current().xform;
        self.commands.quad_to(&xform, cx, cy, x, y);
    }

    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
        let xform = self.states.current().xform;
        self.commands
            .arc_to(&xform, x1, y1, x2, y2, radius, self.dist_tol);
    }

    pub fn arc(&mut self, cx: f32, cy: f32, r: f32, a0: f32, a1: f32, dir: Winding) {
        let xform = self.states.current().xform;
        self.commands.arc(&xform, cx, cy, r, a0, a1, dir);
    }

    pub fn close_path(&mut self) {
        let xform = self.states.current().xform;
        self.commands.close_path(&xform);
    }

    /// Set the winding of the currently open sub-path.
    pub fn path_winding(&mut self, dir: Winding) {
        let xform = self.states.current().xform;
        self.commands.path_winding(&xform, dir);
    }

    /// Winding expressed as solid shape vs hole.
    pub fn path_solidity(&mut self, solidity: Solidity) {
        self.path_winding(solidity.into());
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let xform = self.states.current().xform;
        self.commands.rect(&xform, x, y, w, h);
    }

    pub fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32) {
        let xform = self.states.current().xform;
        self.commands.rounded_rect(&xform, x, y, w, h, r);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect_varying(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rad_top_left: f32,
        rad_top_right: f32,
        rad_bottom_right: f32,
        rad_bottom_left: f32,
    ) {
        let xform = self.states.current().xform;
        self.commands.rounded_rect_varying(
            &xform,
            x,
            y,
            w,
            h,
            rad_top_left,
            rad_top_right,
            rad_bottom_right,
            rad_bottom_left,
        );
    }

    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        let xform = self.states.current().xform;
        self.commands.ellipse(&xform, cx, cy, rx, ry);
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        let xform = self.states.current().xform;
        self.commands.circle(&xform, cx, cy, r);
    }

    // ====================================================================
    // Fill and stroke
    // ====================================================================

    /// Tessellate the current path and submit it as a filled shape.
    pub fn fill(&mut self) {
        let state = *self.states.current();
        let mut fill_paint = state.fill;

        self.cache
            .flatten(self.commands.commands(), self.tess_tol, self.dist_tol);

        let fringe = if self.edge_anti_alias && state.shape_anti_alias {
            self.fringe_width
        } else {
            0.0
        };
        expand_fill(&mut self.cache, fringe, LineJoin::Miter, 2.4, self.fringe_width);

        fill_paint.inner_color.a *= state.alpha;
        fill_paint.outer_color.a *= state.alpha;

        if skip_draw(&fill_paint, &state.scissor) {
            return;
        }

        self.renderer.render_fill(
            &fill_paint,
            state.composite_operation,
            &state.scissor,
            self.fringe_width,
            self.cache.bounds,
            &self.cache.paths,
            &self.cache.verts,
        );

        for path in &self.cache.paths {
            self.stats.fill_triangles += path.fill_count.saturating_sub(2);
            self.stats.fill_triangles += path.stroke_count.saturating_sub(2);
            self.stats.draw_calls += 2;
        }
    }

    /// Tessellate the current path and submit it as a stroked outline.
    pub fn stroke(&mut self) {
        let state = *self.states.current();
        let scale = state.xform.average_scale();
        let mut stroke_width = (state.stroke_width * scale).clamp(0.0, 200.0);
        let mut stroke_paint = state.stroke;

        if stroke_width < self.fringe_width {
            // Sub-pixel widths render at fringe width with squared
            // alpha emulating partial coverage.
            let coverage = (stroke_width / self.fringe_width).clamp(0.0, 1.0);
            let alpha = (coverage * coverage).max(MIN_HAIRLINE_ALPHA);
            stroke_paint.inner_color.a *= alpha;
            stroke_paint.outer_color.a *= alpha;
            stroke_width = self.fringe_width;
        }

        stroke_paint.inner_color.a *= state.alpha;
        stroke_paint.outer_color.a *= state.alpha;

        self.cache
            .flatten(self.commands.commands(), self.tess_tol, self.dist_tol);

        let fringe = if self.edge_anti_alias && state.shape_anti_alias {
            self.fringe_width
        } else {
            0.0
        };
        expand_stroke(
            &mut self.cache,
            stroke_width * 0.5,
            fringe,
            state.line_cap,
            state.line_join,
            state.miter_limit,
            self.tess_tol,
        );

        if skip_draw(&stroke_paint, &state.scissor) {
            return;
        }

        self.renderer.render_stroke(
            &stroke_paint,
            state.composite_operation,
            &state.scissor,
            self.fringe_width,
            stroke_width,
            &self.cache.paths,
            &self.cache.verts,
        );

        for path in &self.cache.paths {
            self.stats.stroke_triangles += path.stroke_count.saturating_sub(2);
            self.stats.draw_calls += 1;
        }
    }
}

/// Backends invert the paint and scissor transforms into shader
/// uniforms; a singular one cannot be drawn meaningfully, so the
/// submission is dropped.
fn skip_draw(paint: &Paint, scissor: &Scissor) -> bool {
    if paint.xform.inverse().is_none() {
        debug!("skipping draw: paint transform is singular");
        return true;
    }
    if scissor.is_enabled() && scissor.xform.inverse().is_none() {
        debug!("skipping draw: scissor transform is singular");
        return true;
    }
    false
}

fn isect_rects(
    ax: f32,
    ay: f32,
    aw: f32,
    ah: f32,
    bx: f32,
    by: f32,
    bw: f32,
    bh: f32,
) -> (f32, f32, f32, f32) {
    let minx = ax.max(bx);
    let miny = ay.max(by);
    let maxx = (ax + aw).min(bx + bw);
    let maxy = (ay + ah).min(by + bh);
    (minx, miny, (maxx - minx).max(0.0), (maxy - miny).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::Bounds;
    use crate::path_cache::Path;
    use crate::renderer::Vertex;

    #[derive(Debug, Clone)]
    struct FillCall {
        paint: Paint,
        paths: Vec<Path>,
        verts: Vec<Vertex>,
        bounds: Bounds,
    }

    #[derive(Debug, Clone)]
    struct StrokeCall {
        paint: Paint,
        paths: Vec<Path>,
        stroke_width: f32,
        fringe: f32,
    }

    /// Test backend that records every submission.
    #[derive(Debug, Default)]
    struct RecordingRenderer {
        fills: Vec<FillCall>,
        strokes: Vec<StrokeCall>,
        frames: usize,
        cancels: usize,
        flushes: usize,
    }

    impl Renderer for RecordingRenderer {
        fn create(&mut self, _flags: CreateFlags) -> Result<(), Error> {
            Ok(())
        }

        fn begin_frame(&mut self, _width: f32, _height: f32, _device_pixel_ratio: f32) {
            self.frames += 1;
        }

        fn cancel(&mut self) {
            self.cancels += 1;
        }

        fn flush(&mut self) {
            self.flushes += 1;
        }

        fn render_fill(
            &mut self,
            paint: &Paint,
            _composite_operation: CompositeOperationState,
            _scissor: &Scissor,
            _fringe: f32,
            bounds: Bounds,
            paths: &[Path],
            verts: &[Vertex],
        ) {
            self.fills.push(FillCall {
                paint: *paint,
                paths: paths.to_vec(),
                verts: verts.to_vec(),
                bounds,
            });
        }

        fn render_stroke(
            &mut self,
            paint: &Paint,
            _composite_operation: CompositeOperationState,
            _scissor: &Scissor,
            fringe: f32,
            stroke_width: f32,
            paths: &[Path],
            _verts: &[Vertex],
        ) {
            self.strokes.push(StrokeCall {
                paint: *paint,
                paths: paths.to_vec(),
                stroke_width,
                fringe,
            });
        }
    }

    fn context() -> Context<RecordingRenderer> {
        let mut ctx =
            Context::new(RecordingRenderer::default(), CreateFlags::ANTIALIAS).unwrap();
        ctx.begin_frame(800.0, 600.0, 1.0);
        ctx
    }

    #[test]
    fn test_rect_fill_end_to_end() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.rect(10.0, 10.0, 100.0, 50.0);
        ctx.fill_color(Color::rgba(255, 0, 0, 255));
        ctx.fill();

        let call = &ctx.renderer().fills[0];
        assert_eq!(call.paths.len(), 1);
        let path = &call.paths[0];
        assert_eq!(path.point_count(), 4);
        assert!(path.convex);
        // Triangle fan over 4 corner vertices: 2 core triangles.
        assert_eq!(path.fill_count - 2, 2);
        assert!((call.paint.inner_color.r - 1.0).abs() < 1e-6);
        assert_eq!(
            (call.bounds.min_x, call.bounds.min_y, call.bounds.max_x, call.bounds.max_y),
            (10.0, 10.0, 110.0, 60.0)
        );
        assert!(!call.verts.is_empty());
    }

    #[test]
    fn test_path_vertex_ranges_slice_shared_buffer() {
        // What a backend does with a submission: locate each sub-path's
        // triangles through its vertex ranges.
        let mut ctx = context();
        ctx.begin_path();
        ctx.rect(0.0, 0.0, 100.0, 100.0);
        ctx.rect(25.0, 25.0, 50.0, 50.0);
        ctx.path_winding(Winding::Cw);
        ctx.fill();

        let call = &ctx.renderer().fills[0];
        assert_eq!(call.paths.len(), 2);

        let mut end = 0;
        for path in &call.paths {
            let fan = &call.verts[path.fill_offset..path.fill_offset + path.fill_count];
            assert_eq!(fan.len(), path.point_count());
            let ring = &call.verts[path.stroke_offset..path.stroke_offset + path.stroke_count];
            assert!(!ring.is_empty());
            // Ranges are ordered and disjoint within the shared buffer.
            assert_eq!(path.fill_offset, end);
            assert_eq!(path.stroke_offset, path.fill_offset + path.fill_count);
            end = path.stroke_offset + path.stroke_count;
        }
        assert_eq!(end, call.verts.len());
    }

    #[test]
    fn test_circle_stroke_closed_no_caps() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.circle(50.0, 50.0, 40.0);
        ctx.stroke_width(2.0);
        ctx.line_cap(LineCap::Round);
        ctx.line_join(LineJoin::Round);
        ctx.stroke();

        let call = &ctx.renderer().strokes[0];
        let path = &call.paths[0];
        assert!(path.closed);
        // Round join turns every corner point into a bevel candidate.
        assert!(path.nbevel > 0);
        // Closed strip loops onto its first pair instead of capping.
        assert!(path.stroke_count >= path.point_count() * 2 + 2);
    }

    #[test]
    fn test_cw_winding_reverses_point_order() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.move_to(0.0, 0.0);
        ctx.line_to(10.0, 0.0);
        ctx.line_to(10.0, 10.0);
        ctx.close_path();
        ctx.path_winding(Winding::Cw);
        ctx.fill();

        let pts = &ctx.cache.points;
        let mut area = 0.0;
        for i in 2..pts.len() {
            area += crate::math::tri_area2(
                pts[0].x, pts[0].y, pts[i - 1].x, pts[i - 1].y, pts[i].x, pts[i].y,
            );
        }
        assert!(area < 0.0);
    }

    #[test]
    fn test_degenerate_arc_to_falls_back_to_line() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.move_to(5.0, 5.0);
        ctx.arc_to(5.0, 5.0, 5.0, 5.0, 4.0);
        ctx.stroke();
        // No panic; the degenerate arc collapsed into the existing
        // point and produced an empty stroke.
        assert_eq!(ctx.commands.commands().len(), 2);
    }

    #[test]
    fn test_save_restore_depth_bounds() {
        let mut ctx = context();
        for _ in 0..40 {
            ctx.save();
        }
        for _ in 0..40 {
            ctx.restore();
        }
        assert_eq!(ctx.states.depth(), 1);
    }

    #[test]
    fn test_stroke_width_floor_keeps_hairline_visible() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.move_to(0.0, 0.0);
        ctx.line_to(100.0, 0.0);
        ctx.stroke_width(0.0);
        ctx.stroke_color(Color::rgba(255, 255, 255, 255));
        ctx.stroke();

        let call = &ctx.renderer().strokes[0];
        // Rendered at fringe width with faded but nonzero alpha.
        assert_eq!(call.stroke_width, 1.0);
        assert!(call.paint.inner_color.a > 0.0);
        assert!(call.paint.inner_color.a < 1.0);
    }

    #[test]
    fn test_intersect_scissor_order_independent() {
        let scissored = |first: (f32, f32, f32, f32), second: (f32, f32, f32, f32)| {
            let mut ctx = context();
            ctx.scissor(first.0, first.1, first.2, first.3);
            ctx.intersect_scissor(second.0, second.1, second.2, second.3);
            *ctx.states.current()
        };

        let a = (10.0, 10.0, 100.0, 100.0);
        let b = (50.0, 0.0, 100.0, 80.0);
        let ab = scissored(a, b).scissor;
        let ba = scissored(b, a).scissor;

        assert!((ab.extent[0] - ba.extent[0]).abs() < 1e-4);
        assert!((ab.extent[1] - ba.extent[1]).abs() < 1e-4);
        assert!((ab.xform.e - ba.xform.e).abs() < 1e-4);
        assert!((ab.xform.f - ba.xform.f).abs() < 1e-4);
        // Expected intersection: x 50..110, y 10..80.
        assert!((ab.extent[0] - 30.0).abs() < 1e-4);
        assert!((ab.extent[1] - 35.0).abs() < 1e-4);
    }

    #[test]
    fn test_singular_scissor_skips_draw() {
        let mut ctx = context();
        ctx.scale(0.0, 0.0);
        ctx.scissor(0.0, 0.0, 10.0, 10.0);
        ctx.reset_transform();
        ctx.begin_path();
        ctx.rect(0.0, 0.0, 10.0, 10.0);
        ctx.fill();
        assert!(ctx.renderer().fills.is_empty());
    }

    #[test]
    fn test_empty_path_is_tolerated() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.fill();
        ctx.stroke();

        assert_eq!(ctx.renderer().fills.len(), 1);
        assert!(ctx.renderer().fills[0].paths.is_empty());
        assert_eq!(ctx.frame_stats().draw_calls, 0);
    }

    #[test]
    fn test_global_alpha_applies_to_paint() {
        let mut ctx = context();
        ctx.global_alpha(0.5);
        ctx.begin_path();
        ctx.rect(0.0, 0.0, 10.0, 10.0);
        ctx.fill();
        assert!((ctx.renderer().fills[0].paint.inner_color.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_transform_applies_to_recorded_path() {
        let mut ctx = context();
        ctx.translate(100.0, 0.0);
        ctx.begin_path();
        ctx.rect(0.0, 0.0, 10.0, 10.0);
        // Transform changes after recording do not move the path.
        ctx.translate(500.0, 500.0);
        ctx.fill();

        let call = &ctx.renderer().fills[0];
        assert_eq!(call.bounds.min_x, 100.0);
        assert_eq!(call.bounds.max_x, 110.0);
    }

    #[test]
    fn test_fill_then_stroke_reuses_flattening() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.circle(50.0, 50.0, 20.0);
        ctx.fill();
        let points_after_fill = ctx.cache.points.len();
        ctx.stroke();
        assert_eq!(ctx.cache.points.len(), points_after_fill);
        assert_eq!(ctx.renderer().strokes.len(), 1);
    }

    #[test]
    fn test_frame_lifecycle_and_stats() {
        let mut ctx = context();
        ctx.begin_path();
        ctx.rect(0.0, 0.0, 10.0, 10.0);
        ctx.fill();
        let stats = ctx.frame_stats();
        assert_eq!(stats.draw_calls, 2);
        assert!(stats.fill_triangles > 0);

        ctx.end_frame();
        assert_eq!(ctx.renderer().flushes, 1);

        // A new frame resets stats and state.
        ctx.global_alpha(0.25);
        ctx.begin_frame(800.0, 600.0, 2.0);
        assert_eq!(ctx.frame_stats(), FrameStats::default());
        assert_eq!(ctx.states.current().alpha, 1.0);
        assert_eq!(ctx.device_pixel_ratio(), 2.0);

        ctx.cancel_frame();
        assert_eq!(ctx.renderer().cancels, 1);
    }

    #[test]
    fn test_device_pixel_ratio_scales_tolerances() {
        let mut ctx = context();
        ctx.begin_frame(800.0, 600.0, 2.0);
        assert!((ctx.tess_tol - 0.125).abs() < 1e-6);
        assert!((ctx.dist_tol - 0.005).abs() < 1e-6);
        assert!((ctx.fringe_width - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fill_paint_composes_current_transform() {
        let mut ctx = context();
        ctx.translate(10.0, 20.0);
        let paint = Paint::linear_gradient(0.0, 0.0, 0.0, 100.0, Color::BLACK, Color::WHITE);
        ctx.fill_paint(paint);
        let installed = ctx.states.current().fill;
        assert!((installed.xform.e - (paint.xform.e + 10.0)).abs() < 1e-2);
        assert!((installed.xform.f - (paint.xform.f + 20.0)).abs() < 1e-2);
    }

    #[test]
    fn test_shape_anti_alias_disables_fringe() {
        let mut ctx = context();
        ctx.shape_anti_alias(false);
        ctx.begin_path();
        ctx.rect(0.0, 0.0, 10.0, 10.0);
        ctx.fill();
        // No fringe ring: only the 4 fan vertices.
        let call = &ctx.renderer().fills[0];
        assert_eq!(call.paths[0].stroke_count, 0);
        assert_eq!(call.verts.len(), 4);
    }
}
