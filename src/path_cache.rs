//! Path flattening and join classification.
//!
//! The cache replays the recorded command buffer once per fill/stroke,
//! subdividing curves into line segments and grouping points into
//! sub-paths. A second pass classifies every corner for the expanders:
//! averaged miter extrusions, left-turn detection, and the bevel and
//! inner-bevel tests. All buffers are reused across frames.

use bitflags::bitflags;

use crate::basics::{Bounds, LineJoin, Winding};
use crate::command::Command;
use crate::math::{normalize, pt_equals, tri_area2};
use crate::renderer::Vertex;

bitflags! {
    /// Per-point classification set during flattening and join analysis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct PointFlags: u8 {
        const CORNER = 0x01;
        const LEFT = 0x02;
        const BEVEL = 0x04;
        const INNER_BEVEL = 0x08;
    }
}

/// One flattened point with its outgoing segment and miter extrusion.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CachePoint {
    pub x: f32,
    pub y: f32,
    /// Normalized direction to the next point (wrapping).
    pub dx: f32,
    pub dy: f32,
    /// Length of the segment to the next point.
    pub len: f32,
    /// Averaged extrusion: offsetting by `±w·(dmx,dmy)` yields the
    /// miter-joined outline point.
    pub dmx: f32,
    pub dmy: f32,
    pub flags: PointFlags,
}

/// One flattened sub-path.
///
/// The vertex-range fields are the renderer contract: backends slice
/// the shared vertex buffer passed to the render calls with them to
/// locate this sub-path's triangles.
#[derive(Debug, Clone, Copy)]
pub struct Path {
    pub(crate) first: usize,
    pub(crate) count: usize,
    pub closed: bool,
    pub(crate) nbevel: usize,
    pub winding: Winding,
    /// Single all-left-turning sub-paths can be filled as a plain
    /// triangle fan without stenciling.
    pub convex: bool,
    /// Start of the fill fan in the shared vertex buffer.
    pub fill_offset: usize,
    /// Fill fan vertex count; 0 on stroke submissions.
    pub fill_count: usize,
    /// Start of the stroke or fringe strip in the shared vertex buffer.
    pub stroke_offset: usize,
    /// Strip vertex count; 0 when neither a stroke nor a fringe was
    /// built.
    pub stroke_count: usize,
}

impl Path {
    fn new(first: usize) -> Self {
        Self {
            first,
            count: 0,
            closed: false,
            nbevel: 0,
            winding: Winding::Ccw,
            convex: false,
            fill_offset: 0,
            fill_count: 0,
            stroke_offset: 0,
            stroke_count: 0,
        }
    }

    /// Number of flattened points in this sub-path.
    pub fn point_count(&self) -> usize {
        self.count
    }
}

/// Reusable flattening scratch: points, sub-paths, expanded vertices,
/// and the world-space bounds of the current path.
#[derive(Debug)]
pub(crate) struct PathCache {
    pub points: Vec<CachePoint>,
    pub paths: Vec<Path>,
    pub verts: Vec<Vertex>,
    pub bounds: Bounds,
}

impl PathCache {
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(128),
            paths: Vec::with_capacity(16),
            verts: Vec::with_capacity(256),
            bounds: Bounds::none(),
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.paths.clear();
    }

    fn add_path(&mut self) {
        self.paths.push(Path::new(self.points.len()));
    }

    fn add_point(&mut self, x: f32, y: f32, flags: PointFlags, dist_tol: f32) {
        let Some(path) = self.paths.last_mut() else {
            return;
        };

        // Merge points that coincide with the previous one.
        if path.count > 0 {
            if let Some(pt) = self.points.last_mut() {
                if pt_equals(pt.x, pt.y, x, y, dist_tol) {
                    pt.flags |= flags;
                    return;
                }
            }
        }

        self.points.push(CachePoint {
            x,
            y,
            flags,
            ..CachePoint::default()
        });
        path.count += 1;
    }

    fn close_last(&mut self) {
        if let Some(path) = self.paths.last_mut() {
            path.closed = true;
        }
    }

    fn set_last_winding(&mut self, winding: Winding) {
        if let Some(path) = self.paths.last_mut() {
            path.winding = winding;
        }
    }

    /// Adaptive subdivision: split until the control points deviate from
    /// the chord by less than the flatness tolerance.
    #[allow(clippy::too_many_arguments)]
    fn tesselate_bezier(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
        x4: f32,
        y4: f32,
        level: u32,
        flags: PointFlags,
        tess_tol: f32,
        dist_tol: f32,
    ) {
        if level > 10 {
            return;
        }

        let x12 = (x1 + x2) * 0.5;
        let y12 = (y1 + y2) * 0.5;
        let x23 = (x2 + x3) * 0.5;
        let y23 = (y2 + y3) * 0.5;
        let x34 = (x3 + x4) * 0.5;
        let y34 = (y3 + y4) * 0.5;
        let x123 = (x12 + x23) * 0.5;
        let y123 = (y12 + y23) * 0.5;

        let dx = x4 - x1;
        let dy = y4 - y1;
        let d2 = ((x2 - x4) * dy - (y2 - y4) * dx).abs();
        let d3 = ((x3 - x4) * dy - (y3 - y4) * dx).abs();

        if (d2 + d3) * (d2 + d3) < tess_tol * (dx * dx + dy * dy) {
            self.add_point(x4, y4, flags, dist_tol);
            return;
        }

        let x234 = (x23 + x34) * 0.5;
        let y234 = (y23 + y34) * 0.5;
        let x1234 = (x123 + x234) * 0.5;
        let y1234 = (y123 + y234) * 0.5;

        self.tesselate_bezier(
            x1,
            y1,
            x12,
            y12,
            x123,
            y123,
            x1234,
            y1234,
            level + 1,
            PointFlags::empty(),
            tess_tol,
            dist_tol,
        );
        self.tesselate_bezier(
            x1234, y1234, x234, y234, x34, y34, x4, y4,
            level + 1,
            flags,
            tess_tol,
            dist_tol,
        );
    }

    /// Replay the command buffer into flattened sub-paths. Memoized:
    /// a non-empty path list means the current path is already
    /// flattened (fill followed by stroke reuses it).
    pub fn flatten(&mut self, commands: &[Command], tess_tol: f32, dist_tol: f32) {
        if !self.paths.is_empty() {
            return;
        }

        for cmd in commands {
            match *cmd {
                Command::MoveTo { x, y } => {
                    self.add_path();
                    self.add_point(x, y, PointFlags::CORNER, dist_tol);
                }
                Command::LineTo { x, y } => {
                    self.add_point(x, y, PointFlags::CORNER, dist_tol);
                }
                Command::BezierTo {
                    c1x,
                    c1y,
                    c2x,
                    c2y,
                    x,
                    y,
                } => {
                    if let Some(last) = self.points.last().copied() {
                        self.tesselate_bezier(
                            last.x,
                            last.y,
                            c1x,
                            c1y,
                            c2x,
                            c2y,
                            x,
                            y,
                            0,
                            PointFlags::CORNER,
                            tess_tol,
                            dist_tol,
                        );
                    }
                }
                Command::Close => self.close_last(),
                Command::Winding(dir) => self.set_last_winding(dir),
            }
        }

        self.bounds = Bounds::none();

        let Self { points, paths, bounds, .. } = self;
        for path in paths.iter_mut() {
            // A duplicated start/end point means the path closed itself.
            if path.count > 0 {
                let p0 = points[path.first + path.count - 1];
                let p1 = points[path.first];
                if pt_equals(p0.x, p0.y, p1.x, p1.y, dist_tol) {
                    path.count -= 1;
                    path.closed = true;
                }
            }

            if path.count < 1 {
                continue;
            }

            let pts = &mut points[path.first..path.first + path.count];

            // Enforce the requested winding.
            if path.count > 2 {
                let area = poly_area(pts);
                if (path.winding == Winding::Ccw && area < 0.0)
                    || (path.winding == Winding::Cw && area > 0.0)
                {
                    pts.reverse();
                }
            }

            for k in 0..path.count {
                let next = pts[(k + 1) % path.count];
                let p = &mut pts[k];
                p.dx = next.x - p.x;
                p.dy = next.y - p.y;
                p.len = normalize(&mut p.dx, &mut p.dy);
                bounds.add_point(p.x, p.y);
            }
        }
    }

    /// Compute miter extrusions and classify every corner for the
    /// expanders: left turns, miter-limit bevels, and inner bevels where
    /// the miter would overshoot a short adjacent segment.
    pub fn calculate_joins(&mut self, w: f32, line_join: LineJoin, miter_limit: f32) {
        let iw = if w > 0.0 { 1.0 / w } else { 0.0 };

        let Self { points, paths, .. } = self;
        for path in paths.iter_mut() {
            let pts = &mut points[path.first..path.first + path.count];
            let mut nleft = 0;
            path.nbevel = 0;

            for j in 0..pts.len() {
                let p0 = pts[(j + pts.len() - 1) % pts.len()];
                let p1 = &mut pts[j];

                let dlx0 = p0.dy;
                let dly0 = -p0.dx;
                let dlx1 = p1.dy;
                let dly1 = -p1.dx;

                p1.dmx = (dlx0 + dlx1) * 0.5;
                p1.dmy = (dly0 + dly1) * 0.5;
                let dmr2 = p1.dmx * p1.dmx + p1.dmy * p1.dmy;
                if dmr2 > 0.000001 {
                    // Near-parallel segments would blow the extrusion up;
                    // clamp the scale.
                    let scale = (1.0 / dmr2).min(600.0);
                    p1.dmx *= scale;
                    p1.dmy *= scale;
                }

                p1.flags &= PointFlags::CORNER;

                let cross = p1.dx * p0.dy - p0.dx * p1.dy;
                if cross > 0.0 {
                    nleft += 1;
                    p1.flags |= PointFlags::LEFT;
                }

                // The miter overshoots the shorter adjacent segment on
                // the concave side.
                let limit = (p0.len.min(p1.len) * iw).max(1.01);
                if dmr2 * limit * limit < 1.0 {
                    p1.flags |= PointFlags::INNER_BEVEL;
                }

                if p1.flags.contains(PointFlags::CORNER)
                    && (dmr2 * miter_limit * miter_limit < 1.0
                        || line_join == LineJoin::Bevel
                        || line_join == LineJoin::Round)
                {
                    p1.flags |= PointFlags::BEVEL;
                }

                if p1
                    .flags
                    .intersects(PointFlags::BEVEL | PointFlags::INNER_BEVEL)
                {
                    path.nbevel += 1;
                }
            }

            path.convex = nleft == pts.len();
        }
    }
}

/// Signed polygon area via a triangle fan from the first point.
fn poly_area(pts: &[CachePoint]) -> f32 {
    let mut area = 0.0;
    for i in 2..pts.len() {
        let a = &pts[0];
        let b = &pts[i - 1];
        let c = &pts[i];
        area += tri_area2(a.x, a.y, b.x, b.y, c.x, c.y);
    }
    area * 0.5
}
