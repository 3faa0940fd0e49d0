//! Path command recording.
//!
//! Paths are recorded as a flat sequence of tagged commands. Coordinates
//! are mapped through the current transform as they are appended, so
//! later transform changes never affect commands already in the buffer.
//! The buffer keeps the untransformed current point for the relative
//! constructions (quad-to conversion and arc-to tangents).

use smallvec::SmallVec;

use crate::basics::{Winding, KAPPA90, PI};
use crate::math::{dist_pt_seg, normalize, pt_equals};
use crate::transform::Transform;

/// One recorded path command, in world space once appended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    MoveTo {
        x: f32,
        y: f32,
    },
    LineTo {
        x: f32,
        y: f32,
    },
    BezierTo {
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x: f32,
        y: f32,
    },
    Close,
    Winding(Winding),
}

impl Command {
    fn apply_transform(&mut self, xform: &Transform) {
        match self {
            Command::MoveTo { x, y } | Command::LineTo { x, y } => {
                (*x, *y) = xform.transform_point(*x, *y);
            }
            Command::BezierTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                (*c1x, *c1y) = xform.transform_point(*c1x, *c1y);
                (*c2x, *c2y) = xform.transform_point(*c2x, *c2y);
                (*x, *y) = xform.transform_point(*x, *y);
            }
            Command::Close | Command::Winding(_) => {}
        }
    }

    fn end_point(&self) -> Option<(f32, f32)> {
        match *self {
            Command::MoveTo { x, y }
            | Command::LineTo { x, y }
            | Command::BezierTo { x, y, .. } => Some((x, y)),
            Command::Close | Command::Winding(_) => None,
        }
    }
}

/// Batch of commands a primitive composer emits before the
/// transform-and-append pass. Sized for the largest fixed composer
/// (rounded rect: 10 commands).
type CommandBatch = SmallVec<[Command; 10]>;

/// Append-only command recorder with amortized growth.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    // Untransformed current point, tracked for quad_to and arc_to.
    command_x: f32,
    command_y: f32,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(64),
            command_x: 0.0,
            command_y: 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Untransformed current point.
    pub fn current_point(&self) -> (f32, f32) {
        (self.command_x, self.command_y)
    }

    /// Transform a batch into world space and append it. The current
    /// point is taken from the last coordinate-carrying command in the
    /// batch, before transformation.
    fn append(&mut self, xform: &Transform, batch: impl IntoIterator<Item = Command>) {
        for mut cmd in batch {
            if let Some((x, y)) = cmd.end_point() {
                self.command_x = x;
                self.command_y = y;
            }
            cmd.apply_transform(xform);
            self.commands.push(cmd);
        }
    }

    // ====================================================================
    // Primitive commands
    // ====================================================================

    pub fn move_to(&mut self, xform: &Transform, x: f32, y: f32) {
        self.append(xform, [Command::MoveTo { x, y }]);
    }

    pub fn line_to(&mut self, xform: &Transform, x: f32, y: f32) {
        self.append(xform, [Command::LineTo { x, y }]);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bezier_to(
        &mut self,
        xform: &Transform,
        c1x: f32,
        c1y: f32,
        c2x: f32,
        c2y: f32,
        x: f32,
        y: f32,
    ) {
        self.append(
            xform,
            [Command::BezierTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            }],
        );
    }

    /// Quadratic bezier, converted to cubic with the 2/3 control-point
    /// rule from the untransformed current point.
    pub fn quad_to(&mut self, xform: &Transform, cx: f32, cy: f32, x: f32, y: f32) {
        let x0 = self.command_x;
        let y0 = self.command_y;
        self.append(
            xform,
            [Command::BezierTo {
                c1x: x0 + 2.0 / 3.0 * (cx - x0),
                c1y: y0 + 2.0 / 3.0 * (cy - y0),
                c2x: x + 2.0 / 3.0 * (cx - x),
                c2y: y + 2.0 / 3.0 * (cy - y),
                x,
                y,
            }],
        );
    }

    pub fn close_path(&mut self, xform: &Transform) {
        self.append(xform, [Command::Close]);
    }

    pub fn path_winding(&mut self, xform: &Transform, dir: Winding) {
        self.append(xform, [Command::Winding(dir)]);
    }

    /// Arc from the current point towards `(x1, y1)` and on to `(x2, y2)`,
    /// rounded with `radius`. Degenerate configurations (coincident or
    /// collinear points, tiny radius, tangent point too far away) fall
    /// back to a straight line to `(x1, y1)`.
    #[allow(clippy::too_many_arguments)]
    pub fn arc_to(
        &mut self,
        xform: &Transform,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        radius: f32,
        dist_tol: f32,
    ) {
        if self.commands.is_empty() {
            return;
        }
        let (x0, y0) = (self.command_x, self.command_y);

        if pt_equals(x0, y0, x1, y1, dist_tol)
            || pt_equals(x1, y1, x2, y2, dist_tol)
            || dist_pt_seg(x1, y1, x0, y0, x2, y2) < dist_tol * dist_tol
            || radius < dist_tol
        {
            self.line_to(xform, x1, y1);
            return;
        }

        // Tangential circle to the lines (x0,y0)-(x1,y1) and (x1,y1)-(x2,y2).
        let mut dx0 = x0 - x1;
        let mut dy0 = y0 - y1;
        let mut dx1 = x2 - x1;
        let mut dy1 = y2 - y1;
        normalize(&mut dx0, &mut dy0);
        normalize(&mut dx1, &mut dy1);
        let a = (dx0 * dx1 + dy0 * dy1).acos();
        let d = radius / (a / 2.0).tan();

        if d > 10000.0 {
            self.line_to(xform, x1, y1);
            return;
        }

        let (cx, cy, a0, a1, dir) = if crate::math::cross(dx0, dy0, dx1, dy1) > 0.0 {
            (
                x1 + dx0 * d + dy0 * radius,
                y1 + dy0 * d - dx0 * radius,
                dx0.atan2(-dy0),
                (-dx1).atan2(dy1),
                Winding::Cw,
            )
        } else {
            (
                x1 + dx0 * d - dy0 * radius,
                y1 + dy0 * d + dx0 * radius,
                (-dx0).atan2(dy0),
                dx1.atan2(-dy1),
                Winding::Ccw,
            )
        };

        self.arc(xform, cx, cy, radius, a0, a1, dir);
    }

    /// Circular arc approximated by cubic segments of at most 90°.
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        xform: &Transform,
        cx: f32,
        cy: f32,
        r: f32,
        a0: f32,
        a1: f32,
        dir: Winding,
    ) {
        // Normalize the sweep into (0, 2π] for CW, [-2π, 0) for CCW.
        let mut da = a1 - a0;
        if dir == Winding::Cw {
            if da.abs() >= PI * 2.0 {
                da = PI * 2.0;
            } else {
                while da < 0.0 {
                    da += PI * 2.0;
                }
            }
        } else if da.abs() >= PI * 2.0 {
            da = -PI * 2.0;
        } else {
            while da > 0.0 {
                da -= PI * 2.0;
            }
        }

        let ndivs = ((da.abs() / (PI * 0.5) + 0.5) as i32).clamp(1, 5);
        let hda = da / ndivs as f32 / 2.0;
        let mut kappa = (4.0 / 3.0 * (1.0 - hda.cos()) / hda.sin()).abs();
        if dir == Winding::Ccw {
            kappa = -kappa;
        }

        let join_with_line = !self.commands.is_empty();
        let mut batch = CommandBatch::new();

        let mut px = 0.0;
        let mut py = 0.0;
        let mut ptanx = 0.0;
        let mut ptany = 0.0;
        for i in 0..=ndivs {
            let a = a0 + da * (i as f32 / ndivs as f32);
            let dx = a.cos();
            let dy = a.sin();
            let x = cx + dx * r;
            let y = cy + dy * r;
            let tanx = -dy * r * kappa;
            let tany = dx * r * kappa;

            if i == 0 {
                batch.push(if join_with_line {
                    Command::LineTo { x, y }
                } else {
                    Command::MoveTo { x, y }
                });
            } else {
                batch.push(Command::BezierTo {
                    c1x: px + ptanx,
                    c1y: py + ptany,
                    c2x: x - tanx,
                    c2y: y - tany,
                    x,
                    y,
                });
            }
            px = x;
            py = y;
            ptanx = tanx;
            ptany = tany;
        }

        self.append(xform, batch);
    }

    // ====================================================================
    // Shape composers
    // ====================================================================

    pub fn rect(&mut self, xform: &Transform, x: f32, y: f32, w: f32, h: f32) {
        self.append(
            xform,
            [
                Command::MoveTo { x, y },
                Command::LineTo { x, y: y + h },
                Command::LineTo { x: x + w, y: y + h },
                Command::LineTo { x: x + w, y },
                Command::Close,
            ],
        );
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect(&mut self, xform: &Transform, x: f32, y: f32, w: f32, h: f32, r: f32) {
        self.rounded_rect_varying(xform, x, y, w, h, r, r, r, r);
    }

    /// Rounded rect with per-corner radii. Falls back to a plain rect
    /// below 0.1 radius; radii are clamped to the half extents and
    /// sign-corrected for negative width/height.
    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect_varying(
        &mut self,
        xform: &Transform,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rad_top_left: f32,
        rad_top_right: f32,
        rad_bottom_right: f32,
        rad_bottom_left: f32,
    ) {
        if rad_top_left < 0.1 && rad_top_right < 0.1 && rad_bottom_right < 0.1 && rad_bottom_left < 0.1
        {
            self.rect(xform, x, y, w, h);
            return;
        }

        let halfw = w.abs() * 0.5;
        let halfh = h.abs() * 0.5;
        let sign_w = if w >= 0.0 { 1.0 } else { -1.0 };
        let sign_h = if h >= 0.0 { 1.0 } else { -1.0 };
        let rx_bl = rad_bottom_left.min(halfw) * sign_w;
        let ry_bl = rad_bottom_left.min(halfh) * sign_h;
        let rx_br = rad_bottom_right.min(halfw) * sign_w;
        let ry_br = rad_bottom_right.min(halfh) * sign_h;
        let rx_tr = rad_top_right.min(halfw) * sign_w;
        let ry_tr = rad_top_right.min(halfh) * sign_h;
        let rx_tl = rad_top_left.min(halfw) * sign_w;
        let ry_tl = rad_top_left.min(halfh) * sign_h;
        let k = 1.0 - KAPPA90;

        self.append(
            xform,
            [
                Command::MoveTo { x, y: y + ry_tl },
                Command::LineTo { x, y: y + h - ry_bl },
                Command::BezierTo {
                    c1x: x,
                    c1y: y + h - ry_bl * k,
                    c2x: x + rx_bl * k,
                    c2y: y + h,
                    x: x + rx_bl,
                    y: y + h,
                },
                Command::LineTo { x: x + w - rx_br, y: y + h },
                Command::BezierTo {
                    c1x: x + w - rx_br * k,
                    c1y: y + h,
                    c2x: x + w,
                    c2y: y + h - ry_br * k,
                    x: x + w,
                    y: y + h - ry_br,
                },
                Command::LineTo { x: x + w, y: y + ry_tr },
                Command::BezierTo {
                    c1x: x + w,
                    c1y: y + ry_tr * k,
                    c2x: x + w - rx_tr * k,
                    c2y: y,
                    x: x + w - rx_tr,
                    y,
                },
                Command::LineTo { x: x + rx_tl, y },
                Command::BezierTo {
                    c1x: x + rx_tl * k,
                    c1y: y,
                    c2x: x,
                    c2y: y + ry_tl * k,
                    x,
                    y: y + ry_tl,
                },
                Command::Close,
            ],
        );
    }

    pub fn ellipse(&mut self, xform: &Transform, cx: f32, cy: f32, rx: f32, ry: f32) {
        self.append(
            xform,
            [
                Command::MoveTo { x: cx - rx, y: cy },
                Command::BezierTo {
                    c1x: cx - rx,
                    c1y: cy + ry * KAPPA90,
                    c2x: cx - rx * KAPPA90,
                    c2y: cy + ry,
                    x: cx,
                    y: cy + ry,
                },
                Command::BezierTo {
                    c1x: cx + rx * KAPPA90,
                    c1y: cy + ry,
                    c2x: cx + rx,
                    c2y: cy + ry * KAPPA90,
                    x: cx + rx,
                    y: cy,
                },
                Command::BezierTo {
                    c1x: cx + rx,
                    c1y: cy - ry * KAPPA90,
                    c2x: cx + rx * KAPPA90,
                    c2y: cy - ry,
                    x: cx,
                    y: cy - ry,
                },
                Command::BezierTo {
                    c1x: cx - rx * KAPPA90,
                    c1y: cy - ry,
                    c2x: cx - rx,
                    c2y: cy - ry * KAPPA90,
                    x: cx - rx,
                    y: cy,
                },
                Command::Close,
            ],
        );
    }

    pub fn circle(&mut self, xform: &Transform, cx: f32, cy: f32, r: f32) {
        self.ellipse(xform, cx, cy, r, r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIST_TOL: f32 = 0.01;

    fn ident() -> Transform {
        Transform::identity()
    }

    #[test]
    fn test_transform_applied_at_append_time() {
        let mut buf = CommandBuffer::new();
        let shifted = Transform::translation(100.0, 0.0);
        buf.move_to(&shifted, 1.0, 2.0);
        // Appending under a different transform later must not disturb
        // the already-recorded point.
        buf.line_to(&ident(), 5.0, 5.0);

        assert_eq!(buf.commands()[0], Command::MoveTo { x: 101.0, y: 2.0 });
        assert_eq!(buf.commands()[1], Command::LineTo { x: 5.0, y: 5.0 });
    }

    #[test]
    fn test_current_point_is_untransformed() {
        let mut buf = CommandBuffer::new();
        let shifted = Transform::translation(100.0, 100.0);
        buf.move_to(&shifted, 3.0, 4.0);
        assert_eq!(buf.current_point(), (3.0, 4.0));
    }

    #[test]
    fn test_quad_to_two_thirds_rule() {
        let mut buf = CommandBuffer::new();
        buf.move_to(&ident(), 0.0, 0.0);
        buf.quad_to(&ident(), 30.0, 0.0, 30.0, 30.0);

        match buf.commands()[1] {
            Command::BezierTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                assert!((c1x - 20.0).abs() < 1e-4);
                assert!(c1y.abs() < 1e-4);
                assert!((c2x - 30.0).abs() < 1e-4);
                assert!((c2y - 10.0).abs() < 1e-4);
                assert_eq!((x, y), (30.0, 30.0));
            }
            ref c => panic!("expected bezier, got {c:?}"),
        }
    }

    #[test]
    fn test_arc_to_degenerate_falls_back_to_line() {
        let mut buf = CommandBuffer::new();
        buf.move_to(&ident(), 5.0, 5.0);
        // All points coincident.
        buf.arc_to(&ident(), 5.0, 5.0, 5.0, 5.0, 4.0, DIST_TOL);
        assert_eq!(buf.commands()[1], Command::LineTo { x: 5.0, y: 5.0 });

        // Near-zero radius.
        let mut buf = CommandBuffer::new();
        buf.move_to(&ident(), 0.0, 0.0);
        buf.arc_to(&ident(), 10.0, 0.0, 10.0, 10.0, 0.001, DIST_TOL);
        assert_eq!(buf.commands()[1], Command::LineTo { x: 10.0, y: 0.0 });
    }

    #[test]
    fn test_arc_to_on_empty_buffer_is_noop() {
        let mut buf = CommandBuffer::new();
        buf.arc_to(&ident(), 10.0, 0.0, 10.0, 10.0, 4.0, DIST_TOL);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_arc_emits_bezier_segments() {
        let mut buf = CommandBuffer::new();
        buf.arc(&ident(), 0.0, 0.0, 10.0, 0.0, PI, Winding::Cw);

        // Half circle: two 90° segments after the initial move.
        assert_eq!(buf.commands().len(), 3);
        assert!(matches!(buf.commands()[0], Command::MoveTo { .. }));
        assert!(matches!(buf.commands()[1], Command::BezierTo { .. }));

        // A non-empty buffer joins with a line instead.
        let mut buf = CommandBuffer::new();
        buf.move_to(&ident(), -20.0, 0.0);
        buf.arc(&ident(), 0.0, 0.0, 10.0, 0.0, PI, Winding::Cw);
        assert!(matches!(buf.commands()[1], Command::LineTo { .. }));
    }

    #[test]
    fn test_arc_full_circle_sweep_clamped() {
        let mut buf = CommandBuffer::new();
        // Requesting more than a full turn clamps to one revolution:
        // 4 segments of 90° each.
        buf.arc(&ident(), 0.0, 0.0, 10.0, 0.0, PI * 10.0, Winding::Cw);
        assert_eq!(buf.commands().len(), 5);

        let last = buf.commands().last().unwrap().end_point().unwrap();
        assert!((last.0 - 10.0).abs() < 1e-3);
        assert!(last.1.abs() < 1e-3);
    }

    #[test]
    fn test_rect_sequence() {
        let mut buf = CommandBuffer::new();
        buf.rect(&ident(), 1.0, 2.0, 10.0, 20.0);
        assert_eq!(
            buf.commands(),
            &[
                Command::MoveTo { x: 1.0, y: 2.0 },
                Command::LineTo { x: 1.0, y: 22.0 },
                Command::LineTo { x: 11.0, y: 22.0 },
                Command::LineTo { x: 11.0, y: 2.0 },
                Command::Close,
            ]
        );
    }

    #[test]
    fn test_rounded_rect_small_radius_falls_back() {
        let mut buf = CommandBuffer::new();
        buf.rounded_rect(&ident(), 0.0, 0.0, 10.0, 10.0, 0.05);
        assert_eq!(buf.commands().len(), 5);
        assert!(buf.commands().iter().all(|c| !matches!(c, Command::BezierTo { .. })));
    }

    #[test]
    fn test_rounded_rect_radius_clamped_to_half_extent() {
        let mut buf = CommandBuffer::new();
        buf.rounded_rect(&ident(), 0.0, 0.0, 10.0, 10.0, 50.0);
        // First command starts at (x, y + clamped radius).
        assert_eq!(buf.commands()[0], Command::MoveTo { x: 0.0, y: 5.0 });
    }

    #[test]
    fn test_ellipse_closes() {
        let mut buf = CommandBuffer::new();
        buf.ellipse(&ident(), 0.0, 0.0, 10.0, 5.0);
        assert_eq!(buf.commands().len(), 6);
        assert_eq!(buf.commands()[5], Command::Close);
    }
}
