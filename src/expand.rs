//! Fill and stroke geometry expansion.
//!
//! Turns classified sub-paths into triangle-fan and triangle-strip
//! vertex lists. Fill emits one fan vertex per point plus, when
//! antialiasing is on, a feathered fringe ring around the boundary.
//! Stroke emits a strip offset along the miter extrusions with bevel or
//! round geometry at flagged corners and cap geometry at open ends.
//!
//! Vertex buffers are sized from per-path upper bounds before emission,
//! so the hot loops never reallocate.

use crate::basics::{LineCap, LineJoin, PI};
use crate::math::curve_divs;
use crate::path_cache::{CachePoint, PathCache, PointFlags};
use crate::renderer::Vertex;

/// Expand the flattened paths into fill fans plus an optional fringe
/// ring. `w` is the half fringe width (0 disables the ring);
/// `fringe_width` is the device fringe used to inset the fan.
pub(crate) fn expand_fill(
    cache: &mut PathCache,
    w: f32,
    line_join: LineJoin,
    miter_limit: f32,
    fringe_width: f32,
) {
    cache.calculate_joins(w, line_join, miter_limit);

    let fringe = w > 0.0;

    // Upper bound on vertex usage across all paths.
    let mut cverts = 0;
    for path in &cache.paths {
        cverts += path.point_count() + path.nbevel + 1;
        if fringe {
            cverts += (path.point_count() + path.nbevel * 5 + 1) * 2;
        }
    }
    cache.verts.clear();
    cache.verts.reserve(cverts);

    let convex = cache.paths.len() == 1 && cache.paths[0].convex;
    let woff = 0.5 * fringe_width;

    let PathCache { points, paths, verts, .. } = cache;
    for path in paths.iter_mut() {
        let pts = &points[path.first..path.first + path.count];

        path.fill_offset = verts.len();
        path.fill_count = 0;
        path.stroke_offset = 0;
        path.stroke_count = 0;
        if path.count == 0 {
            continue;
        }

        if fringe {
            // Inset the fan by half the fringe so shape plus feather
            // band cover exactly the original outline.
            for j in 0..pts.len() {
                let p1 = &pts[j];
                if p1.flags.contains(PointFlags::BEVEL) {
                    if p1.flags.contains(PointFlags::LEFT) {
                        verts.push(Vertex::new(
                            p1.x + p1.dmx * woff,
                            p1.y + p1.dmy * woff,
                            0.5,
                            1.0,
                        ));
                    } else {
                        let p0 = &pts[(j + pts.len() - 1) % pts.len()];
                        verts.push(Vertex::new(
                            p1.x + p0.dy * woff,
                            p1.y - p0.dx * woff,
                            0.5,
                            1.0,
                        ));
                        verts.push(Vertex::new(
                            p1.x + p1.dy * woff,
                            p1.y - p1.dx * woff,
                            0.5,
                            1.0,
                        ));
                    }
                } else {
                    verts.push(Vertex::new(
                        p1.x + p1.dmx * woff,
                        p1.y + p1.dmy * woff,
                        0.5,
                        1.0,
                    ));
                }
            }
        } else {
            for p in pts {
                verts.push(Vertex::new(p.x, p.y, 0.5, 1.0));
            }
        }

        path.fill_count = verts.len() - path.fill_offset;

        if fringe {
            let mut lw = w + woff;
            let rw = w - woff;
            let mut lu = 0.0;
            let ru = 1.0;
            path.stroke_offset = verts.len();

            // Convex shapes need only half a fringe: the inner edge
            // coincides with the fill edge.
            if convex {
                lw = woff;
                lu = 0.5;
            }

            for j in 0..pts.len() {
                let p0 = &pts[(j + pts.len() - 1) % pts.len()];
                let p1 = &pts[j];

                if p1
                    .flags
                    .intersects(PointFlags::BEVEL | PointFlags::INNER_BEVEL)
                {
                    bevel_join(verts, p0, p1, lw, rw, lu, ru);
                } else {
                    verts.push(Vertex::new(
                        p1.x + p1.dmx * lw,
                        p1.y + p1.dmy * lw,
                        lu,
                        1.0,
                    ));
                    verts.push(Vertex::new(
                        p1.x - p1.dmx * rw,
                        p1.y - p1.dmy * rw,
                        ru,
                        1.0,
                    ));
                }
            }

            // Loop the strip back onto its first pair.
            let (x0, y0) = {
                let v = verts[path.stroke_offset];
                (v.x, v.y)
            };
            let (x1, y1) = {
                let v = verts[path.stroke_offset + 1];
                (v.x, v.y)
            };
            verts.push(Vertex::new(x0, y0, lu, 1.0));
            verts.push(Vertex::new(x1, y1, ru, 1.0));

            path.stroke_count = verts.len() - path.stroke_offset;
        } else {
            path.stroke_offset = 0;
            path.stroke_count = 0;
        }
    }
}

/// Expand the flattened paths into stroke strips. `w` is the half
/// stroke width in device space; `fringe` the antialiasing band width
/// (0 disables feathering and collapses the u gradient).
pub(crate) fn expand_stroke(
    cache: &mut PathCache,
    w: f32,
    fringe: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f32,
    tess_tol: f32,
) {
    let aa = fringe;
    let ncap = curve_divs(w, PI, tess_tol);
    let w = w + aa * 0.5;

    // Without antialiasing the shader feather gradient is disabled by
    // placing both strip edges at the u midpoint.
    let (u0, u1) = if aa == 0.0 { (0.5, 0.5) } else { (0.0, 1.0) };

    cache.calculate_joins(w, line_join, miter_limit);

    let mut cverts = 0;
    for path in &cache.paths {
        if line_join == LineJoin::Round {
            cverts += (path.point_count() + path.nbevel * (ncap + 2) + 1) * 2;
        } else {
            cverts += (path.point_count() + path.nbevel * 5 + 1) * 2;
        }
        if !path.closed {
            if line_cap == LineCap::Round {
                cverts += (ncap * 2 + 2) * 2;
            } else {
                cverts += (3 + 3) * 2;
            }
        }
    }
    cache.verts.clear();
    cache.verts.reserve(cverts);

    let PathCache { points, paths, verts, .. } = cache;
    for path in paths.iter_mut() {
        let pts = &points[path.first..path.first + path.count];

        path.fill_offset = 0;
        path.fill_count = 0;

        let looped = path.closed;
        path.stroke_offset = verts.len();

        if path.count < 2 {
            path.stroke_count = 0;
            continue;
        }

        let (s, e) = if looped { (0, path.count) } else { (1, path.count - 1) };

        if !looped {
            let p0 = &pts[0];
            let p1 = &pts[1];
            let mut dx = p1.x - p0.x;
            let mut dy = p1.y - p0.y;
            crate::math::normalize(&mut dx, &mut dy);

            match line_cap {
                LineCap::Butt => butt_cap_start(verts, p0, dx, dy, w, -aa * 0.5, aa, u0, u1),
                LineCap::Square => butt_cap_start(verts, p0, dx, dy, w, w - aa, aa, u0, u1),
                LineCap::Round => round_cap_start(verts, p0, dx, dy, w, ncap, u0, u1),
            }
        }

        for j in s..e {
            let p0 = &pts[(j + path.count - 1) % path.count];
            let p1 = &pts[j];

            if p1
                .flags
                .intersects(PointFlags::BEVEL | PointFlags::INNER_BEVEL)
            {
                if line_join == LineJoin::Round {
                    round_join(verts, p0, p1, w, w, u0, u1, ncap);
                } else {
                    bevel_join(verts, p0, p1, w, w, u0, u1);
                }
            } else {
                verts.push(Vertex::new(p1.x + p1.dmx * w, p1.y + p1.dmy * w, u0, 1.0));
                verts.push(Vertex::new(p1.x - p1.dmx * w, p1.y - p1.dmy * w, u1, 1.0));
            }
        }

        if looped {
            let (x0, y0) = {
                let v = verts[path.stroke_offset];
                (v.x, v.y)
            };
            let (x1, y1) = {
                let v = verts[path.stroke_offset + 1];
                (v.x, v.y)
            };
            verts.push(Vertex::new(x0, y0, u0, 1.0));
            verts.push(Vertex::new(x1, y1, u1, 1.0));
        } else {
            let p0 = &pts[path.count - 2];
            let p1 = &pts[path.count - 1];
            let mut dx = p1.x - p0.x;
            let mut dy = p1.y - p0.y;
            crate::math::normalize(&mut dx, &mut dy);

            match line_cap {
                LineCap::Butt => butt_cap_end(verts, p1, dx, dy, w, -aa * 0.5, aa, u0, u1),
                LineCap::Square => butt_cap_end(verts, p1, dx, dy, w, w - aa, aa, u0, u1),
                LineCap::Round => round_cap_end(verts, p1, dx, dy, w, ncap, u0, u1),
            }
        }

        path.stroke_count = verts.len() - path.stroke_offset;
    }
}

/// Corner offsets for the concave side of a join: beveled corners use
/// the two segment normals, mitered corners the averaged extrusion.
fn choose_bevel(
    inner_bevel: bool,
    p0: &CachePoint,
    p1: &CachePoint,
    w: f32,
) -> (f32, f32, f32, f32) {
    if inner_bevel {
        (
            p1.x + p0.dy * w,
            p1.y - p0.dx * w,
            p1.x + p1.dy * w,
            p1.y - p1.dx * w,
        )
    } else {
        (
            p1.x + p1.dmx * w,
            p1.y + p1.dmy * w,
            p1.x + p1.dmx * w,
            p1.y + p1.dmy * w,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn bevel_join(
    verts: &mut Vec<Vertex>,
    p0: &CachePoint,
    p1: &CachePoint,
    lw: f32,
    rw: f32,
    lu: f32,
    ru: f32,
) {
    let dlx0 = p0.dy;
    let dly0 = -p0.dx;
    let dlx1 = p1.dy;
    let dly1 = -p1.dx;

    if p1.flags.contains(PointFlags::LEFT) {
        let (lx0, ly0, lx1, ly1) =
            choose_bevel(p1.flags.contains(PointFlags::INNER_BEVEL), p0, p1, lw);

        verts.push(Vertex::new(lx0, ly0, lu, 1.0));
        verts.push(Vertex::new(p1.x - dlx0 * rw, p1.y - dly0 * rw, ru, 1.0));

        if p1.flags.contains(PointFlags::BEVEL) {
            verts.push(Vertex::new(lx0, ly0, lu, 1.0));
            verts.push(Vertex::new(p1.x - dlx0 * rw, p1.y - dly0 * rw, ru, 1.0));
            verts.push(Vertex::new(lx1, ly1, lu, 1.0));
            verts.push(Vertex::new(p1.x - dlx1 * rw, p1.y - dly1 * rw, ru, 1.0));
        } else {
            let rx0 = p1.x - p1.dmx * rw;
            let ry0 = p1.y - p1.dmy * rw;

            verts.push(Vertex::new(p1.x, p1.y, 0.5, 1.0));
            verts.push(Vertex::new(p1.x - dlx0 * rw, p1.y - dly0 * rw, ru, 1.0));
            verts.push(Vertex::new(rx0, ry0, ru, 1.0));
            verts.push(Vertex::new(rx0, ry0, ru, 1.0));
            verts.push(Vertex::new(p1.x, p1.y, 0.5, 1.0));
            verts.push(Vertex::new(p1.x - dlx1 * rw, p1.y - dly1 * rw, ru, 1.0));
        }

        verts.push(Vertex::new(lx1, ly1, lu, 1.0));
        verts.push(Vertex::new(p1.x - dlx1 * rw, p1.y - dly1 * rw, ru, 1.0));
    } else {
        let (rx0, ry0, rx1, ry1) =
            choose_bevel(p1.flags.contains(PointFlags::INNER_BEVEL), p0, p1, -rw);

        verts.push(Vertex::new(p1.x + dlx0 * lw, p1.y + dly0 * lw, lu, 1.0));
        verts.push(Vertex::new(rx0, ry0, ru, 1.0));

        if p1.flags.contains(PointFlags::BEVEL) {
            verts.push(Vertex::new(p1.x + dlx0 * lw, p1.y + dly0 * lw, lu, 1.0));
            verts.push(Vertex::new(rx0, ry0, ru, 1.0));
            verts.push(Vertex::new(p1.x + dlx1 * lw, p1.y + dly1 * lw, lu, 1.0));
            verts.push(Vertex::new(rx1, ry1, ru, 1.0));
        } else {
            let lx0 = p1.x + p1.dmx * lw;
            let ly0 = p1.y + p1.dmy * lw;

            verts.push(Vertex::new(p1.x + dlx0 * lw, p1.y + dly0 * lw, lu, 1.0));
            verts.push(Vertex::new(p1.x, p1.y, 0.5, 1.0));
            verts.push(Vertex::new(lx0, ly0, lu, 1.0));
            verts.push(Vertex::new(lx0, ly0, lu, 1.0));
            verts.push(Vertex::new(p1.x + dlx1 * lw, p1.y + dly1 * lw, lu, 1.0));
            verts.push(Vertex::new(p1.x, p1.y, 0.5, 1.0));
        }

        verts.push(Vertex::new(p1.x + dlx1 * lw, p1.y + dly1 * lw, lu, 1.0));
        verts.push(Vertex::new(rx1, ry1, ru, 1.0));
    }
}

#[allow(clippy::too_many_arguments)]
fn round_join(
    verts: &mut Vec<Vertex>,
    p0: &CachePoint,
    p1: &CachePoint,
    lw: f32,
    rw: f32,
    lu: f32,
    ru: f32,
    ncap: usize,
) {
    let dlx0 = p0.dy;
    let dly0 = -p0.dx;
    let dlx1 = p1.dy;
    let dly1 = -p1.dx;

    if p1.flags.contains(PointFlags::LEFT) {
        let (lx0, ly0, lx1, ly1) =
            choose_bevel(p1.flags.contains(PointFlags::INNER_BEVEL), p0, p1, lw);
        let a0 = (-dly0).atan2(-dlx0);
        let mut a1 = (-dly1).atan2(-dlx1);
        if a1 > a0 {
            a1 -= PI * 2.0;
        }

        verts.push(Vertex::new(lx0, ly0, lu, 1.0));
        verts.push(Vertex::new(p1.x - dlx0 * rw, p1.y - dly0 * rw, ru, 1.0));

        let n = (((a0 - a1) / PI * ncap as f32).ceil() as usize).clamp(2, ncap);
        for i in 0..n {
            let u = i as f32 / (n - 1) as f32;
            let a = a0 + u * (a1 - a0);
            verts.push(Vertex::new(p1.x, p1.y, 0.5, 1.0));
            verts.push(Vertex::new(
                p1.x + a.cos() * rw,
                p1.y + a.sin() * rw,
                ru,
                1.0,
            ));
        }

        verts.push(Vertex::new(lx1, ly1, lu, 1.0));
        verts.push(Vertex::new(p1.x - dlx1 * rw, p1.y - dly1 * rw, ru, 1.0));
    } else {
        let (rx0, ry0, rx1, ry1) =
            choose_bevel(p1.flags.contains(PointFlags::INNER_BEVEL), p0, p1, -rw);
        let a0 = dly0.atan2(dlx0);
        let mut a1 = dly1.atan2(dlx1);
        if a1 < a0 {
            a1 += PI * 2.0;
        }

        verts.push(Vertex::new(p1.x + dlx0 * rw, p1.y + dly0 * rw, lu, 1.0));
        verts.push(Vertex::new(rx0, ry0, ru, 1.0));

        let n = (((a1 - a0) / PI * ncap as f32).ceil() as usize).clamp(2, ncap);
        for i in 0..n {
            let u = i as f32 / (n - 1) as f32;
            let a = a0 + u * (a1 - a0);
            verts.push(Vertex::new(
                p1.x + a.cos() * lw,
                p1.y + a.sin() * lw,
                lu,
                1.0,
            ));
            verts.push(Vertex::new(p1.x, p1.y, 0.5, 1.0));
        }

        verts.push(Vertex::new(p1.x + dlx1 * rw, p1.y + dly1 * rw, lu, 1.0));
        verts.push(Vertex::new(rx1, ry1, ru, 1.0));
    }
}

#[allow(clippy::too_many_arguments)]
fn butt_cap_start(
    verts: &mut Vec<Vertex>,
    p: &CachePoint,
    dx: f32,
    dy: f32,
    w: f32,
    d: f32,
    aa: f32,
    u0: f32,
    u1: f32,
) {
    let px = p.x - dx * d;
    let py = p.y - dy * d;
    let dlx = dy;
    let dly = -dx;
    verts.push(Vertex::new(
        px + dlx * w - dx * aa,
        py + dly * w - dy * aa,
        u0,
        0.0,
    ));
    verts.push(Vertex::new(
        px - dlx * w - dx * aa,
        py - dly * w - dy * aa,
        u1,
        0.0,
    ));
    verts.push(Vertex::new(px + dlx * w, py + dly * w, u0, 1.0));
    verts.push(Vertex::new(px - dlx * w, py - dly * w, u1, 1.0));
}

#[allow(clippy::too_many_arguments)]
fn butt_cap_end(
    verts: &mut Vec<Vertex>,
    p: &CachePoint,
    dx: f32,
    dy: f32,
    w: f32,
    d: f32,
    aa: f32,
    u0: f32,
    u1: f32,
) {
    let px = p.x + dx * d;
    let py = p.y + dy * d;
    let dlx = dy;
    let dly = -dx;
    verts.push(Vertex::new(px + dlx * w, py + dly * w, u0, 1.0));
    verts.push(Vertex::new(px - dlx * w, py - dly * w, u1, 1.0));
    verts.push(Vertex::new(
        px + dlx * w + dx * aa,
        py + dly * w + dy * aa,
        u0,
        0.0,
    ));
    verts.push(Vertex::new(
        px - dlx * w + dx * aa,
        py - dly * w + dy * aa,
        u1,
        0.0,
    ));
}

#[allow(clippy::too_many_arguments)]
fn round_cap_start(
    verts: &mut Vec<Vertex>,
    p: &CachePoint,
    dx: f32,
    dy: f32,
    w: f32,
    ncap: usize,
    u0: f32,
    u1: f32,
) {
    let px = p.x;
    let py = p.y;
    let dlx = dy;
    let dly = -dx;

    for i in 0..ncap {
        let a = i as f32 / (ncap - 1) as f32 * PI;
        let ax = a.cos() * w;
        let ay = a.sin() * w;
        verts.push(Vertex::new(
            px - dlx * ax - dx * ay,
            py - dly * ax - dy * ay,
            u0,
            1.0,
        ));
        verts.push(Vertex::new(px, py, 0.5, 1.0));
    }
    verts.push(Vertex::new(px + dlx * w, py + dly * w, u0, 1.0));
    verts.push(Vertex::new(px - dlx * w, py - dly * w, u1, 1.0));
}

#[allow(clippy::too_many_arguments)]
fn round_cap_end(
    verts: &mut Vec<Vertex>,
    p: &CachePoint,
    dx: f32,
    dy: f32,
    w: f32,
    ncap: usize,
    u0: f32,
    u1: f32,
) {
    let px = p.x;
    let py = p.y;
    let dlx = dy;
    let dly = -dx;

    verts.push(Vertex::new(px + dlx * w, py + dly * w, u0, 1.0));
    verts.push(Vertex::new(px - dlx * w, py - dly * w, u1, 1.0));

    for i in 0..ncap {
        let a = i as f32 / (ncap - 1) as f32 * PI;
        let ax = a.cos() * w;
        let ay = a.sin() * w;
        verts.push(Vertex::new(px, py, 0.5, 1.0));
        verts.push(Vertex::new(
            px - dlx * ax + dx * ay,
            py - dly * ax + dy * ay,
            u0,
            1.0,
        ));
    }
}
