//! # picovg
//!
//! Small 2D vector graphics engine: paths are tessellated into triangle
//! geometry on the CPU and submitted to a pluggable GPU renderer
//! backend.
//!
//! Applications record paths (lines, beziers, arcs, and shape
//! primitives) under an accumulated affine transform, set paint and
//! stroke state, and call `fill()` or `stroke()`. The engine features:
//!
//! - Adaptive bezier flattening driven by the device pixel ratio
//! - Polygon winding enforcement for solid shapes and holes
//! - Miter/bevel/round join and butt/square/round cap geometry
//! - Antialiasing fringe generation with a convex-shape fast path
//! - Solid color, linear/radial/box gradient, and image pattern paints
//! - Scissoring, composite operations, and a bounded state stack
//!
//! ## Architecture
//!
//! The engine is a four-stage pipeline per fill or stroke:
//!
//! 1. **Command Buffer** — records path commands, transformed at append
//!    time into world space
//! 2. **Path Cache** — flattens curves into per-sub-path point lists and
//!    classifies every corner
//! 3. **Expanders** — emit triangle-fan fill and triangle-strip stroke
//!    vertices with antialiasing fringes
//! 4. **Renderer** — a backend trait that rasterizes the submitted
//!    geometry; GPU specifics never leak into the engine
//!
//! The engine is single-threaded: one frame is open at a time per
//! context, and all tessellation happens synchronously on the calling
//! thread.

// Foundation types and math
pub mod basics;
pub mod color;
pub mod math;
pub mod transform;

// Drawing state
pub mod paint;
pub mod state;

// Path recording and tessellation
pub mod command;
mod expand;
pub mod path_cache;

// Engine and backend boundary
pub mod context;
pub mod error;
pub mod renderer;
