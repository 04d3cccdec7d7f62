//! Primitive descriptions handed to the renderer

use std::path::PathBuf;

use crate::foundation::math::{Quat, Rgb, Vec3};

/// Renderer-agnostic description of one primitive
///
/// Positions are in world space unless the primitive is later placed with
/// [`Renderer::set_transform`](super::Renderer::set_transform) (entity bodies,
/// labels), in which case they are in the primitive's local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Filled triangle
    Triangle {
        /// Corners
        vertices: [Vec3; 3],
    },
    /// Unit arrow along local +X, placed at `origin`, rotated and scaled
    Arrow {
        /// Tail position
        origin: Vec3,
        /// Rotation taking +X to the arrow direction
        orientation: Quat,
        /// Tail to tip distance
        length: f64,
    },
    /// Cone centered at `center` whose tip points along `axis`
    Cone {
        /// Midpoint between apex and base
        center: Vec3,
        /// Unit axis from base towards tip
        axis: Vec3,
        /// Apex to base distance
        height: f64,
        /// Base radius
        radius: f64,
        /// Number of base facets
        resolution: u32,
    },
    /// Line segment
    Line {
        /// Start point
        start: Vec3,
        /// End point
        end: Vec3,
        /// Stroke width in pixels
        width: f64,
    },
    /// Filled polygon
    Polygon {
        /// Vertices in winding order
        vertices: Vec<Vec3>,
    },
    /// Vertices rendered as points
    Vertices {
        /// Points
        points: Vec<Vec3>,
    },
    /// Plane
    Plane {
        /// Point on the plane
        center: Vec3,
        /// Plane normal
        normal: Vec3,
    },
    /// Per-point colored cloud
    PointCloud {
        /// Points
        points: Vec<Vec3>,
        /// One color per point
        colors: Vec<Rgb>,
        /// Point size in pixels
        point_size: f64,
    },
    /// Flat regular polygon approximating a circle
    Circle {
        /// Center
        center: Vec3,
        /// Radius
        radius: f64,
        /// Number of sides
        sides: u32,
    },
    /// Sphere
    Sphere {
        /// Center
        center: Vec3,
        /// Radius
        radius: f64,
    },
    /// Camera-facing vector text at a world position
    Text {
        /// Content
        text: String,
        /// Anchor
        position: Vec3,
    },
    /// Aircraft body: square pyramid pointing along local +X
    Pyramid {
        /// Base half-width
        size: f64,
    },
    /// Body loaded from a model file
    Model {
        /// Mesh file
        model_file: PathBuf,
        /// Texture image, if one was found
        texture_file: Option<PathBuf>,
        /// Fixed X/Y/Z rotation in degrees applied to the model
        rotate: Vec3,
    },
    /// Camera-facing entity label
    Label {
        /// Content
        text: String,
    },
    /// One sample of an entity trail
    TrailPoint {
        /// Sample position
        position: Vec3,
        /// Point size in pixels
        point_size: f64,
    },
    /// Ground grid centered on the origin
    Grid {
        /// Total extent
        size: f64,
        /// Line spacing
        spacing: f64,
    },
    /// X/Y/Z axes at the origin
    OriginAxes {
        /// Axis length
        length: f64,
    },
    /// Terrain surface
    Terrain {
        /// Terrain mesh file
        mesh_file: PathBuf,
        /// Texture image, if one was found
        texture_file: Option<PathBuf>,
        /// Offset subtracted from every vertex
        translate: Vec3,
    },
}
