//! Ephemeral annotation shapes

use serde::{Deserialize, Serialize};

use super::Color;
use crate::foundation::math::Vec3;

/// Geometry parameters, one variant per shape kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Filled triangle through three points
    Triangle {
        /// Corner points
        points: Vec<Vec3>,
    },
    /// Arrow from the first point to the second
    Arrow {
        /// Start and end point
        points: Vec<Vec3>,
    },
    /// Cone with its apex at `apex`, opening along `direction`
    Cone {
        /// Tip of the cone
        apex: Vec3,
        /// Axis from apex towards the base
        direction: Vec3,
        /// Apex to base distance
        height: f64,
        /// Base radius
        base_radius: f64,
    },
    /// Line segment between two points
    Line {
        /// Start and end point
        points: Vec<Vec3>,
    },
    /// Filled planar polygon
    Polygon {
        /// Vertices in winding order
        points: Vec<Vec3>,
    },
    /// Bare vertices without topology
    RawMesh {
        /// Vertices
        points: Vec<Vec3>,
    },
    /// Plane through `center` with the given normal
    Plane {
        /// Point on the plane
        center: Vec3,
        /// Plane normal
        normal: Vec3,
    },
    /// Colored point cloud
    PointCloud {
        /// Points
        points: Vec<Vec3>,
        /// Per-point colors; ignored unless one per point
        point_colors: Vec<Color>,
        /// Rendered point size
        size: f64,
    },
    /// Flat circle
    Circle {
        /// Circle center
        center: Vec3,
        /// Circle radius
        radius: f64,
    },
    /// Sphere
    Sphere {
        /// Sphere center
        center: Vec3,
        /// Sphere radius
        radius: f64,
    },
    /// Camera-facing text
    Text {
        /// Text content
        text: String,
        /// Anchor position
        center: Vec3,
    },
}

impl ShapeKind {
    /// Short name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Triangle { .. } => "triangle",
            ShapeKind::Arrow { .. } => "arrow",
            ShapeKind::Cone { .. } => "cone",
            ShapeKind::Line { .. } => "line",
            ShapeKind::Polygon { .. } => "polygon",
            ShapeKind::RawMesh { .. } => "raw-mesh",
            ShapeKind::Plane { .. } => "plane",
            ShapeKind::PointCloud { .. } => "point-cloud",
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Sphere { .. } => "sphere",
            ShapeKind::Text { .. } => "text",
        }
    }
}

/// One annotation shape with its lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Geometry
    pub kind: ShapeKind,
    /// Color
    pub color: Color,
    /// Opacity; values near zero mean "unset" and render opaque
    pub opacity: f64,
    /// Remaining frame count before eviction
    pub ttl: i32,
    /// Never evicted when set
    pub persistent: bool,
}

impl Shape {
    /// Shape with default styling and an unset ttl
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            color: Color::WHITE,
            opacity: 0.0,
            ttl: 0,
            persistent: false,
        }
    }

    /// Set the ttl
    pub fn with_ttl(mut self, ttl: i32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the opacity
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Mark the shape persistent
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

/// A batch of shapes delivered as one stream message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shapes {
    /// Shapes in draw order
    pub shapes: Vec<Shape>,
}

impl From<Vec<Shape>> for Shapes {
    fn from(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }
}
