//! Shape geometry construction, one pure function per shape kind

use super::ShapeError;
use crate::foundation::math::{utils, Matrix3, Quat, Rotation3, Vec3};
use crate::protocol::{Color, ShapeKind};
use crate::render::Geometry;

const LINE_WIDTH: f64 = 2.0;
const CONE_RESOLUTION: u32 = 32;
const CIRCLE_SIDES: u32 = 30;

/// Build the primitive for a shape
///
/// `color` is the shape color, used for point clouds whose per-point colors
/// do not line up with their points.
pub fn build(kind: &ShapeKind, color: Color) -> Result<Geometry, ShapeError> {
    match kind {
        ShapeKind::Triangle { points } => triangle(points),
        ShapeKind::Arrow { points } => arrow(points),
        ShapeKind::Cone { apex, direction, height, base_radius } => {
            Ok(cone(apex, direction, *height, *base_radius))
        }
        ShapeKind::Line { points } => line(points),
        ShapeKind::Polygon { points } => polygon(points),
        ShapeKind::RawMesh { points } => Ok(Geometry::Vertices { points: points.clone() }),
        ShapeKind::Plane { center, normal } => Ok(plane(center, normal)),
        ShapeKind::PointCloud { points, point_colors, size } => {
            Ok(point_cloud(points, point_colors, *size, color))
        }
        ShapeKind::Circle { center, radius } => Ok(circle(center, *radius)),
        ShapeKind::Sphere { center, radius } => Ok(Geometry::Sphere {
            center: *center,
            radius: *radius,
        }),
        ShapeKind::Text { text, center } => Ok(Geometry::Text {
            text: text.clone(),
            position: *center,
        }),
    }
}

fn expect_points(kind: &'static str, points: &[Vec3], expected: usize) -> Result<(), ShapeError> {
    if points.len() == expected {
        Ok(())
    } else {
        Err(ShapeError::PointCount {
            kind,
            expected: format!("exactly {}", expected),
            actual: points.len(),
        })
    }
}

fn expect_at_least(kind: &'static str, points: &[Vec3], minimum: usize) -> Result<(), ShapeError> {
    if points.len() >= minimum {
        Ok(())
    } else {
        Err(ShapeError::PointCount {
            kind,
            expected: format!("at least {}", minimum),
            actual: points.len(),
        })
    }
}

/// Uses the first three points; extra points are ignored
fn triangle(points: &[Vec3]) -> Result<Geometry, ShapeError> {
    expect_at_least("triangle", points, 3)?;
    Ok(Geometry::Triangle {
        vertices: [points[0], points[1], points[2]],
    })
}

fn arrow(points: &[Vec3]) -> Result<Geometry, ShapeError> {
    expect_points("arrow", points, 2)?;
    let (start, end) = (points[0], points[1]);
    let span = end - start;
    let length = span.norm();

    // Zero-length arrows still get a valid frame
    let x = utils::try_normalize(&span).unwrap_or_else(Vec3::x);
    let arbitrary = Vec3::new(1.0, 2.0, 3.0);
    let z = utils::try_normalize(&x.cross(&arbitrary))
        .or_else(|| utils::try_normalize(&x.cross(&Vec3::z())))
        .unwrap_or_else(Vec3::z);
    let y = z.cross(&x);

    let basis = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]));
    Ok(Geometry::Arrow {
        origin: start,
        orientation: Quat::from_rotation_matrix(&basis),
        length,
    })
}

/// A zero direction leaves the axis zero and the center at the apex
fn cone(apex: &Vec3, direction: &Vec3, height: f64, radius: f64) -> Geometry {
    let dir = utils::try_normalize(direction).unwrap_or_else(Vec3::zeros);
    Geometry::Cone {
        center: apex + dir * (height / 2.0),
        axis: -dir,
        height,
        radius,
        resolution: CONE_RESOLUTION,
    }
}

fn line(points: &[Vec3]) -> Result<Geometry, ShapeError> {
    expect_points("line", points, 2)?;
    Ok(Geometry::Line {
        start: points[0],
        end: points[1],
        width: LINE_WIDTH,
    })
}

fn polygon(points: &[Vec3]) -> Result<Geometry, ShapeError> {
    expect_at_least("polygon", points, 3)?;
    Ok(Geometry::Polygon {
        vertices: points.to_vec(),
    })
}

fn plane(center: &Vec3, normal: &Vec3) -> Geometry {
    Geometry::Plane {
        center: *center,
        normal: utils::try_normalize(normal).unwrap_or(*normal),
    }
}

fn point_cloud(points: &[Vec3], point_colors: &[Color], size: f64, color: Color) -> Geometry {
    let colors = if point_colors.len() == points.len() {
        point_colors.iter().map(|c| c.to_rgb()).collect()
    } else {
        vec![color.to_rgb(); points.len()]
    };
    Geometry::PointCloud {
        points: points.to_vec(),
        colors,
        point_size: size,
    }
}

fn circle(center: &Vec3, radius: f64) -> Geometry {
    Geometry::Circle {
        center: *center,
        radius,
        sides: CIRCLE_SIDES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_line_requires_two_points() {
        let kind = ShapeKind::Line { points: vec![Vec3::zeros()] };
        let err = build(&kind, Color::WHITE).unwrap_err();
        assert!(matches!(err, ShapeError::PointCount { kind: "line", actual: 1, .. }));
    }

    #[test]
    fn test_arrow_frame_points_along_segment() {
        let kind = ShapeKind::Arrow {
            points: vec![Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 4.0, 0.0)],
        };
        let Geometry::Arrow { origin, orientation, length } = build(&kind, Color::WHITE).unwrap() else {
            panic!("expected an arrow");
        };

        assert_relative_eq!(origin, Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(length, 3.0, epsilon = 1e-12);
        assert_relative_eq!(orientation * Vec3::x(), Vec3::y(), epsilon = 1e-9);
    }

    #[test]
    fn test_arrow_with_coincident_points_has_zero_length() {
        let kind = ShapeKind::Arrow { points: vec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)] };
        let Geometry::Arrow { origin, orientation, length } = build(&kind, Color::WHITE).unwrap() else {
            panic!("expected an arrow");
        };
        assert_eq!(length, 0.0);
        assert_relative_eq!(origin, Vec3::new(2.0, 0.0, 0.0));
        assert!(orientation.into_inner().coords.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_triangle_uses_first_three_points() {
        let kind = ShapeKind::Triangle {
            points: vec![Vec3::zeros(), Vec3::x(), Vec3::y(), Vec3::z()],
        };
        assert_eq!(
            build(&kind, Color::WHITE),
            Ok(Geometry::Triangle { vertices: [Vec3::zeros(), Vec3::x(), Vec3::y()] })
        );

        let short = ShapeKind::Triangle { points: vec![Vec3::zeros(), Vec3::x()] };
        assert!(matches!(
            build(&short, Color::WHITE),
            Err(ShapeError::PointCount { kind: "triangle", actual: 2, .. })
        ));
    }

    #[test]
    fn test_zero_sizes_pass_through() {
        let sphere = ShapeKind::Sphere { center: Vec3::zeros(), radius: 0.0 };
        assert_eq!(build(&sphere, Color::WHITE), Ok(Geometry::Sphere { center: Vec3::zeros(), radius: 0.0 }));

        let circle = ShapeKind::Circle { center: Vec3::zeros(), radius: 0.0 };
        assert!(matches!(build(&circle, Color::WHITE), Ok(Geometry::Circle { radius, .. }) if radius == 0.0));

        let plane = ShapeKind::Plane { center: Vec3::zeros(), normal: Vec3::zeros() };
        assert_eq!(build(&plane, Color::WHITE), Ok(Geometry::Plane { center: Vec3::zeros(), normal: Vec3::zeros() }));

        let cone = ShapeKind::Cone { apex: Vec3::z(), direction: Vec3::zeros(), height: 0.0, base_radius: 1.0 };
        let Geometry::Cone { center, height, .. } = build(&cone, Color::WHITE).unwrap() else {
            panic!("expected a cone");
        };
        assert_relative_eq!(center, Vec3::z());
        assert_eq!(height, 0.0);
    }

    #[test]
    fn test_cone_is_centered_between_apex_and_base() {
        let kind = ShapeKind::Cone {
            apex: Vec3::new(0.0, 0.0, 10.0),
            direction: Vec3::new(0.0, 0.0, -2.0),
            height: 4.0,
            base_radius: 1.0,
        };
        let Geometry::Cone { center, axis, resolution, .. } = build(&kind, Color::WHITE).unwrap() else {
            panic!("expected a cone");
        };
        assert_relative_eq!(center, Vec3::new(0.0, 0.0, 8.0), epsilon = 1e-12);
        assert_relative_eq!(axis, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
        assert_eq!(resolution, 32);
    }

    #[test]
    fn test_point_cloud_falls_back_to_shape_color() {
        let kind = ShapeKind::PointCloud {
            points: vec![Vec3::zeros(), Vec3::x()],
            point_colors: vec![Color::new(255, 0, 0)],
            size: 3.0,
        };
        let Geometry::PointCloud { colors, .. } = build(&kind, Color::new(0, 255, 0)).unwrap() else {
            panic!("expected a point cloud");
        };
        assert_eq!(colors, vec![Color::new(0, 255, 0).to_rgb(); 2]);
    }

    #[test]
    fn test_point_cloud_uses_matching_point_colors() {
        let kind = ShapeKind::PointCloud {
            points: vec![Vec3::zeros(), Vec3::x()],
            point_colors: vec![Color::new(255, 0, 0), Color::new(0, 0, 255)],
            size: 3.0,
        };
        let Geometry::PointCloud { colors, .. } = build(&kind, Color::WHITE).unwrap() else {
            panic!("expected a point cloud");
        };
        assert_eq!(colors[1], Color::new(0, 0, 255).to_rgb());
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let kind = ShapeKind::Polygon { points: vec![Vec3::zeros(), Vec3::x()] };
        assert!(build(&kind, Color::WHITE).is_err());
    }
}
