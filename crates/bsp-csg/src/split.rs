//! Polygon splitting against a plane, the kernel of every BSP operation.

use crate::{Classification, Plane3D, PlaneSide, Polygon};

/// Outcome of splitting one polygon by a plane.
#[derive(Debug, Clone, PartialEq)]
pub enum Split {
    /// Coplanar, facing the same way as the plane.
    CoplanarFront(Polygon),
    /// Coplanar, facing away from the plane.
    CoplanarBack(Polygon),
    /// Entirely in front (vertices may touch the plane).
    Front(Polygon),
    /// Entirely behind (vertices may touch the plane).
    Back(Polygon),
    /// Cut in two. A fragment with fewer than 3 vertices is dropped.
    Spanning {
        front: Option<Polygon>,
        back: Option<Polygon>,
    },
}

impl Plane3D {
    /// Splits `polygon` by this plane.
    ///
    /// A coplanar polygon is `CoplanarFront` if its plane faces the same way
    /// as this one (`dot > 0`), otherwise `CoplanarBack`. The dot test has no
    /// tolerance. Spanning fragments share the newly interpolated boundary
    /// vertices (as independent copies) and keep the parent's plane.
    pub fn split(&self, polygon: Polygon, epsilon: f32) -> Split {
        let sides = polygon.vertex_sides(self, epsilon);

        match Classification::from_sides(&sides) {
            Classification::Coplanar => {
                if self.normal().dot(&polygon.plane().normal()) > 0.0 {
                    Split::CoplanarFront(polygon)
                } else {
                    Split::CoplanarBack(polygon)
                }
            }
            Classification::Front => Split::Front(polygon),
            Classification::Back => Split::Back(polygon),
            Classification::Spanning => {
                let (front, back) = self.split_spanning(polygon, &sides);
                Split::Spanning { front, back }
            }
        }
    }

    /// Splits `polygon` by this plane, pushing the result into one of the
    /// four output lists. See [`Plane3D::split`] for the routing rules.
    pub fn split_polygon(
        &self,
        polygon: Polygon,
        epsilon: f32,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        match self.split(polygon, epsilon) {
            Split::CoplanarFront(p) => coplanar_front.push(p),
            Split::CoplanarBack(p) => coplanar_back.push(p),
            Split::Front(p) => front.push(p),
            Split::Back(p) => back.push(p),
            Split::Spanning {
                front: front_part,
                back: back_part,
            } => {
                front.extend(front_part);
                back.extend(back_part);
            }
        }
    }

    /// Cuts a spanning polygon into its front and back parts.
    ///
    /// Walks the polygon edges and builds two vertex lists, adding an
    /// interpolated vertex to both whenever an edge crosses the plane.
    fn split_spanning(
        &self,
        polygon: Polygon,
        sides: &[PlaneSide],
    ) -> (Option<Polygon>, Option<Polygon>) {
        let plane = polygon.plane().clone();
        let source_id = polygon.source_id();
        let vertices = polygon.into_vertices();
        let n = vertices.len();

        let mut front_verts = Vec::with_capacity(n + 1);
        let mut back_verts = Vec::with_capacity(n + 1);

        for i in 0..n {
            let j = (i + 1) % n;
            let (current, current_side) = (&vertices[i], sides[i]);
            let (next, next_side) = (&vertices[j], sides[j]);

            if current_side != PlaneSide::Back {
                front_verts.push(current.clone());
            }
            if current_side != PlaneSide::Front {
                back_verts.push(current.clone());
            }

            let crosses = matches!(
                (current_side, next_side),
                (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
            );

            if crosses {
                let t = self.intersect_parameter(current.position, next.position);
                let boundary = current.lerp(next, t);
                front_verts.push(boundary.clone());
                back_verts.push(boundary);
            }
        }

        let front = (front_verts.len() >= 3)
            .then(|| Polygon::with_plane(front_verts, plane.clone(), source_id));
        let back = (back_verts.len() >= 3)
            .then(|| Polygon::with_plane(back_verts, plane, source_id));

        (front, back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Vertex, PLANE_EPSILON};
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point2, Point3, Vector3};

    #[derive(Default)]
    struct Buckets {
        coplanar_front: Vec<Polygon>,
        coplanar_back: Vec<Polygon>,
        front: Vec<Polygon>,
        back: Vec<Polygon>,
    }

    fn split(plane: &Plane3D, polygon: Polygon) -> Buckets {
        let mut b = Buckets::default();
        plane.split_polygon(
            polygon,
            PLANE_EPSILON,
            &mut b.coplanar_front,
            &mut b.coplanar_back,
            &mut b.front,
            &mut b.back,
        );
        b
    }

    fn make_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Polygon {
        let v = |p: [f32; 3]| {
            Vertex::new(
                Point3::new(p[0], p[1], p[2]),
                Vector3::new(0.0, 0.0, 1.0),
                Point2::new(p[0], p[1]),
            )
        };
        Polygon::new(vec![v(a), v(b), v(c)], 1)
    }

    fn y_plane() -> Plane3D {
        Plane3D::new(Vector3::new(0.0, 1.0, 0.0), 0.0)
    }

    #[test]
    fn front_and_back_pass_through_unchanged() {
        let above = make_triangle([0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 2.0, 0.0]);
        let result = split(&y_plane(), above.clone());
        assert_eq!(result.front, vec![above]);
        assert!(result.back.is_empty());

        let below = make_triangle([0.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, -2.0, 0.0]);
        let result = split(&y_plane(), below.clone());
        assert_eq!(result.back, vec![below]);
        assert!(result.front.is_empty());
    }

    #[test]
    fn coplanar_routed_by_facing() {
        // Normal +Y, same as the plane
        let facing = make_triangle([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
        let result = split(&y_plane(), facing);
        assert_eq!(result.coplanar_front.len(), 1);
        assert!(result.coplanar_back.is_empty());

        // Normal -Y
        let opposed = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        let result = split(&y_plane(), opposed);
        assert_eq!(result.coplanar_back.len(), 1);
        assert!(result.coplanar_front.is_empty());
        assert!(result.front.is_empty() && result.back.is_empty());
    }

    #[test]
    fn spanning_triangle_preserves_area() {
        let tri = make_triangle([0.0, -1.0, 0.0], [2.0, 1.0, 0.0], [0.0, 3.0, 0.0]);
        let original_area = tri.area();

        let result = split(&y_plane(), tri);
        assert_eq!(result.front.len(), 1);
        assert_eq!(result.back.len(), 1);

        let total = result.front[0].area() + result.back[0].area();
        assert_abs_diff_eq!(total, original_area, epsilon = 1e-5);
    }

    #[test]
    fn spanning_fragments_share_boundary_vertices() {
        let tri = make_triangle([0.0, -1.0, 0.0], [2.0, 1.0, 0.0], [0.0, 3.0, 0.0]);
        let result = split(&y_plane(), tri);
        let front = &result.front[0];
        let back = &result.back[0];

        // One vertex behind, two in front: quad in front, triangle behind
        assert_eq!(front.len(), 4);
        assert_eq!(back.len(), 3);

        let on_plane = |p: &Polygon| -> Vec<Point3<f32>> {
            p.vertices()
                .iter()
                .filter(|v| v.position.y.abs() < PLANE_EPSILON)
                .map(|v| v.position)
                .collect()
        };
        let front_boundary = on_plane(front);
        let back_boundary = on_plane(back);
        assert_eq!(front_boundary.len(), 2);
        assert_eq!(back_boundary.len(), 2);
        for p in &front_boundary {
            assert!(back_boundary.contains(p));
        }
        assert!(front_boundary.contains(&Point3::new(1.0, 0.0, 0.0)));
        assert!(front_boundary.contains(&Point3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn split_interpolates_uv_and_keeps_source() {
        let tri = make_triangle([0.0, -1.0, 0.0], [2.0, 1.0, 0.0], [0.0, 3.0, 0.0]);
        let result = split(&y_plane(), tri);

        for v in result.back[0].vertices() {
            assert_abs_diff_eq!(v.uv.x, v.position.x, epsilon = 1e-6);
            assert_abs_diff_eq!(v.uv.y, v.position.y, epsilon = 1e-6);
        }
        assert_eq!(result.front[0].source_id(), 1);
        assert_eq!(result.back[0].source_id(), 1);
        assert_eq!(result.front[0].plane(), result.back[0].plane());
    }

    #[test]
    fn vertex_on_plane_goes_to_both_fragments() {
        // Apex on the plane, base straddling it
        let tri = make_triangle([0.0, 0.0, 0.0], [1.0, -1.0, 0.0], [1.0, 1.0, 0.0]);
        let result = split(&y_plane(), tri);

        assert_eq!(result.front[0].len(), 3);
        assert_eq!(result.back[0].len(), 3);
        let apex = Point3::new(0.0, 0.0, 0.0);
        assert!(result.front[0].vertices().iter().any(|v| v.position == apex));
        assert!(result.back[0].vertices().iter().any(|v| v.position == apex));
    }

    #[test]
    fn touching_triangle_is_not_split() {
        // One edge on the plane, rest in front
        let tri = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let result = split(&y_plane(), tri);
        assert_eq!(result.front.len(), 1);
        assert_eq!(result.front[0].len(), 3);
        assert!(result.back.is_empty());
    }
}
