use nalgebra::{point, Point3};

use super::shader::{Slot, ValueKind};

/// Attributes every vertex carries, available as vertex shader inputs
pub const VERTEX_ATTRIBUTES: [Slot; 2] = [
    Slot::new("position", ValueKind::Vec3),
    Slot::new("texCoord", ValueKind::Vec3),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub tex_coord: Point3<f32>,
}

/// Indexed triangle list
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<[u32; 3]>) -> Mesh {
        Mesh { vertices, indices }
    }

    /// Square `<-1;1>^2` in the z = 0 plane, counter-clockwise when seen from +z
    pub fn plane() -> Mesh {
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let vertices = corners
            .iter()
            .map(|&(x, y)| Vertex {
                position: point![x, y, 0.0],
                tex_coord: point![(x + 1.0) * 0.5, (y + 1.0) * 0.5, 0.0],
            })
            .collect();
        Mesh::new(vertices, vec![[0, 1, 2], [2, 3, 0]])
    }

    /// Cube `<-1;1>^3`, texture coordinates `<0;1>^3`.
    /// Faces are clockwise when seen from outside.
    pub fn cube() -> Mesh {
        let corners = [
            (-1.0, -1.0, -1.0),
            (1.0, -1.0, -1.0),
            (1.0, 1.0, -1.0),
            (-1.0, 1.0, -1.0),
            (-1.0, -1.0, 1.0),
            (1.0, -1.0, 1.0),
            (1.0, 1.0, 1.0),
            (-1.0, 1.0, 1.0),
        ];
        let vertices = corners
            .iter()
            .map(|&(x, y, z)| Vertex {
                position: point![x, y, z],
                tex_coord: point![(x + 1.0) * 0.5, (y + 1.0) * 0.5, (z + 1.0) * 0.5],
            })
            .collect();

        let indices = vec![
            // front
            [0, 1, 2],
            [2, 3, 0],
            // right
            [1, 5, 6],
            [6, 2, 1],
            // back
            [7, 6, 5],
            [5, 4, 7],
            // left
            [4, 0, 3],
            [3, 7, 4],
            // bottom
            [4, 5, 1],
            [1, 0, 4],
            // top
            [3, 2, 6],
            [6, 7, 3],
        ];
        Mesh::new(vertices, indices)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }
}

#[cfg(test)]
mod test {

    use nalgebra::Vector3;

    use super::*;

    fn face_normal(mesh: &Mesh, tri: [u32; 3]) -> Vector3<f32> {
        let v = |i: u32| mesh.vertices()[i as usize].position;
        (v(tri[1]) - v(tri[0])).cross(&(v(tri[2]) - v(tri[0])))
    }

    #[test]
    fn cube_faces_wind_inwards() {
        let cube = Mesh::cube();
        assert_eq!(cube.indices().len(), 12);

        for tri in cube.indices() {
            let v0 = cube.vertices()[tri[0] as usize].position;
            // counter-clockwise normal points to the cube centre
            assert!(face_normal(&cube, *tri).dot(&v0.coords) < 0.0);
        }
    }

    #[test]
    fn plane_faces_z() {
        let plane = Mesh::plane();

        for tri in plane.indices() {
            assert!(face_normal(&plane, *tri).z > 0.0);
        }
        assert_eq!(plane.vertices()[2].tex_coord, point![1.0, 1.0, 0.0]);
    }
}
