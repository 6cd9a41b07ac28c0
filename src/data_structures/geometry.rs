//! Procedural primitive geometry.
//!
//! All primitives are generated on the CPU with counter-clockwise front faces
//! and per-vertex normals:
//!
//! - [`Geometry::cylinder`] stands along +Y, centered at the origin, and may taper
//! - [`Geometry::cuboid`] is an axis aligned box centered at the origin
//! - [`Geometry::torus`] lies in the XY plane around the Z axis
//!
//! A [`Shape`] is the descriptor scene nodes carry; it is turned into GPU
//! buffers once per distinct shape.

use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::ModelVertex;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl Shape {
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        Shape::Cylinder {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
        }
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Shape::Box {
            width,
            height,
            depth,
        }
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Shape::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        }
    }

    pub fn geometry(&self) -> Geometry {
        match *self {
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => Geometry::cylinder(radius_top, radius_bottom, height, radial_segments),
            Shape::Box {
                width,
                height,
                depth,
            } => Geometry::cuboid(width, height, depth),
            Shape::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => Geometry::torus(radius, tube, radial_segments, tubular_segments),
        }
    }

    /// Debug label for GPU buffers.
    pub fn label(&self) -> String {
        match self {
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                ..
            } => format!("cylinder {radius_top}/{radius_bottom}x{height}"),
            Shape::Box {
                width,
                height,
                depth,
            } => format!("box {width}x{height}x{depth}"),
            Shape::Torus { radius, tube, .. } => format!("torus {radius}/{tube}"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    fn push(&mut self, position: Vector3<f32>, normal: Vector3<f32>) -> u32 {
        self.vertices.push(ModelVertex {
            position: position.into(),
            normal: normal.into(),
        });
        (self.vertices.len() - 1) as u32
    }

    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        let segments = radial_segments.max(3);
        let half_height = height / 2.0;
        // Normals on a tapered side lean towards the narrow end
        let slope = (radius_bottom - radius_top) / height;
        let mut geometry = Geometry::default();

        // Side: a top and a bottom ring with a duplicated seam vertex.
        let mut rows = [Vec::new(), Vec::new()];
        for (row, (radius, y)) in [(radius_top, half_height), (radius_bottom, -half_height)]
            .into_iter()
            .enumerate()
        {
            for x in 0..=segments {
                let theta = x as f32 / segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                let position = Vector3::new(radius * sin, y, radius * cos);
                let normal = Vector3::new(sin, slope, cos).normalize();
                rows[row].push(geometry.push(position, normal));
            }
        }
        for x in 0..segments as usize {
            let a = rows[0][x];
            let b = rows[1][x];
            let c = rows[1][x + 1];
            let d = rows[0][x + 1];
            geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        // Caps: a fan around one center vertex each.
        for (radius, sign) in [(radius_top, 1.0f32), (radius_bottom, -1.0)] {
            let normal = Vector3::new(0.0, sign, 0.0);
            let center = geometry.push(Vector3::new(0.0, half_height * sign, 0.0), normal);
            let start = geometry.vertices.len() as u32;
            for x in 0..=segments {
                let theta = x as f32 / segments as f32 * TAU;
                let (sin, cos) = theta.sin_cos();
                geometry.push(
                    Vector3::new(radius * sin, half_height * sign, radius * cos),
                    normal,
                );
            }
            for x in 0..segments {
                let i = start + x;
                if sign > 0.0 {
                    geometry.indices.extend_from_slice(&[i, i + 1, center]);
                } else {
                    geometry.indices.extend_from_slice(&[i + 1, i, center]);
                }
            }
        }
        geometry
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (w, h, d) = (width / 2.0, height / 2.0, depth / 2.0);
        // (normal, tangent u, tangent v) per face, u × v == normal
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ];
        let half = Vector3::new(w, h, d);
        let mut geometry = Geometry::default();
        for (normal, u, v) in faces {
            let normal = Vector3::from(normal);
            let u = Vector3::from(u);
            let v = Vector3::from(v);
            let start = geometry.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = normal + u * su + v * sv;
                let position = Vector3::new(corner.x * half.x, corner.y * half.y, corner.z * half.z);
                geometry.push(position, normal);
            }
            geometry
                .indices
                .extend_from_slice(&[start, start + 1, start + 2, start + 2, start + 3, start]);
        }
        geometry
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial = radial_segments.max(3);
        let tubular = tubular_segments.max(3);
        let mut geometry = Geometry::default();
        for j in 0..=radial {
            for i in 0..=tubular {
                let u = i as f32 / tubular as f32 * TAU;
                let v = j as f32 / radial as f32 * TAU;
                let position = Vector3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
                geometry.push(position, (position - center).normalize());
            }
        }
        for j in 1..=radial {
            for i in 1..=tubular {
                let a = (tubular + 1) * j + i - 1;
                let b = (tubular + 1) * (j - 1) + i - 1;
                let c = (tubular + 1) * (j - 1) + i;
                let d = (tubular + 1) * j + i;
                geometry.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        geometry
    }
}
