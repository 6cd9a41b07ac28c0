//! Axes helper: X red, Y green, Z blue, drawn on the background layer.

use crate::pipelines::lines::LineVertex;

pub const AXES_VERTICES: u32 = 6;

pub fn axes_vertices(size: f32) -> [LineVertex; AXES_VERTICES as usize] {
    let line = |axis: [f32; 3], colour: [f32; 3]| {
        [
            LineVertex {
                position: [0.0; 3],
                colour,
            },
            LineVertex {
                position: axis.map(|c| c * size),
                colour,
            },
        ]
    };
    let [x0, x1] = line([1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
    let [y0, y1] = line([0.0, 1.0, 0.0], [0.0, 1.0, 0.0]);
    let [z0, z1] = line([0.0, 0.0, 1.0], [0.0, 0.0, 1.0]);
    [x0, x1, y0, y1, z0, z1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_axis_is_one_segment_in_its_own_colour() {
        let vertices = axes_vertices(5.0);
        for (axis, pair) in vertices.chunks(2).enumerate() {
            assert_eq!(pair[0].position, [0.0; 3]);
            let mut end = [0.0; 3];
            end[axis] = 5.0;
            assert_eq!(pair[1].position, end);
            let mut colour = [0.0; 3];
            colour[axis] = 1.0;
            assert_eq!(pair[0].colour, colour);
            assert_eq!(pair[1].colour, colour);
        }
    }
}
