//! Scene constants.
//!
//! Everything the scene is built from lives in these parameter structs. The
//! `Default` impls hold the values the fan field is shown with; colours are
//! sRGB hex triplets and are converted with [`crate::data_structures::colour`]
//! when they reach the GPU.

use std::f32::consts::FRAC_PI_4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fovy: 65.0,
            near: 0.1,
            far: 300.0,
            position: [0.0, 2.0, 10.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererParams {
    pub clear_colour: u32,
}

impl Default for RendererParams {
    fn default() -> Self {
        Self {
            clear_colour: 0xffdbed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightParams {
    pub colour: u32,
    pub intensity: f32,
    /// The directional light shines from here towards the origin.
    pub position: [f32; 3],
    pub ambient_colour: u32,
    pub ambient_intensity: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            colour: 0xffdbed,
            intensity: 1.0,
            position: [1.0, 1.0, 1.0],
            ambient_colour: 0xffdbed,
            ambient_intensity: 0.1,
        }
    }
}

/// Linear fog between `near` and `far` view depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogParams {
    pub colour: u32,
    pub near: f32,
    pub far: f32,
}

impl Default for FogParams {
    fn default() -> Self {
        Self {
            colour: 0x000000,
            near: 50.0,
            far: 2000.0,
        }
    }
}

/// Layout of the figure copies on the XZ plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridParams {
    pub rows: usize,
    pub cols: usize,
    pub spacing: f32,
    /// Upper bound of the random X offset added to each copy.
    pub jitter: f32,
    /// Upper bound of the random per-axis scale.
    pub max_scale: f32,
}

impl GridParams {
    /// Distance from the grid centre to the first column.
    pub fn offset(&self) -> f32 {
        (self.cols.saturating_sub(1)) as f32 * self.spacing / 2.0
    }

    /// `[x, z]` of the copy in row `row` and column `col`, before jitter.
    pub fn base_position(&self, row: usize, col: usize) -> [f32; 2] {
        let offset = self.offset();
        [
            col as f32 * self.spacing - offset,
            row as f32 * self.spacing - offset,
        ]
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            spacing: 20.0,
            jitter: 2.0,
            max_scale: 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotScreenParams {
    pub center: [f32; 2],
    pub angle: f32,
    pub scale: f32,
    pub t_size: [f32; 2],
}

impl Default for DotScreenParams {
    fn default() -> Self {
        Self {
            center: [0.5, 0.5],
            angle: 1.57,
            scale: 100.0,
            t_size: [256.0, 256.0],
        }
    }
}

/// Per-frame speed ramps of the wing spin and the neck swing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationParams {
    pub wing_step: f32,
    pub wing_max: f32,
    pub neck_step: f32,
    pub neck_max: f32,
    /// The neck swings within `[-neck_limit, neck_limit]` radians.
    pub neck_limit: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            wing_step: 0.01,
            wing_max: 0.3,
            neck_step: 0.001,
            neck_max: 0.01,
            neck_limit: FRAC_PI_4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneParams {
    pub camera: CameraParams,
    pub renderer: RendererParams,
    pub light: LightParams,
    pub fog: FogParams,
    pub grid: GridParams,
    pub dot_screen: DotScreenParams,
    pub animation: AnimationParams,
    /// Length of each axes helper line.
    pub axes_size: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            camera: CameraParams::default(),
            renderer: RendererParams::default(),
            light: LightParams::default(),
            fog: FogParams::default(),
            grid: GridParams::default(),
            dot_screen: DotScreenParams::default(),
            animation: AnimationParams::default(),
            axes_size: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_centred_on_the_origin() {
        let grid = GridParams::default();
        assert_eq!(grid.offset(), 90.0);
        assert_eq!(grid.base_position(0, 0), [-90.0, -90.0]);
        assert_eq!(grid.base_position(9, 9), [90.0, 90.0]);
        assert_eq!(grid.base_position(2, 5), [10.0, -50.0]);
        assert_eq!(grid.len(), 100);
    }

    #[test]
    fn single_column_grid_has_no_offset() {
        let grid = GridParams {
            cols: 1,
            ..Default::default()
        };
        assert_eq!(grid.offset(), 0.0);
        let empty = GridParams {
            cols: 0,
            ..Default::default()
        };
        assert_eq!(empty.offset(), 0.0);
        assert!(empty.is_empty());
    }
}
