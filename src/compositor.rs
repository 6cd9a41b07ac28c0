//! Ordered render passes for one frame.
//!
//! A frame is a list of [`Pass`]es. Scene passes draw every render whose layer
//! mask matches theirs, either straight onto the surface or into an offscreen
//! colour target. The dot-screen pass filters the offscreen target and blends
//! it onto the surface.

use crate::{
    data_structures::{layers::Layers, texture::Texture},
    pipelines::dot_screen::{DotScreenResources, DotScreenUniform},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    Surface,
    Offscreen,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Pass {
    Scene {
        label: &'static str,
        layers: Layers,
        /// Clear to the context clear colour, or to transparent black for
        /// offscreen targets. `false` keeps what earlier passes drew.
        clear: bool,
        target: PassTarget,
    },
    DotScreen,
}

impl Pass {
    /// Background on the surface, the filtered layer in front of it.
    pub fn filtered_layer(background: u8, filtered: u8) -> Vec<Pass> {
        vec![
            Pass::Scene {
                label: "Background Pass",
                layers: Layers::only(background),
                clear: true,
                target: PassTarget::Surface,
            },
            Pass::Scene {
                label: "Filtered Layer Pass",
                layers: Layers::only(filtered),
                clear: true,
                target: PassTarget::Offscreen,
            },
            Pass::DotScreen,
        ]
    }
}

#[derive(Debug)]
pub struct Compositor {
    pub passes: Vec<Pass>,
    pub offscreen: Texture,
    pub dot_screen: DotScreenResources,
}

impl Compositor {
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        let offscreen = mk_offscreen(device, config);
        let dot_screen =
            DotScreenResources::new(device, config.format, DotScreenUniform::default(), &offscreen);
        Self {
            passes: Pass::filtered_layer(0, 1),
            offscreen,
            dot_screen,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) {
        self.offscreen = mk_offscreen(device, config);
        self.dot_screen.rebind(device, &self.offscreen);
    }

    pub fn set_dot_screen(&mut self, queue: &wgpu::Queue, uniform: DotScreenUniform) {
        self.dot_screen.set_uniform(queue, uniform);
    }
}

fn mk_offscreen(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Texture {
    Texture::create_render_target(
        device,
        [config.width, config.height],
        config.format,
        "offscreen_target",
    )
}
