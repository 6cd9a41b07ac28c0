//! The senpuki flow: a field of spinning fans behind a dot-screen filter.
//!
//! [`SenpukiFlow`] owns the primary figure, its grid of copies and the GPU
//! batches they are drawn from. Space toggles the animation; everything else
//! (orbit controls, resizing, the compositor passes) is handled by the engine.

use cgmath::Deg;
use instant::Duration;
use rand::Rng;
use wgpu::util::DeviceExt;
use winit::event::{ElementState, KeyEvent, WindowEvent};

use crate::{
    animation::AnimationState,
    camera::{Camera, Projection},
    context::{Context, InitContext},
    data_structures::{batch::MeshBatches, colour, layers::Layers, scene_graph::SceneNode},
    flow::{self, FlowConsturctor, GraphicsFlow},
    pipelines::{dot_screen::DotScreenUniform, light::LightUniform},
    render::{Lines, Render},
    scene::{
        axes::{AXES_VERTICES, axes_vertices},
        figure::Figure,
        instancer,
        params::SceneParams,
    },
};

#[derive(Debug)]
pub struct SenpukiFlow {
    params: SceneParams,
    figure: Figure,
    instances: Vec<SceneNode>,
    batches: MeshBatches,
    axes: wgpu::Buffer,
}

impl SenpukiFlow {
    pub fn new<R: Rng + ?Sized>(ctx: &InitContext, params: SceneParams, rng: &mut R) -> Self {
        let figure = Figure::build();
        let instances = instancer::instantiate(figure.root(), &params.grid, rng);

        let mut batches = MeshBatches::new();
        batches.write_to_buffers(
            &ctx.device,
            &ctx.queue,
            std::iter::once(figure.root()).chain(instances.iter()),
        );
        log::info!(
            "Scene ready: {} meshes in {} instances",
            figure.root().mesh_count(),
            batches.instance_count()
        );

        let axes = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Axes Buffer"),
                contents: bytemuck::cast_slice(&axes_vertices(params.axes_size)),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            params,
            figure,
            instances,
            batches,
            axes,
        }
    }
}

impl GraphicsFlow<AnimationState> for SenpukiFlow {
    fn on_init(&mut self, ctx: &mut Context, state: &mut AnimationState) {
        let SceneParams {
            camera,
            renderer,
            light,
            fog,
            dot_screen,
            animation,
            ..
        } = self.params;

        ctx.camera.camera = Camera::new(camera.position, camera.target);
        ctx.projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            Deg(camera.fovy),
            camera.near,
            camera.far,
        );
        ctx.clear_colour = colour::to_wgpu(renderer.clear_colour);

        let mut uniform = LightUniform::new(
            light.position,
            colour::scaled(light.colour, light.intensity),
            colour::scaled(light.ambient_colour, light.ambient_intensity),
        );
        uniform.set_fog(colour::hex_to_linear(fog.colour), fog.near, fog.far);
        ctx.light.uniform = uniform;
        ctx.light.write(&ctx.queue);

        ctx.compositor.set_dot_screen(
            &ctx.queue,
            DotScreenUniform::new(
                dot_screen.center,
                dot_screen.angle,
                dot_screen.scale,
                dot_screen.t_size,
            ),
        );

        *state = AnimationState::new(&animation);
    }

    fn on_update(&mut self, ctx: &Context, state: &mut AnimationState, _dt: Duration) {
        state.frame(&mut self.figure, &mut self.instances);
        self.batches.write_to_buffers(
            &ctx.device,
            &ctx.queue,
            std::iter::once(self.figure.root()).chain(self.instances.iter()),
        );
    }

    fn on_window_events(&mut self, _ctx: &Context, state: &mut AnimationState, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    logical_key,
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } = event
        {
            state.on_key(logical_key);
        }
    }

    fn on_render(&self) -> Render<'_> {
        Render::Composed(vec![
            self.batches.get_render(),
            Render::Lines(Lines {
                vertex: &self.axes,
                amount: AXES_VERTICES,
                layers: Layers::default(),
            }),
        ])
    }
}

/// Open the window and run the fan field until it is closed.
pub fn run() -> anyhow::Result<()> {
    let constructor: FlowConsturctor<AnimationState> = Box::new(|ctx: InitContext| {
        Box::pin(async move {
            let flow = SenpukiFlow::new(&ctx, SceneParams::default(), &mut rand::thread_rng());
            Box::new(flow) as Box<dyn GraphicsFlow<AnimationState>>
        })
    });
    flow::run(vec![constructor])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run().map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
