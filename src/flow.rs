//! Flow control and application event loop.
//!
//! This module provides the main event loop and the flow abstraction. A "flow"
//! is a self-contained part of the application that handles input, updates its
//! state and provides renderable objects each frame. The engine owns the GPU
//! [`Context`], drives all flows and renders them through the compositor.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S>`] is the trait for scenes that handle events and rendering
//! - [`FlowConsturctor<S>`] builds a flow asynchronously once the GPU is ready
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Forward window events to the orbit controls and to all flows
//! 2. Update flow state (`on_update`)
//! 3. Advance the orbit controls and upload the camera
//! 4. Run the compositor passes, collecting `on_render()` of every flow per pass
//! 5. Present frame

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    compositor::{Pass, PassTarget},
    context::{Context, InitContext},
    data_structures::{model::DrawModel, texture::Texture},
    render::{Instanced, Lines, Render},
};

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure context (camera, clear color, etc.)
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame before rendering
/// 4. `on_render()` is called once per scene pass and specifies how to render `self`
///
pub trait GraphicsFlow<S> {
    /// Initialize the flow and configure the context.
    ///
    /// This is the only place to modify the Context and configure things such as the default
    /// background colour, the lights or the camera start position.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S);

    /// Update state every frame.
    ///
    /// Called every frame with the elapsed time `dt`. Use for animations
    /// and for uploading changed instance data.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration);

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent);

    /// Return renderable objects for this flow.
    ///
    /// Each scene pass keeps the entries whose layers match its own.
    fn on_render(&self) -> Render<'_>;
}

// Dummy impl to make wasm work
impl<State> Debug for dyn GraphicsFlow<State> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `GraphicsFlow`. This allows GPU resources to be prepared up front.
pub type FlowConsturctor<S> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S>>>>>>;

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx.camera.controller.resize(height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
            self.ctx
                .compositor
                .resize(&self.ctx.device, &self.ctx.config);
            log::debug!("Resized to {}x{}", width, height);
        }
    }

    fn update(&mut self, graphics_flows: &mut [Box<dyn GraphicsFlow<State>>], dt: Duration) {
        graphics_flows
            .iter_mut()
            .for_each(|flow| flow.on_update(&self.ctx, &mut self.state, dt));

        let fovy = self.ctx.projection.fovy;
        let camera = &mut self.ctx.camera;
        camera.controller.update(&mut camera.camera, fovy);
        camera
            .uniform
            .update_view_proj(&camera.camera, &self.ctx.projection);
        self.ctx
            .queue
            .write_buffer(&camera.buffer, 0, bytemuck::cast_slice(&[camera.uniform]));
    }

    fn render(
        &self,
        graphics_flows: &[Box<dyn GraphicsFlow<State>>],
    ) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

        let ctx = &self.ctx;
        for pass in &ctx.compositor.passes {
            match pass {
                Pass::Scene {
                    label,
                    layers,
                    clear,
                    target,
                } => {
                    let (target_view, clear_colour) = match target {
                        PassTarget::Surface => (&view, ctx.clear_colour),
                        PassTarget::Offscreen => {
                            (&ctx.compositor.offscreen.view, wgpu::Color::TRANSPARENT)
                        }
                    };
                    let (load, depth_load) = if *clear {
                        (wgpu::LoadOp::Clear(clear_colour), wgpu::LoadOp::Clear(1.0))
                    } else {
                        (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
                    };
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some(*label),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: target_view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load,
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                            view: &ctx.depth_texture.view,
                            depth_ops: Some(wgpu::Operations {
                                load: depth_load,
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        }),
                        occlusion_query_set: None,
                        timestamp_writes: None,
                        multiview_mask: None,
                    });

                    let mut basics: Vec<Instanced> = Vec::new();
                    let mut trans: Vec<Instanced> = Vec::new();
                    let mut lines: Vec<Lines> = Vec::new();
                    graphics_flows.iter().for_each(|flow| {
                        flow.on_render()
                            .set_pipelines(layers, &mut basics, &mut trans, &mut lines);
                    });

                    render_pass.set_pipeline(&ctx.pipelines.lines);
                    render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
                    for line in lines {
                        render_pass.set_vertex_buffer(0, line.vertex.slice(..));
                        render_pass.draw(0..line.amount, 0..1);
                    }

                    // Opaque first, blended geometry must not hide anything drawn after it
                    for (pipeline, batch) in [
                        (&ctx.pipelines.basic, basics),
                        (&ctx.pipelines.transparent, trans),
                    ] {
                        render_pass.set_pipeline(pipeline);
                        for instanced in batch {
                            if instanced.amount == 0 || instanced.instance.size() == 0 {
                                log::warn!("you attemted to render something with zero instances");
                                continue;
                            }
                            render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                            render_pass.draw_mesh_instanced(
                                instanced.mesh,
                                0..instanced.amount as u32,
                                &ctx.camera.bind_group,
                                &ctx.light.bind_group,
                            );
                        }
                    }
                }
                Pass::DotScreen => {
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Dot Screen Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: None,
                        occlusion_query_set: None,
                        timestamp_writes: None,
                        multiview_mask: None,
                    });
                    ctx.compositor.dot_screen.draw(&mut render_pass);
                }
            }
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App<State: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg(target_arch = "wasm32")]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State>>>,
    // This holds the constructors at the start.
    // We use Option to `take()` it after use.
    constructors: Option<Vec<FlowConsturctor<State>>>,
    last_time: Instant,
}

impl<State: 'static> App<State> {
    #[cfg_attr(not(target_arch = "wasm32"), allow(unused_variables))]
    fn new(
        event_loop: &EventLoop<FlowEvent<State>>,
        constructors: Vec<FlowConsturctor<State>>,
    ) -> anyhow::Result<Self> {
        #[cfg(target_arch = "wasm32")]
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            #[cfg(target_arch = "wasm32")]
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
        })
    }
}

impl<State: 'static + Default> App<State> {
    fn on_initialized(&mut self, mut app_state: AppState<State>, flows: Vec<Box<dyn GraphicsFlow<State>>>) {
        self.graphics_flows = flows;
        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);
        self.graphics_flows
            .iter_mut()
            .for_each(|flow| flow.on_init(&mut app_state.ctx, &mut app_state.state));
        log::info!("{} flow(s) initialized", self.graphics_flows.len());
        app_state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(app_state);
    }
}

pub(crate) enum FlowEvent<State: 'static> {
    #[allow(dead_code)]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State>>>,
    },
}

impl<State> Debug for FlowEvent<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn canvas_attributes(
    window_attributes: winit::window::WindowAttributes,
) -> anyhow::Result<winit::window::WindowAttributes> {
    use anyhow::Context as _;
    use wasm_bindgen::JsCast;
    use winit::platform::web::WindowAttributesExtWebSys;

    const CANVAS_ID: &str = "canvas";

    let window = web_sys::window().context("no browser window")?;
    let document = window.document().context("no document")?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .with_context(|| format!("no element with id {CANVAS_ID}"))?;
    let html_canvas_element = canvas.unchecked_into();
    Ok(window_attributes.with_canvas(Some(html_canvas_element)))
}

impl<State: 'static + Default> ApplicationHandler<FlowEvent<State>> for App<State> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            // Already initialized, e.g. when resumed after a suspend
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(env!("CARGO_PKG_NAME"));

        #[cfg(target_arch = "wasm32")]
        {
            window_attributes = match canvas_attributes(window_attributes) {
                Ok(attributes) => attributes,
                Err(e) => {
                    log::error!("Cannot attach to the canvas: {:#}", e);
                    event_loop.exit();
                    return;
                }
            };
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;

            let flow_futures: Vec<_> = constructors
                .into_iter()
                // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => self.on_initialized(app_state, flows),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok((state, flows)) => {
                        if proxy
                            .send_event(FlowEvent::Initialized { state, flows })
                            .is_err()
                        {
                            log::error!("Event loop closed before initialization finished");
                        }
                    }
                    Err(e) => log::error!("App initialization failed: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent<State>) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized { state, flows } => self.on_initialized(state, flows),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // general stuff
        state.ctx.camera.controller.handle_window_events(&event);

        self.graphics_flows
            .iter_mut()
            .for_each(|f| f.on_window_events(&state.ctx, &mut state.state, &event));

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                state.update(&mut self.graphics_flows, dt);
                match state.render(&self.graphics_flows) {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Start the event loop and run `constructors`' flows until the window closes.
///
/// Logging is initialized here: `env_logger` (configured through `RUST_LOG`)
/// on native targets and the browser console on wasm.
pub fn run<State: 'static + Default>(constructors: Vec<FlowConsturctor<State>>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            eprintln!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {e}").into());
        }
    }

    let event_loop: EventLoop<FlowEvent<State>> = EventLoop::with_user_event().build()?;

    let mut app: App<State> = App::new(&event_loop, constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
