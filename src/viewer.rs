// Viewer event loop module
// Routes window, keyboard and drop events into the image roll and the
// renderer

use crate::cli::Args;
use crate::image_loader;
use crate::roll::{fit_rect, ImageRoll, RollDirection};
use crate::wgpu_renderer::WgpuRenderer;
use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

struct App {
    roll: ImageRoll,
    initial_size: (u32, u32),
    // Declared before `window`: the surface holds the window's handle, so
    // the renderer must drop first
    renderer: Option<WgpuRenderer>,
    window: Option<Arc<Window>>,
    fatal: Option<anyhow::Error>,
}

impl App {
    /// Window title follows the current image name; an empty name leaves
    /// the title untouched
    fn update_title(&self) {
        if let Some(window) = self.window.as_ref() {
            let name = self.roll.current_name();
            if !name.is_empty() {
                window.set_title(&name);
            }
        }
    }

    /// Decode the current image if the roll is dirty, then draw it scaled
    /// and centered. An empty roll draws nothing.
    fn redraw(&mut self) -> Result<()> {
        if self.roll.is_empty() {
            return Ok(());
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        if let Some(path) = self.roll.pending_load() {
            let image = image_loader::load_image(path, renderer.max_texture_size())?;
            renderer.upload_texture(&image)?;
            self.roll.mark_loaded();
        }

        let Some((img_w, img_h)) = renderer.texture_size() else {
            return Ok(());
        };
        let (width, height) = renderer.surface_size();
        renderer.render(fit_rect(img_w, img_h, width, height))?;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.initial_size;
        let attrs = Window::default_attributes()
            .with_title("pngroll")
            .with_inner_size(LogicalSize::new(width, height));
        let window = match event_loop
            .create_window(attrs)
            .context("Failed to create window")
        {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err),
        };

        match WgpuRenderer::new(window.clone()) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(err) => return self.fail(event_loop, err),
        }

        window.request_redraw();
        self.window = Some(window);
        self.update_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
                // Geometry changed; image and title did not
                self.roll.advance(RollDirection::Refresh);
                window.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !event.state.is_pressed() {
                    return;
                }
                let direction = match event.physical_key {
                    PhysicalKey::Code(KeyCode::ArrowLeft) => RollDirection::Previous,
                    PhysicalKey::Code(KeyCode::ArrowRight) => RollDirection::Next,
                    _ => return,
                };
                self.roll.advance(direction);
                self.update_title();
                window.request_redraw();
            }
            WindowEvent::DroppedFile(path) => {
                self.roll.reset_from_dropped(&path);
                info!(
                    "Dropped {}, roll now has {} image(s)",
                    path.display(),
                    self.roll.len()
                );
                self.update_title();
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }
}

/// Open the window and drive events until the viewer is closed
pub fn run(args: Args) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App {
        roll: ImageRoll::new(args.images),
        initial_size: (args.width, args.height),
        renderer: None,
        window: None,
        fatal: None,
    };

    event_loop.run_app(&mut app).context("Event loop failed")?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
