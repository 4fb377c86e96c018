//! HUD backdrop: a wireframe terrain field with a "COMPROMISED" schematic
//! panel, rasterized on the CPU and composited on the GPU.

mod animation;
mod app;
mod canvas;
mod config;
mod gpu;
mod hud;
mod simulation;

use winit::event_loop::EventLoop;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };

    let mut app = app::App::new();
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop terminated with error: {}", e);
        std::process::exit(1);
    }
}
