//! Terminal SDF raymarcher
//!
//! Renders an animated, shaded octahedron by sphere tracing one ray per
//! terminal cell against a signed distance field.
//!
//! Quit with Q, Escape or Ctrl-C. Termination signals (INT/TERM/HUP/QUIT)
//! restore the terminal before the process exits with the signal number.

use std::process;
use std::sync::atomic::Ordering;
use std::time::Duration;

use ascii_marcher::renderer::Renderer;
use ascii_marcher::scene::Scene;
use ascii_marcher::signals;
use ascii_marcher::terminal::{self, parse_key_event, Action, Palette, TerminalSurface};

fn main() {
    let shutdown = match signals::install() {
        Ok(flag) => flag,
        Err(e) => {
            eprintln!("Failed to install signal handlers: {}", e);
            process::exit(1);
        }
    };

    // Capability snapshot before the surface takes over the screen.
    let palette = Palette::for_depth(terminal::detect_color_depth());

    let mut surface = match TerminalSurface::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize terminal: {}", e);
            process::exit(1);
        }
    };

    let (width, height) = surface.get_size();
    let mut renderer = Renderer::new(width.max(10), height.max(10));
    let scene = Scene::octahedron();

    loop {
        let signal = shutdown.load(Ordering::Relaxed);
        if signal != 0 {
            // Restore the terminal before reporting the signal as our status.
            drop(surface);
            process::exit(signal as i32);
        }

        if surface.check_resize() {
            let (width, height) = surface.get_size();
            renderer.resize(width.max(10), height.max(10));
        }

        renderer.render(&scene);
        let frame = match &palette {
            Some(palette) => renderer.to_ansi(palette),
            None => renderer.to_ascii(),
        };

        if let Err(e) = surface.draw(&frame) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                break;
            }
            eprintln!("Draw error: {}", e);
        }

        renderer.advance();

        // The poll timeout doubles as the inter-frame sleep.
        if let Ok(Some(key)) = surface.poll_input(Duration::from_millis(1)) {
            if parse_key_event(key) == Action::Quit {
                break;
            }
        }
    }
}
