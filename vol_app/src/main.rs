/*
    vol_app
    Author: Michal Majer
    Date: 2022-05-05
*/

//! Volume rendering demo app
//!
//! Launch without arguments to see generated volumes, for example:
//! `cargo run --release --bin vol_app`
//!
//! Mouse drag rotates, wheel zooms.
//! G generator, P palette, O opacity, B background, R renderer, L lighting, J jitter,
//! A auto rotation, +/- step multiplier, Z/X and C/V cutoff bounds,
//! Space resets the camera.

use std::{
    error::Error,
    process::ExitCode,
    time::{Duration, Instant},
};

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

mod args;
mod viewer;

use crate::{
    args::{get_command, Config},
    viewer::{Action, Viewer},
};

const WIDTH: usize = 512;
const HEIGHT: usize = 512;
const TICK: Duration = Duration::from_millis(60);

const KEY_ACTIONS: [(Key, Action); 16] = [
    (Key::G, Action::NextGenerator),
    (Key::P, Action::NextPalette),
    (Key::O, Action::NextOpacity),
    (Key::B, Action::NextBackground),
    (Key::R, Action::SwitchRenderer),
    (Key::L, Action::ToggleLighting),
    (Key::J, Action::ToggleJitter),
    (Key::A, Action::ToggleAutoRotate),
    (Key::Equal, Action::MoreSteps),
    (Key::NumPadPlus, Action::MoreSteps),
    (Key::Minus, Action::FewerSteps),
    (Key::NumPadMinus, Action::FewerSteps),
    (Key::Z, Action::CutoffLow(-1)),
    (Key::X, Action::CutoffLow(1)),
    (Key::C, Action::CutoffHigh(-1)),
    (Key::V, Action::CutoffHigh(1)),
];

fn run(cfg: Config) -> Result<(), Box<dyn Error>> {
    let mut window = Window::new(
        "vol_app",
        WIDTH,
        HEIGHT,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.limit_update_rate(Some(Duration::from_micros(16_600)));

    let mut viewer = Viewer::new(WIDTH, HEIGHT, cfg.settings)?;
    match &cfg.file {
        Some(path) => viewer.open(path, cfg.raw)?,
        None => viewer.generate()?,
    }

    let mut size = (WIDTH, HEIGHT);
    let mut mouse_down = false;
    let mut last_tick = Instant::now();
    let mut pixels = Vec::new();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        for (key, action) in KEY_ACTIONS {
            if window.is_key_pressed(key, KeyRepeat::No) {
                if let Err(e) = viewer.handle(action) {
                    eprintln!("Error: {e}");
                }
            }
        }
        if window.is_key_pressed(Key::Space, KeyRepeat::No) {
            viewer.handle(Action::ResetCamera)?;
        }

        // mouse
        let pressed = window.get_mouse_down(MouseButton::Left);
        if let Some((x, y)) = window.get_mouse_pos(MouseMode::Discard) {
            match (mouse_down, pressed) {
                (false, true) => viewer.view_mut().mouse_press(x, y),
                (true, true) => {
                    viewer.view_mut().mouse_move(x, y);
                }
                (true, false) => viewer.view_mut().mouse_release(),
                (false, false) => (),
            }
        }
        mouse_down = pressed;

        if let Some((_, scroll)) = window.get_scroll_wheel() {
            viewer.view_mut().wheel(scroll.signum());
        }

        let current = window.get_size();
        if current != size && current.0 > 0 && current.1 > 0 {
            size = current;
            viewer.view_mut().resize(size.0, size.1);
        }

        if last_tick.elapsed() >= TICK {
            last_tick = Instant::now();
            if viewer.view().auto_rotate() {
                viewer.view_mut().tick();
            }
        }

        if viewer.take_redraw() {
            if let Err(e) = viewer.paint() {
                eprintln!("Error: {e}");
            }
            pixels = viewer.view().framebuffer().to_0rgb();
            window.set_title(&viewer.title());
        }

        if pixels.is_empty() {
            window.update();
        } else {
            let framebuffer = viewer.view().framebuffer();
            window.update_with_buffer(&pixels, framebuffer.width(), framebuffer.height())?;
        }
    }

    Ok(())
}

pub fn main() -> ExitCode {
    env_logger::init();

    let args = get_command().get_matches();
    let cfg = match Config::from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
