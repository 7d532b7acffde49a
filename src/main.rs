//! Demo frontend: loads a ROM passed on the command line and drives a
//! `nes_core::System` in a Piston window, same windowing/texture-update
//! approach as the teacher's `main.rs`.

use std::env;
use std::fs;

use piston_window::*;

use nes_core::{Buttons, Config, System};

const SCALE: u32 = 3;

fn buttons_for_key(key: Key) -> Option<Buttons> {
    match key {
        Key::Z => Some(Buttons::A),
        Key::X => Some(Buttons::B),
        Key::RShift => Some(Buttons::SELECT),
        Key::Return => Some(Buttons::START),
        Key::Up => Some(Buttons::UP),
        Key::Down => Some(Buttons::DOWN),
        Key::Left => Some(Buttons::LEFT),
        Key::Right => Some(Buttons::RIGHT),
        _ => None,
    }
}

fn load_rom(path: &str) -> Vec<u8> {
    match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            log::error!("failed to read {}: {}", path, err);
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: nes-core <rom.nes>");
            std::process::exit(1);
        }
    };
    let data = load_rom(&path);

    let mut system = System::new(Config::default());
    if let Err(err) = system.load(&data) {
        log::error!("failed to load {}: {}", path, err);
        std::process::exit(1);
    }

    let width = nes_core::ppu::SCREEN_WIDTH as u32;
    let height = nes_core::ppu::SCREEN_HEIGHT as u32;

    let mut window: PistonWindow =
        WindowSettings::new("nes-core", (width * SCALE, height * SCALE))
            .exit_on_esc(true)
            .build()
            .unwrap_or_else(|e| panic!("Failed to build PistonWindow: {}", e));

    let mut texture_context = TextureContext {
        factory: window.factory.clone(),
        encoder: window.factory.create_command_buffer().into(),
    };
    let mut screen = image::ImageBuffer::new(width, height);
    let mut texture: G2dTexture =
        Texture::from_image(&mut texture_context, &screen, &TextureSettings::new()).unwrap();

    let mut held = Buttons::empty();

    while let Some(e) = window.next() {
        if e.render_args().is_some() {
            if !system.is_halted() {
                if let Err(err) = system.run_frame() {
                    log::error!("core halted: {}", err);
                }
            }

            if let Some(frame) = system.render() {
                for (i, argb) in frame.iter().enumerate() {
                    let x = (i % width as usize) as u32;
                    let y = (i / width as usize) as u32;
                    let r = (argb >> 16) as u8;
                    let g = (argb >> 8) as u8;
                    let b = *argb as u8;
                    screen.put_pixel(x, y, image::Rgba([r, g, b, 255]));
                }
                texture.update(&mut texture_context, &screen).unwrap();
            }

            window.draw_2d(&e, |c, g, device| {
                texture_context.encoder.flush(device);
                clear([0.0, 0.0, 0.0, 1.0], g);
                image(&texture, c.transform.scale(SCALE as f64, SCALE as f64), g);
            });
        }

        if let Some(Button::Keyboard(key)) = e.release_args() {
            if let Some(b) = buttons_for_key(key) {
                held.remove(b);
                system.set_controller(0, held);
            }
        }

        if let Some(Button::Keyboard(key)) = e.press_args() {
            match key {
                Key::R => system.reset(),
                Key::P => system.pause(!system.is_paused()),
                _ => {}
            }
            if let Some(b) = buttons_for_key(key) {
                held.insert(b);
                system.set_controller(0, held);
            }
        }
    }
}
