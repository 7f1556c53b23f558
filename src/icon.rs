use conway_life::config::{self, Colour};
use winit::window::Icon;

pub const ICON_SIZE: u32 = 64;

/// Rasterizes a `squares` x `squares` grid of rounded squares into RGBA.
pub fn icon_pixels(size: u32, colours: &[Colour], squares: u32) -> Vec<u8> {
    let mut pixels = vec![0u8; (size * size * 4) as usize];
    if colours.is_empty() || squares == 0 {
        return pixels;
    }

    let padding = size / (squares * 4);
    let side = size.saturating_sub(padding * (squares + 1)) / squares;
    let radius = side as f32 * 0.3;

    for a in 0..squares {
        for b in 0..squares {
            let Colour(rgba) = colours[((a * 7 + b * 3) as usize) % colours.len()];
            let x0 = padding + a * (side + padding);
            let y0 = padding + b * (side + padding);
            for y in y0..y0 + side {
                for x in x0..x0 + side {
                    let local = ((x - x0) as f32 + 0.5, (y - y0) as f32 + 0.5);
                    if inside_rounded(local, side as f32, radius) {
                        let index = ((y * size + x) * 4) as usize;
                        pixels[index..index + 4].copy_from_slice(&rgba);
                    }
                }
            }
        }
    }
    pixels
}

fn inside_rounded((x, y): (f32, f32), side: f32, radius: f32) -> bool {
    let cx = x.clamp(radius, side - radius);
    let cy = y.clamp(radius, side - radius);
    let (dx, dy) = (x - cx, y - cy);
    dx * dx + dy * dy <= radius * radius
}

pub fn window_icon(icon: &config::Icon) -> Option<Icon> {
    let pixels = icon_pixels(ICON_SIZE, &icon.colours, icon.squares);
    Icon::from_rgba(pixels, ICON_SIZE, ICON_SIZE)
        .map_err(|err| log::warn!("Unable to build window icon: {}", err))
        .ok()
}
