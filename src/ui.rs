//! Host frontend
//!
//! [`BackgroundRenderer`] turns scanline notifications into an ARGB frame
//! using the tile cache and BGP. With the `sdl` feature, [`Ui`] shows that
//! frame in a window.

use crate::common::Byte;
use crate::ppu::tile::TileCache;
use crate::ppu::{ScanlineRenderer, VideoView, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Classic Game Boy green palette, indexed by shade
pub const PALETTE: [u32; 4] = [0xFF9BBC0F, 0xFF8BAC0F, 0xFF306230, 0xFF0F380F];

/// Draws the background layer line by line.
#[derive(Debug, Clone)]
pub struct BackgroundRenderer {
    cache: TileCache,
    pixels: Vec<u32>,
}

impl Default for BackgroundRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundRenderer {
    pub fn new() -> Self {
        Self {
            cache: TileCache::new(),
            pixels: vec![PALETTE[0]; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Frame buffer, row-major ARGB
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }
}

impl ScanlineRenderer for BackgroundRenderer {
    fn draw_line(&mut self, line: Byte, video: &VideoView<'_>) {
        let row = line as usize;
        if row >= SCREEN_HEIGHT {
            return;
        }
        let out = &mut self.pixels[row * SCREEN_WIDTH..(row + 1) * SCREEN_WIDTH];

        if !video.bg_enabled() {
            out.fill(PALETTE[0]);
            return;
        }

        let y = video.scroll_y().wrapping_add(line);
        for (x, pixel) in out.iter_mut().enumerate() {
            let x = video.scroll_x().wrapping_add(x as Byte);
            let tile = video.background_tile_at(x, y);
            let levels = self.cache.levels(tile, video.tile_version(tile), || video.read_tile(tile));
            let level = levels[(y as usize % 8) * 8 + x as usize % 8];
            *pixel = PALETTE[video.lcd().bg_shade(level) as usize];
        }
    }
}

#[cfg(feature = "sdl")]
pub use window::Ui;

#[cfg(feature = "sdl")]
mod window {
    use log::info;
    use sdl2::event::Event;
    use sdl2::keyboard::Keycode;
    use sdl2::pixels::PixelFormatEnum;
    use sdl2::render::{Canvas, TextureCreator};
    use sdl2::video::{Window, WindowContext};
    use sdl2::EventPump;
    use std::time::{Duration, Instant};

    use super::BackgroundRenderer;
    use crate::emu::Emulator;
    use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

    /// Scale factor for the window
    pub const SCALE: u32 = 4;

    /// SDL2 UI wrapper
    pub struct Ui {
        canvas: Canvas<Window>,
        event_pump: EventPump,
        texture_creator: TextureCreator<WindowContext>,
    }

    impl Ui {
        pub fn new() -> Result<Self, String> {
            let sdl_context = sdl2::init()?;
            let video_subsystem = sdl_context.video()?;

            let window = video_subsystem
                .window(
                    "gbcore",
                    SCREEN_WIDTH as u32 * SCALE,
                    SCREEN_HEIGHT as u32 * SCALE,
                )
                .position_centered()
                .build()
                .map_err(|e| e.to_string())?;

            let canvas = window
                .into_canvas()
                .software()
                .build()
                .map_err(|e| e.to_string())?;

            let texture_creator = canvas.texture_creator();
            let event_pump = sdl_context.event_pump()?;

            Ok(Self { canvas, event_pump, texture_creator })
        }

        /// Run frames until the window closes or `max_frames` is reached.
        pub fn run(
            &mut self,
            emulator: &mut Emulator<BackgroundRenderer>,
            max_frames: Option<u64>,
        ) -> Result<(), String> {
            let mut texture = self
                .texture_creator
                .create_texture_streaming(
                    PixelFormatEnum::ARGB8888,
                    SCREEN_WIDTH as u32,
                    SCREEN_HEIGHT as u32,
                )
                .map_err(|e| e.to_string())?;

            let frame_duration = Duration::from_secs_f64(1.0 / 60.0);

            'running: loop {
                let frame_start = Instant::now();

                for event in self.event_pump.poll_iter() {
                    match event {
                        Event::Quit { .. }
                        | Event::KeyDown { keycode: Some(Keycode::Escape), .. } => break 'running,
                        _ => {}
                    }
                }

                emulator.frame().map_err(|e| e.to_string())?;
                if max_frames.is_some_and(|max| emulator.frames() >= max) {
                    break 'running;
                }

                let bytes: Vec<u8> = emulator
                    .renderer()
                    .pixels()
                    .iter()
                    .flat_map(|pixel| pixel.to_ne_bytes())
                    .collect();
                texture
                    .update(None, &bytes, SCREEN_WIDTH * 4)
                    .map_err(|e| e.to_string())?;

                self.canvas.clear();
                self.canvas.copy(&texture, None, None)?;
                self.canvas.present();

                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    std::thread::sleep(frame_duration - elapsed);
                }
            }

            info!("window closed after {} frames", emulator.frames());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcd::Lcd;
    use crate::ppu::tile::TILE_COUNT;
    use crate::ppu::VRAM_SIZE;

    fn video_parts() -> (Lcd, Vec<u8>, [u32; TILE_COUNT]) {
        let mut vram = vec![0u8; VRAM_SIZE];
        // tile 1: every row high byte set, low clear -> level 2
        for row in 0..8 {
            vram[16 + row * 2] = 0xFF;
        }
        // second map column uses tile 1
        vram[0x1801] = 1;
        (Lcd::post_boot(), vram, [0; TILE_COUNT])
    }

    #[test]
    fn test_draws_background_through_palette() {
        let (mut lcd, vram, versions) = video_parts();
        lcd.bgp = 0b11_10_01_00;
        let mut renderer = BackgroundRenderer::new();

        renderer.draw_line(0, &VideoView::new(&lcd, &vram, &versions));
        let row = &renderer.pixels()[..SCREEN_WIDTH];
        assert!(row[..8].iter().all(|&p| p == PALETTE[0]));
        assert!(row[8..16].iter().all(|&p| p == PALETTE[2]));
        assert_eq!(renderer.cache().cached(), 2);
    }

    #[test]
    fn test_scroll_shifts_background() {
        let (mut lcd, vram, versions) = video_parts();
        lcd.bgp = 0b11_10_01_00;
        lcd.scx = 4;
        let mut renderer = BackgroundRenderer::new();

        renderer.draw_line(3, &VideoView::new(&lcd, &vram, &versions));
        let row = &renderer.pixels()[3 * SCREEN_WIDTH..4 * SCREEN_WIDTH];
        assert_eq!(row[3], PALETTE[0]);
        assert_eq!(row[4], PALETTE[2]);
        assert_eq!(row[11], PALETTE[2]);
        assert_eq!(row[12], PALETTE[0]);
    }

    #[test]
    fn test_background_disabled_and_vblank_lines() {
        let (mut lcd, vram, versions) = video_parts();
        lcd.lcdc &= !0x01;
        let mut renderer = BackgroundRenderer::new();

        renderer.draw_line(0, &VideoView::new(&lcd, &vram, &versions));
        renderer.draw_line(150, &VideoView::new(&lcd, &vram, &versions));
        assert!(renderer.pixels().iter().all(|&p| p == PALETTE[0]));
        assert_eq!(renderer.cache().cached(), 0);
    }
}
