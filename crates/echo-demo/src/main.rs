use anyhow::Result;

use echo_engine::logging::{LoggingConfig, init_logging};
use echo_framework::prelude::*;

/// A handful of squares bouncing inside the window.
struct Bounce {
    squares: Vec<Square>,
}

struct Square {
    rect: Rect,
    velocity: Vec2,
    color: Color,
}

impl Bounce {
    fn new() -> Self {
        let palette = [
            Color::from_rgba_u8(239, 71, 111, 255),
            Color::from_rgba_u8(255, 209, 102, 255),
            Color::from_rgba_u8(6, 214, 160, 255),
            Color::from_rgba_u8(17, 138, 178, 255),
        ];
        let squares = palette
            .iter()
            .enumerate()
            .map(|(i, &color)| {
                let i = i as f32;
                Square {
                    rect: Rect::new(40.0 + i * 90.0, 30.0 + i * 60.0, 48.0, 48.0),
                    velocity: Vec2::new(120.0 + i * 35.0, 90.0 - i * 25.0),
                    color,
                }
            })
            .collect();
        Self { squares }
    }
}

impl Game for Bounce {
    fn load_content(&mut self, host: &mut EchoGame<WgpuEngine>) -> Result<()> {
        let greeting = host.content().load_string("greeting.txt")?;
        log::info!("{}", greeting.trim());
        Ok(())
    }

    fn update(&mut self, host: &mut EchoGame<WgpuEngine>, time: &GameTime) -> GameControl {
        let bounds = host.graphics().applied();
        let (w, h) = (bounds.width as f32, bounds.height as f32);

        for sq in &mut self.squares {
            sq.rect = sq.rect.translated(sq.velocity * time.elapsed);

            if sq.rect.origin.x < 0.0 || sq.rect.origin.x + sq.rect.size.x > w {
                sq.velocity.x = -sq.velocity.x;
                sq.rect.origin.x = sq.rect.origin.x.clamp(0.0, (w - sq.rect.size.x).max(0.0));
            }
            if sq.rect.origin.y < 0.0 || sq.rect.origin.y + sq.rect.size.y > h {
                sq.velocity.y = -sq.velocity.y;
                sq.rect.origin.y = sq.rect.origin.y.clamp(0.0, (h - sq.rect.size.y).max(0.0));
            }
        }
        GameControl::Continue
    }

    fn draw(&mut self, host: &EchoGame<WgpuEngine>, _time: &GameTime) -> Result<()> {
        let Some(mut batch) = host.sprite_batch() else {
            return Ok(());
        };

        batch.begin(SortMode::Deferred)?;
        for sq in &self.squares {
            batch.draw(sq.rect, sq.color)?;
        }
        batch.end()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::with_default_filter("info,wgpu_core=warn,wgpu_hal=warn"));

    // echo.toml and Content/ are looked up in the working directory.
    let config = GameConfig::load_or_default("echo.toml")?;
    let host = EchoGame::new(config, WgpuEngine::new()?)?;

    host.run(Bounce::new())
}
