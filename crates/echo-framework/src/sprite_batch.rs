use echo_engine::coords::Rect;
use echo_engine::paint::Color;
use echo_engine::render::Sprite;

use crate::error::SpriteBatchError;
use crate::host::RenderDevice;

/// Order in which sprites of one batch are submitted.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SortMode {
    /// Draw order.
    #[default]
    Deferred,
    /// Highest depth first.
    BackToFront,
    /// Lowest depth first.
    FrontToBack,
}

/// Collects sprite draws between [`begin`](Self::begin) and
/// [`end`](Self::end) and submits them to its device as one batch.
#[derive(Debug)]
pub struct SpriteBatch<D: RenderDevice> {
    device: D,
    sprites: Vec<Sprite>,
    active: Option<SortMode>,
    batches_submitted: u64,
}

impl<D: RenderDevice> SpriteBatch<D> {
    /// Creates a batch bound to `device` for its whole life.
    pub fn new(device: D) -> Self {
        Self {
            device,
            sprites: Vec::new(),
            active: None,
            batches_submitted: 0,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Sprites drawn since `begin`.
    pub fn pending(&self) -> usize {
        self.sprites.len()
    }

    pub fn batches_submitted(&self) -> u64 {
        self.batches_submitted
    }

    pub fn begin(&mut self, sort: SortMode) -> Result<(), SpriteBatchError> {
        if self.active.is_some() {
            return Err(SpriteBatchError::BeginCalledTwice);
        }
        self.active = Some(sort);
        Ok(())
    }

    /// Queues a solid rectangle at depth 0.
    pub fn draw(&mut self, dest: Rect, color: Color) -> Result<(), SpriteBatchError> {
        self.draw_sprite(Sprite::new(dest, color))
    }

    pub fn draw_sprite(&mut self, sprite: Sprite) -> Result<(), SpriteBatchError> {
        if self.active.is_none() {
            return Err(SpriteBatchError::NotBegun);
        }
        self.sprites.push(sprite);
        Ok(())
    }

    /// Sorts and submits the batch; returns how many sprites were submitted.
    ///
    /// An empty batch is not submitted.
    pub fn end(&mut self) -> Result<usize, SpriteBatchError> {
        let sort = self.active.take().ok_or(SpriteBatchError::NotBegun)?;

        let mut sprites = std::mem::take(&mut self.sprites);
        match sort {
            SortMode::Deferred => {}
            SortMode::BackToFront => sprites.sort_by(|a, b| b.depth.total_cmp(&a.depth)),
            SortMode::FrontToBack => sprites.sort_by(|a, b| a.depth.total_cmp(&b.depth)),
        }

        let count = sprites.len();
        if count > 0 {
            self.device.submit(sprites);
            self.batches_submitted += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingDevice;

    fn at_depth(x: f32, depth: f32) -> Sprite {
        Sprite { dest: Rect::new(x, 0.0, 1.0, 1.0), color: Color::WHITE, depth }
    }

    #[test]
    fn draw_requires_begin() {
        let mut batch = SpriteBatch::new(RecordingDevice::new());
        assert_eq!(
            batch.draw(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE),
            Err(SpriteBatchError::NotBegun)
        );
        assert_eq!(batch.end(), Err(SpriteBatchError::NotBegun));
    }

    #[test]
    fn begin_twice_fails() {
        let mut batch = SpriteBatch::new(RecordingDevice::new());
        batch.begin(SortMode::Deferred).unwrap();
        assert_eq!(batch.begin(SortMode::Deferred), Err(SpriteBatchError::BeginCalledTwice));
        assert!(batch.is_active());
    }

    #[test]
    fn end_submits_exactly_the_drawn_sprites() {
        let device = RecordingDevice::new();
        let mut batch = SpriteBatch::new(device.clone());

        batch.begin(SortMode::Deferred).unwrap();
        batch.draw(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE).unwrap();
        batch.draw(Rect::new(5.0, 5.0, 10.0, 10.0), Color::BLACK).unwrap();
        assert_eq!(batch.pending(), 2);
        assert_eq!(batch.end().unwrap(), 2);

        let batches = device.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0][1].color, Color::BLACK);
        assert!(!batch.is_active());
        assert_eq!(batch.pending(), 0);
    }

    #[test]
    fn empty_batch_is_not_submitted() {
        let device = RecordingDevice::new();
        let mut batch = SpriteBatch::new(device.clone());
        batch.begin(SortMode::Deferred).unwrap();
        assert_eq!(batch.end().unwrap(), 0);
        assert!(device.batches().is_empty());
        assert_eq!(batch.batches_submitted(), 0);
    }

    #[test]
    fn sort_modes_order_by_depth() {
        let device = RecordingDevice::new();
        let mut batch = SpriteBatch::new(device.clone());

        for mode in [SortMode::BackToFront, SortMode::FrontToBack] {
            batch.begin(mode).unwrap();
            batch.draw_sprite(at_depth(0.0, 0.5)).unwrap();
            batch.draw_sprite(at_depth(1.0, 1.0)).unwrap();
            batch.draw_sprite(at_depth(2.0, 0.0)).unwrap();
            batch.end().unwrap();
        }

        let batches = device.batches();
        let depths = |i: usize| batches[i].iter().map(|s| s.depth).collect::<Vec<_>>();
        assert_eq!(depths(0), vec![1.0, 0.5, 0.0]);
        assert_eq!(depths(1), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn deferred_keeps_draw_order() {
        let device = RecordingDevice::new();
        let mut batch = SpriteBatch::new(device.clone());
        batch.begin(SortMode::Deferred).unwrap();
        batch.draw_sprite(at_depth(0.0, 1.0)).unwrap();
        batch.draw_sprite(at_depth(1.0, 0.0)).unwrap();
        batch.end().unwrap();

        let xs: Vec<f32> = device.batches()[0].iter().map(|s| s.dest.origin.x).collect();
        assert_eq!(xs, vec![0.0, 1.0]);
    }
}
