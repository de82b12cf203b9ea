// play.rs
//
// Copyright (c) 2026  giflet developers
//

use crate::block::{Animation, Frame};
use crate::error::DecodeError;
use pix::rgb::SRgba8;
use pix::Raster;
use std::sync::Arc;
use std::time::Instant;

/// Target for rendered frames.
///
/// The player calls [clear](trait.Surface.html#tymethod.clear) before a
/// frame when the previous frame requested background restoration (and
/// always before frame 0); otherwise frames composite over prior
/// content.
pub trait Surface {
    /// Blank the surface.
    fn clear(&mut self);
    /// Draw one frame.
    fn draw(&mut self, idx: usize, frame: &Frame);
}

/// External bitmap decoder for standalone frame images.
///
/// Splitting leaves pixel data compressed; a rasterizer turns one
/// frame's single-image GIF into a raster.
pub trait Rasterizer {
    fn rasterize(&mut self, image: &[u8])
        -> Result<Raster<SRgba8>, DecodeError>;
}

/// A [Surface](trait.Surface.html) backed by a `pix` raster.
pub struct RasterSurface<R: Rasterizer> {
    rasterizer: R,
    raster: Raster<SRgba8>,
}

impl<R: Rasterizer> RasterSurface<R> {
    /// Create a new raster surface with the given dimensions.
    pub fn new(rasterizer: R, width: u32, height: u32) -> Self {
        RasterSurface {
            rasterizer,
            raster: Raster::with_clear(width, height),
        }
    }
    /// Get the current surface contents.
    pub fn raster(&self) -> &Raster<SRgba8> {
        &self.raster
    }
}

impl<R: Rasterizer> Surface for RasterSurface<R> {
    fn clear(&mut self) {
        self.raster =
            Raster::with_clear(self.raster.width(), self.raster.height());
    }
    fn draw(&mut self, idx: usize, frame: &Frame) {
        match self.rasterizer.rasterize(frame.image()) {
            Ok(src) => {
                let w = src.width().min(self.raster.width()) as i32;
                let h = src.height().min(self.raster.height()) as i32;
                for y in 0..h {
                    for x in 0..w {
                        *self.raster.pixel_mut(x, y) = src.pixel(x, y);
                    }
                }
            }
            // a frame that cannot be rasterized is skipped, not fatal
            Err(e) => warn!("frame {}: {}", idx, e),
        }
    }
}

/// Playback scheduler for one animated surface.
///
/// Owns its timing state exclusively; create one player per surface.
/// The host calls [advance](struct.Player.html#method.advance) from its
/// render loop with the current time; the player draws whenever the
/// visible frame changes, catching up over missed intervals.
pub struct Player {
    autoplay: bool,
    paused: bool,
    state: Option<PlayState>,
}

/// Timing state while an animation is loaded
struct PlayState {
    animation: Arc<Animation>,
    frame_idx: usize,
    start_time: Instant,
    next_due_ms: u64,
}

impl Default for Player {
    fn default() -> Self {
        Player {
            autoplay: true,
            paused: true,
            state: None,
        }
    }
}

impl Player {
    /// Create a new player (autoplay on).
    pub fn new() -> Self {
        Self::default()
    }
    /// Set whether loading an animation starts playback immediately.
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
    /// Load an animation, replacing any current state.
    ///
    /// Frame 0 is drawn immediately; playback starts right away when
    /// autoplay is on, otherwise the player stays paused.
    pub fn load<S: Surface>(
        &mut self,
        animation: Arc<Animation>,
        now: Instant,
        surface: &mut S,
    ) -> Result<(), DecodeError> {
        if animation.frames().is_empty() {
            return Err(DecodeError::NoFrames);
        }
        let state = PlayState {
            animation,
            frame_idx: 0,
            start_time: now,
            next_due_ms: 0,
        };
        state.draw(surface);
        self.paused = !self.autoplay;
        self.state = Some(state);
        Ok(())
    }
    /// Resume playback.
    pub fn play(&mut self) {
        self.paused = false;
    }
    /// Pause playback.
    pub fn pause(&mut self) {
        self.paused = true;
    }
    /// Toggle playback: play if paused, pause if playing.
    pub fn toggle(&mut self) {
        self.paused = !self.paused;
    }
    /// Check whether playback is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
    /// Get the current frame index, if an animation is loaded.
    pub fn frame_idx(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.frame_idx)
    }
    /// Drop all playback state and force pause.
    ///
    /// Used when the active source changes or fails.
    pub fn reset(&mut self) {
        self.state = None;
        self.paused = true;
    }
    /// Advance playback to the given time.
    ///
    /// No-op while paused or with no animation loaded.  When the next
    /// frame is due, draws the current frame once and then steps the
    /// frame index over every interval that has elapsed, so a slow host
    /// tick skips intermediate frames instead of lagging behind the
    /// clock.
    pub fn advance<S: Surface>(&mut self, now: Instant, surface: &mut S) {
        if self.paused {
            return;
        }
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };
        let elapsed = now
            .saturating_duration_since(state.start_time)
            .as_millis() as u64;
        if elapsed < state.next_due_ms {
            return;
        }
        state.draw(surface);
        let total = state.animation.total_delay_ms();
        while elapsed >= state.next_due_ms {
            let frames = state.animation.frames();
            let delay = u64::from(frames[state.frame_idx].delay_ms());
            state.next_due_ms += delay;
            state.frame_idx += 1;
            if state.frame_idx >= frames.len() {
                // declared repeat counts wrap just like zero (forever);
                // they are not counted down per pass
                state.frame_idx = 0;
            }
            if total == 0 {
                // all-zero delays can never catch up; step one frame
                break;
            }
        }
    }
}

impl PlayState {
    /// Draw the current frame, clearing first when the previous frame
    /// asked for background restoration
    fn draw<S: Surface>(&self, surface: &mut S) {
        let frames = self.animation.frames();
        if self.frame_idx == 0
            || frames[self.frame_idx - 1].clears_background()
        {
            surface.clear();
        }
        surface.draw(self.frame_idx, &frames[self.frame_idx]);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    enum Event {
        Clear,
        Draw(usize),
    }

    #[derive(Default)]
    struct TestSurface {
        events: Vec<Event>,
    }

    impl Surface for TestSurface {
        fn clear(&mut self) {
            self.events.push(Event::Clear);
        }
        fn draw(&mut self, idx: usize, _frame: &Frame) {
            self.events.push(Event::Draw(idx));
        }
    }

    fn anim(delays: &[u32], disposals: &[u8]) -> Arc<Animation> {
        let frames = delays
            .iter()
            .zip(disposals)
            .map(|(d, r)| Frame::new(vec![], *r, *d))
            .collect();
        Arc::new(Animation::new(frames, 0, 2, 2))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn load_draws_first_frame() {
        let mut p = Player::new();
        let mut s = TestSurface::default();
        p.load(anim(&[100], &[0]), Instant::now(), &mut s).unwrap();
        assert_eq!(s.events, [Event::Clear, Event::Draw(0)]);
        assert_eq!(p.frame_idx(), Some(0));
        assert!(!p.is_paused());
    }

    #[test]
    fn load_rejects_empty() {
        let mut p = Player::new();
        let mut s = TestSurface::default();
        let empty = Arc::new(Animation::new(vec![], 0, 2, 2));
        match p.load(empty, Instant::now(), &mut s) {
            Err(DecodeError::NoFrames) => {}
            r => panic!("{:?}", r),
        }
        assert_eq!(p.frame_idx(), None);
    }

    #[test]
    fn autoplay_off_stays_paused() {
        let mut p = Player::new().with_autoplay(false);
        let mut s = TestSurface::default();
        let t0 = Instant::now();
        p.load(anim(&[100], &[0]), t0, &mut s).unwrap();
        assert!(p.is_paused());
        s.events.clear();
        p.advance(t0 + ms(500), &mut s);
        assert!(s.events.is_empty());
        assert_eq!(p.frame_idx(), Some(0));
    }

    #[test]
    fn catch_up_is_time_based() {
        let t0 = Instant::now();
        let mut one = Player::new();
        let mut s1 = TestSurface::default();
        one.load(anim(&[100, 100, 100], &[0, 0, 0]), t0, &mut s1)
            .unwrap();
        one.advance(t0 + ms(350), &mut s1);

        let mut many = Player::new();
        let mut s2 = TestSurface::default();
        many.load(anim(&[100, 100, 100], &[0, 0, 0]), t0, &mut s2)
            .unwrap();
        many.advance(t0 + ms(348), &mut s2);
        many.advance(t0 + ms(349), &mut s2);
        many.advance(t0 + ms(350), &mut s2);

        // call granularity must not change where playback lands
        assert_eq!(one.frame_idx(), many.frame_idx());
        assert_eq!(one.frame_idx(), Some(1));
    }

    #[test]
    fn looping_wraps_in_bounds() {
        let t0 = Instant::now();
        let mut p = Player::new();
        let mut s = TestSurface::default();
        p.load(anim(&[100, 100, 100], &[0, 0, 0]), t0, &mut s)
            .unwrap();
        p.advance(t0 + ms(100_000), &mut s);
        assert!(p.frame_idx().unwrap() < 3);
    }

    #[test]
    fn disposal_drives_clear() {
        let t0 = Instant::now();
        let mut p = Player::new();
        let mut s = TestSurface::default();
        // frame 0 restores to background, frame 1 does not dispose
        p.load(anim(&[100, 100, 100], &[0x08, 0x04, 0x00]), t0, &mut s)
            .unwrap();
        p.advance(t0 + ms(50), &mut s); // still frame 0
        s.events.clear();
        p.advance(t0 + ms(150), &mut s); // frame 1, after disposal 8
        assert_eq!(s.events, [Event::Clear, Event::Draw(1)]);
        s.events.clear();
        p.advance(t0 + ms(250), &mut s); // frame 2, after disposal 4
        assert_eq!(s.events, [Event::Draw(2)]);
    }

    #[test]
    fn pause_blocks_advance() {
        let t0 = Instant::now();
        let mut p = Player::new();
        let mut s = TestSurface::default();
        p.load(anim(&[100, 100, 100], &[0, 0, 0]), t0, &mut s)
            .unwrap();
        p.pause();
        s.events.clear();
        p.advance(t0 + ms(1_000), &mut s);
        assert!(s.events.is_empty());
        assert_eq!(p.frame_idx(), Some(0));
        // resuming picks up from the stored due time
        p.play();
        p.advance(t0 + ms(150), &mut s);
        assert!(!s.events.is_empty());
        assert_eq!(p.frame_idx(), Some(2));
    }

    #[test]
    fn toggle_flips_state() {
        let mut p = Player::new();
        assert!(p.is_paused());
        p.toggle();
        assert!(!p.is_paused());
        p.toggle();
        assert!(p.is_paused());
    }

    #[test]
    fn zero_delays_step_one_frame() {
        let t0 = Instant::now();
        let mut p = Player::new();
        let mut s = TestSurface::default();
        p.load(anim(&[0, 0], &[0, 0]), t0, &mut s).unwrap();
        p.advance(t0 + ms(5), &mut s);
        assert_eq!(p.frame_idx(), Some(1));
        p.advance(t0 + ms(6), &mut s);
        assert_eq!(p.frame_idx(), Some(0));
    }

    #[test]
    fn reset_drops_state() {
        let t0 = Instant::now();
        let mut p = Player::new();
        let mut s = TestSurface::default();
        p.load(anim(&[100], &[0]), t0, &mut s).unwrap();
        p.reset();
        assert!(p.is_paused());
        assert_eq!(p.frame_idx(), None);
        s.events.clear();
        p.play();
        p.advance(t0 + ms(500), &mut s);
        assert!(s.events.is_empty());
    }

    struct Solid(u8);

    impl Rasterizer for Solid {
        fn rasterize(&mut self, _image: &[u8])
            -> Result<Raster<SRgba8>, DecodeError>
        {
            let mut r: Raster<SRgba8> = Raster::with_clear(2, 2);
            *r.pixel_mut(0, 0) = SRgba8::new(self.0, 0, 0, 0xFF);
            Ok(r)
        }
    }

    #[test]
    fn raster_surface_draws() {
        let mut s = RasterSurface::new(Solid(0xAA), 2, 2);
        let frame = Frame::new(vec![], 0, 0);
        s.draw(0, &frame);
        assert_eq!(s.raster().pixel(0, 0), SRgba8::new(0xAA, 0, 0, 0xFF));
        s.clear();
        assert_eq!(s.raster().pixel(0, 0), SRgba8::default());
    }
}
