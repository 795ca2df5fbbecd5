// Frame loop state: run/stop, rotation angle and FPS bookkeeping

use std::time::Instant;

/// Run state of the frame loop. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Monotonic millisecond tick counter.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock was created.
    pub fn ticks_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts frames over a rolling window and reports the rate each time the
/// window fills.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_ms: u64,
    window_start: u64,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(window_ms: u64, now_ms: u64) -> Self {
        Self {
            window_ms,
            window_start: now_ms,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Record one finished frame at `now_ms`.
    ///
    /// Returns the new rate when at least `window_ms` has passed since the
    /// window opened; the counter then restarts from `now_ms`.
    pub fn frame(&mut self, now_ms: u64) -> Option<f32> {
        self.frames += 1;
        let elapsed = now_ms.saturating_sub(self.window_start);
        if elapsed < self.window_ms {
            return None;
        }
        self.fps = self.frames as f32 / (elapsed as f32 / 1000.0);
        self.frames = 0;
        self.window_start = now_ms;
        Some(self.fps)
    }

    /// Last computed rate, 0 until the first window completes.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Everything that changes from one frame to the next.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    angle: f32,
    rotation_step: f32,
    frames_drawn: u64,
    fps: FpsCounter,
}

impl FrameLoop {
    pub fn new(rotation_step: f32, fps_window_ms: u64, now_ms: u64) -> Self {
        Self {
            state: LoopState::Running,
            angle: 0.0,
            rotation_step,
            frames_drawn: 0,
            fps: FpsCounter::new(fps_window_ms, now_ms),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// A quit request stops the loop; nothing restarts it.
    pub fn request_quit(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("quit requested after {} frames", self.frames_drawn);
        }
        self.state = LoopState::Stopped;
    }

    /// Rotation angle for the frame about to be drawn, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Bookkeeping after a frame has been presented: count it, advance the
    /// angle by one step, and return a fresh FPS figure if the window rolled.
    pub fn end_frame(&mut self, now_ms: u64) -> Option<f32> {
        self.frames_drawn += 1;
        self.angle += self.rotation_step;
        self.fps.frame(now_ms)
    }
}
