//! Linear volume ramps

/// What to do once a fade reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeThen {
    Nothing,
    Mute,
}

/// A linear ramp from `start` to `target` over a fixed number of steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    start: f32,
    target: f32,
    steps: u32,
    step: u32,
    then: FadeThen,
}

impl Fade {
    pub fn new(start: f32, target: f32, steps: u32, then: FadeThen) -> Self {
        Self {
            start,
            target,
            steps: steps.max(1),
            step: 0,
            then,
        }
    }

    /// Change too small to bother animating
    pub fn is_trivial(&self) -> bool {
        (self.target - self.start).abs() < 0.001
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn then(&self) -> FadeThen {
        self.then
    }

    pub fn is_done(&self) -> bool {
        self.step >= self.steps
    }

    /// Advance one interval; returns the new volume clamped to `[0, cap]`
    pub fn advance(&mut self, cap: f32) -> f32 {
        self.step = (self.step + 1).min(self.steps);
        let t = self.step as f32 / self.steps as f32;
        (self.start + (self.target - self.start) * t).clamp(0.0, cap)
    }
}
