/// Fixed timestep accumulator for drivers that only have variable frame
/// deltas (requestAnimationFrame, terminal event loops). The simulation
/// itself is tick-counted; this converts wall-clock deltas into a number of
/// whole ticks to run.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f64,
    accumulator: f64,
    max_catch_up: u32,
}

impl FixedTimestep {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_catch_up: 10,
        }
    }

    /// Cap how many ticks a single frame may run (stalls otherwise snowball).
    pub fn with_max_catch_up(mut self, steps: u32) -> Self {
        self.max_catch_up = steps.max(1);
        self
    }

    /// Add frame time. Returns the number of whole ticks to run now.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * self.max_catch_up as f64);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f64 * self.dt;
        steps
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.dt
    }

    /// The fixed delta time per tick.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}
