/// Day/night clock driven by frame time and resynchronised by the authority.
#[derive(Clone, Debug)]
pub struct DayClock {
    elapsed: f64,
    day_length: i32,
}

impl DayClock {
    /// Starts a third of the way into the day.
    pub fn new(day_length: i32) -> Self {
        Self {
            elapsed: f64::from(day_length) / 3.0,
            day_length,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt;
    }

    /// Applies an `E` message: the clock restarts at `elapsed mod day_length`.
    pub fn sync(&mut self, elapsed: f64, day_length: i32) {
        self.day_length = day_length;
        self.elapsed = if day_length > 0 {
            elapsed.rem_euclid(f64::from(day_length))
        } else {
            elapsed
        };
    }

    /// Seconds since the clock (re)started; also the timestamp for remote snapshots.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    #[inline]
    pub fn day_length(&self) -> i32 {
        self.day_length
    }

    /// Fraction of the current day in `[0, 1)`; a fixed 0.5 when days are disabled.
    pub fn time_of_day(&self) -> f32 {
        if self.day_length <= 0 {
            return 0.5;
        }
        let t = self.elapsed / f64::from(self.day_length);
        (t - t.floor()) as f32
    }
}
