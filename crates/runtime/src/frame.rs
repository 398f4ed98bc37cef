use foundation::time::Time;

/// Frame metadata handed to the per-frame simulation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds), already clamped.
    pub dt_s: f64,
    /// Elapsed time since the first frame (seconds).
    pub time: Time,
}

impl Frame {
    /// Fixed-step frame, used for replays and tests.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }
}

/// Converts host timestamps into [`Frame`]s.
///
/// Delta time is clamped to `max_dt_s` so a frame arriving after the host
/// throttled us (backgrounded tab) does not teleport time-stepped state.
/// Elapsed time is not clamped: closed-form motion stays wall-clock driven.
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_dt_s: f64,
    start: Option<Time>,
    last: Option<Time>,
    index: u64,
}

impl FrameClock {
    pub fn new(max_dt_s: f64) -> Self {
        Self {
            max_dt_s: max_dt_s.max(0.0),
            start: None,
            last: None,
            index: 0,
        }
    }

    pub fn max_dt_s(&self) -> f64 {
        self.max_dt_s
    }

    pub fn frames_ticked(&self) -> u64 {
        self.index
    }

    pub fn tick(&mut self, now: Time) -> Frame {
        let start = *self.start.get_or_insert(now);
        let dt_s = match self.last {
            Some(last) => now.since(last).min(self.max_dt_s),
            None => 0.0,
        };
        self.last = Some(now);

        let frame = Frame {
            index: self.index,
            dt_s,
            time: Time(now.since(start)),
        };
        self.index += 1;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameClock};
    use foundation::time::Time;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn next_advances_index_and_time() {
        let f0 = Frame::new(0, 0.5);
        let f1 = f0.next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
    }

    #[test]
    fn first_tick_has_zero_delta() {
        let mut clock = FrameClock::new(0.05);
        let f = clock.tick(Time(12.0));
        assert_eq!(f.index, 0);
        assert_eq!(f.dt_s, 0.0);
        assert_eq!(f.time, Time(0.0));
    }

    #[test]
    fn delta_is_clamped_after_a_long_gap() {
        let mut clock = FrameClock::new(0.05);
        clock.tick(Time(1.0));
        let f = clock.tick(Time(1.016));
        assert!((f.dt_s - 0.016).abs() < 1e-9);

        // Tab was backgrounded for three seconds.
        let f = clock.tick(Time(4.016));
        assert_eq!(f.dt_s, 0.05);
        assert!((f.time.0 - 3.016).abs() < 1e-9);
        assert_eq!(clock.frames_ticked(), 3);
    }

    #[test]
    fn timestamps_going_backwards_yield_zero_delta() {
        let mut clock = FrameClock::new(0.05);
        clock.tick(Time(2.0));
        let f = clock.tick(Time(1.9));
        assert_eq!(f.dt_s, 0.0);
    }
}
