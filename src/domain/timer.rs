/// Millisecond timers driven by the frame step.
///
///   - `Repeater`: looping interval timer (coin / rug spawners).
///   - `Delay`: one-shot timer (return to home after a finished run).
///
/// Both accumulate `dt_ms` and never lose time across long frames.

#[derive(Clone, Debug)]
pub struct Repeater {
    interval_ms: u32,
    elapsed_ms: u32,
    running: bool,
}

impl Repeater {
    pub fn new(interval_ms: u32) -> Self {
        Repeater { interval_ms: interval_ms.max(1), elapsed_ms: 0, running: true }
    }

    /// A repeater that never fires until `restart` is called.
    pub fn stopped() -> Self {
        Repeater { interval_ms: 1, elapsed_ms: 0, running: false }
    }

    /// Advance by `dt_ms`. Returns how many times the timer fired.
    pub fn tick(&mut self, dt_ms: u32) -> u32 {
        if !self.running { return 0; }
        self.elapsed_ms += dt_ms;
        let fired = self.elapsed_ms / self.interval_ms;
        self.elapsed_ms %= self.interval_ms;
        fired
    }

    /// Change the interval. Time already accumulated toward the next firing is kept.
    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms.max(1);
    }

    pub fn restart(&mut self, interval_ms: u32) {
        *self = Repeater::new(interval_ms);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed_ms = 0;
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

#[derive(Clone, Debug)]
pub struct Delay {
    remaining_ms: u32,
    armed: bool,
}

impl Delay {
    pub fn new(delay_ms: u32) -> Self {
        Delay { remaining_ms: delay_ms, armed: true }
    }

    pub fn disarmed() -> Self {
        Delay { remaining_ms: 0, armed: false }
    }

    /// Returns true exactly once: on the tick that uses up the delay.
    pub fn tick(&mut self, dt_ms: u32) -> bool {
        if !self.armed { return false; }
        self.remaining_ms = self.remaining_ms.saturating_sub(dt_ms);
        if self.remaining_ms == 0 {
            self.armed = false;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeater_fires_on_interval_and_keeps_remainder() {
        let mut t = Repeater::new(900);
        assert_eq!(t.tick(500), 0);
        assert_eq!(t.tick(500), 1); // 1000 → fire, 100 carried
        assert_eq!(t.tick(799), 0); // 899
        assert_eq!(t.tick(1), 1);   // 900
    }

    #[test]
    fn repeater_fires_multiple_times_on_long_frame() {
        let mut t = Repeater::new(100);
        assert_eq!(t.tick(350), 3);
        assert_eq!(t.tick(50), 1);
    }

    #[test]
    fn stopped_repeater_never_fires() {
        let mut t = Repeater::new(10);
        t.stop();
        assert!(!t.is_running());
        assert_eq!(t.tick(10_000), 0);

        let mut s = Repeater::stopped();
        assert_eq!(s.tick(10_000), 0);
        s.restart(10);
        assert_eq!(s.tick(25), 2);
    }

    #[test]
    fn set_interval_keeps_progress() {
        let mut t = Repeater::new(900);
        t.tick(700);
        t.set_interval(750);
        assert_eq!(t.interval_ms(), 750);
        assert_eq!(t.tick(50), 1);
    }

    #[test]
    fn delay_fires_once() {
        let mut d = Delay::new(2500);
        assert!(!d.tick(2000));
        assert!(d.tick(600));
        assert!(!d.is_armed());
        assert!(!d.tick(10_000));
        assert!(!Delay::disarmed().tick(1));
    }
}
