//! Tempo map construction and tick to wall-clock conversion.

use core::time::Duration;

/// Tempo assumed when a file never sets one: 120 BPM.
pub const DEFAULT_TEMPO: u32 = 500_000;

/// A tempo change, in microseconds per quarter note, at an absolute tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tempo {
    pub tick: u32,
    pub value: u32,
}

impl Tempo {
    #[inline]
    pub fn new(tick: u32, value: u32) -> Self {
        Self { tick, value }
    }

    /// Beats per minute for this tempo.
    #[inline]
    pub fn bpm(&self) -> f64 {
        if self.value == 0 {
            return 0.0;
        }
        60_000_000.0 / self.value as f64
    }
}

/// The finalized, tick-ordered tempo sequence of a file.
///
/// A `TempoMap` is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TempoMap {
    tempos: Vec<Tempo>,
}

impl TempoMap {
    /// Build the map from tempo events in file order (track by track).
    ///
    /// Events are stably sorted by tick, so several changes on one tick keep
    /// their file order and the last one wins. Exact duplicates are dropped.
    /// An empty input yields the single default tempo at tick 0.
    pub fn build(mut tempos: Vec<Tempo>) -> Self {
        if tempos.is_empty() {
            tempos.push(Tempo::new(0, DEFAULT_TEMPO));
        }
        tempos.sort_by_key(|t| t.tick);
        tempos.dedup();
        Self { tempos }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Tempo] {
        &self.tempos
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Tempo> {
        self.tempos.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tempos.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tempos.is_empty()
    }

    /// Elapsed time at `tick` for a file with the given PPQ.
    #[inline]
    pub fn time_of(&self, tick: u32, ppq: u16) -> Duration {
        tick_to_time(tick, ppq, Some(&self.tempos))
    }
}

impl Default for TempoMap {
    fn default() -> Self {
        Self::build(Vec::new())
    }
}

impl<'a> IntoIterator for &'a TempoMap {
    type Item = &'a Tempo;
    type IntoIter = core::slice::Iter<'a, Tempo>;

    fn into_iter(self) -> Self::IntoIter {
        self.tempos.iter()
    }
}

/// Convert an absolute tick to elapsed wall-clock time.
///
/// Without a tempo map (or with an empty one) a constant 120 BPM is assumed.
/// Otherwise the tempo starts at 120 BPM and each change at or before `tick`
/// takes effect from its own tick onwards. The computation is exact integer
/// arithmetic, so the result never decreases as `tick` grows.
pub fn tick_to_time(tick: u32, ppq: u16, tempos: Option<&[Tempo]>) -> Duration {
    if ppq == 0 {
        return Duration::ZERO;
    }

    // Accumulated in microsecond-ticks, divided by PPQ once at the end.
    let mut total: u128 = 0;
    let mut tempo = DEFAULT_TEMPO as u128;
    let mut last_tick = 0u32;

    for change in tempos.unwrap_or(&[]) {
        if change.tick > tick {
            break;
        }
        total += (change.tick - last_tick) as u128 * tempo;
        last_tick = change.tick;
        tempo = change.value as u128;
    }
    total += (tick - last_tick) as u128 * tempo;

    let nanos = total * 1_000 / ppq as u128;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map_gets_default() {
        let map = TempoMap::build(vec![]);
        assert_eq!(map.as_slice(), &[Tempo::new(0, 500_000)]);
        assert!(!map.is_empty());
    }

    #[test]
    fn test_build_sorts_stably_and_dedups() {
        let map = TempoMap::build(vec![
            Tempo::new(960, 400_000),
            Tempo::new(0, 600_000),
            Tempo::new(960, 300_000),
            Tempo::new(0, 600_000),
        ]);
        assert_eq!(
            map.as_slice(),
            &[
                Tempo::new(0, 600_000),
                Tempo::new(960, 400_000),
                Tempo::new(960, 300_000),
            ]
        );
    }

    #[test]
    fn test_constant_tempo_without_map() {
        // 480 ticks at 120 BPM is half a second
        assert_eq!(tick_to_time(480, 480, None), Duration::from_millis(500));
        assert_eq!(tick_to_time(480, 480, Some(&[])), Duration::from_millis(500));
        assert_eq!(tick_to_time(0, 480, None), Duration::ZERO);
    }

    #[test]
    fn test_tempo_change_mid_file() {
        let tempos = [Tempo::new(0, 500_000), Tempo::new(960, 1_000_000)];
        // two beats at 120 BPM, then one beat at 60 BPM
        assert_eq!(tick_to_time(1440, 480, Some(&tempos)), Duration::from_secs(2));
        // partial segment interpolated at the last known tempo
        assert_eq!(tick_to_time(1200, 480, Some(&tempos)), Duration::from_millis(1500));
    }

    #[test]
    fn test_first_change_after_zero_uses_default_before_it() {
        let tempos = [Tempo::new(480, 250_000)];
        assert_eq!(tick_to_time(480, 480, Some(&tempos)), Duration::from_millis(500));
        assert_eq!(tick_to_time(960, 480, Some(&tempos)), Duration::from_millis(750));
    }

    #[test]
    fn test_last_change_on_a_tick_wins() {
        let map = TempoMap::build(vec![Tempo::new(0, 1_000_000), Tempo::new(0, 250_000)]);
        assert_eq!(map.time_of(480, 480), Duration::from_millis(250));
    }

    #[test]
    fn test_time_is_monotonic() {
        let map = TempoMap::build(vec![
            Tempo::new(0, 700_000),
            Tempo::new(100, 120_000),
            Tempo::new(250, 2_000_000),
            Tempo::new(251, 1),
            Tempo::new(900, 450_000),
        ]);
        let mut previous = Duration::ZERO;
        for tick in 0..2000 {
            let time = map.time_of(tick, 96);
            assert!(time >= previous, "time went backwards at tick {}", tick);
            previous = time;
        }
    }

    #[test]
    fn test_zero_ppq() {
        assert_eq!(tick_to_time(1000, 0, None), Duration::ZERO);
    }

    #[test]
    fn test_bpm() {
        assert_eq!(Tempo::new(0, 500_000).bpm(), 120.0);
        assert_eq!(Tempo::new(0, 0).bpm(), 0.0);
    }
}
