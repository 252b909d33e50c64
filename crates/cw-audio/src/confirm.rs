use cw_core::{CryEvent, EventMode};

/// Start indices whose next `min_frames` flags (inclusive) are all set.
///
/// The look-ahead window is truncated at the end of the sequence, so a short
/// tail can never reach `min_frames`. Every qualifying index is returned, one
/// per overlapping window.
///
/// # Example
/// ```
/// use cw_audio::confirm::qualifying_starts;
/// let flags = [true, true, true, true, true, false, false];
/// assert_eq!(qualifying_starts(&flags, 4), vec![0, 1]);
/// ```
#[must_use]
pub fn qualifying_starts(flags: &[bool], min_frames: usize) -> Vec<usize> {
    if min_frames == 0 {
        return Vec::new();
    }
    // run[i] = consecutive flags starting at i.
    let mut run = vec![0usize; flags.len() + 1];
    for i in (0..flags.len()).rev() {
        run[i] = if flags[i] { run[i + 1] + 1 } else { 0 };
    }
    (0..flags.len()).filter(|&i| run[i] >= min_frames).collect()
}

/// Apply the event policy to the qualifying start indices.
#[must_use]
pub fn select_starts(flags: &[bool], min_frames: usize, mode: EventMode) -> Vec<usize> {
    let starts = qualifying_starts(flags, min_frames);
    match mode {
        EventMode::EveryWindow => starts,
        EventMode::FirstOfRun => starts
            .into_iter()
            .filter(|&i| i == 0 || !flags[i - 1])
            .collect(),
    }
}

/// Round to two decimals.
#[inline(always)]
#[must_use]
pub fn round_centis(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

/// Convert frame flags into confirmed events at `index * hop_secs`.
///
/// # Example
/// ```
/// use cw_audio::confirm::confirm_events;
/// use cw_core::EventMode;
/// let flags = [false, true, true, true, true];
/// let events = confirm_events(&flags, 4, 0.032, EventMode::EveryWindow);
/// assert_eq!(events.len(), 1);
/// assert!((events[0].timestamp_secs - 0.03).abs() < 1e-12);
/// ```
#[must_use]
pub fn confirm_events(
    flags: &[bool],
    min_frames: usize,
    hop_secs: f64,
    mode: EventMode,
) -> Vec<CryEvent> {
    select_starts(flags, min_frames, mode)
        .into_iter()
        .map(|frame_index| CryEvent {
            timestamp_secs: round_centis(frame_index as f64 * hop_secs),
            frame_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn every_start_of_a_full_window_is_reported() {
        assert_eq!(qualifying_starts(&bits("1111100"), 4), vec![0, 1]);
        // Run of length L yields L - 3 starts.
        assert_eq!(qualifying_starts(&bits("0111111110"), 4), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn short_runs_and_tail_are_ignored() {
        assert!(qualifying_starts(&bits("1110111"), 4).is_empty());
        assert_eq!(qualifying_starts(&bits("0001111"), 4), vec![3]);
        assert!(qualifying_starts(&[], 4).is_empty());
        assert!(qualifying_starts(&bits("1111"), 0).is_empty());
    }

    #[test]
    fn first_of_run_keeps_one_per_run() {
        let flags = bits("11111001111110");
        assert_eq!(
            select_starts(&flags, 4, EventMode::FirstOfRun),
            vec![0, 7]
        );
        assert_eq!(
            select_starts(&flags, 4, EventMode::EveryWindow),
            vec![0, 1, 7, 8, 9]
        );
    }

    #[test]
    fn timestamps_are_rounded_and_ordered() {
        let flags = bits("0000011111");
        let events = confirm_events(&flags, 4, 512.0 / 16_000.0, EventMode::EveryWindow);
        let ts: Vec<f64> = events.iter().map(|e| e.timestamp_secs).collect();
        assert_eq!(ts, vec![0.16, 0.19]);
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn rounding() {
        assert!((round_centis(0.992) - 0.99).abs() < 1e-12);
        assert!((round_centis(1.0239) - 1.02).abs() < 1e-12);
    }
}
