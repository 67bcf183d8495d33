//! Per-key note containers: merge, ordering and overlap removal.

use crate::{
    note::{Note, KEY_COUNT},
    track::DecodedTrack,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Move every track's notes into one container per key.
///
/// Tracks are visited in order, so notes of equal start keep track order
/// through the stable sort that follows. The tracks' note lists are left
/// empty.
pub(crate) fn bucket_notes(tracks: &mut [DecodedTrack]) -> Vec<Vec<Note>> {
    let mut counts = [0usize; KEY_COUNT];
    for track in tracks.iter() {
        for note in &track.notes {
            counts[note.key as usize] += 1;
        }
    }

    let mut keys: Vec<Vec<Note>> = counts.iter().map(|&n| Vec::with_capacity(n)).collect();
    let mut total = 0usize;
    for track in tracks.iter_mut() {
        total += track.notes.len();
        for note in track.notes.drain(..) {
            keys[note.key as usize].push(note);
        }
    }

    debug_assert_eq!(keys.iter().map(Vec::len).sum::<usize>(), total);
    keys
}

/// Order each key's notes by start tick, keeping merge order for ties.
pub(crate) fn sort_keys(keys: &mut [Vec<Note>]) {
    #[cfg(feature = "parallel")]
    {
        keys.par_iter_mut().for_each(|notes| sort_key(notes));
    }
    #[cfg(not(feature = "parallel"))]
    {
        keys.iter_mut().for_each(|notes| sort_key(notes));
    }
}

#[inline]
fn sort_key(notes: &mut [Note]) {
    if notes.len() < 2 {
        return;
    }
    notes.sort_by_key(|n| n.start);
}

/// Run overlap removal on every key holding at least `min_notes` notes.
///
/// Returns the total number of notes shortened or collapsed.
pub(crate) fn remove_all_overlaps(keys: &mut [Vec<Note>], min_notes: usize) -> usize {
    let apply = |notes: &mut Vec<Note>| {
        if notes.len() < min_notes {
            0
        } else {
            remove_overlaps(notes)
        }
    };

    #[cfg(feature = "parallel")]
    {
        keys.par_iter_mut().map(apply).sum()
    }
    #[cfg(not(feature = "parallel"))]
    {
        keys.iter_mut().map(apply).sum()
    }
}

/// Resolve overlapping notes on a single key.
///
/// `notes` must be ordered by start tick. Each adjacent pair is examined in
/// turn and only the earlier note is ever modified:
///
/// 1. If the earlier note ends strictly inside the later one, it is cut off
///    where the later note starts.
/// 2. If both start together and the earlier note is not longer, it is
///    collapsed to zero length.
///
/// Running this again on its own output changes nothing. Returns the number
/// of notes modified.
///
/// ```rust
/// use keyroll::{remove_overlaps, Note};
///
/// let mut notes = vec![Note::new(0, 100, 60, 0), Note::new(50, 150, 60, 1)];
/// assert_eq!(remove_overlaps(&mut notes), 1);
/// assert_eq!(notes[0].end, 50);
/// ```
pub fn remove_overlaps(notes: &mut [Note]) -> usize {
    let mut changed = 0;
    for i in 1..notes.len() {
        let next = notes[i];
        let curr = &mut notes[i - 1];
        if curr.start < next.start && curr.end > next.start && curr.end < next.end {
            curr.end = next.start;
            changed += 1;
        } else if curr.start == next.start && curr.end <= next.end && curr.end != curr.start {
            curr.end = curr.start;
            changed += 1;
        }
    }
    log::trace!("overlap removal changed {} of {} notes", changed, notes.len());
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(index: usize, notes: Vec<Note>) -> DecodedTrack {
        DecodedTrack {
            index,
            ticks: notes.iter().map(|n| n.end).max().unwrap_or(0),
            notes,
            tempos: vec![],
        }
    }

    /// Deterministic pseudo-random notes on one key.
    fn scrambled_notes(count: usize, seed: u32) -> Vec<Note> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) & 0x7FFF
        };
        (0..count)
            .map(|i| {
                let start = next() % 400;
                let len = next() % 120;
                Note::new(start, start + len, 60, (i % 3) as u16)
            })
            .collect()
    }

    #[test]
    fn test_overlap_rule_partial() {
        let mut notes = vec![Note::new(0, 100, 60, 0), Note::new(50, 150, 60, 0)];
        assert_eq!(remove_overlaps(&mut notes), 1);
        assert_eq!(notes[0].end, 50);
        assert_eq!(notes[1], Note::new(50, 150, 60, 0));
    }

    #[test]
    fn test_overlap_rule_same_onset() {
        let mut notes = vec![Note::new(0, 80, 60, 0), Note::new(0, 120, 60, 1)];
        remove_overlaps(&mut notes);
        assert_eq!(notes[0].end, 0);
        assert_eq!(notes[1], Note::new(0, 120, 60, 1));

        let mut equal = vec![Note::new(5, 10, 60, 0), Note::new(5, 10, 60, 1)];
        remove_overlaps(&mut equal);
        assert!(equal[0].is_collapsed());
        assert_eq!(equal[1].end, 10);
    }

    #[test]
    fn test_overlap_leaves_other_shapes_alone() {
        let original = vec![
            // contains the next note entirely
            Note::new(0, 200, 60, 0),
            Note::new(50, 100, 60, 0),
            // touches without overlapping
            Note::new(100, 150, 60, 0),
            Note::new(150, 160, 60, 0),
            // same onset, longer first
            Note::new(300, 400, 60, 0),
            Note::new(300, 350, 60, 0),
        ];
        let mut notes = original.clone();
        assert_eq!(remove_overlaps(&mut notes), 0);
        assert_eq!(notes, original);
    }

    #[test]
    fn test_overlap_handles_final_pair() {
        let mut notes: Vec<Note> = (0..10).map(|i| Note::new(i * 100, i * 100 + 10, 60, 0)).collect();
        notes.push(Note::new(950, 1100, 60, 0));
        notes[9].end = 1000;
        remove_overlaps(&mut notes);
        assert_eq!(notes[9].end, 950);
    }

    #[test]
    fn test_overlap_is_idempotent() {
        for seed in 1..20 {
            let mut notes = scrambled_notes(200, seed);
            sort_key(&mut notes);
            remove_overlaps(&mut notes);
            let once = notes.clone();
            assert_eq!(remove_overlaps(&mut notes), 0, "seed {}", seed);
            assert_eq!(notes, once);
            assert!(notes.iter().all(|n| n.end >= n.start));
        }
    }

    #[test]
    fn test_threshold_skips_sparse_keys() {
        let pair = vec![Note::new(0, 100, 60, 0), Note::new(50, 150, 60, 0)];
        let mut keys = vec![Vec::new(); KEY_COUNT];
        keys[60] = pair.clone();

        assert_eq!(remove_all_overlaps(&mut keys, 10), 0);
        assert_eq!(keys[60], pair);

        assert_eq!(remove_all_overlaps(&mut keys, 0), 1);
        assert_eq!(keys[60][0].end, 50);
    }

    #[test]
    fn test_threshold_runs_on_dense_keys() {
        let mut keys = vec![Vec::new(); KEY_COUNT];
        keys[61] = (0..10).map(|i| Note::new(i * 10, i * 10 + 15, 61, 0)).collect();
        assert_eq!(remove_all_overlaps(&mut keys, 10), 9);
        assert!(keys[61][..9].iter().all(|n| n.duration() == 10));
        assert_eq!(keys[61][9].duration(), 15);
    }

    #[test]
    fn test_bucketing_conserves_notes() {
        let mut tracks = vec![
            track(0, vec![Note::new(0, 10, 60, 0), Note::new(5, 10, 62, 0)]),
            track(1, vec![]),
            track(2, vec![Note::new(0, 4, 60, 2), Note::new(1, 2, 0, 2), Note::new(3, 9, 127, 2)]),
        ];
        let keys = bucket_notes(&mut tracks);
        assert_eq!(keys.len(), KEY_COUNT);
        assert_eq!(keys.iter().map(Vec::len).sum::<usize>(), 5);
        assert_eq!(keys[60], vec![Note::new(0, 10, 60, 0), Note::new(0, 4, 60, 2)]);
        assert_eq!(keys[0].len(), 1);
        assert_eq!(keys[127].len(), 1);
        assert!(keys.iter().enumerate().all(|(k, notes)| notes.iter().all(|n| n.key as usize == k)));
        assert!(tracks.iter().all(|t| t.notes.is_empty()));
    }

    #[test]
    fn test_sort_is_stable_by_start() {
        let mut keys = vec![Vec::new(); KEY_COUNT];
        keys[60] = vec![
            Note::new(30, 40, 60, 0),
            Note::new(10, 20, 60, 0),
            Note::new(10, 50, 60, 1),
            Note::new(0, 5, 60, 2),
            Note::new(10, 11, 60, 3),
        ];
        sort_keys(&mut keys);
        let order: Vec<(u32, u16)> = keys[60].iter().map(|n| (n.start, n.track)).collect();
        assert_eq!(order, vec![(0, 2), (10, 0), (10, 1), (10, 3), (30, 0)]);
    }
}
