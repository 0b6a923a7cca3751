//! In-place playlist shuffle
//!
//! Fisher-Yates over the playlist; the current track (if any) is pulled out
//! first and reinserted at the front so playback continues uninterrupted.

use rand::seq::SliceRandom;
use rand::Rng;
use segue_core::Track;

/// Shuffle `tracks`, moving `current` to index 0
///
/// Returns the new index of the current track (`Some(0)` when `current` was a
/// valid index).
pub fn shuffle_around<R: Rng + ?Sized>(
    tracks: &mut Vec<Track>,
    current: Option<usize>,
    rng: &mut R,
) -> Option<usize> {
    match current.filter(|&i| i < tracks.len()) {
        Some(index) => {
            let playing = tracks.remove(index);
            tracks.shuffle(rng);
            tracks.insert(0, playing);
            Some(0)
        }
        None => {
            tracks.shuffle(rng);
            None
        }
    }
}
