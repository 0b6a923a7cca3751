//! Next/previous index derivation under random and repeat policy

use rand::Rng;
use segue_core::{PlaybackMode, RepeatMode};

/// Index to arm after `current` finishes naturally
///
/// - `repeat = track` loops `current`
/// - `random` draws uniformly among the other indices (when there are any)
/// - otherwise `current + 1`, wrapping to 0 only under `repeat = all`
pub fn next_index<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    mode: PlaybackMode,
    rng: &mut R,
) -> Option<usize> {
    if current >= len {
        return None;
    }
    if mode.repeat == RepeatMode::Track {
        return Some(current);
    }
    if mode.random && len >= 2 {
        return Some(draw_other(current, len, rng));
    }
    sequential(current, len, mode.repeat)
}

/// Target of an explicit skip
///
/// Same as `next_index`, except `repeat = track` does not trap the skip: it
/// behaves like `repeat = all`.
pub fn skip_index<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    mode: PlaybackMode,
    rng: &mut R,
) -> Option<usize> {
    let mode = match mode.repeat {
        RepeatMode::Track => mode.with_repeat(RepeatMode::All),
        _ => mode,
    };
    next_index(current, len, mode, rng)
}

/// Target of an explicit "previous"
///
/// Random playback goes back to `last` (or restarts `current` when there is no
/// history). Sequential playback steps back one, wrapping under `repeat = all`;
/// `None` means stop.
pub fn previous_index(
    current: usize,
    last: Option<usize>,
    len: usize,
    mode: PlaybackMode,
) -> Option<usize> {
    if current >= len {
        return None;
    }
    if mode.random {
        return Some(last.filter(|&i| i < len).unwrap_or(current));
    }
    match current {
        0 if mode.repeat == RepeatMode::All => Some(len - 1),
        0 => None,
        _ => Some(current - 1),
    }
}

fn sequential(current: usize, len: usize, repeat: RepeatMode) -> Option<usize> {
    if current + 1 < len {
        Some(current + 1)
    } else if repeat == RepeatMode::All {
        Some(0)
    } else {
        None
    }
}

/// Uniform draw from `[0, len)` excluding `current`; requires `len >= 2`
fn draw_other<R: Rng + ?Sized>(current: usize, len: usize, rng: &mut R) -> usize {
    let drawn = rng.gen_range(0..len - 1);
    if drawn >= current {
        drawn + 1
    } else {
        drawn
    }
}
