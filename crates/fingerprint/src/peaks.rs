//! Per-window peak picking for the constellation map.
//!
//! Peaks are strict local maxima of a magnitude spectrum. Candidates closer
//! than `min_distance` bins to a taller kept peak are dropped, the survivors
//! are scored by topographic prominence, and the most prominent ones are kept.
//! Every step breaks ties by ascending bin index so the output is reproducible.

use std::cmp::Ordering;

/// A selected spectral peak within one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub bin: usize,
    pub prominence: f32,
}

/// Select at most `max_peaks` peaks from `spectrum`, returned in ascending bin order.
pub fn pick_peaks(
    spectrum: &[f32],
    min_distance: usize,
    min_prominence: f32,
    max_peaks: usize,
) -> Vec<Peak> {
    let maxima = local_maxima(spectrum);
    let spaced = enforce_distance(spectrum, &maxima, min_distance);

    let mut peaks: Vec<Peak> = spaced
        .into_iter()
        .map(|bin| Peak {
            bin,
            prominence: prominence(spectrum, bin),
        })
        .filter(|p| p.prominence > min_prominence)
        .collect();

    peaks.sort_by(|a, b| {
        b.prominence
            .partial_cmp(&a.prominence)
            .unwrap_or(Ordering::Equal)
            .then(a.bin.cmp(&b.bin))
    });
    peaks.truncate(max_peaks);
    peaks.sort_by_key(|p| p.bin);
    peaks
}

/// Strict local maxima. A flat top counts once, at its (left-biased) midpoint;
/// the first and last bins are never peaks.
fn local_maxima(x: &[f32]) -> Vec<usize> {
    let mut out = Vec::new();
    if x.len() < 3 {
        return out;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                out.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    out
}

/// Greedy suppression: taller peaks claim their neighbourhood first.
fn enforce_distance(x: &[f32], peaks: &[usize], min_distance: usize) -> Vec<usize> {
    if min_distance <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        x[peaks[b]]
            .partial_cmp(&x[peaks[a]])
            .unwrap_or(Ordering::Equal)
            .then(peaks[a].cmp(&peaks[b]))
    });

    let mut keep = vec![true; peaks.len()];
    for &idx in &order {
        if !keep[idx] {
            continue;
        }
        let pos = peaks[idx];

        let mut left = idx;
        while left > 0 && pos - peaks[left - 1] < min_distance {
            left -= 1;
            keep[left] = false;
        }
        let mut right = idx + 1;
        while right < peaks.len() && peaks[right] - pos < min_distance {
            keep[right] = false;
            right += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Height of a peak above the higher of its two bases.
///
/// Each base is the minimum reached while walking away from the peak until a
/// strictly taller sample or the spectrum edge.
fn prominence(x: &[f32], peak: usize) -> f32 {
    let height = x[peak];

    let mut left_min = height;
    for &v in x[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &x[peak + 1..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}
