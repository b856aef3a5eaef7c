//! Edge extraction from camera frames.
//!
//! The frame is cut down to the band of rows in front of the vehicle and
//! converted to grayscale, with the rows flipped so that row 0 is nearest the
//! vehicle. The sum of the absolute central-difference gradients along both
//! axes is then thresholded, and the local maxima of each row are the
//! candidate lane boundary points.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use ndarray::{s, Array2, ArrayView1, Axis};
use ordered_float::OrderedFloat;

// Internal
use crate::frame::Frame;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Luminance weights of the red, green and blue channels.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Cut the frame to the first `cut_size` rows and convert them to grayscale,
/// reversing the row order so that row 0 is nearest the vehicle.
///
/// `cut_size` must be no greater than the frame height.
pub fn cut_gray(frame: &Frame, cut_size: usize) -> Array2<f64> {
    let view = frame.view();
    let band = view.slice(s![..cut_size;-1, .., ..]);

    Array2::from_shape_fn((band.shape()[0], band.shape()[1]), |(r, c)| {
        LUMA_WEIGHTS
            .iter()
            .enumerate()
            .map(|(ch, w)| w * band[[r, c, ch]] as f64)
            .sum::<f64>()
    })
}

/// Sum the absolute gradients of the grayscale field along both axes,
/// zeroing any magnitude below `threshold`.
///
/// Gradients are central differences in the interior and one-sided
/// differences on the borders. An axis with fewer than two samples has zero
/// gradient.
pub fn edge_detection(gray: &Array2<f64>, threshold: f64) -> Array2<f64> {
    let mut gradient_sum = gradient(gray, Axis(0)).mapv(f64::abs)
        + gradient(gray, Axis(1)).mapv(f64::abs);

    gradient_sum.mapv_inplace(|g| if g < threshold { 0.0 } else { g });

    gradient_sum
}

/// Find the local maxima of every row of the gradient field.
///
/// Element `r` of the result is the peak set of row `r`, in increasing column
/// order.
pub fn find_maxima_rowwise(gradient_sum: &Array2<f64>, min_distance: usize) -> Vec<Vec<usize>> {
    gradient_sum
        .axis_iter(Axis(0))
        .map(|row| find_peaks(row, min_distance))
        .collect()
}

/// Find the peaks of a 1D signal.
///
/// A peak is a sample strictly greater than its left neighbour and strictly
/// greater than the first differing sample to its right. Flat peaks report
/// their (left-rounded) midpoint. The first and last samples are never peaks.
///
/// Peaks closer than `min_distance` to a higher peak are then removed, the
/// highest peaks being kept first. Among peaks of equal height the rightmost
/// is kept first.
pub fn find_peaks(signal: ArrayView1<f64>, min_distance: usize) -> Vec<usize> {
    let peaks = local_maxima(signal);

    if min_distance <= 1 || peaks.len() < 2 {
        return peaks
    }

    // Process peaks in decreasing order of height
    let mut by_priority: Vec<usize> = (0..peaks.len()).collect();
    by_priority.sort_by_key(|&i| (OrderedFloat(signal[peaks[i]]), i));

    let mut keep = vec![true; peaks.len()];

    for &j in by_priority.iter().rev() {
        if !keep[j] {
            continue;
        }

        // Suppress neighbours to the left
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < min_distance {
            keep[k - 1] = false;
            k -= 1;
        }

        // Suppress neighbours to the right
        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < min_distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .into_iter()
        .zip(keep.into_iter())
        .filter_map(|(p, k)| if k { Some(p) } else { None })
        .collect()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Numerical gradient along one axis with unit spacing.
fn gradient(field: &Array2<f64>, axis: Axis) -> Array2<f64> {
    let len = field.len_of(axis);
    let mut grad = Array2::zeros(field.raw_dim());

    if len < 2 {
        return grad
    }

    for i in 0..len {
        let (lo, hi, div) = if i == 0 {
            (0, 1, 1.0)
        }
        else if i == len - 1 {
            (len - 2, len - 1, 1.0)
        }
        else {
            (i - 1, i + 1, 2.0)
        };

        let diff = (&field.index_axis(axis, hi) - &field.index_axis(axis, lo)) / div;
        grad.index_axis_mut(axis, i).assign(&diff);
    }

    grad
}

/// Find all local maxima of the signal, including the midpoints of flat
/// peaks.
fn local_maxima(signal: ArrayView1<f64>) -> Vec<usize> {
    let mut peaks = Vec::new();
    let len = signal.len();

    if len < 3 {
        return peaks
    }

    let i_max = len - 1;
    let mut i = 1;

    while i < i_max {
        if signal[i - 1] < signal[i] {
            // Walk over any plateau
            let mut i_ahead = i + 1;
            while i_ahead < i_max && signal[i_ahead] == signal[i] {
                i_ahead += 1;
            }

            if signal[i_ahead] < signal[i] {
                peaks.push((i + i_ahead - 1) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }

    peaks
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_local_maxima() {
        let x = arr1(&[0.0, 1.0, 0.0, 2.0, 2.0, 2.0, 1.0, 3.0, 3.0, 4.0]);
        // Plateau at 3..=5 reports 4, the rising plateau at 7..=8 is not a
        // peak and the last sample never is.
        assert_eq!(local_maxima(x.view()), vec![1, 4]);

        // Even length plateau rounds left
        let x = arr1(&[0.0, 5.0, 5.0, 0.0]);
        assert_eq!(local_maxima(x.view()), vec![1]);

        // Borders and flat signals
        assert!(local_maxima(arr1(&[3.0, 1.0, 3.0]).view()).is_empty());
        assert!(local_maxima(arr1(&[0.0; 8]).view()).is_empty());
    }

    #[test]
    fn test_find_peaks_distance() {
        let x = arr1(&[0.0, 5.0, 0.0, 7.0, 0.0, 0.0, 0.0, 6.0, 0.0, 6.0, 0.0]);

        assert_eq!(find_peaks(x.view(), 1), vec![1, 3, 7, 9]);

        // 1 is within 3 of the higher peak at 3, and the equal peaks at 7 and
        // 9 are resolved in favour of the rightmost.
        assert_eq!(find_peaks(x.view(), 3), vec![3, 9]);
    }

    #[test]
    fn test_cut_gray_flips_rows() {
        let mut frame = Frame::filled([0, 0, 0]);
        // The last row of the band is the nearest to the vehicle
        frame.set_pixel(67, 5, [100, 100, 100]);
        frame.set_pixel(0, 6, [255, 0, 0]);

        let gray = cut_gray(&frame, 68);
        assert_eq!(gray.shape(), &[68, 96]);
        assert!((gray[[0, 5]] - 100.0).abs() < 1e-9);
        assert!((gray[[67, 6]] - 0.299 * 255.0).abs() < 1e-9);
        assert_eq!(gray[[1, 5]], 0.0);
    }

    #[test]
    fn test_edge_detection() {
        let gray = arr2(&[
            [0.0, 0.0, 100.0, 100.0],
            [0.0, 0.0, 100.0, 100.0],
            [0.0, 0.0, 100.0, 100.0],
        ]);

        let grad = edge_detection(&gray, 14.0);
        assert_eq!(grad.row(1).to_vec(), vec![0.0, 50.0, 50.0, 0.0]);

        // Everything below the threshold is removed
        let grad = edge_detection(&gray, 60.0);
        assert!(grad.iter().all(|g| *g == 0.0));
    }
}
