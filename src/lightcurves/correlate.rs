//! 2D cross-correlation
//!
//! The kernel is slid over the image without being flipped. Microlensing of
//! a finite source is a cross-correlation of the magnification map with the
//! source profile; a convolution only gives the same answer for point
//! symmetric profiles.

use ndarray::{Array2, ArrayView2, Zip};

/// Cross-correlates `image` with `kernel`, returning an array the size of `image`
///
/// The output is centered on the image and the image is zero padded, i.e.
/// `out[i,j] = Σ image[i+k-m/2, j+l-n/2] kernel[k,l]` for a `m×n` kernel.
pub fn correlate2d(image: ArrayView2<'_, f64>, kernel: ArrayView2<'_, f64>) -> Array2<f64> {
    let (rows, cols) = image.dim();
    let (k_rows, k_cols) = kernel.dim();
    let (pad_rows, pad_cols) = (k_rows / 2, k_cols / 2);

    let mut output = Array2::zeros((rows, cols));
    Zip::indexed(&mut output).par_for_each(|(i, j), out| {
        let mut sum = 0f64;
        // only the rows and columns of the kernel that overlap the image
        let ki_min = pad_rows.saturating_sub(i);
        let ki_max = k_rows.min(rows + pad_rows - i);
        let kj_min = pad_cols.saturating_sub(j);
        let kj_max = k_cols.min(cols + pad_cols - j);
        for ki in ki_min..ki_max {
            let ii = i + ki - pad_rows;
            for kj in kj_min..kj_max {
                let jj = j + kj - pad_cols;
                sum += image[[ii, jj]] * kernel[[ki, kj]];
            }
        }
        *out = sum;
    });
    output
}
