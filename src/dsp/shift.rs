//! Spectral shift-decimation.
//!
//! Filters, shifts by an integer number of bins and decimates a spectrum in a
//! single pass. Decimating by `D` in time is equivalent to summing the `D`
//! aliased copies of the spectrum into `input.len() / D` bins, so the filtered
//! input is folded onto the smaller output while its destination is rotated by
//! the requested bin offset.
//!
//! Input bin `i` accumulates into output bin
//! `(input.len() + i - offset + output.len() / 2) % output.len()`.
//! Once the two halves of the output are swapped, input bin `offset` sits at
//! output bin 0.

use num_complex::Complex;

/// Pointwise complex multiply-accumulate: `output[i] += kernel[i] * input[i]`.
pub fn multiply_add(input: &[Complex<f32>], kernel: &[Complex<f32>], output: &mut [Complex<f32>]) {
    for ((out, &x), &k) in output.iter_mut().zip(input).zip(kernel) {
        *out += k * x;
    }
}

/// Filter, shift and decimate `input` into `output`.
///
/// # Arguments
///
/// * `input` - Full-size spectrum
/// * `kernel` - Filter spectrum, same length and bin order as `input`
/// * `output` - Decimated spectrum; overwritten
/// * `offset` - Integer shift in bins
///
/// # Panics
///
/// Panics if `kernel` and `input` differ in length, if `input.len()` is not a
/// multiple of `output.len()`, or if `offset` lies outside
/// `[-input.len() / 2, input.len() / 2)`. These are invariants established
/// when a channelizer is built, not properties of the sample data.
///
/// # Example
///
/// ```
/// use fastddc::dsp::shift::multiply_and_shift;
/// use num_complex::Complex;
///
/// let input: Vec<Complex<f32>> = (0..8).map(|i| Complex::new(i as f32, 0.0)).collect();
/// let kernel = vec![Complex::new(1.0, 0.0); 8];
/// let mut output = vec![Complex::new(0.0, 0.0); 4];
/// multiply_and_shift(&input, &kernel, &mut output, 0);
/// // output[0] = input[2] + input[6]
/// assert_eq!(output[0].re, 8.0);
/// ```
pub fn multiply_and_shift(
    input: &[Complex<f32>],
    kernel: &[Complex<f32>],
    output: &mut [Complex<f32>],
    offset: isize,
) {
    let input_len = input.len();
    let output_len = output.len();
    assert_eq!(
        kernel.len(),
        input_len,
        "Kernel length must match input length"
    );
    assert!(
        output_len > 0 && input_len % output_len == 0,
        "Output length must divide input length"
    );
    let half = (input_len / 2) as isize;
    assert!(
        offset >= -half && offset < half,
        "Offset {} out of range [-{}, {})",
        offset,
        half,
        half
    );

    let head_output_idx = (input_len as isize - offset + (output_len / 2) as isize)
        .rem_euclid(output_len as isize) as usize;
    let head_output_len = output_len - head_output_idx;
    let tail_output_len = output_len - head_output_len;

    output.fill(Complex::new(0.0, 0.0));

    // Block head
    let mut input_idx = 0;
    multiply_add(
        &input[..head_output_len],
        &kernel[..head_output_len],
        &mut output[head_output_idx..],
    );
    input_idx += head_output_len;

    // Whole blocks
    for _ in 0..input_len / output_len - 1 {
        let block = input_idx..input_idx + output_len;
        multiply_add(&input[block.clone()], &kernel[block], output);
        input_idx += output_len;
    }

    // Block tail
    let tail = input_idx..input_idx + tail_output_len;
    multiply_add(&input[tail.clone()], &kernel[tail], &mut output[..tail_output_len]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(len: usize) -> Vec<Complex<f32>> {
        (0..len).map(|i| Complex::new(i as f32, 0.0)).collect()
    }

    fn unit(len: usize) -> Vec<Complex<f32>> {
        vec![Complex::new(1.0, 0.0); len]
    }

    /// Straightforward per-bin version of the folding.
    fn reference(
        input: &[Complex<f32>],
        kernel: &[Complex<f32>],
        output_len: usize,
        offset: isize,
    ) -> Vec<Complex<f32>> {
        let mut output = vec![Complex::new(0.0, 0.0); output_len];
        let n = input.len() as isize;
        for i in 0..input.len() {
            let idx = (n + i as isize - offset + (output_len / 2) as isize)
                .rem_euclid(output_len as isize) as usize;
            output[idx] += input[i] * kernel[i];
        }
        output
    }

    #[test]
    fn test_fold_without_offset() {
        // input_len = 8, output_len = 4, offset = 0 -> head_output_idx = 2
        let input = ramp(8);
        let mut output = vec![Complex::new(99.0, 99.0); 4];
        multiply_and_shift(&input, &unit(8), &mut output, 0);
        assert_eq!(output[0], input[2] + input[6]);
        assert_eq!(output[1], input[3] + input[7]);
        assert_eq!(output[2], input[4] + input[0]);
        assert_eq!(output[3], input[5] + input[1]);
    }

    #[test]
    fn test_fold_with_offset() {
        // offset = 3 -> head_output_idx = (8 - 3 + 2) % 4 = 3
        let input = ramp(8);
        let mut output = vec![Complex::new(0.0, 0.0); 4];
        multiply_and_shift(&input, &unit(8), &mut output, 3);
        assert_eq!(output[3], input[0] + input[4]);
        assert_eq!(output[0], input[1] + input[5]);
        assert_eq!(output[1], input[2] + input[6]);
        assert_eq!(output[2], input[3] + input[7]);
    }

    #[test]
    fn test_fold_with_negative_offset() {
        // offset = -4 -> head_output_idx = (8 + 4 + 2) % 4 = 2, same as offset 0
        let input = ramp(8);
        let mut shifted = vec![Complex::new(0.0, 0.0); 4];
        let mut plain = vec![Complex::new(0.0, 0.0); 4];
        multiply_and_shift(&input, &unit(8), &mut shifted, -4);
        multiply_and_shift(&input, &unit(8), &mut plain, 0);
        assert_eq!(shifted, plain);
    }

    #[test]
    fn test_offset_bin_lands_at_zero_after_swap() {
        let input_len = 64;
        let output_len = 16;
        for offset in [-32isize, -17, -8, 0, 5, 16, 31] {
            let mut input = vec![Complex::new(0.0, 0.0); input_len];
            input[offset.rem_euclid(input_len as isize) as usize] = Complex::new(1.0, 0.0);
            let mut output = vec![Complex::new(0.0, 0.0); output_len];
            multiply_and_shift(&input, &unit(input_len), &mut output, offset);
            crate::dsp::fft::swap_sides(&mut output);
            assert_eq!(output[0], Complex::new(1.0, 0.0), "offset {offset}");
        }
    }

    #[test]
    fn test_matches_reference_with_kernel() {
        let input_len = 32;
        let input: Vec<Complex<f32>> = (0..input_len)
            .map(|i| Complex::new((i as f32 * 0.7).sin(), (i as f32 * 0.3).cos()))
            .collect();
        let kernel: Vec<Complex<f32>> = (0..input_len)
            .map(|i| Complex::new(1.0 / (1.0 + i as f32), 0.5 - i as f32 / 64.0))
            .collect();
        for output_len in [1, 2, 4, 8, 16, 32] {
            for offset in -16..16 {
                let mut output = vec![Complex::new(0.0, 0.0); output_len];
                multiply_and_shift(&input, &kernel, &mut output, offset);
                let expected = reference(&input, &kernel, output_len, offset);
                for (o, e) in output.iter().zip(expected.iter()) {
                    assert_relative_eq!(o.re, e.re, epsilon = 1e-5);
                    assert_relative_eq!(o.im, e.im, epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_no_decimation_is_rotation() {
        let input = ramp(8);
        let mut output = vec![Complex::new(0.0, 0.0); 8];
        multiply_and_shift(&input, &unit(8), &mut output, 1);
        // head_output_idx = (8 - 1 + 4) % 8 = 3
        assert_eq!(output[3], input[0]);
        assert_eq!(output[2], input[7]);
    }

    #[test]
    fn test_multiply_add_accumulates() {
        let input = vec![Complex::new(1.0, 1.0), Complex::new(2.0, 0.0)];
        let kernel = vec![Complex::new(0.0, 1.0), Complex::new(3.0, 0.0)];
        let mut output = vec![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0)];
        multiply_add(&input, &kernel, &mut output);
        assert_eq!(output[0], Complex::new(0.0, 1.0));
        assert_eq!(output[1], Complex::new(7.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "Output length must divide input length")]
    fn test_non_integer_ratio() {
        let mut output = vec![Complex::new(0.0, 0.0); 3];
        multiply_and_shift(&ramp(8), &unit(8), &mut output, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_offset_too_large() {
        let mut output = vec![Complex::new(0.0, 0.0); 4];
        multiply_and_shift(&ramp(8), &unit(8), &mut output, 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_offset_too_small() {
        let mut output = vec![Complex::new(0.0, 0.0); 4];
        multiply_and_shift(&ramp(8), &unit(8), &mut output, -5);
    }

    #[test]
    #[should_panic(expected = "Kernel length must match input length")]
    fn test_kernel_length_mismatch() {
        let mut output = vec![Complex::new(0.0, 0.0); 4];
        multiply_and_shift(&ramp(8), &unit(4), &mut output, 0);
    }
}
