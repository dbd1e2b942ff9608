//! Reduction kernels executed on the device.
//!
//! A kernel is a plain function value over a `(values, start, len)` triple,
//! so any backend can launch it without compile-time specialization.

/// Signature of a device reduction kernel.
///
/// Folds `len` elements of `values` beginning at `start` into one scalar.
/// Kernels are pure and reentrant; overlapping ranges are safe because
/// kernels only read.
pub type Kernel = fn(&[f32], usize, usize) -> f32;

/// Multiplicative fold over `values[start..start + len]`, seeded at 1.
///
/// An empty range returns the seed. Callers are responsible for supplying
/// `start + len <= values.len()`; the range is taken by slice semantics.
///
/// Note: this demo reduction multiplies element-wise rather than
/// multiply-accumulating; partial results from disjoint ranges are combined
/// by summation in the partitioned pipeline.
///
/// # Example
///
/// ```
/// use taskseq::kernel::product_fold;
///
/// let v = [2.0, 3.0, 4.0];
/// assert_eq!(product_fold(&v, 0, 3), 24.0);
/// assert_eq!(product_fold(&v, 1, 2), 12.0);
/// ```
#[must_use]
pub fn product_fold(values: &[f32], start: usize, len: usize) -> f32 {
    values[start..start + len].iter().product()
}
