/// Index of the largest value, taking the first on ties
///
/// Returns `None` for an empty slice. NaN entries never win a comparison.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if !(v > b) => best,
            _ if v.is_nan() => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Largest value in the slice, or `None` if it is empty or all NaN
pub fn max(values: &[f32]) -> Option<f32> {
    argmax(values).map(|i| values[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_functional() {
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.9, 0.3]), Some(1));
        assert_eq!(argmax(&[2.0, 2.0, 1.0]), Some(0), "first index wins ties");
        assert_eq!(argmax(&[f32::NAN, -1.0]), Some(1), "NaN is skipped");
    }

    #[test]
    fn max_functional() {
        assert_eq!(max(&[-3.0, -1.0, -2.0]), Some(-1.0));
        assert_eq!(max(&[]), None);
    }
}
