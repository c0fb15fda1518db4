//! Small fixed-size vector helpers over `[f64; D]`.

/// A D-dimensional vector.
pub type Vector<const D: usize> = [f64; D];

#[inline]
pub fn add<const D: usize>(a: &Vector<D>, b: &Vector<D>) -> Vector<D> {
    let mut out = *a;
    for (o, &bk) in out.iter_mut().zip(b) {
        *o += bk;
    }
    out
}

#[inline]
pub fn sub<const D: usize>(a: &Vector<D>, b: &Vector<D>) -> Vector<D> {
    let mut out = *a;
    for (o, &bk) in out.iter_mut().zip(b) {
        *o -= bk;
    }
    out
}

#[inline]
pub fn scale<const D: usize>(a: &Vector<D>, s: f64) -> Vector<D> {
    let mut out = *a;
    out.iter_mut().for_each(|o| *o *= s);
    out
}

/// `a + b * s`
#[inline]
pub fn axpy<const D: usize>(a: &Vector<D>, b: &Vector<D>, s: f64) -> Vector<D> {
    let mut out = *a;
    for (o, &bk) in out.iter_mut().zip(b) {
        *o += bk * s;
    }
    out
}

#[inline]
pub fn is_finite<const D: usize>(a: &Vector<D>) -> bool {
    a.iter().all(|x| x.is_finite())
}

/// Copy the first `D` entries of `src`, padding with zeros.
pub fn from_slice<const D: usize>(src: &[f64]) -> Vector<D> {
    let mut out = [0.0; D];
    for (o, &s) in out.iter_mut().zip(src) {
        *o = s;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axpy_matches_add_of_scaled() {
        let a = [1.0, 2.0, 3.0];
        let b = [0.5, -1.0, 4.0];
        assert_eq!(axpy(&a, &b, 2.0), add(&a, &scale(&b, 2.0)));
        assert_eq!(sub(&add(&a, &b), &b), a);
    }

    #[test]
    fn from_slice_pads_and_truncates() {
        let short: Vector<3> = from_slice(&[1.0, 2.0]);
        assert_eq!(short, [1.0, 2.0, 0.0]);
        let long: Vector<2> = from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(long, [1.0, 2.0]);
    }
}
