//! Polynomial Features
//!
//! Degree-2 expansion of the 4 raw inputs:
//! bias, 4 linear terms, then every product x_i * x_j with i <= j (10 terms).

/// Raw inputs: day, population, emergency level, activity level
pub const RAW_FEATURES: usize = 4;

/// 1 + 4 + 10
pub const POLY_FEATURES: usize = 15;

pub type RawFeatures = [f64; RAW_FEATURES];

pub fn expand(raw: &RawFeatures) -> [f64; POLY_FEATURES] {
    let mut out = [0.0; POLY_FEATURES];
    out[0] = 1.0;
    out[1..=RAW_FEATURES].copy_from_slice(raw);

    let mut k = RAW_FEATURES + 1;
    for i in 0..RAW_FEATURES {
        for j in i..RAW_FEATURES {
            out[k] = raw[i] * raw[j];
            k += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_layout() {
        let out = expand(&[2.0, 3.0, 5.0, 7.0]);
        assert_eq!(
            out,
            [
                1.0, 2.0, 3.0, 5.0, 7.0, // bias + linear
                4.0, 6.0, 10.0, 14.0, // x0 * (x0..x3)
                9.0, 15.0, 21.0, // x1 * (x1..x3)
                25.0, 35.0, // x2 * (x2, x3)
                49.0, // x3^2
            ]
        );
    }
}
