use num_traits::Zero;
use std::ops::{AddAssign, Div};

pub trait Lerp<K>: Sized {
    /// Required implementation for lerp
    fn lerp_impl(&self, q: K, other: &Self) -> Self;

    /// Computes (1 - q) * self + q * other
    fn lerp(&self, q: K, other: &Self) -> Self {
        let mut out = self.lerp_impl(q, other);
        out.normalize();
        out
    }

    /// Weighted average over items.
    /// Weights must be non-negative. Returns None if there are no items with positive weight.
    fn weighted_average<'a>(items: impl IntoIterator<Item = (K, &'a Self)>) -> Option<Self>
    where
        Self: 'a + Clone,
        K: Copy + AddAssign + Div<Output = K> + Zero + PartialOrd,
    {
        let mut acc: Option<(K, Self)> = None;
        for (w, v) in items {
            if !(w > K::zero()) {
                continue;
            }
            acc = Some(match acc {
                None => (w, v.clone()),
                Some((mut sw, sv)) => {
                    // (sw*sv + w*v) / (sw + w)
                    // = sw / (sw + w) * sv + w / (sw + w) * v
                    // => q = w / (sw + w)
                    sw += w;
                    let sv = sv.lerp_impl(w / sw, v);
                    (sw, sv)
                }
            });
        }
        acc.map(|(_, mut sv)| {
            sv.normalize();
            sv
        })
    }

    /// Renormalizes self after averaging to deal with non-linear quantities
    fn normalize(&mut self) {}
}

impl Lerp<f64> for f64 {
    fn lerp_impl(&self, q: f64, other: &Self) -> Self {
        (1. - q) * self + q * other
    }
}
