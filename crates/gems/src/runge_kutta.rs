//! Runge-Kutta methods for solving ODE's
//!
//! Given an ODE y'(t) = f(t, y) compute the next value for y under given timestep h.
//!
//! Reference: https://en.wikipedia.org/wiki/Runge%E2%80%93Kutta_methods

use std::ops::{Add, Mul, Sub};

/// Runge Kutta 4 (RK4)
pub fn runge_kutta_4<D: Dom>(t: f64, y: D, h: f64, f: impl ODE<D>) -> D {
    let h2: f64 = h * 0.5;
    let k1 = f.eval(t, y.clone());
    let k2 = f.eval(t + h2, y.clone() + k1.clone() * h2);
    let k3 = f.eval(t + h2, y.clone() + k2.clone() * h2);
    let k4 = f.eval(t + h, y.clone() + k3.clone() * h);
    y + (k1 + (k2 + k3) * 2. + k4) * (h / 6.)
}

/// Increment of one RK4 step, i.e. y(t + h) - y(t)
pub fn runge_kutta_4_increment<D: Dom>(t: f64, y: D, h: f64, f: impl ODE<D>) -> D {
    runge_kutta_4(t, y.clone(), h, f) - y
}

pub trait Dom:
    Clone + Add<Self, Output = Self> + Sub<Self, Output = Self> + Mul<f64, Output = Self>
{
}

impl Dom for f64 {}

impl<const N: usize> Dom for nalgebra::SVector<f64, N> {}

pub trait ODE<D> {
    fn eval(&self, time: f64, state: D) -> D;
}

/// Wraps a closure `f(t, y)` as an ODE
pub struct FnODE<F>(pub F);

impl<D, F> ODE<D> for FnODE<F>
where
    F: Fn(f64, D) -> D,
{
    fn eval(&self, time: f64, state: D) -> D {
        (self.0)(time, state)
    }
}

impl<D: Dom, X: ODE<D>> ODE<D> for &X {
    fn eval(&self, time: f64, state: D) -> D {
        (*self).eval(time, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn test_runge_kutta_4() {
        let actual = runge_kutta_4(0., 1., 0.025, FnODE(|_, y: f64| y.tan() + 1.));
        approx::assert_abs_diff_eq!(actual, 1.066970994, epsilon = 1e-9);
    }

    #[test]
    fn test_runge_kutta_4_increment() {
        let f = FnODE(|_, y: f64| y.tan() + 1.);
        let actual = runge_kutta_4_increment(0., 1., 0.025, &f);
        approx::assert_abs_diff_eq!(actual, 0.066970994, epsilon = 1e-9);
    }

    #[test]
    fn test_runge_kutta_4_global_error_order() {
        // y' = y, y(0) = 1 integrated up to t = 1
        let f = FnODE(|_, y: f64| y);
        let integrate = |steps: usize| {
            let h = 1. / steps as f64;
            let mut y = 1.;
            for i in 0..steps {
                y = runge_kutta_4(i as f64 * h, y, h, &f);
            }
            (y - core::f64::consts::E).abs()
        };

        let coarse = integrate(10);
        let fine = integrate(20);
        assert!(coarse < 1e-5);
        let ratio = coarse / fine;
        assert!(ratio > 14. && ratio < 18., "ratio={ratio}");
    }

    #[test]
    fn test_runge_kutta_4_oscillator() {
        // Harmonic oscillator x'' = -x over a quarter period
        let f = FnODE(|_, xv: Vector2<f64>| Vector2::new(xv[1], -xv[0]));
        let steps = 100;
        let h = 0.5 * core::f64::consts::PI / steps as f64;
        let mut v = Vector2::new(1., 0.);
        for i in 0..steps {
            v = runge_kutta_4(i as f64 * h, v, h, &f);
        }
        approx::assert_abs_diff_eq!(v[0], 0., epsilon = 1e-8);
        approx::assert_abs_diff_eq!(v[1], -1., epsilon = 1e-8);
    }
}
