//! Rolling average over a fixed window

use std::collections::VecDeque;

use crate::{Result, RigError};

/// Mean of the last `N` samples
#[derive(Debug, Clone)]
pub struct RollingAverage {
    samples: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl RollingAverage {
    /// Create an average over `capacity` samples; `capacity` must be positive
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RigError::Config(
                "rolling average window must be positive".to_string(),
            ));
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
            sum: 0.0,
        })
    }

    /// Push a sample, evicting the oldest once the window is full
    pub fn add(&mut self, x: f64) {
        self.samples.push_back(x);
        self.sum += x;
        if self.samples.len() > self.capacity {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
    }

    /// Current mean, 0 when empty
    pub fn value(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_window_rejected() {
        assert!(RollingAverage::new(0).is_err());
    }

    #[test]
    fn test_partial_window() {
        let mut avg = RollingAverage::new(4).unwrap();
        assert_eq!(avg.value(), 0.0);
        avg.add(2.0);
        avg.add(4.0);
        assert_eq!(avg.len(), 2);
        assert_eq!(avg.value(), 3.0);
    }

    #[test]
    fn test_window_slides() {
        let mut avg = RollingAverage::new(3).unwrap();
        for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
            avg.add(x);
        }
        assert_eq!(avg.len(), 3);
        assert!((avg.value() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut avg = RollingAverage::new(2).unwrap();
        avg.add(10.0);
        avg.reset();
        assert!(avg.is_empty());
        assert_eq!(avg.value(), 0.0);
        avg.add(1.0);
        assert_eq!(avg.value(), 1.0);
    }
}
