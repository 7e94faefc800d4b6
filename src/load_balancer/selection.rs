//! Selection primitives over an ordered backend collection.
//!
//! Every primitive reads the current backend state without locking; a probe
//! landing mid-scan may or may not be observed.

use rand::Rng;
use std::ops::Deref;
use std::sync::Arc;

use crate::load_balancer::backend::Backend;

/// Ordered backend list. Order is configuration order.
#[derive(Debug, Clone, Default)]
pub struct Backends(Vec<Arc<Backend>>);

impl Backends {
    pub fn new(backends: Vec<Arc<Backend>>) -> Self {
        Self(backends)
    }

    /// All backends that are currently up, in order.
    pub fn up(&self) -> Backends {
        self.all(|b| b.up())
    }

    /// The first backend that is up.
    pub fn first_up(&self) -> Option<&Arc<Backend>> {
        self.first(|b| b.up())
    }

    /// The up backend with the smallest `metric`. Ties go to the earlier backend.
    pub fn min_up<F>(&self, metric: F) -> Option<&Arc<Backend>>
    where
        F: Fn(&Backend) -> u64,
    {
        let mut best: Option<(&Arc<Backend>, u64)> = None;
        for b in self.0.iter().filter(|b| b.up()) {
            let value = metric(b);
            match best {
                Some((_, min)) if value >= min => {}
                _ => best = Some((b, value)),
            }
        }
        best.map(|(b, _)| b)
    }

    /// A uniformly random backend.
    pub fn random(&self) -> Option<&Arc<Backend>> {
        self.random_with(&mut rand::thread_rng())
    }

    pub fn random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Arc<Backend>> {
        if self.0.is_empty() {
            return None;
        }
        self.0.get(rng.gen_range(0..self.0.len()))
    }

    /// A random backend, favouring those with a lower `weight`.
    ///
    /// Raw weights are inverted as `min + max - w`, so the lowest raw weight
    /// gets the largest share. Equal weights degrade to uniform selection.
    pub fn weighted_random<F>(&self, weight: F) -> Option<&Arc<Backend>>
    where
        F: Fn(&Backend) -> u64,
    {
        self.weighted_random_with(weight, &mut rand::thread_rng())
    }

    pub fn weighted_random_with<F, R>(&self, weight: F, rng: &mut R) -> Option<&Arc<Backend>>
    where
        F: Fn(&Backend) -> u64,
        R: Rng + ?Sized,
    {
        let raw: Vec<u128> = self.0.iter().map(|b| weight(b) as u128).collect();
        let min = *raw.iter().min()?;
        let max = *raw.iter().max()?;

        let inverted: Vec<u128> = raw.iter().map(|w| min + max - w).collect();
        let total: u128 = inverted.iter().sum();
        if total == 0 {
            // every raw weight is zero
            return self.random_with(rng);
        }

        // mark is in [0, total); the backend whose span covers it wins
        let mut mark = rng.gen_range(0..total);
        for (b, w) in self.0.iter().zip(inverted) {
            if mark < w {
                return Some(b);
            }
            mark -= w;
        }
        None
    }

    fn all<F>(&self, criteria: F) -> Backends
    where
        F: Fn(&Backend) -> bool,
    {
        Backends(self.0.iter().filter(|b| criteria(b)).cloned().collect())
    }

    fn first<F>(&self, criteria: F) -> Option<&Arc<Backend>>
    where
        F: Fn(&Backend) -> bool,
    {
        self.0.iter().find(|b| criteria(b))
    }
}

impl Deref for Backends {
    type Target = [Arc<Backend>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Arc<Backend>>> for Backends {
    fn from(backends: Vec<Arc<Backend>>) -> Self {
        Self(backends)
    }
}

impl FromIterator<Arc<Backend>> for Backends {
    fn from_iter<I: IntoIterator<Item = Arc<Backend>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
