use std::collections::VecDeque;
use std::time::Duration;

use crate::bbox::BoundingBox3;
use crate::math::gaussian_weight;
use crate::observation::Observation;

/// How far back `past_observation` reaches: roughly 10 frames at 30 fps.
const PAST_OBSERVATION_LAG_US: i64 = 333_000;

/// A tracked identity persisted across frames, owning its time-ordered
/// observation history (oldest first).
#[derive(Debug, Clone)]
pub struct KnownObject {
    id: String,
    class_name: String,
    observations: VecDeque<Observation>,
    last_zmin: f32,
    last_zmax: f32,
}

impl KnownObject {
    pub fn new(initial_observation: Observation, id: u64) -> Self {
        let class_name = initial_observation.primary_candidate().class_name.clone();
        let id = format!("{}_{}", class_name, id);

        let mut observations = VecDeque::new();
        observations.push_back(initial_observation);

        Self {
            id,
            class_name,
            observations,
            last_zmin: f32::NAN,
            last_zmax: f32::NAN,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[inline]
    pub fn last_zmin(&self) -> f32 {
        self.last_zmin
    }

    #[inline]
    pub fn set_last_zmin(&mut self, value: f32) {
        self.last_zmin = value;
    }

    #[inline]
    pub fn last_zmax(&self) -> f32 {
        self.last_zmax
    }

    #[inline]
    pub fn set_last_zmax(&mut self, value: f32) {
        self.last_zmax = value;
    }

    /// Most recent observation. The history is never empty while the object
    /// is alive; an emptied object must already have been evicted.
    pub fn current_observation(&self) -> &Observation {
        self.observations.back().expect("observation history is empty")
    }

    pub fn current_observation_mut(&mut self) -> &mut Observation {
        self.observations.back_mut().expect("observation history is empty")
    }

    /// Oldest observation still within the lag window behind the current one.
    /// Degenerates to `current_observation` for a single-element history.
    pub fn past_observation(&self) -> &Observation {
        assert!(!self.observations.is_empty());

        let deadline = self.current_observation().seen_at() - PAST_OBSERVATION_LAG_US;

        self.observations
            .iter()
            .find(|obs| obs.seen_at() >= deadline)
            .expect("current observation always satisfies the deadline")
    }

    /// Gaussian-weighted component-wise mean over `current` plus every
    /// historical box younger than `max_age`. `current` enters with age 0
    /// and therefore the largest single weight; `σ = max_age_ms / 3`.
    pub fn average_bounding_boxes(
        &self,
        current: BoundingBox3,
        now: i64,
        max_age: Duration,
    ) -> BoundingBox3 {
        let max_age_us = max_age.as_micros() as i64;
        let sigma = max_age.as_millis() as f64 / 3.0;
        let deadline = now - max_age_us;

        let mut candidates: Vec<(f64, BoundingBox3)> = Vec::new();
        for observation in &self.observations {
            if observation.seen_at() <= deadline {
                continue;
            }

            if let Some(bounding_box) = observation.bounding_box() {
                let age_ms = (now - observation.seen_at()) as f64 / 1000.0;
                candidates.push((gaussian_weight(age_ms, sigma), bounding_box));
            }
        }
        candidates.push((gaussian_weight(0.0, sigma), current));

        let weight_sum: f64 = candidates.iter().map(|(weight, _)| weight).sum();
        let normalisation = 1.0 / weight_sum;

        let mut mean = BoundingBox3::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        for (weight, candidate) in candidates {
            let w = (weight * normalisation) as f32;
            mean.x0 += w * candidate.x0;
            mean.x1 += w * candidate.x1;
            mean.y0 += w * candidate.y0;
            mean.y1 += w * candidate.y1;
            mean.z0 += w * candidate.z0;
            mean.z1 += w * candidate.z1;
        }

        mean
    }

    pub fn remember_observation(&mut self, observation: Observation) {
        self.observations.push_back(observation);
    }

    /// Drops observations older than `now − older_than` from the front.
    pub fn forget_observations(&mut self, now: i64, older_than: Duration) {
        let deadline = now - older_than.as_micros() as i64;

        while self
            .observations
            .front()
            .map_or(false, |obs| obs.seen_at() < deadline)
        {
            self.observations.pop_front();
        }
    }

    #[inline]
    pub fn all_observations_forgotten(&self) -> bool {
        self.observations.is_empty()
    }

    #[inline]
    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }
}
