use std::time::Duration;

use log::{debug, trace};
use serde_derive::{Deserialize, Serialize};

use crate::bbox::BoundingBox3;
use crate::memory::Memory;
use crate::observation::Observation;

/// Per-cycle output record for one tracked object, read-only downstream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub class_name: String,
    pub class_index: i32,
    pub instance_name: String,
    pub certainty: f32,
    pub bounding_box: BoundingBox3,
    pub past_bounding_box: Option<BoundingBox3>,
    pub colour: [u8; 3],
}

/// Seam to the external depth/clustering subsystem. NaN components in the
/// returned box signal that (part of) the estimate is unavailable: all-NaN
/// x/y means no estimate at all, NaN z means the depth range is missing.
pub trait BoxEstimator {
    fn estimate(&mut self, observation: &Observation) -> BoundingBox3;
}

impl<F> BoxEstimator for F
where
    F: FnMut(&Observation) -> BoundingBox3,
{
    fn estimate(&mut self, observation: &Observation) -> BoundingBox3 {
        self(observation)
    }
}

/// Converts the tracked state into the flat snapshot consumed by the
/// relation evaluator. Only objects observed at `frame_seen_at` take part.
///
/// Per object: the estimator resolves a 3D box for the current observation;
/// a missing z range is recovered from the object's cached one (the object
/// is skipped when there is nothing to recover from, as it is when x/y are
/// missing entirely), a valid z range refreshes the cache. A non-zero
/// `smoothing` window blends the estimate with recent history before it is
/// attached to the observation and emitted.
pub fn resolve_detected_objects<E: BoxEstimator>(
    memory: &mut Memory,
    estimator: &mut E,
    smoothing: Duration,
    frame_seen_at: i64,
) -> Vec<DetectedObject> {
    let mut detected_objects = Vec::new();

    for known_object in memory.known_objects_mut() {
        if known_object.current_observation().seen_at() != frame_seen_at {
            continue;
        }
        if known_object.current_observation().has_bounding_box_set() {
            continue;
        }

        let mut bounding_box = estimator.estimate(known_object.current_observation());

        if bounding_box.xy_is_nan() {
            debug!(
                "could not estimate bounding box for object {}",
                known_object.id()
            );
            continue;
        }
        if bounding_box.z_is_nan() {
            if known_object.last_zmin().is_nan() || known_object.last_zmax().is_nan() {
                debug!(
                    "no cached depth range to recover object {} with",
                    known_object.id()
                );
                continue;
            }
            trace!("recovering depth range of object {} from cache", known_object.id());
            bounding_box.z0 = known_object.last_zmin();
            bounding_box.z1 = known_object.last_zmax();
        } else {
            known_object.set_last_zmin(bounding_box.z0);
            known_object.set_last_zmax(bounding_box.z1);
        }

        if !smoothing.is_zero() {
            let seen_at = known_object.current_observation().seen_at();
            bounding_box = known_object.average_bounding_boxes(bounding_box, seen_at, smoothing);
        }

        debug_assert!(bounding_box.x0 <= bounding_box.x1);
        debug_assert!(bounding_box.y0 <= bounding_box.y1);
        debug_assert!(bounding_box.z0 <= bounding_box.z1);

        known_object.current_observation_mut().set_bounding_box(bounding_box);

        let past_bounding_box = known_object.past_observation().bounding_box();
        let candidate = known_object.current_observation().primary_candidate();
        detected_objects.push(DetectedObject {
            class_name: candidate.class_name.clone(),
            class_index: candidate.class_index,
            instance_name: known_object.id().to_string(),
            certainty: candidate.certainty,
            bounding_box,
            past_bounding_box,
            colour: candidate.colour,
        });
    }

    detected_objects
}
