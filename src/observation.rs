use nalgebra as na;

use crate::bbox::BoundingBox3;
use crate::candidate::Candidate;

#[inline]
fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// A single timestamped detection: ranked class candidates plus normalized
/// 2D geometry, optionally carrying a 3D bounding box resolved later by the
/// depth collaborator.
#[derive(Debug, Clone)]
pub struct Observation {
    candidates: Vec<Candidate>,
    seen_at: i64,
    cx: f32,
    cy: f32,
    w: f32,
    h: f32,
    xmin: f32,
    xmax: f32,
    ymin: f32,
    ymax: f32,
    class_count: i32,
    bounding_box: Option<BoundingBox3>,
}

impl Observation {
    /// `seen_at` is in microseconds. Geometry is clamped to `[0, 1]`, the
    /// corner fields are derived from center and extent.
    ///
    /// Panics if `candidates` is empty; an observation without a primary
    /// candidate is a contract breach upstream.
    pub fn new(candidates: Vec<Candidate>, seen_at: i64, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        assert!(
            !candidates.is_empty(),
            "observation requires at least one class candidate"
        );

        let class_count = candidates.len() as i32;

        Self {
            candidates,
            seen_at,
            cx: clamp_unit(cx),
            cy: clamp_unit(cy),
            w: clamp_unit(w),
            h: clamp_unit(h),
            xmin: clamp_unit(cx - w / 2.0),
            xmax: clamp_unit(cx + w / 2.0),
            ymin: clamp_unit(cy - h / 2.0),
            ymax: clamp_unit(cy + h / 2.0),
            class_count,
            bounding_box: None,
        }
    }

    #[inline]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Highest-ranked class hypothesis.
    #[inline]
    pub fn primary_candidate(&self) -> &Candidate {
        &self.candidates[0]
    }

    #[inline]
    pub fn seen_at(&self) -> i64 {
        self.seen_at
    }

    #[inline]
    pub fn cx(&self) -> f32 {
        self.cx
    }

    #[inline]
    pub fn cy(&self) -> f32 {
        self.cy
    }

    #[inline]
    pub fn w(&self) -> f32 {
        self.w
    }

    #[inline]
    pub fn h(&self) -> f32 {
        self.h
    }

    #[inline]
    pub fn xmin(&self) -> f32 {
        self.xmin
    }

    #[inline]
    pub fn xmax(&self) -> f32 {
        self.xmax
    }

    #[inline]
    pub fn ymin(&self) -> f32 {
        self.ymin
    }

    #[inline]
    pub fn ymax(&self) -> f32 {
        self.ymax
    }

    #[inline]
    pub fn set_cx(&mut self, value: f32) {
        self.cx = clamp_unit(value);
    }

    #[inline]
    pub fn set_cy(&mut self, value: f32) {
        self.cy = clamp_unit(value);
    }

    #[inline]
    pub fn set_w(&mut self, value: f32) {
        self.w = clamp_unit(value);
    }

    #[inline]
    pub fn set_h(&mut self, value: f32) {
        self.h = clamp_unit(value);
    }

    #[inline]
    pub fn set_xmin(&mut self, value: f32) {
        self.xmin = clamp_unit(value);
    }

    #[inline]
    pub fn set_xmax(&mut self, value: f32) {
        self.xmax = clamp_unit(value);
    }

    #[inline]
    pub fn set_ymin(&mut self, value: f32) {
        self.ymin = clamp_unit(value);
    }

    #[inline]
    pub fn set_ymax(&mut self, value: f32) {
        self.ymax = clamp_unit(value);
    }

    #[inline]
    pub fn class_count(&self) -> i32 {
        self.class_count
    }

    #[inline]
    pub fn set_class_count(&mut self, value: i32) {
        self.class_count = value;
    }

    #[inline]
    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        self.bounding_box
    }

    #[inline]
    pub fn has_bounding_box_set(&self) -> bool {
        self.bounding_box.is_some()
    }

    /// Attaches the resolved 3D box. May be called at most once.
    pub fn set_bounding_box(&mut self, bounding_box: BoundingBox3) {
        debug_assert!(
            self.bounding_box.is_none(),
            "bounding box may only be set once"
        );
        self.bounding_box = Some(bounding_box);
    }

    /// Euclidean distance between the normalized 2D centers. Only meaningful
    /// for association, not for spatial reasoning.
    pub fn distance_to(&self, other: &Observation) -> f64 {
        let a = na::Point2::new(self.cx as f64, self.cy as f64);
        let b = na::Point2::new(other.cx as f64, other.cy as f64);

        na::distance(&a, &b)
    }
}
