use log::trace;

use crate::bbox::BoundingBox3;
use crate::detected::DetectedObject;
use crate::error::Error;
use crate::relations::Relations;

/// `inner` is strictly nested in `outer` on x and z; on y only the floor is
/// compared, so an object sticking out of an open container still counts.
#[inline]
fn is_nested_inside(inner: &BoundingBox3, outer: &BoundingBox3) -> bool {
    outer.x0 < inner.x0
        && inner.x1 < outer.x1
        && outer.z0 < inner.z0
        && inner.z1 < outer.z1
        && outer.y0 < inner.y0
        && inner.y0 <= outer.y1
}

/// Classifies every ordered pair of objects into a set of symbolic spatial
/// relations. The result is an N×N matrix indexed `[subject][object]` with
/// an always-empty diagonal. `distance_equality_threshold` (ζ) is the
/// distance change below which movement is considered noise, in the same
/// units as the bounding boxes.
pub fn evaluate_relations(
    objects: &[DetectedObject],
    distance_equality_threshold: f64,
) -> Vec<Vec<Relations>> {
    let dim = objects.len();
    let mut matrix = vec![vec![Relations::none(); dim]; dim];

    evaluate_contact_relations(objects, &mut matrix);
    evaluate_static_relations(objects, &mut matrix);
    evaluate_dynamic_relations(objects, &mut matrix, distance_equality_threshold);

    matrix
}

/// Contact is symmetric, so each unordered pair is visited once and both
/// matrix cells are written.
fn evaluate_contact_relations(objects: &[DetectedObject], matrix: &mut [Vec<Relations>]) {
    for i in 0..objects.len() {
        for j in (i + 1)..objects.len() {
            if objects[i].bounding_box.collides_with(&objects[j].bounding_box) {
                matrix[i][j].set_contact(true);
                matrix[j][i].set_contact(true);
            }
        }
    }
}

/// Directional relations come in complementary pairs: each check on `[i][j]`
/// implies the complement on `[j][i]` (left of / right of and so on). The
/// two checks per axis are mutually exclusive; neither fires when the
/// projections overlap on that axis.
fn evaluate_static_relations(objects: &[DetectedObject], matrix: &mut [Vec<Relations>]) {
    for i in 0..objects.len() {
        for j in (i + 1)..objects.len() {
            let subject = &objects[i];
            let object = &objects[j];
            let subject_bb = &subject.bounding_box;
            let object_bb = &object.bounding_box;

            if subject_bb.x1 < object_bb.x0 {
                trace!("{} is left of {}", subject.class_name, object.class_name);
                matrix[i][j].set_static_left_of(true);
                matrix[j][i].set_static_right_of(true);
            } else if subject_bb.x0 > object_bb.x1 {
                trace!("{} is right of {}", subject.class_name, object.class_name);
                matrix[i][j].set_static_right_of(true);
                matrix[j][i].set_static_left_of(true);
            }

            if subject_bb.y1 < object_bb.y0 {
                trace!("{} is below {}", subject.class_name, object.class_name);
                matrix[i][j].set_static_below(true);
                matrix[j][i].set_static_above(true);
            } else if subject_bb.y0 > object_bb.y1 {
                trace!("{} is above {}", subject.class_name, object.class_name);
                matrix[i][j].set_static_above(true);
                matrix[j][i].set_static_below(true);
            }

            if subject_bb.z1 < object_bb.z0 {
                trace!("{} is behind {}", subject.class_name, object.class_name);
                matrix[i][j].set_static_behind_of(true);
                matrix[j][i].set_static_in_front_of(true);
            } else if subject_bb.z0 > object_bb.z1 {
                trace!("{} is in front of {}", subject.class_name, object.class_name);
                matrix[i][j].set_static_in_front_of(true);
                matrix[j][i].set_static_behind_of(true);
            }

            if is_nested_inside(subject_bb, object_bb) {
                trace!("{} is inside {}", subject.class_name, object.class_name);
                matrix[i][j].set_static_inside(true);
                matrix[j][i].set_static_surround(true);
            } else if is_nested_inside(object_bb, subject_bb) {
                trace!("{} surrounds {}", subject.class_name, object.class_name);
                matrix[i][j].set_static_surround(true);
                matrix[j][i].set_static_inside(true);
            }
        }
    }
}

/// Dynamic relations are commutative and need the past box of both objects;
/// pairs missing one are left without dynamic flags, as are pairs whose
/// contact state changed between past and present.
fn evaluate_dynamic_relations(
    objects: &[DetectedObject],
    matrix: &mut [Vec<Relations>],
    distance_equality_threshold: f64,
) {
    for i in 0..objects.len() {
        for j in (i + 1)..objects.len() {
            let a = &objects[i];
            let b = &objects[j];

            let (Some(a_past), Some(b_past)) = (a.past_bounding_box, b.past_bounding_box) else {
                continue;
            };

            let a_bb = &a.bounding_box;
            let b_bb = &b.bounding_box;

            let delta = a_bb.distance_to(b_bb);
            let delta_past = a_past.distance_to(&b_past);

            // In contact both now and in the past?
            let p1 = a_bb.collides_with(b_bb) && a_past.collides_with(&b_past);
            // Out of contact both now and in the past?
            let p2 = !a_bb.collides_with(b_bb) && !a_past.collides_with(&b_past);

            if p1 {
                // Rather than requiring the centers to coincide exactly, a
                // displacement below ζ/2 counts as standing still.
                let p3 = a_bb.distance_to(&a_past) < distance_equality_threshold / 2.0;
                let p4 = b_bb.distance_to(&b_past) < distance_equality_threshold / 2.0;

                if p3 && p4 {
                    matrix[i][j].set_dynamic_moving_together(true);
                    matrix[j][i].set_dynamic_moving_together(true);
                } else if !p3 && !p4 {
                    matrix[i][j].set_dynamic_halting_together(true);
                    matrix[j][i].set_dynamic_halting_together(true);
                } else {
                    matrix[i][j].set_dynamic_fixed_moving_together(true);
                    matrix[j][i].set_dynamic_fixed_moving_together(true);
                }
            } else if p2 {
                if delta - delta_past < -distance_equality_threshold {
                    matrix[i][j].set_dynamic_getting_close(true);
                    matrix[j][i].set_dynamic_getting_close(true);
                } else if delta - delta_past > distance_equality_threshold {
                    matrix[i][j].set_dynamic_moving_apart(true);
                    matrix[j][i].set_dynamic_moving_apart(true);
                } else {
                    // |delta − delta_past| ≤ ζ: no considerable change.
                    matrix[i][j].set_dynamic_stable(true);
                    matrix[j][i].set_dynamic_stable(true);
                }
            }
        }
    }
}

/// Element-wise conversion of the relation matrix to its integer wire form.
pub fn serialise(matrix: &[Vec<Relations>]) -> Vec<Vec<i32>> {
    matrix
        .iter()
        .map(|row| row.iter().map(|cell| cell.bits() as i32).collect())
        .collect()
}

/// Inverse of [`serialise`]. Rejects ragged input and elements that do not
/// fit the 16-bit relation layout.
pub fn unserialise(matrix: &[Vec<i32>]) -> Result<Vec<Vec<Relations>>, Error> {
    let expected = matrix.len();
    let mut result = Vec::with_capacity(expected);

    for (row_index, row) in matrix.iter().enumerate() {
        if row.len() != expected {
            return Err(Error::RaggedMatrix {
                row: row_index,
                found: row.len(),
                expected,
            });
        }

        let mut cells = Vec::with_capacity(expected);
        for &value in row {
            let bits =
                u16::try_from(value).map_err(|_| Error::RelationBitsOutOfRange(value))?;
            cells.push(Relations::from_bits(bits));
        }
        result.push(cells);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::{evaluate_relations, serialise, unserialise};
    use crate::bbox::BoundingBox3;
    use crate::detected::DetectedObject;
    use crate::error::Error;

    const ZETA: f64 = 30.0;

    fn object(name: &str, bounding_box: BoundingBox3) -> DetectedObject {
        DetectedObject {
            class_name: name.to_string(),
            class_index: 0,
            instance_name: format!("{name}_1"),
            certainty: 0.9,
            bounding_box,
            past_bounding_box: Some(bounding_box),
            colour: [0, 0, 0],
        }
    }

    fn moved(mut object: DetectedObject, past: BoundingBox3) -> DetectedObject {
        object.past_bounding_box = Some(past);
        object
    }

    fn bb(x0: f32, x1: f32, y0: f32, y1: f32, z0: f32, z1: f32) -> BoundingBox3 {
        BoundingBox3::new(x0, x1, y0, y1, z0, z1)
    }

    fn cube(x0: f32, x1: f32) -> BoundingBox3 {
        bb(x0, x1, 0.0, 10.0, 0.0, 10.0)
    }

    #[test]
    fn disjoint_boxes_on_x_are_left_and_right_of_each_other() {
        // Scenario A.
        let objects = vec![object("a", cube(0.0, 10.0)), object("b", cube(20.0, 30.0))];
        let matrix = evaluate_relations(&objects, ZETA);

        assert!(matrix[0][1].static_left_of());
        assert!(matrix[1][0].static_right_of());
        assert!(!matrix[0][1].contact());
        assert!(!matrix[1][0].contact());
        assert!(!matrix[0][1].static_right_of());
        assert!(!matrix[1][0].static_left_of());
    }

    #[test]
    fn overlapping_boxes_are_in_contact_without_directional_flags() {
        // Scenario B.
        let objects = vec![object("a", cube(0.0, 10.0)), object("b", cube(5.0, 15.0))];
        let matrix = evaluate_relations(&objects, ZETA);

        assert!(matrix[0][1].contact());
        assert!(matrix[1][0].contact());
        assert!(!matrix[0][1].static_left_of());
        assert!(!matrix[0][1].static_right_of());
        assert!(!matrix[1][0].static_left_of());
        assert!(!matrix[1][0].static_right_of());
    }

    #[test]
    fn vertical_and_depth_ordering() {
        let lower = object("lower", bb(0.0, 10.0, 0.0, 5.0, 0.0, 10.0));
        let upper = object("upper", bb(0.0, 10.0, 7.0, 12.0, 0.0, 10.0));
        let matrix = evaluate_relations(&[lower, upper], ZETA);

        assert!(matrix[0][1].static_below());
        assert!(matrix[1][0].static_above());

        let near = object("near", bb(0.0, 10.0, 0.0, 10.0, 12.0, 15.0));
        let far = object("far", bb(0.0, 10.0, 0.0, 10.0, 0.0, 10.0));
        let matrix = evaluate_relations(&[near, far], ZETA);

        assert!(matrix[0][1].static_in_front_of());
        assert!(matrix[1][0].static_behind_of());
    }

    #[test]
    fn nested_box_is_inside_its_container() {
        let item = object("item", bb(4.0, 6.0, 1.0, 3.0, 4.0, 6.0));
        let container = object("container", bb(0.0, 10.0, 0.0, 10.0, 0.0, 10.0));
        let matrix = evaluate_relations(&[item.clone(), container.clone()], ZETA);

        assert!(matrix[0][1].static_inside());
        assert!(matrix[1][0].static_surround());
        assert!(!matrix[0][1].static_surround());
        assert!(!matrix[1][0].static_inside());

        // Swapping the order mirrors the roles.
        let matrix = evaluate_relations(&[container, item], ZETA);
        assert!(matrix[0][1].static_surround());
        assert!(matrix[1][0].static_inside());
    }

    #[test]
    fn item_poking_out_of_an_open_container_is_still_inside() {
        // Floor inside the container, top above its rim.
        let item = object("item", bb(4.0, 6.0, 2.0, 14.0, 4.0, 6.0));
        let container = object("container", bb(0.0, 10.0, 0.0, 10.0, 0.0, 10.0));
        let matrix = evaluate_relations(&[item, container], ZETA);

        assert!(matrix[0][1].static_inside());
        assert!(matrix[1][0].static_surround());
    }

    #[test]
    fn contact_in_both_frames_with_small_displacements() {
        // Both displacements below ζ/2 set "moving together" (the inherited
        // naming; see halting case below).
        let a = moved(object("a", cube(0.0, 10.0)), cube(1.0, 11.0));
        let b = moved(object("b", cube(5.0, 15.0)), cube(6.0, 16.0));
        let matrix = evaluate_relations(&[a, b], ZETA);

        assert!(matrix[0][1].dynamic_moving_together());
        assert!(matrix[1][0].dynamic_moving_together());
        assert!(!matrix[0][1].dynamic_halting_together());
    }

    #[test]
    fn contact_in_both_frames_with_large_displacements() {
        let a = moved(object("a", cube(0.0, 10.0)), cube(100.0, 110.0));
        let b = moved(object("b", cube(5.0, 15.0)), cube(105.0, 115.0));
        let matrix = evaluate_relations(&[a, b], ZETA);

        assert!(matrix[0][1].dynamic_halting_together());
        assert!(matrix[1][0].dynamic_halting_together());
    }

    #[test]
    fn contact_in_both_frames_with_one_moving_object() {
        let a = moved(object("a", cube(0.0, 10.0)), cube(0.0, 10.0));
        // b moved by (−10, 10, 10), ~17.3 units, while staying in touch
        // with a in both frames.
        let b = moved(
            object("b", cube(5.0, 15.0)),
            bb(-5.0, 5.0, 10.0, 20.0, 10.0, 20.0),
        );
        let matrix = evaluate_relations(&[a, b], ZETA);

        assert!(matrix[0][1].dynamic_fixed_moving_together());
        assert!(matrix[1][0].dynamic_fixed_moving_together());
    }

    #[test]
    fn separated_objects_getting_close_moving_apart_or_stable() {
        let anchor = object("anchor", cube(0.0, 10.0));

        let closing = moved(object("b", cube(50.0, 60.0)), cube(100.0, 110.0));
        let matrix = evaluate_relations(&[anchor.clone(), closing], ZETA);
        assert!(matrix[0][1].dynamic_getting_close());
        assert!(matrix[1][0].dynamic_getting_close());

        let parting = moved(object("b", cube(100.0, 110.0)), cube(50.0, 60.0));
        let matrix = evaluate_relations(&[anchor.clone(), parting], ZETA);
        assert!(matrix[0][1].dynamic_moving_apart());
        assert!(matrix[1][0].dynamic_moving_apart());

        let hovering = moved(object("b", cube(100.0, 110.0)), cube(105.0, 115.0));
        let matrix = evaluate_relations(&[anchor, hovering], ZETA);
        assert!(matrix[0][1].dynamic_stable());
        assert!(matrix[1][0].dynamic_stable());
    }

    #[test]
    fn changed_contact_state_sets_no_dynamic_flag() {
        // In contact now, separate in the past.
        let a = moved(object("a", cube(0.0, 10.0)), cube(0.0, 10.0));
        let b = moved(object("b", cube(5.0, 15.0)), cube(50.0, 60.0));
        let matrix = evaluate_relations(&[a, b], ZETA);

        let dynamic_bits = matrix[0][1].bits() >> 10;
        assert_eq!(dynamic_bits, 0);
    }

    #[test]
    fn pairs_without_past_boxes_get_no_dynamic_flags() {
        let mut a = object("a", cube(0.0, 10.0));
        a.past_bounding_box = None;
        let b = object("b", cube(5.0, 15.0));
        let matrix = evaluate_relations(&[a, b], ZETA);

        assert!(matrix[0][1].contact());
        assert_eq!(matrix[0][1].bits() >> 10, 0);
    }

    #[test]
    fn diagonal_is_always_empty() {
        let objects = vec![
            object("a", cube(0.0, 10.0)),
            object("b", cube(5.0, 15.0)),
            object("c", cube(100.0, 110.0)),
        ];
        let matrix = evaluate_relations(&objects, ZETA);

        for (i, row) in matrix.iter().enumerate() {
            assert!(row[i].is_empty());
        }
    }

    #[test]
    fn complementary_and_symmetric_flags_agree_across_the_matrix() {
        let objects = vec![
            object("a", cube(0.0, 10.0)),
            object("b", bb(20.0, 30.0, 15.0, 25.0, 20.0, 30.0)),
            moved(object("c", cube(5.0, 15.0)), cube(6.0, 16.0)),
            object("d", bb(2.0, 4.0, 1.0, 3.0, 2.0, 4.0)),
        ];
        let matrix = evaluate_relations(&objects, ZETA);

        for i in 0..objects.len() {
            for j in 0..objects.len() {
                assert_eq!(matrix[i][j].contact(), matrix[j][i].contact());
                assert_eq!(matrix[i][j].static_left_of(), matrix[j][i].static_right_of());
                assert_eq!(matrix[i][j].static_above(), matrix[j][i].static_below());
                assert_eq!(
                    matrix[i][j].static_behind_of(),
                    matrix[j][i].static_in_front_of()
                );
                assert_eq!(matrix[i][j].static_inside(), matrix[j][i].static_surround());
                assert_eq!(
                    matrix[i][j].bits() >> 10,
                    matrix[j][i].bits() >> 10,
                    "dynamic flags must be symmetric"
                );
            }
        }
    }

    #[test]
    fn serialise_roundtrip() {
        let objects = vec![
            object("a", cube(0.0, 10.0)),
            object("b", cube(20.0, 30.0)),
            moved(object("c", cube(5.0, 15.0)), cube(6.0, 16.0)),
        ];
        let matrix = evaluate_relations(&objects, ZETA);

        let serialised = serialise(&matrix);
        let restored = unserialise(&serialised).unwrap();
        assert_eq!(matrix, restored);
    }

    #[test]
    fn unserialise_rejects_out_of_range_values() {
        let result = unserialise(&[vec![0, 70_000], vec![0, 0]]);
        assert!(matches!(result, Err(Error::RelationBitsOutOfRange(70_000))));

        let result = unserialise(&[vec![0, -1], vec![0, 0]]);
        assert!(matches!(result, Err(Error::RelationBitsOutOfRange(-1))));
    }

    #[test]
    fn unserialise_rejects_ragged_matrices() {
        let result = unserialise(&[vec![0, 1], vec![0]]);
        assert!(matches!(
            result,
            Err(Error::RaggedMatrix {
                row: 1,
                found: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn reserved_bit_is_never_produced() {
        let objects = vec![
            object("a", cube(0.0, 10.0)),
            object("b", cube(20.0, 30.0)),
            object("c", bb(2.0, 4.0, 1.0, 3.0, 2.0, 4.0)),
        ];
        let matrix = evaluate_relations(&objects, ZETA);

        for row in &matrix {
            for cell in row {
                assert_eq!(cell.bits() & (1 << 7), 0);
            }
        }
    }
}
