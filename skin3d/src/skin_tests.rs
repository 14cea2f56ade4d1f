use crate::{Bone, Error, MATRIX_LEN, Skin};
use std::sync::Arc;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-6,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn numbered_matrix(base: f32) -> [f32; MATRIX_LEN] {
    let mut m = [0.0; MATRIX_LEN];
    for (i, v) in m.iter_mut().enumerate() {
        *v = base + i as f32;
    }
    m
}

#[test]
fn new_skin_is_zero_filled() {
    let skin = Skin::new(3, 2);
    assert_eq!(skin.bone_count(), 3);
    assert_eq!(skin.frame_count(), 2);
    assert_eq!(skin.duration(), 0.0);
    assert_eq!(skin.time_factor(), 0.0);
    assert_eq!(skin.num_vertices(), 0);
    assert_eq!(skin.max_num_vertex_bones(), 0);
    assert_eq!(skin.bones().len(), 3);
    assert!(skin.bones().iter().all(Option::is_none));
    for frame in 0..2 {
        assert_eq!(skin.matrices(frame).len(), 3 * MATRIX_LEN);
        assert!(skin.matrices(frame).iter().all(|&v| v == 0.0));
    }
}

#[test]
fn set_matrix_round_trips_without_touching_neighbours() {
    let mut skin = Skin::new(3, 2);
    skin.set_matrix(1, 2, numbered_matrix(100.0));
    skin.set_matrix(0, 0, numbered_matrix(0.0));

    assert_eq!(skin.matrix(1, 2), numbered_matrix(100.0));
    assert_eq!(skin.matrix(0, 0), numbered_matrix(0.0));
    assert_eq!(skin.matrix(1, 1), [0.0; MATRIX_LEN]);
    assert_eq!(skin.matrix(0, 2), [0.0; MATRIX_LEN]);
    assert_eq!(&skin.matrices(1)[2 * MATRIX_LEN..], &numbered_matrix(100.0));

    skin.set_matrix(1, 2, numbered_matrix(-5.0));
    assert_eq!(skin.matrix(1, 2), numbered_matrix(-5.0));
}

#[test]
fn try_matrix_rejects_out_of_range_indices() {
    let mut skin = Skin::new(2, 1);
    skin.set_matrix(0, 1, numbered_matrix(1.0));
    assert_eq!(skin.try_matrix(0, 1), Some(numbered_matrix(1.0)));
    assert_eq!(skin.try_matrix(1, 0), None);
    assert_eq!(skin.try_matrix(0, 2), None);
}

#[cfg(feature = "glam")]
#[test]
fn matrix_mat4_matches_the_written_transform() {
    let mut skin = Skin::new(1, 1);
    let m = glam::Mat4::from_translation(glam::Vec3::new(4.0, 5.0, 6.0));
    skin.set_matrix(0, 0, m);
    assert_eq!(skin.matrix_mat4(0, 0), m);
}

#[test]
fn duration_sets_time_factor() {
    let mut skin = Skin::new(1, 4);
    skin.set_duration(2.0).unwrap();
    assert_approx(skin.duration(), 2.0);
    assert_approx(skin.time_factor(), 2.0);
}

#[test]
fn invalid_duration_is_rejected_and_state_kept() {
    let mut skin = Skin::new(1, 4);
    skin.set_duration(2.0).unwrap();
    let before: Vec<usize> = [0.1, 0.6, 1.1, 1.6].iter().map(|&t| skin.frame_id(t)).collect();

    for value in [0.0, -1.0, 1.0e-7, f32::NAN] {
        let err = skin.set_duration(value).unwrap_err();
        assert!(matches!(err, Error::InvalidDuration { .. }));
    }

    assert_approx(skin.duration(), 2.0);
    assert_approx(skin.time_factor(), 2.0);
    let after: Vec<usize> = [0.1, 0.6, 1.1, 1.6].iter().map(|&t| skin.frame_id(t)).collect();
    assert_eq!(before, after);
}

#[test]
fn invalid_duration_on_fresh_skin_keeps_static_frame() {
    let mut skin = Skin::new(1, 4);
    assert!(skin.set_duration(0.0).is_err());
    assert!(skin.set_duration(-1.0).is_err());
    assert_eq!(skin.frame_id(1.3), 0);
    assert_eq!(skin.duration(), 0.0);
}

#[test]
fn frame_id_without_duration_is_always_zero() {
    let skin = Skin::new(1, 4);
    for t in [0.0, 0.5, 3.7, -2.0, 1000.0] {
        assert_eq!(skin.frame_id(t), 0);
    }
}

#[test]
fn frame_id_maps_and_wraps() {
    let mut skin = Skin::new(1, 4);
    skin.set_duration(2.0).unwrap();
    assert_eq!(skin.frame_id(0.0), 0);
    assert_eq!(skin.frame_id(0.5), 1);
    assert_eq!(skin.frame_id(1.0), 2);
    assert_eq!(skin.frame_id(1.999), 3);
    assert_eq!(skin.frame_id(2.0), 0);
    assert_eq!(skin.frame_id(2.5), 1);
}

#[test]
fn frame_id_is_periodic_in_duration() {
    let mut skin = Skin::new(1, 8);
    skin.set_duration(2.0).unwrap();
    for i in 0..16 {
        let t = i as f32 * 0.125 + 0.05;
        assert_eq!(skin.frame_id(t), skin.frame_id(t + 2.0), "t = {t}");
        assert_eq!(skin.frame_id(t), skin.frame_id(t + 4.0), "t = {t}");
        assert!(skin.frame_id(t) < 8);
    }
}

#[test]
fn frame_id_wraps_negative_time_forward() {
    let mut skin = Skin::new(1, 4);
    skin.set_duration(2.0).unwrap();
    assert_eq!(skin.frame_id(-0.5), 3);
    assert_eq!(skin.frame_id(-1.5), 1);
}

#[test]
fn frame_id_never_reaches_frame_count() {
    let mut skin = Skin::new(1, 3);
    skin.set_duration(0.1).unwrap();
    let just_below = f32::from_bits(0.1f32.to_bits() - 1);
    assert!(skin.frame_id(just_below) < 3);
}

#[test]
fn skin_without_frames_maps_every_time_to_zero() {
    let mut skin = Skin::new(2, 0);
    skin.set_duration(1.0).unwrap();
    assert_eq!(skin.time_factor(), 0.0);
    assert_eq!(skin.frame_id(0.7), 0);
    assert!(skin.matrices_at(0.7).is_empty());
}

#[test]
fn matrices_at_selects_the_frame_for_time() {
    let mut skin = Skin::new(1, 4);
    for frame in 0..4 {
        skin.set_matrix(frame, 0, numbered_matrix(frame as f32 * 100.0));
    }
    assert_eq!(skin.matrices_at(3.0), &numbered_matrix(0.0));

    skin.set_duration(2.0).unwrap();
    assert_eq!(skin.matrices_at(1.2), &numbered_matrix(200.0));
    assert_eq!(skin.matrices_at(3.6), &numbered_matrix(300.0));
}

#[test]
fn clear_resets_everything() {
    let mut skin = Skin::new(2, 3);
    skin.set_bone(0, Arc::new(Bone::from_pairs([(0, 1.0)])));
    skin.set_bone(1, Arc::new(Bone::from_pairs([(1, 1.0)])));
    skin.set_matrix(0, 0, numbered_matrix(1.0));
    skin.set_duration(1.0).unwrap();
    skin.reorganize_by_vertices().unwrap();

    skin.clear();
    assert_eq!(skin.bone_count(), 0);
    assert_eq!(skin.frame_count(), 0);
    assert!(skin.bones().is_empty());
    assert_eq!(skin.duration(), 0.0);
    assert_eq!(skin.time_factor(), 0.0);
    assert_eq!(skin.num_vertices(), 0);
    assert_eq!(skin.max_num_vertex_bones(), 0);
    assert_eq!(skin.frame_id(0.5), 0);
}

#[test]
fn bone_accessors_return_shared_providers() {
    let mut skin = Skin::new(2, 1);
    let bone = Arc::new(Bone::from_pairs([(0, 1.0)]));
    skin.set_bone(1, bone.clone());

    assert!(skin.bone(0).is_none());
    assert!(skin.bone(1).is_some());
    assert!(skin.bone(5).is_none());
    assert_eq!(Arc::strong_count(&bone), 2);
}

#[test]
fn skin_can_be_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Skin>();

    let mut skin = Skin::new(1, 2);
    skin.set_matrix(1, 0, numbered_matrix(7.0));
    skin.set_duration(1.0).unwrap();
    let skin = Arc::new(skin);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let skin = Arc::clone(&skin);
            std::thread::spawn(move || skin.matrices_at(0.75)[0])
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 7.0);
    }
}
