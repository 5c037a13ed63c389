//! End-to-end derivation scenarios through the publisher API.

use glam::{Mat4, Quat, Vec3};
use rigfeed::{ControllerSnapshot, ProducerConfig, Publisher};

const DT: f32 = 0.01;

/// Publisher with both transports disabled: pure pipeline under test.
fn pipeline_only() -> Publisher {
    let mut publisher = Publisher::new(ProducerConfig {
        fill_mmf: false,
        send_udp: false,
        ..ProducerConfig::default()
    });
    publisher.start_sending().expect("start");
    publisher
}

fn translated(z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, z))
}

fn drive(publisher: &mut Publisher, transform: Mat4) {
    if publisher.ingest(transform, DT).should_publish() {
        publisher.send_filtered_data().expect("publish");
    }
}

#[test]
fn cold_start_garbage_frames_never_publish() {
    let mut publisher = pipeline_only();
    let garbage = Mat4::from_cols(
        glam::Vec4::new(0.5, 0.0, 0.0, 0.0),
        glam::Vec4::new(0.0, 0.5, 0.0, 0.0),
        glam::Vec4::new(0.0, 0.0, 0.5, 0.0),
        glam::Vec4::W,
    );

    for _ in 0..5 {
        assert!(!publisher.process_transform(garbage, DT));
    }
    assert_eq!(publisher.dropped_sample_count(), u32::MAX);
    // Nothing was derived; the output is still the zero record.
    assert_eq!(publisher.filtered().speed(), 0.0);

    // Recovery: plausible frames flow again after the junk stops.
    assert!(publisher.process_transform(Mat4::IDENTITY, DT));
    assert!(publisher.process_transform(translated(0.01), DT));
    assert_eq!(publisher.dropped_sample_count(), 0);
}

#[test]
fn stationary_rig_reads_as_at_rest() {
    let mut publisher = pipeline_only();
    drive(&mut publisher, translated(0.0));
    drive(&mut publisher, translated(1e-6));
    // 3 s at 100 Hz of an unchanged pose: stale echoes all the way.
    for _ in 0..300 {
        drive(&mut publisher, translated(1e-6));
    }

    let out = publisher.filtered();
    assert!(out.local_velocity_x().abs() < 1e-3);
    assert!(out.local_velocity_y().abs() < 1e-3);
    assert!(out.local_velocity_z().abs() < 1e-3);
    assert!(out.speed() < 1e-3);
    assert!(out.gforce_lateral().abs() < 1e-2);
    assert!(out.gforce_longitudinal().abs() < 1e-2);
    assert_eq!(out.paused(), 0);
}

#[test]
fn straight_line_run_settles_on_one_meter_per_second() {
    let mut publisher = pipeline_only();
    for frame in 0..300 {
        drive(&mut publisher, translated(frame as f32 * 0.01));
    }

    let out = publisher.filtered();
    assert!((out.local_velocity_z() - 1.0).abs() < 0.05);
    assert!((out.speed() - 1.0).abs() < 0.05);
    assert!(out.gforce_longitudinal().abs() < 0.05);
    // No sustained acceleration: suspension rides at center travel.
    for corner in [
        out.suspension_position_bl(),
        out.suspension_position_br(),
        out.suspension_position_fl(),
        out.suspension_position_fr(),
    ] {
        assert!((corner - (-20.0)).abs() < 1.0, "corner = {corner}");
    }
}

#[test]
fn hard_braking_pushes_suspension_to_its_limits() {
    let mut publisher = pipeline_only();

    let mut z = 0.0;
    for _ in 0..600 {
        z += 30.0 * DT;
        drive(&mut publisher, translated(z));
    }

    let mut speed = 30.0_f32;
    while speed > 0.0 {
        speed = (speed - 60.0 * DT).max(0.0);
        z += speed * DT;
        drive(&mut publisher, translated(z));
    }

    let out = publisher.filtered();
    assert!(out.gforce_longitudinal() < -0.5, "g = {}", out.gforce_longitudinal());
    // Saturated weight transfer: fronts near full compression, rears near
    // full droop.
    assert!(out.suspension_position_fl() > 0.0, "fl = {}", out.suspension_position_fl());
    assert!(out.suspension_position_fr() > 0.0, "fr = {}", out.suspension_position_fr());
    assert!(out.suspension_position_bl() < -60.0, "bl = {}", out.suspension_position_bl());
    assert!(out.suspension_position_br() < -60.0, "br = {}", out.suspension_position_br());
}

#[test]
fn steady_turn_registers_yaw_rate_and_holds_speed() {
    let mut publisher = pipeline_only();

    // Straight run, then a constant-radius turn at 0.5 rad/s.
    let mut position = Vec3::ZERO;
    for frame in 0..600 {
        let heading = if frame < 300 { 0.0 } else { ((frame - 300) as f32) * 0.5 * DT };
        let rotation = Quat::from_rotation_y(heading);
        position += rotation * Vec3::new(0.0, 0.0, 20.0 * DT);
        drive(&mut publisher, Mat4::from_rotation_translation(rotation, position));
    }

    let out = publisher.filtered();
    assert!((out.yaw_velocity().abs() - 0.5).abs() < 0.1, "yaw rate = {}", out.yaw_velocity());
    assert!((out.speed() - 20.0).abs() < 0.5, "speed = {}", out.speed());
    assert!(out.pitch_velocity().abs() < 0.05);
    assert!(out.roll_velocity().abs() < 0.05);
}

#[test]
fn pause_toggle_fades_out_and_back_in() {
    let mut publisher = pipeline_only();
    let mut frame = 0;
    for _ in 0..200 {
        drive(&mut publisher, translated(frame as f32 * 0.01));
        frame += 1;
    }
    let live_speed = publisher.filtered().speed();
    assert!(live_speed > 0.9);

    publisher.toggle_pause();
    assert!(publisher.is_paused());

    // 1.5 s into the 3 s fade: half scale, flag still raised at the start.
    for _ in 0..150 {
        drive(&mut publisher, translated(frame as f32 * 0.01));
        frame += 1;
    }
    let mid = publisher.filtered().speed();
    assert!((mid - live_speed * 0.5).abs() < 0.1, "mid-fade speed = {mid}");
    // The flag mirrors the boolean for the whole fade, not just its start.
    assert_eq!(publisher.filtered().paused(), 1);

    // Unpause: fade back in over the remaining window.
    publisher.toggle_pause();
    assert!(!publisher.is_paused());
    for _ in 0..160 {
        drive(&mut publisher, translated(frame as f32 * 0.01));
        frame += 1;
    }
    let restored = publisher.filtered().speed();
    assert!((restored - 1.0).abs() < 0.1, "restored speed = {restored}");
    assert_eq!(publisher.filtered().paused(), 0);
}

#[test]
fn driver_inputs_reach_the_record() {
    let mut publisher = pipeline_only();
    publisher.set_controller(ControllerSnapshot {
        left_thumb_x: 0.75,
        right_trigger: 1.0,
        left_trigger: 0.0,
    });

    let mut frame = 0;
    for _ in 0..100 {
        drive(&mut publisher, translated(frame as f32 * 0.01));
        frame += 1;
    }

    let out = publisher.filtered();
    assert!((out.steering_input() - 0.75).abs() < 1e-2);
    assert!((out.throttle_input() - 1.0).abs() < 1e-2);
    assert_eq!(out.brake_input(), 0.0);
    // engine_rate = trigger * 5500 + 700 at full throttle.
    assert!((out.engine_rate() - 6200.0).abs() < 50.0);
    assert_eq!(out.max_rpm(), 6000);
    assert_eq!(out.gear(), 1);
}
