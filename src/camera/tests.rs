use super::*;
use crate::config::{CameraBackend, CameraConfig};
use crate::error::{CameraError, MotionError};
use crate::frame::FrameFormat;

fn create_test_camera_config() -> CameraConfig {
    CameraConfig {
        backend: CameraBackend::Simulated,
        warmup_ms: 0,
        simulated_motion_interval: 3,
        simulated_frame_interval_ms: 0,
        ..CameraConfig::default()
    }
}

#[test]
fn test_simulated_scene_changes_on_interval() {
    let mut camera = SimulatedCamera::new(&create_test_camera_config());
    camera.set_resolution((16, 8)).unwrap();

    let frames: Vec<_> = (0..4)
        .map(|_| camera.capture_to_buffer(FrameFormat::Rgba, true).unwrap())
        .collect();

    assert!(frames.iter().all(|f| f.validate_size()));
    assert_eq!(frames[0].data(), frames[1].data());
    assert_eq!(frames[1].data(), frames[2].data());
    assert_ne!(frames[2].data(), frames[3].data());
    assert_eq!(camera.frame_count(), 4);
}

#[test]
fn test_simulated_is_deterministic_for_seed() {
    let config = create_test_camera_config();
    let mut first = SimulatedCamera::new(&config);
    let mut second = SimulatedCamera::new(&config);
    first.set_resolution((8, 8)).unwrap();
    second.set_resolution((8, 8)).unwrap();

    let a = first.capture_to_buffer(FrameFormat::Rgba, true).unwrap();
    let b = second.capture_to_buffer(FrameFormat::Rgba, true).unwrap();
    assert_eq!(a.data(), b.data());
}

#[test]
fn test_simulated_resolution_change_regenerates_scene() {
    let mut camera = SimulatedCamera::new(&create_test_camera_config());
    camera.set_resolution((8, 8)).unwrap();
    let small = camera.capture_to_buffer(FrameFormat::Rgba, true).unwrap();

    camera.set_resolution((16, 16)).unwrap();
    let large = camera.capture_to_buffer(FrameFormat::Rgba, true).unwrap();

    assert_eq!(small.len(), 8 * 8 * 4);
    assert_eq!(large.len(), 16 * 16 * 4);
    assert!(large.validate_size());
}

#[test]
fn test_simulated_capture_to_file_writes_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture20240101120000.jpg");

    let mut camera = SimulatedCamera::new(&create_test_camera_config());
    camera.set_resolution((64, 48)).unwrap();
    camera.capture_to_file(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_simulated_rejects_use_after_close() {
    let mut camera = SimulatedCamera::new(&create_test_camera_config());
    camera.close().unwrap();

    assert!(matches!(
        camera.set_resolution((8, 8)),
        Err(MotionError::Camera(CameraError::Closed))
    ));
    assert!(camera.close().is_err());
}

#[test]
fn test_camera_builder_validation() {
    let result = CameraBuilder::new().build();

    match result {
        Err(MotionError::System { message }) => {
            assert!(message.contains("Camera configuration must be specified"));
        }
        _ => panic!("Expected system error for missing configuration"),
    }
}

#[test]
fn test_camera_builder_backend_override() {
    let config = CameraConfig {
        backend: CameraBackend::Gstreamer,
        ..create_test_camera_config()
    };

    let mut camera = CameraBuilder::new()
        .config(config)
        .backend(CameraBackend::Simulated)
        .build()
        .unwrap();

    camera.set_resolution((4, 4)).unwrap();
    let frame = camera.capture_to_buffer(FrameFormat::Rgba, true).unwrap();
    assert_eq!(frame.len(), 4 * 4 * 4);
    camera.close().unwrap();
}

#[test]
fn test_mock_camera_records_calls() {
    let mut camera = MockCamera::new().with_frames(vec![vec![9u8; 2 * 2 * 4]]);
    let log = camera.log();

    camera.set_resolution((2, 2)).unwrap();
    let scripted = camera.capture_to_buffer(FrameFormat::Rgba, true).unwrap();
    let fallback = camera.capture_to_buffer(FrameFormat::Rgba, true).unwrap();
    camera.close().unwrap();

    assert_eq!(scripted.data(), &[9u8; 16][..]);
    assert_eq!(fallback.data(), &[0u8; 16][..]);
    assert_eq!(fallback.id(), 1);
    assert_eq!(log.buffer_capture_count(), 2);
    assert_eq!(log.close_count(), 1);
    assert_eq!(
        log.calls()[0],
        CameraCall::SetResolution {
            width: 2,
            height: 2
        }
    );
}

#[test]
fn test_mock_camera_injected_failures() {
    let mut camera = MockCamera::new()
        .fail_buffer_capture_on(1)
        .fail_file_capture();
    camera.set_resolution((2, 2)).unwrap();

    assert!(camera.capture_to_buffer(FrameFormat::Rgba, true).is_ok());
    assert!(matches!(
        camera.capture_to_buffer(FrameFormat::Rgba, true),
        Err(MotionError::Camera(CameraError::CaptureStream { .. }))
    ));
    assert!(camera
        .capture_to_file(std::path::Path::new("capture.jpg"))
        .is_err());
}
