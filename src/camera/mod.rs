mod builder;
#[cfg(all(target_os = "linux", feature = "camera"))]
mod gst;
mod interface;
pub mod mock;
mod simulated;
#[cfg(test)]
mod tests;

pub use builder::{BoxedCamera, CameraBuilder};
#[cfg(all(target_os = "linux", feature = "camera"))]
pub use gst::GstCamera;
pub use interface::Camera;
pub use mock::{CameraCall, CameraCallLog, MockCamera};
pub use simulated::SimulatedCamera;
