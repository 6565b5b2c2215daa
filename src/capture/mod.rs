pub mod media;
#[cfg(feature = "camera")]
pub mod nokhwa_device;
pub mod sampler;
pub mod station;
#[cfg(test)]
pub mod testing;

use media::MediaDevice;
use std::sync::Arc;

/// Camera the console drives: the native one when built with `camera`.
pub fn default_device() -> Arc<dyn MediaDevice> {
    #[cfg(feature = "camera")]
    {
        Arc::new(nokhwa_device::NokhwaDevice)
    }
    #[cfg(not(feature = "camera"))]
    {
        Arc::new(media::UnavailableDevice)
    }
}
