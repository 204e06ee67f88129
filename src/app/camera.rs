//! Eased camera transitions
//!
//! A cluster click resolves into a camera request; the map widget itself
//! only supports instant jumps, so the application animates the request by
//! sampling an eased interpolation every frame until it completes. A new
//! request simply replaces any transition in flight (last resolved wins).

use instant::Instant;
use std::time::Duration;

/// A requested camera placement: target center and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRequest {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
}

/// An in-flight animated transition between two camera placements.
pub struct CameraTransition {
    from: CameraRequest,
    to: CameraRequest,
    started: Instant,
    duration: Duration,
}

impl CameraTransition {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(450);

    pub fn new(from: CameraRequest, to: CameraRequest) -> Self {
        Self {
            from,
            to,
            started: Instant::now(),
            duration: Self::DEFAULT_DURATION,
        }
    }

    /// Sample the transition for the current frame. The second value is
    /// true once the target has been reached.
    pub fn sample(&self, now: Instant) -> (CameraRequest, bool) {
        let elapsed = now.duration_since(self.started);
        let progress =
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        (self.at(progress), progress >= 1.0)
    }

    /// The camera placement at normalized progress `t` in `[0, 1]`,
    /// smoothstep-eased.
    pub(crate) fn at(&self, t: f64) -> CameraRequest {
        let eased = t * t * (3.0 - 2.0 * t);
        CameraRequest {
            lat: lerp(self.from.lat, self.to.lat, eased),
            lon: lerp(self.from.lon, self.to.lon, eased),
            zoom: lerp(self.from.zoom, self.to.zoom, eased),
        }
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition() -> CameraTransition {
        CameraTransition::new(
            CameraRequest {
                lat: 44.0,
                lon: -120.0,
                zoom: 6.5,
            },
            CameraRequest {
                lat: 44.2,
                lon: -121.5,
                zoom: 9.0,
            },
        )
    }

    #[test]
    fn endpoints_match_the_request() {
        let transition = transition();
        assert_eq!(
            transition.at(0.0),
            CameraRequest {
                lat: 44.0,
                lon: -120.0,
                zoom: 6.5
            }
        );
        assert_eq!(
            transition.at(1.0),
            CameraRequest {
                lat: 44.2,
                lon: -121.5,
                zoom: 9.0
            }
        );
    }

    #[test]
    fn interpolation_is_monotonic_towards_the_target() {
        let transition = transition();
        let mut previous = transition.at(0.0);
        for step in 1..=10 {
            let sample = transition.at(f64::from(step) / 10.0);
            assert!(sample.zoom >= previous.zoom);
            assert!(sample.lat >= previous.lat);
            assert!(sample.lon <= previous.lon);
            previous = sample;
        }
    }

    #[test]
    fn sample_completes_after_the_duration() {
        let transition = transition();
        let (placement, done) =
            transition.sample(transition.started + Duration::from_secs(2));
        assert!(done);
        assert_eq!(placement.zoom, 9.0);
    }
}
