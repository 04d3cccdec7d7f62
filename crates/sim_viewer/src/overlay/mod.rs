//! Overlay text formatting
//!
//! Turns simulation telemetry into the strings shown in the viewer's text
//! slots. Formatting is pure; [`OverlayText::publish`] pushes the result to
//! a [`Scene`].

use crate::foundation::math::utils;
use crate::protocol::{Contact, SimInfo};
use crate::render::{Scene, TextSlot};

/// Inputs for one overlay refresh
#[derive(Debug, Clone, Copy)]
pub struct Telemetry<'a> {
    /// Time stamp of the last applied frame
    pub frame_time: f64,
    /// Latest simulation info
    pub sim_info: &'a SimInfo,
    /// Measured render rate
    pub fps: f64,
    /// Followed entity, if it is tracked
    pub target: Option<&'a Contact>,
}

/// Formatted overlay strings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayText {
    /// Simulation time
    pub time: String,
    /// Requested time warp
    pub warp: String,
    /// Render rate
    pub fps: String,
    /// Heading of the followed entity, in degrees
    pub heading: Option<String>,
    /// Altitude of the followed entity
    pub altitude: Option<String>,
}

impl OverlayText {
    /// Format every slot from `telemetry`
    pub fn format(telemetry: &Telemetry<'_>) -> Self {
        let (heading, altitude) = match telemetry.target {
            Some(contact) => {
                let heading = utils::rad_to_deg(utils::yaw(&contact.orientation));
                (
                    Some(format!("H: {:.2}", heading)),
                    Some(format!("Alt: {:.2}", contact.position.z)),
                )
            }
            None => (None, None),
        };

        Self {
            time: format!("{:.3} s", telemetry.frame_time),
            warp: format!("{:.2} X", telemetry.sim_info.desired_warp),
            fps: format!("FPS: {:.1}", telemetry.fps),
            heading,
            altitude,
        }
    }

    /// Push the strings to their text slots
    ///
    /// Heading and altitude slots keep their previous content when no
    /// target is tracked.
    pub fn publish(&self, scene: &Scene) {
        scene.set_text(TextSlot::Time, &self.time);
        scene.set_text(TextSlot::Warp, &self.warp);
        scene.set_text(TextSlot::Fps, &self.fps);
        if let Some(heading) = &self.heading {
            scene.set_text(TextSlot::Heading, heading);
        }
        if let Some(altitude) = &self.altitude {
            scene.set_text(TextSlot::Altitude, altitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use crate::render::HeadlessRenderer;
    use std::cell::RefCell;
    use std::f64::consts::FRAC_PI_2;
    use std::rc::Rc;

    fn sim_info(warp: f64) -> SimInfo {
        SimInfo { desired_warp: warp, ..SimInfo::default() }
    }

    #[test]
    fn test_format_without_target() {
        let info = sim_info(2.0);
        let text = OverlayText::format(&Telemetry { frame_time: 12.5, sim_info: &info, fps: 59.94, target: None });

        assert_eq!(text.time, "12.500 s");
        assert_eq!(text.warp, "2.00 X");
        assert_eq!(text.fps, "FPS: 59.9");
        assert_eq!(text.heading, None);
        assert_eq!(text.altitude, None);
    }

    #[test]
    fn test_format_with_target() {
        let info = sim_info(1.0);
        let contact = Contact::new(4, Vec3::new(0.0, 0.0, 120.25))
            .with_orientation(Quat::from_euler_angles(0.0, 0.0, FRAC_PI_2));
        let text = OverlayText::format(&Telemetry { frame_time: 0.0, sim_info: &info, fps: 0.0, target: Some(&contact) });

        assert_eq!(text.heading.as_deref(), Some("H: 90.00"));
        assert_eq!(text.altitude.as_deref(), Some("Alt: 120.25"));
    }

    #[test]
    fn test_publish_keeps_heading_when_target_lost() {
        let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
        let scene = Scene::new(renderer.clone());
        let info = sim_info(1.0);
        let contact = Contact::new(1, Vec3::new(0.0, 0.0, 3.0));

        OverlayText::format(&Telemetry { frame_time: 1.0, sim_info: &info, fps: 30.0, target: Some(&contact) })
            .publish(&scene);
        OverlayText::format(&Telemetry { frame_time: 2.0, sim_info: &info, fps: 30.0, target: None }).publish(&scene);

        let r = renderer.borrow();
        assert_eq!(r.text(TextSlot::Time), Some("2.000 s"));
        assert_eq!(r.text(TextSlot::Altitude), Some("Alt: 3.00"));
    }
}
