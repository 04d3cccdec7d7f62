//! # Camera follow controller
//!
//! A three-state machine deciding where the camera sits relative to the
//! entity it follows:
//!
//! - **Follow**: behind and above the target, rotating with it
//! - **Free**: externally controlled, never repositioned here
//! - **Offset**: fixed world-space offset from the target, no rotation
//!
//! Whatever mode is stored, an empty registry behaves as Free.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::foundation::math::{Quat, Vec3};
use crate::registry::ActorContact;

/// Follow-mode camera offset in the target's body frame, before scaling
const FOLLOW_BASE_OFFSET: [f64; 3] = [-50.0, 0.0, 15.0];

/// Offset-mode camera offset in world space
const OFFSET_VIEW: [f64; 3] = [0.0, -150.0, 15.0];

/// Factor applied per follow-distance step
const FOLLOW_DISTANCE_STEP: f64 = 1.1;

/// Camera behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraMode {
    /// Chase camera rotating with the target
    #[default]
    Follow,
    /// Camera is controlled by the user
    Free,
    /// Fixed world-space offset from the target
    Offset,
}

impl CameraMode {
    /// Next mode in the Follow → Free → Offset → Follow cycle
    pub fn next(self) -> Self {
        match self {
            CameraMode::Follow => CameraMode::Free,
            CameraMode::Free => CameraMode::Offset,
            CameraMode::Offset => CameraMode::Follow,
        }
    }
}

/// Pending change of follow target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowStep {
    /// Keep the current target if it still exists
    #[default]
    Stay,
    /// Move to the next higher id
    Increment,
    /// Move to the next lower id
    Decrement,
}

/// Camera placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera position
    pub position: Vec3,
    /// Point the camera looks at
    pub focal_point: Vec3,
}

/// Resolve the id to follow among `tracked`
///
/// `step` is applied to `desired` first. If the resulting id is not tracked,
/// the search keeps stepping in the same direction (upwards for
/// [`FollowStep::Stay`]), wrapping to the smallest id above the largest and
/// to the largest id below the smallest. Returns `None` only when `tracked`
/// is empty.
pub fn resolve_follow_target<T>(desired: i32, step: FollowStep, tracked: &BTreeMap<i32, T>) -> Option<i32> {
    let (&min, _) = tracked.first_key_value()?;
    let (&max, _) = tracked.last_key_value()?;

    let mut id = match step {
        FollowStep::Stay => desired,
        FollowStep::Increment => desired.checked_add(1).unwrap_or(min),
        FollowStep::Decrement => desired.checked_sub(1).unwrap_or(max),
    };

    // Terminates: inside [min, max] the walk reaches min or max at the latest
    while !tracked.contains_key(&id) {
        id = if id > max {
            min
        } else if id < min {
            max
        } else if step == FollowStep::Decrement {
            id - 1
        } else {
            id + 1
        };
    }
    Some(id)
}

/// Follow-mode pose for a target
pub fn follow_pose(position: &Vec3, orientation: &Quat, distance: f64) -> CameraPose {
    let relative = Vec3::from(FOLLOW_BASE_OFFSET).normalize() * distance;
    CameraPose {
        position: position + orientation * relative,
        focal_point: *position,
    }
}

/// Offset-mode pose for a target
pub fn offset_pose(position: &Vec3) -> CameraPose {
    CameraPose {
        position: position + Vec3::from(OFFSET_VIEW),
        focal_point: *position,
    }
}

/// Camera mode state machine and follow-target selection
#[derive(Debug, Clone)]
pub struct CameraController {
    mode: CameraMode,
    follow_id: i32,
    pending_step: FollowStep,
    follow_distance: f64,
}

impl CameraController {
    /// Create a controller
    pub fn new(mode: CameraMode, follow_distance: f64) -> Self {
        Self {
            mode,
            follow_id: 0,
            pending_step: FollowStep::Stay,
            follow_distance,
        }
    }

    /// Stored mode
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Replace the stored mode
    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    /// Advance to the next mode
    pub fn next_mode(&mut self) {
        self.mode = self.mode.next();
        log::debug!("Camera mode: {:?}", self.mode);
    }

    /// Mode actually used for the pose; Free whenever nothing is tracked
    pub fn effective_mode(&self, registry_empty: bool) -> CameraMode {
        if registry_empty {
            CameraMode::Free
        } else {
            self.mode
        }
    }

    /// Id currently followed
    pub fn follow_id(&self) -> i32 {
        self.follow_id
    }

    /// Current follow distance
    pub fn follow_distance(&self) -> f64 {
        self.follow_distance
    }

    /// Follow the next higher id on the next update
    pub fn increment_follow_target(&mut self) {
        self.pending_step = FollowStep::Increment;
    }

    /// Follow the next lower id on the next update
    pub fn decrement_follow_target(&mut self) {
        self.pending_step = FollowStep::Decrement;
    }

    /// Move the follow camera further away
    pub fn increment_follow_distance(&mut self) {
        self.follow_distance *= FOLLOW_DISTANCE_STEP;
    }

    /// Move the follow camera closer
    pub fn decrement_follow_distance(&mut self) {
        self.follow_distance /= FOLLOW_DISTANCE_STEP;
    }

    /// Resolve the follow target and compute the camera pose
    ///
    /// Returns `None` when the camera should not be moved: nothing is
    /// tracked, or the stored mode is Free. A pending target step is kept
    /// until an update runs with a non-empty registry.
    pub fn update(&mut self, tracked: &BTreeMap<i32, ActorContact>) -> Option<CameraPose> {
        let step = std::mem::take(&mut self.pending_step);
        let Some(id) = resolve_follow_target(self.follow_id, step, tracked) else {
            self.pending_step = step;
            return None;
        };
        self.follow_id = id;

        let contact = tracked.get(&id)?.contact();
        match self.mode {
            CameraMode::Free => None,
            CameraMode::Offset => Some(offset_pose(&contact.position)),
            CameraMode::Follow => Some(follow_pose(&contact.position, &contact.orientation, self.follow_distance)),
        }
    }
}
