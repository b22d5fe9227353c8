use bevy::prelude::*;

use crate::rpc::web_rpc::WebRpcInterface;
use crate::xr::frame::{ArFrameEvent, XrFrame};
use crate::xr::session::{SessionId, XrSessionState};

/// Opaque handle to a device hit-test source, assigned by the XR host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTestSourceId(pub u32);

/// Acquisition state of the hit-test source for the current session.
///
/// The transition out of `Idle` happens synchronously on the first AR
/// frame, before the asynchronous chain starts, so concurrent frames
/// during the pending request can never issue a second one. `Declined`
/// is terminal for the session: acquisition is not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Acquisition {
    #[default]
    Idle,
    Requesting(SessionId),
    Ready(SessionId, HitTestSourceId),
    Declined(SessionId),
}

/// Result of sampling the hit-test source for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceSample {
    Hit { position: Vec3, orientation: Quat },
    Miss,
}

/// What became of an asynchronous resolution once it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Stored,
    Declined,
    StaleSession,
    NotRequested,
}

/// Host event resolving an earlier `request_hit_test_source` notification.
/// `source: None` means the device declined hit-testing for this session.
#[derive(Event, Debug, Clone, Copy)]
pub struct HitTestSourceResolved {
    pub session: SessionId,
    pub source: Option<HitTestSourceId>,
}

/// Owns the lifecycle of the AR session's surface-detection capability.
#[derive(Resource, Default)]
pub struct HitTestState {
    acquisition: Acquisition,
}

impl HitTestState {
    /// Mark the request as issued for `session`. Returns true only on the
    /// single `Idle -> Requesting` transition per session.
    pub fn ensure_requested(&mut self, session: SessionId) -> bool {
        match self.acquisition {
            Acquisition::Idle => {
                self.acquisition = Acquisition::Requesting(session);
                true
            }
            _ => false,
        }
    }

    /// Commit an asynchronous resolution, discarding anything stale.
    ///
    /// A resolution is only stored when it answers the request recorded in
    /// `Requesting` AND that session is still the live one; a late
    /// resolution from an ended session must never resurrect a source.
    pub fn resolve(
        &mut self,
        session: SessionId,
        source: Option<HitTestSourceId>,
        sessions: &XrSessionState,
    ) -> ResolveOutcome {
        if !sessions.is_live(session) {
            return ResolveOutcome::StaleSession;
        }

        match self.acquisition {
            Acquisition::Requesting(requested) if requested == session => match source {
                Some(id) => {
                    self.acquisition = Acquisition::Ready(session, id);
                    ResolveOutcome::Stored
                }
                None => {
                    self.acquisition = Acquisition::Declined(session);
                    ResolveOutcome::Declined
                }
            },
            _ => ResolveOutcome::NotRequested,
        }
    }

    /// Drop the stored source and the requested flag. Idempotent; safe to
    /// call while a request is still pending.
    pub fn clear(&mut self) {
        self.acquisition = Acquisition::Idle;
    }

    pub fn acquisition(&self) -> Acquisition {
        self.acquisition
    }

    pub fn source(&self) -> Option<HitTestSourceId> {
        match self.acquisition {
            Acquisition::Ready(_, id) => Some(id),
            _ => None,
        }
    }

    pub fn requesting_session(&self) -> Option<SessionId> {
        match self.acquisition {
            Acquisition::Requesting(session) => Some(session),
            _ => None,
        }
    }

    /// Query this frame's surface intersections. Reports a hit only when
    /// a source exists and the frame carries at least one result; the
    /// first result's transform is decomposed into position/orientation.
    pub fn sample(&self, frame: &XrFrame) -> SurfaceSample {
        if self.source().is_none() {
            return SurfaceSample::Miss;
        }
        let Some(hit) = frame.surface_hits.first() else {
            return SurfaceSample::Miss;
        };

        let (_, orientation, position) = hit.to_scale_rotation_translation();
        SurfaceSample::Hit {
            position,
            orientation,
        }
    }
}

/// Issue the acquisition request on the first AR frame of a session.
pub fn acquire_hit_test_source(
    mut frames: EventReader<ArFrameEvent>,
    sessions: Res<XrSessionState>,
    mut hit_test: ResMut<HitTestState>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    if frames.is_empty() {
        return;
    }
    frames.clear();

    let Some(session) = sessions.current() else {
        return;
    };

    if hit_test.ensure_requested(session) {
        info!("requesting hit-test source for session {}", session.value());
        rpc.send_notification(
            "request_hit_test_source",
            serde_json::json!({ "session": session.value() }),
        );
    }
}

/// Apply asynchronous resolutions from the host, discarding stale ones.
pub fn apply_hit_test_resolution(
    mut events: EventReader<HitTestSourceResolved>,
    sessions: Res<XrSessionState>,
    mut hit_test: ResMut<HitTestState>,
) {
    for event in events.read() {
        match hit_test.resolve(event.session, event.source, &sessions) {
            ResolveOutcome::Stored => {
                info!(
                    "hit-test source ready for session {}",
                    event.session.value()
                );
            }
            ResolveOutcome::Declined => {
                // Degraded mode: every sample reports a miss for the rest
                // of this session.
                warn!(
                    "device declined hit-testing for session {}",
                    event.session.value()
                );
            }
            ResolveOutcome::StaleSession => {
                info!(
                    "discarding stale hit-test resolution for ended session {}",
                    event.session.value()
                );
            }
            ResolveOutcome::NotRequested => {
                warn!(
                    "unsolicited hit-test resolution for session {}",
                    event.session.value()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_hits(hits: Vec<Mat4>) -> XrFrame {
        XrFrame {
            viewer_pose: crate::xr::frame::ViewerPose {
                position: Vec3::ZERO,
                orientation: Quat::IDENTITY,
            },
            surface_hits: hits,
        }
    }

    #[test]
    fn request_is_issued_at_most_once_per_session() {
        let mut sessions = XrSessionState::default();
        let session = sessions.begin();
        let mut hit_test = HitTestState::default();

        assert!(hit_test.ensure_requested(session));
        for _ in 0..10 {
            assert!(!hit_test.ensure_requested(session));
        }
        assert_eq!(hit_test.acquisition(), Acquisition::Requesting(session));
    }

    #[test]
    fn stale_resolution_for_ended_session_is_discarded() {
        let mut sessions = XrSessionState::default();
        let a = sessions.begin();
        let mut hit_test = HitTestState::default();
        hit_test.ensure_requested(a);

        sessions.end();
        hit_test.clear();
        let b = sessions.begin();
        hit_test.ensure_requested(b);

        let outcome = hit_test.resolve(a, Some(HitTestSourceId(7)), &sessions);
        assert_eq!(outcome, ResolveOutcome::StaleSession);
        assert_eq!(hit_test.acquisition(), Acquisition::Requesting(b));
    }

    #[test]
    fn declined_acquisition_is_not_retried() {
        let mut sessions = XrSessionState::default();
        let session = sessions.begin();
        let mut hit_test = HitTestState::default();
        hit_test.ensure_requested(session);

        assert_eq!(
            hit_test.resolve(session, None, &sessions),
            ResolveOutcome::Declined
        );
        assert!(!hit_test.ensure_requested(session));
        assert_eq!(
            hit_test.sample(&frame_with_hits(vec![Mat4::IDENTITY])),
            SurfaceSample::Miss
        );
    }

    #[test]
    fn sample_misses_without_a_source() {
        let hit_test = HitTestState::default();
        let frame = frame_with_hits(vec![Mat4::from_translation(Vec3::new(1.0, 0.0, 2.0))]);
        assert_eq!(hit_test.sample(&frame), SurfaceSample::Miss);
    }

    #[test]
    fn sample_decomposes_the_first_hit() {
        let mut sessions = XrSessionState::default();
        let session = sessions.begin();
        let mut hit_test = HitTestState::default();
        hit_test.ensure_requested(session);
        hit_test.resolve(session, Some(HitTestSourceId(1)), &sessions);

        let pose = Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.5),
            Vec3::new(1.0, 0.0, 2.0),
        );
        let frame = frame_with_hits(vec![pose, Mat4::IDENTITY]);

        match hit_test.sample(&frame) {
            SurfaceSample::Hit {
                position,
                orientation,
            } => {
                assert!((position - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-5);
                assert!(orientation.angle_between(Quat::from_rotation_y(0.5)) < 1e-4);
            }
            SurfaceSample::Miss => panic!("expected a hit"),
        }

        assert_eq!(
            hit_test.sample(&frame_with_hits(Vec::new())),
            SurfaceSample::Miss
        );
    }

    #[test]
    fn clear_is_idempotent() {
        let mut sessions = XrSessionState::default();
        let session = sessions.begin();
        let mut hit_test = HitTestState::default();
        hit_test.ensure_requested(session);
        hit_test.resolve(session, Some(HitTestSourceId(3)), &sessions);

        hit_test.clear();
        hit_test.clear();
        assert_eq!(hit_test.acquisition(), Acquisition::Idle);
    }
}
