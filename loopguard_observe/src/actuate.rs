// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stop action: pause, falling back to mute.

use core::fmt::Debug;

use loopguard_session::StopReason;

use crate::host::Actuator;

/// How a stop request ended up being honored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Halted {
    /// Playback was paused.
    Paused,
    /// Pausing failed; the element was muted instead.
    Muted,
    /// Neither command succeeded.
    Failed,
}

/// Stop playback of `media`.
///
/// Never fails: a rejected pause falls back to mute and a rejected mute is
/// only logged. Callers guarantee at most one call per session.
pub fn halt<M, A>(actuator: &mut A, media: M, reason: StopReason, logging: bool) -> Halted
where
    M: Copy + Debug,
    A: Actuator<M> + ?Sized,
{
    let err = match actuator.pause(media) {
        Ok(()) => {
            if logging {
                tracing::info!(?media, reason = reason.label(), "paused");
            }
            return Halted::Paused;
        }
        Err(err) => err,
    };
    if logging {
        tracing::warn!(?media, reason = reason.label(), %err, "pause failed, muting instead");
    }
    match actuator.mute(media) {
        Ok(()) => Halted::Muted,
        Err(err) => {
            if logging {
                tracing::warn!(?media, %err, "mute failed");
            }
            Halted::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActuationError;
    use loopguard_session::CycleSignal;

    #[derive(Default)]
    struct Player {
        pause_ok: bool,
        mute_ok: bool,
        calls: Vec<&'static str>,
    }

    impl Actuator<u8> for Player {
        fn pause(&mut self, _media: u8) -> Result<(), ActuationError> {
            self.calls.push("pause");
            if self.pause_ok {
                Ok(())
            } else {
                Err(ActuationError::Rejected("not allowed".into()))
            }
        }

        fn mute(&mut self, _media: u8) -> Result<(), ActuationError> {
            self.calls.push("mute");
            if self.mute_ok {
                Ok(())
            } else {
                Err(ActuationError::Detached)
            }
        }
    }

    const REASON: StopReason = StopReason::Cycles(CycleSignal::Ended);

    #[test]
    fn pause_success_skips_mute() {
        let mut p = Player {
            pause_ok: true,
            ..Player::default()
        };
        assert_eq!(halt(&mut p, 1, REASON, false), Halted::Paused);
        assert_eq!(p.calls, vec!["pause"]);
    }

    #[test]
    fn pause_failure_mutes() {
        let mut p = Player {
            mute_ok: true,
            ..Player::default()
        };
        assert_eq!(halt(&mut p, 1, StopReason::Elapsed, true), Halted::Muted);
        assert_eq!(p.calls, vec!["pause", "mute"]);
    }

    #[test]
    fn double_failure_is_reported_not_raised() {
        let mut p = Player::default();
        assert_eq!(halt(&mut p, 1, REASON, true), Halted::Failed);
        assert_eq!(p.calls, vec!["pause", "mute"]);
    }
}
