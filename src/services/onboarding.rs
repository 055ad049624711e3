//! Onboarding flow
//!
//! A pure state machine for the first-run questionnaire. Steps advance
//! only when the data collected so far passes that step's check; skipping
//! at any point jumps straight to Complete with a flag-only profile.
//! Completion is a single profile upsert with `onboarding_completed` set,
//! which is the only record of onboarding state the server trusts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ProfileInput, MAX_INTERESTS};

/// Steps of the onboarding questionnaire, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    /// Informational screens between welcome and the first question
    Introduction,
    AboutYou,
    AboutBaby,
    Interests,
    ContentStyle,
    Complete,
}

impl OnboardingStep {
    /// The step after this one
    pub fn next(&self) -> OnboardingStep {
        match self {
            OnboardingStep::Welcome => OnboardingStep::Introduction,
            OnboardingStep::Introduction => OnboardingStep::AboutYou,
            OnboardingStep::AboutYou => OnboardingStep::AboutBaby,
            OnboardingStep::AboutBaby => OnboardingStep::Interests,
            OnboardingStep::Interests => OnboardingStep::ContentStyle,
            OnboardingStep::ContentStyle | OnboardingStep::Complete => OnboardingStep::Complete,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("step {step:?} is incomplete: {reason}")]
    Incomplete {
        step: OnboardingStep,
        reason: &'static str,
    },
    #[error("onboarding is already complete")]
    AlreadyComplete,
}

/// In-progress onboarding answers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingFlow {
    pub step: OnboardingStep,
    pub input: ProfileInput,
}

impl Default for OnboardingStep {
    fn default() -> Self {
        OnboardingStep::Welcome
    }
}

impl OnboardingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next step if the current step's data is acceptable
    pub fn advance(&mut self) -> Result<OnboardingStep, OnboardingError> {
        self.check_current_step()?;
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Abandon the questionnaire: completion flag only, answers discarded
    pub fn skip(&mut self) -> Result<ProfileInput, OnboardingError> {
        if self.step == OnboardingStep::Complete {
            return Err(OnboardingError::AlreadyComplete);
        }
        self.step = OnboardingStep::Complete;
        Ok(ProfileInput::skipped())
    }

    /// The profile to persist once every step has been passed
    pub fn finish(mut self) -> Result<ProfileInput, OnboardingError> {
        if self.step != OnboardingStep::Complete {
            return Err(OnboardingError::Incomplete {
                step: self.step,
                reason: "remaining steps not answered",
            });
        }
        self.input.onboarding_completed = true;
        Ok(self.input)
    }

    fn check_current_step(&self) -> Result<(), OnboardingError> {
        let fail = |reason| {
            Err(OnboardingError::Incomplete {
                step: self.step,
                reason,
            })
        };

        match self.step {
            OnboardingStep::Welcome | OnboardingStep::Introduction => Ok(()),
            OnboardingStep::AboutYou => {
                if self.input.name.trim().is_empty() {
                    return fail("name is required");
                }
                Ok(())
            }
            OnboardingStep::AboutBaby => {
                if self.input.baby_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    return fail("baby name is required");
                }
                Ok(())
            }
            OnboardingStep::Interests => {
                if self.input.interests.len() > MAX_INTERESTS {
                    return fail("too many interests selected");
                }
                Ok(())
            }
            OnboardingStep::ContentStyle => {
                if self.input.content_style.is_none() {
                    return fail("content style not chosen");
                }
                Ok(())
            }
            OnboardingStep::Complete => Err(OnboardingError::AlreadyComplete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentStyle, Interest};

    fn answered_flow() -> OnboardingFlow {
        OnboardingFlow {
            step: OnboardingStep::Welcome,
            input: ProfileInput {
                name: "Anna".to_string(),
                baby_name: Some("Elsa".to_string()),
                interests: vec![Interest::Breastfeeding, Interest::SleepRoutines],
                content_style: Some(ContentStyle::Practical),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_full_walk_reaches_complete() {
        let mut flow = answered_flow();
        let expected = [
            OnboardingStep::Introduction,
            OnboardingStep::AboutYou,
            OnboardingStep::AboutBaby,
            OnboardingStep::Interests,
            OnboardingStep::ContentStyle,
            OnboardingStep::Complete,
        ];
        for step in expected {
            assert_eq!(flow.advance().unwrap(), step);
        }

        let profile = flow.finish().unwrap();
        assert!(profile.onboarding_completed);
        assert_eq!(profile.name, "Anna");
    }

    #[test]
    fn test_missing_name_blocks_about_you() {
        let mut flow = answered_flow();
        flow.input.name = "  ".to_string();

        flow.advance().unwrap();
        flow.advance().unwrap();
        // Now at AboutYou
        let err = flow.advance().unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::Incomplete {
                step: OnboardingStep::AboutYou,
                ..
            }
        ));
        // State did not move
        assert_eq!(flow.step, OnboardingStep::AboutYou);
    }

    #[test]
    fn test_third_interest_blocks_step() {
        let mut flow = answered_flow();
        flow.input.interests.push(Interest::OwnRecovery);

        for _ in 0..4 {
            flow.advance().unwrap();
        }
        assert_eq!(flow.step, OnboardingStep::Interests);
        assert!(flow.advance().is_err());
    }

    #[test]
    fn test_skip_from_any_step() {
        let mut flow = answered_flow();
        flow.advance().unwrap();

        let profile = flow.skip().unwrap();
        assert_eq!(flow.step, OnboardingStep::Complete);
        assert!(profile.onboarding_completed);
        assert!(profile.name.is_empty());
        assert!(profile.interests.is_empty());
    }

    #[test]
    fn test_finish_before_complete_fails() {
        let flow = answered_flow();
        assert!(flow.finish().is_err());
    }
}
