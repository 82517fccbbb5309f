//! Duo Wrapped: two users comparing their wraps after an invitation has
//! been accepted.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use thiserror::Error;

use super::models::WrapSnapshot;
use super::slides::{self, Slide};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DuoError {
    #[error("You cannot invite yourself")]
    SelfInvite,
    #[error("User not found")]
    InviteeNotFound,
    #[error("You already have a pending invitation to {0}")]
    AlreadyPending(String),
    #[error("This invitation was already accepted")]
    AlreadyAccepted,
    #[error("This invitation has not been accepted yet")]
    NotAccepted,
    #[error("No wrap data found to share in Duo Wrapped")]
    NoWrapToShare,
    #[error("Wrap data is missing for one or both users")]
    MissingWrapData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuoInvitation {
    pub id: usize,
    pub inviter_id: usize,
    pub invitee_id: usize,
    /// Invitee's latest snapshot, attached on acceptance.
    pub invitee_wrap_data: Option<WrapSnapshot>,
    pub is_accepted: bool,
    pub created: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuoSlides {
    pub inviter_slides: Vec<Slide>,
    pub invitee_slides: Vec<Slide>,
}

/// Validates a new invitation from `inviter_id` to the user `invitee_handle`
/// resolved to `invitee_id`, returning the invitee id to store.
pub fn check_invitation(
    inviter_id: usize,
    invitee_handle: &str,
    invitee_id: Option<usize>,
    has_pending_invitation: bool,
) -> Result<usize, DuoError> {
    let invitee_id = invitee_id.ok_or(DuoError::InviteeNotFound)?;
    if invitee_id == inviter_id {
        return Err(DuoError::SelfInvite);
    }
    if has_pending_invitation {
        return Err(DuoError::AlreadyPending(invitee_handle.to_string()));
    }
    Ok(invitee_id)
}

/// Validates the acceptance of `invitation` and returns the snapshot the
/// invitee shares with it.
pub fn check_acceptance(
    invitation: &DuoInvitation,
    invitee_latest_wrap: Option<WrapSnapshot>,
) -> Result<WrapSnapshot, DuoError> {
    if invitation.is_accepted {
        return Err(DuoError::AlreadyAccepted);
    }
    invitee_latest_wrap.ok_or(DuoError::NoWrapToShare)
}

/// Composes both slideshows of an accepted invitation.
///
/// The inviter side uses their latest wrap at viewing time, the invitee side
/// the snapshot frozen at acceptance.
pub fn compose_duo<R: Rng + ?Sized>(
    invitation: &DuoInvitation,
    inviter_first_name: &str,
    inviter_latest_wrap: Option<&WrapSnapshot>,
    invitee_first_name: &str,
    rng: &mut R,
) -> Result<DuoSlides, DuoError> {
    if !invitation.is_accepted {
        return Err(DuoError::NotAccepted);
    }
    match (inviter_latest_wrap, invitation.invitee_wrap_data.as_ref()) {
        (Some(inviter_wrap), Some(invitee_wrap)) => Ok(DuoSlides {
            inviter_slides: slides::compose(inviter_first_name, inviter_wrap, rng),
            invitee_slides: slides::compose(invitee_first_name, invitee_wrap, rng),
        }),
        _ => Err(DuoError::MissingWrapData),
    }
}
