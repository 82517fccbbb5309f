use super::auth::{AuthToken, AuthTokenValue};
use super::models::{SavedWrap, User, WrapSummary};
use crate::wrapped::{DuoInvitation, WrapSnapshot};
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns the user id.
    /// Returns Err if the handle is already taken.
    fn create_user(&self, handle: &str, first_name: &str) -> Result<usize>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    /// Returns a user's id given the handle.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_id(&self, handle: &str) -> Result<Option<usize>>;

    fn get_all_users(&self) -> Result<Vec<User>>;

    /// Deletes the user together with their tokens, wraps and invitations.
    /// Returns Ok(false) if the user does not exist.
    fn delete_user(&self, user_id: usize) -> Result<bool>;
}

pub trait AuthTokenStore: Send + Sync {
    /// Adds a new auth token, Err if the value already exists.
    fn add_auth_token(&self, token: &AuthToken) -> Result<()>;

    /// Returns Ok(None) if the token does not exist.
    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Stamps the token as used now.
    fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()>;
}

pub trait WrapStore: Send + Sync {
    /// Persists a snapshot for `user_id` and returns the wrap id.
    fn save_wrap(&self, user_id: usize, snapshot: &WrapSnapshot) -> Result<usize>;

    /// The user's wraps, newest first.
    fn list_wraps(&self, user_id: usize) -> Result<Vec<WrapSummary>>;

    /// Returns Ok(None) if the wrap does not exist or belongs to someone else.
    fn get_wrap(&self, user_id: usize, wrap_id: usize) -> Result<Option<SavedWrap>>;

    /// Returns Ok(false) if the wrap does not exist or belongs to someone else.
    fn delete_wrap(&self, user_id: usize, wrap_id: usize) -> Result<bool>;

    fn get_latest_wrap(&self, user_id: usize) -> Result<Option<SavedWrap>>;
}

pub trait DuoStore: Send + Sync {
    /// Records a new pending invitation and returns its id.
    fn create_invitation(&self, inviter_id: usize, invitee_id: usize) -> Result<usize>;

    /// Whether `inviter_id` already has a pending invitation to `invitee_id`.
    fn has_pending_invitation(&self, inviter_id: usize, invitee_id: usize) -> Result<bool>;

    /// Pending invitations addressed to `invitee_id`, newest first.
    fn list_pending_invitations(&self, invitee_id: usize) -> Result<Vec<DuoInvitation>>;

    /// Returns Ok(None) if the invitation does not exist.
    fn get_invitation(&self, invitation_id: usize) -> Result<Option<DuoInvitation>>;

    /// Marks a pending invitation accepted, attaching the invitee's wrap.
    /// Returns Ok(false) if the invitation does not exist or was already
    /// accepted.
    fn accept_invitation(&self, invitation_id: usize, invitee_wrap: &WrapSnapshot)
        -> Result<bool>;
}

/// Everything the server needs from persistence.
pub trait FullStore: UserStore + AuthTokenStore + WrapStore + DuoStore {}

impl<T: UserStore + AuthTokenStore + WrapStore + DuoStore> FullStore for T {}
