//! Roommate profile management

use roomshare_core::{RoommateProfile, RoommateProfileDraft, UserId};

use crate::error::MarketError;
use crate::store::MarketStore;

pub struct ProfileService<'a, M: MarketStore> {
    store: &'a M,
}

impl<'a, M: MarketStore> ProfileService<'a, M> {
    pub fn new(store: &'a M) -> Self {
        Self { store }
    }

    /// Create or replace the actor's roommate profile
    pub fn upsert_profile(
        &self,
        actor: UserId,
        draft: RoommateProfileDraft,
    ) -> Result<RoommateProfile, MarketError> {
        if self.store.get_user(actor)?.is_none() {
            return Err(MarketError::NotFound("User"));
        }
        let profile = draft.into_profile()?;
        self.store
            .set_roommate_profile(actor, Some(profile.clone()))?;

        tracing::info!(user_id = %actor, active = profile.is_active, "Roommate profile saved");

        Ok(profile)
    }

    pub fn get_profile(&self, actor: UserId) -> Result<RoommateProfile, MarketError> {
        self.store
            .get_user(actor)?
            .and_then(|user| user.roommate_profile)
            .ok_or(MarketError::NotFound("Roommate profile"))
    }

    /// Show or hide the profile in roommate search
    pub fn set_active(&self, actor: UserId, active: bool) -> Result<RoommateProfile, MarketError> {
        let mut profile = self.get_profile(actor)?;
        profile.is_active = active;
        self.store
            .set_roommate_profile(actor, Some(profile.clone()))?;

        tracing::info!(user_id = %actor, active, "Roommate profile visibility changed");

        Ok(profile)
    }
}
