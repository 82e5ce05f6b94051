//! Room and roommate search

use roomshare_core::room_filter::vacancy_filter;
use roomshare_core::{
    compile_room_query, compile_roommate_query, Pagination, Room, RoomSearchParams,
    RoommateProfile, RoommateSearchParams, User, UserId,
};
use serde::Serialize;

use crate::error::MarketError;
use crate::store::MarketStore;

/// One page of room search results
#[derive(Debug, Clone, Serialize)]
pub struct RoomSearchResult {
    pub rooms: Vec<Room>,
    pub pagination: Pagination,
    /// Every city with a vacant room, for search suggestions
    pub cities: Vec<String>,
}

/// Public view of a discoverable roommate
///
/// Contact and identity fields stay private until a match is made.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommateCard {
    pub id: UserId,
    pub name: String,
    pub roommate_profile: RoommateProfile,
}

impl RoommateCard {
    fn from_user(user: User) -> Option<Self> {
        let profile = user.roommate_profile?;
        Some(Self {
            id: user.id,
            name: user.name,
            roommate_profile: profile,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoommateSearchResult {
    pub roommates: Vec<RoommateCard>,
    pub pagination: Pagination,
}

pub struct ListingService<'a, M: MarketStore> {
    store: &'a M,
}

impl<'a, M: MarketStore> ListingService<'a, M> {
    pub fn new(store: &'a M) -> Self {
        Self { store }
    }

    pub fn search_rooms(&self, params: &RoomSearchParams) -> Result<RoomSearchResult, MarketError> {
        let query = compile_room_query(params)?;
        let rooms = self.store.find_rooms(&query)?;
        let total = self.store.count_rooms(&query.filter)?;
        let cities = self.store.distinct_cities(&vacancy_filter())?;

        tracing::debug!(total, returned = rooms.len(), "Room search");

        Ok(RoomSearchResult {
            rooms,
            pagination: Pagination::new(query.page, total),
            cities,
        })
    }

    pub fn search_roommates(
        &self,
        params: &RoommateSearchParams,
    ) -> Result<RoommateSearchResult, MarketError> {
        let query = compile_roommate_query(params)?;
        let users = self.store.find_users(&query)?;
        let total = self.store.count_users(&query.filter)?;

        tracing::debug!(total, returned = users.len(), "Roommate search");

        Ok(RoommateSearchResult {
            roommates: users.into_iter().filter_map(RoommateCard::from_user).collect(),
            pagination: Pagination::new(query.page, total),
        })
    }
}
