//! Marketplace services
//!
//! Each service borrows the injected store for the duration of one HTTP
//! request and holds no state of its own.

pub mod listing;
pub mod profiles;
pub mod requests;
pub mod rooms;

pub use listing::{ListingService, RoomSearchResult, RoommateCard, RoommateSearchResult};
pub use profiles::ProfileService;
pub use requests::RequestService;
pub use rooms::{RoomDetails, RoomService};
