//! Room listing documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, RoomId, UserId};

/// Minimum number of images a listing must carry
pub const MIN_ROOM_IMAGES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    /// Neighbourhood or locality within the city
    #[serde(default)]
    pub area: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Pg,
    Studio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Furnishing {
    Furnished,
    SemiFurnished,
    Unfurnished,
}

/// Whether the lister owns the property or sublets it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipType {
    #[serde(rename = "self")]
    SelfOwned,
    #[serde(rename = "tenant")]
    Tenant,
}

/// Contact for the actual property owner when the lister is a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDetails {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMetadata {
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnishing: Option<Furnishing>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Floor area in square feet
    pub area: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub ownership_type: OwnershipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_details: Option<OwnerDetails>,
    #[serde(default)]
    pub security_deposit: i64,
}

/// A rentable room document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub title: String,
    pub description: String,
    pub address: Address,
    pub price: i64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub available_beds: u32,
    pub is_vacant: bool,
    #[serde(default)]
    pub current_roommates: Vec<UserId>,
    pub owner: UserId,
    pub metadata: RoomMetadata,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Check the field-level invariants of a listing
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }
        if self.address.city.trim().is_empty() {
            return Err(Error::Validation("city is required".to_string()));
        }
        if self.price < 0 {
            return Err(Error::Validation("price cannot be negative".to_string()));
        }
        if self.images.len() < MIN_ROOM_IMAGES {
            return Err(Error::Validation(format!(
                "at least {} images are required",
                MIN_ROOM_IMAGES
            )));
        }
        if self.available_beds < 1 {
            return Err(Error::Validation(
                "availableBeds must be at least 1".to_string(),
            ));
        }
        match (self.metadata.ownership_type, &self.metadata.owner_details) {
            (OwnershipType::Tenant, None) => Err(Error::Validation(
                "ownerDetails are required when the lister is a tenant".to_string(),
            )),
            (OwnershipType::SelfOwned, Some(_)) => Err(Error::Validation(
                "ownerDetails only apply when the lister is a tenant".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Take the room for `roommate`; false when another tenant holds it
    pub fn occupy(&mut self, roommate: UserId) -> bool {
        let already_in = self.current_roommates.contains(&roommate);
        if !self.is_vacant && !already_in {
            return false;
        }
        self.is_vacant = false;
        if !already_in {
            self.current_roommates.push(roommate);
        }
        self.updated_at = Utc::now();
        true
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            title: self.title.clone(),
            city: self.address.city.clone(),
            price: self.price,
            image: self.images.first().cloned(),
            is_vacant: self.is_vacant,
        }
    }
}

/// Display fields of a room joined onto requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub title: String,
    pub city: String,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_vacant: bool,
}

/// Trim, lowercase and de-duplicate amenity tags
pub fn normalize_amenities<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Fields an owner supplies when listing a room
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub address: Address,
    pub price: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub available_beds: u32,
    pub metadata: RoomMetadata,
}

impl RoomDraft {
    /// Build a vacant room owned by `owner`
    pub fn into_room(self, owner: UserId) -> Result<Room> {
        let now = Utc::now();
        let room = Room {
            id: RoomId::new(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            address: self.address,
            price: self.price,
            amenities: normalize_amenities(&self.amenities),
            images: self.images,
            available_beds: self.available_beds,
            is_vacant: true,
            current_roommates: Vec::new(),
            owner,
            metadata: self.metadata,
            created_at: now,
            updated_at: now,
        };
        room.validate()?;
        Ok(room)
    }
}

/// Partial update of an existing listing
///
/// Owner, vacancy and roommates are deliberately absent: they only change
/// through request acceptance.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<Address>,
    pub price: Option<i64>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub available_beds: Option<u32>,
    pub metadata: Option<RoomMetadata>,
}

impl RoomUpdate {
    /// Apply onto `room` and re-check its invariants
    pub fn apply(self, room: &mut Room) -> Result<()> {
        if let Some(title) = self.title {
            room.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            room.description = description.trim().to_string();
        }
        if let Some(address) = self.address {
            room.address = address;
        }
        if let Some(price) = self.price {
            room.price = price;
        }
        if let Some(amenities) = self.amenities {
            room.amenities = normalize_amenities(&amenities);
        }
        if let Some(images) = self.images {
            room.images = images;
        }
        if let Some(beds) = self.available_beds {
            room.available_beds = beds;
        }
        if let Some(metadata) = self.metadata {
            room.metadata = metadata;
        }
        room.updated_at = Utc::now();
        room.validate()
    }
}
