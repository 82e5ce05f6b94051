//! User documents and the embedded roommate profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, RoomId, UserId};

/// What a user signed up to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tenant,
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupationType {
    Student,
    Professional,
    Freelancer,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SleepSchedule {
    EarlyBird,
    NightOwl,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cleanliness {
    VeryClean,
    Moderate,
    Relaxed,
}

/// How often a habit (smoking, drinking) happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Never,
    Occasionally,
    Regularly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pets {
    HasPets,
    OkWithPets,
    NoPets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Diet {
    Vegetarian,
    NonVegetarian,
    Vegan,
    Any,
}

/// Lifestyle answers; every field is optional so a profile can be partial
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifestyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_schedule: Option<SleepSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanliness: Option<Cleanliness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoking: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drinking: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pets: Option<Pets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<Diet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

/// What the profile owner is looking for in a roommate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommatePreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_range: Option<AgeRange>,
    /// `None` means any gender
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Roommate-matching profile embedded in a user document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommateProfile {
    pub is_active: bool,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation_type: Option<OccupationType>,
    pub budget: i64,
    #[serde(default)]
    pub location_preference: String,
    #[serde(default)]
    pub current_location: String,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub preferences: RoommatePreferences,
}

/// Youngest and oldest age a roommate profile may declare
pub const MIN_PROFILE_AGE: u32 = 18;
pub const MAX_PROFILE_AGE: u32 = 100;

/// Client-supplied roommate profile, validated into a [`RoommateProfile`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommateProfileDraft {
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub bio: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub occupation_type: Option<OccupationType>,
    pub budget: i64,
    #[serde(default)]
    pub location_preference: String,
    #[serde(default)]
    pub current_location: String,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub preferences: RoommatePreferences,
}

fn default_true() -> bool {
    true
}

impl RoommateProfileDraft {
    /// Check the draft and normalize free-text fields
    pub fn into_profile(self) -> Result<RoommateProfile> {
        if let Some(age) = self.age {
            if !(MIN_PROFILE_AGE..=MAX_PROFILE_AGE).contains(&age) {
                return Err(Error::Validation(format!(
                    "age must be between {} and {}",
                    MIN_PROFILE_AGE, MAX_PROFILE_AGE
                )));
            }
        }
        if self.budget < 0 {
            return Err(Error::Validation("budget cannot be negative".to_string()));
        }
        if let Some(range) = self.preferences.age_range {
            if range.min > range.max {
                return Err(Error::Validation(
                    "preferred age range minimum exceeds maximum".to_string(),
                ));
            }
        }

        let mut interests: Vec<String> = Vec::with_capacity(self.interests.len());
        for interest in self.interests {
            let interest = interest.trim();
            if interest.is_empty() {
                continue;
            }
            if !interests.iter().any(|i| i.eq_ignore_ascii_case(interest)) {
                interests.push(interest.to_string());
            }
        }

        Ok(RoommateProfile {
            is_active: self.is_active,
            bio: self.bio.trim().to_string(),
            age: self.age,
            gender: self.gender,
            occupation_type: self.occupation_type,
            budget: self.budget,
            location_preference: self.location_preference.trim().to_string(),
            current_location: self.current_location.trim().to_string(),
            lifestyle: self.lifestyle,
            interests,
            preferences: self.preferences,
        })
    }
}

/// A user account document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub aadhar_number: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub role: Role,
    #[serde(default)]
    pub listed_rooms: Vec<RoomId>,
    #[serde(default)]
    pub rented_rooms: Vec<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roommate_profile: Option<RoommateProfile>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A freshly signed-up, unverified account
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        aadhar_number: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into().trim().to_lowercase(),
            phone: None,
            aadhar_number: aadhar_number.into(),
            password_hash: password_hash.into(),
            is_verified: false,
            role,
            listed_rooms: Vec::new(),
            rented_rooms: Vec::new(),
            roommate_profile: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Display fields of a user joined onto rooms and requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Check that an aadhar number is exactly 12 digits
pub fn validate_aadhar(aadhar: &str) -> Result<()> {
    if aadhar.len() == 12 && aadhar.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::Validation(
            "aadhar number must be 12 digits".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RoommateProfileDraft {
        serde_json::from_value(serde_json::json!({
            "budget": 8000,
            "age": 24,
            "interests": [" hiking ", "Hiking", "", "chess"]
        }))
        .unwrap()
    }

    #[test]
    fn test_draft_defaults_to_active() {
        let profile = draft().into_profile().unwrap();
        assert!(profile.is_active);
    }

    #[test]
    fn test_draft_dedupes_interests() {
        let profile = draft().into_profile().unwrap();
        assert_eq!(profile.interests, vec!["hiking", "chess"]);
    }

    #[test]
    fn test_draft_rejects_minor() {
        let mut d = draft();
        d.age = Some(16);
        assert!(matches!(d.into_profile(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_draft_rejects_inverted_age_range() {
        let mut d = draft();
        d.preferences.age_range = Some(AgeRange { min: 30, max: 20 });
        assert!(d.into_profile().is_err());
    }

    #[test]
    fn test_user_serializes_camel_case_paths() {
        let mut user = User::new("Asha", "Asha@Example.com", "123412341234", "hash", Role::Tenant);
        user.roommate_profile = Some(draft().into_profile().unwrap());
        let doc = serde_json::to_value(&user).unwrap();

        assert_eq!(doc["email"], "asha@example.com");
        assert_eq!(doc["isVerified"], false);
        assert_eq!(doc["roommateProfile"]["isActive"], true);
        assert_eq!(doc["roommateProfile"]["budget"], 8000);
        assert!(doc["createdAt"].is_i64());
    }

    #[test]
    fn test_validate_aadhar() {
        assert!(validate_aadhar("123456789012").is_ok());
        assert!(validate_aadhar("12345678901").is_err());
        assert!(validate_aadhar("12345678901a").is_err());
    }
}
