//! Applicant identity collaborator. Authentication lives elsewhere; the booking
//! engine only needs the profile fields that feed groom/bride derivation.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::appointments::domain::{ApplicantId, Gender};
use super::appointments::validation::{normalize_name, validate_name, ValidationError};
use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub id: ApplicantId,
    pub phone_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub is_admin: bool,
}

impl ApplicantProfile {
    pub fn new(id: ApplicantId, phone_number: impl Into<String>) -> Self {
        Self {
            id,
            phone_number: phone_number.into(),
            first_name: None,
            last_name: None,
            gender: None,
            is_admin: false,
        }
    }
}

/// Profile fields an applicant may change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
}

pub trait ApplicantDirectory: Send + Sync {
    fn lookup(&self, id: ApplicantId) -> Result<Option<ApplicantProfile>, DirectoryError>;

    /// Every account holding the admin role.
    fn admins(&self) -> Result<Vec<ApplicantProfile>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("applicant {0} not found")]
    UnknownApplicant(ApplicantId),
    #[error("applicant {0} is already registered")]
    AlreadyRegistered(ApplicantId),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("applicant directory unavailable: {0}")]
    Unavailable(String),
}

impl DirectoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::UnknownApplicant(_) => ErrorKind::NotFound,
            DirectoryError::AlreadyRegistered(_) => ErrorKind::Conflict,
            DirectoryError::Invalid(_) => ErrorKind::InvalidInput,
            DirectoryError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicantDirectory {
    profiles: Arc<Mutex<BTreeMap<ApplicantId, ApplicantProfile>>>,
}

impl InMemoryApplicantDirectory {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<ApplicantId, ApplicantProfile>>, DirectoryError> {
        self.profiles
            .lock()
            .map_err(|_| DirectoryError::Unavailable("directory mutex poisoned".to_string()))
    }

    /// Store a new profile as-is. An id that is already known keeps its profile.
    pub fn register(&self, profile: ApplicantProfile) -> Result<(), DirectoryError> {
        match self.lock()?.entry(profile.id) {
            Entry::Occupied(_) => Err(DirectoryError::AlreadyRegistered(profile.id)),
            Entry::Vacant(slot) => {
                slot.insert(profile);
                Ok(())
            }
        }
    }

    /// Validate and normalize names before storing them on an existing profile.
    pub fn update_profile(
        &self,
        id: ApplicantId,
        update: ProfileUpdate,
    ) -> Result<ApplicantProfile, DirectoryError> {
        validate_name("first name", &update.first_name)?;
        validate_name("last name", &update.last_name)?;

        let mut profiles = self.lock()?;
        let profile = profiles
            .get_mut(&id)
            .ok_or(DirectoryError::UnknownApplicant(id))?;
        profile.first_name = Some(normalize_name(&update.first_name));
        profile.last_name = Some(normalize_name(&update.last_name));
        profile.gender = Some(update.gender);
        Ok(profile.clone())
    }
}

impl ApplicantDirectory for InMemoryApplicantDirectory {
    fn lookup(&self, id: ApplicantId) -> Result<Option<ApplicantProfile>, DirectoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn admins(&self) -> Result<Vec<ApplicantProfile>, DirectoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|profile| profile.is_admin)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_profile_normalizes_names() {
        let directory = InMemoryApplicantDirectory::default();
        directory
            .register(ApplicantProfile::new(ApplicantId(1), "+77010000001"))
            .unwrap();

        let updated = directory
            .update_profile(
                ApplicantId(1),
                ProfileUpdate {
                    first_name: "  aRMAN ".to_string(),
                    last_name: "bekov".to_string(),
                    gender: Gender::Male,
                },
            )
            .expect("profile updated");
        assert_eq!(updated.first_name.as_deref(), Some("Arman"));
        assert_eq!(updated.last_name.as_deref(), Some("Bekov"));
        assert_eq!(updated.gender, Some(Gender::Male));
    }

    #[test]
    fn update_profile_rejects_short_names_and_unknown_ids() {
        let directory = InMemoryApplicantDirectory::default();
        directory
            .register(ApplicantProfile::new(ApplicantId(1), "+77010000001"))
            .unwrap();

        let update = ProfileUpdate {
            first_name: "A".to_string(),
            last_name: "Bekov".to_string(),
            gender: Gender::Male,
        };
        let err = directory
            .update_profile(ApplicantId(1), update.clone())
            .expect_err("one letter is too short");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let valid = ProfileUpdate {
            first_name: "Arman".to_string(),
            ..update
        };
        let err = directory
            .update_profile(ApplicantId(2), valid)
            .expect_err("unknown applicant");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn registering_a_known_id_keeps_the_existing_profile() {
        let directory = InMemoryApplicantDirectory::default();
        directory
            .register(ApplicantProfile::new(ApplicantId(1), "+77010000001"))
            .unwrap();
        directory
            .update_profile(
                ApplicantId(1),
                ProfileUpdate {
                    first_name: "Arman".to_string(),
                    last_name: "Bekov".to_string(),
                    gender: Gender::Male,
                },
            )
            .unwrap();

        let err = directory
            .register(ApplicantProfile::new(ApplicantId(1), "+77019999999"))
            .expect_err("duplicate id rejected");
        assert!(matches!(err, DirectoryError::AlreadyRegistered(ApplicantId(1))));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let kept = directory.lookup(ApplicantId(1)).unwrap().expect("profile kept");
        assert_eq!(kept.phone_number, "+77010000001");
        assert_eq!(kept.first_name.as_deref(), Some("Arman"));
        assert_eq!(kept.gender, Some(Gender::Male));
    }

    #[test]
    fn admins_lists_only_admin_profiles() {
        let directory = InMemoryApplicantDirectory::default();
        directory
            .register(ApplicantProfile::new(ApplicantId(1), "+77010000001"))
            .unwrap();
        let mut admin = ApplicantProfile::new(ApplicantId(2), "+77010000002");
        admin.is_admin = true;
        directory.register(admin).unwrap();

        let admins = directory.admins().unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].id, ApplicantId(2));
    }
}
