use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[validate(length(min = 1))]
    pub nickname: String,
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub household_size: HouseholdSize,
    /// One of the named zones known to the geocoder.
    pub neighborhood: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "20대")]
    Twenties,
    #[serde(rename = "30대")]
    Thirties,
    #[serde(rename = "40대 이상")]
    FortiesPlus,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 3] = [Self::Twenties, Self::Thirties, Self::FortiesPlus];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Twenties => "20대",
            Self::Thirties => "30대",
            Self::FortiesPlus => "40대 이상",
        }
    }

    pub fn from_age(age: u32) -> Self {
        match age {
            0..=29 => Self::Twenties,
            30..=39 => Self::Thirties,
            _ => Self::FortiesPlus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Self::Male, Self::Female];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HouseholdSize {
    #[serde(rename = "1인 가구")]
    Single,
    #[serde(rename = "2인 가구")]
    Couple,
    #[serde(rename = "3인 이상 가구")]
    ThreePlus,
}

impl HouseholdSize {
    pub const ALL: [HouseholdSize; 3] = [Self::Single, Self::Couple, Self::ThreePlus];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "1인 가구",
            Self::Couple => "2인 가구",
            Self::ThreePlus => "3인 이상 가구",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_serialized_form() {
        for group in AgeGroup::ALL {
            let json = serde_json::to_string(&group).unwrap();
            assert_eq!(json, format!("\"{}\"", group.label()));
        }
        for size in HouseholdSize::ALL {
            let json = serde_json::to_string(&size).unwrap();
            assert_eq!(json, format!("\"{}\"", size.label()));
        }
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
    }

    #[test]
    fn age_brackets() {
        assert_eq!(AgeGroup::from_age(20), AgeGroup::Twenties);
        assert_eq!(AgeGroup::from_age(30), AgeGroup::Thirties);
        assert_eq!(AgeGroup::from_age(39), AgeGroup::Thirties);
        assert_eq!(AgeGroup::from_age(55), AgeGroup::FortiesPlus);
    }

    #[test]
    fn empty_nickname_is_rejected() {
        let user = User {
            id: Uuid::from_u128(1),
            name: "김민준".into(),
            nickname: String::new(),
            age_group: AgeGroup::Twenties,
            gender: Gender::Male,
            household_size: HouseholdSize::Single,
            neighborhood: "중구 (명동)".into(),
        };
        assert!(user.validate().is_err());
    }
}
