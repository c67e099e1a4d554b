//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated, non-empty category name.
///
/// Names are trimmed of surrounding whitespace and are unique across all
/// live categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is
    /// empty or contains only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A payment-method category: a named pairing of an external provider with a
/// main image and an icon image.
///
/// Serializes with the wire names the API clients expect (`categoryName`,
/// `providerId`, `mainImage`, `iconImage`, RFC 3339 timestamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The id of the category.
    pub id: CategoryId,

    /// The unique display name.
    #[serde(rename = "categoryName")]
    pub name: CategoryName,

    /// Opaque identifier of the external provider. Not validated beyond
    /// being present.
    pub provider_id: String,

    /// Web-relative path to the stored main image.
    pub main_image: String,

    /// Web-relative path to the stored icon image.
    pub icon_image: String,

    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the category was last modified.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The fields needed to create a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The unique display name.
    pub name: CategoryName,
    /// Opaque identifier of the external provider.
    pub provider_id: String,
    /// Web-relative path to the stored main image.
    pub main_image: String,
    /// Web-relative path to the stored icon image.
    pub icon_image: String,
}

/// A partial update to a category; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdate {
    /// A replacement name.
    pub name: Option<CategoryName>,
    /// A replacement provider identifier.
    pub provider_id: Option<String>,
    /// The path of a newly stored replacement main image.
    pub main_image: Option<String>,
    /// The path of a newly stored replacement icon image.
    pub icon_image: Option<String>,
}


#[cfg(test)]
mod category_serde_tests {
    use time::macros::datetime;

    use crate::category::{Category, CategoryName};

    #[test]
    fn category_serializes_with_wire_names() {
        let category = Category {
            id: 1,
            name: CategoryName::new_unchecked("Bank Transfer"),
            provider_id: "p1".to_owned(),
            main_image: "/uploads/method-icons/main.png".to_owned(),
            icon_image: "/uploads/method-icons/icon.png".to_owned(),
            created_at: datetime!(2025-08-01 12:00:00 UTC),
            updated_at: datetime!(2025-08-02 12:00:00 UTC),
        };

        let json = serde_json::to_value(&category).unwrap();

        assert_eq!(json["categoryName"], "Bank Transfer");
        assert_eq!(json["providerId"], "p1");
        assert_eq!(json["mainImage"], "/uploads/method-icons/main.png");
        assert_eq!(json["iconImage"], "/uploads/method-icons/icon.png");
        assert_eq!(json["createdAt"], "2025-08-01T12:00:00Z");
        assert_eq!(json["updatedAt"], "2025-08-02T12:00:00Z");
    }
}
