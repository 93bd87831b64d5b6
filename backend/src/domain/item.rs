//! Marketplace item model.
//!
//! Items are created by seeding and change hands through purchases and
//! sales. An item with no owner is listed for sale.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::money::Price;
use super::user::UserId;

/// Maximum length of an item name.
pub const ITEM_NAME_MAX: usize = 30;
/// Exact length of an item barcode.
pub const BARCODE_LEN: usize = 12;
/// Maximum length of an item description.
pub const DESCRIPTION_MAX: usize = 1024;

/// Validation errors returned by the item value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemValidationError {
    #[error("item id must be a valid UUID")]
    InvalidId,
    #[error("item name must not be empty")]
    EmptyName,
    #[error("item name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("barcode must be exactly {len} characters")]
    BarcodeLength { len: usize },
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Parse an identifier submitted through a form field.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ItemValidationError> {
        Uuid::parse_str(raw.as_ref().trim())
            .map(Self)
            .map_err(|_| ItemValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_value {
    ($name:ident) => {
        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ItemValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

/// Unique display name of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemName(String);

impl ItemName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ItemValidationError> {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if name.chars().count() > ITEM_NAME_MAX {
            return Err(ItemValidationError::NameTooLong { max: ITEM_NAME_MAX });
        }
        Ok(Self(name.to_owned()))
    }
}

string_value!(ItemName);

/// Unique 12-character SKU.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Barcode(String);

impl Barcode {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ItemValidationError> {
        let barcode = raw.as_ref().trim();
        if barcode.chars().count() != BARCODE_LEN {
            return Err(ItemValidationError::BarcodeLength { len: BARCODE_LEN });
        }
        Ok(Self(barcode.to_owned()))
    }
}

string_value!(Barcode);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ItemValidationError> {
        let description = raw.as_ref().trim();
        if description.is_empty() {
            return Err(ItemValidationError::EmptyDescription);
        }
        if description.chars().count() > DESCRIPTION_MAX {
            return Err(ItemValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self(description.to_owned()))
    }
}

string_value!(Description);

/// Item details supplied when stocking the market.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewItem {
    pub name: ItemName,
    pub price: Price,
    pub barcode: Barcode,
    pub description: Description,
}

/// A persisted marketplace item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub name: ItemName,
    pub price: Price,
    pub barcode: Barcode,
    pub description: Description,
    pub owner: Option<UserId>,
}

impl Item {
    #[must_use]
    pub fn is_for_sale(&self) -> bool {
        self.owner.is_none()
    }

    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner.as_ref() == Some(user)
    }
}
