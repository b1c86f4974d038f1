use chrono::{DateTime, Utc};
use hemline_core::{AddressId, UserId};
use serde::{Deserialize, Serialize};

use super::order::ShippingAddress;

/// A saved delivery address. At most one per user is the default.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub kind: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub house: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            email: address.email.clone(),
            phone: address.phone.clone(),
            house: address.house.clone(),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            country: address.country.clone(),
        }
    }
}

/// Request body for creating or replacing an address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInput {
    #[serde(default = "default_kind", alias = "type")]
    pub kind: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub house: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

fn default_kind() -> String {
    "home".to_owned()
}

fn default_country() -> String {
    "IN".to_owned()
}

impl AddressInput {
    /// Name of the first blank required field, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("phone", &self.phone),
            ("house", &self.house),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_on_deserialize() {
        let input: AddressInput = serde_json::from_str(
            r#"{
                "name": "Jo Shah",
                "phone": "9876543210",
                "house": "12B",
                "street": "MG Road",
                "city": "Pune",
                "state": "MH",
                "zip_code": "411001"
            }"#,
        )
        .unwrap();
        assert_eq!(input.kind, "home");
        assert_eq!(input.country, "IN");
        assert!(!input.is_default);
        assert_eq!(input.missing_field(), None);
    }

    #[test]
    fn test_missing_field_reports_first_blank() {
        let input: AddressInput = serde_json::from_str(
            r#"{
                "name": "Jo Shah",
                "phone": "  ",
                "house": "12B",
                "street": "MG Road",
                "city": "Pune",
                "state": "MH",
                "zip_code": "411001"
            }"#,
        )
        .unwrap();
        assert_eq!(input.missing_field(), Some("phone"));
    }

    #[test]
    fn test_shipping_snapshot_copies_contact_fields() {
        let address = Address {
            id: AddressId::new(3),
            user_id: UserId::new(1),
            kind: "work".to_owned(),
            name: "Jo Shah".to_owned(),
            email: Some("jo@example.com".to_owned()),
            phone: "9876543210".to_owned(),
            house: "12B".to_owned(),
            street: "MG Road".to_owned(),
            city: "Pune".to_owned(),
            state: "MH".to_owned(),
            zip_code: "411001".to_owned(),
            country: "IN".to_owned(),
            is_default: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let snapshot = ShippingAddress::from(&address);
        assert_eq!(snapshot.name, "Jo Shah");
        assert_eq!(snapshot.zip_code, "411001");
        assert_eq!(snapshot.country, "IN");
    }
}
