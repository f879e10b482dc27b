use serde::{Deserialize, Serialize};

use crate::pii::Masked;

/// Contact details entered on the booking and lesson forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

impl CustomerContact {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: Masked(email.into().trim().to_lowercase()),
            phone: Masked(phone.into().trim().to_string()),
        }
    }

    pub fn email(&self) -> &str {
        &self.email.0
    }

    pub fn phone(&self) -> &str {
        &self.phone.0
    }

    /// Case-insensitive match against name, email or phone, used by admin search.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.email().contains(&needle)
            || self.phone().contains(&needle)
    }
}
