use serde::{Deserialize, Serialize};

/// User document in the `Users` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,            // also the public id
    pub name: String,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string, never returned to clients
}

/// Field-level changes for a partial user update. `None` leaves the stored
/// value untouched; serializes straight into a `$set` document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }

    /// In-place counterpart of the `$set` the Mongo store issues.
    #[cfg(test)]
    pub fn apply(self, user: &mut UserDocument) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(hash) = self.password_hash {
            user.password_hash = hash;
        }
    }
}
