use serde::{Deserialize, Serialize};

/// Server-side profile of the signed-in identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Staff,
    Teacher,
    Student,
    #[serde(other)]
    Other,
}

impl UserRecord {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    /// Organization id, ignoring blank values some records carry
    pub fn home_organization_id(&self) -> Option<&str> {
        self.organization_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_organization_id_is_absent() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": "u1",
            "email": "u1@example.com",
            "organization_id": "  ",
            "role": "admin"
        }))
        .unwrap();

        assert_eq!(user.home_organization_id(), None);
        assert!(!user.is_super_admin());
    }

    #[test]
    fn test_super_admin_role() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": "root",
            "email": "root@example.com",
            "role": "super_admin"
        }))
        .unwrap();

        assert!(user.is_super_admin());
        assert_eq!(user.organization_id, None);
    }
}
