use serde::{Deserialize, Serialize};

/// Role of the user requesting a dashboard cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Pharmacy manager: the only role that sees OKR progress.
    Manager,
    #[default]
    Staff,
}

impl UserRole {
    pub fn is_privileged(self) -> bool {
        matches!(self, UserRole::Manager)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Manager => "manager",
            UserRole::Staff => "staff",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manager" | "admin" => Ok(UserRole::Manager),
            "staff" | "pharmacist" | "cashier" => Ok(UserRole::Staff),
            other => Err(format!("Unknown user role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Manager".parse::<UserRole>(), Ok(UserRole::Manager));
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Manager));
        assert_eq!(" pharmacist ".parse::<UserRole>(), Ok(UserRole::Staff));
        assert!("guest".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_only_manager_is_privileged() {
        assert!(UserRole::Manager.is_privileged());
        assert!(!UserRole::Staff.is_privileged());
        assert_eq!(UserRole::default(), UserRole::Staff);
    }
}
