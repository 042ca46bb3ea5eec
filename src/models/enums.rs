use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Patient => "patient",
    Doctor => "doctor",
});

str_enum!(FormType {
    HealthProfile => "health_profile",
    Symptoms => "symptoms",
    Vitals => "vitals",
    Medications => "medications",
    FamilyHistory => "family_history",
});

str_enum!(FormStatus {
    Pending => "pending",
    Reviewed => "reviewed",
    Approved => "approved",
});

str_enum!(PrescriptionStatus {
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn role_round_trips() {
        assert_eq!(Role::from_str("patient").unwrap(), Role::Patient);
        assert_eq!(Role::from_str("doctor").unwrap().as_str(), "doctor");
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(Role::from_str("admin").is_err());
        assert!(Role::from_str("Patient").is_err());
    }

    #[test]
    fn form_type_covers_all_catalog_values() {
        for s in ["health_profile", "symptoms", "vitals", "medications", "family_history"] {
            assert_eq!(FormType::from_str(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&FormStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let json = serde_json::to_string(&PrescriptionStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }

    #[test]
    fn serde_and_from_str_agree() {
        let role: Role = serde_json::from_str("\"doctor\"").unwrap();
        assert_eq!(role, Role::from_str("doctor").unwrap());
    }
}
