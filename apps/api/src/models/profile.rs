use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single user profile kept per deployment.
///
/// Known form fields are typed; anything else the client submits is preserved
/// in `extra` so a save/load round trip never drops a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub current_title: String,
    #[serde(default)]
    pub linkedin: String,
    /// Comma-separated skill list, as typed into the form.
    #[serde(default)]
    pub skills: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub education: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl UserProfile {
    /// True when nothing has been filled in yet.
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.location,
            &self.current_title,
            &self.linkedin,
            &self.skills,
            &self.experience,
            &self.education,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
            && self.extra.values().all(|v| v.trim().is_empty())
    }

    /// Skills split on commas, trimmed, empties dropped.
    pub fn skill_list(&self) -> Vec<&str> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Name and email are the minimum the generators need.
    pub fn validate(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required profile fields: {}", missing.join(", ")))
        }
    }

    /// `email | phone | location`, skipping blanks.
    pub fn contact_line(&self) -> String {
        [&self.email, &self.phone, &self.location]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> UserProfile {
        UserProfile {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            skills: "Python, SQL, , Tableau ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_profile_is_empty() {
        assert!(UserProfile::default().is_empty());
        assert!(!jane().is_empty());
    }

    #[test]
    fn test_skill_list_trims_and_drops_blanks() {
        assert_eq!(jane().skill_list(), vec!["Python", "SQL", "Tableau"]);
    }

    #[test]
    fn test_validate_requires_name_and_email() {
        assert!(jane().validate().is_ok());

        let err = UserProfile::default().validate().unwrap_err();
        assert!(err.contains("name"));
        assert!(err.contains("email"));
    }

    #[test]
    fn test_unknown_fields_survive_serde() {
        let json = r#"{"name": "Jane Doe", "github": "janedoe"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.extra.get("github").map(String::as_str), Some("janedoe"));

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["github"], "janedoe");
        assert!(back.get("updated_at").is_none());
    }

    #[test]
    fn test_contact_line_skips_blank_parts() {
        let mut profile = jane();
        profile.location = "Austin, TX".to_string();
        assert_eq!(profile.contact_line(), "jane@example.com | Austin, TX");
    }
}
