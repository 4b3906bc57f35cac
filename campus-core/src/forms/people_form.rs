use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{email, phone, required, ValidationErrors};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TrainerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StudentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub schedule_ids: Vec<String>,
}

/// Validated contact details shared by trainers and students, plus the
/// role specific list (expertise or enrolled schedule ids).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub tags: Vec<String>,
}

fn person(
    name: &str,
    address: &str,
    number: Option<String>,
    tags: Vec<String>,
) -> Result<PersonDraft, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let name = required(&mut errors, "name", name);
    let address = email(&mut errors, "email", address);
    let number = phone(&mut errors, "phone", number);

    let mut unique = Vec::with_capacity(tags.len());
    for tag in tags.into_iter().map(|t| t.trim().to_string()) {
        if !tag.is_empty() && !unique.contains(&tag) {
            unique.push(tag);
        }
    }

    errors.into_result(PersonDraft {
        name,
        email: address.to_ascii_lowercase(),
        phone: number,
        tags: unique,
    })
}

impl TrainerForm {
    pub fn validate(self) -> Result<PersonDraft, ValidationErrors> {
        person(&self.name, &self.email, self.phone, self.expertise)
    }
}

impl StudentForm {
    pub fn validate(self) -> Result<PersonDraft, ValidationErrors> {
        person(&self.name, &self.email, self.phone, self.schedule_ids)
    }
}
