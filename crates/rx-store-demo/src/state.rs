use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// No filter
    #[default]
    None,
    Female,
    Male,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub gender: Gender,
}

impl User {
    pub fn new(name: &str, email: &str, gender: Gender) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            gender,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersState {
    pub loading: bool,
    pub users: Vec<User>,
    pub gender_filter: Gender,
}

impl Default for UsersState {
    fn default() -> Self {
        Self {
            loading: true,
            users: Vec::new(),
            gender_filter: Gender::None,
        }
    }
}

impl UsersState {
    /// Users passing the current gender filter
    pub fn visible_users(&self) -> impl Iterator<Item = &User> {
        let filter = self.gender_filter;
        self.users
            .iter()
            .filter(move |user| filter == Gender::None || user.gender == filter)
    }
}
