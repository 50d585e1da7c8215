//! Request bodies and their validation.
//!
//! Each DTO deserializes with every field optional, then `validate()` turns it
//! into the typed input a service expects. Unknown fields are ignored.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::database::models::{BookmarkPatch, UserPatch};
use crate::error::{ApiError, FieldErrors};
use crate::services::{CreateBookmark, Credentials};

pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, ApiError>;
}

/// Extractor: JSON body of type `D`, already validated into `D::Output`
pub struct Valid<D: Validate>(pub D::Output);

#[async_trait]
impl<S, D> FromRequest<S> for Valid<D>
where
    D: Validate + DeserializeOwned + Send,
    D::Output: Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(dto) = Json::<D>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        dto.validate().map(Valid)
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Expected request with `Content-Type: application/json`")
        }
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ApiError::PayloadTooLarge(other.body_text())
        }
        other => ApiError::invalid_json(other.body_text()),
    }
}

/// Accumulates per-field messages; empty means valid
#[derive(Default)]
struct Checks {
    errors: FieldErrors,
}

impl Checks {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match value.as_deref() {
            None => {
                self.fail(field, format!("{} should not be empty", field));
                None
            }
            Some(v) => self.non_empty(field, v),
        }
    }

    fn non_empty<'a>(&mut self, field: &str, value: &'a str) -> Option<&'a str> {
        if value.trim().is_empty() {
            self.fail(field, format!("{} should not be empty", field));
            None
        } else {
            Some(value)
        }
    }

    fn email(&mut self, field: &str, value: &str) {
        if let Err(msg) = validate_email_format(value) {
            self.fail(field, msg);
        }
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Validation failed", Some(self.errors)))
        }
    }
}

/// Basic `local@domain.tld` shape check
pub fn validate_email_format(email: &str) -> Result<(), String> {
    let invalid = || "email must be an email".to_string();

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct AuthDto {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for AuthDto {
    type Output = Credentials;

    fn validate(self) -> Result<Credentials, ApiError> {
        let mut checks = Checks::default();
        if let Some(email) = checks.required("email", &self.email) {
            checks.email("email", email);
        }
        checks.required("password", &self.password);
        checks.finish()?;

        Ok(Credentials {
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditUserDto {
    pub email: Option<String>,
    #[serde(rename = "firstName", alias = "firstname")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", alias = "lastname")]
    pub last_name: Option<String>,
}

impl Validate for EditUserDto {
    type Output = UserPatch;

    fn validate(self) -> Result<UserPatch, ApiError> {
        let mut checks = Checks::default();
        if let Some(email) = self.email.as_deref() {
            checks.email("email", email);
        }
        checks.finish()?;

        Ok(UserPatch {
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBookmarkDto {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

impl Validate for CreateBookmarkDto {
    type Output = CreateBookmark;

    fn validate(self) -> Result<CreateBookmark, ApiError> {
        let mut checks = Checks::default();
        checks.required("title", &self.title);
        checks.required("link", &self.link);
        checks.finish()?;

        Ok(CreateBookmark {
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            description: self.description,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditBookmarkDto {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

impl Validate for EditBookmarkDto {
    type Output = BookmarkPatch;

    fn validate(self) -> Result<BookmarkPatch, ApiError> {
        let mut checks = Checks::default();
        if let Some(title) = self.title.as_deref() {
            checks.non_empty("title", title);
        }
        if let Some(link) = self.link.as_deref() {
            checks.non_empty("link", link);
        }
        checks.finish()?;

        Ok(BookmarkPatch {
            title: self.title,
            link: self.link,
            description: self.description,
        })
    }
}

/// Path ids must be positive integers
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request(format!(
            "Validation failed (numeric string is expected): '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auth(body: serde_json::Value) -> Result<Credentials, ApiError> {
        serde_json::from_value::<AuthDto>(body).unwrap().validate()
    }

    fn field_errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::ValidationError { field_errors, .. } => field_errors.unwrap_or_default(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn auth_requires_email_and_password() {
        let errors = field_errors(auth(json!({})).unwrap_err());
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));

        let errors = field_errors(auth(json!({ "password": "1234" })).unwrap_err());
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["email"]);

        let errors = field_errors(auth(json!({ "email": "user1@gmail.com" })).unwrap_err());
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["password"]);
    }

    #[test]
    fn auth_rejects_malformed_email() {
        let errors = field_errors(auth(json!({ "email": "not-an-email", "password": "1234" })).unwrap_err());
        assert_eq!(errors["email"], "email must be an email");
    }

    #[test]
    fn auth_ignores_unknown_fields() {
        let creds = auth(json!({ "email": "a@x.com", "password": "1234", "role": "admin" })).unwrap();
        assert_eq!(creds.email, "a@x.com");
        assert_eq!(creds.password, "1234");
    }

    #[test]
    fn email_format() {
        assert!(validate_email_format("user1@gmail.com").is_ok());
        assert!(validate_email_format("a.b+c@sub.example.org").is_ok());
        for bad in ["", "@x.com", "a@", "a@x", "a@@x.com", "a b@x.com", "a@x..com"] {
            assert!(validate_email_format(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn edit_user_accepts_lowercase_aliases() {
        let dto: EditUserDto =
            serde_json::from_value(json!({ "email": "u@x.com", "firstname": "userOne" })).unwrap();
        let patch = dto.validate().unwrap();
        assert_eq!(patch.first_name.as_deref(), Some("userOne"));
        assert_eq!(patch.email.as_deref(), Some("u@x.com"));
        assert!(patch.last_name.is_none());

        let dto: EditUserDto = serde_json::from_value(json!({ "lastName": "One" })).unwrap();
        assert_eq!(dto.validate().unwrap().last_name.as_deref(), Some("One"));
    }

    #[test]
    fn create_bookmark_requires_title_and_link() {
        let dto: CreateBookmarkDto = serde_json::from_value(json!({ "description": "d" })).unwrap();
        let errors = field_errors(dto.validate().unwrap_err());
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("link"));

        let dto: CreateBookmarkDto =
            serde_json::from_value(json!({ "title": "First Bookmark", "link": "Link1" })).unwrap();
        let input = dto.validate().unwrap();
        assert_eq!(input.title, "First Bookmark");
        assert!(input.description.is_none());
    }

    #[test]
    fn edit_bookmark_fields_are_optional_but_not_blank() {
        let dto: EditBookmarkDto = serde_json::from_value(json!({})).unwrap();
        let patch = dto.validate().unwrap();
        assert!(patch.title.is_none() && patch.link.is_none() && patch.description.is_none());

        let dto: EditBookmarkDto = serde_json::from_value(json!({ "title": "  " })).unwrap();
        assert!(field_errors(dto.validate().unwrap_err()).contains_key("title"));
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("10").unwrap(), 10);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
        assert!(parse_id("abc").is_err());
    }
}
