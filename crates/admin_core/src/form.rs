//! Form working copy: the editable projection of a remote user plus
//! per-field dirty tracking against a rebaseable snapshot.

use std::collections::BTreeMap;

use shared::domain::RemoteUser;
use validator::Validate;

/// The editable subset of a remote user record. The validation schema is
/// declared here, field by field, and enforced at submit time only.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct UserFormValues {
    #[validate(length(min = 1, message = "This field is required."))]
    pub display_name: String,
    #[validate(length(min = 1, message = "This field is required."))]
    pub avatar_url: String,
    #[validate(
        length(min = 1, message = "This field is required."),
        email(message = "Invalid email address")
    )]
    pub email: String,
    pub email_verified: bool,
    pub phone_number: Option<String>,
    pub phone_number_verified: bool,
    pub locale: String,
    pub default_role: String,
    pub roles: Vec<String>,
}

impl UserFormValues {
    pub fn seeded_from(user: &RemoteUser) -> Self {
        Self {
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
            phone_number: user.phone_number.clone(),
            phone_number_verified: user.phone_number_verified,
            locale: user.locale.clone(),
            default_role: user.default_role.clone(),
            roles: user.granted_role_names(),
        }
    }

    fn field_matches(&self, other: &Self, field: FormField) -> bool {
        match field {
            FormField::DisplayName => self.display_name == other.display_name,
            FormField::AvatarUrl => self.avatar_url == other.avatar_url,
            FormField::Email => self.email == other.email,
            FormField::EmailVerified => self.email_verified == other.email_verified,
            FormField::PhoneNumber => self.phone_number == other.phone_number,
            FormField::PhoneNumberVerified => {
                self.phone_number_verified == other.phone_number_verified
            }
            FormField::Locale => self.locale == other.locale,
            FormField::DefaultRole => self.default_role == other.default_role,
            // Role grants are a set; checkbox order must not register as an edit.
            FormField::Roles => {
                let mut lhs = self.roles.clone();
                let mut rhs = other.roles.clone();
                lhs.sort();
                rhs.sort();
                lhs == rhs
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    DisplayName,
    AvatarUrl,
    Email,
    EmailVerified,
    PhoneNumber,
    PhoneNumberVerified,
    Locale,
    DefaultRole,
    Roles,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        FormField::DisplayName,
        FormField::AvatarUrl,
        FormField::Email,
        FormField::EmailVerified,
        FormField::PhoneNumber,
        FormField::PhoneNumberVerified,
        FormField::Locale,
        FormField::DefaultRole,
        FormField::Roles,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormField::DisplayName => "displayName",
            FormField::AvatarUrl => "avatarURL",
            FormField::Email => "email",
            FormField::EmailVerified => "emailVerified",
            FormField::PhoneNumber => "phoneNumber",
            FormField::PhoneNumberVerified => "phoneNumberVerified",
            FormField::Locale => "locale",
            FormField::DefaultRole => "defaultRole",
            FormField::Roles => "roles",
        }
    }

    /// Resolves the schema's struct-field key back to the form field.
    pub fn from_schema_key(key: &str) -> Option<Self> {
        match key {
            "display_name" => Some(FormField::DisplayName),
            "avatar_url" => Some(FormField::AvatarUrl),
            "email" => Some(FormField::Email),
            "email_verified" => Some(FormField::EmailVerified),
            "phone_number" => Some(FormField::PhoneNumber),
            "phone_number_verified" => Some(FormField::PhoneNumberVerified),
            "locale" => Some(FormField::Locale),
            "default_role" => Some(FormField::DefaultRole),
            "roles" => Some(FormField::Roles),
            _ => None,
        }
    }
}

/// One field edit, typed per field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    DisplayName(String),
    AvatarUrl(String),
    Email(String),
    EmailVerified(bool),
    PhoneNumber(Option<String>),
    PhoneNumberVerified(bool),
    Locale(String),
    DefaultRole(String),
    Roles(Vec<String>),
}

impl FieldEdit {
    pub fn field(&self) -> FormField {
        match self {
            FieldEdit::DisplayName(_) => FormField::DisplayName,
            FieldEdit::AvatarUrl(_) => FormField::AvatarUrl,
            FieldEdit::Email(_) => FormField::Email,
            FieldEdit::EmailVerified(_) => FormField::EmailVerified,
            FieldEdit::PhoneNumber(_) => FormField::PhoneNumber,
            FieldEdit::PhoneNumberVerified(_) => FormField::PhoneNumberVerified,
            FieldEdit::Locale(_) => FormField::Locale,
            FieldEdit::DefaultRole(_) => FormField::DefaultRole,
            FieldEdit::Roles(_) => FormField::Roles,
        }
    }
}

pub type FieldErrors = BTreeMap<FormField, String>;

/// Working copy of one edit session: current values, the dirty-comparison
/// baseline, and the field errors recorded by the last failed submit.
#[derive(Debug, Clone)]
pub struct FormWorkingCopy {
    baseline: UserFormValues,
    current: UserFormValues,
    errors: FieldErrors,
}

impl FormWorkingCopy {
    pub fn seeded_from(user: &RemoteUser) -> Self {
        let values = UserFormValues::seeded_from(user);
        Self {
            baseline: values.clone(),
            current: values,
            errors: FieldErrors::new(),
        }
    }

    pub fn values(&self) -> &UserFormValues {
        &self.current
    }

    pub fn baseline(&self) -> &UserFormValues {
        &self.baseline
    }

    /// Applies one edit: sets the field, clears its recorded error, and
    /// returns `Some(new_aggregate)` when the aggregate dirty flag flipped.
    pub fn apply(&mut self, edit: FieldEdit) -> Option<bool> {
        let was_dirty = self.is_dirty();
        self.errors.remove(&edit.field());
        match edit {
            FieldEdit::DisplayName(value) => self.current.display_name = value,
            FieldEdit::AvatarUrl(value) => self.current.avatar_url = value,
            FieldEdit::Email(value) => self.current.email = value,
            FieldEdit::EmailVerified(value) => self.current.email_verified = value,
            FieldEdit::PhoneNumber(value) => self.current.phone_number = value,
            FieldEdit::PhoneNumberVerified(value) => self.current.phone_number_verified = value,
            FieldEdit::Locale(value) => self.current.locale = value,
            FieldEdit::DefaultRole(value) => self.current.default_role = value,
            FieldEdit::Roles(value) => self.current.roles = value,
        }
        let now_dirty = self.is_dirty();
        (was_dirty != now_dirty).then_some(now_dirty)
    }

    pub fn is_field_dirty(&self, field: FormField) -> bool {
        !self.current.field_matches(&self.baseline, field)
    }

    pub fn dirty_fields(&self) -> Vec<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|field| self.is_field_dirty(*field))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        FormField::ALL.iter().any(|field| self.is_field_dirty(*field))
    }

    /// Makes `values` the new dirty-comparison baseline. Called after a
    /// successful save with exactly the submitted values.
    pub fn rebase(&mut self, values: UserFormValues) {
        self.baseline = values.clone();
        self.current = values;
        self.errors.clear();
    }

    pub fn record_errors(&mut self, errors: &FieldErrors) {
        self.errors = errors.clone();
    }

    pub fn field_error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
