//! Rule sets for the sign-in, sign-up, profile and avatar forms

use super::{Rule, Schema};

/// Minimum password length accepted by the backend
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field names shared by screens, schemas and request builders
pub mod fields {
    /// Display name
    pub const NAME: &str = "name";
    /// Login email
    pub const EMAIL: &str = "email";
    /// Password (new password on the profile screen)
    pub const PASSWORD: &str = "password";
    /// Password confirmation
    pub const PASSWORD_CONFIRM: &str = "password_confirm";
    /// Current password, required by the backend to change it
    pub const OLD_PASSWORD: &str = "old_password";
    /// Local path of the avatar image to upload
    pub const AVATAR_PATH: &str = "avatar_path";
}

const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters.";
const CONFIRMATION_MISMATCH: &str = "Password confirmation does not match.";

/// `email` + `password`
pub fn sign_in() -> Schema {
    Schema::new()
        .field(
            fields::EMAIL,
            vec![
                Rule::Required("Enter your email."),
                Rule::Email("Invalid email."),
            ],
        )
        .field(
            fields::PASSWORD,
            vec![
                Rule::Required("Enter your password."),
                Rule::MinLength {
                    min: MIN_PASSWORD_LEN,
                    message: PASSWORD_TOO_SHORT,
                },
            ],
        )
}

/// `name` + `email` + `password` + confirmation
pub fn sign_up() -> Schema {
    Schema::new()
        .field(fields::NAME, vec![Rule::Required("Enter your name.")])
        .field(
            fields::EMAIL,
            vec![
                Rule::Required("Enter your email."),
                Rule::Email("Invalid email."),
            ],
        )
        .field(
            fields::PASSWORD,
            vec![
                Rule::Required("Enter a password."),
                Rule::MinLength {
                    min: MIN_PASSWORD_LEN,
                    message: PASSWORD_TOO_SHORT,
                },
            ],
        )
        .field(
            fields::PASSWORD_CONFIRM,
            vec![
                Rule::Required("Confirm your password."),
                Rule::EqualsField {
                    field: fields::PASSWORD,
                    message: CONFIRMATION_MISMATCH,
                },
            ],
        )
}

/// Profile edit: name is mandatory, the password block is all-or-nothing
pub fn profile() -> Schema {
    Schema::new()
        .field(fields::NAME, vec![Rule::Required("Enter your name.")])
        .field(fields::EMAIL, Vec::new())
        .field(
            fields::OLD_PASSWORD,
            vec![Rule::RequiredIf {
                field: fields::PASSWORD,
                message: "Enter your current password.",
            }],
        )
        .field(
            fields::PASSWORD,
            vec![Rule::MinLength {
                min: MIN_PASSWORD_LEN,
                message: PASSWORD_TOO_SHORT,
            }],
        )
        .field(
            fields::PASSWORD_CONFIRM,
            vec![
                Rule::RequiredIf {
                    field: fields::PASSWORD,
                    message: "Confirm the new password.",
                },
                Rule::EqualsField {
                    field: fields::PASSWORD,
                    message: CONFIRMATION_MISMATCH,
                },
            ],
        )
}

/// Single path field for the avatar picker
pub fn avatar() -> Schema {
    Schema::new().field(
        fields::AVATAR_PATH,
        vec![Rule::Required("Enter the path of an image file.")],
    )
}
