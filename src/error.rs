//! Error types for the Razblok landing backend.

use std::fmt;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Full-name validation failures, in the order the rules are checked.
///
/// The `Display` text is the message shown under the name field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Введите ФИО на русском языке")]
    InvalidScript,

    #[error("Введите свое полное ФИО")]
    TooFewWords,

    #[error("Каждая часть ФИО должна содержать минимум 2 буквы")]
    WordTooShort,

    #[error("{shape}")]
    ComponentTooShort { shape: NameShape },
}

/// How many parts the rejected name had when a component was too short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameShape {
    /// Surname and given name only.
    TwoPart,
    /// Surname, given name, patronymic (and possibly more).
    ThreePart,
}

impl fmt::Display for NameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoPart => {
                write!(f, "Введите корректные Фамилию и Имя (минимум 3 буквы каждое)")
            }
            Self::ThreePart => {
                write!(f, "Введите корректное ФИО (минимум 3 буквы в каждой части)")
            }
        }
    }
}

/// Lead submission failures.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Lead endpoint request failed: {0}")]
    Transport(String),

    #[error("Lead endpoint answered with status {status}")]
    Rejected { status: u16 },
}

impl SubmissionError {
    /// The blocking alert shown to the visitor, whatever went wrong.
    pub fn user_message(&self) -> &'static str {
        "Ошибка отправки заявки. Попробуйте позже."
    }
}

/// Everything that can stop a lead form from being submitted.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Необходимо согласие на обработку персональных данных")]
    ConsentRequired,

    /// Email or phone left blank.
    #[error("Заполните все поля формы")]
    Incomplete,

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl SubmitError {
    /// Text for the user-facing alert or inline error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Submission(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Testimonial content endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Testimonial endpoint is not configured")]
    NotConfigured,

    #[error("Testimonial request failed: {0}")]
    Transport(String),

    #[error("Testimonial endpoint answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid testimonial payload: {0}")]
    Decode(String),

    #[error("Testimonial {id} not found")]
    NotFound { id: i64 },
}
