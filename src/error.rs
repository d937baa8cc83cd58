use serde_json::Error as SerdeJsonError;
use serde_yaml::Error as SerdeYamlError;
use std::fmt;

#[derive(Debug)]
pub enum ScheduleError {
    InvalidDate {
        context: String,
        value: String,
    },
    MissingField(String),
    DuplicateName(String),
    DependencyLoop(Vec<String>),
    UnknownReference {
        item: String,
        reference: String,
    },
    UnsupportedPeriod(String),
    UnsupportedProgress(String),
    InvalidDocument(SerdeJsonError),
    InvalidYaml(SerdeYamlError),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidDate { context, value } => {
                write!(f, "invalid date '{value}' for {context}")
            }
            ScheduleError::MissingField(field) => write!(f, "missing required field {field}"),
            ScheduleError::DuplicateName(name) => write!(f, "'{name}' is duplicated"),
            ScheduleError::DependencyLoop(names) => {
                write!(f, "the dependencies are looped: {}", names.join(", "))
            }
            ScheduleError::UnknownReference { item, reference } => write!(
                f,
                "'{item}' refers to '{reference}', which does not exist"
            ),
            ScheduleError::UnsupportedPeriod(value) => {
                write!(f, "unsupported period: {value}")
            }
            ScheduleError::UnsupportedProgress(value) => {
                write!(f, "unsupported progress: {value}")
            }
            ScheduleError::InvalidDocument(err) => write!(f, "invalid document: {err}"),
            ScheduleError::InvalidYaml(err) => write!(f, "invalid document: {err}"),
        }
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScheduleError::InvalidDocument(err) => Some(err),
            ScheduleError::InvalidYaml(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SerdeJsonError> for ScheduleError {
    fn from(value: SerdeJsonError) -> Self {
        Self::InvalidDocument(value)
    }
}

impl From<SerdeYamlError> for ScheduleError {
    fn from(value: SerdeYamlError) -> Self {
        Self::InvalidYaml(value)
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
