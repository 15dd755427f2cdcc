use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },
    #[error("unknown country `{0}`")]
    UnknownCountry(String),
}

impl DomainError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput { field: field.into(), reason: reason.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("configuration error: {message}")]
    Misconfigured { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The calculation inputs are not valid. Check the values and try again."
            }
            Self::Misconfigured { .. } => {
                "The calculator configuration is invalid. Check landed.toml and LANDED_* variables."
            }
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Misconfigured { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Configuration(message) => {
                Self::Misconfigured { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn invalid_input_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::invalid_input(
            "margin",
            "cpa rate plus margin must stay below 100%",
        ))
        .into_interface("calc-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ref message,
            } if correlation_id == "calc-1" && message.contains("margin")
        ));
    }

    #[test]
    fn bad_request_has_user_safe_message() {
        let interface = ApplicationError::from(DomainError::UnknownCountry("ZZ".to_owned()))
            .into_interface("calc-2");

        assert_eq!(
            interface.user_message(),
            "The calculation inputs are not valid. Check the values and try again."
        );
    }

    #[test]
    fn configuration_error_maps_to_misconfigured() {
        let interface = ApplicationError::Configuration("cpa_rate out of range".to_owned())
            .into_interface("calc-3");

        assert!(matches!(
            interface,
            InterfaceError::Misconfigured { ref correlation_id, ref message }
                if correlation_id == "calc-3" && message == "cpa_rate out of range"
        ));
        assert_eq!(interface.to_string(), "configuration error: cpa_rate out of range");
        assert!(interface.user_message().contains("landed.toml"));
    }
}
