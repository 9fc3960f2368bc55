//! Shared validation helpers for inbound HTTP adapters.

use actix_web::{HttpRequest, error::JsonPayloadError};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    AccountId, BookingId, CredentialValidationError, Error, PaymentStatus,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidPaymentStatus,
    EmptyField,
    InvalidEmail,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidPaymentStatus => "invalid_payment_status",
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::MalformedBody => "malformed_body",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} is required")).with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a booking id path segment.
pub(crate) fn parse_booking_id(value: &str) -> Result<BookingId, Error> {
    parse_uuid(value, FieldName::new("id")).map(BookingId::from_uuid)
}

/// Parse an account id from a path segment or body field.
pub(crate) fn parse_account_id(value: &str, field: FieldName) -> Result<AccountId, Error> {
    parse_uuid(value, field).map(AccountId::from_uuid)
}

pub(crate) fn parse_payment_status(value: &str) -> Result<PaymentStatus, Error> {
    value.trim().parse::<PaymentStatus>().map_err(|_| {
        ValidationError::new("paymentStatus", "paymentStatus must be pending, paid or failed")
            .with_value(ErrorCode::InvalidPaymentStatus, value)
    })
}

/// Map credential validation failures to field-scoped request errors.
pub(crate) fn credential_error(err: CredentialValidationError) -> Error {
    let code = match err {
        CredentialValidationError::EmptyUsername | CredentialValidationError::EmptyPassword => {
            ErrorCode::EmptyField
        }
        CredentialValidationError::InvalidEmail => ErrorCode::InvalidEmail,
    };
    ValidationError::new(err.field(), err.to_string()).with_code(code)
}

/// `JsonConfig` error handler so malformed bodies use the shared error
/// envelope instead of Actix's plain-text default.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "request body must be application/json".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid JSON body: {inner}"),
        other => format!("invalid request body: {other}"),
    };
    Error::invalid_request(message)
        .with_details(json!({ "code": ErrorCode::MalformedBody.as_str() }))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    #[rstest]
    fn missing_field_names_the_field() {
        let err = missing_field_error(FieldName::new("status"));
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(err.message(), "status is required");
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "status", "code": "missing_field" }))
        );
    }

    #[rstest]
    fn booking_id_must_be_a_uuid() {
        let err = parse_booking_id("not-a-uuid").expect_err("rejected");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "id");
        assert_eq!(details["code"], "invalid_uuid");
        assert_eq!(details["value"], "not-a-uuid");
    }

    #[rstest]
    fn booking_id_accepts_padded_uuid() {
        let id = parse_booking_id(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ").expect("parsed");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    #[case("paid", PaymentStatus::Paid)]
    #[case(" failed ", PaymentStatus::Failed)]
    fn payment_status_parses(#[case] raw: &str, #[case] expected: PaymentStatus) {
        assert_eq!(parse_payment_status(raw).expect("parsed"), expected);
    }

    #[rstest]
    fn unknown_payment_status_is_rejected() {
        let err = parse_payment_status("refunded").expect_err("rejected");
        assert_eq!(
            err.details().and_then(|d| d.get("code")),
            Some(&json!("invalid_payment_status"))
        );
    }

    #[rstest]
    #[case(CredentialValidationError::EmptyUsername, "username", "empty_field")]
    #[case(CredentialValidationError::EmptyPassword, "password", "empty_field")]
    #[case(CredentialValidationError::InvalidEmail, "email", "invalid_email")]
    fn credential_errors_carry_field(
        #[case] err: CredentialValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mapped = credential_error(err);
        assert_eq!(mapped.details(), Some(&json!({ "field": field, "code": code })));
    }
}
