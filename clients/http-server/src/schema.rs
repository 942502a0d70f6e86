use database::database::table::row::{UpdatePersonData, UpdateStatement};
use serde::Deserialize;

use crate::errors::ApiError;

/// Body of `POST /persons`. Unknown fields, including a client supplied `id`, are ignored.
#[derive(Deserialize, Debug)]
pub struct CreatePersonRequest {
    pub name: String,
    pub age: i32,
    pub email: String,
}

impl CreatePersonRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name(&self.name)
    }
}

/// Body of `PUT /persons/{id}`, each field is independently optional
#[derive(Deserialize, Debug, Default)]
pub struct UpdatePersonRequest {
    #[serde(default)]
    pub name: UpdateStatement<String>,
    #[serde(default)]
    pub age: UpdateStatement<i32>,
    #[serde(default)]
    pub email: UpdateStatement<String>,
}

impl UpdatePersonRequest {
    /// Rejects explicit nulls and empty names, omitted fields pass through as `NoChanges`
    pub fn into_update(self) -> Result<UpdatePersonData, ApiError> {
        if let UpdateStatement::Set(name) = &self.name {
            validate_name(name)?;
        }

        let update = UpdatePersonData {
            name: self.name,
            age: self.age,
            email: self.email,
        };

        update
            .check_not_null()
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(update)
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod create {
        use super::*;

        #[test]
        fn ignores_client_id() {
            let request: CreatePersonRequest = serde_json::from_str(
                r#"{"id":"mine","name":"John Doe","age":30,"email":"john@example.com"}"#,
            )
            .unwrap();

            assert_eq!(request.name, "John Doe");
            assert!(request.validate().is_ok());
        }

        #[test]
        fn rejects_empty_name() {
            let request = CreatePersonRequest {
                name: String::new(),
                age: 30,
                email: "john@example.com".to_string(),
            };

            assert!(matches!(request.validate(), Err(ApiError::Validation(_))));
        }

        #[test]
        fn missing_and_mistyped_fields_fail_to_parse() {
            assert!(
                serde_json::from_str::<CreatePersonRequest>(r#"{"name":"John Doe","age":30}"#)
                    .is_err()
            );
            assert!(serde_json::from_str::<CreatePersonRequest>(
                r#"{"name":"John Doe","age":"thirty","email":"john@example.com"}"#
            )
            .is_err());
        }
    }

    mod update {
        use super::*;

        fn parse(body: &str) -> UpdatePersonRequest {
            serde_json::from_str(body).unwrap()
        }

        #[test]
        fn omitted_fields_are_no_changes() {
            let update = parse(r#"{"age":31}"#).into_update().unwrap();

            assert_eq!(update.age, UpdateStatement::Set(31));
            assert_eq!(update.name, UpdateStatement::NoChanges);
            assert_eq!(update.email, UpdateStatement::NoChanges);
        }

        #[test]
        fn empty_body_is_empty_update() {
            assert!(parse("{}").into_update().unwrap().is_empty());
        }

        #[test]
        fn explicit_null_is_rejected() {
            assert!(matches!(
                parse(r#"{"email":null}"#).into_update(),
                Err(ApiError::Validation(_))
            ));
        }

        #[test]
        fn empty_name_is_rejected() {
            assert!(matches!(
                parse(r#"{"name":""}"#).into_update(),
                Err(ApiError::Validation(_))
            ));
        }
    }
}
