//! Service result protocol: rejected input vs. attempted operation.

/// Validation errors in the order they were found. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

impl From<Vec<String>> for ValidationOutcome {
    fn from(errors: Vec<String>) -> Self {
        Self { errors }
    }
}

/// Result of a persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome<T> {
    Created(T),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOutcome<T> {
    Validation(ValidationOutcome),
    Entity(EntityOutcome<T>),
}

impl<T> ServiceOutcome<T> {
    pub fn created(entity: T) -> Self {
        Self::Entity(EntityOutcome::Created(entity))
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Entity(EntityOutcome::Failed(error.into()))
    }
}

#[cfg(test)]
impl<T> ServiceOutcome<T> {
    pub fn has_errors(&self) -> bool {
        match self {
            Self::Validation(v) => v.has_errors(),
            Self::Entity(EntityOutcome::Failed(_)) => true,
            Self::Entity(EntityOutcome::Created(_)) => false,
        }
    }

    pub fn into_entity(self) -> Option<T> {
        match self {
            Self::Entity(EntityOutcome::Created(entity)) => Some(entity),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_validation_is_valid() {
        let v = ValidationOutcome::default();
        assert!(!v.has_errors());
        assert!(v.errors().is_empty());
    }

    #[test]
    fn validation_keeps_insertion_order() {
        let mut v = ValidationOutcome::default();
        v.push("first");
        v.push(String::from("second"));
        assert_eq!(v.into_errors(), vec!["first", "second"]);
    }

    #[test]
    fn entity_outcomes_are_exclusive() {
        let ok: ServiceOutcome<u8> = ServiceOutcome::created(1);
        assert!(!ok.has_errors());
        assert_eq!(ok.into_entity(), Some(1));

        let failed: ServiceOutcome<u8> = ServiceOutcome::failed("Failed creating movie");
        assert!(failed.has_errors());
        assert_eq!(failed.into_entity(), None);

        let invalid: ServiceOutcome<u8> =
            ServiceOutcome::Validation(vec!["dup".to_string()].into());
        assert!(invalid.has_errors());
        assert_eq!(invalid.into_entity(), None);
    }
}
