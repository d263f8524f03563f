//! Client request id generation.

use uuid::Uuid;

/// Source of unique client request ids.
pub trait IdGenerator: Send + Sync {
    /// A fresh, unique identifier.
    fn generate(&self) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Random (version 4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_generator_is_unique() {
        let first = UuidGenerator.generate();
        let second = UuidGenerator.generate();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn closures_generate_ids() {
        let fixed = || "req-1".to_string();
        assert_eq!(IdGenerator::generate(&fixed), "req-1");
    }
}
