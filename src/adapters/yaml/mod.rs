//! YAML file repositories for focus groups and messages.

pub mod message_repository;
pub mod participant_repository;

pub use message_repository::YamlMessageVariantsRepository;
pub use participant_repository::YamlParticipantRepository;
