//! Integration tests for the YAML focus group and message repositories.

use std::fs;
use std::path::Path;

use grouper::adapters::yaml::{YamlMessageVariantsRepository, YamlParticipantRepository};
use grouper::domain::errors::DomainError;
use grouper::domain::ports::{MessageVariantsRepository, ParticipantRepository};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("Failed to write fixture");
}

const TEENS: &str = r"
participants:
  - name: Kelly
    identity: 17 year old who loves tennis
  - name: Tom
    age: 16
    location: Chertsey
    interests: [gym, politics]
    population_percentage: 2.0
llms:
  - model: claude-haiku-4-5
  - model: claude-haiku-4-5
    temperature: 0.9
";

#[tokio::test]
async fn test_group_is_participants_crossed_with_llms() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "teens.yml", TEENS);
    let repository = YamlParticipantRepository::new(dir.path());

    let group = repository.find_by_group("teens").await.unwrap();

    assert_eq!(group.len(), 4);
    let ids: Vec<&str> = group.participants().iter().map(|p| p.id()).collect();
    assert!(ids.contains(&"Kelly-claude-haiku-4-5"));
    assert!(ids.contains(&"Kelly-claude-haiku-4-5@0.9"));
    assert_eq!(ids.iter().filter(|id| id.starts_with("Tom-")).count(), 2);

    let tom = group
        .participants()
        .iter()
        .find(|p| p.name() == "Tom")
        .unwrap();
    assert!(tom.contribution().contains("Chertsey"));
    // Two Kellys at weight 1 and two Toms at weight 2.
    assert!((group.normalized_weight(tom.as_ref()) - 2.0 / 6.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_group_without_llms_uses_default_model() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "solo.yml",
        "participants:\n  - name: Kelly\n    identity: tennis player\n",
    );
    let repository = YamlParticipantRepository::new(dir.path());

    let group = repository.find_by_group("solo").await.unwrap();

    assert_eq!(group.len(), 1);
    assert_eq!(group.participants()[0].id(), "Kelly-default");
}

#[tokio::test]
async fn test_missing_group_is_a_repository_error() {
    let dir = TempDir::new().unwrap();
    let repository = YamlParticipantRepository::new(dir.path());

    let err = repository.find_by_group("nobody").await.unwrap_err();

    assert!(matches!(err, DomainError::Repository(msg) if msg.contains("nobody.yml")));
}

#[tokio::test]
async fn test_duplicate_participants_are_rejected() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "twins.yml",
        "participants:\n  - name: Kelly\n    identity: a\n  - name: Kelly\n    identity: b\n",
    );
    let repository = YamlParticipantRepository::new(dir.path());

    let err = repository.find_by_group("twins").await.unwrap_err();

    assert!(matches!(err, DomainError::DuplicateParticipant(id) if id == "Kelly-default"));
}

#[tokio::test]
async fn test_list_groups_is_sorted() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "teens.yml", TEENS);
    write(dir.path(), "adults.yml", TEENS);
    write(dir.path(), "notes.txt", "not a group");
    let repository = YamlParticipantRepository::new(dir.path());

    let groups = repository.list_groups().await.unwrap();

    assert_eq!(groups, vec!["adults", "teens"]);
}

#[tokio::test]
async fn test_message_with_wordings() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "nosmoke.yml",
        r"
message:
  id: nosmoke
  content: smoking is bad
  objective: deter the reader from smoking
  deliverable: a poster slogan
wordings:
  - Smoking is uncool
  - Winners don't smoke
",
    );
    let repository = YamlMessageVariantsRepository::new(dir.path());

    let variants = repository.find_by_name("nosmoke").await.unwrap();

    assert_eq!(variants.message.id, "nosmoke");
    assert_eq!(variants.message.deliverable, "a poster slogan");
    assert_eq!(
        variants.wordings(),
        vec!["Smoking is uncool", "Winners don't smoke"]
    );
}

#[tokio::test]
async fn test_malformed_message_is_a_repository_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.yml", "message: [not, a, message]\n");
    let repository = YamlMessageVariantsRepository::new(dir.path());

    let err = repository.find_by_name("broken").await.unwrap_err();

    assert!(matches!(err, DomainError::Repository(_)));
}

#[tokio::test]
async fn test_bundled_data_loads() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let participants = YamlParticipantRepository::new(root.join("participants"));
    let messages = YamlMessageVariantsRepository::new(root.join("messages"));

    let group = participants.find_by_group("teens").await.unwrap();
    let variants = messages.find_by_name("nosmoke").await.unwrap();

    assert_eq!(group.len(), 8);
    assert_eq!(variants.wordings().len(), 4);
}
