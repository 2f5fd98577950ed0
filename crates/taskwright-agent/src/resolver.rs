// SPDX-FileCopyrightText: 2026 Taskwright Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns a task reference from intent entities into one concrete task id.

use std::sync::Arc;

use taskwright_core::{
    IntentEntities, IntentKind, StatusFilter, StorageAdapter, TaskwrightError,
};
use tracing::debug;

use crate::matcher;

/// Candidates listed when a description matches more than one task.
pub const MAX_CANDIDATES: usize = 5;

/// Outcome of resolving a task reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one of the owner's tasks was identified.
    Resolved(i64),
    /// No single task could be identified; the message asks the user to clarify.
    Clarify(String),
}

/// Resolves `task_id` / `task_description` entities against an owner's tasks.
pub struct TaskResolver {
    storage: Arc<dyn StorageAdapter>,
}

impl TaskResolver {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// An explicit `task_id` wins and the description is not consulted.
    /// A description is matched fuzzily against a fresh read of the owner's tasks.
    ///
    /// `kind` is one of complete, delete or update and names the action in
    /// the clarification asked when no reference was given.
    pub async fn resolve(
        &self,
        owner: &str,
        kind: IntentKind,
        entities: &IntentEntities,
    ) -> Result<Resolution, TaskwrightError> {
        if let Some(raw) = entities.task_id.as_deref() {
            let Ok(id) = raw.parse::<i64>() else {
                return Ok(Resolution::Clarify(format!("Task #{raw} not found.")));
            };
            return Ok(match self.storage.get_task(owner, id).await? {
                Some(task) => Resolution::Resolved(task.id),
                None => Resolution::Clarify(format!("Task #{id} not found.")),
            });
        }

        let description = entities
            .task_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        let Some(description) = description else {
            return Ok(Resolution::Clarify(format!(
                "Please specify which task you want to {kind}."
            )));
        };

        let tasks = self.storage.list_tasks(owner, StatusFilter::All).await?;
        let ranked = matcher::rank(description, &tasks);
        debug!(owner, description, candidates = ranked.len(), "matched task description");

        Ok(match ranked.as_slice() {
            [] => Resolution::Clarify(format!(
                "I couldn't find a task matching '{description}'."
            )),
            [only] => Resolution::Resolved(only.task.id),
            many => {
                let listing: Vec<String> = many
                    .iter()
                    .take(MAX_CANDIDATES)
                    .map(|s| format!("- #{}: {}", s.task.id, s.task.title))
                    .collect();
                Resolution::Clarify(format!(
                    "I found multiple tasks matching '{description}'. Which one?\n{}",
                    listing.join("\n")
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::open_storage;

    fn by_id(id: &str) -> IntentEntities {
        IntentEntities {
            task_id: Some(id.to_string()),
            ..IntentEntities::default()
        }
    }

    fn by_description(desc: &str) -> IntentEntities {
        IntentEntities {
            task_description: Some(desc.to_string()),
            ..IntentEntities::default()
        }
    }

    #[tokio::test]
    async fn explicit_id_resolves_and_ignores_description() {
        let (storage, _dir) = open_storage().await;
        let milk = storage.create_task("u1", "Buy milk", None).await.unwrap();
        storage.create_task("u1", "Buy bread", None).await.unwrap();
        let resolver = TaskResolver::new(storage);

        let entities = IntentEntities {
            task_id: Some(milk.id.to_string()),
            task_description: Some("buy".to_string()),
            ..IntentEntities::default()
        };
        assert_eq!(
            resolver.resolve("u1", IntentKind::Update, &entities).await.unwrap(),
            Resolution::Resolved(milk.id)
        );
    }

    #[tokio::test]
    async fn foreign_or_missing_id_is_not_found() {
        let (storage, _dir) = open_storage().await;
        let other = storage.create_task("u2", "Secret", None).await.unwrap();
        let resolver = TaskResolver::new(storage);

        let outcome = resolver
            .resolve("u1", IntentKind::Update, &by_id(&other.id.to_string()))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Resolution::Clarify(format!("Task #{} not found.", other.id))
        );

        let outcome = resolver.resolve("u1", IntentKind::Update, &by_id("abc")).await.unwrap();
        assert_eq!(outcome, Resolution::Clarify("Task #abc not found.".to_string()));
    }

    #[tokio::test]
    async fn single_description_match_resolves() {
        let (storage, _dir) = open_storage().await;
        storage.create_task("u1", "Buy milk", None).await.unwrap();
        let walk = storage.create_task("u1", "Walk the dog", None).await.unwrap();
        let resolver = TaskResolver::new(storage);

        assert_eq!(
            resolver.resolve("u1", IntentKind::Update, &by_description("dog")).await.unwrap(),
            Resolution::Resolved(walk.id)
        );
    }

    #[tokio::test]
    async fn multiple_matches_ask_which_one() {
        let (storage, _dir) = open_storage().await;
        let milk = storage.create_task("u1", "Buy milk", None).await.unwrap();
        let bread = storage.create_task("u1", "Buy bread", None).await.unwrap();
        let resolver = TaskResolver::new(storage);

        let outcome = resolver.resolve("u1", IntentKind::Update, &by_description("the buy task")).await.unwrap();
        let expected = format!(
            "I found multiple tasks matching 'the buy task'. Which one?\n- #{}: Buy milk\n- #{}: Buy bread",
            milk.id, bread.id
        );
        assert_eq!(outcome, Resolution::Clarify(expected));
    }

    #[tokio::test]
    async fn candidate_list_is_capped() {
        let (storage, _dir) = open_storage().await;
        for i in 0..7 {
            storage
                .create_task("u1", &format!("report {i}"), None)
                .await
                .unwrap();
        }
        let resolver = TaskResolver::new(storage);

        let Resolution::Clarify(message) =
            resolver.resolve("u1", IntentKind::Update, &by_description("weekly report")).await.unwrap()
        else {
            panic!("expected clarification");
        };
        assert_eq!(message.lines().filter(|l| l.starts_with("- #")).count(), MAX_CANDIDATES);
    }

    #[tokio::test]
    async fn no_match_and_no_reference() {
        let (storage, _dir) = open_storage().await;
        storage.create_task("u1", "Buy milk", None).await.unwrap();
        let resolver = TaskResolver::new(storage);

        assert_eq!(
            resolver.resolve("u1", IntentKind::Update, &by_description("taxes")).await.unwrap(),
            Resolution::Clarify("I couldn't find a task matching 'taxes'.".to_string())
        );
        assert_eq!(
            resolver.resolve("u1", IntentKind::Update, &by_description("   ")).await.unwrap(),
            Resolution::Clarify("Please specify which task you want to update.".to_string())
        );
    }

    #[tokio::test]
    async fn missing_reference_names_the_action() {
        let (storage, _dir) = open_storage().await;
        let resolver = TaskResolver::new(storage);

        for (kind, verb) in [
            (IntentKind::Complete, "complete"),
            (IntentKind::Delete, "delete"),
            (IntentKind::Update, "update"),
        ] {
            assert_eq!(
                resolver.resolve("u1", kind, &IntentEntities::default()).await.unwrap(),
                Resolution::Clarify(format!("Please specify which task you want to {verb}."))
            );
        }
    }

    #[tokio::test]
    async fn other_owners_tasks_are_not_candidates() {
        let (storage, _dir) = open_storage().await;
        storage.create_task("u2", "Buy milk", None).await.unwrap();
        let mine = storage.create_task("u1", "Buy bread", None).await.unwrap();
        let resolver = TaskResolver::new(storage);

        assert_eq!(
            resolver.resolve("u1", IntentKind::Update, &by_description("buy")).await.unwrap(),
            Resolution::Resolved(mine.id)
        );
    }
}
