use tracing::{debug, warn};

use crate::backend::{BackendError, TaskStore};
use crate::models::{AuthSession, Task};

/// The signed-in user's recent sessions, newest first.
#[derive(Debug, Default)]
pub struct TaskHistory {
    tasks: Vec<Task>,
}

impl TaskHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Replace the list with a fresh fetch. On failure the previous contents stay.
    pub fn reload<S: TaskStore + ?Sized>(
        &mut self,
        store: &S,
        session: &AuthSession,
    ) -> Result<usize, BackendError> {
        match store.list_tasks(session, &session.user.id) {
            Ok(mut tasks) => {
                tasks.sort_by(|a, b| b.start_time.cmp(&a.start_time));
                debug!(count = tasks.len(), "task history reloaded");
                self.tasks = tasks;
                Ok(self.tasks.len())
            }
            Err(e) => {
                warn!(error = %e, "failed to reload task history");
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockTaskStore;
    use crate::models::{Category, User};
    use chrono::{Duration, TimeZone, Utc};

    fn session() -> AuthSession {
        AuthSession {
            access_token: "token".into(),
            user: User {
                id: "user-1".into(),
                email: "ada@example.com".into(),
            },
        }
    }

    fn task(id: &str, hour: u32) -> Task {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap();
        Task {
            id: id.into(),
            user_id: "user-1".into(),
            title: format!("Task {id}"),
            category: Category::Study,
            start_time: start,
            end_time: Some(start + Duration::minutes(30)),
            duration: 1800,
            is_productive: true,
            notes: None,
            created_at: start + Duration::minutes(30),
        }
    }

    #[test]
    fn reload_orders_newest_first_and_queries_own_rows() {
        let mut store = MockTaskStore::new();
        store
            .expect_list_tasks()
            .withf(|_, user_id| user_id.to_string() == "user-1")
            .times(1)
            .returning(|_, _| Ok(vec![task("a", 9), task("c", 11), task("b", 10)]));

        let mut history = TaskHistory::new();
        assert_eq!(history.reload(&store, &session()).unwrap(), 3);
        let ids: Vec<_> = history.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn reload_replaces_the_whole_list() {
        let mut store = MockTaskStore::new();
        let mut calls = 0;
        store.expect_list_tasks().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok(vec![task("a", 9), task("b", 10)])
            } else {
                Ok(vec![task("z", 12)])
            }
        });

        let mut history = TaskHistory::new();
        history.reload(&store, &session()).unwrap();
        history.reload(&store, &session()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.tasks()[0].id, "z");
    }

    #[test]
    fn failed_reload_keeps_previous_list() {
        let mut store = MockTaskStore::new();
        let mut calls = 0;
        store.expect_list_tasks().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Ok(vec![task("a", 9)])
            } else {
                Err(BackendError::InvalidRequest("offline".into()))
            }
        });

        let mut history = TaskHistory::new();
        history.reload(&store, &session()).unwrap();
        let err = history.reload(&store, &session()).unwrap_err();
        assert_eq!(err.to_string(), "offline");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn clear_empties_the_list() {
        let mut store = MockTaskStore::new();
        store.expect_list_tasks().returning(|_, _| Ok(vec![task("a", 9)]));
        let mut history = TaskHistory::new();
        history.reload(&store, &session()).unwrap();
        history.clear();
        assert!(history.is_empty());
    }
}
