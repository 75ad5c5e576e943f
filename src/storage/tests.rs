//! Tests for storage module
//!
//! These tests run the SQLite store against an in-memory database:
//! - User uniqueness on username and provider identity
//! - Atomic paste insertion and pasty ordering
//! - Owner listing, privacy filter and paging
//! - Expiry sweeping and single-use OAuth states

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::helpers::now_millis;
    use crate::pastes::models::{ExpiresIn, Pasty};
    use chrono::Duration;

    fn user(id: &str, username: &str, provider_id: &str) -> User {
        User {
            id: id.to_string(),
            created_at: now_millis(),
            username: username.to_string(),
            avatar_url: "https://avatars.example/1.png".to_string(),
            provider_name: "GitHub".to_string(),
            provider_id: provider_id.to_string(),
            contributor: false,
            supporter: 0,
        }
    }

    fn paste(id: &str, owner_id: Option<&str>, private: bool) -> Paste {
        Paste {
            id: id.to_string(),
            created_at: now_millis(),
            expires_in: ExpiresIn::Never,
            deletes_at: None,
            title: format!("paste {}", id),
            owner_id: owner_id.map(str::to_string),
            private,
            pasties: vec![
                Pasty {
                    id: format!("{}-a", id),
                    title: "main.rs".to_string(),
                    content: "fn main() {}".to_string(),
                    language: "Rust".to_string(),
                },
                Pasty {
                    id: format!("{}-b", id),
                    title: "notes".to_string(),
                    content: "hello".to_string(),
                    language: "Text".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let store = SqliteStore::in_memory().await;
        let alice = user("u1", "alice", "100");

        store.insert_user(&alice).await.unwrap();

        assert!(store.user_exists_by_id("u1").await.unwrap());
        assert!(store.user_exists_by_username("alice").await.unwrap());
        assert!(!store.user_exists_by_username("bob").await.unwrap());
        assert_eq!(store.find_user_by_id("u1").await.unwrap(), Some(alice.clone()));
        assert_eq!(
            store.find_user_by_provider("GitHub", "100").await.unwrap(),
            Some(alice)
        );
        assert!(store.find_user_by_provider("GitLab", "100").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = SqliteStore::in_memory().await;
        store.insert_user(&user("u1", "alice", "100")).await.unwrap();

        let result = store.insert_user(&user("u2", "alice", "200")).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_duplicate_provider_identity_is_conflict() {
        let store = SqliteStore::in_memory().await;
        store.insert_user(&user("u1", "alice", "100")).await.unwrap();

        let result = store.insert_user(&user("u2", "bob", "100")).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_set_username() {
        let store = SqliteStore::in_memory().await;
        store.insert_user(&user("u1", "alice", "100")).await.unwrap();
        store.insert_user(&user("u2", "bob", "200")).await.unwrap();

        store.set_username("u1", "alicia").await.unwrap();
        assert!(store.find_user_by_username("alicia").await.unwrap().is_some());
        assert!(store.find_user_by_username("alice").await.unwrap().is_none());

        let taken = store.set_username("u1", "bob").await;
        assert!(matches!(taken, Err(ApiError::Conflict(_))));

        let missing = store.set_username("nobody", "carol").await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_insert_and_find_paste_keeps_pasty_order() {
        let store = SqliteStore::in_memory().await;
        let mut original = paste("p1", None, false);
        original.expires_in = ExpiresIn::OneDay;
        original.deletes_at = ExpiresIn::OneDay.deletes_at(original.created_at);

        store.insert_paste(&original).await.unwrap();

        let found = store.find_paste("p1").await.unwrap().unwrap();
        assert_eq!(found, original);
        assert_eq!(found.pasties[0].title, "main.rs");
        assert_eq!(found.pasties[1].title, "notes");
        assert!(store.paste_exists("p1").await.unwrap());
        assert!(store.find_paste("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_paste_insert_leaves_nothing_behind() {
        let store = SqliteStore::in_memory().await;
        let mut broken = paste("p1", None, false);
        broken.pasties[1].id = broken.pasties[0].id.clone();

        assert!(store.insert_paste(&broken).await.is_err());
        assert!(!store.paste_exists("p1").await.unwrap());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pasties")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_delete_paste_removes_pasties() {
        let store = SqliteStore::in_memory().await;
        store.insert_paste(&paste("p1", None, false)).await.unwrap();

        assert!(store.delete_paste("p1").await.unwrap());
        assert!(!store.delete_paste("p1").await.unwrap());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pasties")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_list_pastes_by_owner_filters_private_and_pages() {
        let store = SqliteStore::in_memory().await;
        store.insert_user(&user("u1", "alice", "100")).await.unwrap();

        let base = now_millis();
        for (i, private) in [false, true, false, false].into_iter().enumerate() {
            let mut p = paste(&format!("p{}", i), Some("u1"), private);
            p.created_at = base + Duration::seconds(i as i64);
            store.insert_paste(&p).await.unwrap();
        }
        store.insert_paste(&paste("other", None, false)).await.unwrap();

        assert_eq!(store.count_pastes_by_owner("u1", true).await.unwrap(), 4);
        assert_eq!(store.count_pastes_by_owner("u1", false).await.unwrap(), 3);

        let public = store.list_pastes_by_owner("u1", false, 10, 0).await.unwrap();
        let ids: Vec<&str> = public.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p2", "p0"]);

        let second_page = store.list_pastes_by_owner("u1", true, 2, 2).await.unwrap();
        let ids: Vec<&str> = second_page.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p0"]);
        assert_eq!(second_page[0].pasties.len(), 2);
    }

    #[tokio::test]
    async fn test_count_pastes_includes_private_and_anonymous() {
        let store = SqliteStore::in_memory().await;
        store.insert_user(&user("u1", "alice", "1")).await.unwrap();
        assert_eq!(store.count_pastes().await.unwrap(), 0);

        store.insert_paste(&paste("p1", Some("u1"), true)).await.unwrap();
        store.insert_paste(&paste("p2", None, false)).await.unwrap();
        assert_eq!(store.count_pastes().await.unwrap(), 2);

        store.delete_paste("p1").await.unwrap();
        assert_eq!(store.count_pastes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_expired_pastes() {
        let store = SqliteStore::in_memory().await;
        let now = now_millis();

        let mut expired = paste("old", None, false);
        expired.expires_in = ExpiresIn::OneHour;
        expired.deletes_at = Some(now - Duration::minutes(1));
        store.insert_paste(&expired).await.unwrap();

        let mut due_now = paste("due", None, false);
        due_now.expires_in = ExpiresIn::OneHour;
        due_now.deletes_at = Some(now);
        store.insert_paste(&due_now).await.unwrap();

        let mut later = paste("later", None, false);
        later.expires_in = ExpiresIn::OneHour;
        later.deletes_at = Some(now + Duration::hours(1));
        store.insert_paste(&later).await.unwrap();

        store.insert_paste(&paste("forever", None, false)).await.unwrap();

        assert_eq!(store.delete_expired_pastes(now).await.unwrap(), 2);
        assert!(!store.paste_exists("old").await.unwrap());
        assert!(!store.paste_exists("due").await.unwrap());
        assert!(store.paste_exists("later").await.unwrap());
        assert!(store.paste_exists("forever").await.unwrap());

        let pasties: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pasties")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(pasties, 4);
    }

    #[tokio::test]
    async fn test_oauth_state_is_single_use() {
        let store = SqliteStore::in_memory().await;
        let state = OAuthState {
            state: "abc".to_string(),
            provider: "github".to_string(),
            expires_at: now_millis() + Duration::minutes(10),
        };

        store.save_state("session-1", &state).await.unwrap();

        assert_eq!(store.take_state("session-1").await.unwrap(), Some(state));
        assert!(store.take_state("session-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_takes_hand_out_the_state_once() {
        let store = SqliteStore::in_memory().await;
        let state = OAuthState {
            state: "abc".to_string(),
            provider: "github".to_string(),
            expires_at: now_millis() + Duration::minutes(10),
        };
        store.save_state("session-1", &state).await.unwrap();

        let (first, second) = tokio::join!(
            store.take_state("session-1"),
            store.take_state("session-1")
        );
        let taken: Vec<OAuthState> = [first.unwrap(), second.unwrap()]
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(taken, vec![state]);
    }

    #[tokio::test]
    async fn test_save_state_replaces_previous_login_attempt() {
        let store = SqliteStore::in_memory().await;
        let expires_at = now_millis() + Duration::minutes(10);

        for value in ["first", "second"] {
            let state = OAuthState {
                state: value.to_string(),
                provider: "github".to_string(),
                expires_at,
            };
            store.save_state("session-1", &state).await.unwrap();
        }

        let taken = store.take_state("session-1").await.unwrap().unwrap();
        assert_eq!(taken.state, "second");
    }

    #[tokio::test]
    async fn test_delete_expired_states() {
        let store = SqliteStore::in_memory().await;
        let now = now_millis();

        let stale = OAuthState {
            state: "stale".to_string(),
            provider: "github".to_string(),
            expires_at: now - Duration::seconds(1),
        };
        let fresh = OAuthState {
            state: "fresh".to_string(),
            provider: "gitlab".to_string(),
            expires_at: now + Duration::minutes(10),
        };
        store.save_state("s1", &stale).await.unwrap();
        store.save_state("s2", &fresh).await.unwrap();

        assert_eq!(store.delete_expired_states(now).await.unwrap(), 1);
        assert!(store.take_state("s1").await.unwrap().is_none());
        assert!(store.take_state("s2").await.unwrap().is_some());
    }
}
