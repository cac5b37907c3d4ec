//! Seat registration: the only stateful business rule in the service.
//!
//! A user may appear at most once in an event's `registered_users`, and the
//! list may never grow past `total_seats`. `check_registration` states the
//! rule; each `EventStore` applies it atomically with the append.

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::events::store::EventStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationRejection {
    #[error("user is already registered")]
    AlreadyRegistered,
    #[error("event is housefull")]
    Housefull,
}

impl From<RegistrationRejection> for AppError {
    fn from(rejection: RegistrationRejection) -> Self {
        match rejection {
            RegistrationRejection::AlreadyRegistered => AppError::AlreadyRegistered,
            RegistrationRejection::Housefull => AppError::Housefull,
        }
    }
}

/// Decides whether `user_id` may take a seat. Duplicates are reported before
/// capacity, so a registrant retrying on a full event hears they are already in.
pub fn check_registration(
    registered: &[Uuid],
    total_seats: i32,
    user_id: Uuid,
) -> Result<(), RegistrationRejection> {
    if registered.contains(&user_id) {
        return Err(RegistrationRejection::AlreadyRegistered);
    }
    if registered.len() as i64 >= i64::from(total_seats) {
        return Err(RegistrationRejection::Housefull);
    }
    Ok(())
}

/// Registers `user_id` for `event_id`.
pub async fn register_for_event(
    events: &dyn EventStore,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    match events.add_registrant(event_id, user_id).await {
        Ok(()) => {
            info!("User {user_id} registered for event {event_id}");
            Ok(())
        }
        Err(e) => {
            debug!("Registration of {user_id} for {event_id} rejected: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{sample_event, MemoryStore};

    #[test]
    fn test_open_seat_accepts() {
        assert_eq!(check_registration(&[Uuid::new_v4()], 2, Uuid::new_v4()), Ok(()));
    }

    #[test]
    fn test_duplicate_rejected() {
        let user = Uuid::new_v4();
        assert_eq!(
            check_registration(&[user], 5, user),
            Err(RegistrationRejection::AlreadyRegistered)
        );
    }

    #[test]
    fn test_full_event_rejected() {
        let registered = vec![Uuid::new_v4(), Uuid::new_v4()];
        assert_eq!(
            check_registration(&registered, 2, Uuid::new_v4()),
            Err(RegistrationRejection::Housefull)
        );
    }

    #[test]
    fn test_duplicate_wins_over_housefull() {
        let user = Uuid::new_v4();
        assert_eq!(
            check_registration(&[Uuid::new_v4(), user], 2, user),
            Err(RegistrationRejection::AlreadyRegistered)
        );
    }

    #[test]
    fn test_overfull_list_still_housefull() {
        let registered = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        assert_eq!(
            check_registration(&registered, 2, Uuid::new_v4()),
            Err(RegistrationRejection::Housefull)
        );
    }

    #[tokio::test]
    async fn test_second_registration_is_already_registered() {
        let store = MemoryStore::default();
        let event = store.insert_event(sample_event("Dhwani", 10)).await;
        let user = Uuid::new_v4();

        register_for_event(&store, event.id, user).await.unwrap();
        let err = register_for_event(&store, event.id, user).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyRegistered));
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let store = MemoryStore::default();
        let err = register_for_event(&store, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_capacity_two_admits_two() {
        let store = MemoryStore::default();
        let event = store.insert_event(sample_event("Dhwani", 2)).await;

        register_for_event(&store, event.id, Uuid::new_v4()).await.unwrap();
        register_for_event(&store, event.id, Uuid::new_v4()).await.unwrap();
        let err = register_for_event(&store, event.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Housefull));

        let stored = store.find(event.id).await.unwrap().unwrap();
        assert_eq!(stored.registered_users.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_never_oversell() {
        let store = Arc::new(MemoryStore::default());
        let event = store.insert_event(sample_event("Dhwani", 5)).await;

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    register_for_event(store.as_ref(), event.id, Uuid::new_v4()).await
                })
            })
            .collect();

        let mut admitted = 0;
        let mut housefull = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => admitted += 1,
                Err(AppError::Housefull) => housefull += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(admitted, 5);
        assert_eq!(housefull, 35);

        let stored = store.find(event.id).await.unwrap().unwrap();
        assert_eq!(stored.registered_users.len(), 5);
    }
}
