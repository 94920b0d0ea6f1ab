//! User repository for notification preferences

use chrono::{DateTime, Utc};

use super::DbPool;
use crate::{Error, Result};

/// When a user wants to be alerted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotificationMode {
    /// Never alert
    #[default]
    Off,
    /// Alert on the next event, then switch to `Off`
    Once,
    /// Alert on every event
    Always,
}

impl NotificationMode {
    /// Stored integer value
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Off => 0,
            Self::Once => 1,
            Self::Always => 2,
        }
    }

    /// Parse a stored value; unknown values read as `Off`
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        match value {
            1 => Self::Once,
            2 => Self::Always,
            _ => Self::Off,
        }
    }
}

/// A user
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub notifications: NotificationMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User repository
#[derive(Clone)]
pub struct UserRepo {
    pool: DbPool,
}

impl UserRepo {
    /// Create a new user repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Find or create a user
    ///
    /// Safe to call concurrently for the same ID; every caller gets the
    /// stored row.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find_or_create(&self, id: &str) -> Result<User> {
        if let Some(user) = self.find(id)? {
            return Ok(user);
        }

        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;
        let stamp = Utc::now().to_rfc3339();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO users (id, notifications, created_at, updated_at) VALUES (?1, 0, ?2, ?2)",
                [id, &stamp],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        drop(conn);

        if inserted > 0 {
            tracing::debug!(user_id = id, "user created");
        }

        self.find(id)?
            .ok_or_else(|| Error::NotFound(format!("user {id}")))
    }

    /// Find a user by ID (returns None if not found)
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn find(&self, id: &str) -> Result<Option<User>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, notifications, created_at, updated_at FROM users WHERE id = ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut rows = stmt
            .query_map([id], |row| {
                Ok(User {
                    id: row.get(0)?,
                    notifications: NotificationMode::from_i64(row.get(1)?),
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    updated_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.next()
            .transpose()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Set a user's notification mode
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails or the user does not exist
    pub fn set_notifications(&self, user_id: &str, mode: NotificationMode) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let changed = conn
            .execute(
                "UPDATE users SET notifications = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![mode.as_i64(), now, user_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        if changed == 0 {
            tracing::error!(user_id, "failed to update user");
            return Err(Error::NotFound(format!("user {user_id}")));
        }

        Ok(())
    }

    /// Delete a user
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn delete(&self, id: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute("DELETE FROM users WHERE id = ?1", [id])
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    fn setup() -> UserRepo {
        let pool = init_memory().unwrap();
        UserRepo::new(pool)
    }

    #[test]
    fn test_find_or_create_user() {
        let repo = setup();

        let user = repo.find_or_create("76561198000000001").unwrap();
        assert_eq!(user.id, "76561198000000001");
        assert_eq!(user.notifications, NotificationMode::Off);

        // Should return same user
        let user2 = repo.find_or_create("76561198000000001").unwrap();
        assert_eq!(user.id, user2.id);
    }

    #[test]
    fn test_find_or_create_concurrent_first_contact() {
        let dir = tempfile::tempdir().unwrap();
        let repo = UserRepo::new(crate::db::init(dir.path().join("users.db")).unwrap());

        for round in 0..50 {
            let id = format!("user-{round}");
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let repo = repo.clone();
                    let id = id.clone();
                    std::thread::spawn(move || repo.find_or_create(&id))
                })
                .collect();

            for handle in handles {
                let user = handle.join().unwrap().unwrap();
                assert_eq!(user.id, id);
                assert_eq!(user.notifications, NotificationMode::Off);
            }
        }
    }

    #[test]
    fn test_find_or_create_keeps_existing_mode() {
        let repo = setup();
        repo.find_or_create("u1").unwrap();
        repo.set_notifications("u1", NotificationMode::Always).unwrap();

        let user = repo.find_or_create("u1").unwrap();
        assert_eq!(user.notifications, NotificationMode::Always);
    }

    #[test]
    fn test_find_missing_user() {
        let repo = setup();
        assert!(repo.find("nobody").unwrap().is_none());
    }

    #[test]
    fn test_set_notifications() {
        let repo = setup();
        repo.find_or_create("u1").unwrap();

        repo.set_notifications("u1", NotificationMode::Always).unwrap();
        assert_eq!(
            repo.find("u1").unwrap().unwrap().notifications,
            NotificationMode::Always
        );

        repo.set_notifications("u1", NotificationMode::Once).unwrap();
        assert_eq!(
            repo.find("u1").unwrap().unwrap().notifications,
            NotificationMode::Once
        );
    }

    #[test]
    fn test_set_notifications_unknown_user() {
        let repo = setup();
        assert!(repo.set_notifications("ghost", NotificationMode::Once).is_err());
    }

    #[test]
    fn test_delete_user() {
        let repo = setup();
        repo.find_or_create("u1").unwrap();
        repo.delete("u1").unwrap();
        assert!(repo.find("u1").unwrap().is_none());
    }

    #[test]
    fn test_mode_round_trip_values() {
        for mode in [NotificationMode::Off, NotificationMode::Once, NotificationMode::Always] {
            assert_eq!(NotificationMode::from_i64(mode.as_i64()), mode);
        }
        assert_eq!(NotificationMode::from_i64(7), NotificationMode::Off);
    }
}
