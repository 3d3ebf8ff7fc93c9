use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CompetencyRating, ProfileError};

/// Durable per-user skills and competency ratings.
///
/// Saving an existing skill is a no-op; saving a rating overwrites the prior
/// value for that competency. Reads return empty collections when the user
/// has no rows.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn save_skills(&self, user_id: Uuid, skills: &[String]) -> Result<(), ProfileError>;

    async fn load_skills(&self, user_id: Uuid) -> Result<Vec<String>, ProfileError>;

    async fn save_ratings(
        &self,
        user_id: Uuid,
        ratings: &[CompetencyRating],
    ) -> Result<(), ProfileError>;

    async fn load_ratings(&self, user_id: Uuid) -> Result<Vec<CompetencyRating>, ProfileError>;
}

#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn save_skills(&self, user_id: Uuid, skills: &[String]) -> Result<(), ProfileError> {
        if skills.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            INSERT INTO user_skills (user_id, skill)
            SELECT $1, s FROM UNNEST($2::text[]) AS s
            ON CONFLICT (user_id, skill) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(skills)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_skills(&self, user_id: Uuid) -> Result<Vec<String>, ProfileError> {
        let skills: Vec<String> = sqlx::query_scalar(
            "SELECT skill FROM user_skills WHERE user_id = $1 ORDER BY created_at, skill",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    async fn save_ratings(
        &self,
        user_id: Uuid,
        ratings: &[CompetencyRating],
    ) -> Result<(), ProfileError> {
        if ratings.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = ratings.iter().map(|r| r.name.as_str()).collect();
        let values: Vec<i16> = ratings.iter().map(|r| i16::from(r.rating)).collect();

        sqlx::query(
            r#"
            INSERT INTO user_competencies (user_id, competency_name, rating)
            SELECT $1, name, rating FROM UNNEST($2::text[], $3::smallint[]) AS t(name, rating)
            ON CONFLICT (user_id, competency_name) DO UPDATE
                SET rating = EXCLUDED.rating,
                    updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(names)
        .bind(values)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_ratings(&self, user_id: Uuid) -> Result<Vec<CompetencyRating>, ProfileError> {
        let rows: Vec<(String, i16)> = sqlx::query_as(
            "SELECT competency_name, rating FROM user_competencies \
             WHERE user_id = $1 ORDER BY competency_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, rating)| CompetencyRating {
                name,
                rating: u8::try_from(rating).unwrap_or(0),
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub(crate) struct MemoryProfileRepository {
        skills: Mutex<HashMap<Uuid, Vec<String>>>,
        ratings: Mutex<HashMap<Uuid, Vec<CompetencyRating>>>,
        /// When set, every call fails like an unreachable database.
        pub offline: bool,
    }

    impl MemoryProfileRepository {
        pub(crate) fn offline() -> Self {
            Self {
                offline: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), ProfileError> {
            if self.offline {
                Err(ProfileError::Database(sqlx::Error::PoolTimedOut))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ProfileRepository for MemoryProfileRepository {
        async fn save_skills(&self, user_id: Uuid, skills: &[String]) -> Result<(), ProfileError> {
            self.check()?;
            let mut all = self.skills.lock().unwrap();
            let stored = all.entry(user_id).or_default();
            for skill in skills {
                if !stored.contains(skill) {
                    stored.push(skill.clone());
                }
            }
            Ok(())
        }

        async fn load_skills(&self, user_id: Uuid) -> Result<Vec<String>, ProfileError> {
            self.check()?;
            Ok(self
                .skills
                .lock()
                .unwrap()
                .get(&user_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn save_ratings(
            &self,
            user_id: Uuid,
            ratings: &[CompetencyRating],
        ) -> Result<(), ProfileError> {
            self.check()?;
            let mut all = self.ratings.lock().unwrap();
            let stored = all.entry(user_id).or_default();
            for rating in ratings {
                match stored.iter_mut().find(|r| r.name == rating.name) {
                    Some(existing) => existing.rating = rating.rating,
                    None => stored.push(rating.clone()),
                }
            }
            Ok(())
        }

        async fn load_ratings(&self, user_id: Uuid) -> Result<Vec<CompetencyRating>, ProfileError> {
            self.check()?;
            Ok(self
                .ratings
                .lock()
                .unwrap()
                .get(&user_id)
                .cloned()
                .unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_memory_repository_upserts_ratings() {
        let repo = MemoryProfileRepository::default();
        let user = Uuid::new_v4();
        assert!(repo.load_ratings(user).await.unwrap().is_empty());

        let first = CompetencyRating::new("Numeracy", 2).unwrap();
        let second = CompetencyRating::new("Numeracy", 5).unwrap();
        repo.save_ratings(user, &[first]).await.unwrap();
        repo.save_ratings(user, &[second.clone()]).await.unwrap();
        assert_eq!(repo.load_ratings(user).await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_memory_repository_ignores_repeat_skills() {
        let repo = MemoryProfileRepository::default();
        let user = Uuid::new_v4();
        repo.save_skills(user, &["sql".to_string()]).await.unwrap();
        repo.save_skills(user, &["sql".to_string(), "excel".to_string()])
            .await
            .unwrap();
        assert_eq!(repo.load_skills(user).await.unwrap(), vec!["sql", "excel"]);
    }
}
