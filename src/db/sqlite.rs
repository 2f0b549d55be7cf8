use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    Row, Sqlite,
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
};

use crate::db::ContestStore;
use crate::error::ContestError;
use crate::models::{ContestEntry, ExperienceLevel, RaffleEntry, ReferralTotals, UserProfile};
use crate::voting::{VoteAction, VoteOutcome};

/// SQLite-backed store. Timestamps are stored as RFC3339 text, language
/// lists as JSON text. The vote ledger lives in the `entry_votes` table and
/// the `votes` column on `contest_entries` is re-synced from it inside the
/// same transaction as every toggle.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self, ContestError> {
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), ContestError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                native_languages TEXT NOT NULL,
                target_languages TEXT NOT NULL,
                experience_level TEXT NOT NULL,
                profile_picture TEXT,
                video_intro TEXT,
                referral_id TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contest_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                language TEXT NOT NULL,
                region TEXT NOT NULL,
                caption TEXT NOT NULL,
                video_url TEXT NOT NULL,
                votes INTEGER NOT NULL DEFAULT 0,
                rating REAL NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entry_votes (
                entry_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (entry_id, user_id),
                FOREIGN KEY (entry_id) REFERENCES contest_entries(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS raffle_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                referral_id TEXT NOT NULL,
                referred_user_id TEXT NOT NULL,
                tickets_earned INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, referred_user_id),
                FOREIGN KEY (user_id) REFERENCES user_profiles(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<ContestEntry, ContestError> {
        Ok(ContestEntry {
            id: row.get::<String, _>("id"),
            user_id: row.get::<String, _>("user_id"),
            language: row.get::<String, _>("language"),
            region: row.get::<String, _>("region"),
            caption: row.get::<String, _>("caption"),
            video_url: row.get::<String, _>("video_url"),
            votes: row.get::<i64, _>("votes"),
            rating: row.get::<f64, _>("rating"),
            created_at: parse_timestamp(&row.get::<String, _>("created_at"), "created_at")?,
        })
    }

    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile, ContestError> {
        let level_str = row.get::<String, _>("experience_level");
        let experience_level = ExperienceLevel::parse(&level_str).ok_or_else(|| {
            ContestError::Internal(format!("unknown experience level: {}", level_str))
        })?;

        Ok(UserProfile {
            id: row.get::<String, _>("id"),
            name: row.get::<String, _>("name"),
            email: row.get::<String, _>("email"),
            native_languages: parse_languages(&row.get::<String, _>("native_languages"))?,
            target_languages: parse_languages(&row.get::<String, _>("target_languages"))?,
            experience_level,
            profile_picture: row.get::<Option<String>, _>("profile_picture"),
            video_intro: row.get::<Option<String>, _>("video_intro"),
            referral_id: row.get::<String, _>("referral_id"),
            created_at: parse_timestamp(&row.get::<String, _>("created_at"), "created_at")?,
            updated_at: parse_timestamp(&row.get::<String, _>("updated_at"), "updated_at")?,
        })
    }
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>, ContestError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ContestError::Internal(format!("failed to parse {}: {}", column, e)))
}

fn parse_languages(value: &str) -> Result<Vec<String>, ContestError> {
    serde_json::from_str(value)
        .map_err(|e| ContestError::Internal(format!("failed to parse language list: {}", e)))
}

fn encode_languages(languages: &[String]) -> Result<String, ContestError> {
    serde_json::to_string(languages)
        .map_err(|e| ContestError::Internal(format!("failed to encode language list: {}", e)))
}

#[async_trait]
impl ContestStore for Database {
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), ContestError> {
        let existing = sqlx::query("SELECT 1 FROM user_profiles WHERE email = ?")
            .bind(&profile.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(ContestError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO user_profiles
                (id, name, email, native_languages, target_languages, experience_level,
                 profile_picture, video_intro, referral_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(encode_languages(&profile.native_languages)?)
        .bind(encode_languages(&profile.target_languages)?)
        .bind(profile.experience_level.as_str())
        .bind(&profile.profile_picture)
        .bind(&profile.video_intro)
        .bind(&profile.referral_id)
        .bind(profile.created_at.to_rfc3339())
        .bind(profile.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ContestError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_profile(&r)).transpose()
    }

    async fn find_profile_by_referral(
        &self,
        referral_id: &str,
    ) -> Result<Option<UserProfile>, ContestError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE referral_id = ?")
            .bind(referral_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_profile(&r)).transpose()
    }

    async fn create_entry(&self, entry: &ContestEntry) -> Result<(), ContestError> {
        sqlx::query(
            r#"
            INSERT INTO contest_entries
                (id, user_id, language, region, caption, video_url, votes, rating, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.language)
        .bind(&entry.region)
        .bind(&entry.caption)
        .bind(&entry.video_url)
        .bind(entry.votes)
        .bind(entry.rating)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<ContestEntry>, ContestError> {
        let row = sqlx::query("SELECT * FROM contest_entries WHERE id = ?")
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Self::row_to_entry(&r)).transpose()
    }

    async fn list_entries(&self) -> Result<Vec<ContestEntry>, ContestError> {
        let rows = sqlx::query("SELECT * FROM contest_entries")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn toggle_vote(
        &self,
        entry_id: &str,
        user_id: &str,
        action: VoteAction,
    ) -> Result<VoteOutcome, ContestError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM contest_entries WHERE id = ?")
            .bind(entry_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();

        if !exists {
            return Err(ContestError::NotFound(
                "Contest entry not found".to_string(),
            ));
        }

        match action {
            VoteAction::Like => {
                // INSERT OR IGNORE keeps repeated likes idempotent.
                sqlx::query(
                    "INSERT OR IGNORE INTO entry_votes (entry_id, user_id, created_at) VALUES (?, ?, ?)",
                )
                .bind(entry_id)
                .bind(user_id)
                .bind(Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await?;
            }
            VoteAction::Unlike => {
                sqlx::query("DELETE FROM entry_votes WHERE entry_id = ? AND user_id = ?")
                    .bind(entry_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let votes: i64 = sqlx::query("SELECT COUNT(*) AS votes FROM entry_votes WHERE entry_id = ?")
            .bind(entry_id)
            .fetch_one(&mut *tx)
            .await?
            .get("votes");

        // Re-sync the cached projection before the transaction closes so no
        // reader sees the ledger and the counter disagree.
        sqlx::query("UPDATE contest_entries SET votes = ? WHERE id = ?")
            .bind(votes)
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;

        let is_liked = sqlx::query("SELECT 1 FROM entry_votes WHERE entry_id = ? AND user_id = ?")
            .bind(entry_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();

        tx.commit().await?;

        Ok(VoteOutcome { votes, is_liked })
    }

    async fn vote_count(&self, entry_id: &str) -> Result<i64, ContestError> {
        let exists = sqlx::query("SELECT 1 FROM contest_entries WHERE id = ?")
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();

        if !exists {
            return Err(ContestError::NotFound(
                "Contest entry not found".to_string(),
            ));
        }

        let votes: i64 = sqlx::query("SELECT COUNT(*) AS votes FROM entry_votes WHERE entry_id = ?")
            .bind(entry_id)
            .fetch_one(&self.pool)
            .await?
            .get("votes");

        Ok(votes)
    }

    async fn create_raffle_entry(&self, entry: &RaffleEntry) -> Result<(), ContestError> {
        let existing =
            sqlx::query("SELECT 1 FROM raffle_entries WHERE user_id = ? AND referred_user_id = ?")
                .bind(&entry.user_id)
                .bind(&entry.referred_user_id)
                .fetch_optional(&self.pool)
                .await?;

        if existing.is_some() {
            return Err(ContestError::Conflict(
                "Referral already recorded".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO raffle_entries
                (id, user_id, referral_id, referred_user_id, tickets_earned, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.referral_id)
        .bind(&entry.referred_user_id)
        .bind(entry.tickets_earned)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn referral_standings(&self) -> Result<Vec<ReferralTotals>, ContestError> {
        let rows = sqlx::query(
            r#"
            SELECT r.user_id, u.name, u.referral_id,
                   COUNT(*) AS total_referrals,
                   SUM(r.tickets_earned) AS tickets_earned
            FROM raffle_entries r
            JOIN user_profiles u ON u.id = r.user_id
            GROUP BY r.user_id, u.name, u.referral_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ReferralTotals {
                user_id: row.get::<String, _>("user_id"),
                user_name: row.get::<String, _>("name"),
                referral_id: row.get::<String, _>("referral_id"),
                total_referrals: row.get::<i64, _>("total_referrals"),
                tickets_earned: row.get::<i64, _>("tickets_earned"),
            })
            .collect())
    }
}
