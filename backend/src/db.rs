use anyhow::Result;
use shared::{
    DueVaccination, Pet, PetRequest, RecordVaccinationRequest, ScheduleRequest, VaccinationRecord,
    VaccineSchedule,
};
use sqlx::{migrate::MigrateDatabase, sqlite::SqliteRow, Row, Sqlite, SqlitePool};
use std::sync::Arc;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:petizo.db";

/// Schedule catalog rows seeded into an empty database: the standard feline
/// kitten series plus the two yearly boosters.
const SEED_SCHEDULES: &[(&str, i64, Option<i64>, bool, Option<i64>, &str)] = &[
    ("FVRCP (1st dose)", 6, Some(8), false, None, "Protects against feline rhinotracheitis, calicivirus, and panleukopenia"),
    ("FVRCP (2nd dose)", 10, Some(12), false, None, "FVRCP immunity booster"),
    ("FVRCP (3rd dose)", 14, Some(16), false, None, "Final kitten immunity booster"),
    ("Rabies", 12, Some(16), false, None, "Protects against rabies - required by law"),
    ("FVRCP Booster", 52, None, true, Some(1), "Yearly booster vaccine"),
    ("Rabies Booster", 52, None, true, Some(1), "Yearly rabies booster vaccine"),
];

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema and seed the schedule catalog
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                breed TEXT,
                gender TEXT CHECK(gender IN ('male', 'female')),
                birth_date TEXT,
                color TEXT,
                weight REAL,
                microchip_id TEXT,
                notes TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vaccine_schedules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                vaccine_name TEXT NOT NULL,
                age_weeks_min INTEGER NOT NULL,
                age_weeks_max INTEGER,
                is_booster INTEGER NOT NULL DEFAULT 0,
                frequency_years INTEGER,
                description TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vaccinations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pet_id INTEGER NOT NULL,
                vaccine_name TEXT NOT NULL,
                vaccine_type TEXT,
                vaccination_date TEXT NOT NULL,
                next_due_date TEXT,
                veterinarian TEXT,
                clinic_name TEXT,
                batch_number TEXT,
                notes TEXT,
                schedule_id INTEGER,
                status TEXT NOT NULL DEFAULT 'completed',
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (pet_id) REFERENCES pets(id) ON DELETE CASCADE,
                FOREIGN KEY (schedule_id) REFERENCES vaccine_schedules(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_pets_user_id ON pets(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_vaccinations_pet_id ON vaccinations(pet_id)",
            "CREATE INDEX IF NOT EXISTS idx_vaccinations_schedule_id ON vaccinations(schedule_id)",
            "CREATE INDEX IF NOT EXISTS idx_vaccine_schedules_age ON vaccine_schedules(age_weeks_min, age_weeks_max)",
        ] {
            sqlx::query(statement).execute(pool).await?;
        }

        Self::seed_schedules(pool).await?;

        Ok(())
    }

    /// Insert the default schedule catalog into an empty database
    async fn seed_schedules(pool: &SqlitePool) -> Result<()> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as n FROM vaccine_schedules")
            .fetch_one(pool)
            .await?
            .get("n");
        if count > 0 {
            return Ok(());
        }

        for (name, min, max, is_booster, frequency, description) in SEED_SCHEDULES {
            sqlx::query(
                "INSERT INTO vaccine_schedules (vaccine_name, age_weeks_min, age_weeks_max, is_booster, frequency_years, description) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(name)
            .bind(min)
            .bind(max)
            .bind(*is_booster as i64)
            .bind(frequency)
            .bind(description)
            .execute(pool)
            .await?;
        }

        Ok(())
    }

    // ---- pets ----

    /// List all pets owned by a user, newest first
    pub async fn list_pets(&self, user_id: i64) -> Result<Vec<Pet>> {
        let rows = sqlx::query("SELECT * FROM pets WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&*self.pool)
            .await?;
        Ok(rows.iter().map(pet_from_row).collect())
    }

    /// Retrieve one pet, scoped to its owner
    pub async fn get_pet(&self, pet_id: i64, user_id: i64) -> Result<Option<Pet>> {
        let row = sqlx::query("SELECT * FROM pets WHERE id = ? AND user_id = ?")
            .bind(pet_id)
            .bind(user_id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(pet_from_row))
    }

    /// Create a pet profile, returning its ID
    pub async fn create_pet(&self, user_id: i64, req: &PetRequest) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO pets (user_id, name, breed, gender, birth_date, color, weight, microchip_id, notes) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&req.name)
        .bind(&req.breed)
        .bind(&req.gender)
        .bind(&req.birth_date)
        .bind(&req.color)
        .bind(req.weight)
        .bind(&req.microchip_id)
        .bind(&req.notes)
        .execute(&*self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Update a pet profile, scoped to its owner. Returns false if no such pet.
    pub async fn update_pet(&self, pet_id: i64, user_id: i64, req: &PetRequest) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE pets SET name = ?, breed = ?, gender = ?, birth_date = ?, color = ?, weight = ?, microchip_id = ?, notes = ?, updated_at = datetime('now') WHERE id = ? AND user_id = ?",
        )
        .bind(&req.name)
        .bind(&req.breed)
        .bind(&req.gender)
        .bind(&req.birth_date)
        .bind(&req.color)
        .bind(req.weight)
        .bind(&req.microchip_id)
        .bind(&req.notes)
        .bind(pet_id)
        .bind(user_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a pet and (via cascade) its vaccination records
    pub async fn delete_pet(&self, pet_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pets WHERE id = ? AND user_id = ?")
            .bind(pet_id)
            .bind(user_id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- vaccine schedules ----

    /// The full schedule catalog, ordered by minimum age
    pub async fn list_schedules(&self) -> Result<Vec<VaccineSchedule>> {
        let rows = sqlx::query("SELECT * FROM vaccine_schedules ORDER BY age_weeks_min ASC")
            .fetch_all(&*self.pool)
            .await?;
        Ok(rows.iter().map(schedule_from_row).collect())
    }

    /// Create a schedule catalog entry, returning its ID
    pub async fn create_schedule(&self, req: &ScheduleRequest) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO vaccine_schedules (vaccine_name, age_weeks_min, age_weeks_max, is_booster, frequency_years, description) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&req.vaccine_name)
        .bind(req.age_weeks_min)
        .bind(req.age_weeks_max)
        .bind(req.is_booster as i64)
        .bind(req.frequency_years)
        .bind(&req.description)
        .execute(&*self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Update a schedule catalog entry. Returns false if no such entry.
    pub async fn update_schedule(&self, schedule_id: i64, req: &ScheduleRequest) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE vaccine_schedules SET vaccine_name = ?, age_weeks_min = ?, age_weeks_max = ?, is_booster = ?, frequency_years = ?, description = ? WHERE id = ?",
        )
        .bind(&req.vaccine_name)
        .bind(req.age_weeks_min)
        .bind(req.age_weeks_max)
        .bind(req.is_booster as i64)
        .bind(req.frequency_years)
        .bind(&req.description)
        .bind(schedule_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a schedule catalog entry
    pub async fn delete_schedule(&self, schedule_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vaccine_schedules WHERE id = ?")
            .bind(schedule_id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- vaccinations ----

    /// Log a vaccine dose for a pet, returning the record ID
    pub async fn record_vaccination(
        &self,
        pet_id: i64,
        req: &RecordVaccinationRequest,
    ) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO vaccinations (pet_id, vaccine_name, vaccine_type, vaccination_date, next_due_date, veterinarian, clinic_name, batch_number, notes, schedule_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(pet_id)
        .bind(&req.vaccine_name)
        .bind(&req.vaccine_type)
        .bind(&req.vaccination_date)
        .bind(&req.next_due_date)
        .bind(&req.veterinarian)
        .bind(&req.clinic_name)
        .bind(&req.batch_number)
        .bind(&req.notes)
        .bind(req.schedule_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Vaccination history for one pet, most recent dose first
    pub async fn list_vaccinations(&self, pet_id: i64) -> Result<Vec<VaccinationRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM vaccinations WHERE pet_id = ? ORDER BY vaccination_date DESC",
        )
        .bind(pet_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows.iter().map(vaccination_from_row).collect())
    }

    /// Delete a vaccination record, scoped to the pet's owner
    pub async fn delete_vaccination(&self, vaccination_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM vaccinations WHERE id = ? AND pet_id IN (SELECT id FROM pets WHERE user_id = ?)",
        )
        .bind(vaccination_id)
        .bind(user_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every pet of a user together with its vaccination history, the
    /// snapshot consumed by the notification aggregator
    pub async fn pets_with_history(&self, user_id: i64) -> Result<Vec<(Pet, Vec<VaccinationRecord>)>> {
        let pets = self.list_pets(user_id).await?;
        let mut result = Vec::with_capacity(pets.len());
        for pet in pets {
            let history = self.list_vaccinations(pet.id).await?;
            result.push((pet, history));
        }
        Ok(result)
    }

    /// All vaccination rows across a user's pets that carry a next due
    /// date, joined to the pet name, ascending by due date. The 30-day
    /// floor and the row cap are applied by the notification service.
    pub async fn due_vaccinations(&self, user_id: i64) -> Result<Vec<DueVaccination>> {
        let rows = sqlx::query(
            r#"
            SELECT v.id, v.pet_id, p.name as pet_name, v.vaccine_name, v.next_due_date, v.is_read
            FROM vaccinations v
            INNER JOIN pets p ON v.pet_id = p.id
            WHERE p.user_id = ?
              AND v.next_due_date IS NOT NULL
              AND v.next_due_date != ''
            ORDER BY v.next_due_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| DueVaccination {
                id: r.get("id"),
                pet_id: r.get("pet_id"),
                pet_name: r.get("pet_name"),
                vaccine_name: r.get("vaccine_name"),
                next_due_date: r.get("next_due_date"),
                is_read: r.get::<i64, _>("is_read") != 0,
            })
            .collect())
    }

    /// Mark a vaccination notification read, scoped to the pet's owner
    pub async fn mark_notification_read(&self, vaccination_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE vaccinations SET is_read = 1 WHERE id = ? AND pet_id IN (SELECT id FROM pets WHERE user_id = ?)",
        )
        .bind(vaccination_id)
        .bind(user_id)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn pet_from_row(r: &SqliteRow) -> Pet {
    Pet {
        id: r.get("id"),
        user_id: r.get("user_id"),
        name: r.get("name"),
        breed: r.get("breed"),
        gender: r.get("gender"),
        birth_date: r.get("birth_date"),
        color: r.get("color"),
        weight: r.get("weight"),
        microchip_id: r.get("microchip_id"),
        notes: r.get("notes"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn schedule_from_row(r: &SqliteRow) -> VaccineSchedule {
    VaccineSchedule {
        id: r.get("id"),
        vaccine_name: r.get("vaccine_name"),
        age_weeks_min: r.get("age_weeks_min"),
        age_weeks_max: r.get("age_weeks_max"),
        is_booster: r.get::<i64, _>("is_booster") != 0,
        frequency_years: r.get("frequency_years"),
        description: r.get("description"),
    }
}

fn vaccination_from_row(r: &SqliteRow) -> VaccinationRecord {
    VaccinationRecord {
        id: r.get("id"),
        pet_id: r.get("pet_id"),
        vaccine_name: r.get("vaccine_name"),
        vaccine_type: r.get("vaccine_type"),
        vaccination_date: r.get("vaccination_date"),
        next_due_date: r.get("next_due_date"),
        veterinarian: r.get("veterinarian"),
        clinic_name: r.get("clinic_name"),
        batch_number: r.get("batch_number"),
        notes: r.get("notes"),
        schedule_id: r.get("schedule_id"),
        is_read: r.get::<i64, _>("is_read") != 0,
        created_at: r.get("created_at"),
    }
}
