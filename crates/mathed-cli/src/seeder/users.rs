//! Demo account seeding.
//!
//! Generates active students (consent already approved) and teachers with
//! fake names. Every demo address ends in `@example.com`, which is what
//! [`clear_demo_users`] keys on.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Utc};
use fake::Fake;
use fake::faker::name::en::*;
use mathed_models::{UserType, generate_referral_code};
use rand::Rng;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{DemoUsersConfig, UserSeed};

const DEMO_SCHOOLS: &[&str] = &[
    "Școala Gimnazială nr. 1",
    "Colegiul Național „Mihai Viteazul”",
    "Școala Gimnazială „Ion Creangă”",
    "Liceul Teoretic „Tudor Vianu”",
];

/// Builds student seeds; grade and birth year line up (grade 5 is about 11).
pub fn generate_students(count: usize, password_hash: &str) -> Vec<UserSeed> {
    let this_year = Utc::now().date_naive().year();

    (0..count)
        .into_par_iter()
        .map(|idx| {
            let mut rng = rand::thread_rng();
            let grade: i16 = rng.gen_range(5..=8);
            let birth_year = this_year - 6 - i32::from(grade);
            let birth_date = NaiveDate::from_ymd_opt(
                birth_year,
                rng.gen_range(1..=12),
                rng.gen_range(1..=28),
            );

            let mut seed = generate_user(UserType::Student, idx, password_hash);
            seed.grade = Some(grade);
            seed.birth_date = birth_date;
            seed
        })
        .collect()
}

/// Builds teacher seeds with distinct referral codes.
pub fn generate_teachers(count: usize, password_hash: &str) -> Vec<UserSeed> {
    let mut teachers: Vec<UserSeed> = (0..count)
        .into_par_iter()
        .map(|idx| {
            let mut seed = generate_user(UserType::Teacher, idx, password_hash);
            seed.school_name = Some(DEMO_SCHOOLS[idx % DEMO_SCHOOLS.len()].to_string());
            seed
        })
        .collect();

    let mut rng = rand::thread_rng();
    let mut used = HashSet::with_capacity(count);
    for teacher in &mut teachers {
        let code = loop {
            let candidate = generate_referral_code(&mut rng);
            if used.insert(candidate.clone()) {
                break candidate;
            }
        };
        teacher.referral_code = Some(code);
    }

    teachers
}

fn generate_user(user_type: UserType, idx: usize, password_hash: &str) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let email = format!(
        "{}.{}+{}{}@example.com",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        user_type.as_str(),
        idx
    );

    UserSeed {
        first_name,
        last_name,
        email,
        password_hash: password_hash.to_string(),
        user_type,
        grade: None,
        birth_date: None,
        referral_code: None,
        school_name: None,
    }
}

/// Seeds demo students and teachers; returns how many accounts were created.
pub async fn seed_demo_users(
    db: &PgPool,
    config: DemoUsersConfig,
) -> Result<usize, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "👥 Seeding {} students and {} teachers...",
        config.students, config.teachers
    );

    // Low cost: these accounts exist for local development only.
    let password_hash = bcrypt::hash(&config.password, 4)?;

    let students = generate_students(config.students, &password_hash);
    let teachers = generate_teachers(config.teachers, &password_hash);

    let mut tx = db.begin().await?;

    let student_ids = insert_users_batch(&mut tx, &students).await?;
    insert_student_profiles(&mut tx, &student_ids, &students).await?;

    let teacher_ids = insert_users_batch(&mut tx, &teachers).await?;
    insert_teacher_profiles(&mut tx, &teacher_ids, &teachers).await?;

    tx.commit().await?;

    let total = student_ids.len() + teacher_ids.len();
    println!(
        "   ✓ Inserted {} demo accounts in {:?}",
        total,
        start_time.elapsed()
    );
    println!("   Password for every demo account: {}", config.password);

    Ok(total)
}

// 5 params per user
const USER_BATCH_SIZE: usize = 1000;

async fn insert_users_batch(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let mut ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(USER_BATCH_SIZE) {
        let mut query = String::from(
            "INSERT INTO users (first_name, last_name, email, password, user_type) VALUES ",
        );

        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 5;
            query.push_str(&format!(
                "(${}, ${}, ${}, ${}, ${})",
                p + 1,
                p + 2,
                p + 3,
                p + 4,
                p + 5
            ));
        }

        // Multi-row VALUES keeps input order in RETURNING for a plain INSERT.
        query.push_str(" RETURNING id");

        let mut q = sqlx::query_scalar::<_, Uuid>(&query);
        for user in chunk {
            q = q
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.user_type);
        }

        ids.extend(q.fetch_all(&mut **tx).await?);
    }

    Ok(ids)
}

async fn insert_student_profiles(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
    students: &[UserSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<_> = ids.iter().zip(students).collect();

    for chunk in rows.chunks(USER_BATCH_SIZE) {
        let mut query = String::from(
            "INSERT INTO student_profiles (user_id, grade, birth_date, consent_status, consent_date) VALUES ",
        );

        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 3;
            query.push_str(&format!(
                "(${}, ${}, ${}, 'approved', NOW())",
                p + 1,
                p + 2,
                p + 3
            ));
        }

        let mut q = sqlx::query(&query);
        for (id, seed) in chunk {
            q = q.bind(**id).bind(seed.grade).bind(seed.birth_date);
        }

        q.execute(&mut **tx).await?;
    }

    Ok(())
}

async fn insert_teacher_profiles(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
    teachers: &[UserSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<_> = ids.iter().zip(teachers).collect();

    for chunk in rows.chunks(USER_BATCH_SIZE) {
        let mut query = String::from(
            "INSERT INTO teacher_profiles (user_id, referral_code, school_name) VALUES ",
        );

        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 3;
            query.push_str(&format!("(${}, ${}, ${})", p + 1, p + 2, p + 3));
        }

        let mut q = sqlx::query(&query);
        for (id, seed) in chunk {
            q = q
                .bind(**id)
                .bind(seed.referral_code.as_deref())
                .bind(seed.school_name.as_deref().unwrap_or_default());
        }

        q.execute(&mut **tx).await?;
    }

    Ok(())
}

/// Deletes demo accounts (`@example.com`, never admins). Profiles cascade.
pub async fn clear_demo_users(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing demo users...");

    let deleted = sqlx::query(
        "DELETE FROM users WHERE email LIKE '%@example.com' AND user_type <> 'admin'",
    )
    .execute(db)
    .await?
    .rows_affected();

    println!(
        "   ✓ Deleted {} users in {:?}",
        deleted,
        start_time.elapsed()
    );

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_students() {
        let students = generate_students(20, "hash");
        assert_eq!(students.len(), 20);
        for s in &students {
            assert_eq!(s.user_type, UserType::Student);
            let grade = s.grade.unwrap();
            assert!((5..=8).contains(&grade));
            assert!(s.birth_date.is_some());
            assert!(s.email.ends_with("@example.com"));
            assert!(s.referral_code.is_none());
        }
    }

    #[test]
    fn test_generate_teachers_have_unique_codes() {
        let teachers = generate_teachers(30, "hash");
        let codes: HashSet<_> = teachers
            .iter()
            .map(|t| t.referral_code.clone().unwrap())
            .collect();
        assert_eq!(codes.len(), 30);
        assert!(teachers.iter().all(|t| t.school_name.is_some()));
    }

    #[test]
    fn test_demo_emails_are_unique_per_type() {
        let students = generate_students(10, "hash");
        let emails: HashSet<_> = students.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(emails.len(), 10);
    }
}
