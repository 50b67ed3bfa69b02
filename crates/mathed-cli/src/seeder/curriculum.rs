//! Grade 5 curriculum seeding.
//!
//! Creates the grade, its 8 units (published), 49 lessons (unpublished
//! placeholders until content is written) and one unpublished test per unit.
//! Existing rows are left untouched, so the command can be re-run safely;
//! `--flush` deletes the grade and everything under it first.

use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{CurriculumSeedReport, TestSeed, UnitSeed};

pub const GRADE_5_NUMBER: i16 = 5;
pub const GRADE_5_NAME: &str = "Clasa a V-a";

const fn unit_test(time_limit_minutes: i32, exercise_count: i32) -> TestSeed {
    TestSeed {
        pass_threshold: 70,
        time_limit_minutes,
        exercise_count,
    }
}

pub const GRADE_5_CURRICULUM: &[UnitSeed] = &[
    UnitSeed {
        order: 1,
        title: "Numere Naturale",
        description: "Natural Numbers — operations, properties, powers, number bases, order of operations.",
        lessons: &[
            ("Scrierea și citirea numerelor naturale", "Writing and reading natural numbers"),
            ("Reprezentarea pe axa numerelor; compararea și ordonarea", "Number line representation; comparing and ordering"),
            ("Aproximări și probleme de estimare", "Approximations and estimation problems"),
            ("Adunarea numerelor naturale; proprietăți", "Addition of natural numbers; properties"),
            ("Scăderea numerelor naturale", "Subtraction of natural numbers"),
            ("Înmulțirea numerelor naturale; proprietăți; factor comun", "Multiplication; properties; common factor"),
            ("Împărțirea cu rest 0 și cu rest a numerelor naturale; teorema împărțirii", "Division with and without remainder; division theorem"),
            ("Ridicarea la putere cu exponent natural; reguli de calcul cu puteri; pătratul și cubul", "Powers with natural exponent; calculation rules; squares and cubes"),
            ("Baze de numerație: scrierea în baza 10 și baza 2", "Number bases: writing in base 10 and base 2"),
            ("Ordinea efectuării operațiilor", "Order of operations"),
        ],
        test: unit_test(45, 15),
    },
    UnitSeed {
        order: 2,
        title: "Metode Aritmetice de Rezolvare a Problemelor",
        description: "Arithmetic Problem-Solving Methods — five classical methods for solving word problems.",
        lessons: &[
            ("Metoda reducerii la unitate", "Reduction to unity method"),
            ("Metoda comparației", "Comparison method"),
            ("Metoda figurativă", "Figurative/diagram method"),
            ("Metoda mersului invers", "Reverse/working backwards method"),
            ("Metoda falsei ipoteze", "False hypothesis method"),
        ],
        test: unit_test(40, 10),
    },
    UnitSeed {
        order: 3,
        title: "Divizibilitatea Numerelor Naturale",
        description: "Divisibility of Natural Numbers — divisors, multiples, divisibility criteria, primes.",
        lessons: &[
            ("Noțiunea de divizor și multiplu", "Concept of divisor and multiple"),
            ("Divizori comuni; multipli comuni", "Common divisors; common multiples"),
            ("Criteriile de divizibilitate cu 2, 5 și 10", "Divisibility criteria for 2, 5, and 10"),
            ("Criteriile de divizibilitate cu 3 și 9", "Divisibility criteria for 3 and 9"),
            ("Numere prime și numere compuse", "Prime and composite numbers"),
        ],
        test: unit_test(40, 10),
    },
    UnitSeed {
        order: 4,
        title: "Fracții Ordinare",
        description: "Ordinary Fractions — concepts, representation, operations, powers, percentages.",
        lessons: &[
            ("Fracții ordinare: fracții echiunitare, subunitare, supraunitare; comparare", "Ordinary fractions: unit, proper, improper; comparison"),
            ("Reprezentarea pe axa numerelor; introducerea și scoaterea întregilor", "Number line; introducing and extracting whole parts"),
            ("Amplificarea fracțiilor", "Amplifying fractions"),
            ("Simplificarea fracțiilor; CMMDC", "Simplifying fractions; GCD"),
            ("Aducerea la numitor comun; CMMMC", "Common denominator; LCM"),
            ("Adunarea și scăderea fracțiilor ordinare", "Addition and subtraction of ordinary fractions"),
            ("Înmulțirea și împărțirea fracțiilor ordinare", "Multiplication and division of ordinary fractions"),
            ("Puterea cu exponent natural a unei fracții; fracții/procente dintr-un număr", "Powers of fractions; fractions/percentages of a number"),
        ],
        test: unit_test(50, 15),
    },
    UnitSeed {
        order: 5,
        title: "Fracții Zecimale",
        description: "Decimal Fractions — operations, conversions, arithmetic mean, rational numbers.",
        lessons: &[
            ("Fracții zecimale: concept, comparare, ordonare, reprezentare pe axă", "Decimal fractions: concept, comparison, ordering, number line"),
            ("Aproximări la ordinul zecimilor/sutimilor", "Approximations to tenths/hundredths"),
            ("Adunarea și scăderea fracțiilor zecimale finite", "Addition and subtraction of finite decimal fractions"),
            ("Înmulțirea fracțiilor zecimale finite; puterea cu exponent natural", "Multiplication; powers with natural exponent"),
            ("Împărțirea unei fracții zecimale la un număr natural nenul", "Dividing a decimal fraction by a nonzero natural number"),
            ("Împărțirea a două fracții zecimale finite nenule", "Dividing two nonzero finite decimal fractions"),
            ("Transformări între fracții ordinare și zecimale; fracții zecimale periodice", "Conversions between ordinary and decimal fractions; periodic decimals"),
            ("Media aritmetică; număr rațional pozitiv; ordinea operațiilor cu numere raționale pozitive", "Arithmetic mean; positive rational numbers; order of operations"),
        ],
        test: unit_test(50, 15),
    },
    UnitSeed {
        order: 6,
        title: "Probleme Practice",
        description: "Practical Problems — fraction word problems, data organization, statistics.",
        lessons: &[
            ("Metode aritmetice pentru rezolvarea problemelor cu fracții", "Arithmetic methods for fraction problems"),
            ("Probleme de organizarea datelor; frecvență; date statistice în tabele și grafice", "Data organization; frequency; statistical data in tables and graphs"),
            ("Media unui set de date statistice", "Mean of a statistical data set"),
        ],
        test: unit_test(40, 10),
    },
    UnitSeed {
        order: 7,
        title: "Elemente de Geometrie",
        description: "Geometry Elements — points, lines, segments, angles, symmetry.",
        lessons: &[
            ("Punct, dreaptă, plan, semidreaptă, segment; poziții relative", "Points, lines, planes, rays, segments; relative positions"),
            ("Lungimea unui segment; segmente congruente; mijlocul segmentului", "Segment length; congruent segments; midpoint"),
            ("Unghiul: definiție, măsură, unghiuri congruente", "Angles: definition, measurement, congruent angles"),
            ("Clasificări de unghiuri: drept, ascuțit, obtuz, nul, alungit", "Angle classification: right, acute, obtuse, null, straight"),
            ("Calcule cu măsuri de unghiuri în grade și minute sexagesimale", "Calculations with angle measures in degrees and minutes"),
            ("Figuri congruente; simetria față de o dreaptă; axa de simetrie", "Congruent figures; line symmetry; axis of symmetry"),
        ],
        test: unit_test(45, 12),
    },
    UnitSeed {
        order: 8,
        title: "Unități de Măsură",
        description: "Units of Measurement — length, area, volume; conversions and applications.",
        lessons: &[
            ("Unități de măsură pentru lungime; transformări; calcul de perimetre", "Length units; conversions; perimeter calculations"),
            ("Unități de măsură pentru arie; aria pătratului și dreptunghiului; transformări", "Area units; square and rectangle area; conversions"),
            ("Unități de măsură pentru volum; volumul cubului și paralelipipedului dreptunghic; transformări", "Volume units; cube and rectangular parallelepiped volume; conversions"),
            ("Aplicații complexe cu unități de măsură", "Complex applications with units of measurement"),
        ],
        test: unit_test(45, 12),
    },
];

/// Markdown stub for a lesson whose content has not been written yet.
pub fn placeholder_content(title: &str) -> String {
    format!("# {}\n\nConținut în curs de elaborare.", title)
}

/// Seeds Grade 5 inside a single transaction.
pub async fn seed_grade5(
    db: &PgPool,
    flush: bool,
) -> Result<CurriculumSeedReport, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;
    let mut report = CurriculumSeedReport::default();

    if flush {
        println!("🗑️  Flushing existing Grade 5 data...");
        sqlx::query("DELETE FROM grades WHERE number = $1")
            .bind(GRADE_5_NUMBER)
            .execute(&mut *tx)
            .await?;
    }

    let (grade_id, grade_created): (i64, bool) = sqlx::query_as(
        "INSERT INTO grades (number, name, is_active) VALUES ($1, $2, TRUE)
         ON CONFLICT (number) DO UPDATE SET is_active = TRUE
         RETURNING id, (xmax = 0) AS inserted",
    )
    .bind(GRADE_5_NUMBER)
    .bind(GRADE_5_NAME)
    .fetch_one(&mut *tx)
    .await?;
    report.grade_created = grade_created;

    if !grade_created {
        println!("⚠️  Grade 5 already exists. Updating...");
    }

    for unit in GRADE_5_CURRICULUM {
        let (unit_id, created) = get_or_create_unit(&mut tx, grade_id, unit).await?;
        if created {
            report.units_created += 1;
        }
        println!(
            "   {} Unit {}: {}",
            if created { "Created" } else { "Found" },
            unit.order,
            unit.title
        );

        for (idx, (title, summary)) in unit.lessons.iter().enumerate() {
            let inserted = sqlx::query(
                r#"INSERT INTO lessons (unit_id, "order", title, summary, content, is_published, practice_minimum)
                   VALUES ($1, $2, $3, $4, $5, FALSE, 5)
                   ON CONFLICT (unit_id, "order") DO NOTHING"#,
            )
            .bind(unit_id)
            .bind(idx as i32 + 1)
            .bind(title)
            .bind(summary)
            .bind(placeholder_content(title))
            .execute(&mut *tx)
            .await?
            .rows_affected();
            report.lessons_created += inserted as usize;
        }

        let inserted = sqlx::query(
            "INSERT INTO tests (unit_id, pass_threshold, time_limit_minutes, exercise_count, is_published)
             VALUES ($1, $2, $3, $4, FALSE)
             ON CONFLICT (unit_id) DO NOTHING",
        )
        .bind(unit_id)
        .bind(unit.test.pass_threshold)
        .bind(unit.test.time_limit_minutes)
        .bind(unit.test.exercise_count)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        report.tests_created += inserted as usize;
    }

    tx.commit().await?;

    println!(
        "   ✓ Created {} lessons and {} tests across {} units for Grade 5 in {:?}",
        report.lessons_created,
        report.tests_created,
        GRADE_5_CURRICULUM.len(),
        start_time.elapsed()
    );

    Ok(report)
}

async fn get_or_create_unit(
    tx: &mut Transaction<'_, Postgres>,
    grade_id: i64,
    unit: &UnitSeed,
) -> Result<(i64, bool), sqlx::Error> {
    let inserted: Option<i64> = sqlx::query_scalar(
        r#"INSERT INTO units (grade_id, "order", title, description, is_published)
           VALUES ($1, $2, $3, $4, TRUE)
           ON CONFLICT (grade_id, "order") DO NOTHING
           RETURNING id"#,
    )
    .bind(grade_id)
    .bind(unit.order)
    .bind(unit.title)
    .bind(unit.description)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(id) = inserted {
        return Ok((id, true));
    }

    let id: i64 = sqlx::query_scalar(r#"SELECT id FROM units WHERE grade_id = $1 AND "order" = $2"#)
        .bind(grade_id)
        .bind(unit.order)
        .fetch_one(&mut **tx)
        .await?;

    Ok((id, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curriculum_shape() {
        assert_eq!(GRADE_5_CURRICULUM.len(), 8);
        let lessons: usize = GRADE_5_CURRICULUM.iter().map(|u| u.lessons.len()).sum();
        assert_eq!(lessons, 49);
    }

    #[test]
    fn test_unit_orders_are_sequential() {
        for (idx, unit) in GRADE_5_CURRICULUM.iter().enumerate() {
            assert_eq!(unit.order, idx as i32 + 1);
            assert_eq!(unit.test.pass_threshold, 70);
        }
    }

    #[test]
    fn test_placeholder_content() {
        assert_eq!(
            placeholder_content("Metoda comparației"),
            "# Metoda comparației\n\nConținut în curs de elaborare."
        );
    }
}
