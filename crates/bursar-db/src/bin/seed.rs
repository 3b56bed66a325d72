//! # Seed Data Generator
//!
//! Populates a development database with classes, fees, students and a
//! spread of payments.
//!
//! ## Usage
//! ```bash
//! # 20 students per class (default)
//! cargo run -p bursar-db --bin seed
//!
//! # Custom amount
//! cargo run -p bursar-db --bin seed -- --students 50
//!
//! # Specify database path
//! cargo run -p bursar-db --bin seed -- --db ./data/bursar.db
//! ```
//!
//! ## Generated Data
//! - Classes 1 to 10, each with an Annual Fee, a Monthly Fee and an Exam Fee
//! - Students with deterministic names, guardians and villages
//! - Payments: some students fully paid, some partly, some not at all

use chrono::NaiveDate;
use std::env;

use bursar_core::validation::{self, PaymentFields, StudentFields};
use bursar_core::{ANNUAL_FEE, MONTHLY_FEE};
use bursar_db::{Database, DbConfig};

const CLASS_COUNT: i64 = 10;

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Asha", "Ravi", "Meera", "Kiran", "Divya", "Arjun", "Lakshmi", "Rohan", "Priya",
    "Vikram", "Ananya", "Suresh", "Kavya", "Manoj", "Nisha",
];

const SURNAMES: &[&str] = &["Rao", "Reddy", "Naidu", "Sharma", "Patel", "Iyer", "Das", "Gowda"];

const VILLAGES: &[&str] = &["Kondapur", "Hill Top", "Ramnagar", "Lakeside", "Old Town"];

const PAYMENT_MODES: &[&str] = &["Cash", "UPI", "Cheque", "Bank Transfer"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut per_class: usize = 20;
    let mut db_path = String::from("./bursar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--students" | "-s" => {
                if i + 1 < args.len() {
                    per_class = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bursar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --students <N>  Students per class (default: 20)");
                println!("  -d, --db <PATH>     Database file path (default: ./bursar_dev.db)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bursar Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Students per class: {}", per_class);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.classes().list().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} classes", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut students = 0;
    let mut payments = 0;

    for class_no in 1..=CLASS_COUNT {
        let label = format!("Class {class_no}");
        db.classes().insert(&class_no.to_string(), &label).await?;

        let annual = class_fee(&db, &label, ANNUAL_FEE, 300_000 + class_no * 50_000).await?;
        let monthly = class_fee(&db, &label, MONTHLY_FEE, 40_000 + class_no * 5_000).await?;
        let exam = class_fee(&db, &label, "Exam Fee", 15_000).await?;

        for n in 0..per_class {
            let seed = class_no as usize * 1000 + n;
            let student_id = match add_student(&db, &label, seed).await {
                Ok(id) => id,
                Err(e) => {
                    eprintln!("Failed to insert student {}: {}", seed, e);
                    continue;
                }
            };
            students += 1;

            // A third pay everything, a third pay part, a third nothing yet.
            let plan = seed % 3;
            match plan {
                0 => {
                    pay(&db, annual.0, student_id, annual.1, 4, seed).await?;
                    pay(&db, exam.0, student_id, exam.1, 9, seed).await?;
                    for month in 4..=9 {
                        pay(&db, monthly.0, student_id, monthly.1, month, seed).await?;
                    }
                    payments += 8;
                }
                1 => {
                    pay(&db, annual.0, student_id, annual.1 / 2, 4, seed).await?;
                    let one_and_a_half = monthly.1 + monthly.1 / 2;
                    pay(&db, monthly.0, student_id, one_and_a_half, 5, seed).await?;
                    payments += 2;
                }
                _ => {}
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} classes, {} students, {} payments in {:?}",
        CLASS_COUNT, students, payments, elapsed
    );

    let total = db.dashboard().total_collections().await?;
    let pending = db.dashboard().pending_fees().await?;
    println!("  Total collections: {}", total);
    println!("  Pending fee rows: {}", pending.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Defines a fee and returns `(fee_id, amount_cents)`.
async fn class_fee(
    db: &Database,
    class: &str,
    fee_type: &str,
    cents: i64,
) -> Result<(i64, i64), Box<dyn std::error::Error>> {
    let fee = validation::new_fee(Some(class), Some(fee_type), Some(cents))?;
    let fee_id = db.fees().insert(&fee).await?;
    Ok((fee_id, cents))
}

async fn pay(
    db: &Database,
    fee_id: i64,
    student_id: i64,
    cents: i64,
    month: u32,
    seed: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let date = NaiveDate::from_ymd_opt(2024, month, 1 + (seed % 27) as u32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "2024-04-01".to_string());

    let payment = validation::new_payment(PaymentFields {
        fee_id: Some(fee_id),
        student_id: Some(student_id),
        payment_date: Some(&date),
        payment_mode: Some(PAYMENT_MODES[seed % PAYMENT_MODES.len()]),
        amount_paid_cents: Some(cents),
    })?;
    db.payments().create(&payment).await?;
    Ok(())
}

async fn add_student(
    db: &Database,
    class: &str,
    seed: usize,
) -> Result<i64, Box<dyn std::error::Error>> {
    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let surname = SURNAMES[(seed / FIRST_NAMES.len()) % SURNAMES.len()];
    let name = format!("{first} {surname} {seed}");
    let father = format!("{} {}", FIRST_NAMES[(seed + 3) % FIRST_NAMES.len()], surname);
    let mother = format!("{} {}", FIRST_NAMES[(seed + 7) % FIRST_NAMES.len()], surname);
    let contact = format!("98{:08}", seed);
    let email = format!("{}.{}{}@example.com", first.to_lowercase(), surname.to_lowercase(), seed);

    let student = validation::new_student(StudentFields {
        name: Some(&name),
        class_description: Some(class),
        father_name: Some(&father),
        mother_name: Some(&mother),
        village: Some(VILLAGES[seed % VILLAGES.len()]),
        contact_info: Some(&contact),
        email: Some(&email),
    })?;

    Ok(db.students().insert(&student).await?)
}
