use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use spendwise::{
    CategoryColor, CategoryIcon, CategoryName, Email, NewExpense, PasswordHash, ValidatedPassword,
    create_category, create_expense, create_user, currency::Currency, initialize_db,
};

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "demo";

/// (name, icon, colour) of the categories every demo user starts with.
const DEFAULT_CATEGORIES: [(&str, &str, &str); 6] = [
    ("Food & Dining", "🍽️", "#ef4444"),
    ("Transport", "🚗", "#3b82f6"),
    ("Shopping", "🛍️", "#8b5cf6"),
    ("Entertainment", "🎬", "#f59e0b"),
    ("Bills & Utilities", "💡", "#10b981"),
    ("Healthcare", "🏥", "#ec4899"),
];

/// (days ago, amount, currency, description, index into DEFAULT_CATEGORIES)
const DEMO_EXPENSES: [(i64, f64, Currency, &str, Option<usize>); 12] = [
    (0, 45_000.0, Currency::Uzs, "Plov for lunch", Some(0)),
    (1, 12.5, Currency::Usd, "Taxi to the office", Some(1)),
    (3, 250_000.0, Currency::Uzs, "Groceries", Some(0)),
    (6, 39.99, Currency::Usd, "Headphones", Some(2)),
    (9, 8.0, Currency::Usd, "Cinema ticket", Some(3)),
    (14, 320_000.0, Currency::Uzs, "Electricity bill", Some(4)),
    (21, 15.0, Currency::Usd, "Birthday card", None),
    (33, 60_000.0, Currency::Uzs, "Pharmacy", Some(5)),
    (40, 22.0, Currency::Usd, "Metro card top up", Some(1)),
    (47, 180_000.0, Currency::Uzs, "Dinner with friends", Some(0)),
    (65, 49.0, Currency::Usd, "Internet", Some(4)),
    (80, 95_000.0, Currency::Uzs, "Concert", Some(3)),
];

/// A utility for creating a database with demo data for spendwise.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'spendwise.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user {DEMO_EMAIL}...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Email::new(DEMO_EMAIL)?, password_hash, &conn)?;

    println!("Creating default categories...");
    let mut category_ids = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for (name, icon, color) in DEFAULT_CATEGORIES {
        let category = create_category(
            CategoryName::new(name)?,
            CategoryIcon::new(icon)?,
            CategoryColor::new(color)?,
            user.id,
            &conn,
        )?;
        category_ids.push(category.id);
    }

    println!("Creating expenses...");
    let today = OffsetDateTime::now_utc().date();
    for (days_ago, amount, currency, description, category) in DEMO_EXPENSES {
        let category_id = category.and_then(|index| category_ids.get(index).copied());
        let expense = NewExpense::build(amount, currency, today - Duration::days(days_ago))
            .description(description)
            .category_id(category_id);

        create_expense(expense, user.id, &conn)?;
    }

    println!("Success! Log in with {DEMO_EMAIL} and the password '{DEMO_PASSWORD}'.");

    Ok(())
}
