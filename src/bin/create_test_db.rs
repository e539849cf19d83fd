use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use prime_finance::{
    Amount, CategoryId, Email, LedgerStore, PasswordHash, PaymentStatus, Period,
    SQLiteLedgerStore, ValidatedEntry, ValidatedPassword, create_user, initialize_db,
};

/// A utility for creating a test database for the PrimeFinance server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const INCOME: CategoryId = CategoryId::new(1);
const EXPENSE: CategoryId = CategoryId::new(2);

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        "Test User",
        Email::new_unchecked("test@example.com"),
        password_hash,
        &conn,
    )?;

    println!("Creating sample entries...");

    let store = SQLiteLedgerStore::new(Arc::new(Mutex::new(conn)));
    let this_month = Period::containing(OffsetDateTime::now_utc().date());
    let last_month = this_month.previous().unwrap_or(this_month);

    for period in [last_month, this_month] {
        let first_day = period.first_day();
        let samples = [
            ("Salário", 650000, INCOME, 4, true),
            ("Aluguel", 180000, EXPENSE, 9, true),
            ("Conta de luz", 21450, EXPENSE, 14, false),
            ("Mercado", 68990, EXPENSE, 19, false),
            ("Freelance", 120000, INCOME, 24, false),
        ];

        for (description, cents, category_id, day_offset, paid) in samples {
            let posted_date = first_day + Duration::days(day_offset);
            let amount = Amount::new(Decimal::new(cents, 2)).ok_or("sample amounts are positive")?;

            store.create(
                user.id,
                &ValidatedEntry {
                    description: description.to_owned(),
                    amount,
                    category_id,
                    posted_date,
                    payment: if paid {
                        PaymentStatus::Paid(posted_date)
                    } else {
                        PaymentStatus::Pending
                    },
                },
            )?;
        }
    }

    println!("Success! Log in as test@example.com with the password \"test\".");

    Ok(())
}
