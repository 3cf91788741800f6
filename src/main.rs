use anyhow::{Context, Result};
use clap::Parser;
use rustmemento::{NumObj, Transaction, TransactionConfig, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Walks a numeric object through commit, rollback and a failing
/// transactional method, printing its state at every step.
#[derive(Parser, Debug)]
#[command(name = "rustmemento")]
#[command(about = "Memento and transaction rollback demonstration")]
struct Args {
    /// Initial value of the object
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    start: i64,

    /// Capture shallow copies in the transaction instead of deep ones
    #[arg(long)]
    shallow: bool,

    /// Print object state as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn print_state(num_obj: &NumObj, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(num_obj)?);
    } else {
        println!("{}", num_obj);
    }
    Ok(())
}

fn increment_and_fail(
    num_obj: &Rc<RefCell<NumObj>>,
    transaction: &mut Transaction,
    json: bool,
) -> Result<()> {
    for _ in 0..3 {
        num_obj.borrow_mut().increment()?;
        print_state(&num_obj.borrow(), json)?;
    }
    transaction.commit()?;
    println!("--- committed");

    for _ in 0..3 {
        num_obj.borrow_mut().increment()?;
        print_state(&num_obj.borrow(), json)?;
    }

    let mut obj = num_obj.borrow_mut();
    let next = obj.value().add(&Value::from("x"))?;
    obj.set_value(next);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level: Level = args
        .log_level
        .parse()
        .with_context(|| format!("invalid log level '{}'", args.log_level))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let num_obj = Rc::new(RefCell::new(NumObj::new(args.start)));
    print_state(&num_obj.borrow(), args.json)?;

    let mut transaction = TransactionConfig::new()
        .deep(!args.shallow)
        .target(Rc::clone(&num_obj))
        .begin()?;

    if increment_and_fail(&num_obj, &mut transaction, args.json).is_err() {
        transaction.rollback()?;
        println!("--- rolled back");
    }
    print_state(&num_obj.borrow(), args.json)?;

    println!("-- now doing stuff ...");
    let outcome = num_obj.borrow_mut().do_stuff();
    if let Err(err) = outcome {
        println!("-> doing stuff failed!");
        println!("{}", err);
    }
    print_state(&num_obj.borrow(), args.json)?;

    Ok(())
}
