use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use memorm::sql::{CreateQueryBuilder, DropQueryBuilder};
use memorm::{Dialect, Entity, EntityManager, InMemoryDB, MergeOutcome, OrmConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memorm")]
#[command(about = "Entity mapping and unit-of-work demo for memorm")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print CREATE and DROP statements for the demo entity
    Ddl {
        #[arg(long, value_enum, default_value_t = DialectArg::H2)]
        dialect: DialectArg,
        #[arg(long)]
        if_not_exists: bool,
    },
    /// Run a persist/find/merge/remove session against an in-memory database
    Demo {
        #[arg(long)]
        show_sql: bool,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    H2,
    Postgres,
}

impl From<DialectArg> for Dialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::H2 => Dialect::H2,
            DialectArg::Postgres => Dialect::Postgres,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Entity)]
#[entity(table = "users")]
struct User {
    #[id(generated)]
    id: Option<i64>,
    #[column(name = "nick_name")]
    name: String,
    #[column(name = "old")]
    age: i32,
    #[column(nullable = false)]
    email: String,
    #[column(skip)]
    logged_in: bool,
}

impl User {
    fn new(name: &str, age: i32, email: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            age,
            email: email.to_string(),
            logged_in: false,
        }
    }
}

#[derive(Serialize)]
struct DemoReport {
    statements: Vec<String>,
    merges: Vec<MergeOutcome>,
    context: Vec<ContextEntry>,
}

#[derive(Serialize)]
struct ContextEntry {
    key: String,
    status: memorm::EntityStatus,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ddl {
            dialect,
            if_not_exists,
        } => {
            init_tracing(false);
            print_ddl(dialect.into(), if_not_exists);
            Ok(())
        }
        Command::Demo { show_sql, json } => {
            init_tracing(show_sql);
            let report = run_demo(show_sql)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("failed to render report")?
                );
            } else {
                print_report(&report);
            }
            Ok(())
        }
    }
}

fn init_tracing(show_sql: bool) {
    let default_directive = if show_sql { "warn,memorm::sql=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_ddl(dialect: Dialect, if_not_exists: bool) {
    let metadata = User::metadata();
    println!(
        "{}",
        CreateQueryBuilder::new(metadata, dialect)
            .if_not_exists(if_not_exists)
            .build()
    );
    println!("{}", DropQueryBuilder::new(metadata).build());
}

fn run_demo(show_sql: bool) -> Result<DemoReport> {
    let config = OrmConfig::new().show_sql(show_sql);
    let mut em = EntityManager::with_config(InMemoryDB::new(), config);
    let mut merges = Vec::new();

    em.create_table::<User>().context("failed to create users table")?;

    let mut user = User::new("sangki", 29, "test@test.com");
    em.persist(&mut user).context("persist failed")?;
    let id = user.id.context("persist did not assign an id")?;

    let found: User = em.find(id).context("find failed")?;
    if found != user {
        bail!("identity map returned {:?}, expected {:?}", found, user);
    }

    // transient fields never reach the diff
    user.logged_in = true;
    tracing::debug!(user = %user.name, logged_in = user.logged_in, "session user");
    merges.push(em.merge(&user).context("merge failed")?);
    user.age = 30;
    user.email = "sangki@test.com".to_string();
    merges.push(em.merge(&user).context("merge failed")?);

    let mut other = User::new("kim", 41, "kim@test.com");
    em.persist(&mut other).context("persist failed")?;
    em.remove(&other).context("remove failed")?;

    let mut context = em
        .context()
        .entries()
        .map(|(key, entry)| ContextEntry {
            key: key.to_string(),
            status: entry.status(),
        })
        .collect::<Vec<_>>();
    context.sort_by(|a, b| a.key.cmp(&b.key));

    let statements = em.into_executor().executed_statements().to_vec();

    Ok(DemoReport {
        statements,
        merges,
        context,
    })
}

fn print_report(report: &DemoReport) {
    println!("Executed statements:");
    for sql in &report.statements {
        println!("  {}", sql);
    }

    println!("Merge outcomes:");
    for outcome in &report.merges {
        match outcome {
            MergeOutcome::Updated(columns) => println!("  updated {}", columns.join(", ")),
            other => println!("  {:?}", other),
        }
    }

    println!("Persistence context:");
    for entry in &report.context {
        println!("  {} {}", entry.key, entry.status);
    }
}
