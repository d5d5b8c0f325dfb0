use std::fmt;
use std::io::{BufRead, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;

use quiz_core::model::QuestionId;
use services::{AppServices, Clock, ElapsedTicker, QuizSession, SubmitOutcome};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { command: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidQuestionId { raw: String },
    InvalidTicks { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { command } => write!(f, "{command} requires an argument"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidQuestionId { raw } => write!(f, "invalid question id: {raw:?}"),
            ArgsError::InvalidTicks { raw } => write!(f, "invalid --ticks value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [command] [--db <sqlite_url>] [--dataset <csv>] [--yes]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                 show the current screen (default)");
    eprintln!("  start                  start a new attempt, wiping answers");
    eprintln!("  continue               resume the quiz in progress");
    eprintln!("  result                 show the last submitted result");
    eprintln!("  answer <id> <text>     answer a question");
    eprintln!("  goto <id>              jump to a question");
    eprintln!("  review <id>            jump to a question in the result view");
    eprintln!("  next | prev            move to the next/previous question");
    eprintln!("  submit                 submit the quiz");
    eprintln!("  clear                  clear every answer");
    eprintln!("  watch [--ticks <n>]    show the running clock");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --dataset questions.csv");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_DATASET, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Start,
    Continue,
    Result,
    Answer { id: QuestionId, text: String },
    Goto(QuestionId),
    Review(QuestionId),
    Next,
    Prev,
    Submit,
    Clear,
    Watch { ticks: u32 },
}

#[derive(Debug)]
struct Args {
    db_url: String,
    dataset: PathBuf,
    assume_yes: bool,
    command: Command,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("sqlite:quiz.sqlite3".into()), normalize_sqlite_url);
        let mut dataset = std::env::var("QUIZ_DATASET")
            .ok()
            .map_or_else(|| PathBuf::from("questions.csv"), PathBuf::from);
        let mut assume_yes = false;
        let mut ticks: Option<u32> = None;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--dataset" => dataset = PathBuf::from(require_value(&mut args, "--dataset")?),
                "--ticks" => {
                    let value = require_value(&mut args, "--ticks")?;
                    let parsed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTicks { raw: value.clone() })?;
                    ticks = Some(parsed);
                }
                "--yes" | "-y" => assume_yes = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let command = parse_command(positional, ticks)?;
        Ok(Self {
            db_url,
            dataset,
            assume_yes,
            command,
        })
    }
}

fn parse_command(positional: Vec<String>, ticks: Option<u32>) -> Result<Command, ArgsError> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Ok(Command::Status);
    };

    let command = match name.as_str() {
        "status" => Command::Status,
        "start" => Command::Start,
        "continue" => Command::Continue,
        "result" => Command::Result,
        "answer" => {
            let id = question_id(&mut words, "answer")?;
            let text: Vec<String> = words.collect();
            Command::Answer {
                id,
                text: text.join(" "),
            }
        }
        "goto" => Command::Goto(question_id(&mut words, "goto")?),
        "review" => Command::Review(question_id(&mut words, "review")?),
        "next" => Command::Next,
        "prev" => Command::Prev,
        "submit" => Command::Submit,
        "clear" => Command::Clear,
        "watch" => Command::Watch {
            ticks: ticks.unwrap_or(10),
        },
        _ => return Err(ArgsError::UnknownCommand(name)),
    };
    Ok(command)
}

fn question_id(
    words: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<QuestionId, ArgsError> {
    let raw = words.next().ok_or(ArgsError::MissingOperand { command })?;
    QuestionId::new(raw.clone()).map_err(|_| ArgsError::InvalidQuestionId { raw })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` declines.
fn confirm(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn dispatch(
    session: &mut QuizSession,
    command: Command,
    assume_yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Status => {}
        Command::Start => {
            let answered = session.snapshot().progress.answered;
            if answered > 0
                && !confirm(
                    &format!("Discard {answered} answer(s) and start over?"),
                    assume_yes,
                )
            {
                eprintln!("start cancelled");
                return Ok(());
            }
            session.start_new().await?;
        }
        Command::Continue => {
            if !session.can_continue() {
                eprintln!("no quiz in progress; run `quiz start`");
                return Ok(());
            }
            session.continue_quiz().await?;
        }
        Command::Result => {
            if !session.can_view_result() {
                eprintln!("no submitted result yet");
                return Ok(());
            }
            session.go_result().await?;
        }
        Command::Answer { id, text } => session.set_answer(&id, &text).await?,
        Command::Goto(id) => session.jump_to(&id).await?,
        Command::Review(id) => session.jump_review(&id).await?,
        Command::Next => session.next().await?,
        Command::Prev => session.prev().await?,
        Command::Submit => {
            let outcome = session
                .submit(|unanswered| {
                    confirm(
                        &format!("{unanswered} question(s) are unanswered. Submit anyway?"),
                        assume_yes,
                    )
                })
                .await?;
            if let SubmitOutcome::Cancelled { unanswered } = outcome {
                eprintln!("submit cancelled ({unanswered} unanswered)");
            }
        }
        Command::Clear => {
            let cleared = session
                .clear_answers(|| confirm("Clear every answer? This cannot be undone.", assume_yes))
                .await?;
            if !cleared {
                eprintln!("clear cancelled");
            }
        }
        Command::Watch { ticks } => {
            let mut remaining = ticks;
            ElapsedTicker::new(session.state().clone(), session.clock())
                .run(|elapsed| {
                    eprint!("\r{}", quiz_core::elapsed::format_elapsed(elapsed));
                    remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                })
                .await;
            eprintln!();
            return Ok(());
        }
    }

    print!("{}", render::Screen(&session.snapshot()));
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz=info,services=info,storage=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing::debug!(
        command = ?parsed.command,
        db_url = %parsed.db_url,
        dataset = %parsed.dataset.display(),
        "running command"
    );
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(&parsed.db_url, &parsed.dataset, Clock::system()).await?;
    let mut session = app.open_session().await?;

    dispatch(&mut session, parsed.command, parsed.assume_yes).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
