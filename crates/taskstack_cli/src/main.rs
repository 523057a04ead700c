use clap::Parser;
use std::io::{self, BufRead, IsTerminal, Write};
use taskstack_cli::cli::{self, Cli, Command, LineAction};
use taskstack_core::collection::ViewFilter;
use taskstack_core::error::AppError;
use taskstack_core::manager::TaskManager;
use taskstack_core::model::Task;
use taskstack_core::sink::TracingSink;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};

const PROMPT: &str = "Enter command (add, complete, reopen, delete, view, undo, redo, exit): ";

fn init_logging(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn print_tasks_plain(tasks: &[&Task]) {
    for task in tasks {
        println!("{task}");
    }
}

fn print_tasks_json(tasks: &[&Task]) {
    let payload = tasks
        .iter()
        .map(|task| {
            serde_json::json!({
                "description": task.description(),
                "status": task.status(),
                "due_date": task.due_date(),
            })
        })
        .collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn run_command(manager: &mut TaskManager, command: Command, json: bool) -> Result<(), AppError> {
    match command {
        Command::Add { description, rest } => {
            let task = Task::new(&description, cli::due_date(&rest))?;
            manager.add_task(task);
        }
        Command::Complete { description } => manager.mark_completed(&description)?,
        Command::Reopen { description } => manager.mark_pending(&description)?,
        Command::Delete { description } => {
            manager.delete_task(&description);
        }
        Command::View { filter } => {
            let filter = match filter.as_deref() {
                Some(raw) => raw.parse::<ViewFilter>()?,
                None => ViewFilter::All,
            };
            let tasks: Vec<&Task> = manager.view_tasks(filter).collect();
            if json {
                print_tasks_json(&tasks);
            } else {
                print_tasks_plain(&tasks);
            }
        }
        Command::Undo => manager.undo()?,
        Command::Redo => manager.redo()?,
    }

    Ok(())
}

fn report(err: &AppError) {
    match err {
        // The manager has already warned about these through its sink.
        AppError::TaskNotFound(_) | AppError::NoHistory | AppError::NoRedo => debug!("{err}"),
        _ => error!("{err}"),
    }
}

fn prompt() -> Result<(), AppError> {
    let mut stdout = io::stdout();
    write!(stdout, "{PROMPT}").map_err(|err| AppError::io(err.to_string()))?;
    stdout.flush().map_err(|err| AppError::io(err.to_string()))
}

fn run_interactive(manager: &mut TaskManager, json: bool) -> Result<(), AppError> {
    let stdin = io::stdin();
    let show_prompt = stdin.is_terminal();
    let mut stdin_lock = stdin.lock();
    let mut input = String::new();

    loop {
        if show_prompt {
            prompt()?;
        }

        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let command = match cli::parse_line(&input) {
            Ok(LineAction::Empty) => continue,
            Ok(LineAction::Exit) => break,
            Ok(LineAction::Usage(text)) => {
                println!("{text}");
                continue;
            }
            Ok(LineAction::Run(command)) => command,
            Err(err) => {
                report(&err);
                continue;
            }
        };

        if let Err(err) = run_command(manager, command, json) {
            report(&err);
        }
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", cli::malformed(err));
            std::process::exit(2);
        }
    };

    let config = match cli.config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(2);
        }
    };

    init_logging(&config.log_level);
    debug!(redo_policy = config.redo_policy.name(), "starting session");

    let mut manager = TaskManager::with_config(&config, TracingSink);
    if let Err(err) = run_interactive(&mut manager, cli.json) {
        error!("{err}");
        std::process::exit(1);
    }
}
