mod logging;
mod test_runner;

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::info;

use runner::{Prompter, Runner, SessionStore, ShellExecutor};
use steps::diagnostic::Warning;

const SUBCOMMANDS: &[&str] = &["run", "actions", "check", "test", "help"];

#[derive(Parser)]
#[command(
    name = "do-steps",
    version,
    about = "Walk through the steps of a Markdown how-to, one action at a time"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the actions in a Markdown file, or resume the last session
    Run(RunArgs),

    /// Print the actions extracted from a Markdown file
    Actions(ActionsArgs),

    /// Report code blocks that would be skipped (exit 1 if any)
    Check(CheckArgs),

    /// Run .test.md fixture files
    Test(TestArgs),
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Markdown file to walk through. Omit to resume the last session.
    file: Option<PathBuf>,

    /// Start from the first action without offering to resume
    #[arg(long)]
    fresh: bool,

    /// Directory holding session.json (default: $DO_STEPS_SESSION_DIR or the platform data dir)
    #[arg(long, value_name = "DIR")]
    session_dir: Option<PathBuf>,

    /// Directory commands run in and file paths resolve against (default: current directory)
    #[arg(long, value_name = "DIR")]
    workdir: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ActionsArgs {
    /// Markdown source file
    file: String,

    /// Print the actions as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Markdown source file
    file: String,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let cli = Cli::parse_from(with_default_subcommand(std::env::args().collect()));
    logging::init_logging(cli.verbose, cli.no_color);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let result = match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => do_run(args),
        Command::Actions(args) => do_actions(args, color_choice),
        Command::Check(args) => match do_check(args, color_choice) {
            Ok(clean) if !clean => process::exit(1),
            other => other.map(drop),
        },
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            process::exit(test_runner::run_fixtures(path, color_choice, &args.category));
        }
    };

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

/// `do-steps file.md` means `do-steps run file.md`.
fn with_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let first_positional = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, a)| !a.starts_with('-'))
        .map(|(pos, a)| (pos, SUBCOMMANDS.contains(&a.as_str())));
    if let Some((pos, false)) = first_positional {
        args.insert(pos, "run".to_string());
    }
    args
}

fn do_run(args: RunArgs) -> anyhow::Result<()> {
    let session_dir = match args.session_dir {
        Some(dir) => dir,
        None => runner::default_session_dir()?,
    };
    let workdir = match args.workdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };
    let store = SessionStore::in_dir(&session_dir);
    info!(session = %store.path().display(), workdir = %workdir.display(), "starting");

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let mut session =
        runner::start_session(&store, args.file.as_deref(), args.fresh, &mut prompter)?;
    let actions = runner::load_actions(&session)?;

    let mut walkthrough = Runner::new(prompter, ShellExecutor::new(&workdir), workdir);
    walkthrough.run(&actions, &mut session, &store)?;
    Ok(())
}

fn do_actions(args: ActionsArgs, color_choice: ColorChoice) -> anyhow::Result<()> {
    let (files, document) = load_document(&args.file)?;
    emit_warnings(&files, &steps::diagnostic::check(&document), color_choice);

    let actions = document.actions();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
    } else {
        for (index, action) in actions.iter().enumerate() {
            println!("{:>3}. {}", index + 1, action);
        }
    }
    Ok(())
}

/// Returns whether the file is free of warnings.
fn do_check(args: CheckArgs, color_choice: ColorChoice) -> anyhow::Result<bool> {
    let (files, document) = load_document(&args.file)?;
    let warnings = steps::diagnostic::check(&document);
    emit_warnings(&files, &warnings, color_choice);
    eprintln!(
        "{}: {} actions, {} warnings",
        args.file,
        document.actions().len(),
        warnings.len()
    );
    Ok(warnings.is_empty())
}

fn load_document(path: &str) -> anyhow::Result<(SimpleFiles<String, String>, steps::Document)> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path))?;

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(path.to_string(), source.clone());

    let document = steps::parser::Parser::new(source, file_id).parse();
    Ok((files, document))
}

fn emit_warnings(
    files: &SimpleFiles<String, String>,
    warnings: &[Warning],
    color_choice: ColorChoice,
) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for warning in warnings {
        let diagnostic = warning.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_file_means_run() {
        assert_eq!(
            with_default_subcommand(args(&["do-steps", "-v", "steps.md"])),
            args(&["do-steps", "-v", "run", "steps.md"])
        );
        assert_eq!(
            with_default_subcommand(args(&["do-steps", "check", "steps.md"])),
            args(&["do-steps", "check", "steps.md"])
        );
        assert_eq!(
            with_default_subcommand(args(&["do-steps"])),
            args(&["do-steps"])
        );
    }

    #[test]
    fn cli_parses_run_options() {
        let cli = Cli::parse_from(args(&[
            "do-steps",
            "run",
            "steps.md",
            "--fresh",
            "--session-dir",
            "/tmp/s",
        ]));
        let Some(Command::Run(run)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(run.file, Some(PathBuf::from("steps.md")));
        assert!(run.fresh);
        assert_eq!(run.session_dir, Some(PathBuf::from("/tmp/s")));
    }
}
