use amachine::loader::ProgramLoader;
use amachine::machine::TuringMachine;
use amachine::programs::ProgramManager;
use amachine::{Config, Step};
use anyhow::{bail, Context};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The rule file to execute
    #[arg(short, long, conflicts_with = "builtin")]
    program: Option<PathBuf>,

    /// Run one of the embedded programs instead of a rule file
    #[arg(short, long)]
    builtin: Option<String>,

    /// List the embedded programs and exit
    #[arg(short, long)]
    list: bool,

    /// Initial tape from index 0, whitespace separated (asked for when omitted)
    #[arg(short, long, num_args = 0..)]
    tape: Option<Vec<String>>,

    /// Number of moves to perform (asked for when omitted)
    #[arg(short, long)]
    steps: Option<usize>,

    /// Comment marker used in the rule file
    #[arg(short, long, default_value = "#")]
    comment: String,

    /// Print each step of the execution
    #[arg(short = 'd', long)]
    debug: bool,

    /// Print the final complete configuration as JSON
    #[arg(long)]
    json: bool,
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).compact())
        .init();
}

/// Reads one line from stdin, showing `question` only to an interactive user.
fn ask(input: &mut impl BufRead, question: &str) -> anyhow::Result<String> {
    if atty::is(atty::Stream::Stdin) {
        print!("{question}");
        io::stdout().flush()?;
    }
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line)
}

fn tape_symbols(words: &[String]) -> Vec<&str> {
    words.iter().flat_map(|word| word.split_whitespace()).collect()
}

fn parse_steps(text: &str) -> anyhow::Result<usize> {
    text.trim()
        .parse()
        .with_context(|| format!("Invalid amount of moves: {:?}", text.trim()))
}

fn print_state(machine: &TuringMachine) {
    println!(
        "Step: {}, M-configuration: {}, Index: {}, Tape: [{}]",
        machine.step_count(),
        machine.mconf().unwrap_or("<unset>"),
        machine.index(),
        machine.tape()
    );
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.list {
        for (index, name) in ProgramManager::list_program_names().iter().enumerate() {
            let info = ProgramManager::get_program_info(index)?;
            println!(
                "{name} (starts in {}, {} m-configurations, {} rules)",
                info.initial_mconf.as_deref().unwrap_or("<unset>"),
                info.mconf_count,
                info.rule_count
            );
        }
        return Ok(());
    }

    let mut machine = match (&cli.program, &cli.builtin) {
        (Some(path), _) => {
            let config = Config {
                comment_symbol: cli.comment.clone(),
            };
            let machine = ProgramLoader::load_program_with(path, &config)?;
            println!("Machine file open {}\n", path.display());
            machine
        }
        (None, Some(name)) => ProgramManager::get_program_by_name(name)?,
        (None, None) => bail!("Either --program or --builtin is required"),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let tape_line;
    let symbols = match &cli.tape {
        Some(words) => tape_symbols(words),
        None => {
            tape_line = vec![ask(
                &mut input,
                "Input tape from index 0 (whitespace-separated):\n",
            )?];
            tape_symbols(&tape_line)
        }
    };
    machine.set_tape(symbols);

    let steps = match cli.steps {
        Some(steps) => steps,
        None => parse_steps(&ask(
            &mut input,
            "\nAmount of moves (machine instructions to follow): ",
        )?)?,
    };

    info!(steps, "running machine");
    println!("Running the machine from the index {}", machine.index());

    let outcome = if cli.debug {
        print_state(&machine);
        let mut outcome = Step::Continue;
        for _ in 0..steps {
            if let Err(e) = machine.step() {
                outcome = Step::Locked(e);
                break;
            }
            print_state(&machine);
        }
        outcome
    } else {
        machine.run(steps)
    };

    if let Step::Locked(e) = outcome {
        println!("Machine locked after {} moves: {}", machine.step_count(), e);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&machine.configuration())?);
        return Ok(());
    }

    println!(
        "Last m-configuration: {}",
        machine.mconf().unwrap_or("<unset>")
    );
    println!("Last machine index on the tape: {}", machine.index());
    match machine.tape().bounds() {
        Some((first, last)) => {
            println!("Resulting tape (from index {first} to {last}):");
            println!("{}", machine.tape());
        }
        None => println!("Resulting tape is blank"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tape_symbols_split_on_whitespace() {
        let words = vec!["0 1".to_string(), " 1\t".to_string(), "None".to_string()];
        assert_eq!(tape_symbols(&words), ["0", "1", "1", "None"]);
        assert!(tape_symbols(&["\n".to_string()]).is_empty());
    }

    #[test]
    fn test_parse_steps() {
        assert_eq!(parse_steps(" 42\n").unwrap(), 42);
        assert!(parse_steps("many").is_err());
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::parse_from([
            "amachine", "--builtin", "zero-one", "--tape", "0", "1", "--steps", "3",
        ]);
        assert_eq!(cli.builtin.as_deref(), Some("zero-one"));
        assert_eq!(cli.tape, Some(vec!["0".to_string(), "1".to_string()]));
        assert_eq!(cli.steps, Some(3));
        assert_eq!(cli.comment, "#");
    }
}
