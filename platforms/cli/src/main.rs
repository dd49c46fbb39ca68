mod dot;
mod report;

use clap::Parser;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use wtur::{
    Machine, Program, ProgramLoader, ProgramManager, Search, SearchOptions, TuringMachineError,
};

/// Finds the cheapest accepting run of a weighted nondeterministic Turing machine.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  wtur-cli -p machine.wtm
  wtur-cli -n 'Reference Machine' --input 10111
  cat machine.wtm | wtur-cli --json")]
struct Cli {
    /// The program file to run. Read from stdin when omitted and stdin is piped.
    #[clap(short, long, conflicts_with = "name")]
    program: Option<String>,

    /// Run an embedded program by name.
    #[clap(short, long)]
    name: Option<String>,

    /// Replace the program's initial tape.
    #[clap(short, long)]
    input: Option<String>,

    /// Stop after expanding this many configurations.
    #[clap(long)]
    max_expansions: Option<usize>,

    /// Stop once the frontier holds more than this many entries.
    #[clap(long)]
    max_frontier: Option<usize>,

    /// Stop after this many milliseconds.
    #[clap(long)]
    timeout_ms: Option<u64>,

    /// Print the outcome as JSON.
    #[clap(long)]
    json: bool,

    /// Print the transition diagram as Graphviz DOT instead of searching.
    #[clap(long)]
    dot: bool,

    /// List the embedded programs.
    #[clap(short, long)]
    list: bool,

    /// Log search progress to stderr.
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, TuringMachineError> {
    if cli.list {
        for (index, name) in ProgramManager::list_program_names().iter().enumerate() {
            println!("{index}: {name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let program = load(cli)?;
    let machine = Machine::new(program)?;
    let machine = match &cli.input {
        Some(input) => machine.with_tape(&input.chars().collect::<Vec<_>>())?,
        None => machine,
    };

    if cli.dot {
        print!("{}", dot::render(machine.program()));
        return Ok(ExitCode::SUCCESS);
    }

    let options = SearchOptions {
        max_expansions: cli.max_expansions,
        max_frontier: cli.max_frontier,
        timeout: cli.timeout_ms.map(Duration::from_millis),
        cancel: None,
    };

    let mut search = Search::new(&machine, options);
    let outcome = search.run();

    if cli.json {
        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| TuringMachineError::FileError(format!("Failed to encode JSON: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", report::render(&machine, &outcome, &search.stats()));
    }

    Ok(if outcome.is_accepted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Picks the program from `--name`, `--program` or piped stdin, in that order.
fn load(cli: &Cli) -> Result<Program, TuringMachineError> {
    if let Some(name) = &cli.name {
        return ProgramManager::get_program_by_name(name);
    }

    if let Some(path) = &cli.program {
        return ProgramLoader::load_program(Path::new(path));
    }

    if atty::is(atty::Stream::Stdin) {
        return Err(TuringMachineError::FileError(
            "No program given: use --program, --name or pipe a program on stdin".to_string(),
        ));
    }

    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .map_err(|e| TuringMachineError::FileError(format!("Failed to read stdin: {e}")))?;

    ProgramLoader::load_program_from_string(&content)
}
