use anyhow::Result;
use clap::{Parser as ClapParser, Subcommand};
use clap_stdin::FileOrStdin;
use env_logger;

use lexenv::script::{parse_atom, ScopeScript};
use lexenv::{Env, Environment, ParamList, Symbol, Value};

/// Inspect how names resolve through a chain of lexical frames
#[derive(Debug, ClapParser)]
#[clap(name = "lexenv", version)]
pub struct Args {
    /// Debug mode
    #[clap(short, long)]
    debug: bool,

    /// Subcommand to run
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build frames from a scope script and resolve names in the innermost one.
    Resolve {
        /// Scope script file or - for stdin.
        input: FileOrStdin,

        /// Names to resolve.
        #[clap(required = true)]
        names: Vec<String>,
    },
    /// Bind arguments to a parameter list in a fresh frame.
    Bind {
        /// Parameter list, e.g. "a b & rest".
        #[clap(short, long, default_value = "")]
        params: String,

        /// Argument atoms.
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.debug {
        env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();
    } else {
        env_logger::init();
    }

    match args.command {
        Command::Resolve { input, names } => {
            let file_contents = input.contents()?;
            let script = ScopeScript::parse(&file_contents)?;
            if script.is_empty() {
                log::warn!("scope script declares no frames, resolving against an empty root");
            }
            let env = script.build(&Env::root());

            let mut encountered_error = false;
            for name in names {
                match env.get(&Symbol::from(name.as_str())) {
                    Ok(value) => println!("{name} = {value}"),
                    Err(e) => {
                        eprintln!("{e}");
                        encountered_error = true;
                    }
                }
            }

            if encountered_error {
                std::process::exit(70);
            }
        },
        Command::Bind { params, args } => {
            let symbols: Vec<Symbol> = params.split_whitespace().map(Symbol::from).collect();
            let params = match ParamList::parse(&symbols) {
                Ok(params) => params,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(65);
                },
            };

            let values: Vec<Value> = args.iter().map(|arg| parse_atom(arg)).collect();
            let env = match Env::new(None, &params, &values) {
                Ok(env) => env,
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(65);
                },
            };

            for (name, value) in env.data().sorted() {
                println!("{name} = {value}");
            }
        },
    }

    Ok(())
}
