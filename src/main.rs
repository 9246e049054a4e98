use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use gwt::cli::{Cli, Error};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            ErrorKind::InvalidSubcommand => {
                let name = match e.get(ContextKind::InvalidSubcommand) {
                    Some(ContextValue::String(name)) => name.clone(),
                    _ => String::new(),
                };
                fail(&Error::UnknownCommand(name));
            }
            // Usage errors exit 1 like every other handled failure
            _ => {
                eprint!("{e}");
                std::process::exit(1);
            }
        },
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .format_timestamp(None)
    .init();

    if let Err(e) = cli.run() {
        fail(&e);
    }
}

fn fail(e: &Error) -> ! {
    eprintln!("error: {e}");
    std::process::exit(1);
}
