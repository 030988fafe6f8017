//! Command dispatch: maps parsed CLI commands onto the library service.

use std::io::{self, BufRead, IsTerminal};

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Generator};
use tracing::{debug, instrument};

use crate::application::services::{BorrowOutcome, GraphSlot, LibraryService, ReturnOutcome};
use crate::cli::args::{BookCommands, Cli, Commands, ConfigCommands, MemberCommands, SessionLine};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::DomainError;
use crate::infrastructure::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };
    match command {
        Commands::Config { command } => cmd_config(cli, command),
        Commands::Completion { shell } => {
            print_completions(*shell, &mut Cli::command());
            Ok(())
        }
        other => {
            let settings = Settings::load(cli.data_dir.as_deref())?;
            let container = ServiceContainer::new(settings);
            let mut library = container.open_library()?;
            if matches!(other, Commands::Session) {
                let stdin = io::stdin();
                let interactive = stdin.is_terminal();
                run_session(&mut library, stdin.lock(), interactive)
            } else {
                dispatch(&mut library, other)
            }
        }
    }
}

fn print_completions<G: Generator>(gen: G, cmd: &mut clap::Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Run one command against an already opened library.
#[instrument(level = "debug", skip(library))]
pub fn dispatch(library: &mut LibraryService, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Book { command } => cmd_book(library, command),
        Commands::Borrow { title } => {
            match library.borrow_book(title)? {
                BorrowOutcome::Borrowed => output::done("Book borrowed", title),
                BorrowOutcome::Queued { position } => output::warning(format!(
                    "book not available, added to waiting list (position {position})"
                )),
            }
            Ok(())
        }
        Commands::Return { title } => {
            match library.return_book(title)? {
                ReturnOutcome::Returned => output::done("Book returned", title),
                ReturnOutcome::NotBorrowed => {
                    output::warning(format!("book was not borrowed: {title}"))
                }
            }
            Ok(())
        }
        Commands::Member { command } => cmd_member(library, command),
        Commands::Relate { first, second } => {
            library.relate(first, second)?;
            output::done("Related", format!("{first} <-> {second}"));
            Ok(())
        }
        Commands::Recommend { title } => {
            let related = library.recommend(title)?;
            output::heading(format!("Recommendations for \"{title}\":"));
            for t in related {
                output::bullet(t);
            }
            Ok(())
        }
        Commands::Graph => {
            output::heading("Adjacency Matrix");
            output::plain(library.graph());
            Ok(())
        }
        Commands::History => {
            for entry in library.history() {
                output::plain(entry);
            }
            Ok(())
        }
        Commands::Requests { next } => {
            if *next {
                let title = library.next_request()?;
                output::done("Next request", title);
            } else {
                for title in library.pending_requests() {
                    output::plain(title);
                }
            }
            Ok(())
        }
        Commands::Session | Commands::Config { .. } | Commands::Completion { .. } => Err(
            CliError::Usage("command not available inside a session".to_string()),
        ),
    }
}

fn cmd_book(library: &mut LibraryService, command: &BookCommands) -> CliResult<()> {
    match command {
        BookCommands::Add {
            title,
            author,
            identifier,
        } => {
            let slot = library.add_book(title, author, identifier)?;
            output::done("Book added", title);
            match slot {
                GraphSlot::Registered => {}
                GraphSlot::AlreadyRegistered => {
                    output::note("title already present in the recommendation graph")
                }
                GraphSlot::GraphFull => output::warning(
                    "recommendation graph is full; the title cannot be related to others",
                ),
            }
        }
        BookCommands::Remove { title } => {
            library.remove_book(title)?;
            output::done("Book removed", title);
        }
        BookCommands::List => {
            for book in library.books() {
                output::book(book);
            }
        }
        BookCommands::Find { title } => {
            let book = library
                .find_book(title)
                .ok_or_else(|| DomainError::book_not_found(title.as_str()))?;
            output::book(book);
        }
        BookCommands::Tree => output::plain(library.catalog().to_tree()),
    }
    Ok(())
}

fn cmd_member(library: &mut LibraryService, command: &MemberCommands) -> CliResult<()> {
    match command {
        MemberCommands::Add { name, id } => {
            library.add_member(name, id)?;
            output::done("Member added", name);
        }
        MemberCommands::Remove { id } => {
            library.remove_member(id)?;
            output::done("Member removed", id);
        }
        MemberCommands::Find { id } => output::plain(library.find_member(id)?),
        MemberCommands::List => {
            for member in library.members() {
                output::plain(member);
            }
        }
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.data_dir.as_deref())?;
            output::plain(settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let settings = Settings::load(cli.data_dir.as_deref())?;
            match global_config_path() {
                Some(p) => output::done("Global", p.display()),
                None => output::done("Global", "unavailable"),
            }
            output::done("Local", local_config_path(&settings.data_dir).display());
            output::done("Books", settings.books_path().display());
            output::done("Members", settings.members_path().display());
        }
        ConfigCommands::Template => output::plain(Settings::template()),
    }
    Ok(())
}

/// Read commands line by line and run each against `library`.
///
/// Failing commands are reported and the session continues. `exit` or `quit`
/// ends it; blank lines and `#` comments are skipped.
pub fn run_session<R: BufRead>(
    library: &mut LibraryService,
    reader: R,
    interactive: bool,
) -> CliResult<()> {
    if interactive {
        output::prompt("bookshelf>");
    }
    for line in reader.lines() {
        let line = line.map_err(|e| CliError::Io {
            context: "read session input".to_string(),
            source: e,
        })?;
        let trimmed = line.trim();
        if matches!(trimmed, "exit" | "quit") {
            break;
        }
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            if let Err(e) = run_session_line(library, trimmed) {
                output::error(e);
            }
        }
        if interactive {
            output::prompt("bookshelf>");
        }
    }
    Ok(())
}

fn run_session_line(library: &mut LibraryService, line: &str) -> CliResult<()> {
    let args = split_args(line)?;
    debug!("session: {:?}", args);
    match SessionLine::try_parse_from(args) {
        Ok(parsed) => dispatch(library, &parsed.command),
        Err(e) if e.use_stderr() => Err(CliError::InvalidArgs(e.to_string())),
        Err(e) => {
            // --help and friends
            e.print().ok();
            Ok(())
        }
    }
}

/// Split a session line into arguments. Single or double quotes group words.
pub fn split_args(line: &str) -> CliResult<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if quote.is_some() {
        return Err(CliError::InvalidArgs(format!("unterminated quote: {line}")));
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}
