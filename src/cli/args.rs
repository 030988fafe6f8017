//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Library catalog, recommendation graph, borrow requests and transaction history
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Data directory holding the books and members files
    #[arg(
        short = 'D',
        long,
        global = true,
        env = "BOOKSHELF_DATA_DIR",
        value_hint = ValueHint::DirPath
    )]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Manage the catalog
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },

    /// Borrow a book (queues a request if it is out)
    Borrow {
        /// Book title
        title: String,
    },

    /// Return a borrowed book
    Return {
        /// Book title
        title: String,
    },

    /// Manage members
    Member {
        #[command(subcommand)]
        command: MemberCommands,
    },

    /// Relate two titles for recommendations
    Relate {
        /// First title
        first: String,
        /// Related title
        second: String,
    },

    /// List titles related to a book
    Recommend {
        /// Book title
        title: String,
    },

    /// Show the relationship graph as an adjacency matrix
    Graph,

    /// Show transaction history, most recent first
    History,

    /// Show pending borrow requests
    Requests {
        /// Remove and print the oldest request
        #[arg(long)]
        next: bool,
    },

    /// Run commands from stdin against one in-memory library
    Session,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BookCommands {
    /// Add a book
    Add {
        title: String,
        author: String,
        /// ISBN or other identifier
        identifier: String,
    },

    /// Remove a book by title
    Remove { title: String },

    /// List all books sorted by title
    List,

    /// Look up a book by title
    Find { title: String },

    /// Show the catalog tree shape
    Tree,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MemberCommands {
    /// Add a member
    Add { name: String, id: String },

    /// Remove a member by id
    Remove { id: String },

    /// Look up a member by id
    Find { id: String },

    /// List members
    List,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Show config file locations
    Path,

    /// Print a commented config template
    Template,
}

/// One line of a `session`, parsed with the same subcommands as the CLI.
#[derive(Parser, Debug)]
#[command(name = "bookshelf", no_binary_name = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: Commands,
}
