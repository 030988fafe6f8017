//! Library facade
//!
//! Keeps catalog, relationship graph, request queue, history log and member
//! directory consistent, and writes the books/members files after every
//! mutating catalog or member operation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::catalog::InOrder;
use crate::domain::{
    AdjacencyView, Book, Catalog, DomainError, HistoryLog, Member, MemberDirectory,
    RelationGraph, RequestQueue,
};
use crate::infrastructure::traits::FileSystem;

/// Locations of the two data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPaths {
    pub books: PathBuf,
    pub members: PathBuf,
}

/// Result of a borrow attempt against a known title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowOutcome {
    Borrowed,
    /// Book was out; the title joined the request queue at `position` (1-based).
    Queued { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    Returned,
    /// Book was already available; nothing changed.
    NotBorrowed,
}

/// What happened to the title in the relationship graph on `add_book`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSlot {
    Registered,
    AlreadyRegistered,
    GraphFull,
}

pub struct LibraryService {
    fs: Arc<dyn FileSystem>,
    paths: LibraryPaths,
    catalog: Catalog,
    graph: RelationGraph,
    requests: RequestQueue,
    history: HistoryLog,
    members: MemberDirectory,
}

impl LibraryService {
    /// Create an empty library. Nothing is read from disk.
    pub fn new(fs: Arc<dyn FileSystem>, paths: LibraryPaths, graph_capacity: usize) -> Self {
        Self {
            fs,
            paths,
            catalog: Catalog::new(),
            graph: RelationGraph::with_capacity(graph_capacity),
            requests: RequestQueue::new(),
            history: HistoryLog::new(),
            members: MemberDirectory::new(),
        }
    }

    /// Create a library and load both data files. Missing files count as empty.
    pub fn open(
        fs: Arc<dyn FileSystem>,
        paths: LibraryPaths,
        graph_capacity: usize,
    ) -> ApplicationResult<Self> {
        let mut library = Self::new(fs, paths, graph_capacity);
        library.load()?;
        Ok(library)
    }

    pub fn paths(&self) -> &LibraryPaths {
        &self.paths
    }

    /// Read books and members in file order. Every loaded book starts available.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&mut self) -> ApplicationResult<()> {
        let books = self
            .fs
            .read_optional(&self.paths.books)
            .with_path_context("read books", &self.paths.books)?;
        for book in books.iter().flat_map(|c| c.lines()).filter_map(Book::parse_line) {
            self.register_in_graph(&book.title);
            self.catalog.insert(book);
        }

        let members = self
            .fs
            .read_optional(&self.paths.members)
            .with_path_context("read members", &self.paths.members)?;
        self.members
            .extend(members.iter().flat_map(|c| c.lines()).filter_map(Member::parse_line));

        debug!(
            "load: {} books, {} members",
            self.catalog.len(),
            self.members.len()
        );
        Ok(())
    }

    // ---- catalog ----

    #[instrument(level = "debug", skip(self))]
    pub fn add_book(
        &mut self,
        title: &str,
        author: &str,
        identifier: &str,
    ) -> ApplicationResult<GraphSlot> {
        let book = Book::new(title, author, identifier);
        book.validate()?;
        self.catalog.insert(book);
        let slot = self.register_in_graph(title);
        self.history.append(format!("Added book: {title}"));
        self.save_books()?;
        Ok(slot)
    }

    /// Removes one catalog entry for `title`, whatever its availability.
    /// The title keeps its place in the relationship graph.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_book(&mut self, title: &str) -> ApplicationResult<Book> {
        let book = self
            .catalog
            .remove(title)
            .ok_or_else(|| DomainError::book_not_found(title))?;
        self.history.append(format!("Removed book: {title}"));
        self.save_books()?;
        Ok(book)
    }

    /// Unknown titles fail with `NotFound` and are never queued.
    #[instrument(level = "debug", skip(self))]
    pub fn borrow_book(&mut self, title: &str) -> ApplicationResult<BorrowOutcome> {
        let book = self
            .catalog
            .search_mut(title)
            .ok_or_else(|| DomainError::book_not_found(title))?;

        if !book.available {
            self.requests.enqueue(title);
            let position = self.requests.len();
            debug!("borrow_book: {title} is out, queued at {position}");
            return Ok(BorrowOutcome::Queued { position });
        }

        book.available = false;
        self.history.append(format!("Borrowed book: {title}"));
        self.save_books()?;
        Ok(BorrowOutcome::Borrowed)
    }

    /// Waiting requests stay queued; use `next_request` to serve them.
    #[instrument(level = "debug", skip(self))]
    pub fn return_book(&mut self, title: &str) -> ApplicationResult<ReturnOutcome> {
        let book = self
            .catalog
            .search_mut(title)
            .ok_or_else(|| DomainError::book_not_found(title))?;

        if book.available {
            return Ok(ReturnOutcome::NotBorrowed);
        }

        book.available = true;
        self.history.append(format!("Returned book: {title}"));
        self.save_books()?;
        let waiting = self.requests.count_of(title);
        if waiting > 0 {
            debug!("return_book: {waiting} request(s) waiting on {title}");
        }
        Ok(ReturnOutcome::Returned)
    }

    pub fn find_book(&self, title: &str) -> Option<&Book> {
        self.catalog.search(title)
    }

    /// All books ascending by title.
    pub fn books(&self) -> InOrder<'_> {
        self.catalog.iter()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ---- members ----

    #[instrument(level = "debug", skip(self))]
    pub fn add_member(&mut self, name: &str, id: &str) -> ApplicationResult<()> {
        let member = Member::new(name, id);
        member.validate()?;
        self.members.add(member);
        self.history.append(format!("Added member: {name}"));
        self.save_members()
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove_member(&mut self, id: &str) -> ApplicationResult<Member> {
        let member = self
            .members
            .remove_by_id(id)
            .ok_or_else(|| DomainError::member_not_found(id))?;
        self.history.append(format!("Removed member: {id}"));
        self.save_members()?;
        Ok(member)
    }

    pub fn find_member(&self, id: &str) -> ApplicationResult<&Member> {
        Ok(self
            .members
            .find(id)
            .ok_or_else(|| DomainError::member_not_found(id))?)
    }

    pub fn members(&self) -> &MemberDirectory {
        &self.members
    }

    // ---- graph ----

    #[instrument(level = "debug", skip(self))]
    pub fn relate(&mut self, a: &str, b: &str) -> ApplicationResult<()> {
        self.graph.add_edge(a, b)?;
        Ok(())
    }

    /// Titles related to `title`, in graph insertion order.
    pub fn recommend(&self, title: &str) -> ApplicationResult<Vec<String>> {
        let related = self.graph.neighbors(title)?;
        Ok(related.into_iter().map(str::to_owned).collect())
    }

    pub fn graph(&self) -> AdjacencyView {
        self.graph.dump()
    }

    // ---- queue and history ----

    /// Pending borrow requests, oldest first.
    pub fn pending_requests(&self) -> Vec<String> {
        self.requests.iter().map(str::to_owned).collect()
    }

    pub fn peek_request(&self) -> ApplicationResult<&str> {
        Ok(self.requests.peek()?)
    }

    /// Take the oldest pending request off the queue.
    pub fn next_request(&mut self) -> ApplicationResult<String> {
        Ok(self.requests.dequeue()?)
    }

    /// Transaction log, most recent first. Reading does not consume it.
    pub fn history(&self) -> Vec<String> {
        self.history.replay()
    }

    // ---- persistence ----

    fn register_in_graph(&mut self, title: &str) -> GraphSlot {
        match self.graph.add_node(title) {
            Ok(_) => GraphSlot::Registered,
            Err(DomainError::Duplicate(_)) => GraphSlot::AlreadyRegistered,
            Err(e) => {
                warn!("graph registration skipped for {title}: {e}");
                GraphSlot::GraphFull
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    fn save_books(&self) -> ApplicationResult<()> {
        let content: String = self
            .catalog
            .iter()
            .map(|b| format!("{}\n", b.to_line()))
            .collect();
        self.write_file(&self.paths.books, &content, "write books")
    }

    #[instrument(level = "debug", skip(self))]
    fn save_members(&self) -> ApplicationResult<()> {
        let content: String = self
            .members
            .iter()
            .map(|m| format!("{}\n", m.to_line()))
            .collect();
        self.write_file(&self.paths.members, &content, "write members")
    }

    fn write_file(&self, path: &Path, content: &str, action: &str) -> ApplicationResult<()> {
        self.fs.replace(path, content).with_path_context(action, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    fn library(dir: &TempDir) -> LibraryService {
        let paths = LibraryPaths {
            books: dir.path().join("books.txt"),
            members: dir.path().join("members.txt"),
        };
        LibraryService::new(Arc::new(RealFileSystem), paths, 100)
    }

    #[test]
    fn given_book_when_borrowed_then_availability_and_history_change() {
        let temp = TempDir::new().unwrap();
        let mut lib = library(&temp);
        lib.add_book("Dune", "Frank Herbert", "1").unwrap();

        assert_eq!(lib.borrow_book("Dune").unwrap(), BorrowOutcome::Borrowed);
        assert!(!lib.find_book("Dune").unwrap().available);
        assert_eq!(lib.history()[0], "Borrowed book: Dune");
    }

    #[test]
    fn given_borrowed_book_when_borrowed_again_then_queues_without_history() {
        let temp = TempDir::new().unwrap();
        let mut lib = library(&temp);
        lib.add_book("Dune", "Frank Herbert", "1").unwrap();
        lib.borrow_book("Dune").unwrap();
        let before = lib.history().len();

        assert_eq!(
            lib.borrow_book("Dune").unwrap(),
            BorrowOutcome::Queued { position: 1 }
        );
        assert_eq!(lib.pending_requests(), vec!["Dune"]);
        assert_eq!(lib.history().len(), before);
    }

    #[test]
    fn given_available_book_when_returned_then_nothing_changes() {
        let temp = TempDir::new().unwrap();
        let mut lib = library(&temp);
        lib.add_book("Dune", "Frank Herbert", "1").unwrap();

        assert_eq!(lib.return_book("Dune").unwrap(), ReturnOutcome::NotBorrowed);
        assert_eq!(lib.history(), vec!["Added book: Dune"]);
    }

    #[test]
    fn given_duplicate_title_when_adding_then_graph_reports_already_registered() {
        let temp = TempDir::new().unwrap();
        let mut lib = library(&temp);
        assert_eq!(lib.add_book("Dune", "a", "1").unwrap(), GraphSlot::Registered);
        assert_eq!(
            lib.add_book("Dune", "a", "2").unwrap(),
            GraphSlot::AlreadyRegistered
        );
        assert_eq!(lib.books().count(), 2);
    }

    #[test]
    fn given_full_graph_when_adding_book_then_catalog_still_gets_it() {
        let temp = TempDir::new().unwrap();
        let paths = LibraryPaths {
            books: temp.path().join("books.txt"),
            members: temp.path().join("members.txt"),
        };
        let mut lib = LibraryService::new(Arc::new(RealFileSystem), paths, 1);
        lib.add_book("A", "a", "1").unwrap();

        assert_eq!(lib.add_book("B", "b", "2").unwrap(), GraphSlot::GraphFull);
        assert!(lib.find_book("B").is_some());
        assert!(lib.recommend("B").unwrap_err().as_domain().unwrap().is_not_found());
    }
}
