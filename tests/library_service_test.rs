//! Tests for LibraryService

use std::io;
use std::path::Path;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use bookshelf::application::services::{
    BorrowOutcome, GraphSlot, LibraryPaths, LibraryService, ReturnOutcome,
};
use bookshelf::application::ApplicationError;
use bookshelf::domain::{DomainError, Lookup};
use bookshelf::infrastructure::traits::{FileSystem, RealFileSystem};
use bookshelf::util::testing;

fn paths(dir: &TempDir) -> LibraryPaths {
    LibraryPaths {
        books: dir.path().join("books.txt"),
        members: dir.path().join("members.txt"),
    }
}

fn library(dir: &TempDir) -> LibraryService {
    LibraryService::new(Arc::new(RealFileSystem), paths(dir), 100)
}

fn reopen(dir: &TempDir) -> LibraryService {
    LibraryService::open(Arc::new(RealFileSystem), paths(dir), 100).unwrap()
}

/// Filesystem with no files whose writes always fail.
struct ReadOnlyFileSystem;

impl FileSystem for ReadOnlyFileSystem {
    fn read_optional(&self, _path: &Path) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn replace(&self, _path: &Path, _content: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}

// ============================================================
// Borrow / return
// ============================================================

#[test]
fn given_dune_when_borrowed_requested_and_returned_then_states_follow() {
    // Arrange
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_book("Dune", "Frank Herbert", "9780441013593").unwrap();

    // Act / Assert: first borrow succeeds
    assert_eq!(lib.borrow_book("Dune").unwrap(), BorrowOutcome::Borrowed);
    assert!(!lib.find_book("Dune").unwrap().available);

    // second borrow queues a request
    assert_eq!(
        lib.borrow_book("Dune").unwrap(),
        BorrowOutcome::Queued { position: 1 }
    );
    assert_eq!(lib.pending_requests(), vec!["Dune"]);

    // return makes it available, request stays queued
    assert_eq!(lib.return_book("Dune").unwrap(), ReturnOutcome::Returned);
    assert!(lib.find_book("Dune").unwrap().available);
    assert_eq!(lib.pending_requests(), vec!["Dune"]);

    assert_eq!(
        lib.history(),
        vec!["Returned book: Dune", "Borrowed book: Dune", "Added book: Dune"]
    );
}

#[rstest]
#[case::borrow(true)]
#[case::return_(false)]
fn given_unknown_title_when_borrow_or_return_then_not_found_and_nothing_changes(
    #[case] borrow: bool,
) {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_book("Dune", "Frank Herbert", "1").unwrap();

    let err = if borrow {
        lib.borrow_book("Missing").unwrap_err()
    } else {
        lib.return_book("Missing").unwrap_err()
    };

    assert_eq!(
        err.as_domain(),
        Some(&DomainError::NotFound {
            kind: Lookup::Book,
            key: "Missing".into()
        })
    );
    assert!(lib.pending_requests().is_empty());
    assert_eq!(lib.history(), vec!["Added book: Dune"]);
}

#[test]
fn given_several_waiters_when_serving_requests_then_fifo() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_book("Dune", "a", "1").unwrap();
    lib.add_book("Emma", "b", "2").unwrap();
    lib.borrow_book("Dune").unwrap();
    lib.borrow_book("Emma").unwrap();

    lib.borrow_book("Emma").unwrap();
    lib.borrow_book("Dune").unwrap();
    lib.borrow_book("Emma").unwrap();

    assert_eq!(lib.peek_request().unwrap(), "Emma");
    assert_eq!(lib.next_request().unwrap(), "Emma");
    assert_eq!(lib.next_request().unwrap(), "Dune");
    assert_eq!(lib.next_request().unwrap(), "Emma");
    let err = lib.next_request().unwrap_err();
    assert_eq!(
        err.as_domain(),
        Some(&DomainError::EmptyContainer("request queue"))
    );
}

// ============================================================
// Catalog maintenance
// ============================================================

#[test]
fn given_borrowed_book_when_removed_then_gone_and_logged() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_book("Dune", "Frank Herbert", "1").unwrap();
    lib.borrow_book("Dune").unwrap();

    let removed = lib.remove_book("Dune").unwrap();

    assert_eq!(removed.title, "Dune");
    assert!(lib.find_book("Dune").is_none());
    assert_eq!(lib.history()[0], "Removed book: Dune");
    assert!(lib.remove_book("Dune").unwrap_err().as_domain().unwrap().is_not_found());
}

#[test]
fn given_history_when_replayed_twice_then_identical() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_book("Dune", "a", "1").unwrap();
    lib.add_member("Ada", "m1").unwrap();

    let first = lib.history();
    let second = lib.history();

    assert_eq!(first, second);
    assert_eq!(first, vec!["Added member: Ada", "Added book: Dune"]);
}

// ============================================================
// Recommendations
// ============================================================

#[test]
fn given_related_titles_when_recommending_then_both_directions_see_each_other() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    for title in ["Dune", "Hyperion", "Emma"] {
        lib.add_book(title, "x", "1").unwrap();
    }

    lib.relate("Dune", "Hyperion").unwrap();

    assert_eq!(lib.recommend("Dune").unwrap(), vec!["Hyperion"]);
    assert_eq!(lib.recommend("Hyperion").unwrap(), vec!["Dune"]);
    assert!(lib.recommend("Emma").unwrap().is_empty());
    assert_eq!(lib.history().len(), 3);
}

#[test]
fn given_self_relation_when_relating_then_rejected() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_book("Dune", "x", "1").unwrap();

    let err = lib.relate("Dune", "Dune").unwrap_err();

    assert_eq!(
        err.as_domain(),
        Some(&DomainError::SelfRelation("Dune".into()))
    );
}

#[test]
fn given_removed_book_when_recommending_then_graph_keeps_title() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_book("Dune", "x", "1").unwrap();
    lib.add_book("Emma", "y", "2").unwrap();
    lib.relate("Dune", "Emma").unwrap();

    lib.remove_book("Emma").unwrap();

    assert_eq!(lib.recommend("Dune").unwrap(), vec!["Emma"]);
    assert_eq!(lib.add_book("Emma", "y", "2").unwrap(), GraphSlot::AlreadyRegistered);
}

// ============================================================
// Persistence
// ============================================================

#[test]
fn given_out_of_order_adds_when_saved_then_books_file_is_sorted() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_book("Solaris", "Lem", "3").unwrap();
    lib.add_book("Anathem", "Stephenson", "1").unwrap();
    lib.add_book("Dune", "Herbert", "2").unwrap();

    let content = std::fs::read_to_string(temp.path().join("books.txt")).unwrap();

    assert_eq!(
        content,
        "Anathem,Stephenson,1\nDune,Herbert,2\nSolaris,Lem,3\n"
    );
}

#[test]
fn given_members_when_added_and_removed_then_file_keeps_insertion_order() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_member("Zoe", "m3").unwrap();
    lib.add_member("Ada", "m1").unwrap();
    lib.add_member("Max", "m2").unwrap();

    let removed = lib.remove_member("m1").unwrap();

    assert_eq!(removed.name, "Ada");
    let content = std::fs::read_to_string(temp.path().join("members.txt")).unwrap();
    assert_eq!(content, "Zoe,m3\nMax,m2\n");
    assert_eq!(lib.history()[0], "Removed member: m1");
    let err = lib.remove_member("m1").unwrap_err();
    assert_eq!(
        err.as_domain(),
        Some(&DomainError::NotFound {
            kind: Lookup::Member,
            key: "m1".into()
        })
    );
}

#[test]
fn given_saved_library_when_reopened_then_books_available_and_history_empty() {
    // Arrange
    let temp = TempDir::new().unwrap();
    {
        let mut lib = library(&temp);
        lib.add_book("Dune", "Herbert", "2").unwrap();
        lib.add_book("Emma", "Austen", "1").unwrap();
        lib.borrow_book("Dune").unwrap();
        lib.add_member("Ada", "m1").unwrap();
    }

    // Act
    let lib = reopen(&temp);

    // Assert
    let titles: Vec<_> = lib.books().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "Emma"]);
    assert!(lib.books().all(|b| b.available));
    assert_eq!(lib.members().len(), 1);
    assert!(lib.history().is_empty());
    assert!(lib.recommend("Dune").unwrap().is_empty());
}

#[test]
fn given_no_data_files_when_opening_then_library_is_empty() {
    let temp = TempDir::new().unwrap();

    let lib = reopen(&temp);

    assert_eq!(lib.books().count(), 0);
    assert!(lib.members().is_empty());
}

#[test]
fn given_books_file_with_blank_and_short_lines_when_opening_then_parses_leniently() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("books.txt"),
        "Dune,Herbert,2\n\nEmma\nUbik,Dick,3,extra\n",
    )
    .unwrap();

    let lib = reopen(&temp);

    let emma = lib.find_book("Emma").unwrap();
    assert_eq!(emma.author, "");
    assert_eq!(emma.identifier, "");
    assert_eq!(lib.find_book("Ubik").unwrap().identifier, "3");
    assert_eq!(lib.books().count(), 3);
}

#[test]
fn given_nested_data_dir_when_saving_then_creates_parent() {
    let temp = TempDir::new().unwrap();
    let nested = LibraryPaths {
        books: temp.path().join("a/b/books.txt"),
        members: temp.path().join("a/b/members.txt"),
    };
    let mut lib = LibraryService::new(Arc::new(RealFileSystem), nested, 100);

    lib.add_book("Dune", "Herbert", "1").unwrap();

    assert!(temp.path().join("a/b/books.txt").exists());
}

#[test]
fn given_failing_writes_when_adding_book_then_persistence_error_after_mutation() {
    let temp = TempDir::new().unwrap();
    let mut lib = LibraryService::new(Arc::new(ReadOnlyFileSystem), paths(&temp), 100);

    let err = lib.add_book("Dune", "Herbert", "1").unwrap_err();

    assert!(matches!(err, ApplicationError::Persistence { .. }), "{err:?}");
    assert!(lib.find_book("Dune").is_some());
    assert_eq!(lib.history(), vec!["Added book: Dune"]);
}

// ============================================================
// Field validation
// ============================================================

#[rstest]
#[case("Dune, Part Two", "Herbert", "1", "title")]
#[case("Dune", "Herbert\nFrank", "1", "author")]
#[case("Dune", "Herbert", "1\r", "identifier")]
fn given_separator_in_book_field_when_adding_then_rejected_and_nothing_changes(
    #[case] title: &str,
    #[case] author: &str,
    #[case] identifier: &str,
    #[case] field: &str,
) {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);

    let err = lib.add_book(title, author, identifier).unwrap_err();

    match err.as_domain() {
        Some(DomainError::InvalidField { field: f, .. }) => assert_eq!(*f, field),
        other => panic!("expected InvalidField, got {other:?}"),
    }
    assert_eq!(lib.books().count(), 0);
    assert!(lib.recommend(title).is_err());
    assert!(lib.history().is_empty());
    assert!(!temp.path().join("books.txt").exists());
}

#[test]
fn given_comma_in_member_name_when_adding_then_rejected_and_nothing_changes() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);

    let err = lib.add_member("Lovelace, Ada", "m1").unwrap_err();

    assert!(matches!(
        err.as_domain(),
        Some(DomainError::InvalidField { field: "member name", .. })
    ));
    assert!(lib.members().is_empty());
    assert!(lib.history().is_empty());
    assert!(!temp.path().join("members.txt").exists());
}

#[test]
fn given_accepted_records_when_reopened_then_fields_round_trip() {
    let temp = TempDir::new().unwrap();
    {
        let mut lib = library(&temp);
        lib.add_book("Dune Messiah", "Frank Herbert", "978-0593098233")
            .unwrap();
        lib.add_member("Ada Lovelace", "m1").unwrap();
    }

    let lib = reopen(&temp);

    let book = lib.find_book("Dune Messiah").unwrap();
    assert_eq!(book.author, "Frank Herbert");
    assert_eq!(book.identifier, "978-0593098233");
    assert_eq!(lib.find_member("m1").unwrap().name, "Ada Lovelace");
}

#[test]
fn given_unknown_member_id_when_finding_then_not_found() {
    let temp = TempDir::new().unwrap();
    let mut lib = library(&temp);
    lib.add_member("Ada", "m1").unwrap();

    let err = lib.find_member("m2").unwrap_err();

    assert_eq!(
        err.as_domain(),
        Some(&DomainError::NotFound {
            kind: Lookup::Member,
            key: "m2".into()
        })
    );
}
