//! Member directory: insertion-ordered, looked up by id.

use tracing::instrument;

use crate::domain::entities::Member;

#[derive(Debug, Default, Clone)]
pub struct MemberDirectory {
    members: Vec<Member>,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Appends without checking for an existing id.
    pub fn add(&mut self, member: Member) {
        self.members.push(member);
    }

    pub fn find(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Removes the first member carrying `id`, keeping the rest in order.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_by_id(&mut self, id: &str) -> Option<Member> {
        let pos = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(pos))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.members.iter()
    }
}

impl FromIterator<Member> for MemberDirectory {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

impl Extend<Member> for MemberDirectory {
    fn extend<I: IntoIterator<Item = Member>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

impl<'a> IntoIterator for &'a MemberDirectory {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
