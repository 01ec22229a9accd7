//! The rule database.
//!
//! Rules are kept in two levels of owning maps, subject → object → access.
//! There is at most one entry per `(subject, object)` pair; writing the same
//! pair again replaces its access.
//!
//! # Usage
//!
//! ```rust
//! use smack_rules::{Access, RuleDatabase};
//!
//! let mut db = RuleDatabase::new();
//! db.upsert("Web", "Logs", Access::READ | Access::APPEND).unwrap();
//!
//! assert!(db.has_access("Web", "Logs", Access::APPEND));
//! assert!(!db.has_access("Web", "Logs", Access::WRITE));
//! assert!(!db.has_access("Web", "Secrets", Access::READ));
//! ```
//!
//! The database does no locking. Callers sharing one across threads wrap it
//! themselves, e.g. in a `Mutex<RuleDatabase>`.

use crate::access::Access;
use crate::error::Result;
use crate::label::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `(subject, object) → access` association.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Acting label
    pub subject: Label,
    /// Label acted upon
    pub object: Label,
    /// Granted permissions
    pub access: Access,
}

impl Rule {
    /// Creates a rule, validating both labels.
    pub fn new(subject: &str, object: &str, access: Access) -> Result<Self> {
        Ok(Self {
            subject: Label::new(subject)?,
            object: Label::new(object)?,
            access,
        })
    }
}

type ObjectMap = BTreeMap<Label, Access>;

/// In-memory Smack rule set.
///
/// Iteration is ordered by subject, then object, so saving the same database
/// twice produces identical files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDatabase {
    subjects: BTreeMap<Label, ObjectMap>,
}

impl RuleDatabase {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `access` from `subject` to `object`, replacing any previous
    /// grant for the pair.
    ///
    /// Fails with [`Error::LabelTooLong`](crate::Error::LabelTooLong) if
    /// either label is too long; the database is left unchanged in that case.
    pub fn upsert(&mut self, subject: &str, object: &str, access: Access) -> Result<()> {
        let subject = Label::new(subject)?;
        let object = Label::new(object)?;
        self.subjects
            .entry(subject)
            .or_default()
            .insert(object, access);
        Ok(())
    }

    /// Like [`upsert`](Self::upsert), taking the access in textual form.
    pub fn add_rule(&mut self, subject: &str, object: &str, access: &str) -> Result<()> {
        self.upsert(subject, object, Access::decode(access))
    }

    /// Inserts an already validated rule.
    pub fn insert(&mut self, rule: Rule) {
        self.subjects
            .entry(rule.subject)
            .or_default()
            .insert(rule.object, rule.access);
    }

    /// Removes the rule for `(subject, object)`.
    ///
    /// Returns `false` if there was no such rule.
    pub fn remove(&mut self, subject: &str, object: &str) -> bool {
        self.subjects
            .get_mut(subject)
            .and_then(|objects| objects.remove(object))
            .is_some()
    }

    /// Removes every rule whose subject is `subject`.
    ///
    /// The subject entry itself is kept, empty. Unknown subjects are ignored.
    pub fn remove_all_for_subject(&mut self, subject: &str) {
        if let Some(objects) = self.subjects.get_mut(subject) {
            objects.clear();
        }
    }

    /// Removes every rule whose object is `object`, under any subject.
    pub fn remove_all_for_object(&mut self, object: &str) {
        for objects in self.subjects.values_mut() {
            objects.remove(object);
        }
    }

    /// Returns `true` if a rule exists for the pair and grants every
    /// permission in `required`.
    pub fn has_access(&self, subject: &str, object: &str, required: Access) -> bool {
        self.get(subject, object)
            .is_some_and(|granted| granted.contains(required))
    }

    /// Like [`has_access`](Self::has_access), taking the access in textual form.
    pub fn has_access_str(&self, subject: &str, object: &str, required: &str) -> bool {
        self.has_access(subject, object, Access::decode(required))
    }

    /// Returns the access granted for the pair, if a rule exists.
    pub fn get(&self, subject: &str, object: &str) -> Option<Access> {
        self.subjects.get(subject)?.get(object).copied()
    }

    /// Replaces the whole contents with `other`.
    pub fn replace_all(&mut self, other: RuleDatabase) {
        *self = other;
    }

    /// Removes everything, including empty subject entries.
    pub fn clear(&mut self) {
        self.subjects.clear();
    }

    /// Returns `true` if `subject` has an entry, even an empty one.
    pub fn contains_subject(&self, subject: &str) -> bool {
        self.subjects.contains_key(subject)
    }

    /// Number of subject entries, including emptied ones.
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.subjects.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.subjects.values().all(BTreeMap::is_empty)
    }

    /// Iterates over rules in subject, then object order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Label, Access)> + '_ {
        self.subjects.iter().flat_map(|(subject, objects)| {
            objects
                .iter()
                .map(move |(object, access)| (subject, object, *access))
        })
    }

    /// Iterates over the rules of one subject.
    pub fn objects_of<'a>(
        &'a self,
        subject: &str,
    ) -> impl Iterator<Item = (&'a Label, Access)> + use<'a> {
        self.subjects
            .get(subject)
            .into_iter()
            .flat_map(|objects| objects.iter().map(|(object, access)| (object, *access)))
    }

    /// Collects all rules into owned values.
    pub fn to_rules(&self) -> Vec<Rule> {
        self.iter()
            .map(|(subject, object, access)| Rule {
                subject: subject.clone(),
                object: object.clone(),
                access,
            })
            .collect()
    }
}

impl Extend<Rule> for RuleDatabase {
    fn extend<I: IntoIterator<Item = Rule>>(&mut self, iter: I) {
        for rule in iter {
            self.insert(rule);
        }
    }
}

impl FromIterator<Rule> for RuleDatabase {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut db = Self::new();
        db.extend(iter);
        db
    }
}
