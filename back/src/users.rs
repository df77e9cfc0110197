//! User accounts and credential checks.

use std::{collections::HashSet, fs, io, path::Path};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use todos_api::v1::{UserAccount, UserId};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read users file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode users file: {0}")]
    Decode(#[from] ron::error::SpannedError),
    #[error("slug `{0}` is used by more than one user")]
    DuplicateSlug(String),
}

pub trait UserDirectory: Send + Sync {
    fn find_by_slug(&self, slug: &str) -> Option<UserAccount>;

    fn find_by_id(&self, id: UserId) -> Option<UserAccount>;

    /// Returns the account when `password` matches the stored credential.
    fn authenticate(&self, slug: &str, password: &str) -> Option<UserAccount>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub display_name: String,
    pub slug: String,
    /// Prepended to the password before hashing. Records without one hash
    /// the bare password.
    #[serde(default)]
    pub password_salt: String,
    /// Lowercase hex SHA-256 of the salt followed by the password.
    pub password_sha256: String,
}

impl UserRecord {
    /// Builds a record with a fresh random salt.
    pub fn new(id: UserId, display_name: &str, slug: &str, password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        Self {
            id,
            display_name: String::from(display_name),
            slug: String::from(slug),
            password_sha256: hash_password(&salt, password),
            password_salt: salt,
        }
    }

    fn account(&self) -> UserAccount {
        UserAccount {
            id: self.id,
            display_name: self.display_name.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// [`UserDirectory`] over a fixed list of records, usually read from a RON file.
#[derive(Debug, Default)]
pub struct UserFile {
    records: Vec<UserRecord>,
}

impl UserFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let file = fs::File::open(path)?;
        let records: Vec<UserRecord> = ron::de::from_reader(file)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<UserRecord>) -> Result<Self, DirectoryError> {
        {
            let mut slugs = HashSet::new();
            if let Some(record) = (records.iter()).find(|record| !slugs.insert(record.slug.as_str())) {
                return Err(DirectoryError::DuplicateSlug(record.slug.clone()));
            }
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl UserDirectory for UserFile {
    fn find_by_slug(&self, slug: &str) -> Option<UserAccount> {
        (self.records.iter())
            .find(|record| record.slug == slug)
            .map(UserRecord::account)
    }

    fn find_by_id(&self, id: UserId) -> Option<UserAccount> {
        (self.records.iter())
            .find(|record| record.id == id)
            .map(UserRecord::account)
    }

    fn authenticate(&self, slug: &str, password: &str) -> Option<UserAccount> {
        let record = self.records.iter().find(|record| record.slug == slug)?;
        let hash = hash_password(&record.password_salt, password);

        (record.password_sha256.eq_ignore_ascii_case(&hash)).then(|| record.account())
    }
}

pub fn hash_password(salt: &str, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserFile {
        UserFile::from_records(vec![
            UserRecord::new(UserId(1), "Alice Liddell", "alice", "wonderland"),
            UserRecord::new(UserId(2), "Bob", "bob", "hunter2"),
        ])
        .unwrap()
    }

    #[test]
    fn hashes_are_hex_sha256_of_salt_and_password() {
        assert_eq!(
            hash_password("", "abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_password("a", "bc"), hash_password("", "abc"));
    }

    #[test]
    fn same_password_gets_different_hashes() {
        let alice = UserRecord::new(UserId(1), "Alice", "alice", "password");
        let bob = UserRecord::new(UserId(2), "Bob", "bob", "password");

        assert_ne!(alice.password_salt, bob.password_salt);
        assert_ne!(alice.password_sha256, bob.password_sha256);

        let users = UserFile::from_records(vec![alice, bob]).unwrap();
        assert!(users.authenticate("alice", "password").is_some());
        assert!(users.authenticate("bob", "password").is_some());
    }

    #[test]
    fn unsalted_records_still_authenticate() {
        let records: Vec<UserRecord> = ron::from_str(
            r#"[(
                id: 1,
                display_name: "Alice",
                slug: "alice",
                password_sha256: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            )]"#,
        )
        .unwrap();
        let users = UserFile::from_records(records).unwrap();

        assert!(users.authenticate("alice", "abc").is_some());
        assert!(users.authenticate("alice", "abd").is_none());
    }

    #[test]
    fn finds_users_by_slug_and_id() {
        let users = directory();

        let alice = users.find_by_slug("alice").unwrap();
        assert_eq!(alice.id, UserId(1));
        assert_eq!(alice.display_name, "Alice Liddell");
        assert_eq!(users.find_by_id(UserId(2)).unwrap().slug, "bob");
        assert!(users.find_by_slug("carol").is_none());
        assert!(users.find_by_id(UserId(3)).is_none());
    }

    #[test]
    fn authenticates_with_the_right_password_only() {
        let users = directory();

        assert_eq!(
            users.authenticate("bob", "hunter2").map(|user| user.id),
            Some(UserId(2))
        );
        assert!(users.authenticate("bob", "hunter3").is_none());
        assert!(users.authenticate("carol", "hunter2").is_none());
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let result = UserFile::from_records(vec![
            UserRecord::new(UserId(1), "Alice", "alice", "a"),
            UserRecord::new(UserId(2), "Other Alice", "alice", "b"),
        ]);

        assert!(matches!(result, Err(DirectoryError::DuplicateSlug(slug)) if slug == "alice"));
    }

    #[test]
    fn loads_records_from_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.ron");
        let records = vec![UserRecord::new(UserId(5), "Eve", "eve", "secret")];
        fs::write(&path, ron::to_string(&records).unwrap()).unwrap();

        let users = UserFile::load(&path).unwrap();

        assert_eq!(users.len(), 1);
        assert!(users.authenticate("eve", "secret").is_some());
    }
}
