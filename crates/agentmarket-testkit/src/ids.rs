//! Unique identifiers for test data
//!
//! Every run against a shared deployment needs fresh emails, names and job
//! references, otherwise the API rejects them as duplicates.

use rand::Rng;
use uuid::Uuid;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random v4 UUID in hyphenated form
pub fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// `len` random lowercase letters and digits
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// `user-<8 hex>@<domain>`
pub fn unique_email(domain: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("user-{}@{domain}", &simple[..8])
}

/// `<prefix> <6-char suffix>`
pub fn unique_agent_name(prefix: &str) -> String {
    format!("{prefix} {}", random_suffix(6))
}

/// `<label>-<uuid>`, used as an execution's job reference or a funding reference
pub fn job_reference(label: &str) -> String {
    format!("{label}-{}", new_uuid())
}
