use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub fn random_alphanumeric(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Lowercase letters and digits only.
pub fn random_base36(length: usize) -> String {
    random_alphanumeric(length).to_ascii_lowercase()
}

pub fn random_upper_alphanumeric(length: usize) -> String {
    random_alphanumeric(length).to_ascii_uppercase()
}
