use sha2::{Digest, Sha256};

pub struct BiometricHasher;

impl BiometricHasher {
    /// Only the digest is stored; raw biometric data never reaches the database.
    pub fn hash(biometric_data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(biometric_data.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
