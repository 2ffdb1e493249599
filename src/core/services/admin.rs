use hex::ToHex;
use sha2::{Digest, Sha256};

use crate::error::Error;

fn digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password);
    hasher.finalize().encode_hex()
}

/// Checks the console password; with none configured nobody gets in.
pub fn login(configured: Option<&str>, password: &str) -> Result<(), Error> {
    let configured = configured.ok_or_else(|| Error::Forbidden("admin console is disabled".into()))?;
    if digest(configured) != digest(password) {
        log::warn!("rejected admin login");
        return Err(Error::Unauthorized);
    }
    Ok(())
}
