use std::io;

use crate::keys::{is_valid_private_key, PrivateKey};
use crate::keys::private::HEX_LEN;
use crate::util::Error;
use crate::{bail, log_warn};

pub const PROMPT: &str = "Pls, enter your private key: ";
pub const MAX_ATTEMPTS: u32 = 3;

/// Reads the private key from the terminal without echoing it.
pub fn prompt_private_key() -> Result<PrivateKey, Error> {
    read_private_key(|| rpassword::prompt_password(PROMPT))
}

/// Asks `read` for an answer until one is a well-formed key, up to
/// [`MAX_ATTEMPTS`] times.
pub fn read_private_key<F>(mut read: F) -> Result<PrivateKey, Error>
where
    F: FnMut() -> io::Result<String>,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let answer = read()?;
        if is_valid_private_key(&answer) {
            return answer.parse();
        }
        log_warn!(
            "Private key must be 0x followed by {} hex characters. Attempt {}/{}",
            HEX_LEN,
            attempt,
            MAX_ATTEMPTS
        );
    }
    bail!(Input, "no valid private key entered after {} attempts", MAX_ATTEMPTS)
}
