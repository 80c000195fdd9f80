use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::model::leave_request::IssuedPass;

const PREFIX: &str = "PASS-";
const BODY_LEN: usize = 7;
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `PASS-` + 7 uppercase base-36 characters + `-` + issue time in epoch millis.
pub fn generate(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..BODY_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}-{}", PREFIX, body, now.timestamp_millis())
}

pub fn issue(now: DateTime<Utc>, ttl: Duration) -> IssuedPass {
    IssuedPass {
        token: generate(now),
        expires_at: now + ttl,
    }
}

pub fn is_well_formed(token: &str) -> bool {
    let Some(rest) = token.strip_prefix(PREFIX) else {
        return false;
    };
    let Some((body, millis)) = rest.split_once('-') else {
        return false;
    };

    body.len() == BODY_LEN
        && body
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        && !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
}
