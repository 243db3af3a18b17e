// ABOUTME: Shared utility functions for Tracksync
// ABOUTME: Local ID generation

use rand::Rng;

const ID_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Length of locally generated entity IDs
pub const ID_LEN: usize = 8;

/// Generate a unique local entity ID (8 alphanumeric characters)
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..ID_CHARSET.len());
            ID_CHARSET[idx] as char
        })
        .collect()
}
