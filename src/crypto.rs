use blowfish::Blowfish;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, KeyInit};

/// Key used by every client release to obfuscate the replay body
pub const BODY_KEY: [u8; 16] = [
    0xDE, 0x72, 0xBE, 0xA0, 0xDE, 0x04, 0xBE, 0xB1, 0xDE, 0xFE, 0xBE, 0xEF, 0xDE, 0xAD, 0xBE, 0xEF,
];

const BLOCK_SIZE: usize = 8;

#[derive(Debug)]
pub enum DecryptError {
    Padding { length: usize },
}

/// Undoes the in-place obfuscation of the replay body.
///
/// The scheme looks like CBC over a Blowfish-ECB primitive, but the chain
/// value is the previous XORed plaintext block rather than the previous
/// ciphertext block, so a library CBC mode cannot reproduce it. The buffer
/// is zero-padded to the block size for processing and truncated back to
/// its original length afterwards.
pub fn decrypt_body(body: &mut Vec<u8>) -> Result<(), DecryptError> {
    let original_len = body.len();
    let padding = (BLOCK_SIZE - original_len % BLOCK_SIZE) % BLOCK_SIZE;
    let padded_len = original_len
        .checked_add(padding)
        .ok_or(DecryptError::Padding {
            length: original_len,
        })?;
    body.resize(padded_len, 0);

    let cipher: Blowfish = Blowfish::new_from_slice(&BODY_KEY)
        .expect("The key is 16 bytes, which is a valid blowfish key length");

    let mut previous = [0u8; BLOCK_SIZE];
    for block in body.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));

        for (b, p) in block.iter_mut().zip(previous.iter()) {
            *b ^= p;
        }
        previous.copy_from_slice(block);
    }

    body.truncate(original_len);

    Ok(())
}
