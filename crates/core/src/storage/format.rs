use super::encryption::KdfParams;
use crate::errors::CoreError;

/// Magic bytes identifying a session file.
pub const MAGIC: &[u8; 4] = b"TDSN";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(12) + salt(16) + nonce(12) + ciphertext_len(4) = 50
pub const HEADER_SIZE: usize = 50;

/// Upper bound on the sealed payload. A session is a token and a profile.
pub const MAX_CIPHERTEXT_LEN: u32 = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFileHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
}

/// Layout:
/// ```text
/// [TDSN: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext_len: 4B LE]
/// [ciphertext + tag]
/// ```
pub fn encode(header: &SessionFileHeader, ciphertext: &[u8]) -> Result<Vec<u8>, CoreError> {
    let len = u32::try_from(ciphertext.len())
        .ok()
        .filter(|l| *l <= MAX_CIPHERTEXT_LEN)
        .ok_or_else(|| {
            CoreError::Serialization(format!("Session payload too large: {} bytes", ciphertext.len()))
        })?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&header.version.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(&header.salt);
    buf.extend_from_slice(&header.nonce);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(ciphertext);
    Ok(buf)
}

/// Split a session file into its header and ciphertext.
pub fn decode(data: &[u8]) -> Result<(SessionFileHeader, &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a session file".into(),
        ));
    }
    let mut r = Reader { data, pos: 0 };

    if r.take::<4>()? != *MAGIC {
        return Err(CoreError::InvalidFileFormat("Invalid magic bytes".into()));
    }

    let version = u16::from_le_bytes(r.take::<2>()?);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: r.u32()?,
        time_cost: r.u32()?,
        parallelism: r.u32()?,
    };
    check_kdf_bounds(&kdf_params)?;

    let salt = r.take::<16>()?;
    let nonce = r.take::<12>()?;
    let len = r.u32()?;
    if len > MAX_CIPHERTEXT_LEN {
        return Err(CoreError::InvalidFileFormat(format!(
            "Ciphertext length {len} exceeds limit of {MAX_CIPHERTEXT_LEN}"
        )));
    }
    let ciphertext = r.slice(len as usize)?;

    Ok((
        SessionFileHeader {
            version,
            kdf_params,
            salt,
            nonce,
        },
        ciphertext,
    ))
}

/// Reject headers that would make key derivation arbitrarily expensive.
fn check_kdf_bounds(p: &KdfParams) -> Result<(), CoreError> {
    if !(8..=1_048_576).contains(&p.memory_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF memory_cost out of range: {} KiB",
            p.memory_cost
        )));
    }
    if !(1..=20).contains(&p.time_cost) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF time_cost out of range: {}",
            p.time_cost
        )));
    }
    if !(1..=16).contains(&p.parallelism) {
        return Err(CoreError::InvalidFileFormat(format!(
            "KDF parallelism out of range: {}",
            p.parallelism
        )));
    }
    Ok(())
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn slice(&mut self, n: usize) -> Result<&'a [u8], CoreError> {
        let end = self.pos.checked_add(n).filter(|e| *e <= self.data.len()).ok_or_else(|| {
            CoreError::InvalidFileFormat(format!(
                "File truncated: needed {n} bytes at offset {}, have {}",
                self.pos,
                self.data.len().saturating_sub(self.pos)
            ))
        })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.slice(N)?);
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32, CoreError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }
}
