//! Compressed canonical encoding for keys, proofs and public inputs.
//!
//! Points are stored compressed and validated (on curve, in the prime-order subgroup) on
//! the way back in, so a file that decodes is safe to hand to the verifier.

use std::{fs::File, io::BufReader, path::Path};

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};

pub fn to_bytes(item: &impl CanonicalSerialize) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::with_capacity(item.compressed_size());
    item.serialize_compressed(&mut bytes)?;
    Ok(bytes)
}

pub fn from_bytes<T: CanonicalDeserialize>(bytes: &[u8]) -> Result<T, SerializationError> {
    T::deserialize_compressed(bytes)
}

pub fn write_to_file(
    item_name: &str,
    path: impl AsRef<Path>,
    item: &impl CanonicalSerialize,
) -> Result<(), SerializationError> {
    let path = path.as_ref();
    let mut file = File::create(path)?;
    item.serialize_compressed(&mut file)?;
    let file_size_kb = file.metadata()?.len() as f64 / 1024.0;
    tracing::info!("{item_name} written to {}", path.display());
    tracing::info!("{item_name} size: {file_size_kb:.1} kB");
    Ok(())
}

pub fn read_from_file<T: CanonicalDeserialize>(
    path: impl AsRef<Path>,
) -> Result<T, SerializationError> {
    let reader = BufReader::new(File::open(path)?);
    T::deserialize_compressed(reader)
}
