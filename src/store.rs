use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::error::{Error, Result};

const VECTORS: TableDefinition<u64, &[u8]> = TableDefinition::new("vectors");

/// Header size: 4 bytes vector dimension.
const HEADER_SIZE: usize = 4;

/// Persists one embedding vector per catalog assessment, keyed by catalog
/// index.
///
/// Binary format per entry:
/// - 4 bytes: dimension D (u32 LE)
/// - D * 4 bytes: f32 LE values
pub struct EmbeddingStore {
    db: Database,
}

impl EmbeddingStore {
    /// Open or create an embedding store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        txn.open_table(VECTORS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    /// Store a vector for one catalog index.
    pub fn store(&self, index: u64, vector: &[f32]) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(VECTORS)?;
            write_entry(&mut table, index, vector)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Replace the whole store with one vector per catalog row, in order.
    pub fn store_all(&self, rows: &[Vec<f32>]) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(VECTORS)?;
            let existing = table
                .iter()?
                .map(|entry| entry.map(|(k, _)| k.value()))
                .collect::<std::result::Result<Vec<u64>, redb::StorageError>>()?;
            for key in existing {
                table.remove(key)?;
            }
            for (i, vector) in rows.iter().enumerate() {
                write_entry(&mut table, i as u64, vector)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Retrieve the vector for one catalog index, or None when absent or
    /// corrupt.
    pub fn load(&self, index: u64) -> Result<Option<Vec<f32>>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(VECTORS)?;

        let Some(guard) = table.get(index)? else {
            return Ok(None);
        };
        Ok(decode_entry(guard.value()))
    }

    /// Number of stored vectors.
    pub fn count(&self) -> Result<usize> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(VECTORS)?;

        let mut count = 0;
        for entry in table.iter()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Load the full corpus matrix for startup.
    ///
    /// Returns `None` when the store is empty (the caller derives embeddings
    /// from the catalog once and persists them). A populated store whose row
    /// count disagrees with the catalog, or with a gap or corrupt entry, is
    /// a fatal startup error.
    pub fn load_rows(&self, catalog_len: usize) -> Result<Option<Vec<Vec<f32>>>> {
        let stored = self.count()?;
        if stored == 0 {
            return Ok(None);
        }
        if stored != catalog_len {
            return Err(Error::CorpusMismatch {
                assessments: catalog_len,
                embeddings: stored,
            });
        }

        let txn = self.db.begin_read()?;
        let table = txn.open_table(VECTORS)?;
        let mut rows = Vec::with_capacity(catalog_len);
        for index in 0..catalog_len as u64 {
            let entry = table.get(index)?.and_then(|g| decode_entry(g.value()));
            match entry {
                Some(vector) => rows.push(vector),
                None => {
                    return Err(Error::Config(format!(
                        "embedding store entry {index} is missing or corrupt"
                    )));
                }
            }
        }
        Ok(Some(rows))
    }
}

fn write_entry(
    table: &mut redb::Table<'_, u64, &[u8]>,
    index: u64,
    vector: &[f32],
) -> Result<()> {
    let byte_len = HEADER_SIZE + std::mem::size_of_val(vector);
    let mut guard = table.insert_reserve(index, byte_len)?;
    let dest = guard.as_mut();

    dest[0..HEADER_SIZE].copy_from_slice(&(vector.len() as u32).to_le_bytes());
    dest[HEADER_SIZE..].copy_from_slice(bytemuck::cast_slice(vector));
    Ok(())
}

fn decode_entry(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() < HEADER_SIZE {
        return None;
    }
    let dimension = u32::from_le_bytes(bytes[0..HEADER_SIZE].try_into().unwrap()) as usize;
    if bytes.len() != HEADER_SIZE + dimension * 4 {
        return None;
    }
    Some(bytemuck::cast_slice(&bytes[HEADER_SIZE..]).to_vec())
}

impl std::fmt::Debug for EmbeddingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingStore").finish_non_exhaustive()
    }
}
