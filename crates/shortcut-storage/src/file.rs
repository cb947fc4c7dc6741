use crate::state::State;
use async_trait::async_trait;
use bincode::Options;
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use shortcut_core::{
    AuthStore, BatchStore, Identity, Result, ShortId, Store, StoreError, Url, UrlRecord,
};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Prefix written before every snapshot frame.
const SNAPSHOT_MAGIC: [u8; 4] = *b"SCS1";

/// File-backed implementation of the storage contract.
///
/// The whole state lives in memory. After every successful mutation the
/// entire state is appended to the file as one snapshot frame
/// (`SNAPSHOT_MAGIC` followed by the bincode-encoded state), and reopening
/// the file restores the most recent readable frame.
///
/// On open the file is compacted: the recovered snapshot is rewritten as
/// the only frame. A file with no readable frame at all (corrupt or
/// foreign) is truncated and its content is lost.
///
/// Mutations are serialized by the writer lock, so identifiers are never
/// allocated twice and frames land in mutation order. The state lock is
/// held exclusively only while a mutation is applied; the snapshot is
/// encoded under a shared lock and written to disk with the state lock
/// released, so loads never wait on file I/O. The write itself is blocking
/// and runs on the calling task's thread.
///
/// If the write fails the in-memory change is kept and the call returns
/// the I/O error.
pub struct FileStore {
    path: PathBuf,
    state: RwLock<State>,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl FileStore {
    /// Opens the store at `path`, creating the file if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(io_error)?;

        let file_len = file.metadata().map_err(io_error)?.len();
        let recovered = read_latest_snapshot(&file, file_len);
        if !recovered.intact {
            match recovered.state {
                Some(_) => warn!(
                    path = %path.display(),
                    frames = recovered.frames,
                    "storage file has an unreadable tail, keeping the last readable snapshot"
                ),
                None => warn!(
                    path = %path.display(),
                    "storage file is unreadable, discarding its content"
                ),
            }
        }
        let state = recovered.state.unwrap_or_default();

        file.set_len(0).map_err(io_error)?;
        file.seek(SeekFrom::Start(0)).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        if !state.is_empty() {
            write_snapshot(&mut writer, &state)?;
            writer.flush().map_err(io_error)?;
        }

        info!(path = %path.display(), records = state.len(), "opened file store");

        Ok(Self {
            path,
            state: RwLock::new(state),
            writer: Mutex::new(Some(writer)),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn mutate<T>(&self, apply: impl FnOnce(&mut State) -> T) -> Result<T> {
        let mut writer = self.writer.lock();
        let file = writer.as_mut().ok_or(StoreError::Closed)?;

        let mut state = self.state.write();
        let output = apply(&mut state);
        let state = RwLockWriteGuard::downgrade(state);
        let mut frame = Vec::new();
        write_snapshot(&mut frame, &state)?;
        drop(state);

        file.write_all(&frame).map_err(io_error)?;
        file.flush().map_err(io_error)?;
        Ok(output)
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

struct Recovered {
    state: Option<State>,
    frames: usize,
    intact: bool,
}

fn snapshot_options() -> impl Options {
    bincode::DefaultOptions::new()
}

fn write_snapshot(writer: &mut impl Write, state: &State) -> Result<()> {
    writer.write_all(&SNAPSHOT_MAGIC).map_err(io_error)?;
    snapshot_options()
        .serialize_into(writer, state)
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Reads frames until the end of the file or the first unreadable frame.
///
/// No frame can be longer than the file, which bounds every allocation
/// made while decoding garbage.
fn read_latest_snapshot(file: &File, file_len: u64) -> Recovered {
    let mut reader = BufReader::new(file);
    let mut recovered = Recovered {
        state: None,
        frames: 0,
        intact: false,
    };

    loop {
        match reader.fill_buf() {
            Ok(buf) if buf.is_empty() => {
                recovered.intact = true;
                return recovered;
            }
            Ok(_) => {}
            Err(_) => return recovered,
        }

        let mut magic = [0u8; SNAPSHOT_MAGIC.len()];
        if reader.read_exact(&mut magic).is_err() || magic != SNAPSHOT_MAGIC {
            return recovered;
        }

        match snapshot_options()
            .with_limit(file_len)
            .deserialize_from::<_, State>(&mut reader)
        {
            Ok(state) => {
                recovered.state = Some(state);
                recovered.frames += 1;
            }
            Err(_) => return recovered,
        }
    }
}

fn io_error(err: std::io::Error) -> StoreError {
    StoreError::Io(err.to_string())
}

#[async_trait]
impl Store for FileStore {
    async fn save(&self, target: &Url) -> Result<ShortId> {
        let id = self.mutate(|state| state.insert(UrlRecord::anonymous(target.clone())))?;
        debug!(id = %id, "saved url");
        Ok(id)
    }

    async fn load(&self, id: &ShortId) -> Result<Url> {
        trace!(id = %id, "loading url");
        self.state.read().load(id)
    }

    async fn ping(&self) -> Result<()> {
        match *self.writer.lock() {
            Some(_) => Ok(()),
            None => Err(StoreError::Closed),
        }
    }

    async fn close(&self) -> Result<()> {
        let Some(mut file) = self.writer.lock().take() else {
            return Ok(());
        };

        file.flush().map_err(io_error)?;
        file.get_ref().sync_all().map_err(io_error)?;
        info!(path = %self.path.display(), "closed file store");
        Ok(())
    }
}

#[async_trait]
impl BatchStore for FileStore {
    async fn save_batch(&self, targets: &[Url]) -> Result<Vec<ShortId>> {
        let ids = self.mutate(|state| state.insert_all(None, targets))?;
        debug!(count = ids.len(), "saved url batch");
        StoreError::check_batch(targets.len(), ids)
    }
}

#[async_trait]
impl AuthStore for FileStore {
    async fn save_user(&self, owner: Identity, target: &Url) -> Result<ShortId> {
        let id = self.mutate(|state| state.insert(UrlRecord::owned(owner, target.clone())))?;
        debug!(id = %id, owner = %owner, "saved user url");
        Ok(id)
    }

    async fn save_user_batch(&self, owner: Identity, targets: &[Url]) -> Result<Vec<ShortId>> {
        let ids = self.mutate(|state| state.insert_all(Some(owner), targets))?;
        debug!(count = ids.len(), owner = %owner, "saved user url batch");
        StoreError::check_batch(targets.len(), ids)
    }

    async fn load_user(&self, owner: Identity, id: &ShortId) -> Result<Url> {
        trace!(id = %id, owner = %owner, "loading user url");
        self.state.read().load_user(owner, id)
    }

    async fn load_users(&self, owner: Identity) -> Result<BTreeMap<ShortId, Url>> {
        trace!(owner = %owner, "loading user urls");
        self.state.read().load_users(owner)
    }

    async fn delete_users(&self, owner: Identity, ids: &[ShortId]) -> Result<()> {
        let deleted = self.mutate(|state| state.delete_users(owner, ids))?;
        debug!(owner = %owner, requested = ids.len(), deleted, "deleted user urls");
        Ok(())
    }
}
