//! Wallet Journal
//!
//! Append-only binary log of every committed state change, replayed on
//! startup to rebuild accounts, cards and the ledger.
//!
//! - 16-byte naturally aligned header
//! - CRC32 checksum of the payload
//! - bincode payloads
//!
//! # Header Layout (16 bytes)
//!
//! ```text
//! ┌────────────┬───────────┬────────────────────────────────────┐
//! │ seq_id     │ 8 bytes   │ Monotonic, contiguous from 1       │
//! │ checksum   │ 4 bytes   │ CRC32 of payload                   │
//! │ payload_len│ 2 bytes   │ Payload size (max 64KB)            │
//! │ entry_type │ 1 byte    │ Record kind                        │
//! │ version    │ 1 byte    │ Payload format version             │
//! └────────────┴───────────┴────────────────────────────────────┘
//! ```
//!
//! Records are appended *before* the in-memory state changes. A record that
//! fails to reach the file (write, flush or sync) is cut back off the file and
//! aborts the operation with no visible effect. If that cut fails too, the
//! journal refuses every later append.
//! A torn or corrupt tail (crash mid-append) is truncated on open.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core_types::{AccountId, CardNumber, TransferId};

/// Journal header size in bytes
pub const JOURNAL_HEADER_SIZE: usize = 16;

/// Current payload format version
pub const JOURNAL_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Journal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Journal encode error: {0}")]
    Encode(#[from] bincode::Error),

    #[error("Journal payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Journal is poisoned after a failed rollback")]
    Poisoned,
}

// ============================================================
// HEADER
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalHeader {
    pub seq_id: u64,
    pub checksum: u32,
    pub payload_len: u16,
    pub entry_type: u8,
    pub version: u8,
}

impl JournalHeader {
    pub fn new(entry_type: JournalEntryType, seq_id: u64, payload: &[u8]) -> Self {
        Self {
            seq_id,
            checksum: crc32_checksum(payload),
            payload_len: payload.len() as u16,
            entry_type: entry_type as u8,
            version: JOURNAL_VERSION,
        }
    }

    pub fn to_bytes(&self) -> [u8; JOURNAL_HEADER_SIZE] {
        let mut buf = [0u8; JOURNAL_HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.seq_id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        buf[12..14].copy_from_slice(&self.payload_len.to_le_bytes());
        buf[14] = self.entry_type;
        buf[15] = self.version;
        buf
    }

    pub fn from_bytes(buf: &[u8; JOURNAL_HEADER_SIZE]) -> Self {
        let mut seq = [0u8; 8];
        seq.copy_from_slice(&buf[0..8]);
        Self {
            seq_id: u64::from_le_bytes(seq),
            checksum: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            payload_len: u16::from_le_bytes([buf[12], buf[13]]),
            entry_type: buf[14],
            version: buf[15],
        }
    }

    pub fn verify_checksum(&self, payload: &[u8]) -> bool {
        self.checksum == crc32_checksum(payload)
    }
}

#[inline]
pub fn crc32_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

// ============================================================
// RECORDS
// ============================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalEntryType {
    AccountOpened = 1,
    CardIssued = 2,
    BalanceAdjusted = 3,
    TransferCommitted = 4,
}

impl TryFrom<u8> for JournalEntryType {
    type Error = io::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::AccountOpened),
            2 => Ok(Self::CardIssued),
            3 => Ok(Self::BalanceAdjusted),
            4 => Ok(Self::TransferCommitted),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unknown JournalEntryType: {}", value),
            )),
        }
    }
}

/// Decimal as its 16-byte binary form; bincode cannot drive the
/// self-describing serde impl of `Decimal`.
mod decimal_bits {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, s: S) -> Result<S::Ok, S::Error> {
        let bits: [u8; 16] = Decimal::serialize(value);
        bits.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
        let bits = <[u8; 16]>::deserialize(d)?;
        Ok(Decimal::deserialize(bits))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountOpenedPayload {
    pub identity: AccountId,
    #[serde(with = "decimal_bits")]
    pub starting_balance: Decimal,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardIssuedPayload {
    pub number: CardNumber,
    pub owner: AccountId,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceAdjustedPayload {
    pub identity: AccountId,
    #[serde(with = "decimal_bits")]
    pub balance_delta: Decimal,
    pub points_delta: i64,
}

/// Everything needed to redo a transfer without re-deriving it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferCommittedPayload {
    pub transfer_id: u128,
    pub sender: AccountId,
    pub receiver: AccountId,
    #[serde(with = "decimal_bits")]
    pub amount: Decimal,
    #[serde(with = "decimal_bits")]
    pub commission: Decimal,
    pub earned_points: u64,
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub committed_at: DateTime<Utc>,
}

impl TransferCommittedPayload {
    pub fn transfer_id(&self) -> TransferId {
        TransferId::from_u128(self.transfer_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalRecord {
    AccountOpened(AccountOpenedPayload),
    CardIssued(CardIssuedPayload),
    BalanceAdjusted(BalanceAdjustedPayload),
    TransferCommitted(TransferCommittedPayload),
}

impl JournalRecord {
    pub fn entry_type(&self) -> JournalEntryType {
        match self {
            JournalRecord::AccountOpened(_) => JournalEntryType::AccountOpened,
            JournalRecord::CardIssued(_) => JournalEntryType::CardIssued,
            JournalRecord::BalanceAdjusted(_) => JournalEntryType::BalanceAdjusted,
            JournalRecord::TransferCommitted(_) => JournalEntryType::TransferCommitted,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, JournalError> {
        let payload = match self {
            JournalRecord::AccountOpened(p) => bincode::serialize(p)?,
            JournalRecord::CardIssued(p) => bincode::serialize(p)?,
            JournalRecord::BalanceAdjusted(p) => bincode::serialize(p)?,
            JournalRecord::TransferCommitted(p) => bincode::serialize(p)?,
        };
        if payload.len() > u16::MAX as usize {
            return Err(JournalError::PayloadTooLarge(payload.len()));
        }
        Ok(payload)
    }

    pub fn decode(entry_type: JournalEntryType, payload: &[u8]) -> Result<Self, JournalError> {
        Ok(match entry_type {
            JournalEntryType::AccountOpened => {
                JournalRecord::AccountOpened(bincode::deserialize(payload)?)
            }
            JournalEntryType::CardIssued => JournalRecord::CardIssued(bincode::deserialize(payload)?),
            JournalEntryType::BalanceAdjusted => {
                JournalRecord::BalanceAdjusted(bincode::deserialize(payload)?)
            }
            JournalEntryType::TransferCommitted => {
                JournalRecord::TransferCommitted(bincode::deserialize(payload)?)
            }
        })
    }
}

// ============================================================
// WRITER / READER
// ============================================================

/// Storage a [`JournalWriter`] appends to and can roll back.
pub trait JournalSink: Write {
    /// End of the log, where the next frame starts
    fn end(&mut self) -> io::Result<u64>;

    /// Discard everything from `len` on and continue writing there.
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl JournalSink for Vec<u8> {
    fn end(&mut self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.truncate(len as usize);
        Ok(())
    }
}

impl JournalSink for File {
    fn end(&mut self) -> io::Result<u64> {
        self.stream_position()
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.seek(SeekFrom::Start(len))?;
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Appends framed records; a failed append leaves the sink exactly as it
/// was, or poisons the writer when it cannot.
pub struct JournalWriter<W: JournalSink> {
    writer: W,
    next_seq: u64,
    sync_writes: bool,
    poisoned: bool,
}

impl<W: JournalSink> JournalWriter<W> {
    pub fn new(writer: W, start_seq: u64) -> Self {
        Self {
            writer,
            next_seq: start_seq,
            sync_writes: false,
            poisoned: false,
        }
    }

    /// Sync the sink after every frame
    pub fn with_sync(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Header and payload go out in a single `write_all`.
    pub fn append(&mut self, record: &JournalRecord) -> Result<u64, JournalError> {
        if self.poisoned {
            return Err(JournalError::Poisoned);
        }

        let payload = record.encode()?;
        let seq_id = self.next_seq;
        let header = JournalHeader::new(record.entry_type(), seq_id, &payload);

        let mut frame = Vec::with_capacity(JOURNAL_HEADER_SIZE + payload.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(&payload);

        let start = self.writer.end()?;
        if let Err(e) = self.write_frame(&frame) {
            if let Err(rollback) = self.writer.truncate_to(start) {
                self.poisoned = true;
                error!(
                    seq = seq_id,
                    error = %e,
                    rollback_error = %rollback,
                    "Journal rollback failed, refusing further appends"
                );
                return Err(JournalError::Poisoned);
            }
            warn!(seq = seq_id, error = %e, "Journal append failed, frame rolled back");
            return Err(e.into());
        }

        self.next_seq += 1;
        Ok(seq_id)
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()?;
        if self.sync_writes {
            self.writer.sync()?;
        }
        Ok(())
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

/// Outcome of scanning a journal stream
#[derive(Debug, Default)]
pub struct JournalScan {
    pub records: Vec<(u64, JournalRecord)>,
    /// Byte length of the valid prefix
    pub valid_len: u64,
    /// True when bytes after `valid_len` were discarded
    pub torn_tail: bool,
}

impl JournalScan {
    pub fn last_seq(&self) -> u64 {
        self.records.last().map(|(seq, _)| *seq).unwrap_or(0)
    }
}

/// Read until `buf` is full or EOF; returns bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Scan a journal stream, stopping at the first incomplete, corrupt or
/// out-of-sequence entry.
pub fn scan<R: Read>(mut reader: R) -> io::Result<JournalScan> {
    let mut out = JournalScan::default();
    let mut expected_seq = 1u64;

    loop {
        let mut header_buf = [0u8; JOURNAL_HEADER_SIZE];
        let n = read_up_to(&mut reader, &mut header_buf)?;
        if n == 0 {
            return Ok(out);
        }
        if n < JOURNAL_HEADER_SIZE {
            out.torn_tail = true;
            return Ok(out);
        }

        let header = JournalHeader::from_bytes(&header_buf);
        let mut payload = vec![0u8; header.payload_len as usize];
        if read_up_to(&mut reader, &mut payload)? < payload.len() {
            out.torn_tail = true;
            return Ok(out);
        }

        let record = if header.seq_id != expected_seq || !header.verify_checksum(&payload) {
            None
        } else {
            JournalEntryType::try_from(header.entry_type)
                .ok()
                .and_then(|t| JournalRecord::decode(t, &payload).ok())
        };

        match record {
            Some(record) => {
                out.records.push((header.seq_id, record));
                out.valid_len += (JOURNAL_HEADER_SIZE + payload.len()) as u64;
                expected_seq += 1;
            }
            None => {
                out.torn_tail = true;
                return Ok(out);
            }
        }
    }
}

// ============================================================
// JOURNAL SINKS
// ============================================================

/// Durable sink for committed state changes.
///
/// `append` returns only once the record is durable (per the sink's policy);
/// callers mutate in-memory state strictly after a successful append.
pub trait Journal: Send + Sync {
    fn append(&self, record: &JournalRecord) -> Result<u64, JournalError>;
}

/// In-memory deployments: nothing is persisted, sequence numbers still advance.
#[derive(Debug, Default)]
pub struct NoopJournal {
    appended: AtomicU64,
}

impl NoopJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appended(&self) -> u64 {
        self.appended.load(Ordering::Relaxed)
    }
}

impl Journal for NoopJournal {
    fn append(&self, _record: &JournalRecord) -> Result<u64, JournalError> {
        Ok(self.appended.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// File-backed journal
pub struct FileJournal {
    path: PathBuf,
    writer: Mutex<JournalWriter<File>>,
}

impl FileJournal {
    /// Open (or create) the journal at `path`, returning the sink positioned
    /// for appending plus every valid record already on disk.
    pub fn open(
        path: impl AsRef<Path>,
        sync_writes: bool,
    ) -> Result<(Self, Vec<JournalRecord>), JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let scan = scan(io::BufReader::new(&mut file))?;
        if scan.torn_tail {
            warn!(
                path = %path.display(),
                valid_len = scan.valid_len,
                records = scan.records.len(),
                "Journal has a torn tail, truncating"
            );
            file.set_len(scan.valid_len)?;
            file.sync_all()?;
        }
        file.seek(SeekFrom::Start(scan.valid_len))?;

        let next_seq = scan.last_seq() + 1;
        info!(
            path = %path.display(),
            records = scan.records.len(),
            next_seq = next_seq,
            "Journal opened"
        );

        let records = scan.records.into_iter().map(|(_, r)| r).collect();
        Ok((
            Self {
                path,
                writer: Mutex::new(JournalWriter::new(file, next_seq).with_sync(sync_writes)),
            },
            records,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Journal for FileJournal {
    fn append(&self, record: &JournalRecord) -> Result<u64, JournalError> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let seq = writer.append(record)?;
        debug!(seq = seq, kind = ?record.entry_type(), "Journal append");
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(identity: &str) -> JournalRecord {
        JournalRecord::AccountOpened(AccountOpenedPayload {
            identity: identity.to_string(),
            starting_balance: Decimal::new(2000, 2),
            opened_at: Utc::now(),
        })
    }

    fn committed() -> JournalRecord {
        JournalRecord::TransferCommitted(TransferCommittedPayload {
            transfer_id: TransferId::new().as_u128(),
            sender: "alice".into(),
            receiver: "bob".into(),
            amount: Decimal::new(1000, 2),
            commission: Decimal::new(20, 2),
            earned_points: 0,
            committed_at: Utc::now(),
        })
    }

    #[test]
    fn test_header_layout() {
        let header = JournalHeader::new(JournalEntryType::CardIssued, 42, b"payload");
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), JOURNAL_HEADER_SIZE);
        let back = JournalHeader::from_bytes(&bytes);
        assert_eq!(back, header);
        assert_eq!(back.entry_type, 2);
        assert!(back.verify_checksum(b"payload"));
        assert!(!back.verify_checksum(b"payloaD"));
    }

    #[test]
    fn test_write_then_scan() {
        let mut writer = JournalWriter::new(Vec::new(), 1);
        let records = vec![opened("alice"), opened("bob"), committed()];
        for r in &records {
            writer.append(r).unwrap();
        }
        assert_eq!(writer.next_seq(), 4);

        let bytes = writer.get_ref().clone();
        let scan = scan(&bytes[..]).unwrap();
        assert!(!scan.torn_tail);
        assert_eq!(scan.valid_len, bytes.len() as u64);
        assert_eq!(scan.last_seq(), 3);
        let decoded: Vec<_> = scan.records.into_iter().map(|(_, r)| r).collect();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_torn_tail_detected() {
        let mut writer = JournalWriter::new(Vec::new(), 1);
        writer.append(&opened("alice")).unwrap();
        let good_len = writer.get_ref().len();
        writer.append(&committed()).unwrap();

        let mut bytes = writer.get_ref().clone();
        bytes.truncate(bytes.len() - 3);

        let scan = scan(&bytes[..]).unwrap();
        assert!(scan.torn_tail);
        assert_eq!(scan.records.len(), 1);
        assert_eq!(scan.valid_len, good_len as u64);
    }

    #[test]
    fn test_corrupt_payload_stops_scan() {
        let mut writer = JournalWriter::new(Vec::new(), 1);
        writer.append(&opened("alice")).unwrap();
        writer.append(&opened("bob")).unwrap();

        let mut bytes = writer.get_ref().clone();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let scan = scan(&bytes[..]).unwrap();
        assert!(scan.torn_tail);
        assert_eq!(scan.records.len(), 1);
    }

    #[test]
    fn test_file_journal_reopen_and_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wallet.journal");

        {
            let (journal, existing) = FileJournal::open(&path, true).unwrap();
            assert!(existing.is_empty());
            assert_eq!(journal.append(&opened("alice")).unwrap(), 1);
            assert_eq!(journal.append(&committed()).unwrap(), 2);
        }

        // simulate a crash mid-append
        {
            let mut f = OpenOptions::new().append(true).open(&path).unwrap();
            f.write_all(&[7u8; 9]).unwrap();
        }

        let (journal, existing) = FileJournal::open(&path, false).unwrap();
        assert_eq!(existing.len(), 2);
        assert_eq!(journal.append(&opened("bob")).unwrap(), 3);
        drop(journal);

        let (_, existing) = FileJournal::open(&path, false).unwrap();
        assert_eq!(existing.len(), 3);
        assert!(matches!(
            &existing[2],
            JournalRecord::AccountOpened(p) if p.identity == "bob"
        ));
    }

    /// In-memory sink that fails on demand
    #[derive(Default)]
    struct FlakySink {
        buf: Vec<u8>,
        /// Accept this many bytes, then fail the next write once
        short_write: Option<usize>,
        write_error_pending: bool,
        fail_sync: bool,
        fail_truncate: bool,
    }

    impl Write for FlakySink {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if self.write_error_pending {
                self.write_error_pending = false;
                return Err(io::Error::other("no space left on device"));
            }
            if let Some(n) = self.short_write.take() {
                let n = n.min(data.len());
                self.buf.extend_from_slice(&data[..n]);
                self.write_error_pending = true;
                return Ok(n);
            }
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl JournalSink for FlakySink {
        fn end(&mut self) -> io::Result<u64> {
            Ok(self.buf.len() as u64)
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            if self.fail_truncate {
                return Err(io::Error::other("read-only file system"));
            }
            self.buf.truncate(len as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            if std::mem::take(&mut self.fail_sync) {
                return Err(io::Error::other("fsync failed"));
            }
            Ok(())
        }
    }

    fn identities(bytes: &[u8]) -> Vec<String> {
        let scan = scan(bytes).unwrap();
        assert!(!scan.torn_tail);
        scan.records
            .into_iter()
            .map(|(_, r)| match r {
                JournalRecord::AccountOpened(p) => p.identity,
                other => panic!("unexpected record {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_partial_write_is_rolled_back() {
        let mut writer = JournalWriter::new(FlakySink::default(), 1);
        assert_eq!(writer.append(&opened("alice")).unwrap(), 1);

        writer.short_write_next(5);
        assert!(matches!(
            writer.append(&opened("bob")),
            Err(JournalError::Io(_))
        ));

        assert_eq!(writer.append(&opened("carol")).unwrap(), 2);
        assert_eq!(writer.append(&opened("dave")).unwrap(), 3);

        // every acknowledged record survives a rescan, nothing else does
        assert_eq!(
            identities(&writer.get_ref().buf),
            vec!["alice", "carol", "dave"]
        );
    }

    #[test]
    fn test_failed_sync_is_rolled_back() {
        let mut writer = JournalWriter::new(FlakySink::default(), 1).with_sync(true);
        writer.append(&opened("alice")).unwrap();

        writer.fail_sync_next();
        assert!(writer.append(&opened("bob")).is_err());
        assert_eq!(writer.next_seq(), 2);

        writer.append(&opened("carol")).unwrap();
        assert_eq!(identities(&writer.get_ref().buf), vec!["alice", "carol"]);
    }

    #[test]
    fn test_failed_rollback_poisons_writer() {
        let mut writer = JournalWriter::new(FlakySink::default(), 1);
        writer.append(&opened("alice")).unwrap();

        writer.short_write_next(3);
        writer.writer.fail_truncate = true;
        assert!(matches!(
            writer.append(&opened("bob")),
            Err(JournalError::Poisoned)
        ));
        assert!(writer.is_poisoned());

        writer.writer.fail_truncate = false;
        let len = writer.get_ref().buf.len();
        assert!(matches!(
            writer.append(&opened("carol")),
            Err(JournalError::Poisoned)
        ));
        assert_eq!(writer.get_ref().buf.len(), len);
    }

    impl JournalWriter<FlakySink> {
        fn short_write_next(&mut self, n: usize) {
            self.writer.short_write = Some(n);
        }

        fn fail_sync_next(&mut self) {
            self.writer.fail_sync = true;
        }
    }

    #[test]
    fn test_noop_journal_counts() {
        let j = NoopJournal::new();
        assert_eq!(j.append(&opened("a")).unwrap(), 1);
        assert_eq!(j.append(&opened("b")).unwrap(), 2);
        assert_eq!(j.appended(), 2);
    }
}
