//! SQLite storage for SnowFinder resort and snowfall data.
//!
//! This crate is the storage side of the seasonal ranking contract. It
//! owns the schema, seeds reference data from CSV, and answers the five
//! queries the service needs:
//!
//! - [`Database::rank_by_window`] / [`Database::rank_by_window_and_region`]
//! - [`Database::all_resorts_with_peaks`]
//! - [`Database::resort_by_id`]
//! - [`Database::peak_periods_for_resort`]
//!
//! # Usage
//!
//! ```rust
//! use snowfinder_core::{CalendarWindow, MonthDay};
//! use snowfinder_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_resorts("id,name,prefecture,top_elevation_m,base_elevation_m,vertical_m\nzao,Zao Onsen,yamagata,1661,780,881\n").unwrap();
//! db.load_snowfall("zao,2023-02-10,40\nzao,2024-02-11,60\n").unwrap();
//!
//! let window = CalendarWindow::normalize("02-08".parse().unwrap(), Some("02-14".parse().unwrap()));
//! let rows = db.rank_by_window(&window, 10).unwrap();
//! assert_eq!(rows[0].total_snowfall_cm, Some(50));
//! ```
//!
//! # Cancellation
//!
//! A [`Database`] handle can carry a [`CancelFlag`]. While one of its
//! queries runs, SQLite polls the flag through a progress handler and
//! aborts the statement once it is set, which surfaces as
//! [`DbError::Cancelled`].

mod error;
mod loader;
mod queries;
pub mod schema;

pub use error::{DbError, Result};

use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Virtual machine instructions between cancellation checks.
const PROGRESS_CHECK_OPS: i32 = 1_000;

/// How long a file connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared flag a caller sets to abort the query it started.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where query connections come from.
///
/// An in-memory database exists only inside its one connection, so every
/// handle shares it behind a mutex. A file database opens a connection per
/// query, letting slow rankings run beside quick lookups.
#[derive(Clone)]
enum Source {
    Memory(Arc<Mutex<Connection>>),
    File(Arc<PathBuf>),
}

/// SQLite database holding resorts, courses, peak periods and snowfall
/// observations.
///
/// Cheaply cloneable; clones share the same underlying data.
///
/// # Example
///
/// ```rust
/// use snowfinder_db::Database;
///
/// let db = Database::new().unwrap();
/// db.load_resorts("id,name,prefecture,top_elevation_m,base_elevation_m,vertical_m\nniseko,Niseko United,hokkaido,1308,260,1048\n").unwrap();
/// assert_eq!(db.all_resorts_with_peaks().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct Database {
    source: Source,
    cancel: Option<CancelFlag>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            source: Source::Memory(Arc::new(Mutex::new(conn))),
            cancel: None,
        })
    }

    /// Open (or create) a database file and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("[snowfinder] db: opening {}", path.display());
        let conn = Connection::open(path)?;
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        log::debug!("[snowfinder] db: journal_mode={}", mode);
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            source: Source::File(Arc::new(path.to_path_buf())),
            cancel: None,
        })
    }

    /// A handle on the same data whose queries abort once `flag` is set.
    pub fn with_cancel_flag(&self, flag: CancelFlag) -> Self {
        Self {
            source: self.source.clone(),
            cancel: Some(flag),
        }
    }

    /// Acquire a connection, arming the cancellation check for the lifetime
    /// of the guard.
    pub(crate) fn connection(&self) -> Result<ConnectionGuard<'_>> {
        if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            return Err(DbError::Cancelled);
        }
        let held = match &self.source {
            Source::Memory(conn) => Held::Shared(conn.lock().map_err(|_| DbError::Poisoned)?),
            Source::File(path) => {
                let conn = Connection::open(path.as_path())?;
                conn.busy_timeout(BUSY_TIMEOUT)?;
                Held::Owned(conn)
            }
        };
        let guard = ConnectionGuard {
            held,
            armed: self.cancel.is_some(),
        };
        if let Some(flag) = &self.cancel {
            let flag = flag.clone();
            guard.progress_handler(PROGRESS_CHECK_OPS, Some(move || flag.is_cancelled()))?;
        }
        Ok(guard)
    }
}

enum Held<'a> {
    Shared(MutexGuard<'a, Connection>),
    Owned(Connection),
}

pub(crate) struct ConnectionGuard<'a> {
    held: Held<'a>,
    armed: bool,
}

impl Deref for ConnectionGuard<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match &self.held {
            Held::Shared(conn) => conn,
            Held::Owned(conn) => conn,
        }
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.progress_handler(0, None::<fn() -> bool>) {
                log::warn!("[snowfinder] db: failed to clear progress handler: {}", e);
            }
        }
    }
}
