//! Storage for the per-player state and command records.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ProtocolError;
use crate::game::PlayerId;
use crate::sync::{CommandRecord, StateRecord};

/// Where state and command records live.
///
/// Methods take `&self` so one mailbox can be shared between the engine and
/// agent threads; implementations handle their own synchronization.
pub trait Mailbox {
    /// Replace the state record of `player`.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be stored.
    fn write_state(&self, player: PlayerId, record: &StateRecord) -> Result<(), ProtocolError>;

    /// Current state record of `player`, if one was published.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be read or parsed.
    fn read_state(&self, player: PlayerId) -> Result<Option<StateRecord>, ProtocolError>;

    /// Replace the command record of `record.id`.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be stored.
    fn write_command(&self, record: &CommandRecord) -> Result<(), ProtocolError>;

    /// Current command record of `player`, if any.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be read or parsed, or was signed by the
    /// other player.
    fn read_command(&self, player: PlayerId) -> Result<Option<CommandRecord>, ProtocolError>;
}

#[derive(Debug, Default)]
struct Slots {
    states: [Option<StateRecord>; 2],
    commands: [Option<CommandRecord>; 2],
}

/// In-process mailbox. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailbox {
    slots: Arc<Mutex<Slots>>,
}

impl MemoryMailbox {
    /// An empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailbox holding the initial command record of both players.
    #[must_use]
    pub fn with_initial_commands() -> Self {
        let mailbox = Self::new();
        if let Ok(mut slots) = mailbox.slots.lock() {
            slots.commands = PlayerId::ALL.map(|id| Some(CommandRecord::initial(id)));
        }
        mailbox
    }

    fn with_slots<T>(&self, f: impl FnOnce(&mut Slots) -> T) -> Result<T, ProtocolError> {
        let mut slots = self.slots.lock().map_err(|_| ProtocolError::Poisoned)?;
        Ok(f(&mut slots))
    }
}

impl Mailbox for MemoryMailbox {
    fn write_state(&self, player: PlayerId, record: &StateRecord) -> Result<(), ProtocolError> {
        self.with_slots(|slots| slots.states[player.index()] = Some(record.clone()))
    }

    fn read_state(&self, player: PlayerId) -> Result<Option<StateRecord>, ProtocolError> {
        self.with_slots(|slots| slots.states[player.index()].clone())
    }

    fn write_command(&self, record: &CommandRecord) -> Result<(), ProtocolError> {
        self.with_slots(|slots| slots.commands[record.id.index()] = Some(record.clone()))
    }

    fn read_command(&self, player: PlayerId) -> Result<Option<CommandRecord>, ProtocolError> {
        self.with_slots(|slots| slots.commands[player.index()].clone())
    }
}

/// JSON files under a root directory:
/// `Calls/player_N.json` for commands and `Logs/player_N.json` for states.
///
/// Writes go to a temporary file that is renamed over the record, so a
/// reader sees either the old or the new record. A record that still fails to
/// parse is reported as [`ProtocolError::Corrupt`], which callers re-poll.
#[derive(Debug, Clone)]
pub struct FileMailbox {
    root: PathBuf,
}

impl FileMailbox {
    /// Use an existing layout under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the layout under `root` and reset both command records to
    /// count 0.
    ///
    /// # Errors
    ///
    /// Fails if the directories or files cannot be written.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, ProtocolError> {
        let mailbox = Self::new(root);
        for dir in [mailbox.calls_dir(), mailbox.logs_dir()] {
            fs::create_dir_all(&dir).map_err(|source| ProtocolError::Io { path: dir, source })?;
        }
        for id in PlayerId::ALL {
            mailbox.write_command(&CommandRecord::initial(id))?;
        }
        Ok(mailbox)
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of command records.
    #[must_use]
    pub fn calls_dir(&self) -> PathBuf {
        self.root.join("Calls")
    }

    /// Directory of state records.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("Logs")
    }

    /// Command record path of `player`.
    #[must_use]
    pub fn command_path(&self, player: PlayerId) -> PathBuf {
        self.calls_dir().join(file_name(player))
    }

    /// State record path of `player`.
    #[must_use]
    pub fn state_path(&self, player: PlayerId) -> PathBuf {
        self.logs_dir().join(file_name(player))
    }
}

fn file_name(player: PlayerId) -> String {
    format!("player_{}.json", player.number())
}

fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), ProtocolError> {
    let text = serde_json::to_string_pretty(record).map_err(ProtocolError::Encode)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).map_err(|source| ProtocolError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| ProtocolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ProtocolError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ProtocolError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| ProtocolError::Corrupt {
            location: path.display().to_string(),
            source,
        })
}

impl Mailbox for FileMailbox {
    fn write_state(&self, player: PlayerId, record: &StateRecord) -> Result<(), ProtocolError> {
        write_record(&self.state_path(player), record)
    }

    fn read_state(&self, player: PlayerId) -> Result<Option<StateRecord>, ProtocolError> {
        read_record(&self.state_path(player))
    }

    fn write_command(&self, record: &CommandRecord) -> Result<(), ProtocolError> {
        write_record(&self.command_path(record.id), record)
    }

    fn read_command(&self, player: PlayerId) -> Result<Option<CommandRecord>, ProtocolError> {
        let record: Option<CommandRecord> = read_record(&self.command_path(player))?;
        match record {
            Some(record) if record.id != player => Err(ProtocolError::WrongSender {
                expected: player,
                found: record.id,
            }),
            other => Ok(other),
        }
    }
}
