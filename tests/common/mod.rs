//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Mutex;

use housekeep::backup::SecretPrompt;
use housekeep::command_runner::{CommandOutput, CommandRunner, ToolInvocation};
use housekeep::immich::client::AssetRef;
use housekeep::immich::{Album, AssetUpload, ImmichApi, ImmichError, SearchResult, UploadedAsset};
use housekeep::secret::Secret;

type Responder = Box<dyn Fn(&ToolInvocation) -> anyhow::Result<CommandOutput>>;

/// Records every invocation and answers with a caller-supplied closure.
pub struct RecordingRunner {
    calls: Mutex<Vec<ToolInvocation>>,
    respond: Responder,
}

impl RecordingRunner {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&ToolInvocation) -> anyhow::Result<CommandOutput> + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(CommandOutput::ok("")))
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    /// First argument of each call (the restic subcommand).
    pub fn subcommands(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.args.first().cloned().unwrap_or_default())
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &ToolInvocation) -> anyhow::Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        (self.respond)(invocation)
    }
}

/// Prompt returning a fixed secret and counting how often it was asked.
pub struct FakePrompt {
    secret: String,
    fail: bool,
    pub calls: Cell<usize>,
}

impl FakePrompt {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            fail: false,
            calls: Cell::new(0),
        }
    }

    /// A prompt that errors, as when no terminal is attached.
    pub fn failing() -> Self {
        Self {
            secret: String::new(),
            fail: true,
            calls: Cell::new(0),
        }
    }
}

impl SecretPrompt for FakePrompt {
    fn prompt(&self, _message: &str) -> anyhow::Result<Secret> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            anyhow::bail!("no tty");
        }
        Ok(Secret::new(self.secret.clone()))
    }
}

pub fn status_error(status: u16) -> ImmichError {
    ImmichError::Status {
        status,
        body: "server error".to_string(),
    }
}

/// In-memory Immich server.
#[derive(Default)]
pub struct FakeImmich {
    /// Failures to return before an upload of this file name succeeds.
    pub upload_failures: RefCell<HashMap<String, u32>>,
    pub upload_attempts: RefCell<Vec<String>>,
    pub fail_album_add: bool,
    pub album_adds: RefCell<Vec<(String, String)>>,
    /// Checksum to search result.
    pub assets: HashMap<String, SearchResult>,
    /// Asset id to album names.
    pub albums: HashMap<String, Vec<String>>,
    pub fail_search: bool,
}

impl FakeImmich {
    pub fn with_asset(mut self, checksum: &str, ids: &[&str]) -> Self {
        self.assets.insert(
            checksum.to_string(),
            SearchResult {
                count: ids.len(),
                items: ids
                    .iter()
                    .map(|id| AssetRef {
                        id: Some(id.to_string()),
                    })
                    .collect(),
            },
        );
        self
    }

    pub fn with_albums(mut self, asset_id: &str, names: &[&str]) -> Self {
        self.albums.insert(
            asset_id.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    pub fn failing_upload(self, file_name: &str, times: u32) -> Self {
        self.upload_failures
            .borrow_mut()
            .insert(file_name.to_string(), times);
        self
    }
}

impl ImmichApi for FakeImmich {
    fn search_checksum(&self, checksum: &str) -> Result<SearchResult, ImmichError> {
        if self.fail_search {
            return Err(status_error(500));
        }
        Ok(self.assets.get(checksum).cloned().unwrap_or_default())
    }

    fn asset_albums(&self, asset_id: &str) -> Result<Vec<Album>, ImmichError> {
        Ok(self
            .albums
            .get(asset_id)
            .map(|names| {
                names
                    .iter()
                    .map(|name| Album {
                        id: format!("album-{}", name),
                        album_name: name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn upload_asset(&self, upload: &AssetUpload) -> Result<UploadedAsset, ImmichError> {
        let name = upload.device_asset_id.clone();
        self.upload_attempts.borrow_mut().push(name.clone());
        let mut failures = self.upload_failures.borrow_mut();
        if let Some(left) = failures.get_mut(&name) {
            if *left > 0 {
                *left -= 1;
                return Err(status_error(503));
            }
        }
        Ok(UploadedAsset {
            id: Some(format!("id-{}", name)),
            status: Some("created".to_string()),
        })
    }

    fn add_to_album(&self, album_id: &str, asset_id: &str) -> Result<(), ImmichError> {
        if self.fail_album_add {
            return Err(status_error(400));
        }
        self.album_adds
            .borrow_mut()
            .push((album_id.to_string(), asset_id.to_string()));
        Ok(())
    }
}
